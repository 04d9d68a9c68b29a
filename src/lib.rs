//! Mustache templates with inheritance, dynamic partials and lambdas.
//!
//! A mustache [Template] compiled from source is rendered by navigating
//! in a [Context], getting partials from a [TemplateStore].
//!
//! This implementation supports the core modules as well as the optional
//! inheritance, dynamic-names and lambdas modules, passing relevant tests
//! in [`specs`].
//!
//! A [Context] acting as a lambda returns the template it produces from
//! [Context::lambda]. When looked up for a section, it is given the raw
//! section body and may answer with a [LambdaText]. An example of such an
//! implementation is provided in [MapsAndLists].
//!
//! [Mustache] bundles a template with a store and renders any
//! `serde::Serialize` data.
//!
//!
//! # Samples
//!
//! ## Hello world
//!
//! ```
//! use stache::{Template, JsonValue};
//!
//! let text = "hello, {{you}}!";
//! let data = r#"{
//!     "you": "world"
//! }"#;
//!
//! let template = Template::from(text).unwrap();
//! let context = serde_json::from_str::<JsonValue>(data).unwrap();
//!
//! let result = template.render(&context);
//!
//! assert_eq!(result, "hello, world!")
//! ```
//!
//! ## Hello team
//!
//! ```
//! use stache::{Template, YamlValue};
//! let text = r#"
//!   {{#team}}
//!   hello, {{address}} {{name}}!
//!   {{/team}}
//! "#;
//! let data = r#"
//!   team:
//!     - name: john
//!       address: little
//!     - name: 42
//!       address: citizen
//! "#;
//!
//! let template = Template::from(text).unwrap();
//! let context = serde_yaml::from_str::<YamlValue>(data).unwrap();
//!
//! let result = template.render(&context);
//! assert_eq!(result, r#"
//!   hello, little john!
//!   hello, citizen 42!
//! "#);
//! ```
//!
//! ## Layouts
//!
//! ```
//! use stache::{Mustache, TemplateMap};
//!
//! let partials = TemplateMap::new([
//!     ("layout", "<h1>{{$title}}Untitled{{/title}}</h1>"),
//! ]).unwrap();
//! let page = Mustache::from("{{<layout}}{{$title}}{{name}}{{/title}}{{/layout}}")
//!     .unwrap()
//!     .with_partials(partials);
//!
//! assert_eq!(page.render(&serde_json::json!({ "name": "Home" })), "<h1>Home</h1>");
//! ```
//!
//!
//! [`specs`]: https://github.com/mustache/spec
mod error;
mod reader;
mod parser;
mod processor;
mod template;
mod context;
mod store;
mod engine;
mod json;
mod yaml;
mod maps_and_lists;

pub use self::error::{ParseError, ParseErrorKind};
pub use self::template::{Template, Options};
pub use self::context::{Context, Boxed, LambdaText};
pub use self::store::{TemplateStore, TemplateMap, TemplateFolder, EmptyStore};
pub use self::engine::Mustache;
pub use self::json::JsonValue;
pub use self::yaml::YamlValue;
pub use self::maps_and_lists::MapsAndLists;
