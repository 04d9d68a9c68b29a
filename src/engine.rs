use serde::Serialize;
use tracing::warn;
use crate::context::Context;
use crate::error::ParseError;
use crate::json::JsonValue;
use crate::store::{EmptyStore, TemplateStore};
use crate::template::Template;


/// A template bundled with the store its partials come from.
pub struct Mustache {
    template: Template,
    partials: Box<dyn TemplateStore + Send + Sync>,
}

impl Mustache {
    pub fn new(template: Template) -> Self {
        Mustache {
            template,
            partials: Box::new(EmptyStore)
        }
    }

    pub fn from(source: &str) -> Result<Self, ParseError> {
        Ok(Self::new(Template::from(source)?))
    }

    pub fn with_partials<S>(self, partials: S) -> Self
    where S: TemplateStore + Send + Sync + 'static {
        Mustache {
            partials: Box::new(partials),
            ..self
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Render any serializable data, converted to JSON first.
    ///
    /// Data that fails to serialize renders as if there were no data.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let context = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "data not serializable, rendering without data");
                JsonValue::Null
            }
        };
        self.render_context(&context)
    }

    pub fn render_context(&self, context: &dyn Context) -> String {
        self.template.render_with_partials(context, self.partials.as_ref())
    }
}
