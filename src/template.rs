use std::str::FromStr;
use serde::Deserialize;
use tracing::{debug, trace};
use crate::context::{Context, Stack};
use crate::error::ParseError;
use crate::parser::Parser;
use crate::processor::{Render, Segment, Segments};
use crate::reader::Reader;
use crate::store::{EmptyStore, TemplateStore};


/// Compilation settings.
///
/// With `iteration_check` set, a section only renders when its name
/// resolves to a non-empty list, once per item. Lambdas and plain values
/// do not render the section in that mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub iteration_check: bool,
}


/// A compiled mustache template.
///
/// A template is immutable once compiled and can be shared between
/// threads and rendered concurrently.
#[derive(Debug, Clone, Default)]
pub struct Template {
    segments: Segments,
}

impl Template {
    /// Compile a template with default options.
    pub fn from(input: &str) -> Result<Self, ParseError> {
        Self::with_options(input, &Options::default())
    }

    pub fn with_options(input: &str, options: &Options) -> Result<Self, ParseError> {
        let mut reader = Reader::new(input);
        match Parser::new(&mut reader, options).parse(None) {
            Ok(segments) => {
                trace!(segments = segments.len(), "template compiled");
                Ok(Template { segments })
            },
            Err(error) => {
                debug!(%error, "template rejected");
                Err(error)
            }
        }
    }

    /// Compile a template, None if ill-formed.
    pub fn load(input: &str) -> Option<Self> {
        Self::from(input).ok()
    }

    /// A template rendering as an empty string.
    pub fn empty() -> Self {
        Template::default()
    }

    pub fn render(&self, context: &dyn Context) -> String {
        self.render_with_partials(context, &EmptyStore)
    }

    pub fn render_with_partials(&self, context: &dyn Context, partials: &dyn TemplateStore) -> String {
        let stack = Stack::new(context);
        self.render_internal(&stack, partials, "", true)
    }

    pub(crate) fn render_internal(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> String {
        self.segments
            .render(stack, partials, indent, new_line)
            .unwrap_or_default()
    }

    pub(crate) fn segments(&self) -> &Segments {
        &self.segments
    }

    /// Byte range of the body of the section designated by a dotted
    /// `path` of nested section names, e.g. `outer.inner`.
    pub fn section_location(&self, path: &str) -> Option<(usize, usize)> {
        locate(&self.segments, path)
    }
}

fn locate(segments: &Segments, path: &str) -> Option<(usize, usize)> {
    segments.iter().find_map(|segment| match segment {
        Segment::Section(section) if section.name() == path => Some(section.span()),
        Segment::Section(section) => path.strip_prefix(section.name())
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| locate(section.children(), rest)),
        _ => None
    })
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Template::from(input)
    }
}
