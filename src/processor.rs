use tracing::debug;
use crate::context::{Boxed, Stack};
use crate::store::TemplateStore;
use crate::template::Template;


/// Rendering of a segment, or a sequence of segments.
///
/// `render` returns None when the segment is suppressed, which is distinct
/// from rendering an empty string: a suppressed segment leaves the
/// new-line state of the following segments untouched.
pub(crate) trait Render {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String>;

    fn substitute(&self, blocks: &[BlockSegment]) -> Self where Self: Sized;
}

pub(crate) type Segments = Vec<Segment>;


#[derive(Debug, Clone)]
pub(crate) enum Segment {
    Text(TextSegment),
    Value(ValueSegment),
    Section(SectionSegment),
    InvertedSection(InvertedSectionSegment),
    Block(BlockSegment),
    Partial(PartialSegment),
}

impl Render for Segment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        match self {
            Segment::Text(it) => it.render(stack, partials, indent, new_line),
            Segment::Value(it) => it.render(stack, partials, indent, new_line),
            Segment::Section(it) => it.render(stack, partials, indent, new_line),
            Segment::InvertedSection(it) => it.render(stack, partials, indent, new_line),
            Segment::Block(it) => it.render(stack, partials, indent, new_line),
            Segment::Partial(it) => it.render(stack, partials, indent, new_line),
        }
    }

    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        match self {
            Segment::Text(_) | Segment::Value(_) => self.clone(),
            Segment::Section(it) => Segment::Section(it.substitute(blocks)),
            Segment::InvertedSection(it) => Segment::InvertedSection(it.substitute(blocks)),
            Segment::Block(it) => Segment::Block(it.substitute(blocks)),
            Segment::Partial(it) => Segment::Partial(it.substitute(blocks)),
        }
    }
}

impl Render for Segments {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        let mut new_line = new_line;
        let mut result = String::new();
        for segment in self {
            if let Some(text) = segment.render(stack, partials, indent, new_line) {
                new_line = text.ends_with('\n');
                result.push_str(&text);
            }
        }
        Some(result)
    }

    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        self.iter()
            .map(|segment| segment.substitute(blocks))
            .collect()
    }
}


#[derive(Debug, Clone)]
pub(crate) struct TextSegment {
    text: String,
}

impl TextSegment {
    pub(crate) fn new(text: &str) -> Self {
        TextSegment {
            text: text.to_owned()
        }
    }
}

impl Render for TextSegment {
    fn render(
        &self, _stack: &Stack, _partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        if indent.is_empty() {
            return Some(self.text.clone());
        }
        let lines = self.text.split('\n').collect::<Vec<_>>();
        let last = lines.len() - 1;
        let text = lines.iter()
            .enumerate()
            .map(|(i, line)| {
                // a trailing empty line belongs to whatever comes next
                let needs_indent = (i > 0 || new_line) && (i < last || !line.is_empty());
                indented(line, needs_indent, indent)
            })
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    fn substitute(&self, _blocks: &[BlockSegment]) -> Self {
        self.clone()
    }
}


#[derive(Debug, Clone)]
pub(crate) struct ValueSegment {
    name: String,
    is_escaped: bool,
}

impl ValueSegment {
    pub(crate) fn new(name: &str, is_escaped: bool) -> Self {
        ValueSegment {
            name: name.to_owned(),
            is_escaped
        }
    }
}

impl Render for ValueSegment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        // no indentation is added inside interpolated values containing EOLs
        let text = stack.resolve(&self.name, None, |resolved| match resolved {
            Some(context) => match context.lambda() {
                Some(source) => match Template::load(&source) {
                    Some(template) => template.render_internal(stack, partials, indent, new_line),
                    None => {
                        debug!(name = %self.name, "lambda output is not a template, emitted as text");
                        indented(&source, new_line, indent)
                    }
                },
                None => indented(&context.value(), new_line, indent),
            },
            None => indented("", new_line, indent),
        });
        match self.is_escaped {
            true => Some(html_escape(&text)),
            false => Some(text)
        }
    }

    fn substitute(&self, _blocks: &[BlockSegment]) -> Self {
        self.clone()
    }
}


#[derive(Debug, Clone)]
pub(crate) struct SectionSegment {
    name: String,
    is_iteration_check: bool,
    children: Segments,
    delimiters: (String, String),
    span: (usize, usize),
    body: String,
}

impl SectionSegment {
    pub(crate) fn new(
        name: &str,
        is_iteration_check: bool,
        children: Segments,
        delimiters: (String, String),
        span: (usize, usize),
        body: &str,
    ) -> Self {
        SectionSegment {
            name: name.to_owned(),
            is_iteration_check,
            children,
            delimiters,
            span,
            body: body.to_owned(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn span(&self) -> (usize, usize) {
        self.span
    }

    pub(crate) fn children(&self) -> &Segments {
        &self.children
    }

    fn render_items(
        &self, items: &[Boxed], stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> String {
        let mut new_line = new_line;
        let mut result = String::new();
        for item in items {
            let text = self.children
                .render(&stack.push(item.as_ref()), partials, indent, new_line)
                .unwrap_or_default();
            if !text.is_empty() {
                new_line = text.ends_with('\n');
            }
            result.push_str(&text);
        }
        result
    }

    // lambda output is parsed with the delimiters active at the section tag
    fn render_lambda(
        &self, source: &str, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> String {
        let (open_delimiter, close_delimiter) = &self.delimiters;
        let template = if open_delimiter == "{{" && close_delimiter == "}}" {
            Template::load(source)
        } else {
            Template::load(&format!("{{{{={} {}=}}}}\n{}", open_delimiter, close_delimiter, source))
        };
        match template {
            Some(template) => template.render_internal(stack, partials, indent, new_line),
            None => {
                debug!(name = %self.name, "lambda output is not a template, emitted as text");
                indented(source, new_line, indent)
            }
        }
    }
}

impl Render for SectionSegment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        stack.resolve(&self.name, Some(&self.body), |resolved| {
            let context = resolved?;
            if self.is_iteration_check {
                return match context.children() {
                    Some(items) if !items.is_empty() =>
                        Some(self.render_items(&items, stack, partials, indent, new_line)),
                    _ => Some(String::new())
                };
            }
            if let Some(source) = context.lambda() {
                Some(self.render_lambda(&source, stack, partials, indent, new_line))
            } else if let Some(items) = context.children() {
                Some(self.render_items(&items, stack, partials, indent, new_line))
            } else if !context.is_falsy() {
                self.children.render(&stack.push(context), partials, indent, new_line)
            } else {
                None
            }
        })
    }

    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        SectionSegment {
            children: self.children.substitute(blocks),
            ..self.clone()
        }
    }
}


#[derive(Debug, Clone)]
pub(crate) struct InvertedSectionSegment {
    name: String,
    children: Segments,
}

impl InvertedSectionSegment {
    pub(crate) fn new(name: &str, children: Segments) -> Self {
        InvertedSectionSegment {
            name: name.to_owned(),
            children
        }
    }
}

impl Render for InvertedSectionSegment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        let is_falsy = stack.resolve(&self.name, None, |resolved| {
            resolved.map_or(true, |context| context.is_falsy())
        });
        if is_falsy {
            self.children.render(stack, partials, indent, new_line)
        } else {
            None
        }
    }

    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        InvertedSectionSegment::new(&self.name, self.children.substitute(blocks))
    }
}


#[derive(Debug, Clone)]
pub(crate) struct BlockSegment {
    name: String,
    children: Segments,
}

impl BlockSegment {
    pub(crate) fn new(name: &str, children: Segments) -> Self {
        BlockSegment {
            name: name.to_owned(),
            children
        }
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Render for BlockSegment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        self.children.render(stack, partials, indent, new_line)
    }

    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        match blocks.iter().find(|block| block.name == self.name) {
            Some(block) => block.clone(),
            None => BlockSegment::new(&self.name, self.children.substitute(blocks))
        }
    }
}


#[derive(Debug, Clone)]
pub(crate) struct PartialSegment {
    name: String,
    is_dynamic: bool,
    indent: String,
    parameters: Option<Vec<BlockSegment>>,
}

impl PartialSegment {
    pub(crate) fn new(tag: &str, indent: &str, parameters: Option<Vec<BlockSegment>>) -> Self {
        let is_dynamic = tag.starts_with('*');
        let name = if is_dynamic {
            tag[1..].trim_start()
        } else {
            tag
        };
        PartialSegment {
            name: name.to_owned(),
            is_dynamic,
            indent: indent.to_owned(),
            parameters
        }
    }

    #[cfg(test)]
    pub(crate) fn parameters(&self) -> Option<&[BlockSegment]> {
        self.parameters.as_deref()
    }
}

impl Render for PartialSegment {
    fn render(
        &self, stack: &Stack, partials: &dyn TemplateStore, indent: &str, new_line: bool
    ) -> Option<String> {
        let name = if self.is_dynamic {
            stack.resolve(&self.name, None, |resolved| resolved.map(|context| context.value()))
                .unwrap_or_default()
        } else {
            self.name.clone()
        };
        let template = match partials.get(&name) {
            Some(template) => template,
            None => {
                debug!(partial = %name, "partial not found");
                return Some(String::new());
            }
        };
        let indent = format!("{}{}", indent, self.indent);
        match &self.parameters {
            Some(parameters) => template.segments()
                .substitute(parameters)
                .render(stack, partials, &indent, new_line),
            None => template.segments()
                .render(stack, partials, &indent, new_line)
        }
    }

    // overrides given from outside win over the parameters of this partial
    fn substitute(&self, blocks: &[BlockSegment]) -> Self {
        let parameters = self.parameters.as_ref().map(|parameters| {
            parameters.iter()
                .filter(|parameter| blocks.iter().all(|block| block.name != parameter.name))
                .chain(blocks.iter())
                .cloned()
                .collect()
        });
        PartialSegment {
            parameters,
            ..self.clone()
        }
    }
}


fn indented(text: &str, needs_indent: bool, indent: &str) -> String {
    if needs_indent {
        format!("{}{}", indent, text)
    } else {
        text.to_owned()
    }
}

// entity mapping from the javascript implementation of mustache
fn html_escape(input: &str) -> String {
    input.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('/', "&#47;")
        .replace('=', "&#61;")
        .replace('`', "&#96;")
}


#[cfg(test)]
impl Segment {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Segment::Text(_) => "text",
            Segment::Value(_) => "value",
            Segment::Section(_) => "section",
            Segment::InvertedSection(_) => "inverted section",
            Segment::Block(_) => "block",
            Segment::Partial(_) => "partial",
        }
    }
}
