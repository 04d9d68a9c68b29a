use crate::error::{ParseError, ParseErrorKind};
use crate::processor::{
    BlockSegment, InvertedSectionSegment, PartialSegment, SectionSegment,
    Segment, Segments, TextSegment, ValueSegment,
};
use crate::reader::Reader;
use crate::template::Options;


/// Recursive-descent parser over a shared [Reader].
///
/// Each section body is parsed by a nested call to [Parser::parse] using
/// the same reader, so delimiters changed inside a section stay in effect.
pub(crate) struct Parser<'r, 'a> {
    reader: &'r mut Reader<'a>,
    options: &'r Options,
}

enum Flow {
    Continue,
    EndOfSection,
}

impl<'r, 'a> Parser<'r, 'a> {
    pub(crate) fn new(reader: &'r mut Reader<'a>, options: &'r Options) -> Self {
        Parser { reader, options }
    }

    pub(crate) fn parse(&mut self, section: Option<&str>) -> Result<Segments, ParseError> {
        let mut segments = Segments::new();
        while self.read_text(section, &mut segments)? {
            if let Flow::EndOfSection = self.read_tag(section, &mut segments)? {
                break;
            }
        }
        Ok(segments)
    }

    // add the text preceding the next tag, return false at end of input
    fn read_text(&mut self, section: Option<&str>, segments: &mut Segments) -> Result<bool, ParseError> {
        let open_delimiter = self.reader.open_delimiter().to_owned();
        let found = self.reader.read_until(&open_delimiter);
        if !found && section.is_some() {
            return Err(self.error(ParseErrorKind::UnexpectedEndOfInput));
        }
        self.reader.set_mark();
        if let Some(text) = self.reader.fetch_text() {
            segments.push(Segment::Text(TextSegment::new(text)));
        }
        Ok(found)
    }

    fn read_tag(&mut self, section: Option<&str>, segments: &mut Segments) -> Result<Flow, ParseError> {
        let sigil = loop {
            match self.reader.next() {
                Some(c) if c.is_whitespace() => continue,
                Some(c) => break c,
                None => return Err(self.error(ParseErrorKind::UnexpectedEndOfInput)),
            }
        };
        match sigil {
            '/' => {
                let name = self.read_name(None)?;
                if Some(name.as_str()) != section {
                    return Err(self.error(ParseErrorKind::UnexpectedEndOfSection(name)));
                }
                return Ok(Flow::EndOfSection);
            },
            '!' => {
                let close_delimiter = self.reader.close_delimiter().to_owned();
                if !self.reader.read_until(&close_delimiter) {
                    return Err(self.error(ParseErrorKind::MissingDelimiter));
                }
            },
            '=' => self.set_delimiters()?,
            '#' => {
                let name = self.read_name(None)?;
                let open_delimiter = self.reader.open_delimiter().to_owned();
                let close_delimiter = self.reader.close_delimiter().to_owned();
                let start = self.reader.body_start();
                let children = self.parse(Some(&name))?;
                let end = self.reader.body_end().max(start);
                segments.push(Segment::Section(SectionSegment::new(
                    &name,
                    self.options.iteration_check,
                    children,
                    (open_delimiter, close_delimiter),
                    (start, end),
                    &self.reader.input()[start..end],
                )));
            },
            '^' => {
                let name = self.read_name(None)?;
                let children = self.parse(Some(&name))?;
                segments.push(Segment::InvertedSection(
                    InvertedSectionSegment::new(&name, children)
                ));
            },
            '$' => {
                let name = self.read_name(None)?;
                let children = self.parse(Some(&name))?;
                segments.push(Segment::Block(BlockSegment::new(&name, children)));
            },
            '>' => {
                let tag = self.read_name(None)?;
                let indent = self.reader.indent();
                segments.push(Segment::Partial(PartialSegment::new(&tag, indent, None)));
            },
            '*' => {
                self.reader.back();
                let tag = self.read_name(None)?;
                let indent = self.reader.indent();
                segments.push(Segment::Partial(PartialSegment::new(&tag, indent, None)));
            },
            '<' => {
                let tag = self.read_name(None)?;
                let indent = self.reader.indent();
                let name = tag.strip_prefix('*').map_or(tag.as_str(), str::trim_start);
                let parameters = self.parse(Some(name))?
                    .into_iter()
                    .filter_map(|segment| match segment {
                        Segment::Block(block) => Some(block),
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                segments.push(Segment::Partial(PartialSegment::new(&tag, indent, Some(parameters))));
            },
            '{' => {
                let name = self.read_name(Some("}"))?;
                segments.push(Segment::Value(ValueSegment::new(&name, false)));
            },
            '&' => {
                let name = self.read_name(None)?;
                segments.push(Segment::Value(ValueSegment::new(&name, false)));
            },
            _ => {
                self.reader.back();
                let name = self.read_name(None)?;
                segments.push(Segment::Value(ValueSegment::new(&name, true)));
            },
        }
        Ok(Flow::Continue)
    }

    // read up to the close delimiter, optionally preceded by `prefix`
    fn read_name(&mut self, prefix: Option<&str>) -> Result<String, ParseError> {
        let delimiter = format!("{}{}", prefix.unwrap_or_default(), self.reader.close_delimiter());
        if !self.reader.read_until(&delimiter) {
            return Err(self.error(ParseErrorKind::MissingDelimiter));
        }
        match self.reader.fetch_tag() {
            Some(tag) => Ok(tag.to_owned()),
            None => Err(self.error(ParseErrorKind::MissingTag)),
        }
    }

    fn set_delimiters(&mut self) -> Result<(), ParseError> {
        let body = self.read_name(Some("="))?;
        let (open_delimiter, close_delimiter) = match parse_delimiters(&body) {
            Some(delimiters) => delimiters,
            None => return Err(self.error(ParseErrorKind::InvalidDelimiters(body))),
        };
        self.reader.set_delimiters(open_delimiter, close_delimiter, true);
        Ok(())
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.reader.pos())
    }
}

// two words free of '=' separated by whitespace
fn parse_delimiters(body: &str) -> Option<(&str, &str)> {
    let words = body.split_whitespace().collect::<Vec<_>>();
    match words.as_slice() {
        [open, close] if !body.contains('=') => Some((*open, *close)),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Segments, ParseError> {
        let mut reader = Reader::new(input);
        Parser::new(&mut reader, &Options::default()).parse(None)
    }

    fn expect_error(input: &str, kind: ParseErrorKind) {
        match parse(input) {
            Err(error) => assert_eq!(error.kind, kind, "input {:?}", input),
            Ok(segments) => panic!("{:?} parsed as {:?}", input, segments),
        }
    }

    #[test]
    fn missing_tag_character() {
        expect_error("{{", ParseErrorKind::UnexpectedEndOfInput);
    }

    #[test]
    fn incomplete_section() {
        expect_error("{{#xxx}}", ParseErrorKind::UnexpectedEndOfInput);
    }

    #[test]
    fn delimiter_with_equals() {
        expect_error("{{= |= =| =}}", ParseErrorKind::InvalidDelimiters("|= =|".to_owned()));
    }

    #[test]
    fn delimiter_with_whitespace() {
        expect_error("{{= | x | =}}", ParseErrorKind::InvalidDelimiters("| x |".to_owned()));
    }

    #[test]
    fn delimiter_without_closing_equals() {
        expect_error("{{= +++   --- }}", ParseErrorKind::MissingDelimiter);
    }

    #[test]
    fn mismatched_end_of_section() {
        expect_error("{{#a}}{{/b}}", ParseErrorKind::UnexpectedEndOfSection("b".to_owned()));
    }

    #[test]
    fn end_of_section_at_root() {
        expect_error("x{{/a}}", ParseErrorKind::UnexpectedEndOfSection("a".to_owned()));
    }

    #[test]
    fn unescaped_value_without_name() {
        expect_error("{{ & }}", ParseErrorKind::MissingTag);
    }

    #[test]
    fn unterminated_value() {
        expect_error("hello {{name", ParseErrorKind::MissingDelimiter);
    }

    #[test]
    fn unterminated_comment() {
        expect_error("{{! no end", ParseErrorKind::MissingDelimiter);
    }

    #[test]
    fn error_reports_offset() {
        let error = parse("abc {{#a}} def").unwrap_err();
        assert_eq!(error.offset, 14);
    }

    #[test]
    fn delimiters_are_words() {
        assert_eq!(parse_delimiters("<%  %>"), Some(("<%", "%>")));
        assert_eq!(parse_delimiters("<% \t %>"), Some(("<%", "%>")));
        assert_eq!(parse_delimiters("<%"), None);
        assert_eq!(parse_delimiters("a b c"), None);
    }

    #[test]
    fn tags_are_dispatched_on_sigil() {
        let segments = parse("a{{b}}{{{c}}}{{&d}}{{#e}}{{/e}}{{^f}}{{/f}}{{$g}}{{/g}}{{>h}}{{<i}}{{/i}}{{*j}}").unwrap();
        let kinds = segments.iter().map(Segment::kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                "text", "value", "value", "value", "section",
                "inverted section", "block", "partial", "partial", "partial"
            ]
        );
    }

    #[test]
    fn whitespace_before_sigil_is_ignored() {
        let segments = parse("{{ #a }}x{{ /a }}").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind(), "section");
    }

    #[test]
    fn parent_keeps_only_blocks() {
        let segments = parse("{{<p}}text{{$a}}A{{/a}}{{x}}{{$b}}B{{/b}}{{/p}}").unwrap();
        match &segments[0] {
            Segment::Partial(partial) => {
                let names = partial.parameters()
                    .unwrap_or_default()
                    .iter()
                    .map(BlockSegment::name)
                    .collect::<Vec<_>>();
                assert_eq!(names, vec!["a", "b"]);
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dynamic_parent_closes_on_its_name() {
        let segments = parse("{{<*dynamic}}{{$a}}A{{/a}}{{/dynamic}}").unwrap();
        match &segments[0] {
            Segment::Partial(partial) => assert_eq!(partial.parameters().map(<[_]>::len), Some(1)),
            other => panic!("unexpected {:?}", other),
        }
        parse("{{< * dynamic}}{{/dynamic}}").unwrap();
        expect_error(
            "{{<*dynamic}}{{/*dynamic}}",
            ParseErrorKind::UnexpectedEndOfSection("*dynamic".to_owned())
        );
    }

    #[test]
    fn delimiters_persist_after_section() {
        let error = parse("{{#a}}{{=| |=}}{{/a}}|b|").unwrap_err();
        // `{{/a}}` is plain text once delimiters are changed
        assert_eq!(error.kind, ParseErrorKind::UnexpectedEndOfInput);
    }
}
