use std::mem;

static STRIPPABLE_SIGILS: &str = "#^/>=!$<*";
const COMMENT_SIGIL: char = '!';


/// A reader that ignores whitespace surrounding standalone tags.
///
/// The input is scanned one window at a time. A window spans complete lines,
/// ignoring EOLs inside comments. When a window holds only whitespace and
/// standalone tags, the text of the window is narrowed to the tags.
pub(crate) struct Reader<'a> {
    input: &'a str,
    open_delimiter: String,
    close_delimiter: String,
    pos: usize,
    mark: usize,
    last_len: usize,
    window_start: usize,
    window_after: usize,
    text_start: usize,
    text_after: usize,
    buffer: String,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Reader {
            input,
            open_delimiter: "{{".to_owned(),
            close_delimiter: "}}".to_owned(),
            pos: 0,
            mark: 0,
            last_len: 0,
            window_start: 0,
            window_after: 0,
            text_start: 0,
            text_after: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn open_delimiter(&self) -> &str {
        &self.open_delimiter
    }

    pub(crate) fn close_delimiter(&self) -> &str {
        &self.close_delimiter
    }

    /// Remember where the tag that was just opened starts.
    pub(crate) fn set_mark(&mut self) {
        self.mark = self.pos.saturating_sub(self.open_delimiter.len());
    }

    /// Whitespace from the start of the current window to its first content.
    pub(crate) fn indent(&self) -> &'a str {
        &self.input[self.window_start..self.text_start]
    }

    /// Accumulate characters until `delimiter`, which is consumed but not kept.
    ///
    /// Return false if the input ends first.
    pub(crate) fn read_until(&mut self, delimiter: &str) -> bool {
        self.buffer.clear();
        while let Some(c) = self.next() {
            self.buffer.push(c);
            if self.buffer.ends_with(delimiter) {
                self.buffer.truncate(self.buffer.len() - delimiter.len());
                return true;
            }
        }
        false
    }

    pub(crate) fn fetch_text(&self) -> Option<&str> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(&self.buffer)
        }
    }

    pub(crate) fn fetch_tag(&self) -> Option<&str> {
        let tag = self.buffer.trim();
        if tag.is_empty() {
            None
        } else {
            Some(tag)
        }
    }

    pub(crate) fn next(&mut self) -> Option<char> {
        if self.pos == self.text_after {
            if self.window_after < self.input.len() {
                self.next_window();
            } else {
                return None;
            }
        }
        let c = self.input[self.pos..].chars().next()?;
        self.last_len = c.len_utf8();
        self.pos += self.last_len;
        Some(c)
    }

    pub(crate) fn back(&mut self) {
        self.pos -= mem::take(&mut self.last_len);
    }

    pub(crate) fn set_delimiters(&mut self, open_delimiter: &str, close_delimiter: &str, is_update: bool) {
        let previous_open = mem::replace(&mut self.open_delimiter, open_delimiter.to_owned());
        let previous_close = mem::replace(&mut self.close_delimiter, close_delimiter.to_owned());

        // recover EOLs that may have been caught as multi-line comment with old delimiters
        if is_update && self.text_after == self.window_after {
            self.window_after = self.input.span_window(self.pos, open_delimiter, close_delimiter);
            let mut tags = self.input[self.window_start..self.pos]
                .trim_start()
                .split(previous_open.as_str());
            let not_standalone = tags.next().map_or(false, |head| !head.is_empty())
                || tags.any(|tag| !tag.ends_with(previous_close.as_str()));
            let standalone_close = if not_standalone
                || !self.input.is_standalone_open(self.pos, self.window_after, open_delimiter) {
                None
            } else {
                self.input.find_standalone_close(
                    self.pos + open_delimiter.len(), self.window_after, open_delimiter, close_delimiter
                )
            };
            self.text_after = standalone_close.map_or(
                self.window_after,
                |p| p + close_delimiter.len()
            );
        }
    }

    /// Start of a section body when the open tag was just read.
    ///
    /// Text trimmed after a standalone open tag is not part of the body.
    pub(crate) fn body_start(&self) -> usize {
        if self.pos == self.text_after && self.text_after < self.window_after {
            self.window_after
        } else {
            self.pos
        }
    }

    /// End of a section body when the close tag was just read.
    ///
    /// Indentation trimmed before a standalone close tag is not part of the body.
    pub(crate) fn body_end(&self) -> usize {
        if self.mark == self.text_start && self.text_start > self.window_start {
            self.window_start
        } else {
            self.mark
        }
    }

    fn next_window(&mut self) {
        self.window_start = self.window_after;
        self.window_after = self.input.span_window(
            self.window_start, &self.open_delimiter, &self.close_delimiter
        );
        let (start, after) = self.trim_standalone(self.window_start, self.window_after);
        self.text_start = start;
        self.text_after = after;
        self.pos = start;
    }

    fn trim_standalone(&self, start: usize, after: usize) -> (usize, usize) {
        let od = self.open_delimiter.as_str();
        let cd = self.close_delimiter.as_str();
        self.input.find_standalone_open(start, after, od)
            .and_then(|open| {
                self.input.find_standalone_close(open + od.len(), after, od, cd)
                    .map(|close| (open, close + cd.len()))
            })
            .unwrap_or((start, after))
    }
}


trait ReaderStringOps {
    fn span_window(&self, start: usize, open_delimiter: &str, close_delimiter: &str) -> usize;
    fn find_standalone_open(&self, start: usize, after: usize, open_delimiter: &str) -> Option<usize>;
    fn find_standalone_close(
        &self, start: usize, after: usize, open_delimiter: &str, close_delimiter: &str
    ) -> Option<usize>;
    fn is_standalone_open(&self, idx: usize, after: usize, open_delimiter: &str) -> bool;
    fn span_whitespace(&self, start: usize, after: usize) -> usize;
    fn ends_with_at(&self, suffix: &str, after: usize) -> bool;
}

impl ReaderStringOps for str {
    // return the position after the first EOL not inside a comment
    fn span_window(&self, start: usize, open_delimiter: &str, close_delimiter: &str) -> usize {
        let comment_open = format!("{}{}", open_delimiter, COMMENT_SIGIL);
        let mut in_comment = false;
        let mut after = start;
        for c in self[start..].chars() {
            after += c.len_utf8();
            if !in_comment && c == COMMENT_SIGIL {
                in_comment = self.ends_with_at(&comment_open, after);
            }
            if in_comment && self.ends_with_at(close_delimiter, after) {
                in_comment = false;
            }
            if !in_comment && c == '\n' {
                break;
            }
        }
        after
    }

    fn find_standalone_open(&self, start: usize, after: usize, open_delimiter: &str) -> Option<usize> {
        let idx = self.span_whitespace(start, after);
        self.is_standalone_open(idx, after, open_delimiter).then_some(idx)
    }

    // skip close delimiters immediately followed by another standalone tag,
    // the last one must be followed by whitespace only
    fn find_standalone_close(
        &self, start: usize, after: usize, open_delimiter: &str, close_delimiter: &str
    ) -> Option<usize> {
        let mut idx = self[start..].find(close_delimiter).map(|p| start + p);
        while let Some(p) = idx {
            let next = p + close_delimiter.len();
            if !self.is_standalone_open(next, after, open_delimiter) {
                break;
            }
            idx = self[next..].find(close_delimiter).map(|q| next + q);
        }
        idx.filter(|p| self.span_whitespace(p + close_delimiter.len(), after) == after)
    }

    fn is_standalone_open(&self, idx: usize, after: usize, open_delimiter: &str) -> bool {
        idx + open_delimiter.len() < after
            && self[idx..].starts_with(open_delimiter)
            && self[idx + open_delimiter.len()..after]
                .trim_start()
                .starts_with(|c: char| STRIPPABLE_SIGILS.contains(c))
    }

    fn span_whitespace(&self, start: usize, after: usize) -> usize {
        if start >= after {
            start
        } else {
            self[start..after]
                .find(|c: char| !c.is_whitespace())
                .map_or(after, |p| start + p)
        }
    }

    fn ends_with_at(&self, suffix: &str, after: usize) -> bool {
        self[..after].ends_with(suffix)
    }
}
