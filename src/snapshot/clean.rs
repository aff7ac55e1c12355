//! Comment and string masking for pattern-based extraction.
//!
//! Both masks keep the input's byte length and every newline, so byte offsets
//! and line numbers found in masked text are valid in the original source.

/// What to blank out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mask {
    /// Comments only; string literals are kept verbatim.
    Comments,
    /// Comments and the contents of string, template and regex literals.
    CommentsAndStrings,
}

/// Replaces comments with spaces, keeping string literals intact.
#[must_use]
pub fn strip_comments(source: &str) -> String {
    scrub(source, Mask::Comments)
}

/// Replaces comments and literal contents with spaces.
///
/// Quote characters are kept so `import '...'` still looks like an import
/// with a (blank) specifier.
#[must_use]
pub fn strip_comments_and_strings(source: &str) -> String {
    scrub(source, Mask::CommentsAndStrings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
    Template,
    Regex { in_class: bool },
}

fn scrub(source: &str, mask: Mask) -> String {
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();
    // Last significant character emitted in code, used to tell a regex
    // literal from a division operator.
    let mut prev_significant: Option<char> = None;
    let mut prev_word = String::new();
    let mut last_char = ' ';

    let blank = |out: &mut String, c: char| {
        if c == '\n' {
            out.push('\n');
        } else {
            for _ in 0..c.len_utf8() {
                out.push(' ');
            }
        }
    };

    while let Some(c) = chars.next() {
        let in_code = state == State::Code;
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '/' if regex_may_start(prev_significant, &prev_word) => {
                    out.push('/');
                    state = State::Regex { in_class: false };
                }
                '\'' | '"' => {
                    out.push(c);
                    state = State::Quoted(c);
                }
                '`' => {
                    out.push(c);
                    state = State::Template;
                }
                _ => {
                    out.push(c);
                    if is_word_char(c) {
                        if !is_word_char(last_char) {
                            prev_word.clear();
                        }
                        prev_word.push(c);
                    } else if !c.is_whitespace() {
                        prev_word.clear();
                    }
                    if !c.is_whitespace() {
                        prev_significant = Some(c);
                    }
                }
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Quoted(quote) => {
                if c == '\\' {
                    emit(&mut out, c, mask, blank);
                    if let Some(escaped) = chars.next() {
                        emit(&mut out, escaped, mask, blank);
                    }
                } else if c == quote {
                    out.push(c);
                    state = State::Code;
                    prev_significant = Some(c);
                    prev_word.clear();
                } else if c == '\n' {
                    // Unterminated literal: recover at the line break.
                    out.push('\n');
                    state = State::Code;
                } else {
                    emit(&mut out, c, mask, blank);
                }
            }
            State::Template => {
                if c == '\\' {
                    emit(&mut out, c, mask, blank);
                    if let Some(escaped) = chars.next() {
                        emit(&mut out, escaped, mask, blank);
                    }
                } else if c == '`' {
                    out.push(c);
                    state = State::Code;
                    prev_significant = Some(c);
                    prev_word.clear();
                } else {
                    emit(&mut out, c, mask, blank);
                }
            }
            State::Regex { in_class } => {
                if c == '\\' {
                    emit(&mut out, c, mask, blank);
                    if let Some(escaped) = chars.next() {
                        emit(&mut out, escaped, mask, blank);
                    }
                } else if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else if c == '[' {
                    emit(&mut out, c, mask, blank);
                    state = State::Regex { in_class: true };
                } else if c == ']' && in_class {
                    emit(&mut out, c, mask, blank);
                    state = State::Regex { in_class: false };
                } else if c == '/' && !in_class {
                    out.push('/');
                    state = State::Code;
                    prev_significant = Some('/');
                    prev_word.clear();
                } else {
                    emit(&mut out, c, mask, blank);
                }
            }
        }
        last_char = if in_code { c } else { ' ' };
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn emit(out: &mut String, c: char, mask: Mask, blank: impl Fn(&mut String, char)) {
    match mask {
        Mask::Comments => out.push(c),
        Mask::CommentsAndStrings => blank(out, c),
    }
}

/// A `/` starts a regex literal after an operator, an opening bracket, a
/// separator, or a keyword such as `return`.
fn regex_may_start(prev: Option<char>, prev_word: &str) -> bool {
    match prev {
        None => true,
        Some(c) if "(,=:[!&|?{};+-*%<>~^".contains(c) => true,
        Some(c) if is_word_char(c) => {
            matches!(prev_word, "return" | "typeof" | "case" | "do" | "else" | "in" | "of" | "void")
        }
        _ => false,
    }
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes the line starts of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Returns the 1-based line containing `offset`.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(next) => next,
        }
    }

    /// Returns the 0-based column of `offset` within its line.
    #[must_use]
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.starts[line - 1]
    }
}

/// Finds the byte offset of the bracket closing the one at `open`.
///
/// Expects masked text so brackets inside literals are already gone.
#[must_use]
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let (opening, closing) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == opening {
            depth += 1;
        } else if b == closing {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Splits `text` on commas that are not nested inside brackets.
#[must_use]
pub fn split_top_level(text: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        let arrow = c == '>' && prev == '=';
        prev = c;
        match c {
            '(' | '{' | '[' | '<' => depth += 1,
            '>' if arrow => {}
            ')' | '}' | ']' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        parts.push((start, &text[start..]));
    }
    parts.retain(|(_, part)| !part.trim().is_empty());
    parts
}

/// Brace depth at the start of every line of masked text.
#[must_use]
pub fn line_depths(masked: &str) -> Vec<i32> {
    let mut depths = Vec::new();
    let mut depth = 0i32;
    for line in masked.split('\n') {
        depths.push(depth);
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }
    }
    depths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_blanked_and_lengths_preserved() {
        let src = "const a = 1; // trailing\n/* block\n comment */ const b = 2;";
        let out = strip_comments(src);
        assert_eq!(out.len(), src.len());
        assert!(!out.contains("trailing"));
        assert!(!out.contains("block"));
        assert!(out.contains("const b = 2;"));
        assert_eq!(out.matches('\n').count(), 2);
    }

    #[test]
    fn strings_survive_comment_stripping_only() {
        let src = "import x from './x'; // './y'";
        assert!(strip_comments(src).contains("'./x'"));
        let masked = strip_comments_and_strings(src);
        assert!(!masked.contains("./x"));
        assert!(masked.starts_with("import x from '   '"));
    }

    #[test]
    fn comment_markers_inside_strings_are_not_comments() {
        let src = "const url = 'http://example.com'; foo();";
        let out = strip_comments(src);
        assert!(out.contains("foo();"));
        assert!(out.contains("http://example.com"));
    }

    #[test]
    fn regex_literals_are_not_comments() {
        let src = "const re = /\\/\\/x/g; bar();";
        let out = strip_comments_and_strings(src);
        assert!(out.contains("bar();"));
    }

    #[test]
    fn division_is_not_a_regex() {
        let src = "const half = total / 2; const b = 'x';";
        let out = strip_comments_and_strings(src);
        assert!(out.contains("total / 2"));
        assert!(out.contains("const b = ' ';"));
    }

    #[test]
    fn multibyte_content_keeps_byte_length() {
        let src = "const s = 'héllo'; // ünïcode\nx();";
        let out = strip_comments_and_strings(src);
        assert_eq!(out.len(), src.len());
        assert!(out.ends_with("\nx();"));
    }

    #[test]
    fn line_index_maps_offsets() {
        let text = "a\nbc\n\nd";
        let index = LineIndex::new(text);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
        assert_eq!(index.column_of(3), 1);
    }

    #[test]
    fn matching_close_skips_nested_brackets() {
        let text = "f(a, (b), c) + 1";
        assert_eq!(matching_close(text, 1), Some(11));
    }

    #[test]
    fn split_top_level_respects_nesting() {
        let parts: Vec<&str> =
            split_top_level("a, { b, c }, d = f(1, 2)").into_iter().map(|(_, p)| p.trim()).collect();
        assert_eq!(parts, vec!["a", "{ b, c }", "d = f(1, 2)"]);
    }
}
