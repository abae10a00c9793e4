// src/build/lexer.rs

//! Tokenizer for the build-option mini-language.
//!
//! Tokens are keywords (a lowercase letter followed by letters of either
//! case), quoted literals, braces and end-of-input. Whitespace between
//! tokens carries no meaning. While tokenizing, the lexer does two more
//! things as side effects:
//!
//! - it renders a canonical reformatted copy of everything consumed so far
//!   (one directive per block line, four-space indent, single spaces
//!   elsewhere), which doubles as the snippet shown in diagnostics and as
//!   the output of the `format` command;
//! - it maintains a breadcrumb trail of the directives recognized so far,
//!   so an error deep inside a block can say where in the document it sits
//!   without quoting the whole input.
//!
//! Rendering lags one token behind the cursor. The current token is only
//! appended once the token after it is requested, which lets a diagnostic
//! flush the offending token into the snippet and point at its exact
//! column.

use thiserror::Error;

use crate::diag;

/// Canonical indentation, one level per enclosing block.
const INDENT: &str = "    ";

/// Diagnostics quote at most this many trailing canonical lines.
const MAX_SNIPPET_LINES: usize = 5;

/// Failure raised while lexing or parsing a build-option fragment.
///
/// `Display` yields the fully framed diagnostic; the accessors expose the
/// individual pieces for callers that want to reframe it.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct BuildOptionParseError {
    message: String,
    context: String,
    rendered: String,
}

impl BuildOptionParseError {
    /// The bare human message, without framing.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Space-joined breadcrumb trail. Empty when the error occurred before
    /// any directive was recognized.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The complete multi-line diagnostic.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

type LexResult<T> = Result<T, BuildOptionParseError>;

#[derive(Debug)]
pub struct Lexer {
    src: String,
    eoi: usize,
    lex_beg: usize,
    lex_end: usize,
    pos: usize,
    /// Token lexed but not yet rendered, as a byte range into `src`.
    pending: Option<(usize, usize)>,
    rendered: String,
    indent: usize,
    whitespace_before: bool,
    newline_before: bool,
    /// Character column where the most recently rendered token begins on
    /// its canonical line. Diagnostics point here.
    last_token_col: usize,
    crumbs: Vec<String>,
    /// Breadcrumb lengths saved at each open block, innermost last.
    forks: Vec<usize>,
}

impl Lexer {
    pub fn new(src: impl Into<String>) -> LexResult<Self> {
        let mut lx = Self {
            src: src.into(),
            eoi: 0,
            lex_beg: 0,
            lex_end: 0,
            pos: 0,
            pending: None,
            rendered: String::new(),
            indent: 0,
            whitespace_before: false,
            newline_before: false,
            last_token_col: 0,
            crumbs: Vec::new(),
            forks: Vec::new(),
        };
        lx.eoi = lx.src.len();
        if lx.src.contains('\t') {
            return Err(lx.error(
                "Lexical error: TAB characters are not allowed, replace them with spaces",
            ));
        }
        lx.skip_whitespace();
        Ok(lx)
    }

    /// Advance to the next token. Returns `self` so checks chain directly
    /// onto the advance.
    pub fn next(&mut self) -> LexResult<&mut Lexer> {
        self.emit_pending();
        self.lex_beg = self.pos;
        if self.pos < self.eoi {
            match self.src.as_bytes()[self.pos] {
                b'"' => {
                    self.pos += 1;
                    match self.src[self.pos..].find('"') {
                        Some(off) => self.pos = self.pos + off + 1,
                        None => {
                            // Show the fragment up to the line break so the
                            // pointer stays on the snippet's last line.
                            let cut = self.src[self.lex_beg..]
                                .find('\n')
                                .map_or(self.eoi, |i| self.lex_beg + i);
                            self.pos = self.eoi;
                            self.lex_end = self.eoi;
                            self.pending = Some((self.lex_beg, cut));
                            return Err(self.error("Lexical error: unterminated string literal"));
                        }
                    }
                }
                b'a'..=b'z' => {
                    self.pos += 1;
                    while self.pos < self.eoi
                        && self.src.as_bytes()[self.pos].is_ascii_alphabetic()
                    {
                        self.pos += 1;
                    }
                }
                b'{' | b'}' => self.pos += 1,
                _ => {
                    let ch = self.src[self.pos..].chars().next().map_or(1, char::len_utf8);
                    self.pos += ch;
                    self.lex_end = self.pos;
                    self.pending = Some((self.lex_beg, self.lex_end));
                    return Err(self.error("Lexical error: illegal character"));
                }
            }
        }
        self.lex_end = self.pos;
        self.pending = Some((self.lex_beg, self.lex_end));
        self.skip_whitespace();
        Ok(self)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.eoi {
            match self.src.as_bytes()[self.pos] {
                b' ' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn token(&self) -> &str {
        &self.src[self.lex_beg..self.lex_end]
    }

    /// Render the held-back token into the canonical buffer. Braces adjust
    /// indentation and force line breaks around themselves.
    fn emit_pending(&mut self) {
        let Some((beg, end)) = self.pending.take() else {
            return;
        };
        let mut newline_after = false;
        match &self.src[beg..end] {
            "{" => {
                self.indent += 1;
                newline_after = true;
            }
            "}" => {
                self.indent = self.indent.saturating_sub(1);
                self.newline_before = true;
                newline_after = true;
            }
            _ => {}
        }
        if self.whitespace_before {
            if self.newline_before {
                self.rendered.push('\n');
                self.rendered.push_str(&INDENT.repeat(self.indent));
            } else {
                self.rendered.push(' ');
            }
        }
        self.last_token_col = match self.rendered.rfind('\n') {
            Some(i) => self.rendered[i + 1..].chars().count(),
            None => self.rendered.chars().count(),
        };
        self.rendered.push_str(&self.src[beg..end]);
        self.newline_before = newline_after;
        self.whitespace_before = true;
    }

    /// Whether the current token is exactly `keyword`. A match lands on
    /// the breadcrumb trail.
    pub fn is_keyword(&mut self, keyword: &str) -> bool {
        if self.token() == keyword {
            self.crumbs.push(keyword.to_string());
            true
        } else {
            false
        }
    }

    /// The current token as an unquoted literal, or a syntax error.
    pub fn expect_literal(&mut self) -> LexResult<String> {
        if !self.src[self.lex_beg..].starts_with('"') {
            return Err(self.error("Syntax error: expected literal (quoted string)"));
        }
        self.crumbs.push(self.token().to_string());
        Ok(self.src[self.lex_beg + 1..self.lex_end - 1].to_string())
    }

    /// Require the current token to open a block. Records an arrow on the
    /// breadcrumb trail and saves a fork mark for later unwinding.
    pub fn expect_block_begin(&mut self) -> LexResult<()> {
        if self.token() != "{" {
            return Err(self.error("Syntax error: expected opening brace '{'"));
        }
        self.crumbs.push("->".to_string());
        self.forks.push(self.crumbs.len());
        Ok(())
    }

    /// Drop breadcrumbs recorded since the innermost fork, leaving a single
    /// ellipsis marker in their place.
    fn unwind(&mut self) {
        let mark = self.forks.last().copied().unwrap_or(0);
        if self.crumbs.len() > mark {
            self.crumbs.truncate(mark);
            self.crumbs.push("[...]".to_string());
        }
    }

    /// Whether the current token closes a block. Checked once per block
    /// entry, so it also starts a fresh canonical line.
    pub fn is_block_end(&mut self) -> bool {
        self.unwind();
        self.newline_before = true;
        if self.token() == "}" {
            self.forks.pop();
            true
        } else {
            false
        }
    }

    /// Whether the cursor has consumed the whole fragment. Checked once per
    /// top-level directive, so it also starts a fresh canonical line.
    pub fn is_end_of_input(&mut self) -> bool {
        self.unwind();
        self.newline_before = true;
        self.lex_beg == self.eoi
    }

    /// Whether the token after the current one is a quoted literal.
    pub fn lookahead_is_literal(&self) -> bool {
        self.src[self.pos..].starts_with('"')
    }

    /// Canonical rendering of everything tokenized so far.
    pub fn canonical(&self) -> &str {
        &self.rendered
    }

    /// Build a diagnostic positioned at the current token: the message, the
    /// breadcrumb trail, and the tail of the canonical rendering framed by
    /// tilde banners with a pointer at the token's column.
    pub fn error(&mut self, message: impl Into<String>) -> BuildOptionParseError {
        self.emit_pending();
        let message = message.into();
        let context = self.crumbs.join(" ");
        let mut out = message.clone();
        if !context.is_empty() {
            out.push_str("\nin context: ");
            out.push_str(&context);
        }
        if !self.rendered.is_empty() {
            let lines: Vec<&str> = self.rendered.split('\n').collect();
            let tail_from = lines.len().saturating_sub(MAX_SNIPPET_LINES);
            let tail = &lines[tail_from..];
            let banner = diag::banner(tail);
            out.push('\n');
            out.push_str(&banner);
            out.push('\n');
            if tail_from > 0 {
                out.push_str("[...]\n");
            }
            for line in tail {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(&banner);
            out.push('\n');
            out.push_str(&diag::pointer(self.last_token_col));
        }
        BuildOptionParseError {
            message,
            context,
            rendered: out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let mut lx = Lexer::new("").unwrap();
        assert!(lx.next().unwrap().is_end_of_input());
        assert_eq!(lx.canonical(), "");
    }

    #[test]
    fn test_single_keyword_drops_surrounding_whitespace() {
        let mut lx = Lexer::new("  skipTests \n").unwrap();
        assert!(!lx.next().unwrap().is_end_of_input());
        assert!(lx.is_keyword("skipTests"));
        assert!(lx.next().unwrap().is_end_of_input());
        assert_eq!(lx.canonical(), "skipTests");
    }

    #[test]
    fn test_keyword_comparison_is_exact() {
        let mut lx = Lexer::new("skipTest").unwrap();
        lx.next().unwrap();
        assert!(!lx.is_keyword("skipTests"));
        assert!(!lx.is_keyword("skip"));
        assert!(lx.is_keyword("skipTest"));
    }

    #[test]
    fn test_canonical_block_layout() {
        let mut lx = Lexer::new(r#"artifact "a:b" {file "f"}"#).unwrap();
        assert!(!lx.next().unwrap().is_end_of_input());
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        lx.next().unwrap().expect_block_begin().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        assert!(lx.is_keyword("file"));
        lx.next().unwrap().expect_literal().unwrap();
        assert!(lx.next().unwrap().is_block_end());
        assert!(lx.next().unwrap().is_end_of_input());
        assert_eq!(lx.canonical(), "artifact \"a:b\" {\n    file \"f\"\n}");
    }

    #[test]
    fn test_nested_blocks_indent_by_level() {
        let mut lx = Lexer::new(r#"artifact "a:b" { files { "f" "g" } }"#).unwrap();
        assert!(!lx.next().unwrap().is_end_of_input());
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        lx.next().unwrap().expect_block_begin().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        assert!(lx.is_keyword("files"));
        lx.next().unwrap().expect_block_begin().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        lx.expect_literal().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        lx.expect_literal().unwrap();
        assert!(lx.next().unwrap().is_block_end());
        assert!(lx.next().unwrap().is_block_end());
        assert!(lx.next().unwrap().is_end_of_input());
        assert_eq!(
            lx.canonical(),
            "artifact \"a:b\" {\n    files {\n        \"f\"\n        \"g\"\n    }\n}"
        );
    }

    #[test]
    fn test_tab_rejected_before_lexing() {
        let err = Lexer::new("a\tb").unwrap_err();
        assert_eq!(
            err.message(),
            "Lexical error: TAB characters are not allowed, replace them with spaces"
        );
        // Nothing was tokenized yet, so there is no snippet to frame.
        assert_eq!(err.rendered(), err.message());
    }

    #[test]
    fn test_unterminated_literal() {
        let mut lx = Lexer::new(r#"name "abc"#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("name"));
        let err = lx.next().unwrap_err();
        assert_eq!(err.message(), "Lexical error: unterminated string literal");
        assert!(err.rendered().contains("name \"abc"));
        assert!(err.rendered().ends_with("     ^--- here"));
    }

    #[test]
    fn test_illegal_character() {
        let mut lx = Lexer::new("skipTests $").unwrap();
        lx.next().unwrap();
        let err = lx.next().unwrap_err();
        assert_eq!(err.message(), "Lexical error: illegal character");
        assert!(err.rendered().contains("skipTests $"));
    }

    #[test]
    fn test_uppercase_cannot_start_a_token() {
        let mut lx = Lexer::new("Name").unwrap();
        let err = lx.next().unwrap_err();
        assert_eq!(err.message(), "Lexical error: illegal character");
    }

    #[test]
    fn test_expect_literal_rejects_keyword() {
        let mut lx = Lexer::new("mavenOption verbose").unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("mavenOption"));
        let err = lx.next().unwrap().expect_literal().unwrap_err();
        assert_eq!(err.message(), "Syntax error: expected literal (quoted string)");
        assert_eq!(err.context(), "mavenOption");
    }

    #[test]
    fn test_expect_block_begin_rejects_literal() {
        let mut lx = Lexer::new(r#"buildRequires "g:a""#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("buildRequires"));
        let err = lx.next().unwrap().expect_block_begin().unwrap_err();
        assert_eq!(err.message(), "Syntax error: expected opening brace '{'");
    }

    #[test]
    fn test_expect_block_begin_at_end_of_input() {
        let mut lx = Lexer::new(r#"artifact "a:b""#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        let err = lx.next().unwrap().expect_block_begin().unwrap_err();
        assert_eq!(err.message(), "Syntax error: expected opening brace '{'");
        assert_eq!(err.context(), "artifact \"a:b\"");
    }

    #[test]
    fn test_lookahead_is_literal() {
        let mut lx = Lexer::new(r#"removeParent "x""#).unwrap();
        lx.next().unwrap();
        assert!(lx.lookahead_is_literal());
        let mut lx = Lexer::new("removeParent }").unwrap();
        lx.next().unwrap();
        assert!(!lx.lookahead_is_literal());
    }

    #[test]
    fn test_breadcrumbs_record_path_into_block() {
        let mut lx = Lexer::new(r#"artifact "a:b" { package "x" package "y" }"#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        lx.next().unwrap().expect_block_begin().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        assert!(lx.is_keyword("package"));
        lx.next().unwrap().expect_literal().unwrap();
        assert!(!lx.next().unwrap().is_block_end());
        assert!(lx.is_keyword("package"));
        let err = lx.error("Semantic error: duplicate target package specified");
        assert_eq!(err.context(), "artifact \"a:b\" -> [...] package");
        assert!(err.rendered().contains("in context: artifact \"a:b\" -> [...] package"));
    }

    #[test]
    fn test_breadcrumb_ellipsis_never_repeats() {
        let mut lx = Lexer::new(r#"artifact "a:b" { file "1" file "2" file "3" }"#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        lx.next().unwrap().expect_block_begin().unwrap();
        for _ in 0..3 {
            assert!(!lx.next().unwrap().is_block_end());
            assert!(lx.is_keyword("file"));
            lx.next().unwrap().expect_literal().unwrap();
        }
        // Three entries were unwound across the loop, yet the trail carries
        // exactly one ellipsis.
        assert!(lx.next().unwrap().is_block_end());
        let err = lx.error("boom");
        assert_eq!(err.context(), "artifact \"a:b\" -> [...]");
    }

    #[test]
    fn test_snippet_elides_past_five_lines() {
        let mut lx =
            Lexer::new(r#"artifact "g:a" { file "1" file "2" file "3" file "4" file "5" file "6""#)
                .unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("artifact"));
        lx.next().unwrap().expect_literal().unwrap();
        lx.next().unwrap().expect_block_begin().unwrap();
        for _ in 0..6 {
            assert!(!lx.next().unwrap().is_block_end());
            assert!(lx.is_keyword("file"));
            lx.next().unwrap().expect_literal().unwrap();
        }
        let err = lx.error("boom");
        assert!(err.rendered().contains("\n[...]\n"));
        assert!(!err.rendered().contains("file \"1\""));
        assert!(err.rendered().contains("file \"6\""));
    }

    #[test]
    fn test_pointer_lands_on_offending_literal() {
        let mut lx = Lexer::new(r#"buildRequire "junitjunit""#).unwrap();
        lx.next().unwrap();
        assert!(lx.is_keyword("buildRequire"));
        lx.next().unwrap().expect_literal().unwrap();
        let err = lx.error("Syntax error: artifact coordinates must contain a colon");
        // The literal starts at column 13 of the canonical line.
        assert!(err.rendered().ends_with("  here ------^"));
    }
}
