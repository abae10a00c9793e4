// src/spec/parser.rs

//! Hand-written recursive-descent parser for spec documents.
//!
//! The parser works on a single in-memory buffer with one byte position.
//! Lookahead is expressed as `has(prefix)`, which consumes the prefix when
//! it matches. Comment lines are collected into a one-slot stack ahead of
//! each construct; the construct that owns them pops the slot. Collecting
//! twice without a pop, or popping an empty stack, is an internal error
//! surfaced as "comment stack overflow/underflow".
//!
//! Every failure is reported as a [`SpecParseError`] carrying the 1-based
//! line number and a rendered diagnostic with the offending source line
//! framed by tilde banners and a column pointer.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, trace};

use crate::diag;

use super::model::{
    BuildOpt, BuildSys, CondDep, Condition, DepKind, MacroDef, Pkg, Reldep, Script, ScriptKind,
    Spec, Tag,
};

/// Error raised when a spec document fails to parse.
///
/// `Display` prints the full rendered diagnostic, pointing at the exact
/// line and column where parsing stopped.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct SpecParseError {
    message: String,
    line: usize,
    rendered: String,
}

impl SpecParseError {
    /// The bare failure message, without source framing.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line number the parser stopped at.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The complete diagnostic: message, line number, framed source line
    /// and column pointer.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

type ParseResult<T> = Result<T, SpecParseError>;

// Matches the start of the next section directive, together with blank
// lines and a comment block directly attached to it, or end of input.
static SECTION_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\n*(#.*\n)*($|%(if|else|endif|global|define|bcond|bcond_with|bcond_without|build|changelog|clean|conf|description|files|install|package|post|posttrans|postun|pre|prep|pretrans|preun|trigger[a-z]+|verifyscript|transfiletrigger[a-z]+|filetrigger[a-z]+)( .*)?\n)",
    )
    .unwrap()
});

/// Recursive-descent parser over a complete spec document.
pub struct SpecParser {
    buf: String,
    pos: usize,
    comment: Option<Vec<String>>,
    comment_beg: usize,
    comment_end: usize,
}

impl SpecParser {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            buf: text.into(),
            pos: 0,
            comment: None,
            comment_beg: 0,
            comment_end: 0,
        }
    }

    /// Parse the whole document into a [`Spec`].
    pub fn parse(mut self) -> ParseResult<Spec> {
        trace!("Parsing spec document ({} bytes)", self.buf.len());
        self.init()?;
        let macros = self.parse_macro_defs(false)?;
        let main = self.parse_main_pkg()?;
        let mut subpackages = self.parse_subpackages(&main)?;
        let scripts = self.parse_scripts()?;
        let main = self.parse_main_files(main)?;
        self.parse_sub_files(&main, &mut subpackages)?;
        let changelog = self.parse_changelog()?;
        self.parse_eof()?;
        for pkg in &subpackages {
            if pkg.files().is_none() {
                return self.fail(format!("Incomplete files for pkg {}", pkg.name()));
            }
        }
        debug!(
            "Parsed spec for {}: {} subpackages, {} scripts",
            main.name(),
            subpackages.len(),
            scripts.len()
        );
        Ok(Spec::produce(macros, main, subpackages, scripts, changelog))
    }

    fn init(&mut self) -> ParseResult<()> {
        // Reject TABs upfront so the rest of the parser never sees them.
        if let Some(i) = self.buf.find('\t') {
            self.pos = i;
            return self.fail("TAB characters are not allowed, replace them with spaces");
        }
        self.parse_comment()
    }

    fn error(&self, msg: impl Into<String>) -> SpecParseError {
        let message = msg.into();
        let line = self.buf[..self.pos].matches('\n').count() + 1;
        let line_start = self.buf[..self.pos].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.buf[self.pos..]
            .find('\n')
            .map_or(self.buf.len(), |i| self.pos + i);
        let src = &self.buf[line_start..line_end];
        let banner = diag::banner(&[src]);
        let col = self.buf[line_start..self.pos].chars().count();
        let rendered = format!(
            "{message}\nat line {line}:\n{banner}\n{src}\n{banner}\n{}",
            diag::pointer(col)
        );
        SpecParseError {
            message,
            line,
            rendered,
        }
    }

    fn fail<T>(&self, msg: impl Into<String>) -> ParseResult<T> {
        Err(self.error(msg))
    }

    // ---- comment stack ----

    fn pop_comment(&mut self) -> ParseResult<Vec<String>> {
        match self.comment.take() {
            Some(list) => Ok(list),
            None => self.fail("comment stack underflow"),
        }
    }

    fn pop_comment_ignore(&mut self) -> ParseResult<()> {
        let comment = self.pop_comment()?;
        if !comment.is_empty() {
            self.pos = self.comment_beg;
            return self.fail("Comment is not allowed at this location");
        }
        Ok(())
    }

    fn parse_comment(&mut self) -> ParseResult<()> {
        if self.comment.is_some() {
            if self.pos != self.comment_end {
                return self.fail("comment stack overflow");
            }
            return Ok(());
        }
        let mut beg = None;
        let mut list = Vec::new();
        while self.pos < self.buf.len() {
            match self.peek() {
                Some('\n') => self.pos += 1,
                Some('#') => {
                    if beg.is_none() {
                        beg = Some(self.pos);
                    }
                    self.pos += 1;
                    // A single space after '#' is separator, not content.
                    if self.buf[self.pos..].starts_with(' ') {
                        self.pos += 1;
                    }
                    let b = self.pos;
                    self.pos = self.buf[self.pos..]
                        .find('\n')
                        .map_or(self.buf.len(), |i| self.pos + i);
                    list.push(self.buf[b..self.pos].to_string());
                }
                _ => break,
            }
        }
        self.comment = Some(list);
        self.comment_end = self.pos;
        self.comment_beg = beg.unwrap_or(self.pos);
        Ok(())
    }

    // ---- cursor primitives ----

    fn peek(&self) -> Option<char> {
        self.buf[self.pos..].chars().next()
    }

    fn has(&mut self, s: &str) -> bool {
        if self.buf[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn has_tag(&mut self, tag: &str) -> bool {
        let rest = &self.buf[self.pos..];
        if rest.starts_with(tag) && rest[tag.len()..].starts_with(':') {
            self.pos += tag.len() + 1;
            self.skip_space();
            true
        } else {
            false
        }
    }

    fn require(&mut self, s: &str) -> ParseResult<()> {
        if !self.has(s) {
            return self.fail(format!("Expected \"{s}\""));
        }
        Ok(())
    }

    fn require_nl(&mut self) -> ParseResult<()> {
        if !self.has("\n") {
            return self.fail("Expected new line");
        }
        Ok(())
    }

    fn skip_space(&mut self) {
        while self.buf[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn parse_until(&mut self, stops: &[char]) -> ParseResult<String> {
        let beg = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == beg {
            return self.fail("Expected at least one character from expected set");
        }
        Ok(self.buf[beg..self.pos].to_string())
    }

    fn parse_word(&mut self) -> ParseResult<String> {
        let beg = self.pos;
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\n' {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == beg {
            return self.fail("Expected at least one non-whitespace character");
        }
        Ok(self.buf[beg..self.pos].to_string())
    }

    fn parse_int(&mut self) -> ParseResult<u32> {
        if self.pos == self.buf.len() {
            return self.fail("Unexpected EOF");
        }
        if !self.buf[self.pos..].starts_with(|c: char| c.is_ascii_digit()) {
            return self.fail("Expected a digit");
        }
        let beg = self.pos;
        while self.buf[self.pos..].starts_with(|c: char| c.is_ascii_digit()) {
            self.pos += 1;
        }
        match self.buf[beg..self.pos].parse() {
            Ok(n) => Ok(n),
            Err(_) => self.fail("Number out of range"),
        }
    }

    /// Rest of the current line, then collect the comment block that
    /// follows it.
    fn parse_until_eol(&mut self) -> ParseResult<String> {
        let s = self.parse_until_eol_nc()?;
        self.parse_comment()?;
        Ok(s)
    }

    /// Rest of the current line, without touching the comment stack.
    fn parse_until_eol_nc(&mut self) -> ParseResult<String> {
        let beg = self.pos;
        self.pos = self.buf[self.pos..]
            .find('\n')
            .map_or(self.buf.len(), |i| self.pos + i);
        if self.pos == beg {
            return self.fail("Expected at least one character before EOL");
        }
        let s = self.buf[beg..self.pos].to_string();
        if self.pos < self.buf.len() {
            self.pos += 1;
        }
        Ok(s)
    }

    // ---- macro definitions ----

    // Zero or more macro definitions. The outermost run may contain one
    // %if/%else/%endif wrapper; the runs inside the wrapper may not.
    fn parse_macro_defs(&mut self, nested: bool) -> ParseResult<Vec<MacroDef>> {
        let mut list = Vec::new();
        loop {
            if let Some(def) = self.try_parse_macro_def()? {
                list.push(def);
            } else if !nested && self.has("%if ") {
                let c0 = self.pop_comment()?;
                let cond = self.parse_until_eol()?;
                list.push(MacroDef::new(format!("%if {cond}"), c0));
                list.extend(self.parse_macro_defs(true)?);
                if self.has("%else\n") {
                    let c = self.pop_comment()?;
                    list.push(MacroDef::new("%else", c));
                    self.parse_comment()?;
                    list.extend(self.parse_macro_defs(true)?);
                }
                self.require("%endif")?;
                self.require_nl()?;
                let c = self.pop_comment()?;
                list.push(MacroDef::new("%endif", c));
                self.parse_comment()?;
            } else {
                return Ok(list);
            }
        }
    }

    // A single macro definition (%global, %define, %bcond family).
    fn try_parse_macro_def(&mut self) -> ParseResult<Option<MacroDef>> {
        for kw in ["%define", "%global", "%bcond"] {
            if self.has(&format!("{kw} ")) {
                let c = self.pop_comment()?;
                let key = self.parse_word()?;
                self.skip_space();
                let val = self.parse_until_eol()?;
                return Ok(Some(MacroDef::new(format!("{kw} {key} {val}"), c)));
            }
        }
        for kw in ["%bcond_with", "%bcond_without"] {
            if self.has(&format!("{kw} ")) {
                let c = self.pop_comment()?;
                let key = self.parse_until_eol()?;
                return Ok(Some(MacroDef::new(format!("{kw} {key}"), c)));
            }
        }
        Ok(None)
    }

    // ---- tags ----

    // Main package declaration: global tags, dependencies, optional build
    // system and the main description.
    fn parse_main_pkg(&mut self) -> ParseResult<Pkg> {
        let tags = self.parse_global_tags()?;
        let deps = self.parse_deps()?;
        let build_sys = self.try_parse_build_system()?;
        let description = self.parse_description_main()?;
        // parse_global_tags guarantees the Name tag comes first.
        let pkg_name = tags[0].value().to_string();
        Ok(Pkg::new(pkg_name)
            .with_tags(tags)
            .with_deps(deps)
            .with_build_sys(build_sys)
            .with_description(description))
    }

    fn parse_global_tags(&mut self) -> ParseResult<Vec<Tag>> {
        let mut list = Vec::new();
        if !self.has_tag("Name") {
            return self.fail("Expected Name tag");
        }
        list.push(self.parse_tag(1, "Name")?);
        while let Some(tag) = self.try_parse_global_tag()? {
            list.push(tag);
        }
        Ok(list)
    }

    fn parse_tag(&mut self, prec: u32, name: &str) -> ParseResult<Tag> {
        let c = self.pop_comment()?;
        let val = self.parse_until_eol()?;
        Ok(Tag::new(prec, name, val, c))
    }

    // A tag that can appear in global context only.
    fn try_parse_global_tag(&mut self) -> ParseResult<Option<Tag>> {
        if self.has_tag("URL") {
            return self.parse_tag(7, "URL").map(Some);
        }
        if self.has_tag("VCS") {
            return self.parse_tag(8, "VCS").map(Some);
        }
        if self.has_tag("ExclusiveArch") {
            return self.parse_tag(10, "ExclusiveArch").map(Some);
        }
        if self.has_tag("Source") {
            return self.parse_tag(999, "Source").map(Some);
        }
        if self.has("Source") {
            let c = self.pop_comment()?;
            let n = self.parse_int()?;
            self.require(":")?;
            self.skip_space();
            let val = self.parse_until_eol()?;
            return Ok(Some(Tag::new(1000 + n, format!("Source{n}"), val, c)));
        }
        if self.has_tag("Patch") {
            return self.parse_tag(9999, "Patch").map(Some);
        }
        self.try_parse_pkg_tag()
    }

    // A tag valid on both the main package and subpackages.
    fn try_parse_pkg_tag(&mut self) -> ParseResult<Option<Tag>> {
        for (prec, name) in [
            (2, "Epoch"),
            (3, "Version"),
            (4, "Release"),
            (5, "Summary"),
            (6, "License"),
            (9, "BuildArch"),
        ] {
            if self.has_tag(name) {
                return self.parse_tag(prec, name).map(Some);
            }
        }
        Ok(None)
    }

    // ---- dependencies ----

    // Zero or more dependency lines, possibly wrapped in %if/%else/%endif.
    // Conditional blocks are flattened: each inner dependency carries its
    // own copy of the (possibly negated) condition.
    fn parse_deps(&mut self) -> ParseResult<Vec<CondDep>> {
        let mut list = Vec::new();
        loop {
            if self.has("%if ") {
                let c = self.pop_comment()?;
                let cond = Condition::new(self.parse_until_eol()?);
                for dep in self.parse_deps()? {
                    if dep.condition().is_some() {
                        return self.fail("Semantic error: nested conditions");
                    }
                    list.push(dep.with_condition(cond.clone()).with_comments(&c));
                }
                if self.has("%else\n") {
                    let c2 = self.pop_comment()?;
                    self.parse_comment()?;
                    let cond2 = cond.negate();
                    for dep in self.parse_deps()? {
                        if dep.condition().is_some() {
                            return self.fail("Semantic error: nested conditions");
                        }
                        list.push(dep.with_condition(cond2.clone()).with_comments(&c2));
                    }
                }
                self.require("%endif")?;
                self.require_nl()?;
                self.pop_comment_ignore()?;
                self.parse_comment()?;
            } else if let Some(dep) = self.try_parse_dep()? {
                list.push(dep);
            } else {
                return Ok(list);
            }
        }
    }

    fn try_parse_dep(&mut self) -> ParseResult<Option<CondDep>> {
        for kind in [
            DepKind::BuildRequires,
            DepKind::Requires,
            DepKind::Provides,
            DepKind::Obsoletes,
            DepKind::Suggests,
        ] {
            if self.has_tag(kind.tag_name()) {
                let c = self.pop_comment()?;
                let reldep = self.parse_reldep()?;
                return Ok(Some(CondDep::new(kind, reldep, c)));
            }
        }
        Ok(None)
    }

    // A dependency string: bare name, name with relation operator and
    // version, or a parenthesized boolean expression taken verbatim.
    fn parse_reldep(&mut self) -> ParseResult<Reldep> {
        if self.has("(") {
            let val = format!("({}", self.parse_until_eol()?);
            return Ok(Reldep::rich(val));
        }
        let id = self.parse_until(&['<', '>', '=', ' ', '\n'])?;
        self.skip_space();
        if self.has("\n") {
            self.parse_comment()?;
            return Ok(Reldep::simple(id));
        }
        // Two-character operators first so "<=" is not read as "<".
        for sense in ["<=", ">=", "<", ">", "="] {
            if self.has(sense) {
                self.skip_space();
                let evr = self.parse_until_eol()?;
                return Ok(Reldep::versioned(id, sense, evr));
            }
        }
        self.fail("Expect relation operator < <= = >= = or EOL")
    }

    // ---- build system ----

    fn try_parse_build_system(&mut self) -> ParseResult<Option<BuildSys>> {
        if !self.has_tag("BuildSystem") {
            return Ok(None);
        }
        let c = self.pop_comment()?;
        self.require("maven")?;
        self.require_nl()?;
        self.parse_comment()?;
        let mut opts = Vec::new();
        while self.has_tag("BuildOption") {
            let oc = self.pop_comment()?;
            let val = self.parse_until_eol()?;
            opts.push(BuildOpt::new(val, oc));
        }
        Ok(Some(BuildSys::new(opts, c)))
    }

    // ---- sections ----

    fn parse_description_main(&mut self) -> ParseResult<Vec<String>> {
        self.require("%description")?;
        self.require_nl()?;
        self.pop_comment_ignore()?;
        self.parse_section()
    }

    // Verbatim text up to the next section directive. The text is kept as
    // a single entry so a later regeneration reproduces it byte for byte.
    fn parse_section(&mut self) -> ParseResult<Vec<String>> {
        assert!(self.comment.is_none());
        let Some(m) = SECTION_BOUNDARY.find(&self.buf[self.pos..]) else {
            return self.fail("Unable to determine section boundary");
        };
        let beg = self.pos;
        self.pos += m.start();
        let content = self.buf[beg..self.pos].to_string();
        self.parse_comment()?;
        if content.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![content])
        }
    }

    // ---- subpackages ----

    fn parse_subpackages(&mut self, main: &Pkg) -> ParseResult<Vec<Pkg>> {
        let mut list: Vec<Pkg> = Vec::new();
        while let Some(pkg) = self.try_parse_subpackage(main)? {
            if list.iter().any(|p| p.name() == pkg.name()) {
                return self.fail(format!("Duplicate package {}", pkg.name()));
            }
            list.push(pkg);
        }
        Ok(list)
    }

    // A %package declaration followed by its matching %description.
    fn try_parse_subpackage(&mut self, main: &Pkg) -> ParseResult<Option<Pkg>> {
        let prefixed = if self.has("%package -n") {
            false
        } else if self.has("%package ") {
            true
        } else {
            return Ok(None);
        };
        self.pop_comment_ignore()?;
        self.skip_space();
        let name = self.parse_until_eol()?;
        let tags = self.parse_subpackage_tags()?;
        let deps = self.parse_deps()?;
        self.pop_comment_ignore()?;
        if prefixed {
            self.require("%description ")?;
        } else {
            self.require("%description -n")?;
        }
        self.skip_space();
        let name2 = self.parse_until_eol_nc()?;
        if name2 != name {
            return self.fail(
                "Package name of %description does not match that of the preceding %package",
            );
        }
        let desc = self.parse_section()?;
        let pkg = if prefixed {
            Pkg::prefixed(main.name(), &name)
        } else {
            Pkg::new(name)
        };
        Ok(Some(
            pkg.with_tags(tags).with_deps(deps).with_description(desc),
        ))
    }

    fn parse_subpackage_tags(&mut self) -> ParseResult<Vec<Tag>> {
        let mut list = Vec::new();
        while let Some(tag) = self.try_parse_pkg_tag()? {
            list.push(tag);
        }
        Ok(list)
    }

    // ---- scripts ----

    fn parse_scripts(&mut self) -> ParseResult<Vec<Script>> {
        let mut list: Vec<Script> = Vec::new();
        while let Some(script) = self.try_parse_script()? {
            if list.iter().any(|s| s.kind() == script.kind()) {
                return self.fail(format!("Duplicate script {}", script.kind()));
            }
            list.push(script);
        }
        Ok(list)
    }

    fn try_parse_script(&mut self) -> ParseResult<Option<Script>> {
        for kind in ScriptKind::iter() {
            if self.has(&format!("%{}\n", kind.section_name())) {
                self.pop_comment_ignore()?;
                let lines = self.parse_section()?;
                return Ok(Some(Script::new(kind, lines)));
            }
        }
        Ok(None)
    }

    // ---- file lists ----

    // Zero or one %files section for the main package.
    fn parse_main_files(&mut self, main: Pkg) -> ParseResult<Pkg> {
        if self.has("%files\n") {
            self.pop_comment_ignore()?;
            let files = self.parse_section()?;
            return Ok(main.with_files(files));
        }
        if self.has("%files -f") {
            self.pop_comment_ignore()?;
            let mut mfiles = Vec::new();
            loop {
                self.skip_space();
                mfiles.push(self.parse_word()?);
                self.skip_space();
                if !self.has("-f") {
                    break;
                }
            }
            self.require_nl()?;
            let files = self.parse_section()?;
            return Ok(main.with_mfiles(mfiles).with_files(files));
        }
        Ok(main)
    }

    // Zero or more %files sections for subpackages. A repeated section for
    // the same subpackage replaces the earlier one.
    fn parse_sub_files(&mut self, main: &Pkg, subpackages: &mut [Pkg]) -> ParseResult<()> {
        while self.has("%files ") {
            self.pop_comment_ignore()?;
            self.skip_space();
            let prefixed = !self.has("-n");
            self.skip_space();
            let name = self.parse_word()?;
            let full_name = if prefixed {
                format!("{}-{}", main.name(), name)
            } else {
                name
            };
            let Some(i) = subpackages.iter().position(|p| p.name() == full_name) else {
                return self.fail(format!("Subpackage {full_name} was not declared"));
            };
            let mut mfiles = Vec::new();
            self.skip_space();
            while self.has("-f") {
                self.skip_space();
                mfiles.push(self.parse_word()?);
                self.skip_space();
            }
            self.require_nl()?;
            let files = self.parse_section()?;
            subpackages[i] = subpackages[i].clone().with_mfiles(mfiles).with_files(files);
        }
        Ok(())
    }

    // ---- tail ----

    fn parse_changelog(&mut self) -> ParseResult<Vec<String>> {
        self.require("%changelog")?;
        self.require_nl()?;
        self.pop_comment_ignore()?;
        self.parse_section()
    }

    fn parse_eof(&mut self) -> ParseResult<()> {
        if self.pos != self.buf.len() {
            return self.fail("Expected EOF");
        }
        self.pop_comment_ignore()
    }
}

impl Spec {
    /// Parse a complete spec document.
    pub fn parse(text: &str) -> Result<Spec, SpecParseError> {
        SpecParser::new(text).parse()
    }
}

impl FromStr for Spec {
    type Err = SpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Spec::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "Name: foo\n%description\nTest package.\n%changelog\n";

    const IVY: &str = "\
%bcond_with checks
Name: apache-ivy
Version: 2.5.2
Release: 5%{?dist}
Summary: Agile dependency manager
License: Apache-2.0
URL: https://ant.apache.org/ivy/
Source: ivy.tar.gz
BuildRequires: maven-local
%if %{with checks}
BuildRequires: junit
%endif
BuildSystem:    maven
BuildOption:    skipTests
%description
Apache Ivy is a tool for managing project dependencies.
%package javadoc
Summary: API documentation for ivy
%description javadoc
Javadoc for ivy.
%build
%mvn_build
%files
%license LICENSE
%files javadoc
%doc api
%changelog
* Mon Jan 01 2024 Dev <dev@example.com> - 2.5.2-5
- Update to 2.5.2
";

    fn parse_err(doc: &str) -> SpecParseError {
        match Spec::parse(doc) {
            Ok(_) => panic!("expected parse failure"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_parse_minimal() {
        let spec = Spec::parse(MINIMAL).unwrap();
        assert_eq!(spec.main_pkg().name(), "foo");
        assert_eq!(spec.main_pkg().description(), ["Test package.".to_string()]);
        assert!(spec.changelog().is_empty());
        assert!(spec.subpackages().is_empty());
        assert!(spec.scripts().is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let spec = Spec::parse(IVY).unwrap();
        let main = spec.main_pkg();
        assert_eq!(main.name(), "apache-ivy");
        assert_eq!(main.tags().len(), 7);
        assert_eq!(main.tags()[0].name(), "Name");
        assert_eq!(main.deps().len(), 2);
        assert_eq!(spec.subpackages().len(), 1);
        assert_eq!(spec.subpackages()[0].name(), "apache-ivy-javadoc");
        assert_eq!(spec.scripts().len(), 1);
        assert_eq!(spec.scripts()[0].kind(), ScriptKind::Build);
        assert_eq!(spec.build_option_text().as_deref(), Some("skipTests"));
        assert_eq!(
            spec.changelog(),
            ["* Mon Jan 01 2024 Dev <dev@example.com> - 2.5.2-5\n- Update to 2.5.2".to_string()]
        );
    }

    #[test]
    fn test_reject_tab() {
        let e = parse_err("Name:\tfoo\n%description\nx\n%changelog\n");
        assert_eq!(
            e.message(),
            "TAB characters are not allowed, replace them with spaces"
        );
        assert_eq!(e.line(), 1);
    }

    #[test]
    fn test_comment_attaches_to_tag() {
        let doc = "# the name\nName: foo\n%description\nx\n%changelog\n";
        let spec = Spec::parse(doc).unwrap();
        assert_eq!(spec.main_pkg().tags()[0].comment(), ["the name".to_string()]);
    }

    #[test]
    fn test_macro_defs_with_conditional_wrapper() {
        let doc = "\
%bcond_with checks
%if %{with checks}
%global extra_flags -X
%else
%global extra_flags -q
%endif
Name: foo
%description
x
%changelog
";
        let spec = Spec::parse(doc).unwrap();
        let lines: Vec<&str> = spec.macros().iter().map(MacroDef::line).collect();
        assert_eq!(
            lines,
            [
                "%bcond_with checks",
                "%if %{with checks}",
                "%global extra_flags -X",
                "%else",
                "%global extra_flags -q",
                "%endif",
            ]
        );
    }

    #[test]
    fn test_conditional_deps_flatten() {
        let doc = "\
Name: foo
%if %{with checks}
BuildRequires: junit
%else
BuildRequires: stub
%endif
%description
x
%changelog
";
        let spec = Spec::parse(doc).unwrap();
        let deps = spec.main_pkg().deps();
        assert_eq!(deps.len(), 2);
        let c0 = deps[0].condition().unwrap();
        let c1 = deps[1].condition().unwrap();
        assert_eq!(c0.expr(), "%{with checks}");
        assert!(!c0.is_negated());
        assert_eq!(c1.expr(), "%{with checks}");
        assert!(c1.is_negated());
    }

    #[test]
    fn test_nested_conditions_rejected() {
        let doc = "\
Name: foo
%if a
%if b
Requires: x
%endif
%endif
%description
x
%changelog
";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Semantic error: nested conditions");
    }

    #[test]
    fn test_versioned_reldep_operators() {
        let doc = "\
Name: foo
BuildRequires: maven-local >= 5.0
Requires: bar <= 2.1
%description
x
%changelog
";
        let spec = Spec::parse(doc).unwrap();
        let deps = spec.main_pkg().deps();
        assert_eq!(deps[0].reldep(), &Reldep::versioned("maven-local", ">=", "5.0"));
        assert_eq!(deps[1].reldep(), &Reldep::versioned("bar", "<=", "2.1"));
    }

    #[test]
    fn test_rich_reldep() {
        let doc = "Name: foo\nRequires: (a if b)\n%description\nx\n%changelog\n";
        let spec = Spec::parse(doc).unwrap();
        assert_eq!(
            spec.main_pkg().deps()[0].reldep(),
            &Reldep::rich("(a if b)")
        );
    }

    #[test]
    fn test_numbered_source_tag() {
        let doc = "Name: foo\nSource1:     extra.tar.gz\n%description\nx\n%changelog\n";
        let spec = Spec::parse(doc).unwrap();
        let tag = &spec.main_pkg().tags()[1];
        assert_eq!(tag.name(), "Source1");
        assert_eq!(tag.precedence(), 1001);
        assert_eq!(tag.value(), "extra.tar.gz");
    }

    #[test]
    fn test_duplicate_script_rejected() {
        let doc = "\
Name: foo
%description
x
%build
a
%build
b
%changelog
";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Duplicate script build");
    }

    #[test]
    fn test_undeclared_subpackage_files() {
        let doc = "\
Name: foo
%description
x
%files sub
/usr/share/doc
%changelog
";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Subpackage foo-sub was not declared");
    }

    #[test]
    fn test_description_name_mismatch() {
        let doc = "\
Name: foo
%description
x
%package javadoc
%description wrong
y
%changelog
";
        let e = parse_err(doc);
        assert_eq!(
            e.message(),
            "Package name of %description does not match that of the preceding %package"
        );
    }

    #[test]
    fn test_subpackage_without_files() {
        let doc = "\
Name: foo
%description
x
%package javadoc
%description javadoc
y
%changelog
";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Incomplete files for pkg foo-javadoc");
    }

    #[test]
    fn test_trailing_content_rejected() {
        let doc = "Name: foo\n%description\nx\n%changelog\n* entry\n%build\ny\n";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Expected EOF");
    }

    #[test]
    fn test_comment_not_allowed_before_script() {
        let doc = "\
Name: foo
%description
x
# stray comment
%build
y
%changelog
";
        let e = parse_err(doc);
        assert_eq!(e.message(), "Comment is not allowed at this location");
        assert_eq!(e.line(), 4);
    }

    #[test]
    fn test_main_files_with_lists() {
        let doc = "\
Name: foo
%description
x
%files -f first.list -f second.list
/usr/bin/foo
%changelog
";
        let spec = Spec::parse(doc).unwrap();
        let main = spec.main_pkg();
        assert_eq!(main.mfiles(), ["first.list".to_string(), "second.list".to_string()]);
        assert_eq!(main.files(), Some(&["/usr/bin/foo".to_string()][..]));
    }

    #[test]
    fn test_unprefixed_subpackage() {
        let doc = "\
Name: foo
%description
x
%package -n standalone
%description -n standalone
y
%files -n standalone
/opt/standalone
%changelog
";
        let spec = Spec::parse(doc).unwrap();
        assert_eq!(spec.subpackages()[0].name(), "standalone");
        assert_eq!(
            spec.subpackages()[0].files(),
            Some(&["/opt/standalone".to_string()][..])
        );
    }

    #[test]
    fn test_error_rendering_near_column() {
        let e = parse_err("Name foo\n%description\nx\n%changelog\n");
        assert_eq!(e.message(), "Expected Name tag");
        let rendered = e.rendered();
        assert!(rendered.contains("at line 1:\n"));
        assert!(rendered.contains("~~~~~~~~~~\nName foo\n~~~~~~~~~~\n"));
        assert!(rendered.ends_with("^--- here"));
    }

    #[test]
    fn test_error_rendering_deep_column() {
        // Column 19, past the threshold for the dashed pointer form.
        let e = parse_err("Name: foo\nBuildRequires: bar baz\n%description\nx\n%changelog\n");
        assert_eq!(e.message(), "Expect relation operator < <= = >= = or EOL");
        assert!(e.rendered().ends_with("  here ------------^"));
        assert_eq!(e.line(), 2);
    }
}
