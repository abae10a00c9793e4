// src/spec/model.rs

//! Value types making up a parsed spec document.
//!
//! Everything here is created once by the parser and immutable afterwards.
//! Updates are expressed as "with-field" methods returning a new value,
//! never by mutation in place. Value types (`Condition`, `Reldep`) use
//! structural equality so the generator can group and sort them reliably.

use std::fmt;

use strum_macros::EnumIter;

/// One header field assignment, e.g. `Version: 1.2.3`.
///
/// The precedence rank is fixed per tag kind and drives the optional
/// stable sort during generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    prec: u32,
    name: String,
    value: String,
    comment: Vec<String>,
}

impl Tag {
    pub fn new(
        prec: u32,
        name: impl Into<String>,
        value: impl Into<String>,
        comment: Vec<String>,
    ) -> Self {
        Self {
            prec,
            name: name.into(),
            value: value.into(),
            comment,
        }
    }

    pub fn precedence(&self) -> u32 {
        self.prec
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Comment lines attached directly above the tag, `#` prefix stripped.
    pub fn comment(&self) -> &[String] {
        &self.comment
    }
}

/// A build condition: verbatim boolean expression text plus a negation flag.
///
/// Equality is structural; the generator relies on it to decide whether two
/// consecutive dependencies share an `%if` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    expr: String,
    negated: bool,
}

impl Condition {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            negated: false,
        }
    }

    /// The same condition with the negation flag flipped (the `%else` side).
    pub fn negate(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            negated: !self.negated,
        }
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not({})", self.expr)
        } else {
            f.write_str(&self.expr)
        }
    }
}

/// A dependency expression as RPM understands it.
///
/// Either a bare name, a name constrained by a comparison operator and
/// version, or a verbatim parenthesized boolean ("rich") expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reldep {
    Simple(String),
    Versioned {
        name: String,
        sense: String,
        evr: String,
    },
    Rich(String),
}

impl Reldep {
    pub fn simple(name: impl Into<String>) -> Self {
        Reldep::Simple(name.into())
    }

    pub fn versioned(
        name: impl Into<String>,
        sense: impl Into<String>,
        evr: impl Into<String>,
    ) -> Self {
        Reldep::Versioned {
            name: name.into(),
            sense: sense.into(),
            evr: evr.into(),
        }
    }

    pub fn rich(expr: impl Into<String>) -> Self {
        Reldep::Rich(expr.into())
    }

    /// Dependency name; for rich dependencies this is the whole expression.
    pub fn name(&self) -> &str {
        match self {
            Reldep::Simple(name) => name,
            Reldep::Versioned { name, .. } => name,
            Reldep::Rich(expr) => expr,
        }
    }
}

impl fmt::Display for Reldep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reldep::Simple(name) => f.write_str(name),
            Reldep::Versioned { name, sense, evr } => write!(f, "{name} {sense} {evr}"),
            Reldep::Rich(expr) => f.write_str(expr),
        }
    }
}

/// Dependency kinds in generation precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepKind {
    BuildRequires = 1,
    Requires = 2,
    Obsoletes = 3,
    Provides = 4,
    Suggests = 5,
}

impl DepKind {
    pub fn precedence(self) -> u32 {
        self as u32
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            DepKind::BuildRequires => "BuildRequires",
            DepKind::Requires => "Requires",
            DepKind::Obsoletes => "Obsoletes",
            DepKind::Provides => "Provides",
            DepKind::Suggests => "Suggests",
        }
    }
}

/// A dependency annotated with an optional build condition.
///
/// Conditions are denormalized: each dependency inside an `%if` block
/// carries its own copy of the condition, and the `%else` branch carries
/// the negated copy. The generator re-folds consecutive equal conditions
/// back into one block.
#[derive(Debug, Clone)]
pub struct CondDep {
    kind: DepKind,
    reldep: Reldep,
    cond: Option<Condition>,
    comment: Vec<String>,
}

impl CondDep {
    pub fn new(kind: DepKind, reldep: Reldep, comment: Vec<String>) -> Self {
        Self {
            kind,
            reldep,
            cond: None,
            comment,
        }
    }

    pub fn kind(&self) -> DepKind {
        self.kind
    }

    pub fn reldep(&self) -> &Reldep {
        &self.reldep
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.cond.as_ref()
    }

    pub fn comment(&self) -> &[String] {
        &self.comment
    }

    /// Append extra comment lines after the existing ones.
    pub fn with_comments(mut self, extra: &[String]) -> Self {
        self.comment.extend(extra.iter().cloned());
        self
    }

    /// Attach a condition.
    ///
    /// The dependency must not already carry one; the parser rejects nested
    /// conditions before calling this.
    pub fn with_condition(mut self, cond: Condition) -> Self {
        assert!(self.cond.is_none(), "nested conditions");
        self.cond = Some(cond);
        self
    }
}

impl fmt::Display for CondDep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cond {
            None => write!(f, "{}: {} (always)", self.kind.tag_name(), self.reldep),
            Some(c) => write!(f, "{}: {} when {}", self.kind.tag_name(), self.reldep, c),
        }
    }
}

/// One macro-definition line (`%define`, `%global`, `%bcond` family), kept
/// verbatim so it regenerates byte for byte.
///
/// A single `%if ... [%else] %endif` wrapper around a run of definitions is
/// preserved as synthetic boundary entries holding the raw directive lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    line: String,
    comment: Vec<String>,
}

impl MacroDef {
    pub fn new(line: impl Into<String>, comment: Vec<String>) -> Self {
        Self {
            line: line.into(),
            comment,
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn comment(&self) -> &[String] {
        &self.comment
    }
}

/// Build-phase script kinds, in precedence order.
///
/// Each phase comes in three variants: `-p` runs against the whole project,
/// the bare form against the current module only, and `-a` against all
/// modules. The declaration order doubles as the precedence order used by
/// the optional script sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ScriptKind {
    PrepProject = 1,
    Prep = 2,
    PrepAll = 3,
    GenerateBuildRequiresProject = 4,
    GenerateBuildRequires = 5,
    GenerateBuildRequiresAll = 6,
    ConfProject = 7,
    Conf = 8,
    ConfAll = 9,
    BuildProject = 10,
    Build = 11,
    BuildAll = 12,
    InstallProject = 13,
    Install = 14,
    InstallAll = 15,
}

impl ScriptKind {
    pub fn precedence(self) -> u32 {
        self as u32
    }

    /// Section name as written after `%` in the document.
    pub fn section_name(self) -> &'static str {
        match self {
            ScriptKind::PrepProject => "prep -p",
            ScriptKind::Prep => "prep",
            ScriptKind::PrepAll => "prep -a",
            ScriptKind::GenerateBuildRequiresProject => "generate_buildrequires -p",
            ScriptKind::GenerateBuildRequires => "generate_buildrequires",
            ScriptKind::GenerateBuildRequiresAll => "generate_buildrequires -a",
            ScriptKind::ConfProject => "conf -p",
            ScriptKind::Conf => "conf",
            ScriptKind::ConfAll => "conf -a",
            ScriptKind::BuildProject => "build -p",
            ScriptKind::Build => "build",
            ScriptKind::BuildAll => "build -a",
            ScriptKind::InstallProject => "install -p",
            ScriptKind::Install => "install",
            ScriptKind::InstallAll => "install -a",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// One build-phase script section: kind plus verbatim body lines.
#[derive(Debug, Clone)]
pub struct Script {
    kind: ScriptKind,
    lines: Vec<String>,
}

impl Script {
    pub fn new(kind: ScriptKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// One `BuildOption:` line value, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOpt {
    value: String,
    comment: Vec<String>,
}

impl BuildOpt {
    pub fn new(value: impl Into<String>, comment: Vec<String>) -> Self {
        Self {
            value: value.into(),
            comment,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn comment(&self) -> &[String] {
        &self.comment
    }
}

/// The `BuildSystem: maven` declaration with its `BuildOption:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSys {
    options: Vec<BuildOpt>,
    comment: Vec<String>,
}

impl BuildSys {
    pub fn new(options: Vec<BuildOpt>, comment: Vec<String>) -> Self {
        Self { options, comment }
    }

    pub fn options(&self) -> &[BuildOpt] {
        &self.options
    }

    pub fn comment(&self) -> &[String] {
        &self.comment
    }

    /// The newline-joined option values, as fed to the build-option parser.
    pub fn option_text(&self) -> String {
        self.options
            .iter()
            .map(BuildOpt::value)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One package within the document: the main package or a subpackage.
#[derive(Debug, Clone)]
pub struct Pkg {
    name: String,
    build_sys: Option<BuildSys>,
    tags: Vec<Tag>,
    deps: Vec<CondDep>,
    description: Vec<String>,
    files: Option<Vec<String>>,
    mfiles: Vec<String>,
}

impl Pkg {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build_sys: None,
            tags: Vec::new(),
            deps: Vec::new(),
            description: Vec::new(),
            files: None,
            mfiles: Vec::new(),
        }
    }

    /// Subpackage named by prefixing the main package name, as written in
    /// `%package name` without `-n`.
    pub fn prefixed(main_name: &str, name: &str) -> Self {
        Self::new(format!("{main_name}-{name}"))
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_deps(mut self, deps: Vec<CondDep>) -> Self {
        self.deps = deps;
        self
    }

    pub fn with_build_sys(mut self, build_sys: Option<BuildSys>) -> Self {
        self.build_sys = build_sys;
        self
    }

    pub fn with_description(mut self, description: Vec<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_mfiles(mut self, mfiles: Vec<String>) -> Self {
        self.mfiles = mfiles;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_sys(&self) -> Option<&BuildSys> {
        self.build_sys.as_ref()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn deps(&self) -> &[CondDep] {
        &self.deps
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// File list, `None` until a `%files` section assigned one.
    pub fn files(&self) -> Option<&[String]> {
        self.files.as_deref()
    }

    /// Auxiliary file-list names given with `-f` on the `%files` line.
    pub fn mfiles(&self) -> &[String] {
        &self.mfiles
    }
}

/// A complete parsed spec document.
#[derive(Debug, Clone)]
pub struct Spec {
    macros: Vec<MacroDef>,
    main: Pkg,
    subpackages: Vec<Pkg>,
    scripts: Vec<Script>,
    changelog: Vec<String>,
}

impl Spec {
    /// Assemble the final document.
    ///
    /// Every subpackage must already have its file list assigned; the
    /// parser guarantees this, and manual construction must too.
    pub fn produce(
        macros: Vec<MacroDef>,
        main: Pkg,
        subpackages: Vec<Pkg>,
        scripts: Vec<Script>,
        changelog: Vec<String>,
    ) -> Self {
        for pkg in &subpackages {
            assert!(
                pkg.files().is_some(),
                "Incomplete files for pkg {}",
                pkg.name()
            );
        }
        Self {
            macros,
            main,
            subpackages,
            scripts,
            changelog,
        }
    }

    pub fn macros(&self) -> &[MacroDef] {
        &self.macros
    }

    pub fn main_pkg(&self) -> &Pkg {
        &self.main
    }

    pub fn subpackages(&self) -> &[Pkg] {
        &self.subpackages
    }

    /// Scripts in document order; kinds are unique.
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    pub fn script(&self, kind: ScriptKind) -> Option<&Script> {
        self.scripts.iter().find(|s| s.kind() == kind)
    }

    pub fn changelog(&self) -> &[String] {
        &self.changelog
    }

    /// The embedded build-option fragment, if the document declares a build
    /// system: the newline-joined values of its `BuildOption:` lines.
    pub fn build_option_text(&self) -> Option<String> {
        self.main.build_sys().map(BuildSys::option_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_condition_structural_equality() {
        let a = Condition::new("%{with tests}");
        let b = Condition::new("%{with tests}");
        assert_eq!(a, b);
        assert_ne!(a, a.negate());
        assert_eq!(a, a.negate().negate());
    }

    #[test]
    fn test_reldep_display() {
        assert_eq!(Reldep::simple("junit").to_string(), "junit");
        assert_eq!(
            Reldep::versioned("maven-local", ">=", "5.0").to_string(),
            "maven-local >= 5.0"
        );
        assert_eq!(
            Reldep::rich("(foo if bar)").to_string(),
            "(foo if bar)"
        );
    }

    #[test]
    fn test_dep_kind_precedence_order() {
        assert!(DepKind::BuildRequires.precedence() < DepKind::Requires.precedence());
        assert!(DepKind::Requires.precedence() < DepKind::Obsoletes.precedence());
        assert!(DepKind::Obsoletes.precedence() < DepKind::Provides.precedence());
        assert!(DepKind::Provides.precedence() < DepKind::Suggests.precedence());
    }

    #[test]
    fn test_script_kind_table() {
        let kinds: Vec<ScriptKind> = ScriptKind::iter().collect();
        assert_eq!(kinds.len(), 15);
        // Precedence follows declaration order, 1 through 15.
        for (i, kind) in kinds.iter().enumerate() {
            assert_eq!(kind.precedence(), i as u32 + 1);
        }
        assert_eq!(ScriptKind::PrepProject.section_name(), "prep -p");
        assert_eq!(
            ScriptKind::GenerateBuildRequires.section_name(),
            "generate_buildrequires"
        );
        assert_eq!(ScriptKind::InstallAll.section_name(), "install -a");
    }

    #[test]
    fn test_cond_dep_comment_append() {
        let dep = CondDep::new(
            DepKind::Requires,
            Reldep::simple("foo"),
            vec!["own".to_string()],
        );
        let dep = dep.with_comments(&["extra".to_string()]);
        assert_eq!(dep.comment(), ["own".to_string(), "extra".to_string()]);
    }

    #[test]
    #[should_panic(expected = "nested conditions")]
    fn test_cond_dep_rejects_second_condition() {
        let dep = CondDep::new(DepKind::Requires, Reldep::simple("foo"), Vec::new());
        let dep = dep.with_condition(Condition::new("a"));
        let _ = dep.with_condition(Condition::new("b"));
    }

    #[test]
    fn test_pkg_prefixed_name() {
        let pkg = Pkg::prefixed("apache-ivy", "javadoc");
        assert_eq!(pkg.name(), "apache-ivy-javadoc");
    }

    #[test]
    fn test_build_sys_option_text() {
        let sys = BuildSys::new(
            vec![
                BuildOpt::new("skipTests", Vec::new()),
                BuildOpt::new("mavenOption \"-P!quality\"", Vec::new()),
            ],
            Vec::new(),
        );
        assert_eq!(sys.option_text(), "skipTests\nmavenOption \"-P!quality\"");
    }

    #[test]
    fn test_spec_script_lookup() {
        let spec = Spec::produce(
            Vec::new(),
            Pkg::new("demo"),
            Vec::new(),
            vec![Script::new(
                ScriptKind::Build,
                vec!["%mvn_build".to_string()],
            )],
            Vec::new(),
        );
        assert!(spec.script(ScriptKind::Build).is_some());
        assert!(spec.script(ScriptKind::Install).is_none());
    }
}
