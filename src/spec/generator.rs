// src/spec/generator.rs

//! Canonical-form renderer for spec documents.
//!
//! The output layout is fixed: tag values start at column 16, one blank
//! line separates top-level blocks, conditional dependencies are re-folded
//! into `%if`/`%else`/`%endif` groups, and comments are re-attached above
//! the construct that owns them. Parsing the generated text and generating
//! again reproduces it byte for byte.

use std::cmp::Ordering;

use super::model::{CondDep, Condition, Pkg, Reldep, Script, Spec, Tag};

/// Rendering switches. All default to off, which reproduces the parsed
/// document structure in its original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    /// Place each `%files` section right after the `%package` and
    /// `%description` it belongs to, instead of after the scripts.
    pub inline_files: bool,
    /// Stable-sort tags by precedence rank.
    pub sort_tags: bool,
    /// Stable-sort dependencies by kind, condition, name class and text.
    pub sort_deps: bool,
    /// Stable-sort scripts by phase precedence.
    pub sort_scripts: bool,
}

// Dependencies on the packaging toolchain itself sort ahead of ordinary
// ones.
fn is_special_dep(r: &Reldep) -> bool {
    r.name().starts_with("maven-local")
        || r.name().starts_with("javapackages-local")
        || r.name().starts_with("dola")
}

fn cond_cmp(a: &Condition, b: &Condition) -> Ordering {
    a.expr()
        .cmp(b.expr())
        .then_with(|| a.is_negated().cmp(&b.is_negated()))
}

fn dep_cmp(a: &CondDep, b: &CondDep) -> Ordering {
    a.kind()
        .precedence()
        .cmp(&b.kind().precedence())
        .then_with(|| match (a.condition(), b.condition()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(ca), Some(cb)) => cond_cmp(ca, cb),
        })
        .then_with(|| is_special_dep(b.reldep()).cmp(&is_special_dep(a.reldep())))
        .then_with(|| b.comment().is_empty().cmp(&a.comment().is_empty()))
        .then_with(|| a.reldep().to_string().cmp(&b.reldep().to_string()))
}

struct Generator {
    out: String,
    opts: GeneratorOptions,
}

impl Generator {
    fn nl(&mut self) {
        self.out.push('\n');
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.nl();
    }

    fn gen_comment(&mut self, comment: &[String]) {
        for line in comment {
            self.out.push('#');
            if !line.trim().is_empty() {
                self.out.push(' ');
                self.out.push_str(line);
            }
            self.nl();
        }
    }

    // "name:" padded so values line up at column 16.
    fn gen_tag_line(&mut self, name: &str, value: &str) {
        self.out.push_str(name);
        self.out.push(':');
        self.out.push_str(&" ".repeat(15usize.saturating_sub(name.len())));
        self.line(value);
    }

    fn gen_tags(&mut self, tags: &[Tag]) {
        let mut taga: Vec<&Tag> = tags.iter().collect();
        if self.opts.sort_tags {
            taga.sort_by_key(|t| t.precedence());
        }
        let mut seen_source = false;
        let mut seen_patch = false;
        for tag in taga {
            // Source and Patch groups each start on a fresh block.
            if tag.name().starts_with("Source") && !seen_source {
                seen_source = true;
                self.nl();
            }
            if tag.name() == "Patch" && !seen_patch {
                seen_patch = true;
                self.nl();
            }
            self.gen_comment(tag.comment());
            self.gen_tag_line(tag.name(), tag.value());
        }
    }

    /// Emit dependencies, folding consecutive entries that share a
    /// condition back into one `%if` block and a negation flip into its
    /// `%else` branch.
    ///
    /// Panics if a conditional run opens on a negated condition or flips
    /// from negated back to non-negated; the parser never produces such a
    /// sequence from a generated document.
    fn gen_deps(&mut self, deps: &[CondDep]) {
        let mut depa: Vec<&CondDep> = deps.iter().collect();
        if self.opts.sort_deps {
            depa.sort_by(|a, b| dep_cmp(a, b));
        }
        let mut cc: Option<&Condition> = None;
        for dep in depa {
            let c = dep.condition();
            match (c, cc) {
                (None, None) => {}
                (None, Some(_)) => self.line("%endif"),
                (Some(c), None) => {
                    self.line(&format!("%if {}", c.expr()));
                    assert!(!c.is_negated(), "initial cond negated");
                }
                (Some(c), Some(cc)) => {
                    if c.expr() == cc.expr() {
                        if !cc.is_negated() && c.is_negated() {
                            self.line("%else");
                        } else {
                            assert!(
                                cc.is_negated() == c.is_negated(),
                                "cond negated to not negated"
                            );
                        }
                    } else {
                        self.line("%endif");
                        self.line(&format!("%if {}", c.expr()));
                        assert!(!c.is_negated(), "initial cond negated");
                    }
                }
            }
            cc = c;
            self.gen_comment(dep.comment());
            self.gen_tag_line(dep.kind().tag_name(), &dep.reldep().to_string());
        }
        if cc.is_some() {
            self.line("%endif");
        }
    }

    fn gen_section(&mut self, lines: &[String]) {
        for line in lines {
            self.line(line);
        }
    }

    // Short form of a subpackage name: main-name prefix stripped, or the
    // full name behind "-n".
    fn short_name(main: &Pkg, pkg: &Pkg) -> String {
        match pkg.name().strip_prefix(&format!("{}-", main.name())) {
            Some(stripped) => stripped.to_string(),
            None => format!("-n {}", pkg.name()),
        }
    }

    fn gen_files_line(&mut self, head: &str, mfiles: &[String]) {
        self.out.push_str(head);
        for m in mfiles {
            self.out.push_str(" -f ");
            self.out.push_str(m);
        }
        self.nl();
    }

    fn gen_main_files(&mut self, main: &Pkg) {
        if let Some(files) = main.files() {
            self.gen_files_line("%files", main.mfiles());
            self.gen_section(files);
            self.nl();
        }
    }

    fn gen_sub_files(&mut self, main: &Pkg, pkg: &Pkg) {
        self.gen_files_line(
            &format!("%files {}", Self::short_name(main, pkg)),
            pkg.mfiles(),
        );
        if let Some(files) = pkg.files() {
            self.gen_section(files);
        }
        self.nl();
    }

    fn generate(&mut self, spec: &Spec) {
        if !spec.macros().is_empty() {
            for macro_def in spec.macros() {
                self.gen_comment(macro_def.comment());
                self.line(macro_def.line());
            }
            self.nl();
        }
        let main = spec.main_pkg();
        self.gen_tags(main.tags());
        self.nl();
        if !main.deps().is_empty() {
            self.gen_deps(main.deps());
            self.nl();
        }
        if let Some(build_sys) = main.build_sys() {
            self.gen_comment(build_sys.comment());
            self.line("BuildSystem:    maven");
            for opt in build_sys.options() {
                self.gen_comment(opt.comment());
                self.line(&format!("BuildOption:    {}", opt.value()));
            }
            self.nl();
        }
        self.line("%description");
        self.gen_section(main.description());
        self.nl();
        if self.opts.inline_files {
            self.gen_main_files(main);
        }
        for pkg in spec.subpackages() {
            let pnn = Self::short_name(main, pkg);
            self.line(&format!("%package {pnn}"));
            self.gen_tags(pkg.tags());
            self.gen_deps(pkg.deps());
            self.nl();
            self.line(&format!("%description {pnn}"));
            self.gen_section(pkg.description());
            self.nl();
            if self.opts.inline_files {
                self.gen_sub_files(main, pkg);
            }
        }
        let mut scripts: Vec<&Script> = spec.scripts().iter().collect();
        if self.opts.sort_scripts {
            scripts.sort_by_key(|s| s.kind().precedence());
        }
        for script in scripts {
            self.line(&format!("%{}", script.kind()));
            self.gen_section(script.lines());
            self.nl();
        }
        if !self.opts.inline_files {
            self.gen_main_files(main);
            for pkg in spec.subpackages() {
                self.gen_sub_files(main, pkg);
            }
        }
        self.line("%changelog");
        self.gen_section(spec.changelog());
    }
}

impl Spec {
    /// Render the document in canonical form with default options.
    pub fn generate(&self) -> String {
        self.generate_with(&GeneratorOptions::default())
    }

    /// Render the document in canonical form.
    ///
    /// # Panics
    ///
    /// Panics if a conditional dependency run starts on a negated
    /// condition, which cannot occur for documents round-tripped through
    /// [`Spec::parse`] of generated output.
    pub fn generate_with(&self, opts: &GeneratorOptions) -> String {
        let mut g = Generator {
            out: String::new(),
            opts: *opts,
        };
        g.generate(self);
        g.out
    }
}
