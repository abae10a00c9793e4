// src/build/parser.rs

//! Recursive-descent parser for the build-option mini-language.
//!
//! The grammar is deterministic with one token of lookahead, used only to
//! decide whether `removeParent` takes an optional matcher literal. Every
//! directive comes in a single form (`mavenOption "-X"`) and most also in
//! a block form (`mavenOptions { "-X" "-e" }`); block contents are
//! flattened into the same accumulator as repeated single forms, so both
//! spellings produce identical configurations.
//!
//! Parsing and reformatting happen in the same pass: the lexer renders the
//! canonical text while the parser consumes tokens, and both results come
//! back in one [`ParsedBuildOptions`].

use tracing::debug;

use super::lexer::{BuildOptionParseError, Lexer};
use super::model::{
    Alias, Artifact, BuildConfig, BuildConfigBuilder, PackagingRule, TransformOp, TransformOpcode,
};

type ParseResult<T> = Result<T, BuildOptionParseError>;

/// Outcome of a successful parse: the build configuration plus the
/// canonical reformatted fragment.
#[derive(Debug, Clone)]
pub struct ParsedBuildOptions {
    config: BuildConfig,
    canonical: String,
}

impl ParsedBuildOptions {
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn into_config(self) -> BuildConfig {
        self.config
    }

    /// The whole fragment, reformatted: one directive per line, four-space
    /// indent inside blocks, no trailing newline.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

pub struct BuildOptionParser {
    lx: Lexer,
    builder: BuildConfigBuilder,
}

impl BuildOptionParser {
    /// `base_name` is the package the fragment belongs to; it seeds the
    /// configuration but never appears in the fragment itself.
    pub fn new(base_name: impl Into<String>, src: impl Into<String>) -> ParseResult<Self> {
        Ok(Self {
            lx: Lexer::new(src)?,
            builder: BuildConfig::builder(base_name),
        })
    }

    pub fn parse(mut self) -> ParseResult<ParsedBuildOptions> {
        while !self.lx.next()?.is_end_of_input() {
            let handled = self.try_parse_flag()
                || self.try_parse_toolchain()?
                || self.try_parse_maven_options()?
                || self.try_parse_test_excludes()?
                || self.try_parse_build_requires()?
                || self.try_parse_packaging_rule()?
                || self.try_parse_transforms()?;
            if !handled {
                return Err(self
                    .lx
                    .error("Syntax error: expected global keyword, or end of build options"));
            }
        }
        let config = self.builder.build();
        debug!(
            "Parsed build options for {}: {} packaging rules, {} transforms",
            config.base_name(),
            config.packaging_rules().len(),
            config.transforms().len()
        );
        Ok(ParsedBuildOptions {
            config,
            canonical: self.lx.canonical().to_string(),
        })
    }

    fn try_parse_flag(&mut self) -> bool {
        if self.lx.is_keyword("skipTests") {
            self.builder.skip_tests(true);
            return true;
        }
        if self.lx.is_keyword("singletonPackaging") {
            self.builder.singleton_packaging(true);
            return true;
        }
        if self.lx.is_keyword("usesJavapackagesBootstrap") {
            self.builder.uses_javapackages_bootstrap(true);
            return true;
        }
        false
    }

    fn try_parse_toolchain(&mut self) -> ParseResult<bool> {
        if self.lx.is_keyword("xmvnToolchain") {
            let toolchain = self.lx.next()?.expect_literal()?;
            self.builder.xmvn_toolchain(toolchain);
            return Ok(true);
        }
        Ok(false)
    }

    fn try_parse_maven_options(&mut self) -> ParseResult<bool> {
        if self.lx.is_keyword("mavenOption") {
            let option = self.lx.next()?.expect_literal()?;
            self.builder.maven_option(option);
            return Ok(true);
        }
        if self.lx.is_keyword("mavenOptions") {
            self.lx.next()?.expect_block_begin()?;
            while !self.lx.next()?.is_block_end() {
                let option = self.lx.expect_literal()?;
                self.builder.maven_option(option);
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn try_parse_test_excludes(&mut self) -> ParseResult<bool> {
        if self.lx.is_keyword("testExclude") {
            let exclude = self.lx.next()?.expect_literal()?;
            self.builder.test_exclude(exclude);
            return Ok(true);
        }
        if self.lx.is_keyword("testExcludes") {
            self.lx.next()?.expect_block_begin()?;
            while !self.lx.next()?.is_block_end() {
                let exclude = self.lx.expect_literal()?;
                self.builder.test_exclude(exclude);
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn try_parse_build_requires(&mut self) -> ParseResult<bool> {
        if self.lx.is_keyword("buildRequire") {
            let lit = self.lx.next()?.expect_literal()?;
            let req = self.artifact_from_coordinates(lit)?;
            self.builder.extra_build_req(req);
            return Ok(true);
        }
        if self.lx.is_keyword("buildRequireFilter") {
            let lit = self.lx.next()?.expect_literal()?;
            let req = self.artifact_from_coordinates(lit)?;
            self.builder.filtered_build_req(req);
            return Ok(true);
        }
        if self.lx.is_keyword("buildRequires") {
            self.lx.next()?.expect_block_begin()?;
            while !self.lx.next()?.is_block_end() {
                if self.lx.is_keyword("filter") {
                    let lit = self.lx.next()?.expect_literal()?;
                    let req = self.artifact_from_coordinates(lit)?;
                    self.builder.filtered_build_req(req);
                } else {
                    let lit = self.lx.expect_literal()?;
                    let req = self.artifact_from_coordinates(lit)?;
                    self.builder.extra_build_req(req);
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn try_parse_packaging_rule(&mut self) -> ParseResult<bool> {
        if !self.lx.is_keyword("artifact") {
            return Ok(false);
        }
        let glob = self.lx.next()?.expect_literal()?;
        let mut rule = self.packaging_rule_from_glob(glob)?;
        self.lx.next()?.expect_block_begin()?;
        while !self.lx.next()?.is_block_end() {
            if self.lx.is_keyword("package") {
                if !rule.target_package().is_empty() {
                    return Err(self
                        .lx
                        .error("Semantic error: duplicate target package specified"));
                }
                let package = self.lx.next()?.expect_literal()?;
                rule = rule.with_target_package(package);
            } else if self.lx.is_keyword("noInstall") {
                if !rule.target_package().is_empty() {
                    return Err(self
                        .lx
                        .error("Semantic error: duplicate target package specified"));
                }
                rule = rule.with_target_package(PackagingRule::NO_INSTALL);
            } else if self.lx.is_keyword("repository") {
                if !rule.target_repository().is_empty() {
                    return Err(self
                        .lx
                        .error("Semantic error: duplicate target repository specified"));
                }
                let repository = self.lx.next()?.expect_literal()?;
                rule = rule.with_target_repository(repository);
            } else if self.lx.is_keyword("file") {
                let file = self.lx.next()?.expect_literal()?;
                rule = rule.with_file(file);
            } else if self.lx.is_keyword("files") {
                self.lx.next()?.expect_block_begin()?;
                while !self.lx.next()?.is_block_end() {
                    let file = self.lx.expect_literal()?;
                    rule = rule.with_file(file);
                }
            } else if self.lx.is_keyword("compatVersion") {
                let version = self.lx.next()?.expect_literal()?;
                rule = rule.with_compat_version(version);
            } else if self.lx.is_keyword("compatVersions") {
                self.lx.next()?.expect_block_begin()?;
                while !self.lx.next()?.is_block_end() {
                    let version = self.lx.expect_literal()?;
                    rule = rule.with_compat_version(version);
                }
            } else if self.lx.is_keyword("alias") {
                let lit = self.lx.next()?.expect_literal()?;
                let alias = self.alias_from_specifier(lit)?;
                rule = rule.with_alias(alias);
            } else if self.lx.is_keyword("aliases") {
                self.lx.next()?.expect_block_begin()?;
                while !self.lx.next()?.is_block_end() {
                    let lit = self.lx.expect_literal()?;
                    let alias = self.alias_from_specifier(lit)?;
                    rule = rule.with_alias(alias);
                }
            } else {
                return Err(self.lx.error(
                    "Syntax error: expected keyword related to artifact packaging, or closing brace",
                ));
            }
        }
        self.builder.packaging_rule(rule);
        Ok(true)
    }

    fn try_parse_transforms(&mut self) -> ParseResult<bool> {
        if !self.lx.is_keyword("transform") {
            return Ok(false);
        }
        let selector = self.lx.next()?.expect_literal()?;
        self.lx.next()?.expect_block_begin()?;
        while !self.lx.next()?.is_block_end() {
            let handled = self.try_parse_remove_parent(&selector)?
                || self.try_parse_transform_family(
                    "removePlugin",
                    "removePlugins",
                    TransformOpcode::RemovePlugin,
                    &selector,
                )?
                || self.try_parse_transform_family(
                    "removeDependency",
                    "removeDependencies",
                    TransformOpcode::RemoveDependency,
                    &selector,
                )?
                || self.try_parse_transform_family(
                    "removeSubproject",
                    "removeSubprojects",
                    TransformOpcode::RemoveSubproject,
                    &selector,
                )?
                || self.try_parse_transform_family(
                    "addDependency",
                    "addDependencies",
                    TransformOpcode::AddDependency,
                    &selector,
                )?;
            if !handled {
                return Err(self
                    .lx
                    .error("Syntax error: expected transformation keyword, or closing brace"));
            }
        }
        Ok(true)
    }

    /// `removeParent` is the one directive with an optional argument; a
    /// missing matcher means "any parent", spelled as a bare colon.
    fn try_parse_remove_parent(&mut self, selector: &str) -> ParseResult<bool> {
        if !self.lx.is_keyword("removeParent") {
            return Ok(false);
        }
        let op = if self.lx.lookahead_is_literal() {
            let matcher = self.lx.next()?.expect_literal()?;
            TransformOp::new(TransformOpcode::RemoveParent, matcher, selector)
        } else {
            TransformOp::remove_parent(selector)
        };
        self.builder.transform(op);
        Ok(true)
    }

    /// One transformation directive in its single (`keyword "m"`) and
    /// block (`keywords { "m" ... }`) spellings.
    fn try_parse_transform_family(
        &mut self,
        single: &str,
        plural: &str,
        opcode: TransformOpcode,
        selector: &str,
    ) -> ParseResult<bool> {
        if self.lx.is_keyword(single) {
            let matcher = self.lx.next()?.expect_literal()?;
            self.builder
                .transform(TransformOp::new(opcode, matcher, selector));
            return Ok(true);
        }
        if self.lx.is_keyword(plural) {
            self.lx.next()?.expect_block_begin()?;
            while !self.lx.next()?.is_block_end() {
                let matcher = self.lx.expect_literal()?;
                self.builder
                    .transform(TransformOp::new(opcode, matcher, selector));
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn artifact_from_coordinates(&mut self, lit: String) -> ParseResult<Artifact> {
        match lit.split_once(':') {
            Some((group, artifact)) => Ok(Artifact::new(group, artifact)),
            None => Err(self
                .lx
                .error("Syntax error: artifact coordinates must contain a colon")),
        }
    }

    fn packaging_rule_from_glob(&mut self, lit: String) -> ParseResult<PackagingRule> {
        match lit.split_once(':') {
            Some((group, artifact)) => Ok(PackagingRule::new(group, artifact)),
            None => Err(self.lx.error("Syntax error: artifact glob must contain a colon")),
        }
    }

    fn alias_from_specifier(&mut self, lit: String) -> ParseResult<Alias> {
        match lit.split_once(':') {
            Some((group, artifact)) => Ok(Alias::new(group, artifact)),
            None => Err(self
                .lx
                .error("Syntax error: alias specifier must contain a colon")),
        }
    }
}
