// src/build/model.rs

//! Value types describing a parsed build-option fragment.
//!
//! The parser accumulates everything into a [`BuildConfigBuilder`] and
//! consumes it once at the end, so a [`BuildConfig`] is immutable from the
//! moment it exists. [`PackagingRule`] follows the same discipline with
//! persistent "with-field" updates. All types serialize to JSON for the
//! `options` CLI command.

use std::fmt;

use serde::Serialize;
use strum_macros::Display;

/// A `group:artifact` coordinate pair with structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
}

impl Artifact {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// An alternative coordinate under which a packaged artifact is also
/// resolvable. Extension and classifier default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Alias {
    group_id: String,
    artifact_id: String,
    extension: String,
    classifier: String,
}

impl Alias {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: String::new(),
            classifier: String::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }
}

/// Kind of a model transformation. The display form matches the source
/// keyword that introduces the singular variant of the directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TransformOpcode {
    RemoveParent,
    RemovePlugin,
    RemoveDependency,
    RemoveSubproject,
    AddDependency,
}

/// One flattened model transformation: opcode, matcher argument and the
/// selector of the enclosing `transform` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOp {
    opcode: TransformOpcode,
    matcher: String,
    selector: String,
}

impl TransformOp {
    pub fn new(
        opcode: TransformOpcode,
        matcher: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            opcode,
            matcher: matcher.into(),
            selector: selector.into(),
        }
    }

    /// The argument-less `removeParent` form. The matcher degenerates to a
    /// bare colon, which matches any parent coordinate.
    pub fn remove_parent(selector: impl Into<String>) -> Self {
        Self::new(TransformOpcode::RemoveParent, ":", selector)
    }

    pub fn opcode(&self) -> TransformOpcode {
        self.opcode
    }

    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Installation instructions for all artifacts matched by a coordinate glob.
///
/// The target package is the empty string until assigned; `"__noinstall"`
/// is a reserved target meaning the matched artifacts are dropped rather
/// than installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagingRule {
    group_id_glob: String,
    artifact_id_glob: String,
    extension_glob: String,
    classifier_glob: String,
    version_glob: String,
    target_package: String,
    target_repository: String,
    files: Vec<String>,
    compat_versions: Vec<String>,
    aliases: Vec<Alias>,
}

impl PackagingRule {
    /// Reserved target package meaning the matched artifacts are dropped
    /// rather than installed.
    pub const NO_INSTALL: &'static str = "__noinstall";

    pub fn new(group_id_glob: impl Into<String>, artifact_id_glob: impl Into<String>) -> Self {
        Self {
            group_id_glob: group_id_glob.into(),
            artifact_id_glob: artifact_id_glob.into(),
            extension_glob: String::new(),
            classifier_glob: String::new(),
            version_glob: String::new(),
            target_package: String::new(),
            target_repository: String::new(),
            files: Vec::new(),
            compat_versions: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn with_target_package(mut self, target_package: impl Into<String>) -> Self {
        self.target_package = target_package.into();
        self
    }

    pub fn with_target_repository(mut self, target_repository: impl Into<String>) -> Self {
        self.target_repository = target_repository.into();
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.files.push(file.into());
        self
    }

    pub fn with_compat_version(mut self, version: impl Into<String>) -> Self {
        self.compat_versions.push(version.into());
        self
    }

    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn group_id_glob(&self) -> &str {
        &self.group_id_glob
    }

    pub fn artifact_id_glob(&self) -> &str {
        &self.artifact_id_glob
    }

    pub fn extension_glob(&self) -> &str {
        &self.extension_glob
    }

    pub fn classifier_glob(&self) -> &str {
        &self.classifier_glob
    }

    pub fn version_glob(&self) -> &str {
        &self.version_glob
    }

    /// Target package name, or the empty string when not assigned yet.
    pub fn target_package(&self) -> &str {
        &self.target_package
    }

    pub fn target_repository(&self) -> &str {
        &self.target_repository
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn compat_versions(&self) -> &[String] {
        &self.compat_versions
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }
}

/// Everything a build-option fragment can configure, in source order.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    base_name: String,
    skip_tests: bool,
    maven_options: Vec<String>,
    packaging_rules: Vec<PackagingRule>,
    extra_build_reqs: Vec<Artifact>,
    filtered_build_reqs: Vec<Artifact>,
    build_req_versions: Vec<(Artifact, String)>,
    transforms: Vec<TransformOp>,
    test_excludes: Vec<String>,
    uses_javapackages_bootstrap: bool,
    singleton_packaging: bool,
    xmvn_toolchain: Option<String>,
}

impl BuildConfig {
    pub fn builder(base_name: impl Into<String>) -> BuildConfigBuilder {
        BuildConfigBuilder {
            base_name: base_name.into(),
            skip_tests: false,
            maven_options: Vec::new(),
            packaging_rules: Vec::new(),
            extra_build_reqs: Vec::new(),
            filtered_build_reqs: Vec::new(),
            build_req_versions: Vec::new(),
            transforms: Vec::new(),
            test_excludes: Vec::new(),
            uses_javapackages_bootstrap: false,
            singleton_packaging: false,
            xmvn_toolchain: None,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn skip_tests(&self) -> bool {
        self.skip_tests
    }

    pub fn maven_options(&self) -> &[String] {
        &self.maven_options
    }

    pub fn packaging_rules(&self) -> &[PackagingRule] {
        &self.packaging_rules
    }

    pub fn extra_build_reqs(&self) -> &[Artifact] {
        &self.extra_build_reqs
    }

    pub fn filtered_build_reqs(&self) -> &[Artifact] {
        &self.filtered_build_reqs
    }

    /// Version pins, keyed by requirement, in first-pin order.
    pub fn build_req_versions(&self) -> &[(Artifact, String)] {
        &self.build_req_versions
    }

    pub fn transforms(&self) -> &[TransformOp] {
        &self.transforms
    }

    pub fn test_excludes(&self) -> &[String] {
        &self.test_excludes
    }

    pub fn uses_javapackages_bootstrap(&self) -> bool {
        self.uses_javapackages_bootstrap
    }

    pub fn singleton_packaging(&self) -> bool {
        self.singleton_packaging
    }

    pub fn xmvn_toolchain(&self) -> Option<&str> {
        self.xmvn_toolchain.as_deref()
    }
}

/// Accumulator for [`BuildConfig`]. Requirement sets keep insertion order
/// and silently drop duplicates; version pins replace in place.
#[derive(Debug, Clone)]
pub struct BuildConfigBuilder {
    base_name: String,
    skip_tests: bool,
    maven_options: Vec<String>,
    packaging_rules: Vec<PackagingRule>,
    extra_build_reqs: Vec<Artifact>,
    filtered_build_reqs: Vec<Artifact>,
    build_req_versions: Vec<(Artifact, String)>,
    transforms: Vec<TransformOp>,
    test_excludes: Vec<String>,
    uses_javapackages_bootstrap: bool,
    singleton_packaging: bool,
    xmvn_toolchain: Option<String>,
}

impl BuildConfigBuilder {
    pub fn skip_tests(&mut self, skip_tests: bool) -> &mut Self {
        self.skip_tests = skip_tests;
        self
    }

    pub fn maven_option(&mut self, option: impl Into<String>) -> &mut Self {
        self.maven_options.push(option.into());
        self
    }

    pub fn packaging_rule(&mut self, rule: PackagingRule) -> &mut Self {
        self.packaging_rules.push(rule);
        self
    }

    pub fn extra_build_req(&mut self, req: Artifact) -> &mut Self {
        if !self.extra_build_reqs.contains(&req) {
            self.extra_build_reqs.push(req);
        }
        self
    }

    pub fn filtered_build_req(&mut self, req: Artifact) -> &mut Self {
        if !self.filtered_build_reqs.contains(&req) {
            self.filtered_build_reqs.push(req);
        }
        self
    }

    pub fn build_req_version(&mut self, req: Artifact, version: impl Into<String>) -> &mut Self {
        let version = version.into();
        match self.build_req_versions.iter_mut().find(|(r, _)| *r == req) {
            Some((_, v)) => *v = version,
            None => self.build_req_versions.push((req, version)),
        }
        self
    }

    pub fn transform(&mut self, op: TransformOp) -> &mut Self {
        self.transforms.push(op);
        self
    }

    pub fn test_exclude(&mut self, exclude: impl Into<String>) -> &mut Self {
        self.test_excludes.push(exclude.into());
        self
    }

    pub fn uses_javapackages_bootstrap(&mut self, uses: bool) -> &mut Self {
        self.uses_javapackages_bootstrap = uses;
        self
    }

    pub fn singleton_packaging(&mut self, singleton: bool) -> &mut Self {
        self.singleton_packaging = singleton;
        self
    }

    pub fn xmvn_toolchain(&mut self, toolchain: impl Into<String>) -> &mut Self {
        self.xmvn_toolchain = Some(toolchain.into());
        self
    }

    pub fn build(self) -> BuildConfig {
        BuildConfig {
            base_name: self.base_name,
            skip_tests: self.skip_tests,
            maven_options: self.maven_options,
            packaging_rules: self.packaging_rules,
            extra_build_reqs: self.extra_build_reqs,
            filtered_build_reqs: self.filtered_build_reqs,
            build_req_versions: self.build_req_versions,
            transforms: self.transforms,
            test_excludes: self.test_excludes,
            uses_javapackages_bootstrap: self.uses_javapackages_bootstrap,
            singleton_packaging: self.singleton_packaging,
            xmvn_toolchain: self.xmvn_toolchain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_display_and_equality() {
        let a = Artifact::new("org.apache.maven", "maven-core");
        let b = Artifact::new("org.apache.maven", "maven-core");
        let c = Artifact::new("org.apache.maven", "maven-model");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "org.apache.maven:maven-core");
    }

    #[test]
    fn test_alias_defaults_extension_and_classifier() {
        let alias = Alias::new("junit", "junit");
        assert_eq!(alias.extension(), "");
        assert_eq!(alias.classifier(), "");
    }

    #[test]
    fn test_transform_opcode_display_matches_keyword() {
        assert_eq!(TransformOpcode::RemoveParent.to_string(), "removeParent");
        assert_eq!(TransformOpcode::RemovePlugin.to_string(), "removePlugin");
        assert_eq!(
            TransformOpcode::RemoveDependency.to_string(),
            "removeDependency"
        );
        assert_eq!(
            TransformOpcode::RemoveSubproject.to_string(),
            "removeSubproject"
        );
        assert_eq!(TransformOpcode::AddDependency.to_string(), "addDependency");
    }

    #[test]
    fn test_remove_parent_matcher_defaults_to_colon() {
        let op = TransformOp::remove_parent("module-a");
        assert_eq!(op.opcode(), TransformOpcode::RemoveParent);
        assert_eq!(op.matcher(), ":");
        assert_eq!(op.selector(), "module-a");
    }

    #[test]
    fn test_no_install_is_a_regular_target_package() {
        let rule = PackagingRule::new("g", "a").with_target_package(PackagingRule::NO_INSTALL);
        assert_eq!(rule.target_package(), "__noinstall");
    }

    #[test]
    fn test_packaging_rule_with_methods_accumulate() {
        let rule = PackagingRule::new("org.foo", "*")
            .with_target_package("foo-libs")
            .with_file("extra/foo.jar")
            .with_file("extra/bar.jar")
            .with_compat_version("1.2")
            .with_alias(Alias::new("org.foo", "foo-compat"));
        assert_eq!(rule.group_id_glob(), "org.foo");
        assert_eq!(rule.artifact_id_glob(), "*");
        assert_eq!(rule.extension_glob(), "");
        assert_eq!(rule.target_package(), "foo-libs");
        assert_eq!(rule.target_repository(), "");
        assert_eq!(rule.files(), ["extra/foo.jar", "extra/bar.jar"]);
        assert_eq!(rule.compat_versions(), ["1.2"]);
        assert_eq!(rule.aliases().len(), 1);
    }

    #[test]
    fn test_builder_dedups_requirement_sets() {
        let mut builder = BuildConfig::builder("foo");
        builder
            .extra_build_req(Artifact::new("g", "a"))
            .extra_build_req(Artifact::new("g", "b"))
            .extra_build_req(Artifact::new("g", "a"))
            .filtered_build_req(Artifact::new("x", "y"))
            .filtered_build_req(Artifact::new("x", "y"));
        let config = builder.build();
        assert_eq!(
            config.extra_build_reqs(),
            [Artifact::new("g", "a"), Artifact::new("g", "b")]
        );
        assert_eq!(config.filtered_build_reqs(), [Artifact::new("x", "y")]);
    }

    #[test]
    fn test_build_req_version_pin_replaces_in_place() {
        let mut builder = BuildConfig::builder("foo");
        builder
            .build_req_version(Artifact::new("g", "a"), "1.0")
            .build_req_version(Artifact::new("g", "b"), "2.0")
            .build_req_version(Artifact::new("g", "a"), "1.1");
        let config = builder.build();
        assert_eq!(
            config.build_req_versions(),
            [
                (Artifact::new("g", "a"), "1.1".to_string()),
                (Artifact::new("g", "b"), "2.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_config_defaults() {
        let config = BuildConfig::builder("pkg").build();
        assert_eq!(config.base_name(), "pkg");
        assert!(!config.skip_tests());
        assert!(!config.singleton_packaging());
        assert!(!config.uses_javapackages_bootstrap());
        assert_eq!(config.xmvn_toolchain(), None);
        assert!(config.maven_options().is_empty());
        assert!(config.packaging_rules().is_empty());
        assert!(config.transforms().is_empty());
    }

    #[test]
    fn test_build_config_serializes_to_json() {
        let mut builder = BuildConfig::builder("foo");
        builder.skip_tests(true).xmvn_toolchain("openjdk21");
        let json = serde_json::to_value(builder.build()).unwrap();
        assert_eq!(json["base_name"], "foo");
        assert_eq!(json["skip_tests"], true);
        assert_eq!(json["xmvn_toolchain"], "openjdk21");
    }

    #[test]
    fn test_transform_op_serializes_opcode_as_keyword() {
        let op = TransformOp::new(TransformOpcode::AddDependency, "junit:junit:4.13", "m");
        let json = serde_json::to_value(op).unwrap();
        assert_eq!(json["opcode"], "addDependency");
    }
}
