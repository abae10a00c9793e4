// src/build/mod.rs

//! Build-option mini-language: lexer, parser and configuration model.
//!
//! Spec documents carry build options as the values of `BuildOption:`
//! tags. The concatenated values form one fragment in a small free-form
//! language: whitespace-separated directives, quoted literals and braced
//! blocks. This module parses such a fragment into a [`BuildConfig`] and,
//! in the same pass, renders the fragment in canonical form (one directive
//! per line, four-space indent inside blocks).
//!
//! Diagnostics carry a breadcrumb trail of the directives leading up to
//! the error plus a pointer into the canonical rendering, so an error deep
//! inside a block names its location without quoting the whole fragment.
//!
//! # Example
//!
//! ```
//! use specwright::build::BuildOptionParser;
//!
//! let src = r#"skipTests artifact "org.ow2.asm:*" { package "asm" }"#;
//! let parsed = BuildOptionParser::new("asm", src)?.parse()?;
//! assert!(parsed.config().skip_tests());
//! assert_eq!(parsed.config().packaging_rules()[0].target_package(), "asm");
//! # Ok::<(), specwright::build::BuildOptionParseError>(())
//! ```

mod lexer;
mod model;
mod parser;

pub use lexer::BuildOptionParseError;
pub use model::{
    Alias, Artifact, BuildConfig, BuildConfigBuilder, PackagingRule, TransformOp, TransformOpcode,
};
pub use parser::{BuildOptionParser, ParsedBuildOptions};
