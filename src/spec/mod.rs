// src/spec/mod.rs

//! Spec document model, parser and canonical generator.
//!
//! A spec document declares package-build metadata: header tags,
//! conditional dependencies, an optional Maven build-system block with
//! `BuildOption:` lines, subpackages, build-phase scripts, file lists and
//! a changelog. This module parses such documents into a [`Spec`] value
//! tree and renders the tree back out in a fixed canonical layout.
//! Generated text parses back to an equal tree, so generation is
//! idempotent and canonical documents round-trip byte for byte.
//!
//! # Example
//!
//! ```
//! use specwright::spec::Spec;
//!
//! let doc = "Name: foo\n%description\nDemo.\n%changelog\n";
//! let spec = Spec::parse(doc)?;
//! assert_eq!(spec.main_pkg().name(), "foo");
//!
//! let canonical = spec.generate();
//! assert_eq!(Spec::parse(&canonical)?.generate(), canonical);
//! # Ok::<(), specwright::spec::SpecParseError>(())
//! ```

mod generator;
mod model;
mod parser;

pub use generator::GeneratorOptions;
pub use model::{
    BuildOpt, BuildSys, CondDep, Condition, DepKind, MacroDef, Pkg, Reldep, Script, ScriptKind,
    Spec, Tag,
};
pub use parser::{SpecParseError, SpecParser};
