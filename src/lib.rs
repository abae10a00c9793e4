// src/lib.rs

//! Specwright
//!
//! Round-trip parser and generator for declarative package-build metadata:
//! spec documents (header tags, conditional dependencies, build scripts,
//! changelog) and the build-option mini-language embedded in them.
//!
//! # Architecture
//!
//! - Value trees: parsing produces immutable values; updates are expressed
//!   as new values, never mutation in place
//! - Round-trip: canonical documents regenerate byte for byte, and any
//!   parsed document regenerates idempotently
//! - Exact diagnostics: both parsers point at the offending line and
//!   column with framed snippets; build-option errors additionally carry
//!   a breadcrumb trail of the directives leading up to the error
//! - Single-pass reformatting: the build-option lexer renders canonical
//!   text while the parser consumes its tokens

mod diag;
mod error;

pub mod build;
pub mod spec;

pub use error::{Error, Result};
