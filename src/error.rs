// src/error.rs

//! Crate-wide error type unifying the two parser error surfaces.

use thiserror::Error;

use crate::build::BuildOptionParseError;
use crate::spec::SpecParseError;

/// Errors produced by specwright operations
#[derive(Debug, Error)]
pub enum Error {
    /// A spec document failed to parse
    #[error(transparent)]
    SpecParse(#[from] SpecParseError),

    /// A build-option fragment failed to lex or parse
    #[error(transparent)]
    BuildOptionParse(#[from] BuildOptionParseError),

    /// I/O failure while reading or writing document files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
