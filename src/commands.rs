// src/commands.rs
//! Command handlers for the specwright CLI

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use specwright::build::BuildOptionParser;
use specwright::spec::{GeneratorOptions, Spec};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::cli::Cli;

fn read_document(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Parse the document, printing the diagnostic and exiting nonzero on
/// failure. Diagnostics go to stderr verbatim; they are already framed.
fn parse_or_exit(file: &Path, text: &str) -> Spec {
    match Spec::parse(text) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("{}: {}", file.display(), err);
            std::process::exit(1);
        }
    }
}

/// Validate a spec document and its embedded build options
pub fn cmd_check(file: &Path) -> Result<()> {
    let text = read_document(file)?;
    debug!("Checking {}", file.display());

    let spec = parse_or_exit(file, &text);

    if let Some(fragment) = spec.build_option_text() {
        let result =
            BuildOptionParser::new(spec.main_pkg().name(), &fragment).and_then(|p| p.parse());
        if let Err(err) = result {
            eprintln!("{}: {}", file.display(), err);
            std::process::exit(1);
        }
    }

    info!(
        "Parsed {}: {} packages, {} scripts",
        file.display(),
        1 + spec.subpackages().len(),
        spec.scripts().len()
    );
    println!(
        "{}: OK ({} packages, {} dependencies, {} scripts)",
        file.display(),
        1 + spec.subpackages().len(),
        spec.main_pkg().deps().len()
            + spec
                .subpackages()
                .iter()
                .map(|p| p.deps().len())
                .sum::<usize>(),
        spec.scripts().len()
    );
    Ok(())
}

/// Regenerate a document in canonical form
pub fn cmd_format(file: &Path, options: GeneratorOptions, in_place: bool) -> Result<()> {
    let text = read_document(file)?;
    let spec = parse_or_exit(file, &text);

    let canonical = spec.generate_with(&options);
    if in_place {
        if canonical == text {
            debug!("{} already canonical", file.display());
        } else {
            fs::write(file, &canonical)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            info!("Rewrote {}", file.display());
        }
    } else {
        print!("{canonical}");
    }
    Ok(())
}

/// Extract and parse the build-option fragment of a document
pub fn cmd_options(file: &Path, json: bool) -> Result<()> {
    let text = read_document(file)?;
    let spec = parse_or_exit(file, &text);

    // A document without a build-system block has an empty fragment, which
    // parses to the default configuration.
    let fragment = spec.build_option_text().unwrap_or_default();
    let parsed =
        match BuildOptionParser::new(spec.main_pkg().name(), &fragment).and_then(|p| p.parse()) {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("{}: {}", file.display(), err);
                std::process::exit(1);
            }
        };

    if json {
        println!("{}", serde_json::to_string_pretty(parsed.config())?);
    } else {
        println!("{}", parsed.canonical());
    }
    Ok(())
}

/// Write a completion script for the given shell to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "Name: foo\n%description\nTest package.\n%changelog\n";

    const WITH_OPTIONS: &str = "\
Name: foo
BuildSystem: maven
BuildOption: skipTests
BuildOption: artifact \"org.foo:*\" { package \"foo-libs\" }
%description
Test package.
%changelog
";

    fn write_doc(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_check_accepts_minimal_document() {
        let doc = write_doc(MINIMAL);
        cmd_check(doc.path()).unwrap();
    }

    #[test]
    fn test_check_accepts_document_with_build_options() {
        let doc = write_doc(WITH_OPTIONS);
        cmd_check(doc.path()).unwrap();
    }

    #[test]
    fn test_check_fails_on_missing_file() {
        let result = cmd_check(Path::new("/nonexistent/path.spec"));
        assert!(result.is_err());
    }

    #[test]
    fn test_format_in_place_writes_canonical_text() {
        let doc = write_doc(MINIMAL);
        cmd_format(doc.path(), GeneratorOptions::default(), true).unwrap();
        let rewritten = fs::read_to_string(doc.path()).unwrap();
        assert!(rewritten.starts_with("Name:           foo\n"));
        // A second pass is a no-op.
        cmd_format(doc.path(), GeneratorOptions::default(), true).unwrap();
        assert_eq!(fs::read_to_string(doc.path()).unwrap(), rewritten);
    }

    #[test]
    fn test_format_to_stdout_leaves_file_untouched() {
        let doc = write_doc(MINIMAL);
        cmd_format(doc.path(), GeneratorOptions::default(), false).unwrap();
        assert_eq!(fs::read_to_string(doc.path()).unwrap(), MINIMAL);
    }

    #[test]
    fn test_options_json_output() {
        let doc = write_doc(WITH_OPTIONS);
        cmd_options(doc.path(), true).unwrap();
    }

    #[test]
    fn test_options_on_document_without_build_system() {
        let doc = write_doc(MINIMAL);
        cmd_options(doc.path(), false).unwrap();
    }
}
