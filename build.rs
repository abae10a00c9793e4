// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: path to the spec document
fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_name("FILE")
        .help("Path to the spec document")
}

fn build_cli() -> Command {
    Command::new("specwright")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Specwright Contributors")
        .about("Parse, validate and reformat declarative package-build metadata")
        .subcommand_required(false)
        .subcommand(
            Command::new("check")
                .about("Parse a spec document and its embedded build options")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("format")
                .about("Regenerate a spec document in canonical form")
                .arg(file_arg())
                .arg(
                    Arg::new("inline_files")
                        .long("inline-files")
                        .action(ArgAction::SetTrue)
                        .help("Render %files sections inline after each package"),
                )
                .arg(
                    Arg::new("sort_tags")
                        .long("sort-tags")
                        .action(ArgAction::SetTrue)
                        .help("Sort tags by their fixed precedence"),
                )
                .arg(
                    Arg::new("sort_deps")
                        .long("sort-deps")
                        .action(ArgAction::SetTrue)
                        .help("Group dependencies by kind and condition"),
                )
                .arg(
                    Arg::new("sort_scripts")
                        .long("sort-scripts")
                        .action(ArgAction::SetTrue)
                        .help("Order scripts by build phase"),
                )
                .arg(
                    Arg::new("in_place")
                        .short('i')
                        .long("in-place")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite the file instead of printing to stdout"),
                ),
        )
        .subcommand(
            Command::new("options")
                .about("Extract and parse the build-option fragment of a document")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the parsed configuration as JSON"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_name("SHELL")
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("specwright.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
