// demo-check: catalog listing and pattern self-check for the sanitizer demos
// Entry point - exit 0 on pass, 1 on a mapping mismatch, 2 on error

use clap::Parser;
use std::path::PathBuf;
use std::process;

use sanitizer_demos::types::RunOptions;
use sanitizer_demos::{catalog, json_output, logging, verify};

/// demo-check - keeps every demo in step with what its checker reports.
///
/// Lists the demo catalog (which tool to enable, which findings to expect), or
/// scans the static demos and verifies each routine maps to exactly one check.
#[derive(Parser, Debug)]
#[command(
    name = "demo-check",
    version,
    about = "Catalog and pattern self-check for the sanitizer demos"
)]
struct DemoCheckArgs {
    /// Path to the project root (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to a custom configuration file
    #[arg(long = "config", short = 'c')]
    config_path: Option<PathBuf>,

    /// Output results as JSON to stdout
    #[arg(long = "json", short = 'j')]
    json: bool,

    /// Print the demo catalog instead of checking
    #[arg(long = "list", short = 'l')]
    list: bool,

    /// Restrict to a single demo, by binary name
    #[arg(long = "demo", short = 'd')]
    demo: Option<String>,

    /// Enable verbose output
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,
}

fn main() {
    let args = DemoCheckArgs::parse();
    logging::init(args.verbose);

    if args.list {
        process::exit(list(&args));
    }

    let project_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&args.path)
    };

    if !project_path.join("Cargo.toml").exists() {
        eprintln!("Error: No Cargo.toml found at {}", project_path.display());
        eprintln!("Point demo-check at the sanitizer-demos project root.");
        process::exit(2);
    }

    let options = RunOptions {
        project_path,
        config_path: args.config_path,
        json_output: args.json,
        demo_filter: args.demo,
        verbose: args.verbose,
    };

    match verify::run(&options) {
        Ok(report) => {
            if report.pass {
                process::exit(0);
            } else {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            process::exit(2);
        }
    }
}

/// Print the catalog (optionally one demo); returns the exit code.
fn list(args: &DemoCheckArgs) -> i32 {
    let demos = match &args.demo {
        Some(name) => match catalog::find(name) {
            Some(demo) => vec![demo],
            None => {
                eprintln!("Error: Unknown demo '{}'", name);
                return 2;
            }
        },
        None => catalog::all(),
    };

    if args.json {
        match json_output::catalog_to_json(&demos) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {:?}", e);
                return 2;
            }
        }
    } else {
        json_output::print_catalog(&demos);
    }
    0
}
