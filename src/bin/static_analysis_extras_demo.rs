// Static analysis demo: file, error-handling and process patterns.
// Check: cargo run --bin demo-check -- --demo static-analysis-extras-demo
// The routines are never called; they exist to be scanned.

#![allow(dead_code)]

use std::fs::File;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
#[cfg(unix)]
use std::process::Command;

use sanitizer_demos::{catalog, logging};

// Example 1: Path traversal
fn path_traversal(user_input: &str) -> Option<String> {
    // Dangerous: "../" in user input escapes /data
    let full = Path::new("/data").join(user_input);
    let mut contents = String::new();
    match File::open(full) {
        Ok(mut file) => file.read_to_string(&mut contents).ok().map(|_| contents),
        Err(_) => None,
    }
}

// Example 2: Missing error check
fn missing_error_check() {
    let _ = File::open("file.txt");
}

// Example 3: Dangerous process replacement
#[cfg(unix)]
fn dangerous_exec() {
    // exec only returns on failure
    let err = Command::new("/bin/sh").exec();
    eprintln!("exec failed: {}", err);
}

// Example 4: Insecure random
fn insecure_random() {
    // Using a non-cryptographic generator for tokens
    // Prefer an OS-backed CSPRNG for anything security-sensitive
}

// Example 5: Insecure TLS
fn insecure_tls() {
    // Disabling certificate verification
    // Never accept invalid certificates outside of local tests
}

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::STATIC_ANALYSIS_EXTRAS_DEMO);

    println!("This file contains more code patterns that static scanners can detect.");
    println!("Run 'cargo run --bin demo-check' to scan for issues.\n");

    println!("Common detections:");
    println!("- Path traversal vulnerabilities");
    println!("- Missing error checks");
    println!("- Dangerous process replacement");
    println!("- Insecure random number generation");
    println!("- Insecure TLS configuration");
}
