// Test fixture: careful versions of every flagged pattern; should produce NO findings

use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicI32, Ordering};

static COUNTER: AtomicI32 = AtomicI32::new(0);

// Argument passed as a single argv entry, no shell
fn list_dir(dir: &str) -> io::Result<ExitStatus> {
    Command::new("ls").arg("--").status()
}

// Copy bounded by the destination
fn fill(input: &[u8]) -> [u8; 10] {
    let mut buffer = [0u8; 10];
    let n = input.len().min(buffer.len());
    buffer[..n].copy_from_slice(&input[..n]);
    buffer
}

// Secrets come from the environment
fn api_key() -> Option<String> {
    std::env::var("API_KEY").ok()
}

// Parameterized query
fn find_user(db: &Db, name: &str) {
    db.query("SELECT * FROM users WHERE name = $1", &[&name]);
}

fn bump() -> i32 {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

// Allocation released, pointer cleared right after
fn round_trip() -> i32 {
    let mut ptr = Box::into_raw(Box::new(42i32));
    let boxed = unsafe { Box::from_raw(ptr) };
    ptr = std::ptr::null_mut();
    *boxed
}

// Only relative components that stay inside the root
fn safe_join(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    if relative.components().all(|c| matches!(c, Component::Normal(_))) {
        Some(root.to_path_buf())
    } else {
        None
    }
}

// Errors propagated
fn read_config() -> io::Result<String> {
    let mut contents = String::new();
    File::open("config.toml")?.read_to_string(&mut contents)?;
    Ok(contents)
}

fn run_child() -> io::Result<ExitStatus> {
    Command::new("true").status()
}
