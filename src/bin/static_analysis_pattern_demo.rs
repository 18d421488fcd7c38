// Static analysis demo: one flagged pattern per routine.
// Check: cargo run --bin demo-check
// The routines are never called; they exist to be scanned.

#![allow(dead_code)]

use std::ffi::c_char;
use std::io;
use std::process::{Command, ExitStatus};
use std::ptr;

use sanitizer_demos::{catalog, logging};

unsafe extern "C" {
    fn strcpy(dest: *mut c_char, src: *const c_char) -> *mut c_char;
}

// Example 1: Command injection
fn command_injection(user_input: &str) -> io::Result<ExitStatus> {
    // Dangerous: user input in a shell command
    Command::new("sh")
        .arg("-c")
        .arg(format!("ls {}", user_input))
        .status()
}

// Example 2: Buffer overflow
fn buffer_overflow(input: &[u8]) {
    let mut buffer = [0u8; 10];

    // Dangerous: no bounds checking, length comes from the input
    unsafe {
        ptr::copy_nonoverlapping(input.as_ptr(), buffer.as_mut_ptr(), input.len());
    }
    println!("{}", String::from_utf8_lossy(&buffer));
}

// Example 3: Use of a dangerous function
fn dangerous_function() {
    let mut buffer: [c_char; 100] = [0; 100];
    let input = c"some string";

    // Dangerous: strcpy doesn't check bounds
    unsafe {
        strcpy(buffer.as_mut_ptr(), input.as_ptr());
    }

    // gets() is worse still and is not even declared here
    // gets(buffer.as_mut_ptr());
}

// Example 4: Hardcoded secrets
fn hardcoded_secret() {
    let api_key = "sk-1234567890abcdef";
    let password = "admin123";

    println!("API Key: {}", api_key);
    println!("Password length: {}", password.len());
}

// Example 5: SQL injection
fn sql_injection(user_input: &str) {
    // Dangerous: user input spliced into the query text
    let query = format!("SELECT * FROM users WHERE name = '{}'", user_input);
    // db.execute(&query);
    println!("{}", query);
}

// Example 6: Weak cryptography
fn weak_crypto() {
    // Using weak hash functions
    // MD5 is cryptographically broken
    // Prefer SHA-256 or better
}

// Example 7: Race condition
static mut GLOBAL_COUNTER: i32 = 0;

fn race_condition() {
    // Accessing a global without synchronization
    unsafe {
        GLOBAL_COUNTER += 1;
    }
}

// Example 8: Null pointer dereference
fn null_pointer() {
    let ptr: *mut i32 = ptr::null_mut();

    if !ptr.is_null() {
        unsafe {
            *ptr = 42; // guarded
        }
    }

    // Forgot to check:
    // unsafe { *ptr = 42; }
}

// Example 9: Memory leak
fn memory_leak() {
    let _ptr = Box::into_raw(vec![0i32; 100].into_boxed_slice());
    // Forgot to release:
    // drop(unsafe { Box::from_raw(_ptr) });
}

// Example 10: Use after free
fn use_after_free() {
    let ptr = Box::into_raw(Box::new(42i32));
    unsafe {
        drop(Box::from_raw(ptr));
    }
    // unsafe { *ptr = 100; }
}

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::STATIC_ANALYSIS_PATTERN_DEMO);

    println!("This file contains code patterns that static scanners can detect.");
    println!("Run 'cargo run --bin demo-check' to scan for issues.\n");

    println!("Common detections:");
    println!("- Command injection vulnerabilities");
    println!("- Buffer overflows");
    println!("- Dangerous function usage (strcpy, gets, etc.)");
    println!("- Hardcoded secrets and credentials");
    println!("- SQL injection patterns");
    println!("- Weak cryptography");
    println!("- Race conditions");
    println!("- Null pointer dereferences");
    println!("- Memory leaks");
    println!("- Use after free");
}
