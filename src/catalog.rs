// Demo catalog: every demo binary, the tool it targets, and what that tool should report.

use std::path::PathBuf;

use crate::types::{DemoProgram, ExpectedFinding, Tool};

pub const OVERFLOW_DEMO: &str = "overflow-demo";
pub const UNINITIALIZED_READ_DEMO: &str = "uninitialized-read-demo";
pub const STATIC_ANALYSIS_PATTERN_DEMO: &str = "static-analysis-pattern-demo";
pub const STATIC_ANALYSIS_EXTRAS_DEMO: &str = "static-analysis-extras-demo";
pub const DATA_RACE_DEMO: &str = "data-race-demo";
pub const UNDEFINED_BEHAVIOR_DEMO: &str = "undefined-behavior-demo";

/// Directory (relative to the project root) holding the demo sources.
pub const DEMO_SOURCE_DIR: &str = "src/bin";

fn active(kind: &str, location: &str) -> ExpectedFinding {
    ExpectedFinding {
        kind: kind.into(),
        location: location.into(),
        active: true,
    }
}

fn inert(kind: &str, location: &str) -> ExpectedFinding {
    ExpectedFinding {
        kind: kind.into(),
        location: location.into(),
        active: false,
    }
}

fn program(name: &str, tool: Tool, title: &str, expected: Vec<ExpectedFinding>) -> DemoProgram {
    DemoProgram {
        name: name.into(),
        source: PathBuf::from(DEMO_SOURCE_DIR).join(format!("{}.rs", name.replace('-', "_"))),
        tool,
        title: title.into(),
        expected,
    }
}

/// All demo programs, in the order they are documented.
pub fn all() -> Vec<DemoProgram> {
    vec![
        program(
            OVERFLOW_DEMO,
            Tool::AddressSanitizer,
            "Buffer Overflow",
            vec![
                active("stack-buffer-overflow", "write to arr[10]"),
                active("heap-use-after-free", "read through freed box"),
            ],
        ),
        program(
            UNINITIALIZED_READ_DEMO,
            Tool::MemorySanitizer,
            "Uninitialized Memory",
            vec![
                active("use-of-uninitialized-value", "branch on x"),
                active("use-of-uninitialized-value", "read of arr[0]"),
                active("use-of-uninitialized-value", "read of arr2[2]"),
            ],
        ),
        program(
            STATIC_ANALYSIS_PATTERN_DEMO,
            Tool::StaticScanner,
            "Security and Bug Detection",
            vec![
                active("command_injection", "command_injection"),
                active("unchecked_copy", "buffer_overflow"),
                active("dangerous_function", "dangerous_function"),
                active("hardcoded_secrets", "hardcoded_secret"),
                active("sql_injection", "sql_injection"),
                inert("weak_crypto", "weak_crypto"),
                active("shared_counter", "race_condition"),
                active("null_pointer", "null_pointer"),
                active("memory_leak", "memory_leak"),
                active("use_after_free", "use_after_free"),
            ],
        ),
        program(
            STATIC_ANALYSIS_EXTRAS_DEMO,
            Tool::StaticScanner,
            "More Security Patterns",
            vec![
                active("path_traversal", "path_traversal"),
                active("discarded_result", "missing_error_check"),
                active("process_exec", "dangerous_exec"),
                inert("insecure_random", "insecure_random"),
                inert("insecure_tls", "insecure_tls"),
            ],
        ),
        program(
            DATA_RACE_DEMO,
            Tool::ThreadSanitizer,
            "Data Race",
            vec![active("data-race", "COUNTER increment in both workers")],
        ),
        program(
            UNDEFINED_BEHAVIOR_DEMO,
            Tool::UndefinedBehaviorSanitizer,
            "Undefined Behavior",
            vec![
                active("signed-integer-overflow", "i32::MAX + 1"),
                inert("division-by-zero", "10 / 0"),
                active("shift-out-of-bounds", "1 << 100"),
                active("index-out-of-bounds", "arr[10]"),
                inert("null-pointer-dereference", "*null = 42"),
            ],
        ),
    ]
}

/// Look up a demo by its binary name.
pub fn find(name: &str) -> Option<DemoProgram> {
    all().into_iter().find(|d| d.name == name)
}

/// Banner lines for a demo: title, an `=` underline of the same width.
pub fn banner(demo: &DemoProgram) -> String {
    let title = format!("{} Example: {}", demo.tool.display_name(), demo.title);
    let underline = "=".repeat(title.chars().count());
    format!("{}\n{}\n", title, underline)
}

/// Print the banner for the named demo, followed by a blank line.
pub fn print_banner(name: &str) {
    match find(name) {
        Some(demo) => println!("{}", banner(&demo)),
        None => {
            tracing::warn!(demo = name, "demo missing from catalog");
            println!("{}\n", name);
        }
    }
}
