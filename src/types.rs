use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export core analysis types from driver module
pub use crate::driver::{Finding, Severity};

/// The diagnostic a demo program is written to trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    AddressSanitizer,
    MemorySanitizer,
    ThreadSanitizer,
    UndefinedBehaviorSanitizer,
    StaticScanner,
}

impl Tool {
    /// Name used in demo banners, e.g. "AddressSanitizer".
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::AddressSanitizer => "AddressSanitizer",
            Tool::MemorySanitizer => "MemorySanitizer",
            Tool::ThreadSanitizer => "ThreadSanitizer",
            Tool::UndefinedBehaviorSanitizer => "UndefinedBehaviorSanitizer",
            Tool::StaticScanner => "Static Analysis",
        }
    }

    /// How the harness enables this tool for a Rust build.
    pub fn rustc_flag(self) -> &'static str {
        match self {
            Tool::AddressSanitizer => "-Zsanitizer=address",
            Tool::MemorySanitizer => "-Zsanitizer=memory -Zsanitizer-memory-track-origins",
            Tool::ThreadSanitizer => "-Zsanitizer=thread",
            Tool::UndefinedBehaviorSanitizer => "-Zub-checks=yes (or cargo miri run)",
            Tool::StaticScanner => "none (source scan)",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One diagnostic a demo is expected to produce (or, when `active` is false,
/// a construct that is present in source but must stay silent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedFinding {
    /// Stable kebab-case kind for sanitizer demos, check name for static demos.
    pub kind: String,
    /// Statement or routine the finding is localized to.
    pub location: String,
    pub active: bool,
}

/// A demo program as listed in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoProgram {
    /// Catalog name, identical to the binary name.
    pub name: String,
    /// Source path relative to the project root.
    pub source: PathBuf,
    pub tool: Tool,
    pub title: String,
    pub expected: Vec<ExpectedFinding>,
}

impl DemoProgram {
    /// Expected findings that must actually fire.
    pub fn active_expectations(&self) -> impl Iterator<Item = &ExpectedFinding> {
        self.expected.iter().filter(|e| e.active)
    }
}

/// Self-check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Passes the driver should not register
    pub disabled_checks: Vec<String>,
    /// Path substrings skipped while walking sources
    pub exclude: Vec<String>,
    /// Fail when a routine with no expectation produces findings
    pub strict: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            disabled_checks: Vec::new(),
            exclude: Vec::new(),
            strict: true,
        }
    }
}

/// Outcome of checking one routine of a static demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineCheck {
    pub routine: String,
    /// Check expected to fire, `None` for inert routines.
    pub expected: Option<String>,
    /// Distinct checks that actually fired, sorted.
    pub observed: Vec<String>,
    pub pass: bool,
}

/// Result of checking one demo program's source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoCheck {
    pub demo: String,
    pub tool: Tool,
    pub pass: bool,
    pub routines: Vec<RoutineCheck>,
    pub findings: Vec<Finding>,
}

/// Summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_findings: usize,
    pub by_severity: SeverityCounts,
}

/// Counts by severity level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    #[serde(skip_serializing_if = "is_zero")]
    pub critical: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub high: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub medium: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub low: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub info: usize,
}

fn is_zero(val: &usize) -> bool {
    *val == 0
}

/// The full self-check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub version: String,
    pub pass: bool,
    pub demos: Vec<DemoCheck>,
    /// Catalog entries whose source file is missing.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_sources: Vec<PathBuf>,
    /// Demo sources on disk that the catalog does not list.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub uncatalogued: Vec<PathBuf>,
    pub summary: Summary,
}

/// CLI options passed through the self-check
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project root
    pub project_path: PathBuf,
    /// Optional config file path override
    pub config_path: Option<PathBuf>,
    /// Output JSON to stdout
    pub json_output: bool,
    /// Restrict to a single demo
    pub demo_filter: Option<String>,
    /// Verbose output
    pub verbose: bool,
}
