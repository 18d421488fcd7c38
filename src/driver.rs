// Analysis driver - syn-based source analysis engine
// Defines core types (Finding, Severity, AnalysisPass) and the AnalysisDriver
// that walks .rs files, parses them with syn, runs all registered passes and
// attributes each finding to the function that contains it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use syn::spanned::Spanned;
use walkdir::WalkDir;

use crate::patterns;
use crate::types::CheckConfig;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single finding produced by an analysis pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    /// Origin category: "memory" for memory/concurrency patterns, "security" for injection and secrets.
    pub source: String,
    /// Name of the check that produced this finding.
    pub check_name: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// File path where the finding was detected.
    pub file: PathBuf,
    /// Line number (1-based).
    pub line: usize,
    /// Column number (0-based).
    pub col: usize,
    /// Enclosing function, filled in by the driver.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Source code snippet around the finding.
    pub snippet: String,
    /// Suggested fix.
    pub fix: String,
}

impl Finding {
    /// Builds a finding at `span`; the driver fills in `function` afterwards.
    pub fn at(
        span: proc_macro2::Span,
        path: &Path,
        source: &str,
        check_name: &str,
        severity: Severity,
    ) -> Self {
        Finding {
            source: source.into(),
            check_name: check_name.into(),
            severity,
            file: path.to_path_buf(),
            line: span.start().line,
            col: span.start().column,
            function: None,
            message: String::new(),
            snippet: String::new(),
            fix: String::new(),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = fix.into();
        self
    }
}

/// Trait that all pattern checks implement.
pub trait AnalysisPass: Send + Sync {
    /// Returns the name of this analysis pass (e.g. "use_after_free").
    fn name(&self) -> &str;

    /// Runs this pass against a parsed file and returns any findings.
    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding>;
}

/// The analysis driver holds all registered passes and orchestrates analysis.
pub struct AnalysisDriver {
    passes: Vec<Box<dyn AnalysisPass>>,
    exclude: Vec<String>,
}

impl AnalysisDriver {
    /// Creates a new driver with all built-in passes registered.
    pub fn new() -> Self {
        Self::with_config(&CheckConfig::default())
    }

    /// Creates a driver honoring `disabled_checks` and `exclude` from the config.
    pub fn with_config(config: &CheckConfig) -> Self {
        let passes = patterns::all_passes()
            .into_iter()
            .filter(|pass| {
                let keep = !config.disabled_checks.iter().any(|d| d == pass.name());
                if !keep {
                    tracing::debug!(pass = pass.name(), "pass disabled by config");
                }
                keep
            })
            .collect();

        AnalysisDriver {
            passes,
            exclude: config.exclude.clone(),
        }
    }

    /// Analyzes all .rs files under the given path.
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn analyze_project(&self, project_path: &Path) -> Vec<Finding> {
        let mut all_findings = Vec::new();

        for entry in WalkDir::new(project_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().extension().is_some_and(|ext| ext == "rs")
                    && !self.is_excluded_path(e.path())
            })
        {
            match self.analyze_file(entry.path()) {
                Ok(findings) => all_findings.extend(findings),
                Err(e) => tracing::warn!(path = %entry.path().display(), "skipping: {:#}", e),
            }
        }

        all_findings
    }

    /// Reads, parses and analyzes a single file.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Finding>> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.analyze_source(&source, path)
    }

    /// Parses `source` and runs every pass; `path` is only used for reporting.
    pub fn analyze_source(&self, source: &str, path: &Path) -> Result<Vec<Finding>> {
        let parsed = syn::parse_file(source)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let spans = function_spans(&parsed);
        let mut findings = Vec::new();
        for pass in &self.passes {
            let mut pass_findings = pass.check_file(&parsed, path);
            tracing::trace!(pass = pass.name(), count = pass_findings.len(), path = %path.display());
            for finding in &mut pass_findings {
                finding.function = enclosing_function(&spans, finding.line);
            }
            findings.extend(pass_findings);
        }

        findings.sort_by_key(|f| (f.line, f.col));
        Ok(findings)
    }

    /// Returns the number of registered passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Names of the registered passes, in registration order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Returns true if the path should be excluded from analysis
    /// (build artifacts, VCS metadata, configured excludes).
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        path_str.contains("/target/")
            || path_str.contains("/.git/")
            || self.exclude.iter().any(|e| path_str.contains(e.as_str()))
    }
}

impl Default for AnalysisDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Line ranges of every function item, including methods and nested modules.
fn function_spans(file: &syn::File) -> Vec<(String, usize, usize)> {
    let mut spans = Vec::new();
    collect_item_spans(&file.items, &mut spans);
    spans
}

fn collect_item_spans(items: &[syn::Item], spans: &mut Vec<(String, usize, usize)>) {
    for item in items {
        match item {
            syn::Item::Fn(f) => {
                let span = f.span();
                spans.push((f.sig.ident.to_string(), span.start().line, span.end().line));
            }
            syn::Item::Impl(imp) => {
                for impl_item in &imp.items {
                    if let syn::ImplItem::Fn(f) = impl_item {
                        let span = f.span();
                        spans.push((f.sig.ident.to_string(), span.start().line, span.end().line));
                    }
                }
            }
            syn::Item::Mod(m) => {
                if let Some((_, nested)) = &m.content {
                    collect_item_spans(nested, spans);
                }
            }
            _ => {}
        }
    }
}

/// Innermost function whose line range contains `line`.
fn enclosing_function(spans: &[(String, usize, usize)], line: usize) -> Option<String> {
    spans
        .iter()
        .filter(|(_, start, end)| *start <= line && line <= *end)
        .min_by_key(|(_, start, end)| end - start)
        .map(|(name, _, _)| name.clone())
}
