// Detect API keys, passwords, tokens in string literals
// Uses regex patterns for known key formats, secret-looking binding names,
// and Shannon entropy for high-entropy strings.

use std::path::Path;

use regex::Regex;
use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::local_binding;

/// Known secret patterns: (name, regex pattern)
const SECRET_PATTERNS: &[(&str, &str)] = &[
    ("AWS Access Key", r"AKIA[0-9A-Z]{16}"),
    ("GitHub Personal Access Token", r"ghp_[a-zA-Z0-9]{36}"),
    ("GitHub OAuth Token", r"gho_[a-zA-Z0-9]{36}"),
    ("OpenAI-style API Key", r"sk-[a-zA-Z0-9]{16,}"),
    ("Slack Token", r"xox[baprs]-[a-zA-Z0-9\-]{10,}"),
    ("Stripe Secret Key", r"sk_live_[a-zA-Z0-9]{20,}"),
    ("Google API Key", r"AIza[0-9A-Za-z\-_]{35}"),
    ("Generic Password Assignment", r#"(?i)(password|passwd|pwd)\s*=\s*['"][^'"]{4,}['"]"#),
    ("Private Key Header", r"-----BEGIN (RSA |EC |DSA )?PRIVATE KEY-----"),
    ("Bearer Token", r"(?i)bearer\s+[a-zA-Z0-9\-_.~+/]{20,}"),
];

/// Binding names that mark the bound literal as a credential.
const SECRET_NAME_PATTERN: &str =
    r"(?i)(password|passwd|pwd|secret|api_?key|access_?token|auth_?token|private_?key)";

/// Shortest literal a secret-named binding must hold to be reported.
const MIN_NAMED_SECRET_LEN: usize = 4;

/// Minimum string length to check for high-entropy secrets.
const MIN_ENTROPY_STRING_LEN: usize = 20;

/// Shannon entropy threshold for flagging strings.
const ENTROPY_THRESHOLD: f64 = 4.5;

pub struct HardcodedSecrets {
    patterns: Vec<(String, Regex)>,
    secret_name: Option<Regex>,
}

impl HardcodedSecrets {
    pub fn new() -> Self {
        let patterns = SECRET_PATTERNS
            .iter()
            .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|r| (name.to_string(), r)))
            .collect();
        HardcodedSecrets {
            patterns,
            secret_name: Regex::new(SECRET_NAME_PATTERN).ok(),
        }
    }
}

impl Default for HardcodedSecrets {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisPass for HardcodedSecrets {
    fn name(&self) -> &str {
        "hardcoded_secrets"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = SecretVisitor {
            findings: Vec::new(),
            path,
            pass: self,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct SecretVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
    pass: &'a HardcodedSecrets,
}

impl SecretVisitor<'_> {
    /// `let password = "..."`, `const API_KEY: &str = "..."`.
    /// Returns true when a finding was recorded.
    fn check_named_literal(&mut self, name: &str, expr: &syn::Expr) -> bool {
        let Some(secret_name) = &self.pass.secret_name else {
            return false;
        };
        let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit_str),
            ..
        }) = expr
        else {
            return false;
        };
        let value = lit_str.value();
        if !secret_name.is_match(name) || value.len() < MIN_NAMED_SECRET_LEN {
            return false;
        }

        self.findings.push(
            Finding::at(lit_str.span(), self.path, "security", "hardcoded_secrets", Severity::Critical)
                .message(format!("Hardcoded credential bound to `{}`.", name))
                .snippet(truncate_secret(&value))
                .fix("Load from environment variable or secret manager. Never hardcode secrets."),
        );
        true
    }

    fn check_string_literal(&mut self, value: &str, span: proc_macro2::Span) {
        for (name, regex) in &self.pass.patterns {
            if regex.is_match(value) {
                self.findings.push(
                    Finding::at(span, self.path, "security", "hardcoded_secrets", Severity::Critical)
                        .message(format!("Hardcoded {} detected in string literal.", name))
                        .snippet(truncate_secret(value))
                        .fix("Load from environment variable or secret manager. Never hardcode secrets."),
                );
                return; // One finding per string is enough
            }
        }

        if value.len() >= MIN_ENTROPY_STRING_LEN {
            let entropy = shannon_entropy(value);
            if entropy > ENTROPY_THRESHOLD && !is_likely_false_positive(value) {
                self.findings.push(
                    Finding::at(span, self.path, "security", "hardcoded_secrets", Severity::High)
                        .message(format!(
                            "High-entropy string detected (entropy: {:.2}). Possible hardcoded secret.",
                            entropy
                        ))
                        .snippet(truncate_secret(value))
                        .fix("If this is a secret, load from environment variable or secret manager."),
                );
            }
        }
    }
}

impl<'ast> Visit<'ast> for SecretVisitor<'_> {
    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let (Some(name), Some(init)) = (local_binding(&node.pat), &node.init) {
            if self.check_named_literal(&name, &init.expr) {
                return;
            }
        }
        syn::visit::visit_local(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        if !self.check_named_literal(&node.ident.to_string(), &node.expr) {
            syn::visit::visit_item_const(self, node);
        }
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        if !self.check_named_literal(&node.ident.to_string(), &node.expr) {
            syn::visit::visit_item_static(self, node);
        }
    }

    fn visit_expr_lit(&mut self, node: &'ast syn::ExprLit) {
        if let syn::Lit::Str(lit_str) = &node.lit {
            self.check_string_literal(&lit_str.value(), lit_str.span());
        }
        syn::visit::visit_expr_lit(self, node);
    }
}

/// Calculate Shannon entropy of a string.
fn shannon_entropy(s: &str) -> f64 {
    let len = s.len() as f64;
    if len == 0.0 {
        return 0.0;
    }

    let mut freq = [0u32; 256];
    for byte in s.bytes() {
        freq[byte as usize] += 1;
    }

    let mut entropy = 0.0f64;
    for &count in &freq {
        if count > 0 {
            let p = count as f64 / len;
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Truncate a secret for display, showing only the first 8 characters.
fn truncate_secret(s: &str) -> String {
    match s.char_indices().nth(8) {
        Some((idx, _)) => format!("\"{}...\"", &s[..idx]),
        None => format!("\"{}\"", s),
    }
}

/// Filter out common false positives for entropy check.
fn is_likely_false_positive(s: &str) -> bool {
    s.starts_with("http://")
        || s.starts_with("https://")
        || s.starts_with('/')
        || s.contains("SELECT ")
        || s.contains("INSERT ")
        || s.contains("UPDATE ")
        || s.contains("DELETE ")
        || s.starts_with('<')
        || s.contains("{}")
        || s.contains('\n')
}
