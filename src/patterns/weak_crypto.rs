// Flag weak hash functions, broken ciphers and ECB mode by name.
// Names match case-insensitively, so `Md5`, `MD5` and the `md5` crate all count.
// Comments are never read: a routine that only mentions MD5 in prose stays silent.

use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};

struct WeakAlgorithm {
    /// Lowercase identifier spellings.
    names: &'static [&'static str],
    reason: &'static str,
    fix: &'static str,
}

const WEAK_ALGORITHMS: &[WeakAlgorithm] = &[
    WeakAlgorithm {
        names: &["md5"],
        reason: "MD5 is cryptographically broken",
        fix: "Use SHA-256 or SHA-3 instead",
    },
    WeakAlgorithm {
        names: &["sha1"],
        reason: "SHA-1 is cryptographically broken",
        fix: "Use SHA-256 or SHA-3 instead",
    },
    WeakAlgorithm {
        names: &["des"],
        reason: "DES has a 56-bit key and is broken",
        fix: "Use AES-256 instead",
    },
    WeakAlgorithm {
        names: &["tripledes", "des3"],
        reason: "3DES is deprecated",
        fix: "Use AES-256 instead",
    },
    WeakAlgorithm {
        names: &["rc4"],
        reason: "RC4 has known biases and is broken",
        fix: "Use AES-GCM or ChaCha20-Poly1305 instead",
    },
    WeakAlgorithm {
        names: &["blowfish"],
        reason: "Blowfish has a 64-bit block size",
        fix: "Use AES-256 instead",
    },
    WeakAlgorithm {
        names: &["ecb"],
        reason: "ECB mode does not provide semantic security",
        fix: "Use CBC, CTR, or GCM mode instead",
    },
];

fn weak_algorithm(ident: &syn::Ident) -> Option<&'static WeakAlgorithm> {
    let lowered = ident.to_string().to_ascii_lowercase();
    WEAK_ALGORITHMS
        .iter()
        .find(|alg| alg.names.contains(&lowered.as_str()))
}

pub struct WeakCrypto;

impl AnalysisPass for WeakCrypto {
    fn name(&self) -> &str {
        "weak_crypto"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut scanner = AlgorithmScanner {
            findings: Vec::new(),
            path,
        };
        scanner.visit_file(file);
        scanner.findings
    }
}

struct AlgorithmScanner<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl AlgorithmScanner<'_> {
    fn report(&mut self, ident: &syn::Ident, imported: bool) {
        let Some(alg) = weak_algorithm(ident) else {
            return;
        };
        let verb = if imported { "Imports" } else { "Uses" };
        self.findings.push(
            Finding::at(ident.span(), self.path, "security", "weak_crypto", Severity::High)
                .message(format!("{} `{}`: {}.", verb, ident, alg.reason))
                .snippet(ident.to_string())
                .fix(alg.fix),
        );
    }
}

impl<'ast> Visit<'ast> for AlgorithmScanner<'_> {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        for segment in &node.segments {
            self.report(&segment.ident, false);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_use_path(&mut self, node: &'ast syn::UsePath) {
        self.report(&node.ident, true);
        syn::visit::visit_use_path(self, node);
    }

    fn visit_use_name(&mut self, node: &'ast syn::UseName) {
        self.report(&node.ident, true);
    }
}
