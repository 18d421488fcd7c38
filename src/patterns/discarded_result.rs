// Detect fallible calls whose result is thrown away with `let _ =`
// `let _ = File::open(..)` swallows the error and the value in one go.
// Only calls known to return a `Result` (std I/O, process, channel and lock
// operations, plus any `try_*`) are flagged; `let _ = String::new()` is silent.

use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};

/// Final path segment or method name of calls that return a `Result`.
const FALLIBLE_CALLS: &[&str] = &[
    // fs and io
    "open", "create", "read", "read_to_string", "read_to_end", "read_exact", "write",
    "write_all", "flush", "sync_all", "remove_file", "remove_dir", "remove_dir_all",
    "create_dir", "create_dir_all", "rename", "copy", "metadata", "set_permissions",
    // process and threads
    "status", "output", "spawn", "wait", "kill", "join",
    // channels, locks, sockets
    "send", "recv", "lock", "connect", "bind", "shutdown",
    // conversions
    "parse",
];

fn is_fallible(name: &str) -> bool {
    FALLIBLE_CALLS.contains(&name) || name.starts_with("try_")
}

pub struct DiscardedResult;

impl AnalysisPass for DiscardedResult {
    fn name(&self) -> &str {
        "discarded_result"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = DiscardVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct DiscardVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl<'ast> Visit<'ast> for DiscardVisitor<'_> {
    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let (syn::Pat::Wild(wild), Some(init)) = (&node.pat, &node.init) {
            if let Some((callee, _)) = callee_text(&init.expr).filter(|(_, last)| is_fallible(last)) {
                self.findings.push(
                    Finding::at(syn::spanned::Spanned::span(wild), self.path, "security", "discarded_result", Severity::Medium)
                        .message(format!("Result of `{}` is discarded without checking for an error.", callee))
                        .snippet(format!("let _ = {}(..)", callee))
                        .fix("Handle the error with `?`, `match`, or log it explicitly."),
                );
            }
        }
        syn::visit::visit_local(self, node);
    }
}

/// Printable callee of a call or method call (`File::open`, `.send`) and its
/// final name (`open`, `send`).
fn callee_text(expr: &syn::Expr) -> Option<(String, String)> {
    match expr {
        syn::Expr::Call(call) => match call.func.as_ref() {
            syn::Expr::Path(p) => {
                let segments: Vec<String> = p.path.segments.iter().map(|s| s.ident.to_string()).collect();
                let last = segments.last()?.clone();
                Some((segments.join("::"), last))
            }
            _ => None,
        },
        syn::Expr::MethodCall(mc) => Some((format!(".{}", mc.method), mc.method.to_string())),
        syn::Expr::Await(a) => callee_text(&a.base),
        syn::Expr::Paren(p) => callee_text(&p.expr),
        _ => None,
    }
}
