// Detect heap allocations that are never released
// Per function: a `Box::into_raw` bound to a local with no matching `Box::from_raw`
// and not handed back to the caller, plus any `mem::forget` / `Box::leak`.

use std::collections::HashSet;
use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::{call_path_ends_with, local_binding, root_ident};

pub struct MemoryLeak;

impl AnalysisPass for MemoryLeak {
    fn name(&self) -> &str {
        "memory_leak"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = LeakVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct LeakVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl LeakVisitor<'_> {
    fn scan_body(&mut self, block: &syn::Block) {
        let mut scan = FnScan {
            path: self.path,
            raw_bindings: Vec::new(),
            released: HashSet::new(),
            returned: HashSet::new(),
            findings: Vec::new(),
        };
        scan.visit_block(block);
        if let Some(syn::Stmt::Expr(tail, None)) = block.stmts.last() {
            if let Some(name) = root_ident(tail) {
                scan.returned.insert(name);
            }
        }

        for (name, span) in &scan.raw_bindings {
            if !scan.released.contains(name) && !scan.returned.contains(name) {
                scan.findings.push(
                    Finding::at(*span, self.path, "memory", "memory_leak", Severity::Medium)
                        .message(format!(
                            "`{}` owns a heap allocation via `Box::into_raw` that is never released.",
                            name
                        ))
                        .snippet(format!("let {} = Box::into_raw(..)", name))
                        .fix("Release it with `drop(Box::from_raw(ptr))` on every path, or keep the `Box`."),
                );
            }
        }
        self.findings.extend(scan.findings);
    }
}

impl<'ast> Visit<'ast> for LeakVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.scan_body(&node.block);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.scan_body(&node.block);
    }
}

struct FnScan<'a> {
    path: &'a Path,
    raw_bindings: Vec<(String, proc_macro2::Span)>,
    released: HashSet<String>,
    returned: HashSet<String>,
    findings: Vec<Finding>,
}

impl<'ast> Visit<'ast> for FnScan<'_> {
    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let (Some(name), Some(init)) = (local_binding(&node.pat), &node.init) {
            if let syn::Expr::Call(call) = init.expr.as_ref() {
                if call_path_ends_with(call, &["Box", "into_raw"]) {
                    self.raw_bindings
                        .push((name, syn::spanned::Spanned::span(&call.func)));
                }
            }
        }
        syn::visit::visit_local(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if call_path_ends_with(node, &["Box", "from_raw"]) {
            if let Some(name) = node.args.first().and_then(root_ident) {
                self.released.insert(name);
            }
        } else if call_path_ends_with(node, &["mem", "forget"])
            || call_path_ends_with(node, &["Box", "leak"])
        {
            let what = if call_path_ends_with(node, &["Box", "leak"]) {
                "Box::leak"
            } else {
                "mem::forget"
            };
            self.findings.push(
                Finding::at(syn::spanned::Spanned::span(&node.func), self.path, "memory", "memory_leak", Severity::Medium)
                    .message(format!("`{}` gives up ownership without freeing the allocation.", what))
                    .snippet(format!("{}(..)", what))
                    .fix("Let the value drop normally, or keep ownership until it can be released."),
            );
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_expr_return(&mut self, node: &'ast syn::ExprReturn) {
        if let Some(name) = node.expr.as_deref().and_then(root_ident) {
            self.returned.insert(name);
        }
        syn::visit::visit_expr_return(self, node);
    }

    // Closures and nested fns are scanned on their own terms.
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}
}
