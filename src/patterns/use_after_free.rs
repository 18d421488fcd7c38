// Detect raw pointers that outlive the allocation they point to
// Once `Box::from_raw(p)` has run, `p` dangles. Any later read, write or second
// release is critical; a dangling binding that stays in scope unused is medium.

use std::collections::HashMap;
use std::path::Path;

use proc_macro2::Span;
use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::{call_path_ends_with, local_binding, macro_args};

pub struct UseAfterFree;

impl AnalysisPass for UseAfterFree {
    fn name(&self) -> &str {
        "use_after_free"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = UafVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct UafVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl UafVisitor<'_> {
    fn scan_body(&mut self, block: &syn::Block) {
        let mut scan = FnScan {
            path: self.path,
            released: HashMap::new(),
            findings: Vec::new(),
        };
        scan.visit_block(block);

        let mut dangling: Vec<_> = scan.released.into_iter().filter(|(_, r)| !r.used).collect();
        dangling.sort_by_key(|(_, r)| (r.span.start().line, r.span.start().column));
        for (name, release) in dangling {
            scan.findings.push(
                Finding::at(release.span, self.path, "memory", "use_after_free", Severity::Medium)
                    .message(format!(
                        "`{}` is released with `Box::from_raw` but the dangling pointer stays in scope.",
                        name
                    ))
                    .snippet(format!("Box::from_raw({})", name))
                    .fix("Null the pointer after releasing it, or keep the `Box` and let it drop."),
            );
        }
        self.findings.extend(scan.findings);
    }
}

impl<'ast> Visit<'ast> for UafVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.scan_body(&node.block);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.scan_body(&node.block);
    }
}

struct Release {
    span: Span,
    used: bool,
}

struct FnScan<'a> {
    path: &'a Path,
    /// Pointers released so far in this function.
    released: HashMap<String, Release>,
    findings: Vec<Finding>,
}

impl FnScan<'_> {
    fn report_use(&mut self, name: &str, span: Span, what: &str) {
        if let Some(release) = self.released.get_mut(name) {
            release.used = true;
            let freed_at = release.span.start().line;
            self.findings.push(
                Finding::at(span, self.path, "memory", "use_after_free", Severity::Critical)
                    .message(format!(
                        "{} `{}` after it was released on line {}.",
                        what, name, freed_at
                    ))
                    .snippet(name.to_string())
                    .fix("Do not touch the pointer after `Box::from_raw`; release it last."),
            );
        }
    }
}

impl<'ast> Visit<'ast> for FnScan<'_> {
    fn visit_local(&mut self, node: &'ast syn::Local) {
        syn::visit::visit_local(self, node);
        // Shadowing ends the dangling binding.
        if let Some(name) = local_binding(&node.pat) {
            self.released.remove(&name);
        }
    }

    fn visit_expr_assign(&mut self, node: &'ast syn::ExprAssign) {
        self.visit_expr(&node.right);
        if let syn::Expr::Path(p) = node.left.as_ref() {
            if let Some(ident) = p.path.get_ident() {
                self.released.remove(&ident.to_string());
                return;
            }
        }
        self.visit_expr(&node.left);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if call_path_ends_with(node, &["Box", "from_raw"]) {
            if let Some(name) = node.args.first().and_then(plain_ident) {
                let span = syn::spanned::Spanned::span(&node.func);
                if self.released.contains_key(&name) {
                    self.report_use(&name, span, "Second release of");
                } else {
                    self.released.insert(name, Release { span, used: false });
                }
                return;
            }
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        if let Some(ident) = node.path.get_ident() {
            self.report_use(&ident.to_string(), ident.span(), "Access through");
        }
        syn::visit::visit_expr_path(self, node);
    }

    // `println!("{}", unsafe { ptr.read() })` hides the read inside the macro body.
    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        for arg in macro_args(node) {
            self.visit_expr(&arg);
        }
    }

    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}
}

/// `p` or `(p)`; field and method receivers are not tracked.
fn plain_ident(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::Path(p) => p.path.get_ident().map(|i| i.to_string()),
        syn::Expr::Paren(p) => plain_ident(&p.expr),
        _ => None,
    }
}
