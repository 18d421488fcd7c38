// Detect raw copies sized by the source instead of the destination
// `ptr::copy_nonoverlapping(src.as_ptr(), dst.as_mut_ptr(), src.len())` writes
// past `dst` whenever the input is longer than the buffer.

use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::{call_name, root_ident};

/// Raw copy primitives taking (src, dst, count).
const RAW_COPIES: &[&str] = &["copy_nonoverlapping", "copy"];

pub struct UncheckedCopy;

impl AnalysisPass for UncheckedCopy {
    fn name(&self) -> &str {
        "unchecked_copy"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = CopyVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct CopyVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl<'ast> Visit<'ast> for CopyVisitor<'_> {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        let is_raw_copy = call_name(node).is_some_and(|n| RAW_COPIES.contains(&n.as_str()));

        if is_raw_copy && node.args.len() == 3 {
            let dest = root_ident(&node.args[1]);
            let sized_by = length_source(&node.args[2]);
            if let (Some(dest), Some(sized_by)) = (dest, sized_by) {
                if dest != sized_by {
                    self.findings.push(
                        Finding::at(
                            syn::spanned::Spanned::span(&node.func),
                            self.path,
                            "memory",
                            "unchecked_copy",
                            Severity::Critical,
                        )
                        .message(format!(
                            "Raw copy into `{}` is sized by `{}.len()`; nothing bounds it by the destination.",
                            dest, sized_by
                        ))
                        .snippet(format!("copy(.., {}, {}.len())", dest, sized_by))
                        .fix("Clamp the count to the destination length, or use `copy_from_slice` on a checked sub-slice."),
                    );
                }
            }
        }

        syn::visit::visit_expr_call(self, node);
    }
}

/// `input.len()` -> "input"; anything else is not treated as input-sized.
fn length_source(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::MethodCall(mc) if mc.method == "len" => root_ident(&mc.receiver),
        syn::Expr::Paren(p) => length_source(&p.expr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        let pass = UncheckedCopy;
        pass.check_file(&file, Path::new("test.rs"))
    }

    #[test]
    fn detects_copy_sized_by_input() {
        let findings = check(
            r#"
            fn fill(input: &[u8]) {
                let mut buffer = [0u8; 10];
                unsafe {
                    ptr::copy_nonoverlapping(input.as_ptr(), buffer.as_mut_ptr(), input.len());
                }
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("buffer"));
    }

    #[test]
    fn allows_copy_sized_by_destination() {
        let findings = check(
            r#"
            fn fill(input: &[u8]) {
                let mut buffer = [0u8; 10];
                unsafe {
                    std::ptr::copy(input.as_ptr(), buffer.as_mut_ptr(), buffer.len());
                }
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn allows_constant_count() {
        let findings = check(
            r#"
            fn fill(input: &[u8]) {
                let mut buffer = [0u8; 10];
                unsafe { ptr::copy_nonoverlapping(input.as_ptr(), buffer.as_mut_ptr(), 4) };
            }
            "#,
        );
        assert!(findings.is_empty());
    }
}
