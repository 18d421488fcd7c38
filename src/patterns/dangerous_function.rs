// Detect calls to C string routines with no bounds checking
// strcpy, strcat, sprintf, vsprintf and gets write until the source ends, not until the buffer does.

use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::call_name;

/// Banned primitives: (name, safer alternative)
const BANNED_FUNCTIONS: &[(&str, &str)] = &[
    ("strcpy", "strncpy/strlcpy, or copy into a slice of known length"),
    ("strcat", "strncat/strlcat, or build the string in a `String`"),
    ("sprintf", "snprintf, or `format!`"),
    ("vsprintf", "vsnprintf"),
    ("gets", "fgets with an explicit size, or `BufRead::read_line`"),
];

pub struct DangerousFunction;

impl AnalysisPass for DangerousFunction {
    fn name(&self) -> &str {
        "dangerous_function"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = DangerousCallVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct DangerousCallVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl<'ast> Visit<'ast> for DangerousCallVisitor<'_> {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let Some(name) = call_name(node) {
            if let Some(&(_, alternative)) = BANNED_FUNCTIONS.iter().find(|(f, _)| *f == name) {
                self.findings.push(
                    Finding::at(
                        syn::spanned::Spanned::span(&node.func),
                        self.path,
                        "memory",
                        "dangerous_function",
                        Severity::High,
                    )
                    .message(format!("`{}` does not check the destination size.", name))
                    .snippet(format!("{}(..)", name))
                    .fix(format!("Use {} instead.", alternative)),
                );
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        let pass = DangerousFunction;
        pass.check_file(&file, Path::new("test.rs"))
    }

    #[test]
    fn detects_strcpy_call() {
        let findings = check(
            r#"
            fn copy(dst: *mut c_char, src: *const c_char) {
                unsafe { strcpy(dst, src); }
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("strcpy"));
    }

    #[test]
    fn detects_qualified_path() {
        let findings = check("fn f() { unsafe { libc::gets(buf); } }");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn declaration_alone_is_not_a_call() {
        let findings = check(
            r#"
            unsafe extern "C" {
                fn strcpy(dest: *mut c_char, src: *const c_char) -> *mut c_char;
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn allows_bounded_variants() {
        let findings = check("fn f() { unsafe { strncpy(dst, src, 10); } }");
        assert!(findings.is_empty());
    }
}
