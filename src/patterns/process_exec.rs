// Detect process replacement via exec
// `CommandExt::exec` and the libc exec family never return on success: the
// current process image, destructors and buffered output are gone.

use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::call_name;

const EXEC_FAMILY: &[&str] = &["execv", "execve", "execvp", "execvpe", "execl", "execle", "execlp"];

pub struct ProcessExec;

impl AnalysisPass for ProcessExec {
    fn name(&self) -> &str {
        "process_exec"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = ExecVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct ExecVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl ExecVisitor<'_> {
    fn report(&mut self, span: proc_macro2::Span, what: &str) {
        self.findings.push(
            Finding::at(span, self.path, "security", "process_exec", Severity::High)
                .message(format!("`{}` replaces the running process.", what))
                .snippet(what.to_string())
                .fix("Spawn a child with `Command::status`/`spawn` unless replacing the process is intended."),
        );
    }
}

impl<'ast> Visit<'ast> for ExecVisitor<'_> {
    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        if node.method == "exec" && node.args.is_empty() {
            self.report(node.method.span(), ".exec()");
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let Some(name) = call_name(node) {
            if EXEC_FAMILY.contains(&name.as_str()) {
                self.report(syn::spanned::Spanned::span(&node.func), &name);
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}
