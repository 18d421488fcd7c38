// Parameter-to-sink taint tracking shared by the injection passes.
// Every fn and method is scanned on its own: parameters start tainted, `let`
// bindings inherit taint from their initializer, and a rebinding to a clean
// value drops it again.

use std::collections::HashSet;
use std::path::Path;

use syn::visit::Visit;

use crate::driver::{Finding, Severity};
use crate::patterns::{collect_param_names, expr_is_tainted, local_binding};

/// A family of builder methods that must never receive caller input unchecked.
pub(crate) struct SinkRule {
    pub check: &'static str,
    /// Method names that consume the tainted value.
    pub sinks: &'static [&'static str],
    /// Human name of the attack, used in messages.
    pub label: &'static str,
    pub fix: &'static str,
}

/// Scan every function in `file` against `rule`.
pub(crate) fn scan(rule: &SinkRule, file: &syn::File, path: &Path) -> Vec<Finding> {
    let mut functions = FunctionWalker {
        rule,
        path,
        findings: Vec::new(),
    };
    functions.visit_file(file);
    functions.findings
}

struct FunctionWalker<'a> {
    rule: &'a SinkRule,
    path: &'a Path,
    findings: Vec<Finding>,
}

impl FunctionWalker<'_> {
    fn scan_fn(&mut self, sig: &syn::Signature, block: &syn::Block) {
        let tainted = collect_param_names(sig);
        if tainted.is_empty() {
            return;
        }
        let mut flow = FlowTracker {
            rule: self.rule,
            path: self.path,
            tainted,
            findings: &mut self.findings,
        };
        flow.visit_block(block);
    }
}

impl<'ast> Visit<'ast> for FunctionWalker<'_> {
    // Nested items are not entered: each signature sets its own taint roots.
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.scan_fn(&node.sig, &node.block);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.scan_fn(&node.sig, &node.block);
    }
}

struct FlowTracker<'a> {
    rule: &'a SinkRule,
    path: &'a Path,
    tainted: HashSet<String>,
    findings: &'a mut Vec<Finding>,
}

impl<'ast> Visit<'ast> for FlowTracker<'_> {
    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let method = node.method.to_string();
        if self.rule.sinks.contains(&method.as_str())
            && node.args.iter().any(|a| expr_is_tainted(a, &self.tainted))
        {
            self.findings.push(
                Finding::at(node.method.span(), self.path, "security", self.rule.check, Severity::Critical)
                    .message(format!(
                        "Potential {}: a function parameter reaches `.{}()` without validation.",
                        self.rule.label, method
                    ))
                    .snippet(format!(".{}(<tainted>)", method))
                    .fix(self.rule.fix),
            );
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let Some(name) = local_binding(&node.pat) {
            let dirty = node
                .init
                .as_ref()
                .is_some_and(|init| expr_is_tainted(&init.expr, &self.tainted));
            if dirty {
                self.tainted.insert(name);
            } else {
                self.tainted.remove(&name);
            }
        }
        syn::visit::visit_local(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: SinkRule = SinkRule {
        check: "scratch_sink",
        sinks: &["feed"],
        label: "scratch leak",
        fix: "Validate first.",
    };

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        scan(&RULE, &file, Path::new("test.rs"))
    }

    #[test]
    fn reports_under_the_rule_name() {
        let findings = check("fn f(input: &str) { sink.feed(input); }");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check_name, "scratch_sink");
        assert!(findings[0].message.contains("scratch leak"));
    }

    #[test]
    fn clean_rebinding_drops_taint() {
        let findings = check(
            r#"
            fn f(input: &str) {
                let v = input;
                let v = "fixed";
                sink.feed(v);
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn methods_are_scanned_separately() {
        let findings = check(
            r#"
            impl S {
                fn a(&self, input: &str) { let v = input; }
                fn b(&self) { let v = "fixed"; sink.feed(v); }
            }
            "#,
        );
        assert!(findings.is_empty());
    }
}
