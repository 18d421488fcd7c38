// Detect query text built from interpolated input
// Flags format!() templates that start with an SQL verb and interpolate a value,
// and format!() or string concatenation handed to query/execute/sql methods.

use std::path::Path;

use syn::punctuated::Punctuated;
use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};

/// Method names that typically execute SQL.
const SQL_METHODS: &[&str] = &[
    "query",
    "execute",
    "query_one",
    "query_opt",
    "query_as",
    "query_scalar",
    "raw_query",
    "raw_execute",
    "sql",
    "prepare",
];

/// Leading keywords that mark a template as SQL.
const SQL_VERBS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "REPLACE", "MERGE"];

pub struct SqlInjection;

impl AnalysisPass for SqlInjection {
    fn name(&self) -> &str {
        "sql_injection"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = SqlVisitor {
            findings: Vec::new(),
            path,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct SqlVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
}

impl SqlVisitor<'_> {
    fn report_sink(&mut self, span: proc_macro2::Span, name: &str) {
        self.findings.push(
            Finding::at(span, self.path, "security", "sql_injection", Severity::Critical)
                .message(format!(
                    "Potential SQL injection: format string or concatenation used in `{}` call.",
                    name
                ))
                .snippet(format!("{}(format!(...))", name))
                .fix("Use parameterized queries with `$1`, `?`, or `:name` placeholders instead of string formatting."),
        );
    }

    /// Arguments not already covered by the template check in `visit_macro`.
    fn check_sink_args<'e>(
        &mut self,
        args: impl IntoIterator<Item = &'e syn::Expr>,
        span: proc_macro2::Span,
        name: &str,
    ) {
        for arg in args {
            if is_concat(arg) || is_non_sql_format(arg) {
                self.report_sink(span, name);
            }
        }
    }
}

impl<'ast> Visit<'ast> for SqlVisitor<'_> {
    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if let Some(template) = format_template(node) {
            if looks_like_sql(&template.value()) && template.value().contains('{') {
                self.findings.push(
                    Finding::at(template.span(), self.path, "security", "sql_injection", Severity::Critical)
                        .message("Potential SQL injection: query text is built by interpolating values with format!().")
                        .snippet(truncate(&template.value(), 48))
                        .fix("Use parameterized queries with `$1`, `?`, or `:name` placeholders and bind the value."),
                );
            }
        }
        syn::visit::visit_macro(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let method_name = node.method.to_string();
        if SQL_METHODS.contains(&method_name.as_str()) {
            self.check_sink_args(&node.args, node.method.span(), &format!(".{}()", method_name));
        }
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        // sqlx::query(format!(...))
        if let syn::Expr::Path(path_expr) = node.func.as_ref() {
            if let Some(last_seg) = path_expr.path.segments.last() {
                let name = last_seg.ident.to_string();
                if SQL_METHODS.contains(&name.as_str()) {
                    self.check_sink_args(&node.args, last_seg.ident.span(), &format!("{}()", name));
                }
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}

/// The template literal of a `format!`/`format_args!` invocation.
fn format_template(mac: &syn::Macro) -> Option<syn::LitStr> {
    let name = mac.path.segments.last()?.ident.to_string();
    if name != "format" && name != "format_args" {
        return None;
    }
    let args = mac
        .parse_body_with(Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated)
        .ok()?;
    match args.first()? {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(s),
            ..
        }) => Some(s.clone()),
        _ => None,
    }
}

fn looks_like_sql(template: &str) -> bool {
    let Some(first_word) = template.split_whitespace().next() else {
        return false;
    };
    SQL_VERBS.iter().any(|verb| first_word.eq_ignore_ascii_case(verb))
}

/// `"..." + value` passed straight to a query method.
fn is_concat(expr: &syn::Expr) -> bool {
    match expr {
        syn::Expr::Binary(bin) => matches!(bin.op, syn::BinOp::Add(_) | syn::BinOp::AddAssign(_)),
        syn::Expr::Reference(r) => is_concat(&r.expr),
        syn::Expr::Paren(p) => is_concat(&p.expr),
        _ => false,
    }
}

/// format!() whose template does not itself look like SQL (e.g. `format!("{}", q)`).
fn is_non_sql_format(expr: &syn::Expr) -> bool {
    match expr {
        syn::Expr::Macro(m) => format_template(&m.mac)
            .map(|t| !looks_like_sql(&t.value()))
            .unwrap_or(false),
        syn::Expr::Reference(r) => is_non_sql_format(&r.expr),
        syn::Expr::Paren(p) => is_non_sql_format(&p.expr),
        _ => false,
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        let pass = SqlInjection;
        pass.check_file(&file, Path::new("test.rs"))
    }

    #[test]
    fn detects_built_query_text() {
        let findings = check(
            r#"
            fn find(user_input: &str) {
                let query = format!("SELECT * FROM users WHERE name = '{}'", user_input);
                println!("{}", query);
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("SQL injection"));
    }

    #[test]
    fn detects_format_in_query_once() {
        let findings = check(
            r#"
            fn get_user(db: &Pool, name: &str) {
                db.query(&format!("SELECT * FROM users WHERE name = '{}'", name));
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn detects_opaque_format_in_execute() {
        let findings = check(
            r#"
            fn run(conn: &Connection, q: &str) {
                conn.execute(format!("{} LIMIT 1", q));
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn detects_string_concat_in_query() {
        let findings = check(
            r#"
            fn search(db: &Pool, term: &str) {
                db.query("SELECT * FROM items WHERE name = '" + term + "'");
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn allows_parameterized_queries() {
        let findings = check(
            r#"
            fn get_user(db: &Pool, name: &str) {
                db.query("SELECT * FROM users WHERE name = $1");
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn allows_non_sql_formatting() {
        let findings = check(
            r#"
            fn greet(name: &str) -> String {
                format!("Selected user {}", name)
            }
            "#,
        );
        assert!(findings.is_empty());
    }
}
