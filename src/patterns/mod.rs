// Pattern checks: one pass per anti-pattern the static demos carry.

use std::collections::HashSet;

use crate::driver::AnalysisPass;

pub mod command_injection;
pub mod dangerous_function;
pub mod discarded_result;
pub mod hardcoded_secrets;
pub mod memory_leak;
pub mod null_pointer;
pub mod path_traversal;
pub mod process_exec;
pub mod shared_counter;
pub mod sql_injection;
mod taint;
pub mod unchecked_copy;
pub mod use_after_free;
pub mod weak_crypto;

/// Every built-in pass, in registration order.
pub fn all_passes() -> Vec<Box<dyn AnalysisPass>> {
    vec![
        // Injection and secrets (5)
        Box::new(command_injection::CommandInjection),
        Box::new(sql_injection::SqlInjection),
        Box::new(path_traversal::PathTraversal),
        Box::new(hardcoded_secrets::HardcodedSecrets::new()),
        Box::new(weak_crypto::WeakCrypto),
        // Memory and concurrency (6)
        Box::new(unchecked_copy::UncheckedCopy),
        Box::new(dangerous_function::DangerousFunction),
        Box::new(null_pointer::NullPointer),
        Box::new(memory_leak::MemoryLeak),
        Box::new(use_after_free::UseAfterFree),
        Box::new(shared_counter::SharedCounter),
        // Error handling and process control (2)
        Box::new(discarded_result::DiscardedResult),
        Box::new(process_exec::ProcessExec),
    ]
}

/// Collect all parameter names from a function signature.
pub(crate) fn collect_param_names(sig: &syn::Signature) -> HashSet<String> {
    let mut names = HashSet::new();
    for input in &sig.inputs {
        if let syn::FnArg::Typed(pat_type) = input {
            collect_pat_names(&pat_type.pat, &mut names);
        }
    }
    names
}

/// Recursively collect identifier names from a pattern.
fn collect_pat_names(pat: &syn::Pat, names: &mut HashSet<String>) {
    match pat {
        syn::Pat::Ident(ident) => {
            names.insert(ident.ident.to_string());
        }
        syn::Pat::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_pat_names(elem, names);
            }
        }
        syn::Pat::TupleStruct(ts) => {
            for elem in &ts.elems {
                collect_pat_names(elem, names);
            }
        }
        syn::Pat::Struct(s) => {
            for field in &s.fields {
                collect_pat_names(&field.pat, names);
            }
        }
        syn::Pat::Reference(r) => {
            collect_pat_names(&r.pat, names);
        }
        syn::Pat::Type(t) => {
            collect_pat_names(&t.pat, names);
        }
        _ => {}
    }
}

/// Name bound by a simple `let` pattern (`x`, `mut x`, `x: T`).
pub(crate) fn local_binding(pat: &syn::Pat) -> Option<String> {
    match pat {
        syn::Pat::Ident(ident) => Some(ident.ident.to_string()),
        syn::Pat::Type(t) => local_binding(&t.pat),
        _ => None,
    }
}

/// Check if an expression references any tainted variable.
pub(crate) fn expr_is_tainted(expr: &syn::Expr, tainted: &HashSet<String>) -> bool {
    match expr {
        syn::Expr::Path(path) => {
            if let Some(ident) = path.path.get_ident() {
                return tainted.contains(&ident.to_string());
            }
            false
        }
        syn::Expr::Reference(r) => expr_is_tainted(&r.expr, tainted),
        syn::Expr::Paren(p) => expr_is_tainted(&p.expr, tainted),
        syn::Expr::Field(f) => expr_is_tainted(&f.base, tainted),
        syn::Expr::MethodCall(mc) => expr_is_tainted(&mc.receiver, tainted),
        syn::Expr::Binary(bin) => {
            expr_is_tainted(&bin.left, tainted) || expr_is_tainted(&bin.right, tainted)
        }
        syn::Expr::Call(call) => call.args.iter().any(|a| expr_is_tainted(a, tainted)),
        syn::Expr::Macro(m) => {
            // format!(...) and friends: look for a tainted identifier among the tokens
            macro_mentions(&m.mac, tainted)
        }
        syn::Expr::Block(b) => b.block.stmts.last().is_some_and(|stmt| {
            if let syn::Stmt::Expr(e, _) = stmt {
                expr_is_tainted(e, tainted)
            } else {
                false
            }
        }),
        _ => false,
    }
}

/// True when an identifier token of the macro body (or an inline `{name}`
/// format capture) matches one of `names`.
pub(crate) fn macro_mentions(mac: &syn::Macro, names: &HashSet<String>) -> bool {
    tokens_mention(mac.tokens.clone(), names)
}

fn tokens_mention(tokens: proc_macro2::TokenStream, names: &HashSet<String>) -> bool {
    tokens.into_iter().any(|tt| match tt {
        proc_macro2::TokenTree::Ident(ident) => names.contains(&ident.to_string()),
        proc_macro2::TokenTree::Literal(lit) => {
            let text = lit.to_string();
            names.iter().any(|n| text.contains(&format!("{{{}", n)))
        }
        proc_macro2::TokenTree::Group(group) => tokens_mention(group.stream(), names),
        proc_macro2::TokenTree::Punct(_) => false,
    })
}

/// Comma-separated expression arguments of a macro call (`println!("{}", x)`),
/// empty when the body is not an expression list.
pub(crate) fn macro_args(mac: &syn::Macro) -> Vec<syn::Expr> {
    use syn::punctuated::Punctuated;

    mac.parse_body_with(Punctuated::<syn::Expr, syn::Token![,]>::parse_terminated)
        .map(|args| args.into_iter().collect())
        .unwrap_or_default()
}

/// Last path segment of a call's callee: `ptr::copy_nonoverlapping(..)` -> "copy_nonoverlapping".
pub(crate) fn call_name(call: &syn::ExprCall) -> Option<String> {
    if let syn::Expr::Path(path_expr) = call.func.as_ref() {
        return path_expr.path.segments.last().map(|s| s.ident.to_string());
    }
    None
}

/// True when the callee path ends with `suffix`, e.g. `["Box", "from_raw"]`.
pub(crate) fn call_path_ends_with(call: &syn::ExprCall, suffix: &[&str]) -> bool {
    let syn::Expr::Path(path_expr) = call.func.as_ref() else {
        return false;
    };
    let segments: Vec<String> = path_expr
        .path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    segments.len() >= suffix.len()
        && segments[segments.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

/// The variable an expression is rooted at: `buffer.as_mut_ptr()` -> "buffer".
pub(crate) fn root_ident(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::Path(path) => path.path.get_ident().map(|i| i.to_string()),
        syn::Expr::Reference(r) => root_ident(&r.expr),
        syn::Expr::Paren(p) => root_ident(&p.expr),
        syn::Expr::Field(f) => root_ident(&f.base),
        syn::Expr::MethodCall(mc) => root_ident(&mc.receiver),
        syn::Expr::Index(i) => root_ident(&i.expr),
        syn::Expr::Cast(c) => root_ident(&c.expr),
        _ => None,
    }
}
