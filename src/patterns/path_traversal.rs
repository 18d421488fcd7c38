// Caller input used as a path component.
// `join`, `push` and the file-name setters accept `..` and absolute paths, so a
// parameter reaching them can escape the intended directory.

use std::path::Path;

use crate::driver::{AnalysisPass, Finding};
use crate::patterns::taint::{self, SinkRule};

const RULE: SinkRule = SinkRule {
    check: "path_traversal",
    sinks: &["join", "push", "with_file_name", "set_file_name"],
    label: "path traversal",
    fix: "Validate the path component: reject `..`, absolute paths, and symlinks. Use a canonical path check.",
};

pub struct PathTraversal;

impl AnalysisPass for PathTraversal {
    fn name(&self) -> &str {
        RULE.check
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        taint::scan(&RULE, file, path)
    }
}
