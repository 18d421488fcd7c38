// Caller input handed to a child process through Command's builder.
// Uses the shared parameter taint walk; `format!` captures count as taint.

use std::path::Path;

use crate::driver::{AnalysisPass, Finding};
use crate::patterns::taint::{self, SinkRule};

const RULE: SinkRule = SinkRule {
    check: "command_injection",
    sinks: &["arg", "args", "env", "envs", "current_dir"],
    label: "command injection",
    fix: "Validate and sanitize the input before passing to Command. Use an allowlist of permitted values.",
};

pub struct CommandInjection;

impl AnalysisPass for CommandInjection {
    fn name(&self) -> &str {
        RULE.check
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        taint::scan(&RULE, file, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Severity;

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        CommandInjection.check_file(&file, Path::new("test.rs"))
    }

    #[test]
    fn detects_direct_param_in_arg() {
        let findings = check(
            r#"
            fn run(user_input: &str) {
                Command::new("sh").arg(user_input).spawn();
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("command injection"));
    }

    #[test]
    fn detects_param_interpolated_into_shell_string() {
        let findings = check(
            r#"
            fn run(user_input: &str) {
                Command::new("sh").arg("-c").arg(format!("ls {}", user_input)).status();
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn detects_taint_through_let() {
        let findings = check(
            r#"
            fn run(cmd: &str) {
                let x = cmd;
                Command::new("sh").arg(x).spawn();
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn allows_hardcoded_args() {
        let findings = check(
            r#"
            fn run() {
                Command::new("ls").arg("-la").spawn();
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn allows_unrelated_params() {
        let findings = check(
            r#"
            fn run(verbose: bool) {
                let x = "safe";
                Command::new("echo").arg(x).spawn();
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn detects_tainted_working_directory() {
        let findings = check(
            r#"
            fn run(dir: PathBuf) {
                Command::new("make").current_dir(dir).status();
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].snippet.contains("current_dir"));
    }
}
