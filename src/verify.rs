use anyhow::{Result, bail};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::catalog;
use crate::config;
use crate::driver::AnalysisDriver;
use crate::json_output;
use crate::types::{CheckReport, DemoCheck, DemoProgram, RoutineCheck, RunOptions, Tool};

/// Findings outside any function are grouped under this routine name.
const TOP_LEVEL: &str = "<top-level>";

/// Run the pattern self-check according to the given options.
/// Returns the aggregated report; printing has already happened.
pub fn run(options: &RunOptions) -> Result<CheckReport> {
    let config = config::load_config(&options.project_path, options.config_path.as_deref())?;

    tracing::debug!(project = %options.project_path.display(), ?config, "starting self-check");

    let demos: Vec<DemoProgram> = match &options.demo_filter {
        Some(name) => match catalog::find(name) {
            Some(demo) => vec![demo],
            None => bail!(
                "Unknown demo '{}'. Known demos: {}",
                name,
                catalog::all()
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => catalog::all(),
    };

    let driver = AnalysisDriver::with_config(&config);
    tracing::debug!(passes = driver.pass_count(), "driver ready");

    let mut missing_sources = Vec::new();
    let mut checks = Vec::new();
    for demo in &demos {
        if driver.is_excluded_path(&demo.source) {
            tracing::debug!(demo = %demo.name, source = %demo.source.display(), "demo source excluded");
            continue;
        }
        if !options.project_path.join(&demo.source).exists() {
            tracing::warn!(demo = %demo.name, source = %demo.source.display(), "demo source missing");
            missing_sources.push(demo.source.clone());
            continue;
        }
        if demo.tool != Tool::StaticScanner {
            tracing::debug!(demo = %demo.name, tool = %demo.tool, "runtime demo, not scanned");
            continue;
        }
        checks.push(check_demo(&driver, &options.project_path, demo, config.strict)?);
    }

    let uncatalogued = if options.demo_filter.is_none() {
        uncatalogued_sources(&driver, &options.project_path, &demos)
    } else {
        Vec::new()
    };

    let report = json_output::build_report(checks, missing_sources, uncatalogued);

    if options.json_output {
        let json = json_output::to_json(&report)?;
        println!("{}", json);
    } else {
        json_output::print_summary(&report, options.verbose);
    }

    Ok(report)
}

/// Compare the findings in one static demo's source against its catalog entry.
///
/// Every active expectation's routine must carry exactly one distinct check,
/// the expected one. Inert routines and `main` must carry none. With `strict`,
/// any other routine carrying findings fails the demo as well.
pub fn check_demo(
    driver: &AnalysisDriver,
    project_path: &Path,
    demo: &DemoProgram,
    strict: bool,
) -> Result<DemoCheck> {
    let findings = driver.analyze_file(&project_path.join(&demo.source))?;
    let registered: HashSet<&str> = driver.pass_names().into_iter().collect();

    let mut by_routine: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for finding in &findings {
        let routine = finding.function.clone().unwrap_or_else(|| TOP_LEVEL.to_string());
        by_routine
            .entry(routine)
            .or_default()
            .insert(finding.check_name.clone());
    }

    let mut routines = Vec::new();
    for expectation in &demo.expected {
        let observed: Vec<String> = by_routine
            .remove(&expectation.location)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        // A disabled check cannot fire; its routine is held to silence instead.
        let expected = (expectation.active && registered.contains(expectation.kind.as_str()))
            .then(|| expectation.kind.clone());
        let pass = match &expected {
            Some(kind) => observed.len() == 1 && &observed[0] == kind,
            None => observed.is_empty(),
        };
        if !pass {
            tracing::debug!(demo = %demo.name, routine = %expectation.location, ?expected, ?observed, "routine mismatch");
        }
        routines.push(RoutineCheck {
            routine: expectation.location.clone(),
            expected,
            observed,
            pass,
        });
    }

    for (routine, observed) in by_routine {
        let pass = !strict && routine != "main";
        routines.push(RoutineCheck {
            routine,
            expected: None,
            observed: observed.into_iter().collect(),
            pass,
        });
    }

    let pass = routines.iter().all(|r| r.pass);
    Ok(DemoCheck {
        demo: demo.name.clone(),
        tool: demo.tool,
        pass,
        routines,
        findings,
    })
}

/// Demo sources on disk that no catalog entry points at, minus excluded paths.
fn uncatalogued_sources(
    driver: &AnalysisDriver,
    project_path: &Path,
    demos: &[DemoProgram],
) -> Vec<PathBuf> {
    let known: HashSet<&Path> = demos.iter().map(|d| d.source.as_path()).collect();
    let source_dir = project_path.join(catalog::DEMO_SOURCE_DIR);

    WalkDir::new(&source_dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .filter_map(|e| e.path().strip_prefix(project_path).ok().map(Path::to_path_buf))
        .filter(|relative| !known.contains(relative.as_path()))
        .filter(|relative| !driver.is_excluded_path(relative))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckConfig, ExpectedFinding};
    use std::fs;

    fn demo_with(source: &str, expected: Vec<(&str, &str, bool)>) -> (tempfile::TempDir, DemoProgram) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("demo.rs"), source).expect("write source");
        let demo = DemoProgram {
            name: "scratch-demo".into(),
            source: PathBuf::from("demo.rs"),
            tool: Tool::StaticScanner,
            title: "Scratch".into(),
            expected: expected
                .into_iter()
                .map(|(kind, location, active)| ExpectedFinding {
                    kind: kind.into(),
                    location: location.into(),
                    active,
                })
                .collect(),
        };
        (dir, demo)
    }

    const SOURCE: &str = r#"
static mut HITS: u32 = 0;

fn bump() {
    unsafe { HITS += 1; }
}

fn quiet() {
    // nothing to see
}

fn main() {
    println!("hello");
}
"#;

    #[test]
    fn test_matching_routines_pass() {
        let (dir, demo) = demo_with(
            SOURCE,
            vec![("shared_counter", "bump", true), ("weak_crypto", "quiet", false)],
        );
        let check = check_demo(&AnalysisDriver::new(), dir.path(), &demo, true).expect("check runs");
        assert!(check.pass, "{:?}", check.routines);
        assert_eq!(check.findings.len(), 1);
        assert_eq!(check.routines.len(), 2);
    }

    #[test]
    fn test_wrong_check_fails() {
        let (dir, demo) = demo_with(SOURCE, vec![("memory_leak", "bump", true)]);
        let check = check_demo(&AnalysisDriver::new(), dir.path(), &demo, true).expect("check runs");
        assert!(!check.pass);
        assert_eq!(check.routines[0].observed, vec!["shared_counter".to_string()]);
    }

    #[test]
    fn test_unexpected_routine_fails_only_when_strict() {
        let (dir, demo) = demo_with(SOURCE, vec![("weak_crypto", "quiet", false)]);
        let driver = AnalysisDriver::new();

        let strict = check_demo(&driver, dir.path(), &demo, true).expect("check runs");
        assert!(!strict.pass);
        assert!(strict.routines.iter().any(|r| r.routine == "bump" && !r.pass));

        let lenient = check_demo(&driver, dir.path(), &demo, false).expect("check runs");
        assert!(lenient.pass);
    }

    #[test]
    fn test_disabled_check_expects_silence() {
        let (dir, demo) = demo_with(SOURCE, vec![("shared_counter", "bump", true)]);
        let config = CheckConfig {
            disabled_checks: vec!["shared_counter".into()],
            ..CheckConfig::default()
        };
        let driver = AnalysisDriver::with_config(&config);
        let check = check_demo(&driver, dir.path(), &demo, true).expect("check runs");
        assert!(check.pass);
        assert_eq!(check.routines[0].expected, None);
    }

    #[test]
    fn test_run_rejects_unknown_demo() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"\nversion = \"0.1.0\"\n")
            .expect("write manifest");
        let options = RunOptions {
            project_path: dir.path().to_path_buf(),
            config_path: None,
            json_output: true,
            demo_filter: Some("no-such-demo".into()),
            verbose: false,
        };
        let err = run(&options).unwrap_err();
        assert!(err.to_string().contains("no-such-demo"));
    }

    #[test]
    fn test_uncatalogued_sources_are_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join(catalog::DEMO_SOURCE_DIR);
        fs::create_dir_all(&bin).expect("create src/bin");
        fs::write(bin.join("data_race_demo.rs"), "fn main() {}").expect("write demo");
        fs::write(bin.join("stray_demo.rs"), "fn main() {}").expect("write stray");

        let found = uncatalogued_sources(&AnalysisDriver::new(), dir.path(), &catalog::all());
        assert_eq!(found, vec![PathBuf::from("src/bin/stray_demo.rs")]);
    }

    #[test]
    fn test_excluded_sources_are_not_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join(catalog::DEMO_SOURCE_DIR);
        fs::create_dir_all(&bin).expect("create src/bin");
        fs::write(bin.join("stray_demo.rs"), "fn main() {}").expect("write stray");

        let config = CheckConfig {
            exclude: vec!["stray_demo".into()],
            ..CheckConfig::default()
        };
        let driver = AnalysisDriver::with_config(&config);
        assert!(uncatalogued_sources(&driver, dir.path(), &catalog::all()).is_empty());
    }

    #[test]
    fn test_run_skips_excluded_demo() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"x\"\nversion = \"0.1.0\"\n\n\
             [package.metadata.sanitizer-demos]\nexclude = [\"static_analysis_extras_demo\"]\n",
        )
        .expect("write manifest");
        let bin = dir.path().join(catalog::DEMO_SOURCE_DIR);
        fs::create_dir_all(&bin).expect("create src/bin");
        // Silent source: would fail every active expectation if it were checked.
        fs::write(bin.join("static_analysis_extras_demo.rs"), "fn main() {}").expect("write demo");

        let options = RunOptions {
            project_path: dir.path().to_path_buf(),
            config_path: None,
            json_output: true,
            demo_filter: Some("static-analysis-extras-demo".into()),
            verbose: false,
        };
        let report = run(&options).expect("run succeeds");
        assert!(report.pass);
        assert!(report.demos.is_empty());
        assert!(report.missing_sources.is_empty());
    }
}
