//! Check orchestrator behavior with injected collaborators.
//!
//! Each test installs a capturing subscriber so log records can be asserted
//! alongside the report lines.

mod common;

use std::path::PathBuf;

use common::{metadata, CapturedLogs, FixedLoader, FixedLocator, ScriptedRenderer};
use distcheck::check::{MISSING_CONTENT_TYPE, MISSING_DESCRIPTION};
use distcheck::{Checker, RunSummary, Verdict};
use distcheck_metadata::MetadataDictionary;
use distcheck_render::{RendererKey, RendererRegistry};
use tracing::Level;

const ARTIFACT: &str = "dist/pkg-1.0.tar.gz";

fn one_artifact() -> FixedLocator {
    FixedLocator(vec![PathBuf::from(ARTIFACT)])
}

fn run(
    logs: &CapturedLogs,
    locator: &FixedLocator,
    dict: MetadataDictionary,
    registry: &RendererRegistry,
    strict: bool,
) -> (RunSummary, String) {
    let loader = FixedLoader(dict);
    let mut out = Vec::new();
    let summary = logs.capture(|| {
        Checker::new(locator, &loader, registry)
            .run(&[ARTIFACT.to_string()], strict, &mut out)
            .unwrap()
    });
    (summary, String::from_utf8(out).unwrap())
}

// =============================================================================
// Empty input
// =============================================================================

#[test]
fn test_no_files_is_failure_with_single_error() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::clean()));
    let (summary, out) = run(&logs, &FixedLocator(vec![]), metadata(None, None), &registry, false);

    assert!(summary.failed);
    assert!(summary.artifacts.is_empty());
    assert_eq!(out, "");
    assert_eq!(logs.at(Level::ERROR), vec!["No files to check.".to_string()]);
    assert!(logs.at(Level::WARN).is_empty());
}

#[test]
fn test_only_signatures_is_no_files() {
    let logs = CapturedLogs::default();
    let locator = FixedLocator(vec![PathBuf::from("dist/pkg-1.0.tar.gz.asc")]);
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::clean()));
    let (summary, out) = run(&logs, &locator, metadata(Some("text"), None), &registry, false);

    assert!(summary.failed);
    assert_eq!(out, "");
    assert_eq!(logs.at(Level::ERROR).len(), 1);
}

// =============================================================================
// Verdicts
// =============================================================================

#[test]
fn test_clean_render_passes() {
    let logs = CapturedLogs::default();
    let renderer = ScriptedRenderer::clean();
    let sources = renderer.sources();
    let registry = RendererRegistry::new(Box::new(renderer));
    let dict = metadata(Some("A description"), Some("text/x-rst"));
    let (summary, out) = run(&logs, &one_artifact(), dict, &registry, false);

    assert_eq!(*sources.lock().unwrap(), vec!["A description".to_string()]);

    assert!(!summary.failed);
    assert_eq!(out, format!("Checking {}: PASSED\n", ARTIFACT));
    assert!(logs.at(Level::ERROR).is_empty());
    assert!(logs.at(Level::WARN).is_empty());
}

#[test]
fn test_missing_description_and_content_type() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("never called")));
    let (summary, out) = run(&logs, &one_artifact(), metadata(None, None), &registry, false);

    assert!(!summary.failed);
    assert_eq!(out, format!("Checking {}: PASSED with warnings\n", ARTIFACT));
    assert_eq!(
        logs.at(Level::WARN),
        vec![MISSING_CONTENT_TYPE.to_string(), MISSING_DESCRIPTION.to_string()]
    );
    assert!(logs.at(Level::ERROR).is_empty());
}

#[test]
fn test_empty_description_is_missing() {
    let logs = CapturedLogs::default();
    let renderer = ScriptedRenderer::failing("never called");
    let sources = renderer.sources();
    let registry = RendererRegistry::new(Box::new(renderer));
    let dict = metadata(Some(""), Some("text/x-rst"));
    let (summary, out) = run(&logs, &one_artifact(), dict, &registry, false);

    assert!(!summary.failed);
    assert_eq!(out, format!("Checking {}: PASSED with warnings\n", ARTIFACT));
    assert_eq!(logs.at(Level::WARN), vec![MISSING_DESCRIPTION.to_string()]);
    assert!(logs.at(Level::ERROR).is_empty());
    assert!(sources.lock().unwrap().is_empty());
}

#[test]
fn test_missing_description_strict() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("never called")));
    let (summary, out) = run(&logs, &one_artifact(), metadata(None, None), &registry, true);

    assert!(summary.failed);
    assert_eq!(out, format!("Checking {}: FAILED due to warnings\n", ARTIFACT));
    assert_eq!(
        logs.at(Level::WARN),
        vec![MISSING_CONTENT_TYPE.to_string(), MISSING_DESCRIPTION.to_string()]
    );
    assert!(logs.at(Level::ERROR).is_empty());
    assert_eq!(summary.artifacts[0].verdict, Verdict::FailedDueToWarnings);
}

#[test]
fn test_render_failure_logs_one_error() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("Syntax error")));
    let dict = metadata(Some("broken"), Some("text/x-rst"));
    let (summary, out) = run(&logs, &one_artifact(), dict, &registry, false);

    assert!(summary.failed);
    assert_eq!(out, format!("Checking {}: FAILED\n", ARTIFACT));

    let errors = logs.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(
        "`long_description` has syntax errors in markup and would not be rendered on PyPI."
    ));
    assert!(errors[0].contains("Syntax error"));
}

#[test]
fn test_render_failure_names_configured_index() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("Syntax error")));
    let loader = FixedLoader(metadata(Some("broken"), Some("text/x-rst")));
    let mut out = Vec::new();

    logs.capture(|| {
        Checker::new(&one_artifact(), &loader, &registry)
            .with_index_name("TestPyPI")
            .check(&[], false, &mut out)
            .unwrap()
    });
    assert!(logs.at(Level::ERROR)[0].contains("would not be rendered on TestPyPI."));
}

#[test]
fn test_sink_text_is_logged_as_warning() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::warning(
        "<string>:4: (INFO/1) Duplicate implicit target name.",
    )));
    let dict = metadata(Some("text"), None);
    let (summary, out) = run(&logs, &one_artifact(), dict, &registry, false);

    assert!(!summary.failed);
    assert_eq!(out, format!("Checking {}: PASSED with warnings\n", ARTIFACT));
    assert_eq!(
        logs.at(Level::WARN),
        vec![
            MISSING_CONTENT_TYPE.to_string(),
            "line 4: Info: Duplicate implicit target name.".to_string(),
        ]
    );
}

#[test]
fn test_loop_is_exhaustive() {
    let logs = CapturedLogs::default();
    let locator = FixedLocator(vec![
        PathBuf::from("dist/a-1.0.tar.gz"),
        PathBuf::from("dist/b-1.0.tar.gz"),
    ]);
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("Syntax error")));
    let dict = metadata(Some("x"), Some("text/x-rst"));
    let (summary, out) = run(&logs, &locator, dict, &registry, false);

    assert!(summary.failed);
    assert_eq!(
        out,
        "Checking dist/a-1.0.tar.gz: FAILED\nChecking dist/b-1.0.tar.gz: FAILED\n"
    );
    assert_eq!(logs.at(Level::ERROR).len(), 2);
}

// =============================================================================
// Renderer selection
// =============================================================================

#[test]
fn test_selection_uses_content_type() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::failing("default used")))
        .with(RendererKey::Markdown, Box::new(ScriptedRenderer::clean()));

    let dict = metadata(Some("# Title"), Some("text/markdown; charset=UTF-8"));
    let (summary, _) = run(&logs, &one_artifact(), dict, &registry, false);
    assert_eq!(summary.artifacts[0].verdict, Verdict::Passed);

    let dict = metadata(Some("# Title"), Some("text/html"));
    let (summary, _) = run(&logs, &one_artifact(), dict, &registry, false);
    assert_eq!(summary.artifacts[0].verdict, Verdict::Failed);
}

#[test]
fn test_standard_registry_plain_text() {
    let logs = CapturedLogs::default();
    let dict = metadata(Some("Just `some` text_ *here*"), Some("text/plain"));
    let (summary, _) = run(&logs, &one_artifact(), dict, RendererRegistry::global(), true);

    assert!(!summary.failed);
    assert_eq!(summary.artifacts[0].verdict, Verdict::Passed);
}

#[test]
fn test_standard_registry_markdown_variants() {
    let logs = CapturedLogs::default();
    let dict = metadata(Some("# Title\n\nBody."), Some("text/markdown; variant=CommonMark"));
    let (summary, _) = run(&logs, &one_artifact(), dict, RendererRegistry::global(), true);
    assert_eq!(summary.artifacts[0].verdict, Verdict::Passed);

    let dict = metadata(Some("# Title\n\nBody."), Some("text/markdown; variant=wiki"));
    let (summary, out) = run(&logs, &one_artifact(), dict, RendererRegistry::global(), false);
    assert!(summary.failed);
    assert_eq!(out, format!("Checking {}: FAILED\n", ARTIFACT));
}

#[test]
fn test_standard_registry_rst_short_underline() {
    let logs = CapturedLogs::default();
    let dict = metadata(Some("Title\n====\n\nBody text.\n"), Some("text/x-rst"));
    let (summary, out) = run(&logs, &one_artifact(), dict, RendererRegistry::global(), false);

    assert!(summary.failed);
    assert_eq!(out, format!("Checking {}: FAILED\n", ARTIFACT));
    let errors = logs.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("line 2: Warning: Title underline too short."));
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_repeated_runs_are_identical() {
    let logs = CapturedLogs::default();
    let registry = RendererRegistry::new(Box::new(ScriptedRenderer::clean()));
    let locator = FixedLocator(vec![
        PathBuf::from("dist/pkg-1.0-py3-none-any.whl"),
        PathBuf::from(ARTIFACT),
    ]);
    let dict = metadata(Some("text"), None);

    let (first, first_out) = run(&logs, &locator, dict.clone(), &registry, false);
    let first_warnings = logs.at(Level::WARN);
    logs.clear();
    let (second, second_out) = run(&logs, &locator, dict, &registry, false);

    assert_eq!(first_out, second_out);
    assert_eq!(first.failed, second.failed);
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first_warnings, logs.at(Level::WARN));
}
