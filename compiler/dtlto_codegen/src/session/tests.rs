use super::*;
use crate::diagnostics::buffer_handler;
use crate::outputs::TaskOutputs;
use crate::thin_link::{AnalysisError, TaskSlot};
use dtlto_local::LocalBackend;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const TRIPLE: &str = "x86_64-unknown-linux-gnu";

/// Selects every unit, one task each, in registration order.
struct SelectAll;

impl SummaryAnalyzer for SelectAll {
    fn analyze(
        &mut self,
        units: &[CompilationUnit],
        _: usize,
        _: &mut dyn ObjectSink,
    ) -> Result<Vec<TaskSlot>, AnalysisError> {
        let mut slots = vec![TaskSlot::default()];
        slots.extend(units.iter().map(|u| TaskSlot::new(u.id()).with_summary_index(b"idx".to_vec())));
        Ok(slots)
    }
}

struct Broken;

impl SummaryAnalyzer for Broken {
    fn analyze(
        &mut self,
        _: &[CompilationUnit],
        _: usize,
        _: &mut dyn ObjectSink,
    ) -> Result<Vec<TaskSlot>, AnalysisError> {
        Err("bad summary".into())
    }
}

fn config(dir: &TempDir) -> CodegenConfig {
    CodegenConfig::new("local::test")
        .with_work_dir(dir.path())
        .with_diagnostics(buffer_handler())
}

fn mock_backend() -> Backend {
    Backend::in_process(LocalBackend::new())
}

#[test]
fn full_run_harvests_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let id = dir.path().join("main.o").display().to_string();
    let mut outputs = TaskOutputs::new();

    let mut session = CodegenSession::new(&config).unwrap();
    session.add_input(InputModule::file(&id, b"bc", TRIPLE)).unwrap();
    session
        .add_input(InputModule::archive_member("libx.a(x.o)", b"bc", TRIPLE))
        .unwrap();
    let summary = session
        .run(&mut SelectAll, &CodegenOptions::default(), &mock_backend(), &mut outputs)
        .unwrap();
    let units: Vec<CompilationUnit> = session.registry().iter().cloned().collect();

    assert_eq!(
        summary,
        CodegenSummary {
            registered: 2,
            selected: 2,
            harvested: 2,
        }
    );
    assert_eq!(outputs.get(1).unwrap().buffer, id.as_bytes());

    // Each unit has an index, an object, and the member a source copy.
    assert_eq!(session.finish(), 5);
    for unit in &units {
        assert!(unit.temp_paths().all(|p| !p.exists()));
    }
}

#[test]
fn analysis_failure_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let copy;
    {
        let mut session = CodegenSession::new(&config).unwrap();
        copy = session
            .add_input(InputModule::archive_member("lib.a(m.o)", b"bc", TRIPLE))
            .unwrap()
            .path()
            .to_path_buf();
        assert!(copy.exists());

        let err = session
            .run(&mut Broken, &CodegenOptions::default(), &mock_backend(), &mut TaskOutputs::new())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Analysis { .. }));
    }
    assert!(!copy.exists());
}

#[test]
fn finish_reports_attempted_removals() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let mut session = CodegenSession::new(&config).unwrap();
    session
        .add_input(InputModule::archive_member("lib.a(m.o)", b"bc", TRIPLE))
        .unwrap();
    assert_eq!(session.finish(), 3);
}

#[test]
fn run_codegen_registers_everything() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let a = dir.path().join("a.o").display().to_string();
    let b = dir.path().join("b.o").display().to_string();
    let inputs = [
        InputModule::file(&a, b"a", TRIPLE),
        InputModule::file(&b, b"bb", TRIPLE),
    ];
    let mut outputs = TaskOutputs::new();

    let summary = run_codegen(
        &config,
        &inputs,
        &mut SelectAll,
        &CodegenOptions::default(),
        &mock_backend(),
        &mut outputs,
    )
    .unwrap();

    assert_eq!(summary.harvested, 2);
    assert_eq!(outputs.get(2).unwrap().buffer, b.as_bytes());
}
