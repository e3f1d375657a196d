use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::cobertura::Coverage;
use crate::error::CobertaError;
use crate::mapper::apply_profile;
use crate::profile::{Mode, Profile, ProfileBlock};
use crate::structure::{Declaration, SourcePos, StructureProvider};

struct FixedStructure(Vec<Declaration>);

impl StructureProvider for FixedStructure {
    fn declarations(&self, _path: &Path) -> Result<Vec<Declaration>, CobertaError> {
        Ok(self.0.clone())
    }
}

fn pos(line: u32, col: u32) -> SourcePos {
    SourcePos { line, col }
}

fn block(range: (u32, u32, u32, u32), num_stmt: u32, count: u64) -> ProfileBlock {
    ProfileBlock {
        start_line: range.0,
        start_col: range.1,
        end_line: range.2,
        end_col: range.3,
        num_stmt,
        count,
    }
}

fn declaration(name: &str, receiver: Option<&str>, start: SourcePos, end: SourcePos) -> Declaration {
    Declaration {
        name: name.to_string(),
        receiver: receiver.map(str::to_string),
        start,
        end,
    }
}

fn profile(file_name: &str, blocks: Vec<ProfileBlock>) -> Profile {
    Profile {
        file_name: file_name.to_string(),
        mode: Mode::Set,
        blocks,
    }
}

fn empty_coverage() -> Coverage {
    Coverage::new(vec![".".to_string()], 0)
}

// The resolved path only has to exist; the fixed provider supplies structure.
fn fixture_root(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
    }
    dir
}

#[test]
fn overlapping_blocks_append_independent_line_entries() {
    let root = fixture_root(&["testdata/func1.rs"]);
    let report = profile(
        "testdata/func1.rs",
        vec![block((4, 10, 7, 2), 2, 1), block((5, 3, 7, 2), 1, 0)],
    );
    let provider = FixedStructure(vec![declaration("func1", None, pos(4, 1), pos(8, 2))]);

    let mut coverage = empty_coverage();
    apply_profile(
        &mut coverage,
        &report,
        &[root.path().to_path_buf()],
        &provider,
    )
    .unwrap();

    assert_eq!(coverage.packages.len(), 1);
    let package = &coverage.packages[0];
    assert_eq!(package.name, "testdata");

    let class = &package.classes[0];
    assert_eq!(class.name, "-");
    assert_eq!(class.filename, "testdata/func1.rs");

    let method = &class.methods[0];
    assert_eq!(method.name, "func1");
    let entries = method
        .lines
        .iter()
        .map(|line| (line.number, line.hits))
        .collect::<Vec<_>>();
    assert_eq!(
        entries,
        vec![(4, 1), (5, 1), (6, 1), (7, 1), (5, 0), (6, 0), (7, 0)]
    );
    // Line 5 keeps both the outer-block and the nested-block entry.
    assert_eq!(entries.iter().filter(|(number, _)| *number == 5).count(), 2);
    assert_eq!(class.lines.len(), 7);

    assert!((method.line_rate - 4.0 / 7.0).abs() < 1e-12);
    assert!((class.line_rate - 4.0 / 7.0).abs() < 1e-12);
    assert!((package.line_rate - 4.0 / 7.0).abs() < 1e-12);

    coverage.finalize();
    assert_eq!(coverage.lines_valid, 7);
    assert_eq!(coverage.lines_covered, 4);
}

#[test]
fn methods_with_a_shared_receiver_share_one_class() {
    let root = fixture_root(&["testdata/func1.rs"]);
    let report = profile(
        "testdata/func1.rs",
        vec![
            block((1, 30, 5, 2), 2, 1),
            block((10, 30, 10, 35), 1, 0),
            block((11, 30, 11, 35), 1, 1),
        ],
    );
    let provider = FixedStructure(vec![
        declaration("func1", None, pos(1, 1), pos(5, 2)),
        declaration("by_ref", Some("Type1"), pos(10, 5), pos(10, 43)),
        declaration("by_mut", Some("Type1"), pos(11, 5), pos(11, 43)),
    ]);

    let mut coverage = empty_coverage();
    apply_profile(
        &mut coverage,
        &report,
        &[root.path().to_path_buf()],
        &provider,
    )
    .unwrap();

    let package = &coverage.packages[0];
    let names = package
        .classes
        .iter()
        .map(|class| class.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["-", "Type1"]);

    let type1 = &package.classes[1];
    assert_eq!(type1.methods.len(), 2);
    assert_eq!(type1.methods[0].name, "by_ref");
    assert_eq!(type1.methods[1].name, "by_mut");
    assert_eq!(type1.methods[0].line_rate, 0.0);
    assert_eq!(type1.methods[1].line_rate, 1.0);
    assert_eq!(type1.line_rate, 0.5);
}

#[test]
fn boundary_blocks_on_a_shared_line_use_column_positions() {
    let root = fixture_root(&["pkg/tight.rs"]);
    let report = profile(
        "pkg/tight.rs",
        vec![
            // Ends at the declaration's start column: entirely before it.
            block((10, 1, 10, 5), 1, 9),
            block((10, 6, 10, 20), 1, 2),
            // Starts at the declaration's end position: already past it.
            block((10, 40, 10, 50), 1, 9),
        ],
    );
    let provider = FixedStructure(vec![declaration(
        "tight",
        None,
        pos(10, 5),
        pos(10, 40),
    )]);

    let mut coverage = empty_coverage();
    apply_profile(
        &mut coverage,
        &report,
        &[root.path().to_path_buf()],
        &provider,
    )
    .unwrap();

    let method = &coverage.packages[0].classes[0].methods[0];
    let entries = method
        .lines
        .iter()
        .map(|line| (line.number, line.hits))
        .collect::<Vec<_>>();
    assert_eq!(entries, vec![(10, 2)]);
}

#[test]
fn classes_are_never_merged_across_files() {
    let root = fixture_root(&["testdata/func1.rs", "testdata/func2.rs"]);
    let provider_one = FixedStructure(vec![declaration(
        "one",
        Some("Type1"),
        pos(3, 5),
        pos(3, 40),
    )]);
    let provider_two = FixedStructure(vec![declaration(
        "two",
        Some("Type1"),
        pos(3, 5),
        pos(3, 40),
    )]);

    let mut coverage = empty_coverage();
    let roots = vec![root.path().to_path_buf()];
    apply_profile(
        &mut coverage,
        &profile("testdata/func1.rs", vec![block((3, 10, 3, 20), 1, 1)]),
        &roots,
        &provider_one,
    )
    .unwrap();
    apply_profile(
        &mut coverage,
        &profile("testdata/func2.rs", vec![block((3, 10, 3, 20), 1, 0)]),
        &roots,
        &provider_two,
    )
    .unwrap();

    // One package for the shared directory, one class per file.
    assert_eq!(coverage.packages.len(), 1);
    let package = &coverage.packages[0];
    assert_eq!(package.classes.len(), 2);
    assert_eq!(package.classes[0].name, "Type1");
    assert_eq!(package.classes[0].filename, "testdata/func1.rs");
    assert_eq!(package.classes[1].name, "Type1");
    assert_eq!(package.classes[1].filename, "testdata/func2.rs");
    assert_eq!(package.line_rate, 0.5);
}

#[test]
fn a_bare_file_name_falls_into_the_empty_package() {
    let root = fixture_root(&["solo.rs"]);
    let provider = FixedStructure(vec![declaration("solo", None, pos(1, 1), pos(2, 2))]);

    let mut coverage = empty_coverage();
    apply_profile(
        &mut coverage,
        &profile("solo.rs", vec![block((1, 10, 2, 2), 1, 1)]),
        &[root.path().to_path_buf()],
        &provider,
    )
    .unwrap();

    assert_eq!(coverage.packages[0].name, "");
}

#[test]
fn a_declaration_without_blocks_yields_an_empty_method() {
    let root = fixture_root(&["pkg/quiet.rs"]);
    let provider = FixedStructure(vec![declaration("quiet", None, pos(1, 1), pos(3, 2))]);

    let mut coverage = empty_coverage();
    apply_profile(
        &mut coverage,
        &profile("pkg/quiet.rs", vec![]),
        &[root.path().to_path_buf()],
        &provider,
    )
    .unwrap();

    let class = &coverage.packages[0].classes[0];
    assert_eq!(class.methods.len(), 1);
    assert!(class.methods[0].lines.is_empty());
    assert_eq!(class.methods[0].line_rate, 0.0);
    assert_eq!(class.line_rate, 0.0);
}

#[test]
fn an_unresolved_file_aborts_the_profile() {
    let mut coverage = empty_coverage();
    let err = apply_profile(
        &mut coverage,
        &profile("missing/gone.rs", vec![]),
        &[PathBuf::from("/no-such-root")],
        &FixedStructure(Vec::new()),
    )
    .unwrap_err();
    match err {
        CobertaError::FileNotFound { file } => assert_eq!(file, "missing/gone.rs"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(coverage.packages.is_empty());
}
