use std::fs;
use std::path::{Path, PathBuf};

use appm_core::{Error, FieldValues, Project, ProjectMetadata, TemplateSource};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/valid_templates")
        .join(name)
}

fn meta() -> ProjectMetadata {
    ProjectMetadata {
        year: 2024,
        summary: "test project".into(),
        internal: true,
        researcher_name: Some("Hoang Son Le".into()),
        organisation_name: Some("APPN".into()),
    }
}

fn make_project(root: &Path, template: &str) -> Project {
    Project::from_template(root, TemplateSource::Path(fixture(template)), meta()).unwrap()
}

fn file_name(proc_level: Option<&str>) -> String {
    match proc_level {
        Some(p) => format!("20201010-101010_adelaide_lidar_alpha_{p}.bin"),
        None => "20201010-101010_adelaide_lidar_alpha.bin".to_string(),
    }
}

fn expected_fields(proc_level: &str, rest: &str) -> FieldValues {
    [
        ("date", "20201010"),
        ("time", "101010"),
        ("site", "adelaide"),
        ("sensor", "lidar"),
        ("trial", "alpha"),
        ("procLevel", proc_level),
        ("rest", rest),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn expected_layout(proc_dir: &str) -> PathBuf {
    ["adelaide", "lidar", "20201010", "alpha", proc_dir].iter().collect()
}

/// (name procLevel, matched procLevel, matched rest, placement directory)
type Case = (Option<&'static str>, &'static str, &'static str, &'static str);

const PROC_LEVEL_CASES: [Case; 7] = [
    (Some("raw"), "raw", ".bin", "T0-raw"),
    (None, "raw", ".bin", "T0-raw"),
    (Some("proc"), "proc", ".bin", "T1-proc"),
    (Some("trait"), "trait", ".bin", "T2-trait"),
    (Some("T0-raw"), "T0-raw", ".bin", "T0-raw"),
    (Some("T1-proc"), "T1-proc", ".bin", "T1-proc"),
    (Some("T2-trait"), "T2-trait", ".bin", "T2-trait"),
];

fn check_case(template: &str, case: Case) {
    let (proc_level, matched, rest, dir) = case;
    let tmp = tempfile::tempdir().unwrap();
    let project = make_project(tmp.path(), template);
    let name = file_name(proc_level);

    assert_eq!(
        project.match_name(&name).unwrap(),
        expected_fields(matched, rest),
        "{template}: {name}"
    );
    assert_eq!(project.placement(&name).unwrap(), expected_layout(dir), "{template}: {name}");

    let src = tmp.path().join(&name);
    fs::write(&src, "dummy_file").unwrap();
    let dest = project.copy_file(&src).unwrap();
    assert_eq!(dest, project.location().join(expected_layout(dir)).join(&name));
    assert!(dest.is_file());
}

#[test]
fn golden_match_and_layout_default_template() {
    for case in PROC_LEVEL_CASES {
        check_case("default.yaml", case);
    }
}

#[test]
fn golden_match_and_layout_extension_specific_template() {
    for case in PROC_LEVEL_CASES {
        check_case("file_no_default_ext.yaml", case);
    }
}

#[test]
fn golden_match_and_layout_default_only_field() {
    // procLevel is not a component here: a suffix stays in `rest`.
    let cases: [Case; 7] = [
        (Some("raw"), "raw", "_raw.bin", "T0-raw"),
        (None, "raw", ".bin", "T0-raw"),
        (Some("proc"), "raw", "_proc.bin", "T0-raw"),
        (Some("trait"), "raw", "_trait.bin", "T0-raw"),
        (Some("T0-raw"), "raw", "_T0-raw.bin", "T0-raw"),
        (Some("T1-proc"), "raw", "_T1-proc.bin", "T0-raw"),
        (Some("T2-trait"), "raw", "_T2-trait.bin", "T0-raw"),
    ];
    for case in cases {
        check_case("file_missing_component_but_has_default.yaml", case);
    }
}

#[test]
fn golden_default_template_rejects_malformed_names() {
    let tmp = tempfile::tempdir().unwrap();
    let project = make_project(tmp.path(), "default.yaml");

    for name in [
        "2024-01-01_10-10-10_adelaide_oak_trial-alpha_raw.bin",
        "adelaide_lidar_2024.bin",
        "20250101_adelaide_lidar_0_raw.bin",
    ] {
        let err = project.match_name(name).unwrap_err();
        assert!(matches!(err, Error::FileFormatMismatch { .. }), "{name}: {err:?}");
        assert!(err.to_string().starts_with(&format!("Name: {name}. Pattern: ")));
    }
}

#[test]
fn golden_unknown_extension_without_wildcard_is_unsupported() {
    let tmp = tempfile::tempdir().unwrap();
    let project = make_project(tmp.path(), "file_no_default_ext.yaml");

    let err = project
        .match_name("2020919-101010_adelaide_lidar_trial-0_proc.jpeg")
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileExtension { .. }));
}

#[test]
fn golden_extension_specific_pattern_wins_over_wildcard() {
    let tmp = tempfile::tempdir().unwrap();
    let project = make_project(tmp.path(), "file_multi_ext.yaml");

    // csv uses '-' between fields
    let m = project.match_name("20201010-adelaide-lidar-alpha.csv").unwrap();
    assert_eq!(m["site"], "adelaide");
    assert_eq!(m["procLevel"], "raw");
    assert_eq!(m["rest"], ".csv");

    // anything else falls through to the wildcard
    let placement = project.placement("20201010_adelaide_lidar_alpha_proc.txt").unwrap();
    assert_eq!(placement, expected_layout("T1-proc"));

    // the csv pattern does not accept '_' separated names
    let err = project.match_name("20201010_adelaide_lidar_alpha.csv").unwrap_err();
    assert!(matches!(err, Error::FileFormatMismatch { .. }));
}

#[test]
fn golden_copy_refuses_to_overwrite() {
    let tmp = tempfile::tempdir().unwrap();
    let project = make_project(tmp.path(), "default.yaml");
    let name = file_name(Some("proc"));
    let src = tmp.path().join(&name);
    fs::write(&src, "dummy_file").unwrap();

    project.copy_file(&src).unwrap();
    let err = project.copy_file(&src).unwrap_err();
    assert!(matches!(err, Error::DestinationExists { .. }));
}
