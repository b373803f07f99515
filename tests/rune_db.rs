use runecaster::runes::db::{
    load_template, load_template_dirs, load_templates, save_template, TemplateSet, SCHEMA_VERSION,
};
use runecaster::runes::engine::{Gesture, Point};
use runecaster::runes::error::{ParseErrorKind, RuneError};
use tempfile::tempdir;

fn zigzag() -> Gesture {
    Gesture::new(vec![
        Point::new(0.125, 0.5, 0),
        Point::new(10.333, -4.75, 0),
        Point::new(20.0, 3.1, 1),
        Point::new(-7.25, 0.001, 1),
    ])
}

#[test]
fn save_then_load_preserves_name_and_points() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zigzag.json");
    save_template(&zigzag(), "ZigZag", &path).unwrap();

    let set = load_template(&path).unwrap();
    assert_eq!(set.len(), 1);
    let template = set.iter().next().unwrap();
    assert_eq!(template.name, "ZigZag");
    assert_eq!(template.gesture.points.len(), 4);
    for (loaded, original) in template.gesture.points.iter().zip(zigzag().points) {
        assert!((loaded.x - original.x).abs() < 1e-4);
        assert!((loaded.y - original.y).abs() < 1e-4);
        assert_eq!(loaded.stroke_id, original.stroke_id);
    }
}

#[test]
fn saved_file_carries_schema_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("line.json");
    save_template(&Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]), "Line", &path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["schema_version"], SCHEMA_VERSION);
    assert_eq!(value["name"], "Line");
}

#[test]
fn saving_empty_gesture_is_invalid_argument() {
    let dir = tempdir().unwrap();
    let err = save_template(&Gesture::default(), "Empty", &dir.path().join("e.json")).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_template(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, RuneError::NotFound { .. }), "{err}");
}

#[test]
fn malformed_json_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_template(&path).unwrap_err();
    match err {
        RuneError::Parse { path: Some(p), error } => {
            assert_eq!(p, path);
            assert!(matches!(error.kind, ParseErrorKind::Json(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn template_without_points_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, r#"{"schema_version":1,"name":"Empty","points":[]}"#).unwrap();
    let err = load_template(&path).unwrap_err();
    assert!(matches!(err, RuneError::Parse { .. }), "{err}");
}

#[test]
fn unknown_schema_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.json");
    std::fs::write(
        &path,
        r#"{"schema_version":99,"name":"Line","points":[{"x":0,"y":0},{"x":1,"y":0}]}"#,
    )
    .unwrap();
    match load_template(&path).unwrap_err() {
        RuneError::Parse { error, .. } => {
            assert_eq!(error.kind, ParseErrorKind::UnsupportedSchema { version: 99 })
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn set_document_loads_every_template_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("set.json");
    std::fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "templates": [
                {"name": "Line", "points": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]},
                {"name": "Vee", "points": [{"x": 0, "y": 1}, {"x": 1, "y": 0}, {"x": 2, "y": 1}]}
            ]
        }"#,
    )
    .unwrap();
    let set = load_template(&path).unwrap();
    assert_eq!(set.classes(), vec!["Line", "Vee"]);
}

#[test]
fn directory_load_skips_bad_files_and_sorts() {
    let dir = tempdir().unwrap();
    save_template(
        &Gesture::from_xy(&[(0.0, 0.0), (1.0, 1.0)]),
        "Beta",
        &dir.path().join("b.json"),
    )
    .unwrap();
    save_template(
        &Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]),
        "Alpha",
        &dir.path().join("a.json"),
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.json"), "[]").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let set = load_templates(dir.path()).unwrap();
    assert_eq!(set.classes(), vec!["Alpha", "Beta"]);
}

#[test]
fn loading_a_missing_directory_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_templates(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, RuneError::NotFound { .. }), "{err}");
}

#[test]
fn template_dirs_skip_missing_entries() {
    let dir = tempdir().unwrap();
    save_template(
        &Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]),
        "Line",
        &dir.path().join("line.json"),
    )
    .unwrap();
    let set = load_template_dirs(&[dir.path().join("absent"), dir.path().to_path_buf()]);
    assert_eq!(set.len(), 1);
}

#[test]
fn add_template_persists_and_appends() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("user");
    let mut set = TemplateSet::new();
    set.push("Line", Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]));

    let path = set.add_template(&target, "Fire Ball", &zigzag()).unwrap();
    assert!(path.starts_with(&target));
    assert!(path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap()
        .starts_with("fire-ball-"));
    assert_eq!(set.classes(), vec!["Line", "Fire Ball"]);

    let reloaded = load_templates(&target).unwrap();
    assert_eq!(reloaded.classes(), vec!["Fire Ball"]);
}

#[test]
fn bundled_templates_load() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
    let set = load_templates(&dir).unwrap();
    assert_eq!(set.classes(), vec!["Circle", "Line", "Shield", "Triangle"]);
}

#[test]
fn saving_into_a_file_path_parent_is_io_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let err = save_template(&zigzag(), "ZigZag", &blocker.join("zigzag.json")).unwrap_err();
    assert!(matches!(err, RuneError::Io { .. }), "{err}");

    let err = save_template(&zigzag(), "ZigZag", dir.path()).unwrap_err();
    assert!(matches!(err, RuneError::Io { .. }), "{err}");
}

#[test]
fn non_numeric_coordinate_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("letters.json");
    std::fs::write(
        &path,
        r#"{"schema_version":1,"name":"L","points":[{"x":"a","y":0}]}"#,
    )
    .unwrap();
    let err = load_template(&path).unwrap_err();
    assert!(matches!(err, RuneError::Parse { .. }), "{err}");
}

#[test]
fn invalid_utf8_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary.json");
    std::fs::write(&path, [0x7b, 0xff, 0xfe, 0x7d]).unwrap();
    match load_template(&path).unwrap_err() {
        RuneError::Parse { path: Some(p), error } => {
            assert_eq!(p, path);
            assert!(matches!(error.kind, ParseErrorKind::Json(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
