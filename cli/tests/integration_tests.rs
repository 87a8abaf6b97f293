use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SENSOR_YAML: &str = r#"
name: Sensor
description: Telemetry frames
views:
  - name: Frame
    bit_length: 48
    records:
      - name: Status
        bit_length: 16
        fields:
          - name: Online
            data_type: boolean
            bit_length: 1
          - name: Spare
            data_type: reserved
            bit_length: 7
          - name: Mode
            data_type: enumeration
            bit_length: 8
      - name: Reading
        bit_length: 32
        fields:
          - name: Samples
            data_type: integer_array
            element_bits: 8
            bit_length: 32
            fragments:
              - { offset: 0, length: 16 }
"#;

const BROKEN_YAML: &str = r#"
name: Broken
views:
  - name: Frame
    bit_length: 8
    records:
      - name: Status
        bit_length: 8
        fields:
          - name: Online
            data_type: boolean
            bit_length: 3
          - name: Level
            data_type: integer
            bit_length: 0
          - name: Bytes
            data_type: byte_array
            bit_length: 5
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    path
}

fn bitschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bitschema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run bitschema")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_well_formed_definition() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "sensor.yaml", SENSOR_YAML);

    let out = bitschema(&["validate", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Sensor: 1 view(s), 2 record(s), 4 field(s)"), "{text}");
    assert!(text.contains("Validated 1 schema definition(s)."), "{text}");
}

#[test]
fn validate_reports_every_failure_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "broken.yaml", BROKEN_YAML);

    let out = bitschema(&["validate", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("(3 error(s))"), "{err}");
    assert!(err.contains("'Frame.Status.Online'"), "{err}");
    assert!(err.contains("'Frame.Status.Level'"), "{err}");
    assert!(err.contains("'Frame.Status.Bytes'"), "{err}");
    assert!(err.contains("error: 1 of 1 schema definition(s) failed validation"), "{err}");
}

#[test]
fn validate_fail_fast_reports_one_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "broken.yaml", BROKEN_YAML);

    let out = bitschema(&["validate", "--fail-fast", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("(1 error(s))"), "{err}");
    assert!(err.contains("'Frame.Status.Online'"), "{err}");
    assert!(!err.contains("'Frame.Status.Bytes'"), "{err}");
}

#[test]
fn validate_walks_directories() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sensor.yaml", SENSOR_YAML);
    write(dir.path(), "broken.yml", BROKEN_YAML);
    write(dir.path(), "notes.txt", "not a schema");

    let out = bitschema(&["validate", dir.path().to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("ok: "), "{}", stdout(&out));
    assert!(
        stderr(&out).contains("error: 1 of 2 schema definition(s) failed validation"),
        "{}",
        stderr(&out)
    );
}

#[test]
fn validate_rejects_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    let out = bitschema(&["validate", missing.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("does not exist"), "{}", stderr(&out));
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_prints_layout_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "sensor.yaml", SENSOR_YAML);

    let out = bitschema(&["inspect", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("Sensor - Telemetry frames"), "{text}");
    assert!(text.contains("Frame.Reading.Samples"), "{text}");
    assert!(text.contains("IntegerArray(8)"), "{text}");
    assert!(text.contains("[0..16)"), "{text}");
}

#[test]
fn inspect_json_has_absolute_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "sensor.yaml", SENSOR_YAML);

    let out = bitschema(&["inspect", path.to_str().unwrap(), "--format", "json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let layout: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let fields = layout.as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[2]["path"], "Frame.Status.Mode");
    assert_eq!(fields[2]["offset"], 8);
    assert_eq!(fields[3]["offset"], 16);
    assert_eq!(fields[3]["element_bits"], 8);
}

#[test]
fn inspect_unknown_view_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "sensor.yaml", SENSOR_YAML);

    let out = bitschema(&["inspect", path.to_str().unwrap(), "--view", "Packet"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("has no view 'Packet'"), "{}", stderr(&out));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_loads_registry_relative_to_config() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    fs::create_dir_all(&schemas).unwrap();
    write(&schemas, "sensor.yaml", SENSOR_YAML);
    write(&schemas, "broken.yaml", BROKEN_YAML);
    let config = write(
        dir.path(),
        "bitschema.yml",
        "version: \"1.0\"\nsources:\n  - schemas\nexclude:\n  - Broken\n",
    );

    let out = bitschema(&["check", "--config", config.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Sensor: 1 view(s), 4 field(s)"), "{text}");
    assert!(text.contains("Loaded 1 schema(s)."), "{text}");
}

#[test]
fn check_truncates_reported_errors() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    fs::create_dir_all(&schemas).unwrap();
    write(&schemas, "broken.yaml", BROKEN_YAML);
    let config = write(
        dir.path(),
        "bitschema.yml",
        "version: \"1.0\"\nsources:\n  - schemas\nvalidation:\n  max_reported_errors: 1\n",
    );

    let out = bitschema(&["check", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("(3 error(s))"), "{err}");
    assert!(err.contains("... 2 more"), "{err}");
    assert!(err.contains("all 1 schema source(s) failed"), "{err}");
}

#[test]
fn check_reports_duplicate_schema_names() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    fs::create_dir_all(&schemas).unwrap();
    write(&schemas, "a.yaml", SENSOR_YAML);
    write(&schemas, "b.yaml", SENSOR_YAML);
    let config = write(
        dir.path(),
        "bitschema.yml",
        "version: \"1.0\"\nsources:\n  - schemas\n",
    );

    let out = bitschema(&["check", "--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("b.yaml: duplicate schema name 'Sensor'"), "{err}");
    assert!(!err.contains('\u{1b}'), "stderr should not carry ANSI escapes: {err}");
}
