use qmlbridge_lib::BridgeOutput;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

fn write_export(path: &Path) {
    let metadata = serde_json::json!({
        "documentInfo": { "name": "Landing" },
        "artboards": [{
            "name": "Home",
            "width": 320,
            "height": 480,
            "children": [{
                "name": "Title",
                "metadata": { "textDetails": { "contents": "Hi", "fontFamily": "Roboto" } }
            }]
        }]
    });
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("Landing/Landing.metadata", options)
        .expect("start entry");
    zip.write_all(&serde_json::to_vec(&metadata).expect("serialize metadata"))
        .expect("write entry");
    let bytes = zip.finish().expect("finish export").into_inner();
    std::fs::write(path, bytes).expect("write export");
}

/// Runs the binary against an isolated store and config location.
fn qmlbridge(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qmlbridge"))
        .args(args)
        .arg("--store-dir")
        .arg(dir.path().join("store"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("QMLBRIDGE_FONTS_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("run qmlbridge")
}

fn parse_stdout(output: &Output) -> BridgeOutput {
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
}

#[test]
fn upload_rejects_wrong_extension_with_fatal_exit_code() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("design.zip");
    std::fs::write(&file, b"PK").expect("write file");

    let output = qmlbridge(&dir, &["upload", file.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        BridgeOutput::Error(err) => {
            assert!(err.error.message.contains(".qtbridge"), "{}", err.error.message)
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn package_on_empty_store_reports_nothing_to_package() {
    let dir = TempDir::new().expect("tempdir");

    let output = qmlbridge(&dir, &["package", "--output", dir.path().to_str().expect("utf8")]);
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        BridgeOutput::Error(err) => assert_eq!(err.error.message, "nothing to package"),
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn download_fonts_without_key_fails() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("Landing.qtbridge");
    write_export(&file);

    let upload = qmlbridge(&dir, &["upload", file.to_str().expect("utf8 path")]);
    assert_eq!(upload.status.code(), Some(0));

    let output = qmlbridge(&dir, &["process", "--download-fonts"]);
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        BridgeOutput::Error(err) => {
            assert!(err.error.message.contains("QMLBRIDGE_FONTS_API_KEY"))
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn convert_writes_archive_and_reports_log() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("Landing.qtbridge");
    let out_dir = dir.path().join("dist");
    write_export(&file);

    let output = qmlbridge(
        &dir,
        &[
            "convert",
            file.to_str().expect("utf8 path"),
            "--add-object-names",
            "--output",
            out_dir.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    match parse_stdout(&output) {
        BridgeOutput::Convert(convert) => {
            assert_eq!(convert.upload.file_name, "Landing.qtbridge");
            assert_eq!(convert.report.qml_files, 1);
            assert_eq!(convert.archive.file_name, "Landing.zip");
            assert!(convert.archive.path.is_file());
            assert!(convert.log.iter().any(|line| line == "Completed."));
        }
        other => panic!("expected convert output, got {other:?}"),
    }
    assert!(out_dir.join("Landing.zip").is_file());
}

#[test]
fn reset_recovers_and_empties_the_store() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("Landing.qtbridge");
    write_export(&file);
    assert_eq!(
        qmlbridge(&dir, &["upload", file.to_str().expect("utf8 path")])
            .status
            .code(),
        Some(0)
    );

    let output = qmlbridge(&dir, &["reset"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(matches!(parse_stdout(&output), BridgeOutput::Reset(_)));

    let process = qmlbridge(&dir, &["process"]);
    assert_eq!(process.status.code(), Some(2));
}
