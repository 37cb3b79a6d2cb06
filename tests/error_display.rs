use qmlbridge_lib::{BridgeError, ErrorCategory};

#[test]
fn upload_error_display_includes_message() {
    let err = BridgeError::upload("expected a .qtbridge file");

    assert_eq!(format!("{}", err), "Upload error: expected a .qtbridge file");
}

#[test]
fn io_errors_surface_as_database_errors() {
    let io_err = std::io::Error::other("disk full");
    let err: BridgeError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("Database error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn classify_keeps_known_kinds_and_wraps_the_rest() {
    let known = BridgeError::classify(BridgeError::archive("corrupt"));
    assert_eq!(format!("{}", known), "Archive error: corrupt");

    let foreign = BridgeError::classify(std::io::Error::other("boom"));
    assert_eq!(foreign.category(), ErrorCategory::Unclassified);
    assert_eq!(format!("{}", foreign), "Unexpected error: boom");
}

#[test]
fn font_download_wrapping_uses_font_prefix() {
    let err = BridgeError::metadata("index unavailable").into_font_download();

    assert_eq!(format!("{}", err), "Font download error: index unavailable");
}

#[test]
fn payload_carries_message_without_prefix() {
    let payload = BridgeError::file_processor("no font source").to_payload();

    assert_eq!(payload.category, ErrorCategory::FileProcessor);
    assert_eq!(payload.message, "no font source");
    assert!(payload.remediation.is_some());
}

#[tokio::test]
async fn reqwest_errors_drop_the_request_url() {
    let err = reqwest::Client::new()
        .get("http://127.0.0.1:9/webfonts?key=SECRETKEY123")
        .send()
        .await
        .expect_err("nothing listens on port 9");
    let err: BridgeError = err.into();

    assert_eq!(err.category(), ErrorCategory::FontDownload);
    assert!(!format!("{}", err).contains("SECRETKEY123"));
}
