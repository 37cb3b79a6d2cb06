use super::fake::FakeFontSource;
use super::*;
use crate::store::Database;

#[test]
fn parses_provider_variant_keys() {
    assert_eq!(parse_variant("regular"), (400, None));
    assert_eq!(parse_variant("italic"), (400, Some("italic")));
    assert_eq!(parse_variant("700"), (700, None));
    assert_eq!(parse_variant("700italic"), (700, Some("italic")));
}

#[test]
fn weight_table_spans_thin_to_extrablack() {
    assert_eq!(weight_name(100), Some("Thin"));
    assert_eq!(weight_name(600), Some("SemiBold"));
    assert_eq!(weight_name(1000), Some("ExtraBlack"));
    assert_eq!(weight_name(450), None);
}

#[test]
fn builds_readable_file_names() {
    assert_eq!(
        font_file_name("Roboto", "700italic", "https://fonts.test/r/KFOlCnqEu92.ttf"),
        "RobotoBoldItalic.ttf"
    );
    assert_eq!(
        font_file_name("Open Sans", "regular", "https://fonts.test/o/mem8.woff2?v=3"),
        "OpenSansRegular.woff2"
    );
    assert_eq!(
        font_file_name("Inter", "italic", "https://fonts.test/no-extension"),
        "InterRegularItalic.ttf"
    );
}

#[test]
fn family_lookup_is_exact() {
    let index = FamilyIndex {
        items: vec![FontFamily {
            family: "Roboto".into(),
            files: IndexMap::new(),
        }],
    };
    assert!(index.find("Roboto").is_some());
    assert!(index.find("roboto").is_none());
    assert!(index.find("Roboto ").is_none());
}

#[tokio::test]
async fn stores_every_variant_under_the_family() {
    let db = Database::in_memory();
    let handle = db.init();
    let source = FakeFontSource::new().with_family("Roboto", &["regular", "700", "700italic"]);

    let written = fetch_family(&handle, &source, "Roboto").await.expect("fetch");
    assert_eq!(written, 3);

    let fonts = load_fonts(&handle).await.expect("load fonts");
    let roboto = fonts.get("Roboto").expect("family stored");
    let names: Vec<&str> = roboto.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["RobotoBold.ttf", "RobotoBoldItalic.ttf", "RobotoRegular.ttf"]
    );
    assert_eq!(roboto["RobotoBold.ttf"].as_bytes(), b"Roboto:700");
}

#[tokio::test]
async fn merges_with_previously_stored_variants() {
    let db = Database::in_memory();
    let handle = db.init();
    let mut existing = FontMap::new();
    existing
        .entry("Roboto".to_string())
        .or_default()
        .insert("RobotoCustom.otf".to_string(), Blob(vec![9]));
    handle
        .put_file(keys::FONTS, Some(FileData::Fonts(existing)))
        .await
        .expect("seed fonts");

    let source = FakeFontSource::new().with_family("Roboto", &["regular"]);
    fetch_family(&handle, &source, "Roboto").await.expect("fetch");

    let fonts = load_fonts(&handle).await.expect("load fonts");
    assert_eq!(fonts["Roboto"].len(), 2);
    assert!(fonts["Roboto"].contains_key("RobotoCustom.otf"));
}

#[tokio::test]
async fn unknown_family_is_a_font_download_error() {
    let db = Database::in_memory();
    let handle = db.init();
    let source = FakeFontSource::new().with_family("Roboto", &["regular"]);

    let err = fetch_family(&handle, &source, "Comic Neue")
        .await
        .expect_err("family missing");
    assert!(matches!(err, BridgeError::FontDownload(ref m) if m.contains("not found")));
}

#[tokio::test]
async fn one_failed_variant_fails_the_whole_family() {
    let db = Database::in_memory();
    let handle = db.init();
    let source = FakeFontSource::new().with_broken_family("Lato", &["regular", "700"], "900");

    let err = fetch_family(&handle, &source, "Lato")
        .await
        .expect_err("broken variant");
    assert_eq!(err.category(), crate::error::ErrorCategory::FontDownload);
    assert!(load_fonts(&handle).await.expect("load").is_empty());
}
