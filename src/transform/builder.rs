//! Per-artboard accumulator for imports and code.

use indexmap::IndexSet;
use regex::Regex;
use std::fmt::Display;
use std::sync::OnceLock;

use super::BASE_IMPORT;

fn enum_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"ENUM\((.*?)\)").expect("enum marker pattern is valid"))
}

/// Strip every `ENUM(<inner>)` marker down to `<inner>`.
pub fn unwrap_enum_markers(code: &str) -> String {
    enum_marker().replace_all(code, "$1").into_owned()
}

/// Collects one artboard's output. Created fresh for every artboard so
/// nothing leaks between files.
#[derive(Debug)]
pub(crate) struct ArtboardBuilder {
    imports: IndexSet<String>,
    code: String,
}

impl ArtboardBuilder {
    pub(crate) fn new() -> Self {
        let mut imports = IndexSet::new();
        imports.insert(BASE_IMPORT.to_string());
        Self {
            imports,
            code: String::new(),
        }
    }

    pub(crate) fn add_import(&mut self, statement: &str) {
        let statement = statement.trim();
        if !statement.is_empty() {
            self.imports.insert(statement.to_string());
        }
    }

    pub(crate) fn open(&mut self, object_type: &str) {
        self.line(format_args!("{object_type} {{"));
    }

    pub(crate) fn close(&mut self) {
        self.line("}");
    }

    pub(crate) fn prop(&mut self, name: &str, value: impl Display) {
        self.line(format_args!("{name}: {value}"));
    }

    pub(crate) fn line(&mut self, text: impl Display) {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = writeln!(self.code, "{text}");
    }

    /// Imports followed by the unwrapped code buffer.
    pub(crate) fn finish(self) -> String {
        let imports: Vec<&str> = self.imports.iter().map(String::as_str).collect();
        format!(
            "{}\n\n{}",
            imports.join("\n"),
            unwrap_enum_markers(&self.code)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_enum_markers_non_greedily() {
        let code = "fillMode: ENUM(Image.PreserveAspectFit)\nwrapMode: ENUM(Text.WordWrap) // x";
        assert_eq!(
            unwrap_enum_markers(code),
            "fillMode: Image.PreserveAspectFit\nwrapMode: Text.WordWrap // x"
        );
    }

    #[test]
    fn leaves_code_without_markers_untouched() {
        assert_eq!(unwrap_enum_markers("x: 10"), "x: 10");
    }

    #[test]
    fn imports_are_seeded_and_deduplicated() {
        let mut builder = ArtboardBuilder::new();
        builder.add_import("import QtQuick.Controls");
        builder.add_import("import QtQuick");
        builder.add_import("import QtQuick.Controls");
        builder.open("Item");
        builder.close();
        let text = builder.finish();
        assert!(text.starts_with("import QtQuick\nimport QtQuick.Controls\n\nItem {\n}\n"));
    }
}
