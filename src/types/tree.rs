//! Output tree shared by the transformer, the store and the packager.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A generated file or a nested directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QmlValue {
    File(String),
    Directory(QmlDirectory),
}

/// Insertion-ordered mapping from sanitized name to [`QmlValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QmlDirectory {
    entries: IndexMap<String, QmlValue>,
}

impl QmlDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `base`, appending `1`, `2`, ... while the key is taken.
    /// Returns the key actually used.
    pub fn insert_unique(&mut self, base: &str, value: QmlValue) -> String {
        let key = self.unique_key(base);
        self.entries.insert(key.clone(), value);
        key
    }

    fn unique_key(&self, base: &str) -> String {
        if !self.entries.contains_key(base) {
            return base.to_string();
        }
        (1usize..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !self.entries.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn get(&self, key: &str) -> Option<&QmlValue> {
        self.entries.get(key)
    }

    pub fn directory(&self, key: &str) -> Option<&QmlDirectory> {
        match self.entries.get(key) {
            Some(QmlValue::Directory(dir)) => Some(dir),
            _ => None,
        }
    }

    pub fn file(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(QmlValue::File(code)) => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QmlValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every file in depth-first order with its `/`-joined path segments.
    pub fn files(&self) -> Vec<(Vec<&str>, &str)> {
        let mut out = Vec::new();
        collect_files(self, &mut Vec::new(), &mut out);
        out
    }

    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|value| match value {
                QmlValue::File(_) => 1,
                QmlValue::Directory(dir) => dir.file_count(),
            })
            .sum()
    }
}

fn collect_files<'a>(
    dir: &'a QmlDirectory,
    prefix: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a str)>,
) {
    for (key, value) in &dir.entries {
        prefix.push(key.as_str());
        match value {
            QmlValue::File(code) => out.push((prefix.clone(), code.as_str())),
            QmlValue::Directory(child) => collect_files(child, prefix, out),
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_get_numeric_suffixes() {
        let mut dir = QmlDirectory::new();
        let keys: Vec<String> = (0..3)
            .map(|i| dir.insert_unique("Card", QmlValue::File(format!("// {i}"))))
            .collect();
        assert_eq!(keys, vec!["Card", "Card1", "Card2"]);
        assert_eq!(dir.file("Card2"), Some("// 2"));
    }

    #[test]
    fn suffixing_skips_names_already_taken() {
        let mut dir = QmlDirectory::new();
        dir.insert_unique("Card", QmlValue::File(String::new()));
        dir.insert_unique("Card1", QmlValue::File(String::new()));
        let key = dir.insert_unique("Card", QmlValue::File(String::new()));
        assert_eq!(key, "Card2");
    }

    #[test]
    fn preserves_insertion_order() {
        let mut dir = QmlDirectory::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            dir.insert_unique(name, QmlValue::File(String::new()));
        }
        assert_eq!(dir.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn files_walks_nested_directories() {
        let mut inner = QmlDirectory::new();
        inner.insert_unique("Hover", QmlValue::File("b".into()));
        let mut root = QmlDirectory::new();
        root.insert_unique("Home", QmlValue::File("a".into()));
        root.insert_unique("Button", QmlValue::Directory(inner));

        let files = root.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], (vec!["Home"], "a"));
        assert_eq!(files[1], (vec!["Button", "Hover"], "b"));
        assert_eq!(root.file_count(), 2);
    }

    #[test]
    fn json_shape_is_nested_maps_of_strings() {
        let mut inner = QmlDirectory::new();
        inner.insert_unique("Card", QmlValue::File("Item {}".into()));
        let mut root = QmlDirectory::new();
        root.insert_unique("Root", QmlValue::Directory(inner));

        let json = serde_json::to_string(&root).expect("serialize tree");
        assert_eq!(json, r#"{"Root":{"Card":"Item {}"}}"#);
        let back: QmlDirectory = serde_json::from_str(&json).expect("parse tree");
        assert_eq!(back, root);
    }
}
