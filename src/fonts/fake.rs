use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{BridgeError, Result};

use super::{FamilyIndex, FontFamily, FontSource};

/// In-memory [`FontSource`] serving canned files; unknown URLs fail.
#[derive(Debug, Default)]
pub(crate) struct FakeFontSource {
    index: FamilyIndex,
    files: HashMap<String, Vec<u8>>,
    downloads: AtomicUsize,
}

impl FakeFontSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a family whose variants all download successfully.
    pub(crate) fn with_family(mut self, family: &str, variants: &[&str]) -> Self {
        let mut entry = FontFamily {
            family: family.to_string(),
            files: Default::default(),
        };
        for variant in variants {
            let url = format!("https://fonts.test/{family}/{variant}.ttf").replace(' ', "+");
            self.files.insert(url.clone(), format!("{family}:{variant}").into_bytes());
            entry.files.insert(variant.to_string(), url);
        }
        self.index.items.push(entry);
        self
    }

    /// Register a family listed in the index whose `broken` variant fails to download.
    pub(crate) fn with_broken_family(mut self, family: &str, ok: &[&str], broken: &str) -> Self {
        self = self.with_family(family, ok);
        if let Some(entry) = self.index.items.iter_mut().find(|e| e.family == family) {
            entry
                .files
                .insert(broken.to_string(), format!("https://fonts.test/missing/{broken}.ttf"));
        }
        self
    }

    pub(crate) fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FontSource for FakeFontSource {
    async fn family_index(&self) -> Result<FamilyIndex> {
        Ok(self.index.clone())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| BridgeError::font_download(format!("GET {url} returned 404 Not Found")))
    }
}
