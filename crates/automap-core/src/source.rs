use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Where layer JSON comes from.
///
/// Every failure (missing file, transport error, non-2xx, ...) collapses to `None`: a layer
/// without data is simply absent from composition.
pub trait LayerSource {
    fn fetch_text(&self, location: &str) -> Option<String>;
}

impl<F> LayerSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn fetch_text(&self, location: &str) -> Option<String> {
        self(location)
    }
}

/// Reads layer files relative to a base directory (usually the page's output directory).
#[derive(Debug, Clone)]
pub struct FileSource {
    base: PathBuf,
}

impl FileSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl LayerSource for FileSource {
    fn fetch_text(&self, location: &str) -> Option<String> {
        let path = self.base.join(location.trim_start_matches('/'));
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "layer file unavailable");
                None
            }
        }
    }
}

/// In-memory source keyed by location; used for data inlined into the page.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    entries: IndexMap<String, String>,
}

impl InlineSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(location.into(), text.into());
    }

    pub fn with(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }
}

impl LayerSource for InlineSource {
    fn fetch_text(&self, location: &str) -> Option<String> {
        self.entries.get(location).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_source_returns_none_for_unknown_locations() {
        let src = InlineSource::new().with("pubs.json", "[]");
        assert_eq!(src.fetch_text("pubs.json").as_deref(), Some("[]"));
        assert_eq!(src.fetch_text("missing.json"), None);
    }

    #[test]
    fn closures_are_sources() {
        let src = |loc: &str| (loc == "a").then(|| "[]".to_string());
        assert_eq!(src.fetch_text("a").as_deref(), Some("[]"));
        assert_eq!(src.fetch_text("b"), None);
    }

    #[test]
    fn file_source_missing_file_is_none() {
        let src = FileSource::new(std::env::temp_dir().join("automap-no-such-dir"));
        assert_eq!(src.fetch_text("nothing.json"), None);
    }
}
