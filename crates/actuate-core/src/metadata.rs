//! App metadata: the discovered app name and its localized phrase tables.
//!
//! Metadata is produced by an external discovery step (reading the app
//! bundle's string tables). This module only models it and offers two
//! providers: an in-memory one and a JSON snapshot file.

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// App name used when discovery did not supply one.
pub const FALLBACK_APP_NAME: &str = "Streaks";

/// A `(key, locale, value)` triple from a localized string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedPhrase {
    pub key: String,
    pub locale: String,
    pub value: String,
}

impl LocalizedPhrase {
    pub fn new(
        key: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            locale: locale.into(),
            value: value.into(),
        }
    }
}

/// A table of localized phrases. A key may have one entry per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseTable {
    phrases: Vec<LocalizedPhrase>,
}

impl PhraseTable {
    pub fn new(phrases: Vec<LocalizedPhrase>) -> Self {
        Self { phrases }
    }

    pub fn push(&mut self, phrase: LocalizedPhrase) {
        self.phrases.push(phrase);
    }

    pub fn with_phrase(
        mut self,
        key: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.push(LocalizedPhrase::new(key, locale, value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalizedPhrase> {
        self.phrases.iter()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrases whose key equals `key` exactly.
    pub fn exact<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a LocalizedPhrase> + 'a {
        self.phrases.iter().filter(move |p| p.key == key)
    }

    /// Phrases whose key contains `fragment`.
    pub fn containing<'a>(
        &'a self,
        fragment: &'a str,
    ) -> impl Iterator<Item = &'a LocalizedPhrase> + 'a {
        self.phrases.iter().filter(move |p| p.key.contains(fragment))
    }
}

impl FromIterator<LocalizedPhrase> for PhraseTable {
    fn from_iter<I: IntoIterator<Item = LocalizedPhrase>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Everything discovery learned about the target app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Discovered display name of the app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Primary phrase table, looked up by exact intent key.
    #[serde(default)]
    pub phrases: PhraseTable,

    /// Secondary phrase table (app shortcut phrases), matched by intent name.
    #[serde(default)]
    pub shortcut_phrases: PhraseTable,
}

impl AppMetadata {
    /// Metadata for an app that could not be discovered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_phrases(mut self, phrases: PhraseTable) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_shortcut_phrases(mut self, phrases: PhraseTable) -> Self {
        self.shortcut_phrases = phrases;
        self
    }

    /// Name substituted for the app-name placeholder.
    pub fn display_name(&self) -> &str {
        match self.app_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => FALLBACK_APP_NAME,
        }
    }
}

/// Source of [`AppMetadata`].
pub trait MetadataProvider {
    fn load(&self) -> Result<AppMetadata, MetadataError>;

    /// Load metadata, degrading to [`AppMetadata::empty`] when unavailable.
    fn load_or_empty(&self) -> AppMetadata {
        match self.load() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "App metadata unavailable, using title and alias candidates only"
                );
                AppMetadata::empty()
            }
        }
    }
}

/// In-memory metadata, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata(pub AppMetadata);

impl MetadataProvider for StaticMetadata {
    fn load(&self) -> Result<AppMetadata, MetadataError> {
        Ok(self.0.clone())
    }
}

/// Metadata read from a JSON snapshot written by an external discovery step.
///
/// ```json
/// {
///   "app_name": "Streaks",
///   "phrases": [{"key": "AppIntent.TaskList.AllTasks", "locale": "en", "value": "All Tasks"}],
///   "shortcut_phrases": []
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonMetadataFile {
    path: PathBuf,
}

impl JsonMetadataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataProvider for JsonMetadataFile {
    fn load(&self) -> Result<AppMetadata, MetadataError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MetadataError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Provider used when discovery is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
    fn load(&self) -> Result<AppMetadata, MetadataError> {
        Err(MetadataError::Unavailable("discovery disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn display_name_falls_back() {
        assert_eq!(AppMetadata::empty().display_name(), "Streaks");
        assert_eq!(
            AppMetadata::empty().with_app_name("  ").display_name(),
            "Streaks"
        );
        assert_eq!(
            AppMetadata::empty().with_app_name("Habits").display_name(),
            "Habits"
        );
    }

    #[test]
    fn phrase_table_lookups() {
        let table = PhraseTable::default()
            .with_phrase("AppIntent.TaskList.AllTasks", "en", "All Tasks")
            .with_phrase("AppIntent.TaskList.AllTasks", "fr", "Toutes les tâches")
            .with_phrase("AppIntent.Pause.Title", "en", "Pause");

        assert_eq!(table.exact("AppIntent.TaskList.AllTasks").count(), 2);
        assert_eq!(table.containing("AppIntent.Pause.").count(), 1);
        assert_eq!(table.exact("AppIntent.Missing").count(), 0);
    }

    #[test]
    fn json_snapshot_round_trips_through_provider() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let snapshot = serde_json::json!({
            "app_name": "Streaks",
            "phrases": [
                {"key": "AppIntent.TaskList.AllTasks", "locale": "en", "value": "All Tasks"}
            ]
        });
        write!(file, "{snapshot}").expect("write snapshot");

        let metadata = JsonMetadataFile::new(file.path()).load().expect("load snapshot");
        assert_eq!(metadata.display_name(), "Streaks");
        assert_eq!(metadata.phrases.len(), 1);
        assert!(metadata.shortcut_phrases.is_empty());
    }

    #[test]
    fn missing_snapshot_degrades_to_empty() {
        let provider = JsonMetadataFile::new("/nonexistent/actuate/metadata.json");
        assert!(matches!(provider.load(), Err(MetadataError::Io { .. })));
        assert_eq!(provider.load_or_empty(), AppMetadata::empty());
    }

    #[test]
    fn disabled_discovery_is_unavailable() {
        assert!(matches!(NoMetadata.load(), Err(MetadataError::Unavailable(_))));
    }
}
