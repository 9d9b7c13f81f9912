use crate::{error::CleanupError, paths::normalize};
use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

/// Name of the configuration file looked up in the corpus root.
pub const CONFIG_FILE_NAME: &str = "dita-cleanup.toml";

fn default_extensions() -> Vec<String> {
    vec!["dita".to_string(), "xml".to_string()]
}

fn default_include_extension() -> String {
    "adoc".to_string()
}

/// Settings for one cleanup run.
///
/// Every key is optional in the file; missing keys take the defaults below.
///
/// ```toml
/// extensions = ["dita", "xml"]
/// conref_prefix = "reuse/attributes.dita#attributes"
/// images_dir = "images"
/// include_extension = "adoc"
/// fix_links = true
/// prune_ids = true
/// prune_includes = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    /// File extensions (without the dot) treated as documents.
    pub extensions: Vec<String>,
    /// Target prefix for extracted placeholders. Extraction is off when unset.
    pub conref_prefix: Option<String>,
    /// Shared images directory, relative to the corpus root unless absolute. Image rewriting is
    /// off when unset.
    pub images_dir: Option<PathBuf>,
    /// Extension of the include files whose cross-references get pruned.
    pub include_extension: String,
    pub fix_links: bool,
    pub prune_ids: bool,
    pub prune_includes: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        CleanupConfig {
            extensions: default_extensions(),
            conref_prefix: None,
            images_dir: None,
            include_extension: default_include_extension(),
            fix_links: true,
            prune_ids: true,
            prune_includes: true,
        }
    }
}

impl CleanupConfig {
    pub fn from_toml(content: &str) -> Result<Self, CleanupError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CleanupError> {
        tracing::debug!("Attempting to read config from: {:?}", path.as_ref());
        let content = read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Configuration for the corpus at `root`.
    ///
    /// An explicit file must exist. Otherwise [`CONFIG_FILE_NAME`] is read from the corpus
    /// directory (the parent, when `root` is a file) if it is there, and the defaults apply if
    /// it is not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, CleanupError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let dir = if root.is_file() {
            root.parent().unwrap_or(Path::new(""))
        } else {
            root
        };
        let candidate = dir.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(Self::default());
        }
        Self::from_file(candidate)
    }

    /// The images directory resolved against `root`.
    pub fn images_dir_in(&self, root: &Path) -> Option<PathBuf> {
        self.images_dir.as_ref().map(|dir| normalize(root.join(dir)))
    }

    /// Whether `path` has one of the configured document extensions.
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let config = CleanupConfig::from_toml("conref_prefix = \"vars\"").unwrap();
        assert_eq!(config.conref_prefix.as_deref(), Some("vars"));
        assert_eq!(config.extensions, vec!["dita", "xml"]);
        assert_eq!(config.include_extension, "adoc");
        assert!(config.fix_links && config.prune_ids && config.prune_includes);
        assert_eq!(config.images_dir, None);
    }

    #[test]
    fn test_unknown_key_is_a_config_error() {
        let err = CleanupConfig::from_toml("conref = \"vars\"").unwrap_err();
        assert!(matches!(err, CleanupError::Config(_)));
    }

    #[test]
    fn test_load_from_corpus_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CleanupConfig::load(dir.path(), None).unwrap(),
            CleanupConfig::default()
        );

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "images_dir = \"images\"\nprune_ids = false\n",
        )
        .unwrap();
        let config = CleanupConfig::load(dir.path(), None).unwrap();
        assert!(!config.prune_ids);
        assert_eq!(
            config.images_dir_in(Path::new("/corpus")),
            Some(PathBuf::from("/corpus/images"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = CleanupConfig::load(dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, CleanupError::NotFound(_)));
    }

    #[test]
    fn test_is_document() {
        let config = CleanupConfig::default();
        assert!(config.is_document(Path::new("a/b.dita")));
        assert!(config.is_document(Path::new("map.xml")));
        assert!(!config.is_document(Path::new("attrs.adoc")));
        assert!(!config.is_document(Path::new("README")));
    }
}
