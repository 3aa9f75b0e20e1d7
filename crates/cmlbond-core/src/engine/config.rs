use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// What `insert` does with a bond whose atom pair or id is already indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Check for conflicts before touching the sequence; a conflicting bond is
    /// rejected and stays detached.
    #[default]
    RejectAtomically,
    /// Place the bond in the sequence first, then index it; a conflict leaves
    /// the bond structurally present but unindexed. This is how CML toolkits
    /// have historically behaved.
    RetainUnindexed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IndexingConfig {
    pub conflict_policy: ConflictPolicy,
    /// Rebuild indexes and ligands whenever a bond array is attached to a molecule.
    pub reindex_on_attach: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            reindex_on_attach: true,
        }
    }
}

impl IndexingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        })
    }
}

#[derive(Default)]
pub struct IndexingConfigBuilder {
    conflict_policy: Option<ConflictPolicy>,
    reindex_on_attach: Option<bool>,
}

impl IndexingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }
    pub fn reindex_on_attach(mut self, enabled: bool) -> Self {
        self.reindex_on_attach = Some(enabled);
        self
    }

    pub fn build(self) -> IndexingConfig {
        let defaults = IndexingConfig::default();
        IndexingConfig {
            conflict_policy: self.conflict_policy.unwrap_or(defaults.conflict_policy),
            reindex_on_attach: self.reindex_on_attach.unwrap_or(defaults.reindex_on_attach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_rejects_atomically_and_reindexes_on_attach() {
        let config = IndexingConfig::default();
        assert_eq!(config.conflict_policy, ConflictPolicy::RejectAtomically);
        assert!(config.reindex_on_attach);
    }

    #[test]
    fn builder_overrides_only_given_fields() {
        let config = IndexingConfigBuilder::new()
            .conflict_policy(ConflictPolicy::RetainUnindexed)
            .build();
        assert_eq!(config.conflict_policy, ConflictPolicy::RetainUnindexed);
        assert!(config.reindex_on_attach);

        let config = IndexingConfigBuilder::new().reindex_on_attach(false).build();
        assert_eq!(config.conflict_policy, ConflictPolicy::RejectAtomically);
        assert!(!config.reindex_on_attach);
    }

    #[test]
    fn from_toml_str_parses_kebab_case_keys() {
        let config = IndexingConfig::from_toml_str(
            r#"
            conflict-policy = "retain-unindexed"
            reindex-on-attach = false
            "#,
        )
        .unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::RetainUnindexed);
        assert!(!config.reindex_on_attach);
    }

    #[test]
    fn from_toml_str_fills_missing_keys_with_defaults() {
        let config = IndexingConfig::from_toml_str("").unwrap();
        assert_eq!(config, IndexingConfig::default());
    }

    #[test]
    fn from_toml_str_rejects_unknown_keys_and_values() {
        assert!(matches!(
            IndexingConfig::from_toml_str("strict = true"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            IndexingConfig::from_toml_str(r#"conflict-policy = "ignore""#),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn load_reads_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"conflict-policy = "retain-unindexed""#).unwrap();

        let config = IndexingConfig::load(file.path()).unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::RetainUnindexed);
        assert!(config.reindex_on_attach);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        match IndexingConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => {
                assert!(reported.ends_with("missing.toml"));
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
