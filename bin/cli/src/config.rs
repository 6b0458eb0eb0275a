//! CLI configuration.
//!
//! Loaded via the `config` crate from an optional file plus `FLOWSMITH__*`
//! environment variables, e.g. `FLOWSMITH__CATALOG__DEFAULT_INPUT=input`.
//! Environment values win over the file.

use flowsmith_workflow::CatalogConfig;
use serde::Deserialize;
use std::path::Path;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "FLOWSMITH";

/// Configuration for the `flowsmith` command.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Overrides applied to the builtin node catalog.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CliConfig {
    /// Loads configuration from the given file (if any) and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the merged
    /// values do not match the expected shape.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(file, None)
    }

    /// Like [`CliConfig::load`], reading variables from `env` instead of the
    /// process environment when given.
    ///
    /// # Errors
    ///
    /// Same as [`CliConfig::load`].
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsmith_workflow::NodeKind;
    use std::io::Write;

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    #[test]
    fn empty_sources_give_defaults() {
        let config = CliConfig::load_with_env(None, no_env()).expect("load");
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn file_overrides_catalog() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            r#"
[catalog]
default_output = "output"

[catalog.kinds.webhook]
required_params = ["url", "method"]
"#
        )
        .expect("write");

        let config = CliConfig::load_with_env(Some(file.path()), no_env()).expect("load");
        assert_eq!(config.catalog.default_output.as_deref(), Some("output"));
        let webhook = &config.catalog.kinds[&NodeKind::Webhook];
        assert_eq!(
            webhook.required_params.as_deref(),
            Some(&["url".to_string(), "method".to_string()][..])
        );
    }

    #[test]
    fn environment_wins_over_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "[catalog]\ndefault_input = \"from-file\"").expect("write");

        let mut env = config::Map::new();
        env.insert(
            "FLOWSMITH__CATALOG__DEFAULT_INPUT".to_string(),
            "from-env".to_string(),
        );
        let config = CliConfig::load_with_env(Some(file.path()), Some(env)).expect("load");
        assert_eq!(config.catalog.default_input.as_deref(), Some("from-env"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        assert!(CliConfig::load_with_env(Some(&path), no_env()).is_err());
    }
}
