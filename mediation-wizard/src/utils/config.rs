// Runtime configuration
// Layered: built-in defaults -> optional TOML file -> MEDIATION_WIZARD_* environment variables.

use crate::error::WizardResult;
use crate::i18n::Language;
use crate::utils::path_resolver;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "MEDIATION_WIZARD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Base URL of the mediation backend, e.g. `https://mediation.example.org`.
    pub backend_base_url: String,
    /// Organization slug of the organization app context (both slugs are needed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_slug: Option<String>,
    /// Identifier of the signed-in complainant, sent as `complainant`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    /// Terminal width (columns) at or below which the tab strip is laid out vertically.
    pub vertical_breakpoint: u16,
    /// Interface language, `en` or `fr`.
    pub language: Language,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_string(),
            organization_slug: None,
            application_slug: None,
            user_id: None,
            session_dir: None,
            log_dir: None,
            request_timeout_secs: 30,
            vertical_breakpoint: 85,
            language: Language::default(),
        }
    }
}

impl WizardConfig {
    /// Load the configuration. An explicit `file` must exist; the default config file is optional.
    pub fn load(file: Option<&Path>) -> WizardResult<Self> {
        let (path, required) = match file {
            Some(p) => (p.to_path_buf(), true),
            None => (path_resolver::resolve_config_file(), false),
        };
        let settings = Config::builder()
            .add_source(file_source(&path, required))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Load from a single TOML file, without the environment layer.
    pub fn from_file(path: &Path) -> WizardResult<Self> {
        let settings = Config::builder()
            .add_source(file_source(path, true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Organization and application slugs, when both are configured and non-blank.
    pub fn organization_context(&self) -> Option<(&str, &str)> {
        let org = self.organization_slug.as_deref().map(str::trim)?;
        let app = self.application_slug.as_deref().map(str::trim)?;
        if org.is_empty() || app.is_empty() {
            return None;
        }
        Some((org, app))
    }
}

fn file_source(path: &Path, required: bool) -> impl config::Source + Send + Sync + 'static {
    File::from(path).format(FileFormat::Toml).required(required)
}

/// Write a default config file to `path` (parent folders are created).
pub fn write_default(path: &Path) -> anyhow::Result<()> {
    let body = toml::to_string_pretty(&WizardConfig::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize default config: {}", e))?;
    let content = format!(
        "# Mediation wizard configuration\n\
         # Every key can be overridden with {}_<KEY> environment variables.\n\
         # Set organization_slug and application_slug to file requests against an organization app.\n\n{}",
        ENV_PREFIX, body
    );
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_written_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("conf").join("mediation-wizard.toml");
        write_default(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Mediation wizard configuration"));

        let cfg = WizardConfig::from_file(&path).unwrap();
        assert_eq!(cfg, WizardConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wizard.toml");
        std::fs::write(
            &path,
            "backend_base_url = \"https://api.koena.net\"\n\
             organization_slug = \"koena\"\n\
             application_slug = \"koena-connect\"\n\
             request_timeout_secs = 5\n",
        )
        .unwrap();

        let cfg = WizardConfig::from_file(&path).unwrap();
        assert_eq!(cfg.backend_base_url, "https://api.koena.net");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.vertical_breakpoint, 85);
        assert_eq!(cfg.language, Language::Fr);
        assert_eq!(cfg.organization_context(), Some(("koena", "koena-connect")));
    }

    #[test]
    fn language_is_read_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wizard.toml");
        std::fs::write(&path, "language = \"en\"\n").unwrap();
        assert_eq!(WizardConfig::from_file(&path).unwrap().language, Language::En);

        std::fs::write(&path, "language = \"de\"\n").unwrap();
        assert!(WizardConfig::from_file(&path).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(WizardConfig::from_file(&tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn organization_context_needs_both_slugs() {
        let mut cfg = WizardConfig {
            organization_slug: Some("koena".to_string()),
            ..WizardConfig::default()
        };
        assert_eq!(cfg.organization_context(), None);
        cfg.application_slug = Some("  ".to_string());
        assert_eq!(cfg.organization_context(), None);
    }
}
