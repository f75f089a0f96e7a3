//! Configuração do pxreview carregada a partir de `pxreview.toml`.
//!
//! A struct [`ReviewConfig`] contém o endereço do backend e as credenciais.
//! Valores não presentes no arquivo usam defaults. As variáveis de ambiente
//! `PXREVIEW_ACCESS_TOKEN` e `PXREVIEW_PROJECT_KEY` têm precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::ReviewError;

pub const DEFAULT_CONFIG_FILE: &str = "pxreview.toml";
const ACCESS_TOKEN_ENV: &str = "PXREVIEW_ACCESS_TOKEN";
const PROJECT_KEY_ENV: &str = "PXREVIEW_PROJECT_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// URL base da API de commerce, sem o segmento do projeto.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub project_key: String,

    /// Container de custom objects com as descrições pendentes.
    #[serde(default = "default_container")]
    pub container: String,

    /// Locale em que as descrições aceitas são gravadas.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Token bearer da API.
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.europe-west1.gcp.commercetools.com".to_string()
}

fn default_container() -> String {
    "temporaryDescriptions".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            project_key: String::new(),
            container: default_container(),
            locale: default_locale(),
            access_token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ReviewConfig {
    /// Carrega a configuração de `path`, ou de `pxreview.toml` no diretório atual.
    /// Usa valores padrão se o arquivo padrão não existir; um caminho explícito
    /// inexistente é erro.
    pub fn load(path: Option<&Path>) -> Result<Self, ReviewError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ReviewError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<ReviewConfig>(&contents)?)
    }

    /// Variáveis de ambiente têm precedência sobre o arquivo para credenciais e projeto.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.access_token = token;
        }
        if let Some(project) = lookup(PROJECT_KEY_ENV).filter(|v| !v.is_empty()) {
            self.project_key = project;
        }
    }

    /// Verifica os campos sem os quais não há conexão com o backend.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.project_key.trim().is_empty() {
            return Err(ReviewError::Config(format!(
                "project_key is not set (use {DEFAULT_CONFIG_FILE} or {PROJECT_KEY_ENV})"
            )));
        }
        if self.access_token.trim().is_empty() {
            return Err(ReviewError::Config(format!(
                "access_token is not set (use {DEFAULT_CONFIG_FILE} or {ACCESS_TOKEN_ENV})"
            )));
        }
        if self.container.trim().is_empty() {
            return Err(ReviewError::Config("container must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = ReviewConfig::default();
        assert_eq!(config.container, "temporaryDescriptions");
        assert_eq!(config.locale, "en-US");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.project_key.is_empty());
        assert!(config.access_token.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            project_key = "pixel-shop"
            locale = "de-DE"
        "#;
        let config: ReviewConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_key, "pixel-shop");
        assert_eq!(config.locale, "de-DE");
        assert_eq!(config.container, "temporaryDescriptions");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            api_url = "http://localhost:9000"
            project_key = "demo"
            access_token = "from-file"
            "#
        )
        .unwrap();

        let mut config = ReviewConfig::from_file(file.path()).unwrap();
        config.apply_overrides(|_| None);
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.project_key, "demo");
        assert_eq!(config.access_token, "from-file");
    }

    #[test]
    fn load_fails_on_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ReviewConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ReviewError::Io(_)));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_key = [").unwrap();
        let err = ReviewConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ReviewError::Toml(_)));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = ReviewConfig {
            access_token: "from-file".into(),
            project_key: "file-project".into(),
            ..Default::default()
        };
        config.apply_overrides(|name| match name {
            ACCESS_TOKEN_ENV => Some("from-env".into()),
            PROJECT_KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.access_token, "from-env");
        // Variáveis vazias são ignoradas.
        assert_eq!(config.project_key, "file-project");
    }

    #[test]
    fn validate_requires_project_and_token() {
        let mut config = ReviewConfig::default();
        assert!(matches!(config.validate(), Err(ReviewError::Config(_))));

        config.project_key = "demo".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token"));

        config.access_token = "tok".into();
        assert!(config.validate().is_ok());
    }
}
