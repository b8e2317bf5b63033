use std::path::PathBuf;

use bon::Builder;
use tracing::warn;

use crate::config::Document;
use crate::config::template::{DEFAULT_CA_DIR, DEFAULT_CA_NAME};
use crate::engine::KeySpec;
use crate::error::{ConfigError, PkiToolError, Result};

/// Everything needed to bootstrap one CA.
///
/// # Fields
/// * `ca_name` - CA section to use. Defaults to `default_ca` of a template,
///   or [`DEFAULT_CA_NAME`] for the built-in configuration.
/// * `ca_dir` - Root directory, written into the CA section's `dir`.
/// * `template` - Existing openssl.cnf to start from instead of the built-in one.
/// * `lenient` - Keep the well-formed part of a template with malformed lines.
/// * `key` - Type and size of the CA key.
/// * `key_password_file` - File whose first line protects the CA key.
/// * `skip_key` - Only write the layout and configuration.
#[derive(Debug, Clone, Builder)]
pub struct Settings {
    pub ca_name: Option<String>,
    pub ca_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    #[builder(default)]
    pub lenient: bool,
    #[builder(default)]
    pub key: KeySpec,
    pub key_password_file: Option<PathBuf>,
    #[builder(default)]
    pub skip_key: bool,
}

impl Settings {
    /// Builds the configuration document these settings describe.
    ///
    /// A template is parsed first; the CA directory, when given, is then
    /// written into the selected CA section.
    pub fn load_document(&self) -> Result<Document> {
        let Some(template) = &self.template else {
            let ca_name = self.ca_name.as_deref().unwrap_or(DEFAULT_CA_NAME);
            let ca_dir = self
                .ca_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_CA_DIR.to_string());
            return Ok(Document::default_config(ca_name, &ca_dir));
        };

        let mut doc = match Document::from_file(template) {
            Ok(doc) => doc,
            Err(PkiToolError::Config(ConfigError::Format(err))) if self.lenient => {
                warn!(path = %template.display(), "{err}");
                err.into_document()
            }
            Err(err) => return Err(err),
        };
        if let Some(dir) = &self.ca_dir {
            let ca_name = self.ca_section(&doc)?;
            doc.set(&ca_name, "dir", &dir.to_string_lossy());
        }
        Ok(doc)
    }

    /// The CA section to operate on within `doc`.
    pub fn ca_section(&self, doc: &Document) -> Result<String> {
        match &self.ca_name {
            Some(name) => Ok(name.clone()),
            None => Ok(doc.default_ca()?),
        }
    }

    /// Reads the CA key password, if a password file was given.
    pub fn key_password(&self) -> Result<Option<String>> {
        let Some(path) = &self.key_password_file else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path).map_err(|e| PkiToolError::io(path, e))?;
        let password = contents.lines().next().unwrap_or_default().to_string();
        Ok(Some(password).filter(|p| !p.is_empty()))
    }
}
