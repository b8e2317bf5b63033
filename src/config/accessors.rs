//! Resolved paths of a CA section.
//!
//! Every accessor takes the CA section name; `None` selects the CA named by
//! `default_ca` in `[ ca ]`.

use std::path::PathBuf;

use super::Document;
use super::template::CA_SECTION;
use crate::error::ConfigError;

impl Document {
    /// Name of the CA section used when none is given.
    pub fn default_ca(&self) -> Result<String, ConfigError> {
        self.get(CA_SECTION, "default_ca", true)
    }

    fn ca_section(&self, ca: Option<&str>) -> Result<String, ConfigError> {
        match ca {
            Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
            _ => self.default_ca(),
        }
    }

    fn ca_path(&self, ca: Option<&str>, option: &str) -> Result<PathBuf, ConfigError> {
        let section = self.ca_section(ca)?;
        self.get(&section, option, true).map(PathBuf::from)
    }

    /// Topmost directory of the CA (`dir`).
    pub fn ca_dir(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "dir")
    }

    /// Where issued certificates are kept (`certs`).
    pub fn ca_certs(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "certs")
    }

    /// Where issued CRLs are kept (`crl_dir`).
    pub fn ca_crl_dir(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "crl_dir")
    }

    /// Index file of issued certificates (`database`).
    pub fn ca_database(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "database")
    }

    /// Default place for new certificates (`new_certs_dir`).
    pub fn ca_new_certs_dir(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "new_certs_dir")
    }

    /// The CA certificate (`certificate`).
    pub fn ca_certificate(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "certificate")
    }

    /// Current serial number file (`serial`).
    pub fn ca_serial(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "serial")
    }

    pub fn ca_crlnumber(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "crlnumber")
    }

    pub fn ca_crl(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "crl")
    }

    /// The CA private key (`private_key`).
    pub fn ca_private_key(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        self.ca_path(ca, "private_key")
    }

    /// Directory holding the CA private key.
    pub fn ca_private_dir(&self, ca: Option<&str>) -> Result<PathBuf, ConfigError> {
        let key = self.ca_private_key(ca)?;
        Ok(key.parent().map(PathBuf::from).unwrap_or_default())
    }
}
