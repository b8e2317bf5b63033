use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::callbacks::{Callback, CallbackName, CallbackRegistry};
use crate::config::Document;
use crate::config::template::REQ_DN_SECTION;
use crate::engine::{KeyEngine, KeySpec, select_engine};
use crate::error::{ConfigError, PkiToolError, Result};

/// File name of the configuration written into the CA root.
pub const CONFIG_FILE_NAME: &str = "openssl.cnf";

/// Initial content of the serial file.
pub const INITIAL_SERIAL: &str = "01\n";

/// One certificate authority described by a section of a [`Document`].
///
/// # Example
/// ```no_run
/// use pkitool::ca::CertificateAuthority;
/// use pkitool::callbacks::Callback;
/// use pkitool::config::Document;
/// use pkitool::engine::KeySpec;
///
/// # fn main() -> Result<(), pkitool::error::PkiToolError> {
/// let mut config = Document::default_config("Demo_CA", "/tmp/demo-ca");
/// config.set("Demo_CA", "dir", "/srv/demo-ca");
///
/// let mut ca = CertificateAuthority::new(config, None)?;
/// ca.register_callback("get_ca_key_password", Callback::password(|| "secret".into()))?;
/// ca.create_directory_structure()?;
/// let written = ca.init(KeySpec::EcdsaP256)?;
/// println!("configuration written to {}", written.display());
/// # Ok(())
/// # }
/// ```
pub struct CertificateAuthority {
    config: Document,
    ca: String,
    engine: Box<dyn KeyEngine>,
    callbacks: CallbackRegistry,
}

impl std::fmt::Debug for CertificateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("ca", &self.ca)
            .field("engine", &self.engine.name())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl CertificateAuthority {
    /// Creates a CA over `config`. Without a name, the CA named by
    /// `default_ca` in `[ ca ]` is used.
    pub fn new(config: Document, ca: Option<&str>) -> Result<Self> {
        let ca = match ca {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => config.default_ca()?,
        };
        if !config.has_section(&ca) {
            return Err(ConfigError::NoSection(ca).into());
        }
        let engine = select_engine();
        debug!(%ca, engine = engine.name(), "created certificate authority");
        Ok(Self {
            config,
            ca,
            engine,
            callbacks: CallbackRegistry::new(),
        })
    }

    /// Replaces the key engine chosen at construction.
    pub fn with_engine(mut self, engine: Box<dyn KeyEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn name(&self) -> &str {
        &self.ca
    }

    pub fn config(&self) -> &Document {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Document {
        &mut self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Registers a callback from the allow-list in [`CallbackName`].
    pub fn register_callback(&mut self, name: &str, callback: Callback) -> Result<()> {
        self.callbacks.register(name, callback)
    }

    pub fn unregister_callback(&mut self, name: &str) {
        self.callbacks.unregister(name);
    }

    /// Creates the directories and seed files OpenSSL expects.
    ///
    /// Existing directories are kept. The database and serial files are only
    /// created when missing, so an existing CA keeps its state.
    pub fn create_directory_structure(&self) -> Result<()> {
        let ca = Some(self.ca.as_str());
        let config = &self.config;

        create_dir(&config.ca_dir(ca)?)?;
        create_dir(&config.ca_certs(ca)?)?;
        create_dir(&config.ca_crl_dir(ca)?)?;

        let private = config.ca_private_dir(ca)?;
        create_dir(&private)?;
        restrict_to_owner(&private)?;

        let database = config.ca_database(ca)?;
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&database)
            .map_err(|e| PkiToolError::io(&database, e))?;

        create_dir(&config.ca_new_certs_dir(ca)?)?;

        let serial = config.ca_serial(ca)?;
        if !serial.exists() {
            fs::write(&serial, INITIAL_SERIAL).map_err(|e| PkiToolError::io(&serial, e))?;
        }

        info!(ca = %self.ca, dir = %config.ca_dir(ca)?.display(), "created directory structure");
        Ok(())
    }

    /// Creates the CA key pair at the resolved `private_key` path.
    ///
    /// The key is encrypted when a `get_ca_key_password` callback returns a
    /// non-empty password.
    pub fn create_ca_key(&self, spec: KeySpec) -> Result<PathBuf> {
        let path = self.config.ca_private_key(Some(&self.ca))?;
        let password = self.callbacks.password(CallbackName::CaKeyPassword);
        self.engine
            .create_private_key(&path, spec, password.as_deref())?;
        Ok(path)
    }

    /// Applies `get_req_distinguished_name` overrides, if registered, to the
    /// section named by `distinguished_name` in `[ req ]`.
    ///
    /// Without that option the stock `req_distinguished_name` section is
    /// used. Any other failure to resolve it is returned.
    pub fn apply_dn_overrides(&mut self) -> Result<()> {
        let Some(overrides) = self
            .callbacks
            .distinguished_name(CallbackName::ReqDistinguishedName)
        else {
            return Ok(());
        };
        let section = match self.config.get_raw("req", "distinguished_name") {
            Ok(_) => self.config.get("req", "distinguished_name", true)?,
            Err(ConfigError::NoSection(_) | ConfigError::NoOption { .. }) => {
                REQ_DN_SECTION.to_string()
            }
            Err(err) => return Err(err.into()),
        };
        for (option, value) in &overrides {
            self.config.set(&section, option, value);
        }
        debug!(%section, count = overrides.len(), "applied distinguished name overrides");
        Ok(())
    }

    /// Writes the configuration to `openssl.cnf` in the CA root.
    pub fn write_config(&mut self) -> Result<PathBuf> {
        self.apply_dn_overrides()?;
        let path = self.config.ca_dir(Some(&self.ca))?.join(CONFIG_FILE_NAME);
        self.config.write_file(&path)?;
        info!(path = %path.display(), "wrote configuration");
        Ok(path)
    }

    /// Writes the configuration, then creates the CA key.
    ///
    /// Returns the path of the written configuration.
    pub fn init(&mut self, spec: KeySpec) -> Result<PathBuf> {
        let path = self.write_config()?;
        self.create_ca_key(spec)?;
        Ok(path)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| PkiToolError::io(path, e))?;
    debug!(path = %path.display(), "directory ready");
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .map_err(|e| PkiToolError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}
