//! Named extension points invoked while bootstrapping a CA.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::PkiToolError;

/// The fixed set of callbacks a [`CallbackRegistry`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackName {
    /// Password protecting the CA private key.
    CaKeyPassword,
    /// Password protecting an issued certificate's private key.
    CertKeyPassword,
    /// Overrides for the request distinguished name defaults.
    ReqDistinguishedName,
}

impl CallbackName {
    pub const ALL: [CallbackName; 3] = [
        CallbackName::CaKeyPassword,
        CallbackName::CertKeyPassword,
        CallbackName::ReqDistinguishedName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackName::CaKeyPassword => "get_ca_key_password",
            CallbackName::CertKeyPassword => "get_cert_key_password",
            CallbackName::ReqDistinguishedName => "get_req_distinguished_name",
        }
    }
}

impl fmt::Display for CallbackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallbackName {
    type Err = PkiToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallbackName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| PkiToolError::UnknownCallback(s.to_string()))
    }
}

/// Ordered distinguished name overrides, keyed by option name.
pub type DnOverrides = IndexMap<String, String>;

/// A registered callback.
pub enum Callback {
    /// Returns a password; an empty string means no password.
    Password(Box<dyn Fn() -> String>),
    DistinguishedName(Box<dyn Fn() -> DnOverrides>),
}

impl Callback {
    pub fn password(f: impl Fn() -> String + 'static) -> Self {
        Callback::Password(Box::new(f))
    }

    pub fn distinguished_name(f: impl Fn() -> DnOverrides + 'static) -> Self {
        Callback::DistinguishedName(Box::new(f))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Password(_) => f.write_str("Callback::Password"),
            Callback::DistinguishedName(_) => f.write_str("Callback::DistinguishedName"),
        }
    }
}

/// Holds at most one callback per [`CallbackName`].
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<CallbackName, Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback by name.
    ///
    /// Fails for names outside the allow-list. If the name already has a
    /// callback, the first registration is kept.
    ///
    /// # Example
    /// ```
    /// use pkitool::callbacks::{Callback, CallbackRegistry};
    ///
    /// let mut registry = CallbackRegistry::new();
    /// registry.register("get_ca_key_password", Callback::password(|| "secret".into())).unwrap();
    /// assert!(registry.register("get_coffee", Callback::password(String::new)).is_err());
    /// ```
    pub fn register(&mut self, name: &str, callback: Callback) -> Result<(), PkiToolError> {
        let name: CallbackName = name.parse()?;
        if self.callbacks.contains_key(&name) {
            debug!(%name, "callback already registered, keeping the first one");
            return Ok(());
        }
        self.callbacks.insert(name, callback);
        Ok(())
    }

    /// Removes a callback. Unknown or unregistered names are ignored.
    pub fn unregister(&mut self, name: &str) {
        if let Ok(name) = name.parse::<CallbackName>() {
            self.callbacks.remove(&name);
        }
    }

    pub fn is_registered(&self, name: CallbackName) -> bool {
        self.callbacks.contains_key(&name)
    }

    /// Invokes a password callback; `None` when absent or empty.
    pub fn password(&self, name: CallbackName) -> Option<String> {
        match self.callbacks.get(&name) {
            Some(Callback::Password(f)) => Some(f()).filter(|p| !p.is_empty()),
            _ => None,
        }
    }

    /// Invokes a distinguished name callback.
    pub fn distinguished_name(&self, name: CallbackName) -> Option<DnOverrides> {
        match self.callbacks.get(&name) {
            Some(Callback::DistinguishedName(f)) => Some(f()),
            _ => None,
        }
    }
}
