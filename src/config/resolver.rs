//! Read-time expansion of `$name/suffix` and `$ENV::NAME/suffix` values.
//!
//! Expansion is a single hop: the referenced option is read raw, so a value
//! that points at another `$` value yields that value unexpanded. Values
//! with more than one reference (`$a/$b`) only have the leading one
//! replaced. Nothing is cached; every read sees the document as it is now.

use std::collections::HashMap;
use std::hash::BuildHasher;

use super::{DEFAULT_SECTION, Document};
use crate::error::ConfigError;

const ENV_PREFIX: &str = "ENV::";

/// Source of environment variables for `$ENV::` references.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Document {
    /// Looks up an option, expanding a leading `$` reference when `resolve`
    /// is set. `$ENV::` references read the process environment.
    ///
    /// `section` may be `""` for the globals or `DEFAULT` for the fallback
    /// layer. Options missing from a section are looked up in `DEFAULT`.
    pub fn get(&self, section: &str, option: &str, resolve: bool) -> Result<String, ConfigError> {
        self.get_with_env(section, option, resolve, &ProcessEnvironment)
    }

    /// Same as [`Document::get`] with an explicit environment.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use pkitool::config::Document;
    ///
    /// let mut doc = Document::new();
    /// doc.set("", "RANDFILE", "$ENV::HOME/.rnd");
    /// let env = HashMap::from([("HOME".to_string(), "/home/u".to_string())]);
    ///
    /// assert_eq!(doc.get_with_env("", "RANDFILE", true, &env).unwrap(), "/home/u/.rnd");
    /// ```
    pub fn get_with_env<E: Environment + ?Sized>(
        &self,
        section: &str,
        option: &str,
        resolve: bool,
        env: &E,
    ) -> Result<String, ConfigError> {
        let raw = self.get_raw(section, option)?;
        if resolve && raw.starts_with('$') {
            self.expand(section, raw, env)
        } else {
            Ok(raw.to_string())
        }
    }

    /// Looks up the stored value without expanding it.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<&str, ConfigError> {
        let section = section.trim();
        let no_option = || ConfigError::NoOption {
            section: section.to_string(),
            option: option.to_string(),
        };

        if section.is_empty() {
            return self.globals.get(option).map(String::as_str).ok_or_else(no_option);
        }
        if let Some(found) = self.sections.get(section) {
            return found
                .get(option)
                .or_else(|| self.defaults.get(option))
                .ok_or_else(no_option);
        }
        if section == DEFAULT_SECTION {
            return self.defaults.get(option).ok_or_else(no_option);
        }
        Err(ConfigError::NoSection(section.to_string()))
    }

    fn expand<E: Environment + ?Sized>(
        &self,
        section: &str,
        raw: &str,
        env: &E,
    ) -> Result<String, ConfigError> {
        let reference = &raw[1..];
        let (name, rest) = match reference.find('/') {
            Some(slash) => reference.split_at(slash),
            None => (reference, ""),
        };

        let head = match name.strip_prefix(ENV_PREFIX) {
            Some(var) => env
                .var(var)
                .ok_or_else(|| ConfigError::EnvironmentLookup(var.to_string()))?,
            None => self.get_raw(section, name)?.to_string(),
        };
        Ok(head + rest)
    }
}
