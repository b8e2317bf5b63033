//! In-memory model of an openssl.cnf file.
//!
//! A [`Document`] holds three scopes: sectionless global options, ordered
//! named sections, and the `DEFAULT` fallback layer. Values are stored raw;
//! `$` references are only expanded when read through [`Document::get`].

pub mod accessors;
pub mod parser;
pub mod resolver;
pub mod template;
pub mod writer;

use indexmap::IndexMap;

pub use resolver::{Environment, ProcessEnvironment};
pub use template::PolicyMatch;

/// Reserved name of the fallback section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// An ordered option-name to raw-value mapping.
pub type Options = IndexMap<String, String>;

/// A named, ordered group of options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    options: Options,
}

impl Section {
    /// Creates an empty section. The name is stored trimmed.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            options: Options::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn get(&self, option: &str) -> Option<&str> {
        self.options.get(option).map(String::as_str)
    }

    /// Sets an option, keeping its position when it already exists.
    pub fn set(&mut self, option: &str, value: &str) {
        self.options.insert(option.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// The root aggregate of an openssl.cnf file.
///
/// # Example
/// ```
/// use pkitool::config::Document;
///
/// let mut doc = Document::new();
/// doc.add_section("CA_default");
/// doc.set("CA_default", "dir", "/srv/ca");
/// doc.set("CA_default", "certs", "$dir/certs");
///
/// assert_eq!(doc.get("CA_default", "certs", true).unwrap(), "/srv/ca/certs");
/// assert_eq!(doc.get("CA_default", "certs", false).unwrap(), "$dir/certs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    globals: Options,
    sections: IndexMap<String, Section>,
    defaults: Section,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            globals: Options::new(),
            sections: IndexMap::new(),
            defaults: Section::new(DEFAULT_SECTION),
        }
    }

    /// Options declared before any section header.
    pub fn globals(&self) -> &Options {
        &self.globals
    }

    /// The `DEFAULT` fallback layer.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Names of the ordinary sections, in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub(crate) fn section_values(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name.trim())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name.trim())
    }

    /// Whether `option` is set directly in `section`, ignoring the defaults.
    ///
    /// An empty `section` addresses the globals.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.scope(section)
            .is_some_and(|options| options.contains_key(option))
    }

    /// Options of a section, the globals (`""`) or the defaults (`DEFAULT`).
    pub fn options(&self, section: &str) -> Option<&Options> {
        self.scope(section)
    }

    /// Number of options across all scopes.
    pub fn len(&self) -> usize {
        self.globals.len()
            + self.defaults.options.len()
            + self.sections.values().map(|s| s.options.len()).sum::<usize>()
    }

    /// Whether the document has no options and no sections.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.sections.is_empty()
    }

    /// Adds an empty section unless one with the same trimmed name exists.
    ///
    /// An empty name already addresses the globals and adds nothing.
    pub fn add_section(&mut self, name: &str) {
        if !name.trim().is_empty() {
            self.section_entry(name);
        }
    }

    /// Sets an option value.
    ///
    /// An empty `section` targets the globals and `DEFAULT` targets the
    /// fallback layer. Any other section is created if it does not exist
    /// yet, so `set` never fails. Re-setting an option keeps its position.
    ///
    /// Values are stored as given, but the file format has no escaping.
    /// A value containing `#`, an empty inner line, or an inner line
    /// starting with `#` is cut short when the written text is parsed again.
    pub fn set(&mut self, section: &str, option: &str, value: &str) {
        let section = section.trim();
        if section.is_empty() {
            self.globals.insert(option.to_string(), value.to_string());
        } else {
            self.section_entry(section).set(option, value);
        }
    }

    /// Removes an option, returning whether it was present.
    ///
    /// The remaining options keep their relative order.
    pub fn remove_option(&mut self, section: &str, option: &str) -> bool {
        let section = section.trim();
        let options = if section.is_empty() {
            Some(&mut self.globals)
        } else if section == DEFAULT_SECTION {
            Some(&mut self.defaults.options)
        } else {
            self.sections.get_mut(section).map(|s| &mut s.options)
        };
        options.is_some_and(|options| options.shift_remove(option).is_some())
    }

    /// Returns the section to write into, creating it when missing.
    pub(crate) fn section_entry(&mut self, name: &str) -> &mut Section {
        let name = name.trim();
        if name == DEFAULT_SECTION {
            return &mut self.defaults;
        }
        self.sections
            .entry(name.to_string())
            .or_insert_with(|| Section::new(name))
    }

    fn scope(&self, section: &str) -> Option<&Options> {
        let section = section.trim();
        if section.is_empty() {
            Some(&self.globals)
        } else if let Some(found) = self.sections.get(section) {
            Some(&found.options)
        } else if section == DEFAULT_SECTION {
            Some(&self.defaults.options)
        } else {
            None
        }
    }

    pub(crate) fn globals_mut(&mut self) -> &mut Options {
        &mut self.globals
    }
}
