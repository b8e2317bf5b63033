use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::Document;
use crate::error::{BadLine, ConfigError, FormatError, PkiToolError};

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#").expect("comment pattern is valid"));

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(?P<header>[^\]]+)\]").expect("header pattern is valid"));

// A key may not start with whitespace or a separator; the value stops at a
// trailing `#` comment.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<option>[^:=\s][^:=]*)[:=](?P<value>[^#]*)")
        .expect("assignment pattern is valid")
});

/// Where assignments currently land.
enum Scope {
    Global,
    Section(String),
    /// After a header with no usable name. Its options have nowhere to go.
    Orphaned,
}

/// Parses openssl.cnf text into a [`Document`].
///
/// Malformed lines do not stop the scan. They are collected and reported
/// together in a [`ConfigError::Format`], which also carries the document
/// built from every well-formed line. A header with an empty name such as
/// `[ ]` is malformed, and so is every assignment below it up to the next
/// valid header.
///
/// # Example
/// ```
/// use pkitool::config::parser::parse;
///
/// let doc = parse("HOME = .\n[ ca ]\ndefault_ca = CA_default # the default\n").unwrap();
/// assert_eq!(doc.get("", "HOME", false).unwrap(), ".");
/// assert_eq!(doc.get("ca", "default_ca", false).unwrap(), "CA_default");
/// ```
pub fn parse(text: &str) -> Result<Document, ConfigError> {
    let mut doc = Document::new();
    let mut scope = Scope::Global;
    let mut current_option: Option<String> = None;
    let mut bad_lines = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() || line.starts_with(['#', ';']) || COMMENT.is_match(line) {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            if let Some(option) = &current_option {
                append_continuation(&mut doc, &scope, option, line.trim());
                continue;
            }
        }

        if let Some(caps) = SECTION_HEADER.captures(line) {
            let name = caps["header"].trim();
            current_option = None;
            if name.is_empty() {
                scope = Scope::Orphaned;
            } else {
                doc.add_section(name);
                scope = Scope::Section(name.to_string());
                continue;
            }
        } else if let Some(caps) = ASSIGNMENT.captures(line) {
            let option = caps["option"].trim();
            let mut value = caps["value"].trim();
            if value == "\"\"" {
                value = "";
            }
            let target = match &scope {
                Scope::Global => Some(""),
                Scope::Section(name) => Some(name.as_str()),
                Scope::Orphaned => None,
            };
            if let Some(target) = target {
                doc.set(target, option, value);
                current_option = Some(option.to_string());
                continue;
            }
        }

        warn!(line_number, line, "malformed configuration line");
        bad_lines.push(BadLine {
            line_number,
            raw: line.to_string(),
        });
    }

    debug!(
        globals = doc.globals().len(),
        sections = doc.sections().count(),
        errors = bad_lines.len(),
        "parsed configuration"
    );

    if bad_lines.is_empty() {
        Ok(doc)
    } else {
        Err(ConfigError::Format(FormatError {
            lines: bad_lines,
            document: Box::new(doc),
        }))
    }
}

fn append_continuation(doc: &mut Document, scope: &Scope, option: &str, text: &str) {
    let options = match scope {
        Scope::Global => doc.globals_mut(),
        Scope::Section(name) => &mut doc.section_entry(name).options,
        Scope::Orphaned => return,
    };
    if let Some(value) = options.get_mut(option) {
        value.push('\n');
        value.push_str(text);
    }
}

impl FromStr for Document {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Document {
    /// Parses openssl.cnf text. See [`parse`].
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        parse(text)
    }

    /// Reads and parses an openssl.cnf file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PkiToolError::io(path, e))?;
        debug!(path = %path.display(), "reading configuration");
        Ok(parse(&text)?)
    }
}
