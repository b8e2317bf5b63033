use std::fmt;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::{Document, Section};
use crate::error::PkiToolError;

/// Renders the document as openssl.cnf text.
///
/// OpenSSL reads the file top to bottom and cannot see a variable defined
/// further down, so within every section plain values are written before
/// `$` values. Each group keeps its relative order.
///
/// Values are written verbatim, with inner lines indented by a tab. Nothing
/// is escaped, so a `#` inside a value starts a comment on re-read and an
/// empty inner line is dropped. See [`Document::set`].
///
/// # Example
/// ```
/// use pkitool::config::Document;
///
/// let mut doc = Document::new();
/// doc.set("CA_default", "certs", "$dir/certs");
/// doc.set("CA_default", "dir", "/srv/ca");
///
/// assert_eq!(
///     doc.to_string(),
///     "[ CA_default ]\ndir = /srv/ca\ncerts = $dir/certs\n\n"
/// );
/// ```
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.globals.is_empty() {
            for (key, value) in &self.globals {
                write_option(f, key, value)?;
            }
            writeln!(f)?;
        }
        if !self.defaults.is_empty() {
            write_section(f, &self.defaults)?;
        }
        for section in self.section_values() {
            write_section(f, section)?;
        }
        Ok(())
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, section: &Section) -> fmt::Result {
    writeln!(f, "[ {} ]", section.name())?;
    let (deferred, plain): (Vec<_>, Vec<_>) = section
        .options()
        .iter()
        .partition(|(_, value)| is_deferred(value));
    for (key, value) in plain.into_iter().chain(deferred) {
        write_option(f, key, value)?;
    }
    writeln!(f)
}

fn write_option(f: &mut fmt::Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    writeln!(f, "{} = {}", key, value.replace('\n', "\n\t"))
}

/// Whether a raw value depends on another option or the environment.
pub fn is_deferred(value: &str) -> bool {
    value.starts_with('$')
}

impl Document {
    /// Writes the rendered document to any writer.
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        out.write_all(self.to_string().as_bytes())
    }

    /// Writes the rendered document to `path`, replacing any existing file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> crate::error::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).map_err(|e| PkiToolError::io(path, e))?;
        debug!(path = %path.display(), "wrote configuration");
        Ok(())
    }
}
