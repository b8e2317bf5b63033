//! # pkitool - OpenSSL Certificate Authority Bootstrapping
//!
//! pkitool prepares everything the `openssl ca` command expects before it can
//! issue certificates: the directory layout, the seed files, the CA private
//! key and, above all, the `openssl.cnf` configuration file.
//!
//! The configuration format is OpenSSL's own loose, line-oriented syntax:
//! global assignments before any section, `[ section ]` headers with free
//! whitespace, indented continuation lines, `#`/`;` comments and
//! `$name/suffix` or `$ENV::NAME/suffix` variable references. pkitool reads,
//! resolves and writes it without losing information.
//!
//! ## Quick Start
//!
//! ### Reading and resolving a configuration
//!
//! ```rust
//! use pkitool::config::Document;
//!
//! # fn main() -> Result<(), pkitool::error::ConfigError> {
//! let doc = Document::parse(
//!     "[ CA_default ]\n\
//!      dir   = /etc/pki/CA      # where everything is kept\n\
//!      certs = $dir/certs\n",
//! )?;
//!
//! assert_eq!(doc.get("CA_default", "certs", true)?, "/etc/pki/CA/certs");
//! # Ok(())
//! # }
//! ```
//!
//! ### Bootstrapping a new CA
//!
//! ```rust,no_run
//! use pkitool::{ca::CertificateAuthority, config::Document, engine::KeySpec};
//!
//! # fn main() -> Result<(), pkitool::error::PkiToolError> {
//! let config = Document::default_config("Demo_CA", "/srv/demo-ca");
//! let mut ca = CertificateAuthority::new(config, None)?;
//! ca.create_directory_structure()?;
//! ca.init(KeySpec::Rsa { bits: 2048 })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems are reported as [`error::ConfigError`], everything
//! else as [`error::PkiToolError`]:
//!
//! ```rust
//! use pkitool::{config::Document, error::ConfigError};
//!
//! match Document::parse("[ ca ]\nthis line is not an assignment\n") {
//!     Ok(_) => unreachable!(),
//!     Err(ConfigError::Format(err)) => assert_eq!(err.lines[0].line_number, 2),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: the document model, parser, resolver and writer
//! - [`ca`]: directory bootstrap and CA initialization
//! - [`engine`]: private key generation
//! - [`callbacks`]: named extension points such as key passwords
//! - [`settings`]: runtime settings of the command-line tool
//! - [`error`]: error types

pub mod ca;
pub mod callbacks;
pub mod config;
pub mod engine;
pub mod error;
pub mod settings;
