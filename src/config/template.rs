//! Builders for a stock openssl.cnf, as used when bootstrapping a new CA.

use std::fmt;
use std::str::FromStr;

use super::Document;
use crate::error::PkiToolError;

/// CA section used when none is named.
pub const DEFAULT_CA_NAME: &str = "Fedora_PKI_CA";

/// Root directory used when none is given.
pub const DEFAULT_CA_DIR: &str = "/tmp/pki/tls/CA";

/// Section holding `default_ca`.
pub const CA_SECTION: &str = "ca";

/// Name of the distinguished name section referenced from `[ req ]`.
pub const REQ_DN_SECTION: &str = "req_distinguished_name";

/// How a subject field is checked against a CA policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMatch {
    /// The field may be absent.
    Optional,
    /// The field must equal the CA certificate's field.
    Match,
    /// The field must be present.
    Supplied,
}

impl PolicyMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyMatch::Optional => "optional",
            PolicyMatch::Match => "match",
            PolicyMatch::Supplied => "supplied",
        }
    }
}

impl fmt::Display for PolicyMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyMatch {
    type Err = PkiToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optional" => Ok(PolicyMatch::Optional),
            "match" => Ok(PolicyMatch::Match),
            "supplied" => Ok(PolicyMatch::Supplied),
            other => Err(PkiToolError::InvalidInput(format!(
                "unknown policy match {other:?}"
            ))),
        }
    }
}

const POLICY_FIELDS: [(&str, PolicyMatch); 7] = [
    ("countryName", PolicyMatch::Optional),
    ("stateOrProvinceName", PolicyMatch::Optional),
    ("localityName", PolicyMatch::Optional),
    ("organizationName", PolicyMatch::Optional),
    ("organizationalUnitName", PolicyMatch::Optional),
    ("commonName", PolicyMatch::Supplied),
    ("emailAddress", PolicyMatch::Optional),
];

impl Document {
    /// Builds the stock configuration for a single CA.
    ///
    /// # Example
    /// ```
    /// use pkitool::config::Document;
    ///
    /// let doc = Document::default_config("Demo_CA", "/srv/ca");
    /// assert_eq!(doc.default_ca().unwrap(), "Demo_CA");
    /// assert_eq!(
    ///     doc.ca_certs(None).unwrap(),
    ///     std::path::PathBuf::from("/srv/ca/certs")
    /// );
    /// ```
    pub fn default_config(ca_name: &str, ca_dir: &str) -> Self {
        let mut doc = Document::new();
        doc.create_default_config(ca_name, ca_dir);
        doc
    }

    /// Populates the globals and the `ca`, CA, policy and request sections.
    pub fn create_default_config(&mut self, ca_name: &str, ca_dir: &str) {
        self.set("", "HOME", ".");
        self.set("", "RANDFILE", "$ENV::HOME/.rnd");
        self.set("", "oid_section", "new_oids");
        self.add_section("new_oids");

        self.add_section(CA_SECTION);
        self.set(CA_SECTION, "default_ca", ca_name);

        self.create_ca(ca_name, ca_dir);
        self.create_policy("policy_anything", &[]);
        self.create_req();
        self.create_req_dn(REQ_DN_SECTION);
    }

    /// Creates the section describing one CA rooted at `ca_dir`.
    pub fn create_ca(&mut self, ca_name: &str, ca_dir: &str) {
        self.add_section(ca_name);
        self.set(ca_name, "dir", ca_dir);

        let options = [
            ("certs", "$dir/certs".to_string()),
            ("crl_dir", "$dir/crl".to_string()),
            ("database", "$dir/index.txt".to_string()),
            ("new_certs_dir", "$dir/newcerts".to_string()),
            ("certificate", format!("$dir/{ca_name}.crt")),
            ("serial", "$dir/serial".to_string()),
            ("crlnumber", "$dir/crlnumber".to_string()),
            ("crl", format!("$dir/{ca_name}.crl")),
            ("private_key", format!("$dir/private/{ca_name}.key")),
            ("RANDFILE", "$dir/private/.rand".to_string()),
            ("x509_extensions", "usr_cert".to_string()),
            ("name_opt", "ca_default".to_string()),
            ("cert_opt", "ca_default".to_string()),
            ("default_days", "365".to_string()),
            ("default_crl_days", "30".to_string()),
            ("default_md", "sha256".to_string()),
            ("preserve", "no".to_string()),
            ("policy", "policy_anything".to_string()),
        ];
        for (option, value) in &options {
            self.set(ca_name, option, value);
        }
    }

    /// Creates a match policy.
    ///
    /// Every field is optional except `commonName`, which must be supplied.
    /// Overrides for fields outside that set are ignored.
    pub fn create_policy(&mut self, policy_name: &str, overrides: &[(&str, PolicyMatch)]) {
        self.add_section(policy_name);
        for (field, default) in POLICY_FIELDS {
            let rule = overrides
                .iter()
                .rev()
                .find(|(name, _)| *name == field)
                .map_or(default, |(_, rule)| *rule);
            self.set(policy_name, field, rule.as_str());
        }
    }

    /// Creates the `[ req ]` section.
    pub fn create_req(&mut self) {
        let section = "req";
        self.add_section(section);
        self.set(section, "default_bits", "2048");
        self.set(section, "default_md", "sha256");
        self.set(section, "distinguished_name", REQ_DN_SECTION);
        self.set(section, "attributes", "req_attributes");
        self.set(section, "x509_extensions", "v3_ca");
    }

    /// Creates the distinguished name defaults offered when requesting.
    pub fn create_req_dn(&mut self, dn: &str) {
        self.add_section(dn);
        self.set(dn, "countryName_default", "US");
        self.set(dn, "stateOrProvinceName_default", "North Carolina");
        self.set(dn, "localityName_default", "Raleigh");
        self.set(dn, "0.organizationName_default", "Example, Inc.");
    }
}
