#![allow(dead_code)]

use std::collections::HashMap;

use pkitool::config::Document;

/// A small openssl.cnf in the shape of the stock one shipped with OpenSSL.
pub const SAMPLE_CNF: &str = r#"#
# OpenSSL example configuration file.
#

HOME			= .
RANDFILE		= $ENV::HOME/.rnd
oid_section		= new_oids

[ new_oids ]

####################################################################
[ ca ]
default_ca	= CA_default		# The default ca section

####################################################################
[ CA_default ]

certs		= $dir/certs		# Where the issued certs are kept
dir		= /etc/pki/CA		# Where everything is kept
crl_dir		= $dir/crl		# Where the issued crl are kept
database	= $dir/index.txt	# database index file.
new_certs_dir	= $dir/newcerts		# default place for new certs.
certificate	= $dir/cacert.pem 	# The CA certificate
serial		= $dir/serial 		# The current serial number
private_key	= $dir/private/cakey.pem# The private key
x509_extensions	= usr_cert		# The extentions to add to the cert
name_opt 	= ca_default		# Subject Name options
default_days	= 365			# how long to certify for
policy		= policy_match

[ policy_match ]
countryName		= match
commonName		= supplied
emailAddress		= optional
"#;

pub fn sample() -> Document {
    Document::parse(SAMPLE_CNF).expect("sample configuration parses")
}

pub fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
