mod util;

use pkitool::config::{DEFAULT_SECTION, Document};
use pkitool::error::ConfigError;
use pretty_assertions::assert_eq;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[test]
fn parse_stock_layout() -> Result<()> {
    let doc = util::sample();

    assert_eq!(doc.globals().len(), 3);
    assert_eq!(doc.get("", "oid_section", true)?, "new_oids");
    assert_eq!(
        doc.sections().collect::<Vec<_>>(),
        vec!["new_oids", "ca", "CA_default", "policy_match"]
    );
    assert_eq!(doc.get("ca", "default_ca", true)?, "CA_default");
    assert_eq!(
        doc.get("CA_default", "private_key", false)?,
        "$dir/private/cakey.pem"
    );
    assert_eq!(
        doc.get("CA_default", "private_key", true)?,
        "/etc/pki/CA/private/cakey.pem"
    );
    Ok(())
}

#[test]
fn resolves_reference_defined_later_in_file() -> Result<()> {
    // `certs` appears before `dir` in the sample.
    let doc = util::sample();
    assert_eq!(doc.get("CA_default", "certs", true)?, "/etc/pki/CA/certs");
    Ok(())
}

#[test]
fn resolves_section_reference() -> Result<()> {
    let mut doc = Document::new();
    doc.add_section("X");
    doc.set("X", "dir", "/a/b");
    doc.set("X", "certs", "$dir/certs");

    assert_eq!(doc.get("X", "certs", true)?, "/a/b/certs");
    assert_eq!(doc.get("X", "certs", false)?, "$dir/certs");
    Ok(())
}

#[test]
fn resolves_reference_without_suffix() -> Result<()> {
    let mut doc = Document::new();
    doc.set("X", "dir", "/a/b");
    doc.set("X", "root", "$dir");

    assert_eq!(doc.get("X", "root", true)?, "/a/b");
    Ok(())
}

#[test]
fn resolves_environment_reference() -> Result<()> {
    let mut doc = Document::new();
    doc.set("", "RANDFILE", "$ENV::HOME/.rnd");
    let env = util::env(&[("HOME", "/home/u")]);

    assert_eq!(doc.get_with_env("", "RANDFILE", true, &env)?, "/home/u/.rnd");
    assert_eq!(doc.get_with_env("", "RANDFILE", false, &env)?, "$ENV::HOME/.rnd");
    Ok(())
}

#[test]
fn missing_environment_variable() {
    let mut doc = Document::new();
    doc.set("", "RANDFILE", "$ENV::PKITOOL_SURELY_UNSET/.rnd");
    let env = util::env(&[]);

    let err = doc.get_with_env("", "RANDFILE", true, &env).unwrap_err();
    assert!(matches!(err, ConfigError::EnvironmentLookup(name) if name == "PKITOOL_SURELY_UNSET"));
}

#[test]
fn substitution_is_single_hop() -> Result<()> {
    let mut doc = Document::new();
    doc.set("X", "base", "/srv");
    doc.set("X", "dir", "$base/ca");
    doc.set("X", "certs", "$dir/certs");

    assert_eq!(doc.get("X", "dir", true)?, "/srv/ca");
    assert_eq!(doc.get("X", "certs", true)?, "$base/ca/certs");
    Ok(())
}

#[test]
fn resolution_reads_current_values() -> Result<()> {
    let mut doc = util::sample();
    assert_eq!(doc.get("CA_default", "serial", true)?, "/etc/pki/CA/serial");

    doc.set("CA_default", "dir", "/srv/ca");
    assert_eq!(doc.get("CA_default", "serial", true)?, "/srv/ca/serial");
    Ok(())
}

#[test]
fn missing_option() {
    let mut doc = Document::new();
    doc.add_section("X");

    let err = doc.get("X", "missing", true).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::NoOption { ref section, ref option } if section == "X" && option == "missing"
    ));
}

#[test]
fn missing_global_option() {
    let doc = Document::new();
    assert!(matches!(
        doc.get("", "HOME", true),
        Err(ConfigError::NoOption { .. })
    ));
}

#[test]
fn missing_section() {
    let doc = util::sample();
    let err = doc.get("nope", "k", true).unwrap_err();
    assert!(matches!(err, ConfigError::NoSection(name) if name == "nope"));
}

#[test]
fn missing_reference_target() {
    let mut doc = Document::new();
    doc.set("X", "certs", "$dir/certs");

    assert!(matches!(
        doc.get("X", "certs", true),
        Err(ConfigError::NoOption { option, .. }) if option == "dir"
    ));
}

#[test]
fn failed_lookup_leaves_document_untouched() {
    let doc = util::sample();
    let before = doc.clone();

    let _ = doc.get("nope", "k", true);
    let _ = doc.get("CA_default", "missing", true);
    let _ = doc.get_with_env("", "RANDFILE", true, &util::env(&[]));

    assert_eq!(doc, before);
}

#[test]
fn defaults_fallback() -> Result<()> {
    let mut doc = Document::new();
    doc.set(DEFAULT_SECTION, "dir", "/srv/default");
    doc.set("X", "certs", "$dir/certs");

    assert_eq!(doc.get("X", "dir", false)?, "/srv/default");
    assert_eq!(doc.get("X", "certs", true)?, "/srv/default/certs");
    assert_eq!(doc.get(DEFAULT_SECTION, "dir", true)?, "/srv/default");
    assert!(!doc.has_section(DEFAULT_SECTION));
    Ok(())
}

#[test]
fn section_value_wins_over_defaults() -> Result<()> {
    let doc = Document::parse("[ DEFAULT ]\ndays = 30\n[ X ]\ndays = 365\n[ Y ]\n")?;

    assert_eq!(doc.get("X", "days", true)?, "365");
    assert_eq!(doc.get("Y", "days", true)?, "30");
    Ok(())
}

#[test]
fn continuation_folding() -> Result<()> {
    let doc = Document::parse("key = line1\n  line2\n")?;
    assert_eq!(doc.get("", "key", false)?, "line1\nline2");

    let doc = Document::parse("[ s ]\nkey = a\n\tb   \n\n  c\nnext = d\n")?;
    assert_eq!(doc.get("s", "key", false)?, "a\nb\nc");
    assert_eq!(doc.get("s", "next", false)?, "d");
    Ok(())
}

#[test]
fn header_cannot_be_continued() {
    let err = Document::parse("[ s ]\n  stray\n").unwrap_err();
    let ConfigError::Format(err) = err else {
        panic!("expected a format error, got {err:?}");
    };
    assert_eq!(err.lines.len(), 1);
    assert_eq!(err.lines[0].line_number, 2);
    assert_eq!(err.lines[0].raw, "  stray");
}

#[test]
fn comments_separators_and_empty_values() -> Result<()> {
    let text = "\
; semicolon comment
   # indented comment
[ s ]
colon: value
spaced   =   padded value   # trailing comment
empty = \"\"
blank =
";
    let doc = Document::parse(text)?;

    assert_eq!(doc.get("s", "colon", false)?, "value");
    assert_eq!(doc.get("s", "spaced", false)?, "padded value");
    assert_eq!(doc.get("s", "empty", false)?, "");
    assert_eq!(doc.get("s", "blank", false)?, "");
    assert_eq!(doc.options("s").map(|o| o.len()), Some(4));
    Ok(())
}

#[test]
fn option_names_are_case_sensitive() -> Result<()> {
    let doc = Document::parse("[ s ]\nRANDFILE = a\nrandfile = b\n")?;
    assert_eq!(doc.get("s", "RANDFILE", false)?, "a");
    assert_eq!(doc.get("s", "randfile", false)?, "b");
    Ok(())
}

#[test]
fn duplicate_section_merge() -> Result<()> {
    let text = "\
[ ca ]
a = 1
b = 2
[ other ]
x = y
[ca]
b = 3
c = 4
";
    let doc = Document::parse(text)?;

    assert_eq!(doc.sections().collect::<Vec<_>>(), vec!["ca", "other"]);
    let ca = doc.section("ca").expect("merged section");
    let options: Vec<_> = ca
        .options()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(options, vec![("a", "1"), ("b", "3"), ("c", "4")]);
    Ok(())
}

#[test]
fn malformed_line_tolerance() {
    let mut text = String::from("[ s ]\n");
    for i in 0..10 {
        text.push_str(&format!("key{i} = value{i}\n"));
        if i == 4 {
            text.push_str("=== not an assignment\n");
        }
    }

    let err = Document::parse(&text).unwrap_err();
    let ConfigError::Format(err) = err else {
        panic!("expected a format error, got {err:?}");
    };
    assert_eq!(err.lines.len(), 1);
    assert_eq!(err.lines[0].line_number, 7);
    assert_eq!(err.lines[0].raw, "=== not an assignment");
    assert!(err.to_string().contains("not an assignment"));

    let doc = err.into_document();
    assert_eq!(doc.options("s").map(|o| o.len()), Some(10));
    assert_eq!(doc.get("s", "key9", false).unwrap(), "value9");
}

#[test]
fn empty_section_header_is_malformed() {
    let err = Document::parse("[ ]\nk = v\n[ s ]\na = 1\n").unwrap_err();
    let ConfigError::Format(err) = err else {
        panic!("expected a format error, got {err:?}");
    };
    let numbers: Vec<_> = err.lines.iter().map(|bad| bad.line_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let doc = err.into_document();
    assert_eq!(doc.sections().collect::<Vec<_>>(), vec!["s"]);
    assert!(doc.globals().is_empty());
    assert_eq!(doc.to_string(), "[ s ]\na = 1\n\n");
}

#[test]
fn add_empty_section_is_ignored() {
    let mut doc = Document::new();
    doc.add_section("");
    doc.add_section("   ");

    assert!(doc.is_empty());
    assert_eq!(doc.sections().count(), 0);
    assert_eq!(doc.to_string(), "");
}

#[test]
fn set_keeps_position_and_creates_sections() -> Result<()> {
    let mut doc = Document::new();
    doc.set("auto", "a", "1");
    doc.set("auto", "b", "2");
    doc.set("auto", "a", "3");

    assert!(doc.has_section("auto"));
    let keys: Vec<_> = doc.options("auto").unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(doc.get("auto", "a", false)?, "3");
    Ok(())
}

#[test]
fn section_names_are_trimmed() -> Result<()> {
    let mut doc = Document::new();
    doc.add_section(" ca ");
    doc.add_section("ca");
    doc.set(" ca ", "default_ca", "X");

    assert_eq!(doc.sections().collect::<Vec<_>>(), vec!["ca"]);
    assert_eq!(doc.get("ca", "default_ca", false)?, "X");
    assert_eq!(doc.get(" ca ", "default_ca", false)?, "X");
    Ok(())
}

#[test]
fn remove_option_keeps_order() {
    let mut doc = Document::new();
    doc.set("s", "a", "1");
    doc.set("s", "b", "2");
    doc.set("s", "c", "3");

    assert!(doc.remove_option("s", "b"));
    assert!(!doc.remove_option("s", "b"));
    assert!(!doc.remove_option("nope", "a"));
    let keys: Vec<_> = doc.options("s").unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn write_layout() {
    let mut doc = Document::new();
    doc.set("", "HOME", ".");
    doc.set("", "RANDFILE", "$ENV::HOME/.rnd");
    doc.add_section(" ca ");
    doc.set("ca", "default_ca", "CA_default");
    doc.set("CA_default", "certs", "$dir/certs");
    doc.set("CA_default", "dir", "/srv/ca");
    doc.set("CA_default", "crl_dir", "$dir/crl");
    doc.set("CA_default", "default_days", "365");
    doc.set("multi", "text", "one\ntwo");

    let expected = "\
HOME = .
RANDFILE = $ENV::HOME/.rnd

[ ca ]
default_ca = CA_default

[ CA_default ]
dir = /srv/ca
default_days = 365
certs = $dir/certs
crl_dir = $dir/crl

[ multi ]
text = one
\ttwo

";
    assert_eq!(doc.to_string(), expected);
}

#[test]
fn write_places_plain_values_first() {
    let doc = util::sample();
    let text = doc.to_string();

    let section_start = text.find("[ CA_default ]").unwrap();
    let dir = text[section_start..].find("dir = /etc/pki/CA").unwrap();
    for deferred in ["certs = ", "crl_dir = ", "database = ", "serial = "] {
        let position = text[section_start..].find(deferred).unwrap();
        assert!(dir < position, "{deferred} written before dir");
    }
    let plain = text[section_start..].find("default_days = 365").unwrap();
    let first_deferred = text[section_start..].find("certs = ").unwrap();
    assert!(plain < first_deferred);
}

#[test]
fn write_defaults_before_sections() {
    let mut doc = Document::new();
    doc.set("s", "a", "1");
    doc.set(DEFAULT_SECTION, "d", "2");

    assert_eq!(doc.to_string(), "[ DEFAULT ]\nd = 2\n\n[ s ]\na = 1\n\n");
}

#[test]
fn write_empty_document() {
    assert_eq!(Document::new().to_string(), "");
}

#[test]
fn round_trip() -> Result<()> {
    let mut doc = Document::new();
    doc.set("", "HOME", ".");
    doc.set("", "notes", "first\nsecond");
    doc.add_section("empty");
    doc.add_section("req");
    doc.set("req", "default_bits", "2048");
    doc.set("req", "prompt", "");
    doc.set("req", "0.organizationName_default", "Example, Inc.");
    doc.set("req_distinguished_name", "commonName", "Common Name (eg, your name)");
    doc.set("req_distinguished_name", "commonName_max", "64");

    let parsed = Document::parse(&doc.to_string())?;
    assert_eq!(parsed, doc);
    Ok(())
}

#[test]
fn round_trip_of_parsed_sample() -> Result<()> {
    let doc = util::sample();
    let reparsed = Document::parse(&doc.to_string())?;

    assert_eq!(reparsed.globals(), doc.globals());
    for name in doc.sections() {
        let original = doc.options(name).unwrap();
        let again = reparsed.options(name).unwrap();
        assert_eq!(again.len(), original.len());
        for (key, value) in original {
            assert_eq!(again.get(key), Some(value), "{name}.{key}");
        }
    }
    Ok(())
}

#[test]
fn from_str() -> Result<()> {
    let doc: Document = "[ s ]\nk = v\n".parse()?;
    assert_eq!(doc.get("s", "k", true)?, "v");
    Ok(())
}

#[test]
fn unescaped_values_are_cut_on_reparse() -> Result<()> {
    let mut doc = Document::new();
    doc.set("s", "blank_line", "a\n\nb");
    doc.set("s", "hash", "x # y");
    doc.set("s", "hash_line", "one\n#two");

    let reparsed = Document::parse(&doc.to_string())?;
    assert_eq!(reparsed.get("s", "blank_line", false)?, "a\nb");
    assert_eq!(reparsed.get("s", "hash", false)?, "x");
    assert_eq!(reparsed.get("s", "hash_line", false)?, "one");
    Ok(())
}

#[test]
fn write_to_matches_display() {
    let doc = util::sample();
    let mut out = Vec::new();
    doc.write_to(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), doc.to_string());
}

#[test]
fn len_counts_every_scope() {
    let mut doc = Document::new();
    assert!(doc.is_empty());

    doc.add_section("empty");
    assert_eq!(doc.len(), 0);
    assert!(!doc.is_empty());

    doc.set("", "HOME", ".");
    doc.set(DEFAULT_SECTION, "dir", "/srv");
    doc.set("s", "a", "1");
    doc.set("s", "b", "2");
    assert_eq!(doc.len(), 4);
    assert_eq!(util::sample().len(), 19);
}
