use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use pkitool::ca::CertificateAuthority;
use pkitool::callbacks::Callback;
use pkitool::engine::KeySpec;
use pkitool::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "pkitool", version, about = "Bootstrap an OpenSSL certificate authority")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// CA section to operate on (defaults to `default_ca`)
    #[arg(long, global = true, env = "PKITOOL_CA_NAME")]
    ca_name: Option<String>,

    /// CA root directory, written into the CA section's `dir`
    #[arg(long, global = true, env = "PKITOOL_CA_DIR")]
    ca_dir: Option<PathBuf>,

    /// Existing openssl.cnf to start from
    #[arg(short, long, global = true, env = "PKITOOL_CONFIG")]
    config: Option<PathBuf>,

    /// Keep going when the configuration has malformed lines
    #[arg(long, global = true)]
    lenient: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the directory layout, openssl.cnf and the CA key
    Init {
        /// Key type: rsa, rsa:<bits>, p256, p384 or ed25519
        #[arg(long, default_value = "rsa:2048", env = "PKITOOL_KEY_TYPE")]
        key_type: KeySpec,

        /// File whose first line is the CA key password
        #[arg(long, env = "PKITOOL_KEY_PASSWORD_FILE")]
        key_password_file: Option<PathBuf>,

        /// Skip generating the CA key
        #[arg(long)]
        no_key: bool,
    },

    /// Print the configuration
    Show,

    /// Print one option value
    Get {
        /// Section name; use "" for global options
        section: String,
        option: String,

        /// Print the stored value without expanding `$` references
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let builder = Settings::builder()
        .maybe_ca_name(cli.common.ca_name)
        .maybe_ca_dir(cli.common.ca_dir)
        .maybe_template(cli.common.config)
        .lenient(cli.common.lenient);

    match cli.command {
        Command::Init {
            key_type,
            key_password_file,
            no_key,
        } => {
            let settings = builder
                .key(key_type)
                .maybe_key_password_file(key_password_file)
                .skip_key(no_key)
                .build();
            run_init(&settings)
        }
        Command::Show => {
            let doc = builder.build().load_document()?;
            print!("{doc}");
            Ok(())
        }
        Command::Get {
            section,
            option,
            raw,
        } => {
            let doc = builder.build().load_document()?;
            let value = doc
                .get(&section, &option, !raw)
                .with_context(|| format!("reading {option:?} from section {section:?}"))?;
            println!("{value}");
            Ok(())
        }
    }
}

fn run_init(settings: &Settings) -> Result<()> {
    let doc = settings.load_document()?;
    let ca_name = settings.ca_section(&doc)?;
    let mut ca = CertificateAuthority::new(doc, Some(&ca_name))?;

    if let Some(password) = settings.key_password()? {
        ca.register_callback("get_ca_key_password", Callback::password(move || password.clone()))?;
    }

    ca.create_directory_structure()
        .context("creating the CA directory structure")?;

    if settings.skip_key {
        let path = ca.write_config()?;
        info!(path = %path.display(), "skipped CA key generation");
    } else {
        let path = ca.init(settings.key)?;
        info!(ca = ca.name(), engine = ca.engine_name(), config = %path.display(), "CA initialized");
    }
    Ok(())
}
