use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use krbcrypt::{
    Checksum, EType, EncryptedData, EncryptionKey, decrypt_enc_part, etypes, get_checksum,
    get_checksum_etype, get_encrypted_data, get_etype_by_name, verify_checksum,
};
use std::io::{self, Read};
use std::path::PathBuf;
use zeroize::Zeroizing;

mod auth;
mod keyset_file;

use keyset_file::KeysetFile;

#[derive(Debug, Parser)]
#[command(name = "krbcrypt")]
#[command(version, about = "Kerberos encryption types (RFC 3961 / RFC 3962) from the command line.")]
struct Cli {
    /// JSON keyset file holding keys by encryption type
    #[arg(long, global = true, value_name = "PATH", env = "KRBCRYPT_KEYSET")]
    keyset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
struct KeyArgs {
    /// Encryption type, by name or number
    #[arg(short, long)]
    etype: Option<String>,

    /// Key bytes in hex; takes precedence over the keyset
    #[arg(long, env = "KRBCRYPT_KEY", hide_env_values = true)]
    key: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lists the supported encryption types
    Etypes,

    /// Derives a key from a password and salt
    #[command(arg_required_else_help = true)]
    StringToKey {
        #[arg(short, long)]
        etype: String,

        #[arg(short, long)]
        salt: String,

        /// String-to-key parameters in hex (etype default if omitted)
        #[arg(short, long, default_value = "")]
        params: String,
    },

    /// Generates a random key
    #[command(arg_required_else_help = true)]
    RandomKey {
        #[arg(short, long)]
        etype: String,
    },

    /// Encrypts hex data and prints the encrypted-data envelope as JSON
    #[command(arg_required_else_help = true)]
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,

        #[arg(short, long)]
        usage: u32,

        #[arg(long)]
        kvno: Option<i32>,

        /// Plaintext in hex, or `-` for stdin
        data: String,
    },

    /// Decrypts an encrypted-data envelope and prints the plaintext in hex
    #[command(arg_required_else_help = true)]
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        #[arg(short, long)]
        usage: u32,

        /// Envelope JSON, or `-` for stdin
        envelope: String,
    },

    /// Computes a keyed checksum of hex data, or verifies one
    #[command(arg_required_else_help = true)]
    Checksum {
        #[command(flatten)]
        key: KeyArgs,

        #[arg(short, long)]
        usage: u32,

        /// Checksum JSON to verify instead of printing a new one
        #[arg(long, value_name = "JSON")]
        verify: Option<String>,

        /// Data in hex, or `-` for stdin
        data: String,
    },
}

fn setup_logging() -> Result<()> {
    use tracing::metadata::LevelFilter;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("KRBCRYPT_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .context("failed to set tracing global subscriber")?;

    Ok(())
}

fn read_input(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf.trim().to_string())
}

fn decode_hex(what: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim()).with_context(|| format!("{what} is not valid hex"))
}

/// Picks the key for an operation: an explicit `--key`, typed by `--etype`
/// or `default_etype`, or else the keyset entry for that encryption type.
fn resolve_key(
    args: &KeyArgs,
    default_etype: Option<i32>,
    keyset: Option<&KeysetFile>,
) -> Result<EncryptionKey> {
    let etype = match &args.etype {
        Some(name) => Some(get_etype_by_name(name)?.etype_id()),
        None => default_etype,
    };

    if let Some(key_hex) = &args.key {
        let Some(etype) = etype else {
            bail!("--etype is required with --key");
        };
        let bytes = Zeroizing::new(decode_hex("key", key_hex)?);
        return Ok(EncryptionKey::new(etype, bytes.to_vec()));
    }

    let Some(file) = keyset else {
        bail!("no key given: use --key or --keyset");
    };
    let ks = file.load()?;
    let key = ks
        .get_encryption_key(etype.unwrap_or(0))
        .with_context(|| format!("keyset {}", file.path().display()))?;
    Ok(key.clone())
}

fn store_key(keyset: Option<&KeysetFile>, key: &EncryptionKey) -> Result<()> {
    if let Some(file) = keyset {
        let mut ks = file.load()?;
        ks.insert(key.clone());
        file.save(&ks)?;
        tracing::info!(etype = key.key_type(), path = %file.path().display(), "key stored");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging()?;
    let keyset = args.keyset.map(KeysetFile::new);

    match args.command {
        Commands::Etypes => {
            let rows: Vec<&dyn EType> = etypes().collect();
            let name_width = rows
                .iter()
                .map(|e| e.name().len())
                .chain(std::iter::once("Name".len()))
                .max()
                .unwrap_or_default();

            println!("{:<5}  {:<name_width$}  {:<8}  {:<4}  Params", "Etype", "Name", "Cksum", "Key");
            println!("{:-<5}  {:-<name_width$}  {:-<8}  {:-<4}  {:-<8}", "", "", "", "", "");
            for e in rows {
                println!(
                    "{:<5}  {:<name_width$}  {:<8}  {:<4}  {}",
                    e.etype_id(),
                    e.name(),
                    e.checksum_type_id(),
                    e.key_byte_size(),
                    e.default_string_to_key_params()
                );
            }
        }
        Commands::StringToKey {
            etype,
            salt,
            params,
        } => {
            let e = get_etype_by_name(&etype)?;
            let password = auth::read_password()?;
            let key = krbcrypt::string_to_key(e.etype_id(), &password, &salt, &params)?;
            drop(password);
            store_key(keyset.as_ref(), &key)?;
            println!("{}", hex::encode(key.key_value()));
        }
        Commands::RandomKey { etype } => {
            let e = get_etype_by_name(&etype)?;
            let key = krbcrypt::random_key(e.etype_id())?;
            store_key(keyset.as_ref(), &key)?;
            println!("{}", hex::encode(key.key_value()));
        }
        Commands::Encrypt {
            key,
            usage,
            kvno,
            data,
        } => {
            let key = resolve_key(&key, None, keyset.as_ref())?;
            let plain = Zeroizing::new(decode_hex("data", &read_input(&data)?)?);
            let ed = get_encrypted_data(&plain, &key, usage, kvno)?;
            println!("{}", serde_json::to_string(&ed)?);
        }
        Commands::Decrypt {
            key,
            usage,
            envelope,
        } => {
            let ed: EncryptedData = serde_json::from_str(&read_input(&envelope)?)
                .context("malformed encrypted-data JSON")?;
            let key = resolve_key(&key, Some(ed.etype), keyset.as_ref())?;
            let plain = Zeroizing::new(decrypt_enc_part(&ed, &key, usage)?);
            println!("{}", hex::encode(&*plain));
        }
        Commands::Checksum {
            key,
            usage,
            verify,
            data,
        } => {
            let data = decode_hex("data", &read_input(&data)?)?;
            match verify {
                Some(json) => {
                    let cksum: Checksum =
                        serde_json::from_str(&json).context("malformed checksum JSON")?;
                    let owner = get_checksum_etype(cksum.cksumtype)?.etype_id();
                    let key = resolve_key(&key, Some(owner), keyset.as_ref())?;
                    verify_checksum(&data, &key, usage, &cksum)?;
                    println!("checksum OK");
                }
                None => {
                    let key = resolve_key(&key, None, keyset.as_ref())?;
                    let cksum = get_checksum(&data, &key, usage)?;
                    println!("{}", serde_json::to_string(&cksum)?);
                }
            }
        }
    }

    Ok(())
}
