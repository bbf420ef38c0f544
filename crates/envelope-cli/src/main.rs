//! Command-line interface for `envelope`.

#![forbid(unsafe_code)]

mod keyfile;
mod transcript;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use envelope::{
    EnvelopeConfig, EnvelopeProtocol, MemoryTranscript, Nonce, NoopTranscript, Transcript,
    WireEnvelope,
};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rsa_core::{KeyGenConfig, KeyPair};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::keyfile::KeyFile;
use crate::transcript::FileTranscript;

/// Hybrid envelope encryption CLI.
#[derive(Parser)]
#[command(
    name = "envelope",
    version,
    author,
    about = "AES-128-CTR + RSA-OAEP envelope encryption with hash verification"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair and write it to a key file.
    Keygen {
        /// Output path for the key file.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        /// Bit length of each prime.
        #[arg(long, default_value_t = 1024)]
        prime_bits: u64,
        /// Give up after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Optional RNG seed for reproducible generation.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encrypt and sign a file into a JSON envelope.
    Send {
        /// Path to the key file.
        #[arg(long, value_name = "FILE")]
        keys: PathBuf,
        /// Message to send.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// CTR nonce as 32 hex characters; random when omitted.
        #[arg(long, value_name = "HEX")]
        nonce_hex: Option<String>,
        /// Output path for the envelope.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        /// OAEP label; the receiver must pass the same one.
        #[arg(long, default_value = "")]
        label: String,
        /// Write every intermediate value to this file.
        #[arg(long, value_name = "FILE")]
        transcript: Option<PathBuf>,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Verify and decrypt a JSON envelope.
    Receive {
        /// Path to the key file.
        #[arg(long, value_name = "FILE")]
        keys: PathBuf,
        /// Envelope produced by `send`.
        #[arg(long, value_name = "FILE")]
        envelope: PathBuf,
        /// CTR nonce as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        nonce_hex: String,
        /// Output path for the message; stdout when omitted.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// OAEP label used by the sender.
        #[arg(long, default_value = "")]
        label: String,
        /// Write every intermediate value to this file.
        #[arg(long, value_name = "FILE")]
        transcript: Option<PathBuf>,
    },
    /// Run a local demo: generate keys, send a message, receive it, then tamper with it.
    Demo {
        /// Message to send.
        #[arg(long, default_value = "The quick brown fox jumps over the lazy dog")]
        message: String,
        /// Bit length of each prime.
        #[arg(long, default_value_t = 1024)]
        prime_bits: u64,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.command {
        Commands::Keygen {
            out,
            prime_bits,
            timeout_secs,
            seed,
        } => cmd_keygen(&out, prime_bits, timeout_secs, seed),
        Commands::Send {
            keys,
            input,
            nonce_hex,
            out,
            label,
            transcript,
            seed,
        } => cmd_send(
            &keys,
            &input,
            nonce_hex.as_deref(),
            &out,
            &label,
            transcript.as_deref(),
            seed,
        ),
        Commands::Receive {
            keys,
            envelope,
            nonce_hex,
            out,
            label,
            transcript,
        } => cmd_receive(
            &keys,
            &envelope,
            &nonce_hex,
            out.as_deref(),
            &label,
            transcript.as_deref(),
        ),
        Commands::Demo {
            message,
            prime_bits,
            seed,
        } => cmd_demo(&message, prime_bits, seed),
    }
}

fn cmd_keygen(
    out: &Path,
    prime_bits: u64,
    timeout_secs: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let config = EnvelopeConfig {
        keygen: KeyGenConfig {
            prime_bits,
            timeout: timeout_secs.map(Duration::from_secs),
            ..KeyGenConfig::default()
        },
        ..EnvelopeConfig::default()
    };
    let pair = EnvelopeProtocol::new(config)
        .generate_keypair(seeded_rng(seed))
        .context("generate key pair")?;
    let bytes = KeyFile::from_pair(&pair)?
        .to_bytes()
        .context("serialize key file")?;
    fs::write(out, bytes).with_context(|| format!("write {}", out.display()))?;
    info!(path = %out.display(), prime_bits, "key pair written");
    Ok(())
}

fn cmd_send(
    keys_path: &Path,
    input_path: &Path,
    nonce_hex: Option<&str>,
    out: &Path,
    label: &str,
    transcript_path: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let keys = load_keys(keys_path)?;
    let message = fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    let mut rng = seeded_rng(seed);
    let nonce = match nonce_hex {
        Some(hex_str) => parse_nonce_hex(hex_str)?,
        None => {
            let nonce = Nonce::random(&mut rng);
            println!("nonce: {}", hex::encode(nonce.as_bytes()));
            nonce
        }
    };

    let mut file_transcript = open_transcript(transcript_path)?;
    let mut noop = NoopTranscript;
    let sink: &mut dyn Transcript = match file_transcript.as_mut() {
        Some(file) => file,
        None => &mut noop,
    };
    let envelope = EnvelopeProtocol::new(EnvelopeConfig::default().with_label(label))
        .with_transcript(sink)
        .send(&mut rng, &message, &keys, &nonce)
        .context("send envelope")?;
    finish_transcript(file_transcript)?;

    let json = serde_json::to_string_pretty(&WireEnvelope::from(&envelope))
        .context("serialize envelope")?;
    fs::write(out, json).with_context(|| format!("write {}", out.display()))?;
    Ok(())
}

fn cmd_receive(
    keys_path: &Path,
    envelope_path: &Path,
    nonce_hex: &str,
    out: Option<&Path>,
    label: &str,
    transcript_path: Option<&Path>,
) -> Result<()> {
    let keys = load_keys(keys_path)?;
    let nonce = parse_nonce_hex(nonce_hex)?;
    let json = fs::read_to_string(envelope_path)
        .with_context(|| format!("read {}", envelope_path.display()))?;
    let wire: WireEnvelope = serde_json::from_str(&json).context("parse envelope")?;
    let envelope = wire.decode().context("decode envelope")?;

    let mut file_transcript = open_transcript(transcript_path)?;
    let mut noop = NoopTranscript;
    let sink: &mut dyn Transcript = match file_transcript.as_mut() {
        Some(file) => file,
        None => &mut noop,
    };
    let result = EnvelopeProtocol::new(EnvelopeConfig::default().with_label(label))
        .with_transcript(sink)
        .receive(&envelope, &keys, &nonce);
    finish_transcript(file_transcript)?;
    let message = result.context("envelope rejected")?;

    match out {
        Some(path) => {
            fs::write(path, &message).with_context(|| format!("write {}", path.display()))?
        }
        None => std::io::stdout()
            .write_all(&message)
            .context("write message to stdout")?,
    }
    Ok(())
}

fn cmd_demo(message: &str, prime_bits: u64, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let config = EnvelopeConfig {
        keygen: KeyGenConfig {
            prime_bits,
            ..KeyGenConfig::default()
        },
        ..EnvelopeConfig::default()
    };
    let mut protocol = EnvelopeProtocol::new(config).with_transcript(MemoryTranscript::default());

    println!("generating {}-bit modulus...", 2 * prime_bits);
    let keys = protocol
        .generate_keypair(&mut rng)
        .context("generate key pair")?;
    let nonce = Nonce::random(&mut rng);
    println!("nonce: {}", hex::encode(nonce.as_bytes()));

    let envelope = protocol
        .send(&mut rng, message.as_bytes(), &keys, &nonce)
        .context("send envelope")?;
    let received = protocol
        .receive(&envelope, &keys, &nonce)
        .context("receive envelope")?;
    for (label, value) in protocol.transcript().entries() {
        println!("{label}: {}", hex::encode(value));
    }
    if received != message.as_bytes() {
        bail!("demo roundtrip failed");
    }
    println!("received: {}", String::from_utf8_lossy(&received));

    let mut tampered = envelope;
    tampered.ciphertext[0] ^= 0x01;
    match protocol.receive(&tampered, &keys, &nonce) {
        Ok(_) => bail!("tampered envelope was accepted"),
        Err(err) => println!("tampered envelope rejected: {err}"),
    }
    Ok(())
}

fn parse_nonce_hex(hex_str: &str) -> Result<Nonce> {
    let bytes = hex::decode(hex_str.trim()).context("decode nonce hex")?;
    Nonce::from_slice(&bytes).context("nonce must be 16 bytes (32 hex characters)")
}

fn load_keys(path: &Path) -> Result<KeyPair> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    KeyFile::from_bytes(&bytes)
        .context("deserialize key file")?
        .to_pair()
}

fn open_transcript(path: Option<&Path>) -> Result<Option<FileTranscript>> {
    path.map(|path| {
        FileTranscript::create(path).with_context(|| format!("create {}", path.display()))
    })
    .transpose()
}

fn finish_transcript(transcript: Option<FileTranscript>) -> Result<()> {
    if let Some(transcript) = transcript {
        transcript.finish().context("write transcript")?;
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nonce_hex() {
        let nonce = parse_nonce_hex(" 000102030405060708090a0b0c0d0e0f\n").unwrap();
        assert_eq!(nonce.as_bytes()[15], 0x0f);
        assert!(parse_nonce_hex("0001").is_err());
        assert!(parse_nonce_hex("zz").is_err());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = seeded_rng(Some(7)).next_u64();
        let b = seeded_rng(Some(7)).next_u64();
        assert_eq!(a, b);
    }
}
