//! Quorum CLI - Command-line tool for threshold multi-signature settlement
//!
//! This tool provides commands for:
//! - Generating signer / authority key pairs
//! - Simulating a committee, verifier node and contract end to end
//! - Inspecting proof envelopes
//! - Verifying proof envelope seals
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quorum_aggregation::{EnvelopeProof, ProofEnvelope, Provable};
use quorum_client::{
    DataRequest, LocalCommittee, SignerNode, StaticDataSource, VerifierNode, VerifierNodeConfig,
};
use quorum_contract::SettlementContract;
use quorum_primitives::keys::{key_to_hex, signing_key_from_seed, signing_key_to_hex};
use quorum_primitives::{ProtocolConfig, SigningKey};
use quorum_state::{AuthenticatedMap, MembershipMap};

/// Quorum - threshold multi-signature settlement
#[derive(Parser)]
#[command(name = "quorum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Aggregate committee signatures and settle them into a verified ledger", long_about = None)]
struct Cli {
    /// Protocol configuration JSON (defaults apply to missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an Ed25519 key pair
    Keygen {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a committee, verifier node and contract in-process
    Simulate {
        /// Committee size
        #[arg(short = 'n', long, default_value = "30")]
        signers: usize,

        /// Number of values to verify and settle
        #[arg(short, long, default_value = "3")]
        messages: usize,

        /// Override the configured batch capacity
        #[arg(short, long)]
        batch_capacity: Option<usize>,

        /// Signers that cannot see the data and stay silent
        #[arg(long, default_value = "0")]
        absent: usize,

        /// Settle all values with one folded settlement proof
        #[arg(long)]
        fold: bool,

        /// Seed for deterministic keys
        #[arg(long, default_value = "quorum-simulation")]
        seed: String,

        /// Write the last proof as an envelope to this file
        #[arg(long)]
        proof_out: Option<PathBuf>,
    },

    /// Print the public output of a proof envelope
    Inspect {
        /// Path to the proof envelope
        #[arg(short = 'f', long)]
        proof: PathBuf,
    },

    /// Check a proof envelope's seal
    Verify {
        /// Path to the proof envelope
        #[arg(short = 'f', long)]
        proof: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Keygen { output } => keygen(output),

        Commands::Simulate {
            signers,
            messages,
            batch_capacity,
            absent,
            fold,
            seed,
            proof_out,
        } => {
            let config = match batch_capacity {
                Some(capacity) => config.with_batch_capacity(capacity),
                None => config,
            };
            let options = SimulationOptions {
                signers,
                messages,
                absent,
                fold,
                seed,
                proof_out,
            };
            simulate(config, options).await
        }

        Commands::Inspect { proof } => inspect(&proof),

        Commands::Verify { proof } => verify(&proof),
    }
}

fn load_config(path: Option<&Path>) -> Result<ProtocolConfig> {
    let Some(path) = path else {
        return Ok(ProtocolConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = ProtocolConfig::from_json(&contents)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    info!(?config, "loaded protocol configuration");
    Ok(config)
}

fn keygen(output: Option<PathBuf>) -> Result<()> {
    let key = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
    let json = serde_json::json!({
        "public_key": key_to_hex(&key.verifying_key()),
        "secret_key": signing_key_to_hex(&key),
    });
    let json_str = serde_json::to_string_pretty(&json)?;

    if let Some(path) = output {
        fs::write(&path, &json_str)
            .with_context(|| format!("Failed to write key file: {}", path.display()))?;
        eprintln!("Key pair written to: {}", path.display());
    } else {
        println!("{}", json_str);
    }
    Ok(())
}

struct SimulationOptions {
    signers: usize,
    messages: usize,
    absent: usize,
    fold: bool,
    seed: String,
    proof_out: Option<PathBuf>,
}

async fn simulate(config: ProtocolConfig, options: SimulationOptions) -> Result<()> {
    config.validate().context("Invalid protocol configuration")?;
    if options.signers == 0 {
        anyhow::bail!("committee needs at least one signer");
    }
    if options.absent > options.signers {
        anyhow::bail!(
            "cannot silence {} of {} signers",
            options.absent,
            options.signers
        );
    }

    let authority = signing_key_from_seed(format!("{}/authority", options.seed).as_bytes());
    let signer_keys: Vec<SigningKey> = (0..options.signers)
        .map(|i| signing_key_from_seed(format!("{}/signer/{i}", options.seed).as_bytes()))
        .collect();

    let public_keys: Vec<_> = signer_keys.iter().map(|k| k.verifying_key()).collect();
    let committee = MembershipMap::from_keys(config.map_depth, &public_keys)
        .context("Failed to build committee map")?;

    let mut contract = SettlementContract::new(config)?;
    contract.initialize(&authority, committee.root(), options.signers as u64)?;
    let contract = Arc::new(Mutex::new(contract));

    let requests: Vec<DataRequest> = (0..options.messages)
        .map(|i| DataRequest::new("https://oracle.local", format!("/feed/{i}"), "value"))
        .collect();
    let mut source = StaticDataSource::new();
    for (i, request) in requests.iter().enumerate() {
        source.insert(request, 1_000 + i as u64);
    }

    let nodes = signer_keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let view = if i < options.absent {
                StaticDataSource::new()
            } else {
                source.clone()
            };
            SignerNode::new(key.clone(), authority.verifying_key(), view)
        })
        .collect();

    let mut node = VerifierNode::new(
        VerifierNodeConfig::default().with_protocol(config),
        authority,
        committee,
        contract.clone(),
        source,
        LocalCommittee::new(nodes),
    )?;

    let start = Instant::now();
    let mut settled = Vec::new();
    let envelope = if options.fold {
        let (folded, verifications) = node.verify_data_batch(requests).await?;
        for v in &verifications {
            settled.push(serde_json::json!({
                "value": v.value,
                "message": v.message,
                "signatures": v.proof.public_output().count,
            }));
        }
        ProofEnvelope::from_settlement(&folded)?
    } else {
        let mut last = None;
        for request in requests {
            let v = node.verify_data(request).await?;
            settled.push(serde_json::json!({
                "value": v.value,
                "message": v.message,
                "signatures": v.proof.public_output().count,
            }));
            last = Some(v.proof);
        }
        match last {
            Some(proof) => ProofEnvelope::from_aggregation(&proof)?,
            None => anyhow::bail!("nothing to settle: --messages must be at least 1"),
        }
    };
    let elapsed = start.elapsed();

    let state = *contract
        .lock()
        .await
        .state()
        .context("contract lost its state")?;

    let summary = serde_json::json!({
        "signers": options.signers,
        "absent": options.absent,
        "batch_capacity": config.batch_capacity,
        "threshold": format!("{}/{}", config.threshold_numerator, config.threshold_denominator),
        "folded": options.fold,
        "settled": settled,
        "state": state,
        "elapsed_ms": elapsed.as_millis() as u64,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = options.proof_out {
        fs::write(&path, envelope.to_json()?)
            .with_context(|| format!("Failed to write proof file: {}", path.display()))?;
        eprintln!("Proof written to: {}", path.display());
    }
    Ok(())
}

fn read_envelope(path: &Path) -> Result<EnvelopeProof> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read proof file: {}", path.display()))?;
    let envelope = ProofEnvelope::from_json(&contents)?;
    Ok(envelope.open()?)
}

fn inspect(path: &Path) -> Result<()> {
    let proof = read_envelope(path)?;
    let (seal, premises) = match &proof {
        EnvelopeProof::Aggregation(p) => (p.seal(), p.premises().len()),
        EnvelopeProof::Settlement(p) => (p.seal(), p.premises().len()),
    };

    println!("Proof Inspection:");
    println!("  Program: {}", proof.program());
    println!("  Seal: {}", seal);
    println!("  Premises: {}", premises);
    println!("  Public Output:");
    println!("{}", serde_json::to_string_pretty(&proof.output_json()?)?);
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let proof = read_envelope(path)?;
    if proof.verify() {
        eprintln!("Proof VALID ({})", proof.program());
        println!("VALID");
        Ok(())
    } else {
        println!("INVALID");
        anyhow::bail!("proof seal does not match its contents")
    }
}
