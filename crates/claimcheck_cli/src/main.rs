//! CLAIMCHECK CLI
//!
//! Audits genesis token claim files against the participant proofs they
//! were issued from.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod load;
mod render;

use claimcheck_certify::{ClaimValidator, GenesisAssembler, GenesisError};
use claimcheck_core::{AuditConfig, AuditError, AuditResult, ParticipantProof, SubmittedClaim};
use claimcheck_vesting::{Denominator, VestingScheduler, derive_reference};
use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{Report, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_REJECTED: u8 = 1;
const EXIT_MALFORMED: u8 = 2;

#[derive(Parser)]
#[command(name = "claimcheck")]
#[command(about = "CLAIMCHECK - Genesis claim auditing against vesting proofs", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(flatten)]
    audit: AuditArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct AuditArgs {
    /// JSON audit config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Smallest denomination chunk in nanowits
    #[arg(long, global = true)]
    min_unit: Option<u64>,
    /// Denomination base
    #[arg(long, global = true)]
    base: Option<u64>,
    /// Seconds a submitted timelock may precede its reference
    #[arg(long, global = true)]
    tolerance: Option<u64>,
}

impl AuditArgs {
    fn resolve(&self) -> AuditResult<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| AuditError::malformed(format!("config {}", path.display()), e.to_string()))?;
                AuditConfig::from_json(&text)?
            }
            None => AuditConfig::default(),
        };
        if let Some(min_unit) = self.min_unit {
            config.denomination.min_unit = min_unit;
        }
        if let Some(base) = self.base {
            config.denomination.base = base;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance_seconds = tolerance;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a claim file against its participant proof
    Validate {
        /// Participant proof
        proof: PathBuf,
        /// Submitted claim file
        claim: PathBuf,
        /// Write the accepted claim with reference timelocks here
        #[arg(long)]
        write_corrected: Option<PathBuf>,
    },
    /// Print the unlock schedule of a proof
    Schedule {
        /// Participant proof
        proof: PathBuf,
    },
    /// Print the reference claim of a proof
    Reference {
        /// Participant proof
        proof: PathBuf,
    },
    /// Validate every claim and build the genesis allocation
    Genesis {
        /// Directory of participant proofs
        proofs_dir: PathBuf,
        /// Directory of claim files
        claims_dir: PathBuf,
        /// Write the genesis block here instead of stdout
        #[arg(long)]
        write_genesis_block: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accepted,
    Rejected,
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => ExitCode::SUCCESS,
            Verdict::Rejected => ExitCode::from(EXIT_REJECTED),
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(&cli) {
        Ok(verdict) => Ok(verdict.into()),
        Err(report) if is_malformed(&report) => {
            eprintln!("Error: {:?}", report);
            Ok(ExitCode::from(EXIT_MALFORMED))
        }
        Err(report) => Err(report),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimcheck=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Unreadable input or config, as opposed to a rejected claim
fn is_malformed(report: &Report) -> bool {
    match report.downcast_ref::<GenesisError>() {
        Some(GenesisError::Config(cause)) | Some(GenesisError::Reference { cause, .. }) => {
            !cause.is_rejection()
        }
        Some(GenesisError::Rejected { .. }) => false,
        Some(
            GenesisError::DuplicateProof { .. }
            | GenesisError::UnknownParticipant { .. }
            | GenesisError::AlreadyClaimed { .. }
            | GenesisError::MissingAddress { .. },
        ) => true,
        None => report
            .downcast_ref::<AuditError>()
            .is_some_and(|err| !err.is_rejection()),
    }
}

fn run(cli: &Cli) -> Result<Verdict> {
    let config = cli.audit.resolve()?;
    tracing::debug!(?config, "resolved audit config");

    match &cli.command {
        Commands::Validate {
            proof,
            claim,
            write_corrected,
        } => validate(&config, proof, claim, write_corrected.as_deref()),
        Commands::Schedule { proof } => {
            print!("{}", schedule(&config, proof)?);
            Ok(Verdict::Accepted)
        }
        Commands::Reference { proof } => {
            let proof: ParticipantProof = load::read_json(proof, "participant proof")?;
            let reference = derive_reference(&proof, &config.denomination)?;
            println!("{}", serde_json::to_string_pretty(&reference)?);
            Ok(Verdict::Accepted)
        }
        Commands::Genesis {
            proofs_dir,
            claims_dir,
            write_genesis_block,
        } => genesis(&config, proofs_dir, claims_dir, write_genesis_block.as_deref()),
    }
}

fn validate(
    config: &AuditConfig,
    proof_path: &Path,
    claim_path: &Path,
    write_corrected: Option<&Path>,
) -> Result<Verdict> {
    let proof: ParticipantProof = load::read_json(proof_path, "participant proof")?;
    let claim: SubmittedClaim = load::read_json(claim_path, "claim file")?;
    let reference = derive_reference(&proof, &config.denomination)?;

    let outcome = ClaimValidator::from_config(config).validate(&reference, &claim);
    println!("{}", outcome.report.summary());
    for check in outcome.report.failed_checks() {
        println!("  {}: {}", check.name, check.message);
    }

    let Some(corrected) = outcome.corrected else {
        return Ok(Verdict::Rejected);
    };
    if let Some(path) = write_corrected {
        load::write_json(path, &corrected)
            .wrap_err_with(|| format!("failed to write corrected claim to {}", path.display()))?;
        println!("Corrected claim written to {}", path.display());
    }
    Ok(Verdict::Accepted)
}

fn schedule(config: &AuditConfig, proof_path: &Path) -> Result<String> {
    let proof: ParticipantProof = load::read_json(proof_path, "participant proof")?;
    let scheduler = VestingScheduler::new(proof.data.vesting)?;
    let denominator = Denominator::new(&config.denomination)?;

    let steps = scheduler.schedule(proof.data.wit, proof.genesis_time()?)?;
    let chunks: Vec<Vec<u64>> = steps.iter().map(|s| denominator.denominate(s.amount)).collect();

    let mut out = format!(
        "{} <{}> source={} wit={}\n",
        proof.data.name, proof.data.email_address, proof.data.source, proof.data.wit
    );
    out.push_str(&render::schedule_table(&steps, &chunks));
    Ok(out)
}

fn genesis(
    config: &AuditConfig,
    proofs_dir: &Path,
    claims_dir: &Path,
    write_genesis_block: Option<&Path>,
) -> Result<Verdict> {
    let mut assembler = GenesisAssembler::new(config)?;

    for path in load::json_files(proofs_dir)? {
        let proof: ParticipantProof = load::read_json(&path, "participant proof")?;
        assembler
            .add_proof(proof)
            .wrap_err_with(|| format!("while loading {}", path.display()))?;
    }
    tracing::info!(proofs = assembler.pending_count(), "loaded participant proofs");

    for path in load::json_files(claims_dir)? {
        let claim: SubmittedClaim = load::read_json(&path, "claim file")?;
        assembler
            .add_claim(&claim)
            .wrap_err_with(|| format!("while processing {}", path.display()))?;
    }

    let summary = assembler.finish();
    if !summary.unclaimed.is_empty() {
        println!("Warning: the following participants have not submitted a claim file:");
        for participant in &summary.unclaimed {
            println!("  {}", participant);
        }
    }

    match write_genesis_block {
        Some(path) => {
            load::write_json(path, &summary.block)
                .wrap_err_with(|| format!("failed to write genesis block to {}", path.display()))?;
            println!(
                "Genesis block with {} outputs from {} claims written to {}",
                summary.block.alloc.len(),
                summary.accepted_claims,
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&summary.block)?),
    }
    Ok(Verdict::Accepted)
}
