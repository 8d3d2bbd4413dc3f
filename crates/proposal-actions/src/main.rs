//! proposal-actions: inspect what a DAO proposal will execute
//!
//! ```text
//! proposal-actions decode --proposal <file.json> --chain 0x1 [--config cfg.json]
//!                         [--meta meta.json] [--truncate] [--json] [--lookup]
//! proposal-actions networks
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};

use proposal_actions_core::{
    network, ActionMetaTable, DecodeOutcome, ProposalRecord, NETWORKS,
};
use proposal_actions_decode::{
    decode_proposal_actions, Classifier, DecodeConfig, NoSignatureSource, SourcifyLookup,
};

mod report;

#[derive(Parser)]
#[command(
    name = "proposal-actions",
    about = "Decode and review the actions embedded in a DAO proposal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a proposal record and print its actions
    Decode(DecodeArgs),

    /// List supported networks
    Networks,
}

#[derive(Args)]
struct DecodeArgs {
    /// Proposal record JSON (proposalId, proposalType, proposalData, txHash, target)
    #[arg(long)]
    proposal: PathBuf,
    /// Hex chain id, e.g. 0x1 or 0x64
    #[arg(long)]
    chain: String,
    /// Decoder config JSON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Action metadata table JSON, keyed by proposal type
    #[arg(long)]
    meta: Option<PathBuf>,
    /// Shorten addresses
    #[arg(long)]
    truncate: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Resolve unknown selectors through Sourcify
    #[arg(long)]
    lookup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Decode(args) => run_decode(args).await,
        Commands::Networks => list_networks(),
    }
}

async fn run_decode(args: DecodeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => DecodeConfig::load(path)?,
        None => DecodeConfig::default(),
    };
    if args.truncate {
        config.truncate_addresses = true;
    }

    let proposal: ProposalRecord = read_json(&args.proposal)?;
    let meta_table: Option<ActionMetaTable> = match &args.meta {
        Some(path) => Some(read_json(path)?),
        None => None,
    };
    let decoder = config.build_decoder()?;

    let outcome = if args.lookup || config.sourcify_enabled {
        let source = SourcifyLookup::from_config(&config);
        decode_proposal_actions(&decoder, &source, &args.chain, &proposal, meta_table.as_ref())
            .await
    } else {
        decode_proposal_actions(
            &decoder,
            &NoSignatureSource,
            &args.chain,
            &proposal,
            meta_table.as_ref(),
        )
        .await
    };

    let DecodeOutcome::Ready(actions) = &outcome else {
        println!("Actions not available: unsupported chain {}", args.chain);
        return Ok(());
    };
    let network = network(&args.chain)?;

    let classifier = Classifier::new(config.classifier.clone());
    let report = report::build_report(
        &proposal,
        network,
        actions,
        &classifier,
        &config.render_options(),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report).wrap_err("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        report::write_text(&report, &mut out)?;
    }
    Ok(())
}

fn list_networks() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for network in NETWORKS {
        writeln!(
            out,
            "{:<10} {:<14} {:<6} {}",
            network.chain_id, network.name, network.symbol, network.explorer
        )?;
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}
