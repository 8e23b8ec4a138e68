use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hashmint_types::Address;

#[derive(Parser)]
#[command(
    name = "hashmint",
    about = "hashmint: proof-of-work collection codec and simulator",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a deploy file with default values
    Init(InitArgs),
    /// Encode a deploy file's initial state
    Storage(StorageArgs),
    /// Encode one operation body
    Message(MessageArgs),
    /// Search for a mine body under the collection's threshold
    Mine(MineArgs),
    /// Apply one operation to a deploy file's state
    Simulate(SimulateArgs),
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(default_value = "collection.toml")]
    pub path: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct StorageArgs {
    pub deploy: PathBuf,
}

#[derive(Args)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub op: Operation,
}

#[derive(Args)]
pub struct MineArgs {
    pub deploy: PathBuf,
    #[arg(long)]
    pub mint_to: Address,
    /// Last valid Unix time of the request
    #[arg(long)]
    pub expire: u32,
    #[arg(long, default_value = "0")]
    pub query_id: u64,
    #[arg(long, default_value_t = hashmint_collection::Solver::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u64,
    /// Seed the random search for reproducible output
    #[arg(long)]
    pub rng_seed: Option<u64>,
}

#[derive(Args)]
pub struct SimulateArgs {
    pub deploy: PathBuf,
    /// Current Unix time seen by the collection
    #[arg(long)]
    pub now: u32,
    #[arg(long)]
    pub sender: Address,
    #[command(subcommand)]
    pub op: Operation,
}

/// One inbound operation, as typed on the command line.
#[derive(Subcommand, Clone, Debug)]
pub enum Operation {
    /// Transfer collection ownership
    ChangeOwner {
        #[arg(long)]
        new_owner: Address,
        #[arg(long, default_value = "0")]
        query_id: u64,
    },
    /// Ask for the royalty parameters
    GetRoyaltyParams {
        #[arg(long, default_value = "0")]
        query_id: u64,
    },
    /// Replace content and royalty parameters
    EditContent {
        #[arg(long)]
        collection_content: String,
        #[arg(long)]
        common_content: String,
        #[arg(long)]
        factor: u16,
        #[arg(long)]
        base: u16,
        #[arg(long)]
        royalty_address: Address,
        #[arg(long, default_value = "0")]
        query_id: u64,
    },
    /// Submit proof of work
    Mine {
        #[arg(long)]
        expire: u32,
        #[arg(long)]
        mint_to: Address,
        /// Primary work value, 64 hex characters
        #[arg(long, value_parser = parse_hash256)]
        data1: [u8; 32],
        #[arg(long, value_parser = parse_u128)]
        seed: u128,
        /// Secondary work value; defaults to data1
        #[arg(long, value_parser = parse_hash256)]
        data2: Option<[u8; 32]>,
        #[arg(long, default_value = "0")]
        query_id: u64,
    },
    /// Double the threshold after an idle period
    RescaleComplexity {
        #[arg(long)]
        expire: u32,
        #[arg(long, default_value = "0")]
        query_id: u64,
    },
}

fn parse_hash256(raw: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|e| e.to_string())?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
}

fn parse_u128(raw: &str) -> Result<u128, String> {
    hashmint_codec::serde_decimal::parse(raw)
        .and_then(|value| u128::try_from(&value).ok())
        .ok_or_else(|| format!("not a 128-bit unsigned integer: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_with_or_without_prefix() {
        let hex64 = "ab".repeat(32);
        assert_eq!(parse_hash256(&hex64).unwrap(), [0xab; 32]);
        assert_eq!(parse_hash256(&format!("0x{hex64}")).unwrap(), [0xab; 32]);
        assert!(parse_hash256("abcd").is_err());
    }

    #[test]
    fn parses_seed_forms() {
        assert_eq!(parse_u128("42").unwrap(), 42);
        assert_eq!(parse_u128("0xff").unwrap(), 255);
        assert!(parse_u128("2^128").is_err());
    }

    #[test]
    fn mine_operation_from_args() {
        let cli = Cli::try_parse_from([
            "hashmint",
            "message",
            "mine",
            "--expire",
            "100",
            "--mint-to",
            &format!("0:{}", "11".repeat(32)),
            "--data1",
            &"22".repeat(32),
            "--seed",
            "7",
        ])
        .unwrap();
        let Command::Message(args) = cli.command else {
            panic!("expected message command");
        };
        let Operation::Mine { data2, seed, .. } = args.op else {
            panic!("expected mine");
        };
        assert_eq!(seed, 7);
        assert!(data2.is_none());
    }
}
