//! Demo: Book Replay with Checksum Verification
//!
//! Showcases: batch application, depth eviction, checksum bytes fed to CRC32
//!
//! Input is one JSON object per line:
//!
//! ```text
//! {"asks": [["5541.30000", "2.50700000", "1534614248.123678"]], "bids": [], "checksum": 1234567890}
//! ```
//!
//! Run: cargo run --bin replay -- --input book.jsonl --price-precision 5 --volume-precision 8

use clap::Parser;
use colored::*;
use levelbook::OrderBook;
use levelbook_types::LevelUpdate;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay order book updates and verify checksums")]
struct Args {
    /// Levels kept per side
    #[arg(long, default_value_t = 10)]
    depth: usize,

    /// Price decimal places for the pair
    #[arg(long, default_value_t = 1)]
    price_precision: u32,

    /// Volume decimal places for the pair
    #[arg(long, default_value_t = 8)]
    volume_precision: u32,

    /// Newline-delimited JSON file (stdin if omitted)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print both sides after every message
    #[arg(long)]
    render: bool,
}

/// One feed message worth of updates
#[derive(Debug, Deserialize)]
struct BookMessage {
    #[serde(default, alias = "a", alias = "as")]
    asks: Vec<LevelUpdate>,
    #[serde(default, alias = "b", alias = "bs")]
    bids: Vec<LevelUpdate>,
    #[serde(default, alias = "c", deserialize_with = "deserialize_checksum")]
    checksum: Option<u32>,
}

/// Kraken v1 sends the checksum as a string, v2 as a number
fn deserialize_checksum<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    let text = match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(StringOrNumber::Number(n)) => n.to_string(),
        Some(StringOrNumber::String(s)) => s,
    };
    text.parse().map(Some).map_err(D::Error::custom)
}

#[derive(Debug, Default)]
struct Tally {
    messages: u64,
    verified: u64,
    mismatches: u64,
    rejected: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let book = OrderBook::new(args.depth, args.price_precision, args.volume_precision)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  BOOK REPLAY".cyan().bold());
    println!(
        "{}",
        format!(
            "  depth {}  price precision {}  volume precision {}",
            args.depth, args.price_precision, args.volume_precision
        )
        .cyan()
    );
    println!("{}", "═".repeat(65).cyan());

    let mut tally = Tally::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let message: BookMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no + 1, e);
                tally.rejected += 1;
                continue;
            }
        };
        tally.messages += 1;

        if let Err(e) = book.apply(message.asks, message.bids) {
            // A half-applied message leaves the book unusable until the next snapshot
            println!("  {:>6}  {}  {}", line_no + 1, "REJECTED".red(), e);
            book.clear();
            tally.rejected += 1;
            continue;
        }

        let computed = crc32fast::hash(&book.checksum_bytes());
        debug!("Line {} computed checksum {}", line_no + 1, computed);

        match message.checksum {
            Some(expected) if expected == computed => {
                tally.verified += 1;
                println!("  {:>6}  {:>10}  {}", line_no + 1, computed, "VALID".green());
            }
            Some(expected) => {
                tally.mismatches += 1;
                println!(
                    "  {:>6}  {:>10}  {} (expected {})",
                    line_no + 1,
                    computed,
                    "MISMATCH".red().bold(),
                    expected
                );
                book.clear();
            }
            None => println!("  {:>6}  {:>10}", line_no + 1, computed),
        }

        if args.render {
            print!("{}", "  asks\n".yellow());
            print!("{}", book.asks().render());
            print!("{}", "  bids\n".yellow());
            print!("{}", book.bids().render());
        }
    }

    println!("{}", "═".repeat(65).cyan());
    println!("  {}", "INTEGRITY REPORT".white().bold());
    println!("  messages   {}", tally.messages);
    println!("  verified   {}", tally.verified.to_string().green());
    println!("  mismatches {}", tally.mismatches.to_string().red());
    println!("  rejected   {}", tally.rejected);
    if let (Some(spread), Some(mid)) = (book.spread(), book.mid_price()) {
        println!("  spread     {}  mid {}", spread, mid);
    }

    Ok(())
}
