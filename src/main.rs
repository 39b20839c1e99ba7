use std::process;

use anyhow::Result;
use clap::Parser;

/// Decodes a raw transaction
#[derive(Parser, Debug)]
#[clap(name = "Bitcoin Transaction Decoder", version, about)]
struct Args {
    /// Raw transaction hex
    #[clap(value_name = "RAW_TRANSACTION")]
    raw_transaction: String,

    /// Print the JSON on a single line
    #[clap(long)]
    compact: bool,
}

fn run(args: Args) -> Result<()> {
    let json = tx_decoder::run(&args.raw_transaction, !args.compact)?;
    println!("{}", json);
    Ok(())
}

fn main() {
    // Logs go to stderr, controlled by RUST_LOG
    env_logger::init();

    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
