//! Decoder for raw Bitcoin transactions in both the legacy and the segwit
//! wire format.
//!
//! ```no_run
//! let tx = tx_decoder::decode_hex("0200000000...").unwrap();
//! println!("{}", tx.txid());
//! ```

pub mod cursor;
pub mod encoding;
pub mod error;
pub mod transactions;
pub mod utils;

use anyhow::Context;
use log::{debug, info};

pub use crate::cursor::Cursor;
pub use crate::encoding::{CompactSize, Decodable, Encodable};
pub use crate::error::{Error, Result};
pub use crate::transactions::{Amount, Transaction, TxIn, TxOut, Txid, Witness};

/// Decodes a transaction from raw bytes.
///
/// Bytes left over after the lock time are ignored.
pub fn decode(bytes: &[u8]) -> Result<Transaction> {
    let mut cursor = Cursor::new(bytes);
    let transaction = Transaction::consensus_decode(&mut cursor)?;
    if !cursor.is_empty() {
        debug!(
            "{} trailing bytes after lock time at offset {}",
            cursor.remaining(),
            cursor.position()
        );
    }
    Ok(transaction)
}

/// Decodes a transaction from a hex string.
///
/// The string must be hex and nothing else; surrounding whitespace is an error.
pub fn decode_hex(raw_transaction_hex: &str) -> Result<Transaction> {
    let transaction_bytes = hex::decode(raw_transaction_hex)?;
    debug!("decoding {} bytes", transaction_bytes.len());
    decode(&transaction_bytes)
}

/// Renders a decoded transaction as JSON
pub fn render(transaction: &Transaction, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(transaction)
    } else {
        serde_json::to_string(transaction)
    }
}

/// Hex in, JSON out
pub fn run(raw_transaction_hex: &str, pretty: bool) -> anyhow::Result<String> {
    let transaction = decode_hex(raw_transaction_hex)?;
    info!("Transaction ID: {}", transaction.txid());
    render(&transaction, pretty).context("failed to render transaction as JSON")
}
