use std::fmt;
use std::io::{self, Write};

use log::{debug, trace};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::cursor::Cursor;
use crate::encoding::{decode_list, encode_list, serialize, Decodable, Encodable};
use crate::error::{Error, Result};
use crate::utils::{double_sha256, reverse_bytes};

/// Satoshis per bitcoin, used only when rendering amounts
pub const SATS_PER_BTC: f64 = 100_000_000.0;

// Transaction struct holding a fully decoded transaction and its txid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: u32,
    inputs: Vec<TxIn>,
    outputs: Vec<TxOut>,
    lock_time: u32,
    txid: Txid,
}

impl Transaction {
    /// Builds a transaction and computes its txid over the legacy pre-image
    pub fn new(version: u32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, lock_time: u32) -> Self {
        let mut tx = Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            txid: Txid([0; 32]),
        };
        tx.txid = Txid::from_preimage(&tx.encode_legacy());
        tx
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    /// True when at least one input carries witness data
    pub fn is_segwit(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Serializes version, inputs without witness, outputs and lock time.
    ///
    /// This is the pre-image of the txid, whatever format the transaction
    /// was originally decoded from.
    pub fn encode_legacy(&self) -> Vec<u8> {
        serialize(self)
    }

    /// Full wire serialization, with marker, flag and witnesses when any
    /// input has a witness.
    pub fn encode_with_witness(&self) -> Vec<u8> {
        if !self.is_segwit() {
            return self.encode_legacy();
        }
        let mut buf = Vec::new();
        // Witness counts are capped at construction, so only the writer could fail
        self.encode_segwit(&mut buf)
            .expect("in-memory writers don't error");
        buf
    }

    /// Double sha256 of the full serialization, equal to the txid for legacy transactions
    pub fn wtxid(&self) -> Txid {
        Txid::from_preimage(&self.encode_with_witness())
    }

    fn encode_segwit<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let mut len = self.version.consensus_encode(w)?;
        // Marker is always 00 and flag is always 01
        len += 0u8.consensus_encode(w)?;
        len += 1u8.consensus_encode(w)?;
        len += encode_list(&self.inputs, w)?;
        len += encode_list(&self.outputs, w)?;
        for input in &self.inputs {
            len += input.witness.consensus_encode(w)?;
        }
        len += self.lock_time.consensus_encode(w)?;
        Ok(len)
    }
}

impl Encodable for Transaction {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let mut len = self.version.consensus_encode(w)?;
        len += encode_list(&self.inputs, w)?;
        len += encode_list(&self.outputs, w)?;
        len += self.lock_time.consensus_encode(w)?;
        Ok(len)
    }
}

impl Decodable for Transaction {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        let version = u32::consensus_decode(cursor)?;
        let inputs = decode_list::<UnsignedTxIn>(cursor)?;

        // non-segwit
        if !inputs.is_empty() {
            debug!("legacy transaction, version {} with {} inputs", version, inputs.len());
            let outputs = decode_list::<TxOut>(cursor)?;
            let lock_time = u32::consensus_decode(cursor)?;
            let inputs = inputs
                .into_iter()
                .map(|input| input.with_witness(Witness::new()))
                .collect();
            return Ok(Transaction::new(version, inputs, outputs, lock_time));
        }

        // An empty input list can only be the segwit marker, the next byte is the flag
        let segwit_flag = u8::consensus_decode(cursor)?;
        if segwit_flag != 1 {
            return Err(Error::UnsupportedSegwitFlag(segwit_flag));
        }

        let inputs = decode_list::<UnsignedTxIn>(cursor)?;
        let outputs = decode_list::<TxOut>(cursor)?;
        debug!(
            "segwit transaction, version {} with {} inputs and {} outputs",
            version,
            inputs.len(),
            outputs.len()
        );

        let witnesses = inputs
            .iter()
            .map(|_| Witness::consensus_decode(cursor))
            .collect::<Result<Vec<_>>>()?;

        // Also rejects a flagged transaction whose real input list is empty
        if witnesses.iter().all(Witness::is_empty) {
            return Err(Error::WitnessFlagButNoWitnessData);
        }

        let lock_time = u32::consensus_decode(cursor)?;
        let inputs = inputs
            .into_iter()
            .zip(witnesses)
            .map(|(input, witness)| input.with_witness(witness))
            .collect();

        Ok(Transaction::new(version, inputs, outputs, lock_time))
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tx = s.serialize_struct("Transaction", 5)?;
        tx.serialize_field("transaction_id", &self.txid)?;
        tx.serialize_field("version", &self.version)?;
        tx.serialize_field("inputs", &self.inputs)?;
        tx.serialize_field("outputs", &self.outputs)?;
        tx.serialize_field("locktime", &self.lock_time)?;
        tx.end()
    }
}

/// A double sha256 digest kept in hash byte order.
///
/// Only `Display` and JSON output show it reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    pub fn from_bytes(bytes: [u8; 32]) -> Txid {
        Txid(bytes)
    }

    pub fn from_preimage(preimage: &[u8]) -> Txid {
        Txid(double_sha256(preimage))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&reverse_bytes(&self.0))
    }
}

impl Serialize for Txid {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl Decodable for Txid {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        Ok(Txid(<[u8; 32]>::consensus_decode(cursor)?))
    }
}

impl Encodable for Txid {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        self.0.consensus_encode(w)
    }
}

// TxIn struct to store the transaction input details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub previous_txid: Txid,
    pub previous_vout: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub witness: Witness,
}

// Input fields as they appear on the wire, before any witness is known
#[derive(Debug)]
struct UnsignedTxIn {
    previous_txid: Txid,
    previous_vout: u32,
    script_sig: Vec<u8>,
    sequence: u32,
}

impl UnsignedTxIn {
    fn with_witness(self, witness: Witness) -> TxIn {
        TxIn {
            previous_txid: self.previous_txid,
            previous_vout: self.previous_vout,
            script_sig: self.script_sig,
            sequence: self.sequence,
            witness,
        }
    }
}

impl Decodable for UnsignedTxIn {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        let input = UnsignedTxIn {
            previous_txid: Txid::consensus_decode(cursor)?,
            previous_vout: u32::consensus_decode(cursor)?,
            script_sig: Vec::<u8>::consensus_decode(cursor)?,
            sequence: u32::consensus_decode(cursor)?,
        };
        trace!("input {}:{}", input.previous_txid, input.previous_vout);
        Ok(input)
    }
}

// The witness never goes into the legacy encoding
impl Encodable for TxIn {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let mut len = self.previous_txid.consensus_encode(w)?;
        len += self.previous_vout.consensus_encode(w)?;
        len += self.script_sig.consensus_encode(w)?;
        len += self.sequence.consensus_encode(w)?;
        Ok(len)
    }
}

impl Serialize for TxIn {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut txin = s.serialize_struct("TxIn", 4)?;
        txin.serialize_field("txid", &self.previous_txid)?;
        txin.serialize_field("vout", &self.previous_vout)?;

        if self.witness.is_empty() {
            txin.serialize_field("scriptSig", &hex::encode(&self.script_sig))?;
        } else {
            txin.serialize_field("txinwitness", &self.witness)?;
        }

        txin.serialize_field("sequence", &self.sequence)?;
        txin.end()
    }
}

/// Witness stack of a single input.
///
/// The item count goes on the wire as a single byte, both when decoding and
/// when encoding, so a stack holds at most 255 items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    content: Vec<Vec<u8>>,
}

impl Witness {
    pub const MAX_ITEMS: usize = u8::MAX as usize;

    pub fn new() -> Self {
        Witness { content: vec![] }
    }

    /// Fails with `TooManyWitnessItems` when the stack does not fit the one byte count
    pub fn from_items(content: Vec<Vec<u8>>) -> Result<Self> {
        if content.len() > Self::MAX_ITEMS {
            return Err(Error::TooManyWitnessItems(content.len()));
        }
        Ok(Witness { content })
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.content.iter().map(Vec::as_slice)
    }
}

impl Decodable for Witness {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        let count = u8::consensus_decode(cursor)?;
        let mut content = Vec::with_capacity(count as usize);
        for _ in 0..count {
            content.push(Vec::<u8>::consensus_decode(cursor)?);
        }
        trace!("witness with {} items", count);
        Ok(Witness { content })
    }
}

impl Encodable for Witness {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let count = u8::try_from(self.content.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} witness items do not fit a one byte count", self.content.len()),
            )
        })?;
        let mut len = count.consensus_encode(w)?;
        for item in &self.content {
            len += item.consensus_encode(w)?;
        }
        Ok(len)
    }
}

impl Serialize for Witness {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(&hex::encode(item))?;
        }
        seq.end()
    }
}

// TxOut struct stores the transaction output details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub amount: Amount,
    pub script_pubkey: Vec<u8>,
}

impl Decodable for TxOut {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        Ok(TxOut {
            amount: Amount::from_sat(u64::consensus_decode(cursor)?),
            script_pubkey: Vec::<u8>::consensus_decode(cursor)?,
        })
    }
}

impl Encodable for TxOut {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let mut len = self.amount.to_sat().consensus_encode(w)?;
        len += self.script_pubkey.consensus_encode(w)?;
        Ok(len)
    }
}

impl Serialize for TxOut {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut txout = s.serialize_struct("TxOut", 2)?;
        txout.serialize_field("amount", &self.amount)?;
        txout.serialize_field("script_pubkey", &hex::encode(&self.script_pubkey))?;
        txout.end()
    }
}

/// An amount in satoshis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub fn from_sat(satoshi: u64) -> Amount {
        Amount(satoshi)
    }

    pub fn to_sat(self) -> u64 {
        self.0
    }

    pub fn to_btc(self) -> f64 {
        self.0 as f64 / SATS_PER_BTC
    }
}

// Rendered in bitcoin, not satoshis
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_f64(self.to_btc())
    }
}
