use thiserror::Error;

/// Everything that can go wrong while turning raw hex into a transaction
#[derive(Debug, Error)]
pub enum Error {
    /// The buffer ran out before a field could be read in full
    #[error("short read at byte {offset}: needed {needed} bytes, {remaining} remaining")]
    ShortRead {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The byte after an empty input count was not the segwit flag 0x01
    #[error("unsupported segwit flag: {0}")]
    UnsupportedSegwitFlag(u8),

    #[error("witness flag set but no witnesses present")]
    WitnessFlagButNoWitnessData,

    /// A witness stack longer than its one byte item count allows
    #[error("too many witness items: {0}, at most 255")]
    TooManyWitnessItems(usize),

    #[error("Hex decoding error: {0}")]
    InvalidHexInput(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, Error>;
