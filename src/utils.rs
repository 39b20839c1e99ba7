use sha2::{Digest as ShaDigest, Sha256};

// Hashing functions
/// Takes in data and returns a sha256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// This function will double sha256 hash the input
pub fn double_sha256(input: &[u8]) -> [u8; 32] {
    let first_hash = sha256(input);
    sha256(&first_hash)
}

/// This function will reverse a copy of the bytes and return it as a hex string
pub fn reverse_bytes(bytes: &[u8]) -> String {
    let mut reversed = bytes.to_vec();
    reversed.reverse();
    hex::encode(reversed)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // sha256d of the empty string
        assert_eq!(
            hex::encode(double_sha256(&[])),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_reverse_bytes_leaves_input_alone() {
        let bytes = [0x01_u8, 0x02, 0x03];
        assert_eq!(reverse_bytes(&bytes), "030201");
        assert_eq!(bytes, [0x01, 0x02, 0x03]);
    }
}
