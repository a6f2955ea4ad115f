//! Hashing primitives used to derive identities.

use blake2::{
    digest::{Update, VariableOutput},
    VarBlake2b,
};

/// The number of bytes in a BLAKE2b-256 digest.
pub const BLAKE2B_DIGEST_LENGTH: usize = 32;

/// Computes a BLAKE2b-256 digest of `data`.
pub fn blake2b<T: AsRef<[u8]>>(data: T) -> [u8; BLAKE2B_DIGEST_LENGTH] {
    let mut result = [0; BLAKE2B_DIGEST_LENGTH];
    // NOTE: Assumed safe as `BLAKE2B_DIGEST_LENGTH` is a valid value for a hasher
    let mut hasher = VarBlake2b::new(BLAKE2B_DIGEST_LENGTH).expect("should create hasher");

    hasher.update(data);
    hasher.finalize_variable(|slice| {
        result.copy_from_slice(slice);
    });
    result
}
