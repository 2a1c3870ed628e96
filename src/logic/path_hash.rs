use crate::utils::Asset;
use alloy_primitives::hex;
use serde::{Serialize, Serializer};
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Display};

/// Identity of a payment path: sha256 over its assets in trade order and both amounts.
///
/// Two paths with the same hash trade the same assets in the same order for the same amounts.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct PathHash([u8; 32]);

impl PathHash {
    pub fn compute<'a>(assets: impl IntoIterator<Item = &'a Asset>, source_amount: i64, destination_amount: i64) -> Self {
        let mut hasher = Sha256::new();
        for asset in assets {
            Update::update(&mut hasher, asset.to_string().as_bytes());
            // asset strings never contain NUL
            Update::update(&mut hasher, &[0u8]);
        }
        Update::update(&mut hasher, &source_amount.to_be_bytes());
        Update::update(&mut hasher, &destination_amount.to_be_bytes());

        PathHash(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for PathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode_prefixed(self.0))
    }
}

impl Debug for PathHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PathHash({self})")
    }
}

/// Serialized as a `0x` prefixed hex string. Paths recompute their hash when deserialized, so
/// there is no way back.
impl Serialize for PathHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
