//! Account, group, and hash primitives shared by all dispatch stages.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Byte length of an account address (20 identity bytes plus a kind byte).
pub const ADDRESS_SIZE: usize = 21;
/// Byte length of a consensus-group id.
pub const GID_SIZE: usize = 10;
/// Byte length of a token type id.
pub const TOKEN_ID_SIZE: usize = 10;
/// Byte length of a block or data hash.
pub const HASH_SIZE: usize = 32;

macro_rules! bytes_newtype {
    ($(#[$doc:meta])* $name:ident, $size:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $size]);

        impl $name {
            pub const fn from_bytes(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Parse from a hex string of exactly the right length.
            pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
                let mut bytes = [0u8; $size];
                hex::decode_to_slice(text, &mut bytes)?;
                Ok($name(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct HexVisitor;

                impl<'de> Visitor<'de> for HexVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a {}-byte hex string", $size)
                    }

                    fn visit_str<E: de::Error>(self, value: &str) -> Result<$name, E> {
                        $name::from_hex(value).map_err(de::Error::custom)
                    }
                }

                deserializer.deserialize_str(HexVisitor)
            }
        }
    };
}

bytes_newtype!(
    /// Account address, used for both senders and contract receivers.
    Address,
    ADDRESS_SIZE
);
bytes_newtype!(
    /// Consensus-group id binding a set of contract addresses to one scheduler.
    Gid,
    GID_SIZE
);
bytes_newtype!(
    /// Token type id carried by value transfers.
    TokenId,
    TOKEN_ID_SIZE
);
bytes_newtype!(
    /// 32-byte hash of a block or of an arbitrary byte-list digest.
    Hash,
    HASH_SIZE
);

/// Deterministic hash over a list of byte slices, digested in order.
///
/// Used for pair-blacklist keys and queue dedup keys; the same inputs always
/// produce the same [`Hash`] so keys survive restarts and cross-node replays.
pub fn data_hash(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}
