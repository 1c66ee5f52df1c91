//! Identifier types for the stock ledger.
//!
//! Products and orders carry numeric identifiers assigned by the host
//! commerce platform; ledger rows and raw events use ULIDs so their store
//! keys sort chronologically.
//!
//! # Macro-based ID Types
//!
//! The `numeric_id_type!` macro reduces boilerplate for the host-assigned
//! numeric identifiers, ensuring consistent serialization, parsing, and
//! display behavior.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Macro to define a host-assigned numeric identifier type.
///
/// Generates a newtype wrapper around `u64` with implementations for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (transparent, as a number)
/// - `FromStr`, `Display`, `Debug`
/// - `to_be_bytes` for lexicographically ordered store keys
macro_rules! numeric_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create an identifier from its raw numeric value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Return the raw numeric value.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Return the big-endian byte encoding (8 bytes).
            ///
            /// Big-endian keeps numeric order and lexicographic key order
            /// aligned.
            #[must_use]
            pub const fn to_be_bytes(&self) -> [u8; 8] {
                self.0.to_be_bytes()
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.parse::<u64>().map_err(|_| IdError::InvalidNumeric)?;
                Ok(Self(value))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id_type!(
    ProductId,
    "A product identifier, assigned by the host commerce platform.\n\nVariation products roll up to their parent's `ProductId` in ledger rows."
);
numeric_id_type!(
    OrderId,
    "An order identifier, assigned by the host commerce platform.\n\nOrder ids are strictly increasing, which is what makes the rebuild cursor resumable."
);

/// Macro to define a ULID-based identifier type for store-generated records.
///
/// ULIDs are time-ordered, so these ids double as chronological store keys.
macro_rules! ulid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Ulid);

        impl $name {
            /// Generate a new identifier with the current timestamp.
            #[must_use]
            pub fn generate() -> Self {
                Self(Ulid::new())
            }

            /// Return the bytes of the ULID (16 bytes).
            #[must_use]
            pub fn to_bytes(&self) -> [u8; 16] {
                self.0.to_bytes()
            }

            /// Create an identifier from bytes.
            ///
            /// # Errors
            ///
            /// Returns an error if the bytes are invalid.
            pub fn from_bytes(bytes: [u8; 16]) -> Result<Self, IdError> {
                Ok(Self(Ulid::from_bytes(bytes)))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
                Ok(Self(ulid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

ulid_id_type!(
    MovementId,
    "A ledger row identifier using ULID for time-ordering."
);
ulid_id_type!(
    EventId,
    "A raw stock event identifier using ULID for time-ordering."
);

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid numeric identifier.
    #[error("invalid numeric identifier")]
    InvalidNumeric,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,
}
