use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier as-is. Identifiers handed over by external
            /// collaborators are trusted; no validation is performed.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse a user-supplied identifier, rejecting blank input.
            pub fn parse(s: &str) -> Result<Self, TypeError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(TypeError::EmptyIdentifier { kind: $kind });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the identifier is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Stable identifier for a rider or driver.
    ///
    /// Issued by the identity provider; the credit ledger keys wallets and
    /// weekly counters by it and never authenticates it.
    UserId,
    "user",
    "UserId"
);

string_id!(
    /// Identifier of a ride record, issued by the ride source.
    RideId,
    "ride",
    "RideId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = UserId::parse("  rider-1 ").unwrap();
        assert_eq!(id.as_str(), "rider-1");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(
            UserId::parse("   "),
            Err(TypeError::EmptyIdentifier { kind: "user" })
        );
        assert_eq!(
            RideId::parse(""),
            Err(TypeError::EmptyIdentifier { kind: "ride" })
        );
    }

    #[test]
    fn new_does_not_validate() {
        assert!(UserId::new("").is_empty());
    }

    #[test]
    fn display_and_debug() {
        let id = RideId::from("ride-7");
        assert_eq!(id.to_string(), "ride-7");
        assert_eq!(format!("{id:?}"), "RideId(ride-7)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::from("driver-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"driver-1\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn ordering_follows_string_order() {
        assert!(UserId::from("a") < UserId::from("b"));
    }
}
