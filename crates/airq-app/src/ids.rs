// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! sequence_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

sequence_id!(RequestSeq);

/// Catalog key for a location, e.g. `paris` or `new-york`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form of the id, used when no catalog name is known.
    pub fn fallback_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationId, RequestSeq};

    #[test]
    fn request_seq_orders_and_advances() {
        let first = RequestSeq::new(1);
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(RequestSeq::new(u64::MAX).next().get(), u64::MAX);
    }

    #[test]
    fn fallback_name_capitalizes_first_letter_only() {
        assert_eq!(LocationId::from("paris").fallback_name(), "Paris");
        assert_eq!(LocationId::from("new-york").fallback_name(), "New-york");
        assert_eq!(LocationId::from("").fallback_name(), "");
    }
}
