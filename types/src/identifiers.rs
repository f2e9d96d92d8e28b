// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::RevocationError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr, sync::Arc};

/// Identifies a credential type within a scheme, e.g. `pbdf.gemeente.address`.
/// The first two dot-separated segments identify the issuer.
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CredentialTypeIdentifier(Arc<str>);

/// Identifies an issuer within a scheme, e.g. `pbdf.gemeente`.
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct IssuerIdentifier(Arc<str>);

impl CredentialTypeIdentifier {
    /// The issuer that manages this credential type (and holds its
    /// revocation keys).
    pub fn issuer_identifier(&self) -> IssuerIdentifier {
        let issuer = match self.0.rmatch_indices('.').next() {
            Some((offset, _)) => &self.0[..offset],
            None => &self.0[..],
        };
        IssuerIdentifier(Arc::from(issuer))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl IssuerIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CredentialTypeIdentifier {
    type Err = RevocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.split('.').count() != 3 || s.split('.').any(str::is_empty) {
            return Err(RevocationError::InvalidConfiguration(format!(
                "malformed credential type identifier: {s:?}"
            )));
        }
        Ok(Self(Arc::from(s)))
    }
}

impl FromStr for IssuerIdentifier {
    type Err = RevocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.split('.').count() != 2 || s.split('.').any(str::is_empty) {
            return Err(RevocationError::InvalidConfiguration(format!(
                "malformed issuer identifier: {s:?}"
            )));
        }
        Ok(Self(Arc::from(s)))
    }
}

macro_rules! impl_identifier_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

impl_identifier_traits!(CredentialTypeIdentifier);
impl_identifier_traits!(IssuerIdentifier);
