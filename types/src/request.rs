// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{crypto::KeyCounter, identifiers::CredentialTypeIdentifier, update::Update};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per credential type parameters of a nonrevocation proof request. The
/// requestor fills `updates` with the latest update per key generation so
/// the holder can advance its witness without contacting the authority.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NonRevocationParameters {
    /// Maximum age in seconds of the accumulator the proof may be produced
    /// against; 0 means the verifier's configured default.
    #[serde(default)]
    pub tolerance: u64,
    #[serde(default)]
    pub updates: BTreeMap<KeyCounter, Update>,
}

/// The revocation-related portion of a session request: one entry per
/// credential type for which a nonrevocation proof is demanded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevocationRequest {
    #[serde(default)]
    pub revocation: BTreeMap<CredentialTypeIdentifier, NonRevocationParameters>,
}
