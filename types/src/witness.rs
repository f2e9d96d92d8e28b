// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{accumulator::SignedAccumulator, attribute::RevocationAttribute};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A holder's non-revocation witness for one credential: the value `u` that,
/// combined with the credential's revocation attribute, proves membership in
/// the accumulator at `index`. The witness algebra lives behind
/// [`crate::crypto::AccumulatorAlgebra`]; this type only carries its state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Witness {
    pub index: u64,
    pub signed_accumulator: SignedAccumulator,
    pub u: RevocationAttribute,
    /// A previously computed non-revocation proof. Only valid against the
    /// accumulator the witness was at when it was cached; advancing the
    /// witness discards it.
    #[serde(skip)]
    cached_proof: Option<Bytes>,
}

impl Witness {
    pub fn new(index: u64, signed_accumulator: SignedAccumulator, u: RevocationAttribute) -> Self {
        Self {
            index,
            signed_accumulator,
            u,
            cached_proof: None,
        }
    }

    pub fn cache_proof(&mut self, proof: Bytes) {
        self.cached_proof = Some(proof);
    }

    pub fn cached_proof(&self) -> Option<&Bytes> {
        self.cached_proof.as_ref()
    }

    pub fn discard_cached_proof(&mut self) {
        self.cached_proof = None;
    }
}
