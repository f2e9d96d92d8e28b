// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{attribute::RevocationAttribute, crypto::KeyCounter};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The accumulator value for one (credential type, key generation) stream.
/// `index` counts the events ever applied; `time` is the unix time at which
/// the revocation authority last signed this value. Holders must prove
/// non-revocation against an accumulator no older than the verifier's
/// tolerance, so the authority re-signs periodically even when nothing was
/// revoked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    pub accumulated: RevocationAttribute,
    pub index: u64,
    pub time: i64,
}

/// An accumulator signed by the issuer's revocation private key, as it
/// travels over the wire and into storage. `data` is the signed message
/// produced by the accumulator algebra; it is opaque here and only admitted
/// to the store after `AccumulatorAlgebra::verify_signed` accepts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAccumulator {
    pub data: Bytes,
    pub pk_counter: KeyCounter,
}
