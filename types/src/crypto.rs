// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Abstract interfaces to the accumulator cryptography and key material.
//! The algebra itself (accumulator group operations, the signature scheme,
//! witness arithmetic) is an external collaborator; this subsystem only
//! moves its outputs around and enforces the chain invariants it can check
//! without key material.

use crate::{
    accumulator::{Accumulator, SignedAccumulator},
    attribute::RevocationAttribute,
    error::RevocationError,
    events::Event,
    identifiers::IssuerIdentifier,
    issuance::IssuanceRecord,
    update::Update,
    witness::Witness,
};
use bytes::Bytes;
use std::fmt;

/// Generation number of an issuer's revocation key pair. An authority may
/// rotate keys while keeping the streams of older generations live.
pub type KeyCounter = u32;

/// Public half of a revocation key pair. `material` is opaque to this
/// subsystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevocationPublicKey {
    pub issuer: IssuerIdentifier,
    pub counter: KeyCounter,
    pub material: Bytes,
}

/// Private half of a revocation key pair. Owned by the key provider and
/// borrowed read-only; it never crosses the external boundary unsigned and
/// never appears in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct RevocationPrivateKey {
    pub issuer: IssuerIdentifier,
    pub counter: KeyCounter,
    pub material: Bytes,
}

impl fmt::Debug for RevocationPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationPrivateKey")
            .field("issuer", &self.issuer)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

/// The accumulator algebra, consumed as a collaborator.
pub trait AccumulatorAlgebra: Send + Sync {
    /// Generates a fresh accumulator for `sk` wrapped in an update carrying
    /// only the genesis event.
    fn new_accumulator(&self, sk: &RevocationPrivateKey) -> Result<Update, RevocationError>;

    /// Removes `attr` from the accumulator, producing the advanced
    /// accumulator and the event recording the removal, chained to
    /// `parent`.
    fn remove(
        &self,
        accumulator: &Accumulator,
        sk: &RevocationPrivateKey,
        attr: &RevocationAttribute,
        parent: &Event,
    ) -> Result<(Accumulator, Event), RevocationError>;

    /// Signs the accumulator with the issuer's revocation private key.
    fn sign(
        &self,
        accumulator: &Accumulator,
        sk: &RevocationPrivateKey,
    ) -> Result<SignedAccumulator, RevocationError>;

    /// Verifies the signed message against `pk` and deserializes the
    /// accumulator it carries.
    fn verify_signed(
        &self,
        signed: &SignedAccumulator,
        pk: &RevocationPublicKey,
    ) -> Result<Accumulator, RevocationError>;

    /// Advances the witness through the events of the given updates,
    /// re-checking each signed accumulator against the keystore. Returns
    /// whether the witness changed.
    fn update_witness(
        &self,
        witness: &mut Witness,
        updates: &[Update],
        keystore: &dyn Keystore,
    ) -> Result<bool, RevocationError>;

    /// Signs the canonical CBOR encoding of the record with the issuer's
    /// revocation ECDSA key (deterministic), producing the envelope POSTed
    /// to a remote authority.
    fn seal_issuance_record(
        &self,
        sk: &RevocationPrivateKey,
        record: &IssuanceRecord,
    ) -> Result<Vec<u8>, RevocationError>;

    /// Verifies and opens an envelope produced by `seal_issuance_record`.
    fn open_issuance_record(
        &self,
        pk: &RevocationPublicKey,
        envelope: &[u8],
    ) -> Result<IssuanceRecord, RevocationError>;
}

/// Provider of revocation key material, typically backed by the scheme
/// configuration.
pub trait RevocationKeys: Send + Sync {
    fn public_key(
        &self,
        issuer: &IssuerIdentifier,
        counter: KeyCounter,
    ) -> Result<RevocationPublicKey, RevocationError>;

    fn private_key(
        &self,
        issuer: &IssuerIdentifier,
        counter: KeyCounter,
    ) -> Result<RevocationPrivateKey, RevocationError>;

    /// The private key with the highest counter for `issuer`.
    fn private_key_latest(
        &self,
        issuer: &IssuerIdentifier,
    ) -> Result<RevocationPrivateKey, RevocationError>;
}

/// Public-key lookup bound to a single issuer, handed to witness updating
/// on the holder side.
pub trait Keystore: Send + Sync {
    fn public_key(&self, counter: KeyCounter) -> Result<RevocationPublicKey, RevocationError>;
}
