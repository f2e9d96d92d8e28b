// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Core data model for the credential revocation subsystem.
//!
//! A revocation authority (RA) maintains, per credential type and revocation
//! key generation, a cryptographic accumulator together with an append-only
//! log of revocation events. Credential holders carry a non-revocation
//! witness against that accumulator and advance it by replaying signed
//! update messages. This crate defines the types that travel between the
//! RA, proxies, requestors and holders, the chain invariants they must
//! satisfy, and the abstract interfaces through which the accumulator
//! cryptography and key material are consumed.

pub mod accumulator;
pub mod attribute;
pub mod crypto;
pub mod error;
pub mod events;
pub mod identifiers;
pub mod issuance;
pub mod params;
pub mod request;
pub mod time;
pub mod update;
pub mod witness;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use accumulator::{Accumulator, SignedAccumulator};
pub use attribute::RevocationAttribute;
pub use crypto::{AccumulatorAlgebra, KeyCounter, Keystore, RevocationKeys};
pub use error::RevocationError;
pub use events::{Event, EventHash, EventList};
pub use identifiers::{CredentialTypeIdentifier, IssuerIdentifier};
pub use issuance::IssuanceRecord;
pub use update::Update;
pub use witness::Witness;
