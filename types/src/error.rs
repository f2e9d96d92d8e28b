// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    crypto::KeyCounter,
    identifiers::{CredentialTypeIdentifier, IssuerIdentifier},
};
use thiserror::Error;

/// The error surface shared by every revocation component. `Storage` and
/// `AllServersFailed` are the transient kinds and the only ones a caller may
/// retry; cryptographic verification failures (`InvalidUpdate`) are final.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RevocationError {
    #[error("revocation state not found")]
    StateNotFound,

    #[error("revocation already enabled for {0}")]
    AlreadyEnabled(CredentialTypeIdentifier),

    #[error("invalid revocation update: {0}")]
    InvalidUpdate(String),

    #[error("unknown public key: {issuer}-{counter}")]
    UnknownPublicKey {
        issuer: IssuerIdentifier,
        counter: KeyCounter,
    },

    #[error("unknown private key: {issuer}-{counter}")]
    UnknownPrivateKey {
        issuer: IssuerIdentifier,
        counter: KeyCounter,
    },

    #[error("credential type {0} does not support revocation")]
    UnsupportedCredentialType(CredentialTypeIdentifier),

    #[error("cannot revoke {0}: not the revocation server for this credential type")]
    NotRevocationServer(CredentialTypeIdentifier),

    #[error("invalid revocation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("illegal event interval [{from}, {to})")]
    IllegalInterval { from: u64, to: u64 },

    #[error("nonrevocation witness could not be fully updated")]
    IncompleteUpdate,

    #[error("revocation storage failure: {0}")]
    Storage(String),

    #[error("revocation request failed: {0}")]
    Network(String),

    #[error("all revocation servers failed: [{}]", .errors.join("; "))]
    AllServersFailed { errors: Vec<String> },
}
