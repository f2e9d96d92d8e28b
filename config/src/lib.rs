// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Configuration surface of the revocation subsystem: per credential type
//! revocation settings and their load-time validation, global timing
//! parameters, the credential type registry, and a key registry backing the
//! key provider interface.

mod credential_types;
mod keys;
mod parameters;
mod settings;

#[cfg(test)]
mod tests;

pub use credential_types::{CredentialTypeInfo, CredentialTypeRegistry};
pub use keys::{IssuerKeystore, KeyRegistry};
pub use parameters::{RevocationParameters, DEFAULT_TOLERANCE_SECS, MIN_TOLERANCE_SECS};
pub use settings::{RevocationMode, RevocationSetting, RevocationSettings};
