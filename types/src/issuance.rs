// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    attribute::RevocationAttribute, crypto::KeyCounter, identifiers::CredentialTypeIdentifier,
};
use serde::{Deserialize, Serialize};

/// Everything the revocation authority needs to later revoke a credential,
/// recorded at issuance time. Identified by (key, credential type, issuance
/// time); a key may be reused across issuances of the same type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    /// Revocation key chosen by the requestor at issuance, used to refer to
    /// the credential when revoking it.
    pub key: String,
    pub cred_type: CredentialTypeIdentifier,
    /// Issuance time, unix nanoseconds.
    pub issued: i64,
    pub pk_counter: KeyCounter,
    /// The credential's revocation attribute, removed from the accumulator
    /// at revocation.
    pub attr: RevocationAttribute,
    /// Expiry of the credential, unix nanoseconds. Expired records are
    /// garbage collected.
    pub valid_until: i64,
    /// Revocation time, unix nanoseconds; 0 while the credential is not
    /// revoked. Set exactly once.
    pub revoked_at: i64,
}

impl IssuanceRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at != 0
    }
}
