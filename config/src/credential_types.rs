// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use revocation_types::{
    params::DEFAULT_UPDATE_EVENT_COUNT, CredentialTypeIdentifier, RevocationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Revocation metadata of a credential type, as published in its scheme. A
/// type supports revocation when its scheme lists at least one revocation
/// server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialTypeInfo {
    /// Authority endpoints serving updates for this type, in failover
    /// order.
    pub revocation_servers: Vec<String>,
    /// How many trailing events to attach to session requests.
    pub revocation_update_count: u64,
}

impl Default for CredentialTypeInfo {
    fn default() -> Self {
        Self {
            revocation_servers: Vec::new(),
            revocation_update_count: DEFAULT_UPDATE_EVENT_COUNT,
        }
    }
}

impl CredentialTypeInfo {
    pub fn revocation_supported(&self) -> bool {
        !self.revocation_servers.is_empty()
    }
}

/// The credential types known to this host, keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct CredentialTypeRegistry {
    types: HashMap<CredentialTypeIdentifier, CredentialTypeInfo>,
}

impl CredentialTypeRegistry {
    pub fn new(types: HashMap<CredentialTypeIdentifier, CredentialTypeInfo>) -> Self {
        Self { types }
    }

    pub fn get(&self, id: &CredentialTypeIdentifier) -> Option<&CredentialTypeInfo> {
        self.types.get(id)
    }

    /// The metadata for `id`, failing unless the type is known and supports
    /// revocation.
    pub fn expect_revocation(
        &self,
        id: &CredentialTypeIdentifier,
    ) -> Result<&CredentialTypeInfo, RevocationError> {
        self.types
            .get(id)
            .filter(|info| info.revocation_supported())
            .ok_or_else(|| RevocationError::UnsupportedCredentialType(id.clone()))
    }
}
