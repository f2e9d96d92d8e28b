// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::RevocationAuthority;
use revocation_config::{
    CredentialTypeInfo, CredentialTypeRegistry, KeyRegistry, RevocationMode,
    RevocationParameters, RevocationSetting, RevocationSettings,
};
use revocation_storage::{MemoryStore, RevocationStore};
use revocation_types::{
    crypto::RevocationPrivateKey, testing::MockAlgebra, time, CredentialTypeIdentifier,
    IssuanceRecord, IssuerIdentifier, RevocationAttribute,
};
use std::{collections::HashMap, sync::Arc};

pub const KEY_COUNTER: u32 = 2;

pub fn cred_type() -> CredentialTypeIdentifier {
    "irma-demo.mijn.ageLower".parse().unwrap()
}

pub fn issuer() -> IssuerIdentifier {
    "irma-demo.mijn".parse().unwrap()
}

pub fn private_key() -> RevocationPrivateKey {
    MockAlgebra::keypair(&issuer(), KEY_COUNTER).0
}

/// An authority over the in-memory store, with mock keys for counters 1
/// and 2 and one revocable credential type. The configured revocation
/// server is unreachable, so any test driving a sync sees every fetch
/// fail.
pub fn create_authority(mode: RevocationMode) -> Arc<RevocationAuthority> {
    let id = cred_type();
    let mut keys = KeyRegistry::new();
    for counter in [1, KEY_COUNTER] {
        let (sk, pk) = MockAlgebra::keypair(&issuer(), counter);
        keys.insert_private_key(sk);
        keys.insert_public_key(pk);
    }

    let mut configured = HashMap::new();
    configured.insert(id.clone(), RevocationSetting {
        mode,
        ..Default::default()
    });
    let settings = RevocationSettings::load(configured, &[id.clone()]).unwrap();

    let mut types = HashMap::new();
    types.insert(id, CredentialTypeInfo {
        revocation_servers: vec!["http://127.0.0.1:1".into()],
        ..Default::default()
    });

    Arc::new(RevocationAuthority::new(
        RevocationStore::Memory(MemoryStore::new()),
        Arc::new(keys),
        Arc::new(MockAlgebra),
        Arc::new(settings),
        Arc::new(CredentialTypeRegistry::new(types)),
        RevocationParameters::default(),
    ))
}

pub fn issuance_record(key: &str, attr: u8) -> IssuanceRecord {
    IssuanceRecord {
        key: key.into(),
        cred_type: cred_type(),
        issued: time::now_unix_ns(),
        pk_counter: KEY_COUNTER,
        attr: RevocationAttribute::from_bytes(vec![attr]),
        valid_until: 1 << 62,
        revoked_at: 0,
    }
}
