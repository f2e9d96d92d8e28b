// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{CredentialTypeInfo, CredentialTypeRegistry, IssuerKeystore, KeyRegistry};
use claims::{assert_matches, assert_ok};
use revocation_types::{
    testing::MockAlgebra, CredentialTypeIdentifier, Keystore, RevocationError, RevocationKeys,
};
use std::{collections::HashMap, sync::Arc};

#[test]
fn test_expect_revocation() {
    let supported: CredentialTypeIdentifier = "irma-demo.mijn.ageLower".parse().unwrap();
    let unsupported: CredentialTypeIdentifier = "irma-demo.mijn.email".parse().unwrap();
    let mut types = HashMap::new();
    types.insert(supported.clone(), CredentialTypeInfo {
        revocation_servers: vec!["https://ra.example.com/".into()],
        ..Default::default()
    });
    types.insert(unsupported.clone(), CredentialTypeInfo::default());
    let registry = CredentialTypeRegistry::new(types);

    let info = assert_ok!(registry.expect_revocation(&supported));
    assert_eq!(info.revocation_update_count, 16);
    assert_matches!(
        registry.expect_revocation(&unsupported),
        Err(RevocationError::UnsupportedCredentialType(_))
    );
    assert_matches!(
        registry.expect_revocation(&"irma-demo.other.unknown".parse().unwrap()),
        Err(RevocationError::UnsupportedCredentialType(_))
    );
}

#[test]
fn test_key_registry_lookup() {
    let issuer = "irma-demo.mijn".parse().unwrap();
    let mut registry = KeyRegistry::new();
    for counter in [1, 2, 7] {
        let (sk, pk) = MockAlgebra::keypair(&issuer, counter);
        registry.insert_private_key(sk);
        registry.insert_public_key(pk);
    }

    assert_ok!(registry.public_key(&issuer, 2));
    assert_matches!(
        registry.public_key(&issuer, 3),
        Err(RevocationError::UnknownPublicKey { .. })
    );
    let latest = assert_ok!(registry.private_key_latest(&issuer));
    assert_eq!(latest.counter, 7);

    let other = "irma-demo.other".parse().unwrap();
    assert_matches!(
        registry.private_key_latest(&other),
        Err(RevocationError::UnknownPrivateKey { .. })
    );
}

#[test]
fn test_issuer_keystore_is_bound() {
    let issuer = "irma-demo.mijn".parse().unwrap();
    let mut registry = KeyRegistry::new();
    let (_, pk) = MockAlgebra::keypair(&issuer, 1);
    registry.insert_public_key(pk.clone());

    let keystore = IssuerKeystore::new(Arc::new(registry), issuer);
    assert_eq!(assert_ok!(keystore.public_key(1)), pk);
    assert_matches!(
        keystore.public_key(2),
        Err(RevocationError::UnknownPublicKey { .. })
    );
}
