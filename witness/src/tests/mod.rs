// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{prepare_nonrevocation, update_witnesses_bounded, RevocableCredential};
use bytes::Bytes;
use claims::{assert_matches, assert_ok};
use parking_lot::Mutex;
use revocation_types::{
    crypto::AccumulatorAlgebra,
    request::{NonRevocationParameters, RevocationRequest},
    testing::{MockAlgebra, StaticKeystore},
    CredentialTypeIdentifier, IssuerIdentifier, RevocationAttribute, RevocationError, Update,
    Witness,
};
use std::{sync::Arc, time::Duration};

const KEY_COUNTER: u32 = 1;

fn cred_type() -> CredentialTypeIdentifier {
    "irma-demo.mijn.ageLower".parse().unwrap()
}

fn issuer() -> IssuerIdentifier {
    "irma-demo.mijn".parse().unwrap()
}

fn keystore() -> StaticKeystore {
    let (_, pk) = MockAlgebra::keypair(&issuer(), KEY_COUNTER);
    let mut keystore = StaticKeystore::new(issuer());
    keystore.insert(pk);
    keystore
}

/// A credential whose witness sits at index 0, and an update advancing the
/// stream `revocations` events past genesis.
fn credential_and_update(revocations: usize) -> (RevocableCredential, Update) {
    let (sk, pk) = MockAlgebra::keypair(&issuer(), KEY_COUNTER);
    let mut update = MockAlgebra.new_accumulator(&sk).unwrap();
    let mut credential = RevocableCredential {
        cred_type: cred_type(),
        witness: Witness::new(
            0,
            update.signed_accumulator.clone(),
            RevocationAttribute::from_bytes(vec![0x77]),
        ),
    };
    credential.witness.cache_proof(Bytes::from_static(b"proof"));

    let mut accumulator = MockAlgebra
        .verify_signed(&update.signed_accumulator, &pk)
        .unwrap();
    for i in 0..revocations {
        let attr = RevocationAttribute::from_bytes(vec![i as u8 + 1]);
        let parent = update.events.last().unwrap().clone();
        let (advanced, event) = MockAlgebra.remove(&accumulator, &sk, &attr, &parent).unwrap();
        update.events.push(event);
        accumulator = advanced;
    }
    update.signed_accumulator = MockAlgebra.sign(&accumulator, &sk).unwrap();
    (credential, update)
}

fn request_with(update: Update) -> RevocationRequest {
    let mut params = NonRevocationParameters::default();
    params.updates.insert(KEY_COUNTER, update);
    let mut request = RevocationRequest::default();
    request.revocation.insert(cred_type(), params);
    request
}

#[test]
fn test_witness_advances_and_proof_cache_is_discarded() {
    let (mut credential, update) = credential_and_update(3);
    let request = request_with(update);
    let nonrev = assert_ok!(prepare_nonrevocation(
        &mut credential,
        &request,
        &keystore(),
        &MockAlgebra
    ));
    assert!(nonrev);
    assert_eq!(credential.witness.index, 3);
    assert!(credential.witness.cached_proof().is_none());
}

#[test]
fn test_no_updates_for_credential_type() {
    let (mut credential, _) = credential_and_update(1);
    let empty = RevocationRequest::default();
    let nonrev = assert_ok!(prepare_nonrevocation(
        &mut credential,
        &empty,
        &keystore(),
        &MockAlgebra
    ));
    assert!(!nonrev);
    // Untouched witness keeps its cached proof.
    assert!(credential.witness.cached_proof().is_some());
}

#[test]
fn test_unbridgeable_gap_surfaces_incomplete_update() {
    let (mut credential, mut update) = credential_and_update(4);
    // Drop the events bridging the witness to the head of the update.
    update.events.drain(0..3);
    let request = request_with(update);
    assert_matches!(
        prepare_nonrevocation(&mut credential, &request, &keystore(), &MockAlgebra),
        Err(RevocationError::IncompleteUpdate)
    );
    assert_eq!(credential.witness.index, 0);
}

#[tokio::test]
async fn test_bounded_update_completes() {
    let (credential, update) = credential_and_update(2);
    let credentials = Arc::new(Mutex::new(vec![credential]));
    let completed = update_witnesses_bounded(
        credentials.clone(),
        Arc::new(request_with(update)),
        Arc::new(keystore()),
        Arc::new(MockAlgebra),
        Duration::from_secs(5),
    )
    .await;
    assert!(completed);
    assert_eq!(credentials.lock()[0].witness.index, 2);
}

#[tokio::test]
async fn test_bounded_update_times_out() {
    let (credential, update) = credential_and_update(2);
    // Hold the credential lock so the update cannot finish in time.
    let credentials = Arc::new(Mutex::new(vec![credential]));
    let guard = credentials.lock();
    let completed = update_witnesses_bounded(
        credentials.clone(),
        Arc::new(request_with(update)),
        Arc::new(keystore()),
        Arc::new(MockAlgebra),
        Duration::from_millis(50),
    )
    .await;
    assert!(!completed);
    drop(guard);
}
