// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{join_url, RestClient};
use claims::assert_matches;
use revocation_types::{CredentialTypeIdentifier, RevocationError};

fn cred_type() -> CredentialTypeIdentifier {
    "irma-demo.mijn.ageLower".parse().unwrap()
}

#[test]
fn test_join_url_normalizes_slashes() {
    assert_eq!(
        join_url("https://ra.example.com", "revocation/update/x"),
        "https://ra.example.com/revocation/update/x"
    );
    assert_eq!(
        join_url("https://ra.example.com/", "revocation/update/x"),
        "https://ra.example.com/revocation/update/x"
    );
}

#[tokio::test]
async fn test_fetch_walks_all_servers_and_aggregates_errors() {
    // Nothing listens on these ports; every server must be tried and every
    // failure reported.
    let servers = vec![
        "http://127.0.0.1:1".to_string(),
        "http://127.0.0.1:2".to_string(),
    ];
    let client = RestClient::new();
    let result = client
        .fetch_update_latest(&servers, &cred_type(), 0, 16)
        .await;
    let error = result.unwrap_err();
    assert_matches!(&error, RevocationError::AllServersFailed { errors } if errors.len() == 2);
}

#[tokio::test]
async fn test_fetch_with_no_servers_fails() {
    let client = RestClient::new();
    let result = client.fetch_updates_latest(&[], &cred_type(), 16).await;
    assert_matches!(
        result,
        Err(RevocationError::AllServersFailed { errors }) if errors.is_empty()
    );
}

#[tokio::test]
async fn test_post_update_swallows_failures() {
    let client = RestClient::new();
    let update = revocation_types::Update::new(
        revocation_types::SignedAccumulator {
            data: bytes::Bytes::from_static(b"x"),
            pk_counter: 0,
        },
        Vec::new(),
    );
    // Must not propagate the connection failure.
    client
        .post_update(&["http://127.0.0.1:1".to_string()], &cred_type(), &update)
        .await;
}
