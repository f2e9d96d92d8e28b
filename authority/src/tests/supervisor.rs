// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{tests::utils::create_authority, Supervisor};
use claims::{assert_matches, assert_ok};
use revocation_config::RevocationMode;
use revocation_types::RevocationError;

#[tokio::test]
async fn test_supervisor_rejects_server_mode_without_sql() {
    // The test authority sits on the in-memory store; server and proxy
    // modes demand SQL.
    let authority = create_authority(RevocationMode::Server);
    assert_matches!(
        Supervisor::start(authority),
        Err(RevocationError::InvalidConfiguration(_))
    );
}

#[tokio::test]
async fn test_supervisor_starts_in_requestor_mode() {
    let authority = create_authority(RevocationMode::Requestor);
    let supervisor = assert_ok!(Supervisor::start(authority));
    supervisor.shutdown();
}
