// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Holder-side witness synchronization. A session request carries the
//! latest revocation updates per credential type; each revocable
//! credential advances its non-revocation witness through them before
//! producing a proof. Updating is bounded by a timeout after which the
//! session proceeds with whatever witnesses are fresh by then.

#[cfg(test)]
mod tests;

use parking_lot::Mutex;
use revocation_types::{
    crypto::AccumulatorAlgebra, request::RevocationRequest, CredentialTypeIdentifier, Keystore,
    RevocationError, Update, Witness,
};
use std::{sync::Arc, time::Duration};
use tracing::warn;

/// A credential whose non-revocation witness is kept in sync with the
/// authority's accumulator.
pub struct RevocableCredential {
    pub cred_type: CredentialTypeIdentifier,
    pub witness: Witness,
}

/// Advances the credential's witness through the updates the request
/// carries for its credential type. Returns whether a nonrevocation proof
/// is expected at all: `false` when the request carries no updates for the
/// type. A witness that still trails the newest update after applying
/// everything available surfaces `IncompleteUpdate`.
pub fn prepare_nonrevocation(
    credential: &mut RevocableCredential,
    request: &RevocationRequest,
    keystore: &dyn Keystore,
    algebra: &dyn AccumulatorAlgebra,
) -> Result<bool, RevocationError> {
    let Some(params) = request.revocation.get(&credential.cred_type) else {
        return Ok(false);
    };
    if params.updates.is_empty() {
        return Ok(false);
    }

    let updates: Vec<Update> = params.updates.values().cloned().collect();
    let updated = algebra.update_witness(&mut credential.witness, &updates, keystore)?;
    if updated {
        // Any cached proof was produced against the previous accumulator.
        credential.witness.discard_cached_proof();
    }

    if let Some(update) = params
        .updates
        .get(&credential.witness.signed_accumulator.pk_counter)
    {
        if let Some(last) = update.last_event_index() {
            if credential.witness.index < last {
                // TODO fetch the missing ranges from the authority via
                // fetch_update_from and retry.
                return Err(RevocationError::IncompleteUpdate);
            }
        }
    }
    Ok(true)
}

/// Advances every witness, bounded by `timeout`. Returns whether updating
/// completed in time; when it did not, the session proceeds and the
/// credential set may still contain credentials revoked by the newest
/// updates. Per-credential failures are logged, not propagated: one stale
/// witness must not block the others.
pub async fn update_witnesses_bounded(
    credentials: Arc<Mutex<Vec<RevocableCredential>>>,
    request: Arc<RevocationRequest>,
    keystore: Arc<dyn Keystore>,
    algebra: Arc<dyn AccumulatorAlgebra>,
    timeout: Duration,
) -> bool {
    let worker = tokio::task::spawn_blocking(move || {
        let mut credentials = credentials.lock();
        for credential in credentials.iter_mut() {
            if let Err(error) =
                prepare_nonrevocation(credential, &request, keystore.as_ref(), algebra.as_ref())
            {
                warn!(
                    credential_type = %credential.cred_type,
                    error = %error,
                    "nonrevocation witness update failed"
                );
            }
        }
    });
    matches!(tokio::time::timeout(timeout, worker).await, Ok(Ok(())))
}
