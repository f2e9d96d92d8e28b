// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use revocation_types::{
    crypto::KeyCounter, CredentialTypeIdentifier, Event, SignedAccumulator,
};

/// One row of the accumulator table: the latest signed accumulator of a
/// (credential type, key generation) stream. Upserted in place; history
/// lives in the event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccumulatorRecord {
    pub cred_type: CredentialTypeIdentifier,
    pub pk_counter: KeyCounter,
    pub data: Bytes,
}

impl AccumulatorRecord {
    pub fn new(cred_type: &CredentialTypeIdentifier, signed: &SignedAccumulator) -> Self {
        Self {
            cred_type: cred_type.clone(),
            pk_counter: signed.pk_counter,
            data: signed.data.clone(),
        }
    }

    pub fn signed_accumulator(&self) -> SignedAccumulator {
        SignedAccumulator {
            data: self.data.clone(),
            pk_counter: self.pk_counter,
        }
    }
}

/// One row of the append-only event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub cred_type: CredentialTypeIdentifier,
    pub pk_counter: KeyCounter,
    pub event: Event,
}

impl EventRecord {
    pub fn new(cred_type: &CredentialTypeIdentifier, pk_counter: KeyCounter, event: Event) -> Self {
        Self {
            cred_type: cred_type.clone(),
            pk_counter,
            event,
        }
    }
}
