// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Deterministic stand-ins for the accumulator cryptography, for use in
//! tests. The mock algebra derives accumulator values, signatures and
//! witness states from SHA-256 chains, so it is deterministic and
//! tamper-evident while exercising exactly the interfaces production code
//! uses. It provides no security whatsoever.

use crate::{
    accumulator::{Accumulator, SignedAccumulator},
    attribute::RevocationAttribute,
    crypto::{
        AccumulatorAlgebra, KeyCounter, Keystore, RevocationPrivateKey, RevocationPublicKey,
    },
    error::RevocationError,
    events::{Event, EventHash},
    identifiers::IssuerIdentifier,
    issuance::IssuanceRecord,
    time,
    update::Update,
    witness::Witness,
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hash-chain stand-in for the accumulator algebra.
pub struct MockAlgebra;

#[derive(Serialize, Deserialize)]
struct SignedEnvelope {
    payload: Bytes,
    signature: Bytes,
}

fn digest_chain(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

impl MockAlgebra {
    /// Derives a deterministic key pair for (issuer, counter).
    pub fn keypair(
        issuer: &IssuerIdentifier,
        counter: KeyCounter,
    ) -> (RevocationPrivateKey, RevocationPublicKey) {
        let sk_material = digest_chain(&[
            b"revocation-sk",
            issuer.as_str().as_bytes(),
            &counter.to_be_bytes(),
        ]);
        let pk_material = digest_chain(&[&sk_material]);
        (
            RevocationPrivateKey {
                issuer: issuer.clone(),
                counter,
                material: Bytes::copy_from_slice(&sk_material),
            },
            RevocationPublicKey {
                issuer: issuer.clone(),
                counter,
                material: Bytes::copy_from_slice(&pk_material),
            },
        )
    }

    fn public_material(sk: &RevocationPrivateKey) -> [u8; 32] {
        digest_chain(&[sk.material.as_ref()])
    }

    fn seal<T: Serialize>(
        sk: &RevocationPrivateKey,
        value: &T,
    ) -> Result<Vec<u8>, RevocationError> {
        let mut payload = Vec::new();
        ciborium::into_writer(value, &mut payload)
            .map_err(|error| RevocationError::InvalidUpdate(format!("cannot encode: {error}")))?;
        let signature = digest_chain(&[&Self::public_material(sk), &payload]);
        let envelope = SignedEnvelope {
            payload: payload.into(),
            signature: Bytes::copy_from_slice(&signature),
        };
        let mut encoded = Vec::new();
        ciborium::into_writer(&envelope, &mut encoded)
            .map_err(|error| RevocationError::InvalidUpdate(format!("cannot encode: {error}")))?;
        Ok(encoded)
    }

    fn open<T: DeserializeOwned>(
        pk: &RevocationPublicKey,
        envelope: &[u8],
    ) -> Result<T, RevocationError> {
        let envelope: SignedEnvelope = ciborium::from_reader(envelope)
            .map_err(|_| RevocationError::InvalidUpdate("malformed signed message".into()))?;
        let expected = digest_chain(&[pk.material.as_ref(), envelope.payload.as_ref()]);
        if envelope.signature.as_ref() != expected.as_slice() {
            return Err(RevocationError::InvalidUpdate(
                "signature verification failed".into(),
            ));
        }
        ciborium::from_reader(envelope.payload.as_ref())
            .map_err(|_| RevocationError::InvalidUpdate("malformed signed payload".into()))
    }
}

impl AccumulatorAlgebra for MockAlgebra {
    fn new_accumulator(&self, sk: &RevocationPrivateKey) -> Result<Update, RevocationError> {
        let genesis = Event {
            index: 0,
            e: RevocationAttribute::from_bytes(vec![0u8]),
            parent_hash: EventHash::default(),
        };
        let accumulated = digest_chain(&[b"accumulator-base", &Self::public_material(sk)]);
        let accumulator = Accumulator {
            accumulated: RevocationAttribute::from_bytes(accumulated.to_vec()),
            index: 0,
            time: time::now_unix_secs(),
        };
        Ok(Update::new(self.sign(&accumulator, sk)?, vec![genesis]))
    }

    fn remove(
        &self,
        accumulator: &Accumulator,
        _sk: &RevocationPrivateKey,
        attr: &RevocationAttribute,
        parent: &Event,
    ) -> Result<(Accumulator, Event), RevocationError> {
        let event = Event {
            index: parent.index + 1,
            e: attr.clone(),
            parent_hash: parent.hash()?,
        };
        let accumulated = digest_chain(&[accumulator.accumulated.as_bytes(), attr.as_bytes()]);
        let advanced = Accumulator {
            accumulated: RevocationAttribute::from_bytes(accumulated.to_vec()),
            index: event.index,
            time: time::now_unix_secs(),
        };
        Ok((advanced, event))
    }

    fn sign(
        &self,
        accumulator: &Accumulator,
        sk: &RevocationPrivateKey,
    ) -> Result<SignedAccumulator, RevocationError> {
        Ok(SignedAccumulator {
            data: Self::seal(sk, accumulator)?.into(),
            pk_counter: sk.counter,
        })
    }

    fn verify_signed(
        &self,
        signed: &SignedAccumulator,
        pk: &RevocationPublicKey,
    ) -> Result<Accumulator, RevocationError> {
        Self::open(pk, signed.data.as_ref())
    }

    fn update_witness(
        &self,
        witness: &mut Witness,
        updates: &[Update],
        keystore: &dyn Keystore,
    ) -> Result<bool, RevocationError> {
        let mut updated = false;
        for update in updates {
            let pk = keystore.public_key(update.signed_accumulator.pk_counter)?;
            let accumulator = update.verify(&pk, self)?;
            if update.signed_accumulator.pk_counter != witness.signed_accumulator.pk_counter {
                continue;
            }
            let fresh: Vec<&Event> = update
                .events
                .iter()
                .filter(|event| event.index > witness.index)
                .collect();
            match fresh.first() {
                None => {
                    // No new events; adopt the re-signed accumulator if it
                    // matches where the witness already is.
                    if accumulator.index == witness.index {
                        witness.signed_accumulator = update.signed_accumulator.clone();
                        updated = true;
                    }
                }
                Some(first) if first.index == witness.index + 1 => {
                    let mut u = witness.u.to_vec();
                    for event in &fresh {
                        u = digest_chain(&[&u, event.e.as_bytes()]).to_vec();
                    }
                    witness.u = RevocationAttribute::from(u);
                    witness.index = fresh[fresh.len() - 1].index;
                    witness.signed_accumulator = update.signed_accumulator.clone();
                    updated = true;
                }
                // The update starts past the witness; nothing to apply.
                Some(_) => {}
            }
        }
        Ok(updated)
    }

    fn seal_issuance_record(
        &self,
        sk: &RevocationPrivateKey,
        record: &IssuanceRecord,
    ) -> Result<Vec<u8>, RevocationError> {
        Self::seal(sk, record)
    }

    fn open_issuance_record(
        &self,
        pk: &RevocationPublicKey,
        envelope: &[u8],
    ) -> Result<IssuanceRecord, RevocationError> {
        Self::open(pk, envelope)
    }
}

/// Issuer-bound keystore over fixed public keys.
pub struct StaticKeystore {
    issuer: IssuerIdentifier,
    keys: BTreeMap<KeyCounter, RevocationPublicKey>,
}

impl StaticKeystore {
    pub fn new(issuer: IssuerIdentifier) -> Self {
        Self {
            issuer,
            keys: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, pk: RevocationPublicKey) {
        self.keys.insert(pk.counter, pk);
    }
}

impl Keystore for StaticKeystore {
    fn public_key(&self, counter: KeyCounter) -> Result<RevocationPublicKey, RevocationError> {
        self.keys
            .get(&counter)
            .cloned()
            .ok_or_else(|| RevocationError::UnknownPublicKey {
                issuer: self.issuer.clone(),
                counter,
            })
    }
}
