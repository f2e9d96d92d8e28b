// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use revocation_types::{
    crypto::{KeyCounter, RevocationPrivateKey, RevocationPublicKey},
    IssuerIdentifier, Keystore, RevocationError, RevocationKeys,
};
use std::{collections::BTreeMap, sync::Arc};

/// In-memory registry of revocation key material, loaded from the scheme
/// and key directories at startup. Public keys are available for every
/// issuer whose credentials we verify; private keys only for issuers this
/// host revokes for.
#[derive(Default)]
pub struct KeyRegistry {
    public: BTreeMap<(IssuerIdentifier, KeyCounter), RevocationPublicKey>,
    private: BTreeMap<(IssuerIdentifier, KeyCounter), RevocationPrivateKey>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_public_key(&mut self, pk: RevocationPublicKey) {
        self.public.insert((pk.issuer.clone(), pk.counter), pk);
    }

    pub fn insert_private_key(&mut self, sk: RevocationPrivateKey) {
        self.private.insert((sk.issuer.clone(), sk.counter), sk);
    }
}

impl RevocationKeys for KeyRegistry {
    fn public_key(
        &self,
        issuer: &IssuerIdentifier,
        counter: KeyCounter,
    ) -> Result<RevocationPublicKey, RevocationError> {
        self.public
            .get(&(issuer.clone(), counter))
            .cloned()
            .ok_or_else(|| RevocationError::UnknownPublicKey {
                issuer: issuer.clone(),
                counter,
            })
    }

    fn private_key(
        &self,
        issuer: &IssuerIdentifier,
        counter: KeyCounter,
    ) -> Result<RevocationPrivateKey, RevocationError> {
        self.private
            .get(&(issuer.clone(), counter))
            .cloned()
            .ok_or_else(|| RevocationError::UnknownPrivateKey {
                issuer: issuer.clone(),
                counter,
            })
    }

    fn private_key_latest(
        &self,
        issuer: &IssuerIdentifier,
    ) -> Result<RevocationPrivateKey, RevocationError> {
        self.private
            .range((issuer.clone(), KeyCounter::MIN)..=(issuer.clone(), KeyCounter::MAX))
            .next_back()
            .map(|(_, sk)| sk.clone())
            .ok_or_else(|| RevocationError::UnknownPrivateKey {
                issuer: issuer.clone(),
                counter: 0,
            })
    }
}

/// A public-key view bound to one issuer, as handed to witness updating.
pub struct IssuerKeystore {
    keys: Arc<dyn RevocationKeys>,
    issuer: IssuerIdentifier,
}

impl IssuerKeystore {
    pub fn new(keys: Arc<dyn RevocationKeys>, issuer: IssuerIdentifier) -> Self {
        Self { keys, issuer }
    }
}

impl Keystore for IssuerKeystore {
    fn public_key(&self, counter: KeyCounter) -> Result<RevocationPublicKey, RevocationError> {
        self.keys.public_key(&self.issuer, counter)
    }
}
