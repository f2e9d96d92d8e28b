// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the revocation endpoints of an authority or proxy. All
//! bodies are CBOR. Fetches walk the configured servers in order and
//! return on the first success; posting updates to subscribers is
//! fire-and-forget. Large gaps in the event log are fetched as concurrent
//! power-of-two ranges so responses stay cacheable.

pub mod partition;

#[cfg(test)]
mod tests;

use crate::partition::binary_partition;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use revocation_types::{
    crypto::{AccumulatorAlgebra, KeyCounter, RevocationPrivateKey, RevocationPublicKey},
    CredentialTypeIdentifier, EventList, IssuanceRecord, RevocationError, Update,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

const CBOR_CONTENT_TYPE: &str = "application/cbor";

/// Client handle over the revocation endpoints; cheap to clone and safe
/// for concurrent use.
#[derive(Clone, Debug, Default)]
pub struct RestClient {
    http: reqwest::Client,
}

impl RestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the latest update for one key counter: the current signed
    /// accumulator and up to `count` trailing events.
    pub async fn fetch_update_latest(
        &self,
        servers: &[String],
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        count: u64,
    ) -> Result<Update, RevocationError> {
        self.get_multiple(servers, &format!("revocation/update/{id}/{count}/{counter}"))
            .await
    }

    /// Fetches the latest update for every key counter of the credential
    /// type.
    pub async fn fetch_updates_latest(
        &self,
        servers: &[String],
        id: &CredentialTypeIdentifier,
        count: u64,
    ) -> Result<BTreeMap<KeyCounter, Update>, RevocationError> {
        self.get_multiple(servers, &format!("revocation/update/{id}/{count}"))
            .await
    }

    /// Fetches an update whose events reach back to `from`: the latest
    /// update, plus every missing range in between, fetched concurrently
    /// and spliced in front.
    pub async fn fetch_update_from(
        &self,
        servers: &[String],
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        from: u64,
        count: u64,
        pk: &RevocationPublicKey,
        algebra: &dyn AccumulatorAlgebra,
    ) -> Result<Update, RevocationError> {
        // First the head: accumulator and the latest few events.
        let mut update = self.fetch_update_latest(servers, id, counter, count).await?;
        let accumulator = algebra.verify_signed(&update.signed_accumulator, pk)?;

        // Then the gap between `from` and the head's events, as cacheable
        // power-of-two ranges.
        let gap_end = accumulator
            .index
            .saturating_sub(update.events.len() as u64);
        if from < gap_end {
            let ranges = binary_partition(from, gap_end);
            let fetches = ranges
                .iter()
                .map(|(lo, hi)| self.fetch_events(servers, id, counter, *lo, *hi));
            let lists = futures::future::try_join_all(fetches).await?;
            update.prepend(EventList::flatten(lists)?)?;
        }
        Ok(update)
    }

    async fn fetch_events(
        &self,
        servers: &[String],
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        lo: u64,
        hi: u64,
    ) -> Result<EventList, RevocationError> {
        let mut list: EventList = self
            .get_multiple(servers, &format!("revocation/events/{id}/{counter}/{lo}/{hi}"))
            .await?;
        // The crypto layer consumes range responses with the product hint
        // set, whatever the server answered.
        list.compute_product = true;
        Ok(list)
    }

    /// Relays an update to each subscriber URL. Failures are logged and
    /// swallowed; delivery to one subscriber never blocks another, nor the
    /// caller.
    pub async fn post_update(
        &self,
        urls: &[String],
        id: &CredentialTypeIdentifier,
        update: &Update,
    ) {
        for url in urls {
            let target = join_url(url, &format!("revocation/update/{id}"));
            if let Err(error) = self.post_cbor(&target, update).await {
                warn!(url = url.as_str(), error = %error, "error sending revocation update");
            }
        }
    }

    /// Signs the issuance record with the issuer's revocation key and posts
    /// the sealed bytes to the remote authority.
    pub async fn post_issuance_record(
        &self,
        url: &str,
        id: &CredentialTypeIdentifier,
        sk: &RevocationPrivateKey,
        record: &IssuanceRecord,
        algebra: &dyn AccumulatorAlgebra,
    ) -> Result<(), RevocationError> {
        let sealed = algebra.seal_issuance_record(sk, record)?;
        let target = join_url(url, &format!("revocation/issuancerecord/{id}/{}", sk.counter));
        self.http
            .post(&target)
            .header(CONTENT_TYPE, CBOR_CONTENT_TYPE)
            .body(sealed)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| RevocationError::Network(error.to_string()))?;
        Ok(())
    }

    /// Tries `path` on every server in order, returning the first
    /// successfully decoded response, or the aggregated failure of all of
    /// them.
    async fn get_multiple<T: DeserializeOwned>(
        &self,
        servers: &[String],
        path: &str,
    ) -> Result<T, RevocationError> {
        let mut errors = Vec::with_capacity(servers.len());
        for server in servers {
            match self.get_cbor(&join_url(server, path)).await {
                Ok(value) => return Ok(value),
                Err(error) => errors.push(format!("{server}: {error}")),
            }
        }
        Err(RevocationError::AllServersFailed { errors })
    }

    async fn get_cbor<T: DeserializeOwned>(&self, url: &str) -> Result<T, RevocationError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, CBOR_CONTENT_TYPE)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| RevocationError::Network(error.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|error| RevocationError::Network(error.to_string()))?;
        ciborium::from_reader(body.as_ref()).map_err(|error| {
            RevocationError::InvalidUpdate(format!("malformed response body: {error}"))
        })
    }

    async fn post_cbor<T: Serialize>(&self, url: &str, body: &T) -> Result<(), RevocationError> {
        let mut encoded = Vec::new();
        ciborium::into_writer(body, &mut encoded)
            .map_err(|error| RevocationError::Network(format!("cannot encode body: {error}")))?;
        self.http
            .post(url)
            .header(CONTENT_TYPE, CBOR_CONTENT_TYPE)
            .body(encoded)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| RevocationError::Network(error.to_string()))?;
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
