// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use revocation_config::{
    CredentialTypeRegistry, RevocationMode, RevocationParameters, RevocationSettings,
};
use revocation_rest_client::RestClient;
use revocation_storage::{
    assemble_updates, AccumulatorRecord, EventRecord, RevocationStore, StoreAccess,
};
use revocation_types::{
    crypto::{AccumulatorAlgebra, KeyCounter, RevocationPrivateKey},
    params::UPDATE_MIN_COUNT,
    request::RevocationRequest,
    time, Accumulator, CredentialTypeIdentifier, Event, EventList, IssuanceRecord,
    RevocationError, RevocationKeys, SignedAccumulator, Update,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{error, trace, warn};

/// The revocation engine. In server mode it is the single writer of new
/// events for its credential types; in proxy and requestor modes it only
/// ingests and serves updates produced elsewhere. All mutating access goes
/// through the store's transaction API; forward POSTs happen strictly
/// after the commit that produced them.
pub struct RevocationAuthority {
    store: RevocationStore,
    keys: Arc<dyn RevocationKeys>,
    algebra: Arc<dyn AccumulatorAlgebra>,
    settings: Arc<RevocationSettings>,
    credential_types: Arc<CredentialTypeRegistry>,
    parameters: RevocationParameters,
    client: RestClient,
}

impl RevocationAuthority {
    pub fn new(
        store: RevocationStore,
        keys: Arc<dyn RevocationKeys>,
        algebra: Arc<dyn AccumulatorAlgebra>,
        settings: Arc<RevocationSettings>,
        credential_types: Arc<CredentialTypeRegistry>,
        parameters: RevocationParameters,
    ) -> Self {
        Self {
            store,
            keys,
            algebra,
            settings,
            credential_types,
            parameters,
            client: RestClient::new(),
        }
    }

    pub fn settings(&self) -> &RevocationSettings {
        &self.settings
    }

    pub fn store(&self) -> &RevocationStore {
        &self.store
    }

    pub fn parameters(&self) -> &RevocationParameters {
        &self.parameters
    }

    /// Whether an accumulator exists for the given credential type and key
    /// counter.
    pub fn exists(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Result<bool, RevocationError> {
        self.store
            .with_transaction(|access| access.accumulator_exists(id, counter))
    }

    /// Creates the initial accumulator for a credential type. This is the
    /// only way to bootstrap revocation for a type and must happen before
    /// anyone can use it. Requires the issuer's revocation private key.
    pub async fn enable_revocation(
        &self,
        id: &CredentialTypeIdentifier,
        sk: &RevocationPrivateKey,
    ) -> Result<(), RevocationError> {
        if self.exists(id, sk.counter)? {
            return Err(RevocationError::AlreadyEnabled(id.clone()));
        }
        let update = self.algebra.new_accumulator(sk)?;
        self.ingest_update(id, &update, true)?;
        self.finish_updates(id, vec![update]);
        Ok(())
    }

    /// Ingests an externally received update: proxy POSTs and sync
    /// responses come through here.
    pub async fn add_update(
        &self,
        id: &CredentialTypeIdentifier,
        update: &Update,
    ) -> Result<(), RevocationError> {
        self.ingest_update(id, update, false)?;
        self.finish_updates(id, vec![update.clone()]);
        Ok(())
    }

    fn verify_update(
        &self,
        id: &CredentialTypeIdentifier,
        update: &Update,
    ) -> Result<Accumulator, RevocationError> {
        let pk = self.keys.public_key(
            &id.issuer_identifier(),
            update.signed_accumulator.pk_counter,
        )?;
        update.verify(&pk, self.algebra.as_ref())
    }

    fn persist_update(
        access: &mut StoreAccess<'_>,
        id: &CredentialTypeIdentifier,
        update: &Update,
        create: bool,
    ) -> Result<(), RevocationError> {
        let record = AccumulatorRecord::new(id, &update.signed_accumulator);
        if create {
            access.insert_accumulator(&record)?;
        } else {
            access.save_accumulator(&record)?;
        }
        let events: Vec<EventRecord> = update
            .events
            .iter()
            .map(|event| {
                EventRecord::new(id, update.signed_accumulator.pk_counter, event.clone())
            })
            .collect();
        access.insert_events(&events)
    }

    fn ingest_update(
        &self,
        id: &CredentialTypeIdentifier,
        update: &Update,
        create: bool,
    ) -> Result<(), RevocationError> {
        self.verify_update(id, update)?;
        self.store
            .with_transaction(|access| Self::persist_update(access, id, update, create))
    }

    /// Bumps freshness and relays the committed updates to the configured
    /// forward URLs. Fire-and-forget: failures are logged by the client,
    /// the caller is never blocked.
    fn finish_updates(&self, id: &CredentialTypeIdentifier, updates: Vec<Update>) {
        let setting = self.settings.get(id);
        self.settings.mark_updated(id);
        if setting.post_urls.is_empty() {
            return;
        }
        let client = self.client.clone();
        let id = id.clone();
        let urls = setting.post_urls;
        tokio::spawn(async move {
            for update in &updates {
                client.post_update(&urls, &id, update).await;
            }
        });
    }

    /// The events of one stream in `[from, to)`. Both bounds must be
    /// multiples of `UPDATE_MIN_COUNT` so responses stay cacheable.
    pub fn events(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        from: u64,
        to: u64,
    ) -> Result<EventList, RevocationError> {
        if from >= to || from % UPDATE_MIN_COUNT != 0 || to % UPDATE_MIN_COUNT != 0 {
            return Err(RevocationError::IllegalInterval { from, to });
        }
        let records = self
            .store
            .with_transaction(|access| access.events(id, counter, from, to))?;
        if records.is_empty() {
            return Err(RevocationError::StateNotFound);
        }
        let mut list = EventList::new(records.into_iter().map(|record| record.event).collect());
        list.compute_product = true;
        Ok(list)
    }

    /// The latest update per key counter: the current signed accumulator
    /// and up to `count` trailing events.
    pub fn update_latest(
        &self,
        id: &CredentialTypeIdentifier,
        count: u64,
        counter: Option<KeyCounter>,
    ) -> Result<BTreeMap<KeyCounter, Update>, RevocationError> {
        let updates = self.store.with_transaction(|access| {
            let accumulators = access.last_accumulators(id, counter)?;
            let events = if count > 0 {
                access.latest_events(id, counter, count)?
            } else {
                Vec::new()
            };
            Ok(assemble_updates(&accumulators, &events))
        })?;
        if updates.is_empty() {
            return Err(RevocationError::StateNotFound);
        }
        Ok(updates)
    }

    /// Retrieves the current signed accumulator of one stream, verifying
    /// it before handing it out.
    pub fn accumulator(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
    ) -> Result<SignedAccumulator, RevocationError> {
        let records = self
            .store
            .with_transaction(|access| access.last_accumulators(id, Some(counter)))?;
        let record = records.first().ok_or(RevocationError::StateNotFound)?;
        let signed = record.signed_accumulator();
        let pk = self.keys.public_key(&id.issuer_identifier(), signed.pk_counter)?;
        self.algebra.verify_signed(&signed, &pk)?;
        Ok(signed)
    }

    /// The non-revoked issuance records for (id, key). If `issued` is
    /// given, only the credential issued at that time.
    pub fn issuance_records(
        &self,
        id: &CredentialTypeIdentifier,
        key: &str,
        issued: Option<i64>,
    ) -> Result<Vec<IssuanceRecord>, RevocationError> {
        let records = self
            .store
            .with_transaction(|access| access.issuance_records(id, key, issued))?;
        if records.is_empty() {
            return Err(RevocationError::StateNotFound);
        }
        Ok(records)
    }

    /// Revokes the credential(s) identified by `key` (and `issued`, if
    /// given): stamps their issuance records, folds their attributes out of
    /// the accumulator, and appends one chained event each. Everything
    /// happens in a single transaction; concurrent revocations of the same
    /// stream are serialized by the store so event indices stay monotone.
    pub async fn revoke(
        &self,
        id: &CredentialTypeIdentifier,
        key: &str,
        issued: Option<i64>,
    ) -> Result<(), RevocationError> {
        if self.settings.get(id).mode != RevocationMode::Server {
            return Err(RevocationError::NotRevocationServer(id.clone()));
        }
        let issuer = id.issuer_identifier();
        let updates = self.store.with_transaction(|access| {
            let records = access.issuance_records(id, key, issued)?;
            if records.is_empty() {
                return Err(RevocationError::StateNotFound);
            }

            // Current accumulator and chain tip of every key generation in
            // the issuance set.
            let mut accumulators: BTreeMap<KeyCounter, Accumulator> = BTreeMap::new();
            let mut tips: BTreeMap<KeyCounter, Event> = BTreeMap::new();
            let mut new_events: BTreeMap<KeyCounter, Vec<Event>> = BTreeMap::new();
            for record in &records {
                let counter = record.pk_counter;
                if accumulators.contains_key(&counter) {
                    continue;
                }
                let accumulator_record = access
                    .last_accumulators(id, Some(counter))?
                    .into_iter()
                    .next()
                    .ok_or(RevocationError::StateNotFound)?;
                let pk = self.keys.public_key(&issuer, counter)?;
                let accumulator = self
                    .algebra
                    .verify_signed(&accumulator_record.signed_accumulator(), &pk)?;
                let tip = access
                    .last_event(id, counter)?
                    .ok_or(RevocationError::StateNotFound)?;
                accumulators.insert(counter, accumulator);
                tips.insert(counter, tip.event);
            }

            let now = time::now_unix_ns();
            for mut record in records {
                let counter = record.pk_counter;
                record.revoked_at = now;
                access.save_issuance_record(&record)?;
                let sk = self.keys.private_key(&issuer, counter)?;
                let (advanced, event) =
                    self.algebra
                        .remove(&accumulators[&counter], &sk, &record.attr, &tips[&counter])?;
                accumulators.insert(counter, advanced);
                tips.insert(counter, event.clone());
                new_events.entry(counter).or_default().push(event);
            }

            // One signed update per touched key generation, carrying only
            // the freshly generated events.
            let mut updates = Vec::new();
            for (counter, accumulator) in &accumulators {
                let sk = self.keys.private_key(&issuer, *counter)?;
                let signed = self.algebra.sign(accumulator, &sk)?;
                let update = Update::new(signed, new_events.remove(counter).unwrap_or_default());
                let pk = self.keys.public_key(&issuer, *counter)?;
                update.verify(&pk, self.algebra.as_ref())?;
                Self::persist_update(access, id, &update, false)?;
                updates.push(update);
            }
            Ok(updates)
        })?;
        self.finish_updates(id, updates);
        Ok(())
    }

    /// Re-signs every current accumulator of the given types with a fresh
    /// timestamp, so holders can keep producing proofs within tolerance
    /// even when nothing was revoked.
    pub async fn update_accumulator_times(
        &self,
        ids: &[CredentialTypeIdentifier],
    ) -> Result<(), RevocationError> {
        trace!("updating accumulator times");
        let refreshed = self.store.with_transaction(|access| {
            let mut refreshed = Vec::new();
            for id in ids {
                let issuer = id.issuer_identifier();
                for record in access.last_accumulators(id, None)? {
                    let pk = self.keys.public_key(&issuer, record.pk_counter)?;
                    let sk = self.keys.private_key(&issuer, record.pk_counter)?;
                    let mut accumulator = self
                        .algebra
                        .verify_signed(&record.signed_accumulator(), &pk)?;
                    accumulator.time = time::now_unix_secs();
                    let signed = self.algebra.sign(&accumulator, &sk)?;
                    access.save_accumulator(&AccumulatorRecord::new(id, &signed))?;
                    refreshed.push((id.clone(), Update::new(signed, Vec::new())));
                }
            }
            Ok(refreshed)
        })?;
        for (id, update) in refreshed {
            self.finish_updates(&id, vec![update]);
        }
        Ok(())
    }

    /// Deletes issuance records of credentials whose validity has passed;
    /// such credentials cannot be used, revoked or not.
    pub fn delete_expired_issuance_records(&self) -> Result<usize, RevocationError> {
        self.store
            .with_transaction(|access| access.delete_expired_issuance_records(time::now_unix_ns()))
    }

    /// Pulls the latest updates for `id` from its authority and ingests
    /// them. Freshness advances even when nothing new arrived.
    pub async fn sync(&self, id: &CredentialTypeIdentifier) -> Result<(), RevocationError> {
        let info = self.credential_types.expect_revocation(id)?;
        let updates = self
            .client
            .fetch_updates_latest(&info.revocation_servers, id, info.revocation_update_count)
            .await?;
        for update in updates.values() {
            self.add_update(id, update).await?;
        }
        self.settings.mark_updated(id);
        Ok(())
    }

    /// Syncs only when the local state is older than `max_age_secs`.
    pub async fn sync_if_old(
        &self,
        id: &CredentialTypeIdentifier,
        max_age_secs: u64,
    ) -> Result<(), RevocationError> {
        let setting = self.settings.get(id);
        let stale = setting
            .last_updated()
            .map_or(true, |updated| updated < time::now_unix_secs() - max_age_secs as i64);
        if stale {
            trace!(credential_type = %id, "fetching revocation updates");
            self.sync(id).await?;
        }
        Ok(())
    }

    /// Attaches the latest updates to a session request, for each
    /// credential type a nonrevocation proof is demanded for. A failed sync
    /// is demoted to a warning as long as an earlier successful sync bounds
    /// the staleness; without one the operation fails.
    pub async fn set_revocation_updates(
        &self,
        request: &mut RevocationRequest,
    ) -> Result<(), RevocationError> {
        for (id, params) in request.revocation.iter_mut() {
            let info = self.credential_types.expect_revocation(id)?;
            let setting = self.settings.get(id);
            let tolerance = if params.tolerance != 0 {
                params.tolerance
            } else {
                setting.effective_tolerance(&self.parameters)
            };
            if let Err(sync_error) = self.sync_if_old(id, tolerance / 2).await {
                match setting.last_updated() {
                    Some(updated) => {
                        warn!(
                            credential_type = %id,
                            error = %sync_error,
                            stale_secs = time::now_unix_secs() - updated,
                            "failed to fetch revocation updates; nonrevocation is only guaranteed up to the last sync"
                        );
                    }
                    None => {
                        error!(
                            credential_type = %id,
                            error = %sync_error,
                            "cannot guarantee nonrevocation: fetching updates failed and none are known locally"
                        );
                        return Err(sync_error);
                    }
                }
            }
            params.updates = self.update_latest(id, info.revocation_update_count, None)?;
        }
        Ok(())
    }

    /// Stores the issuance record locally if we are the authority for the
    /// credential type; otherwise signs it and sends it to the configured
    /// remote authority.
    pub async fn save_issuance_record(
        &self,
        id: &CredentialTypeIdentifier,
        record: &IssuanceRecord,
        sk: &RevocationPrivateKey,
    ) -> Result<(), RevocationError> {
        self.credential_types.expect_revocation(id)?;
        let setting = self.settings.get(id);
        if setting.mode == RevocationMode::Server {
            return self
                .store
                .with_transaction(|access| access.insert_issuance_record(record));
        }
        if setting.revocation_server_url.is_empty() {
            return Err(RevocationError::InvalidConfiguration(format!(
                "cannot send issuance record for {id}: no revocation_server_url configured"
            )));
        }
        self.client
            .post_issuance_record(
                &setting.revocation_server_url,
                id,
                sk,
                record,
                self.algebra.as_ref(),
            )
            .await
    }

    /// Authority-side ingest of a POSTed issuance record: verifies the
    /// issuer's signature over the envelope and stores the record.
    pub fn receive_issuance_record(
        &self,
        id: &CredentialTypeIdentifier,
        counter: KeyCounter,
        envelope: &[u8],
    ) -> Result<(), RevocationError> {
        let pk = self.keys.public_key(&id.issuer_identifier(), counter)?;
        let record = self.algebra.open_issuance_record(&pk, envelope)?;
        if record.cred_type != *id {
            return Err(RevocationError::InvalidUpdate(
                "issuance record is for a different credential type".into(),
            ));
        }
        self.store
            .with_transaction(|access| access.insert_issuance_record(&record))
    }
}
