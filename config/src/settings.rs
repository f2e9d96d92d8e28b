// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::parameters::{RevocationParameters, MIN_TOLERANCE_SECS};
use parking_lot::RwLock;
use revocation_types::{time, CredentialTypeIdentifier, RevocationError};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

/// What revocation operations a host supports for a credential type, and
/// how the associated data is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RevocationMode {
    /// Only consumes update messages, for issuance or verification. Uses
    /// the in-memory store.
    #[default]
    Requestor,
    /// Serves update messages from its database and relays every update it
    /// receives to the configured POST URLs. Requires a SQL database.
    Proxy,
    /// The revocation authority for the credential type: accepts issuance
    /// records and revocation commands, signs new update messages. Requires
    /// a SQL database and the issuer's revocation private key, and also
    /// serves everything `Proxy` serves.
    Server,
}

impl TryFrom<String> for RevocationMode {
    type Error = String;

    fn try_from(mode: String) -> Result<Self, Self::Error> {
        match mode.as_str() {
            "" | "requestor" => Ok(Self::Requestor),
            "proxy" => Ok(Self::Proxy),
            "server" => Ok(Self::Server),
            other => Err(format!(
                "invalid revocation mode {other:?} (supported: \"requestor\" (or empty string), \"server\", \"proxy\")"
            )),
        }
    }
}

impl From<RevocationMode> for String {
    fn from(mode: RevocationMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for RevocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requestor => "requestor",
            Self::Proxy => "proxy",
            Self::Server => "server",
        })
    }
}

/// Revocation settings for one credential type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationSetting {
    pub mode: RevocationMode,
    /// Where to relay received updates to, fire-and-forget.
    pub post_urls: Vec<String>,
    /// The remote authority to send issuance records to when we are not the
    /// authority ourselves. Incompatible with `Server` mode.
    pub revocation_server_url: String,
    /// Tolerance in seconds; 0 means the global default, nonzero values
    /// must be at least 30.
    pub tolerance: u64,

    /// Set to now whenever an update is received, or when the authority
    /// reports there is nothing new: the time up to which our
    /// nonrevocation guarantees last. Not persisted; 0 means never.
    #[serde(skip)]
    pub updated: Arc<AtomicI64>,
}

impl RevocationSetting {
    pub fn effective_tolerance(&self, parameters: &RevocationParameters) -> u64 {
        if self.tolerance == 0 {
            parameters.default_tolerance_secs
        } else {
            self.tolerance
        }
    }

    /// Unix seconds of the last successful sync, if any.
    pub fn last_updated(&self) -> Option<i64> {
        let updated = self.updated.load(Ordering::Relaxed);
        (updated != 0).then_some(updated)
    }

    pub fn mark_updated(&self) {
        self.updated.store(time::now_unix_secs(), Ordering::Relaxed);
    }

    fn validate(&self, id: &CredentialTypeIdentifier) -> Result<(), RevocationError> {
        if self.mode == RevocationMode::Server && !self.revocation_server_url.is_empty() {
            return Err(RevocationError::InvalidConfiguration(format!(
                "revocation_server_url for {id} cannot be combined with server mode"
            )));
        }
        if self.tolerance != 0 && self.tolerance < MIN_TOLERANCE_SECS {
            return Err(RevocationError::InvalidConfiguration(format!(
                "tolerance setting for {id} must be at least {MIN_TOLERANCE_SECS} seconds, was {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// All per credential type settings, validated and default-initialized at
/// load. The map itself is only mutated through explicit upserts; freshness
/// timestamps are atomics shared with every handed-out clone.
#[derive(Debug)]
pub struct RevocationSettings {
    inner: RwLock<HashMap<CredentialTypeIdentifier, RevocationSetting>>,
}

impl RevocationSettings {
    /// Validates the configured settings and fills in defaults for every
    /// known credential type that has none.
    pub fn load(
        configured: HashMap<CredentialTypeIdentifier, RevocationSetting>,
        known_types: &[CredentialTypeIdentifier],
    ) -> Result<Self, RevocationError> {
        for (id, setting) in &configured {
            setting.validate(id)?;
        }
        let mut settings = configured;
        for id in known_types {
            settings.entry(id.clone()).or_default();
        }
        Ok(Self {
            inner: RwLock::new(settings),
        })
    }

    /// The setting for `id`, or a default one if none is configured. The
    /// returned clone shares its freshness timestamp with the stored entry.
    pub fn get(&self, id: &CredentialTypeIdentifier) -> RevocationSetting {
        self.inner.read().get(id).cloned().unwrap_or_default()
    }

    /// Records a successful sync for `id`, inserting a default entry first
    /// if the type was unknown at load.
    pub fn mark_updated(&self, id: &CredentialTypeIdentifier) {
        if let Some(setting) = self.inner.read().get(id) {
            setting.mark_updated();
            return;
        }
        self.inner
            .write()
            .entry(id.clone())
            .or_default()
            .mark_updated();
    }

    /// The credential types this host is the revocation authority for.
    pub fn server_types(&self) -> Vec<CredentialTypeIdentifier> {
        self.inner
            .read()
            .iter()
            .filter(|(_, setting)| setting.mode == RevocationMode::Server)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Server and proxy modes keep their records in SQL; reject the
    /// configuration if such a mode is set but no SQL store is available.
    pub fn validate_storage(&self, sql_backed: bool) -> Result<(), RevocationError> {
        if sql_backed {
            return Ok(());
        }
        let inner = self.inner.read();
        if let Some((id, _)) = inner
            .iter()
            .find(|(_, setting)| setting.mode != RevocationMode::Requestor)
        {
            return Err(RevocationError::InvalidConfiguration(format!(
                "revocation mode for {id} requires a SQL database but no connection string was given"
            )));
        }
        Ok(())
    }
}
