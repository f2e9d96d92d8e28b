// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum accumulator age a verifier accepts, in seconds.
pub const DEFAULT_TOLERANCE_SECS: u64 = 600;

/// Smallest tolerance a setting may configure, in seconds.
pub const MIN_TOLERANCE_SECS: u64 = 30;

/// Global revocation timing parameters and their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationParameters {
    /// Nonrevocation must be proved against an accumulator at most this
    /// many seconds old, unless overridden per setting or per request.
    pub default_tolerance_secs: u64,

    /// How often requestor servers refresh their revocation state at the
    /// authority, in minutes.
    pub requestor_update_interval_mins: u64,

    /// How often the authority re-signs each accumulator with a fresh
    /// timestamp, in seconds.
    pub accumulator_update_interval_secs: u64,

    /// How often issuance records of expired credentials are deleted, in
    /// minutes.
    pub delete_issuance_records_interval_mins: u64,

    /// How often the holder app periodically fetches revocation updates,
    /// in minutes.
    pub client_update_interval_mins: u64,

    /// After this many hours it becomes very likely that the holder app
    /// updates its witness promptly after being opened.
    pub client_default_update_speed_hours: u64,

    /// How long a session waits for witness updating before proceeding
    /// with a possibly stale witness, in milliseconds.
    pub client_update_timeout_ms: u64,
}

impl Default for RevocationParameters {
    fn default() -> Self {
        Self {
            default_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            requestor_update_interval_mins: 10,
            accumulator_update_interval_secs: 60,
            delete_issuance_records_interval_mins: 5,
            client_update_interval_mins: 10,
            client_default_update_speed_hours: 7 * 24,
            client_update_timeout_ms: 1000,
        }
    }
}

impl RevocationParameters {
    pub fn accumulator_update_interval(&self) -> Duration {
        Duration::from_secs(self.accumulator_update_interval_secs)
    }

    pub fn delete_issuance_records_interval(&self) -> Duration {
        Duration::from_secs(self.delete_issuance_records_interval_mins * 60)
    }

    pub fn client_update_timeout(&self) -> Duration {
        Duration::from_millis(self.client_update_timeout_ms)
    }
}
