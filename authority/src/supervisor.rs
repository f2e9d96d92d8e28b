// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::engine::RevocationAuthority;
use revocation_types::RevocationError;
use std::sync::Arc;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, trace};

/// Validates the configured revocation modes against the available storage
/// and runs the periodic maintenance of the authority: accumulator
/// re-signing for served credential types and issuance-record garbage
/// collection.
#[derive(Debug)]
pub struct Supervisor {
    tasks: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Checks the mode/storage combination and spawns the maintenance
    /// tasks. Must be called within a tokio runtime.
    pub fn start(authority: Arc<RevocationAuthority>) -> Result<Self, RevocationError> {
        authority
            .settings()
            .validate_storage(authority.store().sql_backed())?;

        let mut tasks = Vec::new();
        let server_types = authority.settings().server_types();
        if !server_types.is_empty() {
            let retimer = authority.clone();
            let interval = authority.parameters().accumulator_update_interval();
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if let Err(err) = retimer.update_accumulator_times(&server_types).await {
                        error!(error = %err, "failed to write updated accumulator record");
                    }
                }
            }));
        }

        let collector = authority.clone();
        let interval = authority.parameters().delete_issuance_records_interval();
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match collector.delete_expired_issuance_records() {
                    Ok(0) => {}
                    Ok(deleted) => trace!(deleted, "deleted expired issuance records"),
                    Err(err) => error!(error = %err, "failed to delete expired issuance records"),
                }
            }
        }));

        Ok(Self { tasks })
    }

    /// Cancels the maintenance tasks. A tick already executing completes
    /// its store transaction before the task winds down.
    pub fn shutdown(mut self) {
        self.abort_tasks();
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
