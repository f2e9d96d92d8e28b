// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    accumulator::{Accumulator, SignedAccumulator},
    crypto::{AccumulatorAlgebra, RevocationPublicKey},
    error::RevocationError,
    events::{self, Event, EventList},
};
use serde::{Deserialize, Serialize};

/// A signed accumulator together with the (possibly empty) run of events
/// leading up to it. This is the unit of distribution: the authority emits
/// one per revocation or re-signing, proxies relay it, and holders replay
/// its events into their witness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub signed_accumulator: SignedAccumulator,
    pub events: Vec<Event>,
}

impl Update {
    pub fn new(signed_accumulator: SignedAccumulator, events: Vec<Event>) -> Self {
        Self {
            signed_accumulator,
            events,
        }
    }

    pub fn last_event_index(&self) -> Option<u64> {
        self.events.last().map(|event| event.index)
    }

    /// Verifies the accumulator signature against `pk` and the event run
    /// against the chain invariants: consecutive indices, chained parent
    /// hashes, and a final event index equal to the accumulator's index.
    pub fn verify(
        &self,
        pk: &RevocationPublicKey,
        algebra: &dyn AccumulatorAlgebra,
    ) -> Result<Accumulator, RevocationError> {
        if self.signed_accumulator.pk_counter != pk.counter {
            return Err(RevocationError::InvalidUpdate(format!(
                "update is for key counter {}, verified against {}",
                self.signed_accumulator.pk_counter, pk.counter
            )));
        }
        let accumulator = algebra.verify_signed(&self.signed_accumulator, pk)?;
        events::validate_chain(&self.events)?;
        if let Some(last) = self.events.last() {
            if last.index != accumulator.index {
                return Err(RevocationError::InvalidUpdate(format!(
                    "accumulator index {} does not match last event index {}",
                    accumulator.index, last.index
                )));
            }
        }
        Ok(accumulator)
    }

    /// Splices an earlier run of events in front of this update's events.
    /// Events the update already contains are dropped from the incoming
    /// list; the remainder must chain into the update's first event.
    pub fn prepend(&mut self, list: EventList) -> Result<(), RevocationError> {
        let Some(first) = self.events.first() else {
            events::validate_chain(&list.events)?;
            self.events = list.events;
            return Ok(());
        };

        let mut earlier: Vec<Event> = list
            .events
            .into_iter()
            .filter(|event| event.index < first.index)
            .collect();
        let Some(last) = earlier.last() else {
            return Ok(());
        };
        if last.index + 1 != first.index || first.parent_hash != last.hash()? {
            return Err(RevocationError::InvalidUpdate(format!(
                "prepended events end at {} and do not chain into event {}",
                last.index, first.index
            )));
        }
        earlier.append(&mut self.events);
        self.events = earlier;
        events::validate_chain(&self.events)
    }
}
