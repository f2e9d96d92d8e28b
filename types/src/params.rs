// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Compile-time revocation protocol constants. Event ranges served over
//! HTTP always have power-of-two lengths between `UPDATE_MIN_COUNT` and
//! `UPDATE_MAX_COUNT` so that responses are cacheable; interval endpoints
//! must be multiples of `UPDATE_MIN_COUNT`.

pub const UPDATE_MIN_COUNT_POWER: u32 = 4;
pub const UPDATE_MAX_COUNT_POWER: u32 = 9;

pub const UPDATE_MIN_COUNT: u64 = 1 << UPDATE_MIN_COUNT_POWER;
pub const UPDATE_MAX_COUNT: u64 = 1 << UPDATE_MAX_COUNT_POWER;

/// How many trailing events are attached to session requests for the
/// client to update its revocation state.
pub const DEFAULT_UPDATE_EVENT_COUNT: u64 = UPDATE_MIN_COUNT;
