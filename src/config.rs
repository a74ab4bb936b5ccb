// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Engine configuration.
//!
//! Loaded from environment variables with defaults for anything missing or
//! unparsable.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Tunables for the booking core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest a writer waits for one room lock before failing with a
    /// transient conflict.
    pub lock_timeout: Duration,
    /// Extra attempts after a transient conflict before it surfaces.
    pub max_conflict_retries: u32,
    /// Back-off before retry `n` is `n × retry_backoff`.
    pub retry_backoff: Duration,
    /// Upper bound for the guest count of a search.
    pub max_guest_count: u32,
    /// Audit events buffered before new ones are dropped.
    pub audit_capacity: usize,
}

impl EngineConfig {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(250);
    pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
    pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(10);
    pub const DEFAULT_MAX_GUEST_COUNT: u32 = 10;
    pub const DEFAULT_AUDIT_CAPACITY: usize = 1024;

    /// Reads `RESERVATION_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_u64 = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        Self {
            lock_timeout: parse_u64("RESERVATION_LOCK_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(Self::DEFAULT_LOCK_TIMEOUT),
            max_conflict_retries: lookup("RESERVATION_MAX_RETRIES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(Self::DEFAULT_MAX_CONFLICT_RETRIES),
            retry_backoff: parse_u64("RESERVATION_RETRY_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(Self::DEFAULT_RETRY_BACKOFF),
            max_guest_count: lookup("RESERVATION_MAX_GUESTS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(Self::DEFAULT_MAX_GUEST_COUNT),
            audit_capacity: lookup("RESERVATION_AUDIT_CAPACITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(Self::DEFAULT_AUDIT_CAPACITY),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
            max_conflict_retries: Self::DEFAULT_MAX_CONFLICT_RETRIES,
            retry_backoff: Self::DEFAULT_RETRY_BACKOFF,
            max_guest_count: Self::DEFAULT_MAX_GUEST_COUNT,
            audit_capacity: Self::DEFAULT_AUDIT_CAPACITY,
        }
    }
}
