/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Router, listener and producer settings.
//!
//! All sections are optional in a settings document; missing keys fall back to
//! the [`Default`] values.

use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Options merged into every listener the router creates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Upper bound of messages dispatched by a single `fetch()`.
    pub max_batch: usize,
    /// Upper bound of queued messages still delivered by a graceful close.
    pub drain_limit: usize,
    /// Inbound queue capacity of one subscription.
    pub queue_capacity: usize,
}

impl ListenerConfig {
    pub(crate) fn validate(&self) -> Result<(), RouterError> {
        if self.max_batch == 0 {
            return Err(RouterError::Config(
                "listener.max_batch must be greater than zero".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(RouterError::Config(
                "listener.queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            max_batch: 64,
            drain_limit: 1024,
            queue_capacity: 1024,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Per-target outbound queue capacity.
    pub queue_size: usize,
    /// How long a graceful close waits for each target queue to drain.
    pub drain_timeout_ms: u64,
}

impl ProducerConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), RouterError> {
        if self.queue_size == 0 {
            return Err(RouterError::Config(
                "producer.queue_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            queue_size: 256,
            drain_timeout_ms: 500,
        }
    }
}

/// Router-wide settings. The `listener` and `producer` sections are the
/// configs used by `StreamRouter::configure_listeners_with_defaults` and
/// `StreamRouter::configure_producer_with_defaults`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Yield between two poll sweeps, in microseconds.
    pub poll_interval_us: u64,
    pub listener: ListenerConfig,
    pub producer: ProducerConfig,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            poll_interval_us: 1_000,
            listener: ListenerConfig::default(),
            producer: ProducerConfig::default(),
        }
    }
}

impl RouterSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    pub fn from_json5_str(document: &str) -> Result<Self, RouterError> {
        let settings: Self = json5::from_str(document)
            .map_err(|err| RouterError::Config(format!("unable to parse settings: {err}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RouterError> {
        let path = path.as_ref();
        debug!(settings_file = %path.display(), "loading router settings");

        let document = fs::read_to_string(path).map_err(|err| {
            RouterError::Config(format!("unable to read {}: {err}", path.display()))
        })?;
        Self::from_json5_str(&document)
    }

    fn validate(&self) -> Result<(), RouterError> {
        self.listener.validate()?;
        self.producer.validate()
    }
}
