/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use std::sync::Arc;
use std::time::Duration;

use lock_config::LockSettings;
use log::{debug, trace, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::error::{DistributedLockError, Result};
use super::store::LockStore;

pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_RENEWAL_RATIO: u32 = 6;

/// Lease timing of one lock handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseOptions {
    lease_duration: Duration,
    renewal_ratio: u32,
}

impl LeaseOptions {
    /// # Errors
    ///
    /// * `DistributedLockError::InvalidArgument` - If the duration or the ratio is zero,
    ///   or the resulting renewal interval rounds down to zero.
    pub fn new(lease_duration: Duration, renewal_ratio: u32) -> Result<Self> {
        if lease_duration.is_zero() {
            return Err(DistributedLockError::InvalidArgument("lease duration must be greater than 0".to_string()));
        }
        if renewal_ratio == 0 {
            return Err(DistributedLockError::InvalidArgument("renewal ratio must be greater than 0".to_string()));
        }
        if (lease_duration / renewal_ratio).is_zero() {
            return Err(DistributedLockError::InvalidArgument(format!(
                "lease duration {:?} is too short for {} renewals",
                lease_duration, renewal_ratio
            )));
        }
        Ok(Self { lease_duration, renewal_ratio })
    }

    /// TTL written on every renewal
    pub fn lease_duration(&self) -> Duration {
        self.lease_duration
    }

    pub fn renewal_ratio(&self) -> u32 {
        self.renewal_ratio
    }

    /// Period between two renewals
    pub fn renewal_interval(&self) -> Duration {
        self.lease_duration / self.renewal_ratio
    }
}

impl Default for LeaseOptions {
    fn default() -> Self {
        Self {
            lease_duration: DEFAULT_LEASE_DURATION,
            renewal_ratio: DEFAULT_RENEWAL_RATIO,
        }
    }
}

impl TryFrom<&LockSettings> for LeaseOptions {
    type Error = DistributedLockError;

    fn try_from(settings: &LockSettings) -> Result<Self> {
        LeaseOptions::new(settings.lease.duration(), settings.lease.renewal_ratio)
    }
}

/// Background task keeping a held key's TTL alive.
///
/// Renews once on start, then every [`LeaseOptions::renewal_interval`].
/// Runs until [`LeaseRenewer::stop`] is called, the renewer is dropped, or the
/// token it was started with (a child of the acquiring context) is cancelled.
#[derive(Debug)]
pub struct LeaseRenewer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LeaseRenewer {
    pub fn start(store: Arc<dyn LockStore>, key: String, options: LeaseOptions, cancel: CancellationToken) -> Self {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let period = options.renewal_interval();
            debug!("Lease renewer started for {} every {:?}", key, period);

            // The key is written without a TTL; set one before honouring cancellation
            renew(store.as_ref(), &key, options.lease_duration()).await;

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // An extend still in flight when the token fires is abandoned
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = renew(store.as_ref(), &key, options.lease_duration()) => {}
                }
            }
            debug!("Lease renewer stopped for {}", key);
        });
        Self { cancel, handle }
    }

    /// Signal the task to stop; it exits at its next await point
    pub fn stop(self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

async fn renew(store: &dyn LockStore, key: &str, ttl: Duration) {
    match store.extend(key, ttl).await {
        Ok(true) => trace!("Renewed lease on {}", key),
        Ok(false) => warn!("Lease renewal found no key {}", key),
        Err(e) => warn!("Failed to renew lease on {}: {}", key, e),
    }
}

impl Drop for LeaseRenewer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
