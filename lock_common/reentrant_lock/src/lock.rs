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

use log::{debug, info, warn};
use store_client::StoreError;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::error::{DistributedLockError, Result};
use super::lease::{LeaseOptions, LeaseRenewer};
use super::store::LockStore;

/// Local bookkeeping of one handle, guarded by the handle's mutex
#[derive(Debug, Default)]
struct LockState {
    /// Outstanding nested acquisitions; 0 means not held
    count: u32,
    renewer: Option<LeaseRenewer>,
}

/// Reentrant distributed lock bound to one key and one owner value.
///
/// Reentrancy is per handle: every caller sharing this handle (for example
/// through an `Arc`) re-enters instead of contending. Each successful
/// `acquire` must be paired with a `release`; dropping a held handle stops
/// lease renewal and leaves the key in the store until its lease expires.
pub struct ReentrantLock {
    /// Lock key name
    key: String,
    /// Lock value, used to identify the lock owner
    value: String,
    options: LeaseOptions,
    store: Arc<dyn LockStore>,
    state: Mutex<LockState>,
}

impl ReentrantLock {
    /// Create a new reentrant lock
    ///
    /// # Arguments
    ///
    /// * `store` - Store holding the lock keys
    /// * `key` - Lock key name shared by all processes
    /// * `value` - Lock value, unique to this handle
    /// * `options` - Lease duration and renewal ratio
    pub fn new(
        store: Arc<dyn LockStore>,
        key: impl Into<String>,
        value: impl Into<String>,
        options: LeaseOptions,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            options,
            store,
            state: Mutex::new(LockState::default()),
        }
    }

    /// Create a lock whose owner value is a random UUID
    pub fn with_random_value(store: Arc<dyn LockStore>, key: impl Into<String>, options: LeaseOptions) -> Self {
        Self::new(store, key, Uuid::new_v4().to_string(), options)
    }

    /// Acquire the lock
    ///
    /// Re-entering a held handle only bumps the local count. Otherwise a single
    /// set-if-absent is attempted; on success a lease renewer is started on a
    /// child of `ctx`, so cancelling `ctx` also ends renewal.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` once the lock is held by this handle.
    ///
    /// # Errors
    ///
    /// * `DistributedLockError::LockContention` - The key is held by another owner.
    /// * `DistributedLockError::Store` - The store call failed, or `ctx` was cancelled.
    ///   A write that lands after `ctx` is cancelled is deleted again before returning.
    pub async fn acquire(&self, ctx: &CancellationToken) -> Result<bool> {
        let mut state = self.state.lock().await;

        if state.count > 0 {
            state.count += 1;
            debug!("Re-entered lock {} (count {})", self.key, state.count);
            return Ok(true);
        }

        ensure_live(ctx)?;
        let acquired = self.store.set_if_absent(&self.key, &self.value, None).await?;
        if !acquired {
            debug!("Lock {} is held by another owner", self.key);
            return Err(DistributedLockError::LockContention(self.key.clone()));
        }
        if ctx.is_cancelled() {
            // Cancelled while the write was in flight: the key is ours but would never be renewed
            match self.store.compare_and_delete(&self.key, &self.value).await {
                Ok(_) => debug!("Undid acquisition of lock {} after cancellation", self.key),
                Err(e) => warn!("Failed to undo cancelled acquisition of lock {}: {}", self.key, e),
            }
            return Err(StoreError::Cancelled.into());
        }

        // A renewer left behind by a failed final release must not overlap the new one
        if let Some(stale) = state.renewer.take() {
            stale.stop();
        }
        state.renewer = Some(LeaseRenewer::start(
            self.store.clone(),
            self.key.clone(),
            self.options,
            ctx.child_token(),
        ));
        state.count = 1;
        info!("Acquired lock {}", self.key);
        Ok(true)
    }

    /// Release the lock
    ///
    /// Only the final release touches the store: the local count is cleared
    /// first, then the key is deleted if it still holds this handle's value.
    /// Releasing an unheld handle is a no-op.
    ///
    /// # Errors
    ///
    /// * `DistributedLockError::LockOwnership` - The key is gone or owned by someone else.
    /// * `DistributedLockError::Store` - `ctx` was already cancelled, in which case
    ///   nothing changes and the handle stays held; or the store call failed. In the
    ///   latter case the handle is already unheld locally and its renewer keeps
    ///   running until the next acquisition, the handle is dropped, or `ctx` of the
    ///   acquisition is cancelled. If the delete ran but its reply was lost, that
    ///   renewer only finds a missing key, which it logs and leaves absent.
    pub async fn release(&self, ctx: &CancellationToken) -> Result<bool> {
        let mut state = self.state.lock().await;

        match state.count {
            0 => Ok(true),
            1 => {
                ensure_live(ctx)?;
                state.count = 0;
                let deleted = self.store.compare_and_delete(&self.key, &self.value).await?;
                if deleted == 0 {
                    // The key is no longer ours; renewing it would extend a foreign lease
                    if let Some(renewer) = state.renewer.take() {
                        renewer.stop();
                    }
                    warn!("Lock {} was not owned at release", self.key);
                    return Err(DistributedLockError::LockOwnership(self.key.clone()));
                }
                if let Some(renewer) = state.renewer.take() {
                    renewer.stop();
                }
                info!("Released lock {}", self.key);
                Ok(true)
            }
            _ => {
                state.count -= 1;
                debug!("Left lock {} (count {})", self.key, state.count);
                Ok(true)
            }
        }
    }

    /// Get lock key name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get lock value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> LeaseOptions {
        self.options
    }

    /// Number of outstanding acquisitions through this handle
    pub async fn reentrancy_count(&self) -> u32 {
        self.state.lock().await.count
    }

    pub async fn is_held(&self) -> bool {
        self.reentrancy_count().await > 0
    }
}

impl std::fmt::Debug for ReentrantLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReentrantLock")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Drop for ReentrantLock {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.count > 0 {
            warn!(
                "Lock {} dropped while held {} time(s); key remains until its lease expires",
                self.key, state.count
            );
        }
    }
}

/// A cancelled context stops a store call from being sent; a call already
/// sent always runs to completion.
fn ensure_live(ctx: &CancellationToken) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(StoreError::Cancelled.into());
    }
    Ok(())
}
