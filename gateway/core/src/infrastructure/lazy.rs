// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Shared handle created on first use and released once at shutdown.

use std::future::Future;
use tokio::sync::RwLock;

enum Slot<T> {
    Empty,
    Ready(T),
    Closed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AcquireError<E> {
    Closed,
    Init(E),
}

/// Lazily-initialized, cheaply clonable resource (HTTP client, connection pool).
///
/// Concurrent first callers race on the write lock; exactly one runs `init`.
/// After [`LazyResource::release`] every acquisition fails with
/// [`AcquireError::Closed`].
pub struct LazyResource<T> {
    slot: RwLock<Slot<T>>,
}

impl<T: Clone> LazyResource<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::Empty),
        }
    }

    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<T, AcquireError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match &*self.slot.read().await {
            Slot::Ready(value) => return Ok(value.clone()),
            Slot::Closed => return Err(AcquireError::Closed),
            Slot::Empty => {}
        }

        let mut slot = self.slot.write().await;
        match &*slot {
            Slot::Ready(value) => Ok(value.clone()),
            Slot::Closed => Err(AcquireError::Closed),
            Slot::Empty => {
                let value = init().await.map_err(AcquireError::Init)?;
                *slot = Slot::Ready(value.clone());
                Ok(value)
            }
        }
    }

    /// Mark the resource closed. Returns the live value only on the first call
    /// after it was initialized.
    pub async fn release(&self) -> Option<T> {
        let mut slot = self.slot.write().await;
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Ready(value) => Some(value),
            Slot::Empty | Slot::Closed => None,
        }
    }

    pub async fn is_closed(&self) -> bool {
        matches!(&*self.slot.read().await, Slot::Closed)
    }
}

impl<T: Clone> Default for LazyResource<T> {
    fn default() -> Self {
        Self::new()
    }
}
