//! Slot pool: a fixed table of reusable transport handles.
//!
//! Slot 0 is reserved and never chosen by the allocation scan; indices
//! 1 through capacity - 1 are usable. A slot's transport is constructed on
//! first acquisition and cached for the lifetime of the pool, so repeated
//! dispatches reuse the same handle instead of rebuilding it.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFactory, TransportKind};

/// Allocation state of one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotStatus {
    #[default]
    Free,
    InUse,
}

struct Slot {
    status: SlotStatus,
    transport: Option<Arc<dyn Transport>>,
    /// Kind recorded when the transport was constructed; drives
    /// request-method selection only.
    kind: TransportKind,
}

impl Slot {
    fn new() -> Self {
        Self {
            status: SlotStatus::Free,
            transport: None,
            kind: TransportKind::Standard,
        }
    }
}

/// Counts of slot states at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    /// Total slots, including the reserved slot 0.
    pub capacity: usize,
    /// Usable slots currently free.
    pub available: usize,
    /// Slots currently held by an in-flight exchange.
    pub in_use: usize,
}

/// Fixed-capacity pool of transport slots.
///
/// The mutex guards only the slot table, never a blocking exchange.
/// [`acquire`](SlotPool::acquire) hands out a [`SlotGuard`] that releases
/// its slot on drop, so a failed exchange cannot leak capacity.
pub struct SlotPool {
    slots: Mutex<Vec<Slot>>,
    capacity: usize,
    factory: Box<dyn TransportFactory>,
}

impl SlotPool {
    /// Create a pool with `capacity` slots (index 0 reserved). Capacities
    /// below 2 leave no usable slot: every acquire reports exhaustion.
    pub fn new(capacity: usize, factory: Box<dyn TransportFactory>) -> Self {
        let slots = (0..capacity).map(|_| Slot::new()).collect();
        Self {
            slots: Mutex::new(slots),
            capacity,
            factory,
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("slot table mutex poisoned, continuing with recovered state");
                poisoned.into_inner()
            }
        }
    }

    /// Take the lowest-numbered free slot, constructing its transport if
    /// this is the slot's first use. Construction failures free the slot
    /// again before returning.
    pub fn acquire(&self) -> Result<SlotGuard<'_>> {
        let mut slots = self.lock_slots();
        for (index, slot) in slots.iter_mut().enumerate().skip(1) {
            if slot.status != SlotStatus::Free {
                continue;
            }
            slot.status = SlotStatus::InUse;

            let transport = match &slot.transport {
                Some(existing) => Arc::clone(existing),
                None => match self.factory.create(index) {
                    Ok(created) => {
                        let created: Arc<dyn Transport> = Arc::from(created);
                        slot.kind = created.kind();
                        slot.transport = Some(Arc::clone(&created));
                        tracing::debug!(
                            slot = index,
                            kind = created.kind().as_str(),
                            "transport constructed"
                        );
                        created
                    }
                    Err(error) => {
                        slot.status = SlotStatus::Free;
                        return Err(Error::TransportUnavailable {
                            slot: index,
                            reason: error.to_string(),
                        });
                    }
                },
            };

            let kind = slot.kind;
            tracing::trace!(slot = index, "slot acquired");
            return Ok(SlotGuard {
                pool: self,
                index,
                transport,
                kind,
            });
        }
        Err(Error::PoolExhausted {
            capacity: self.capacity,
        })
    }

    /// Release by raw handle. Out-of-range handles fail with
    /// [`Error::InvalidHandle`] and change nothing; in-range handles are
    /// marked free unconditionally, even when already free.
    pub fn release_index(&self, handle: usize) -> Result<()> {
        let mut slots = self.lock_slots();
        if handle >= slots.len() {
            return Err(Error::InvalidHandle {
                handle,
                capacity: self.capacity,
            });
        }
        slots[handle].status = SlotStatus::Free;
        tracing::trace!(slot = handle, "slot released");
        Ok(())
    }

    /// Status of one slot. Out-of-range handles fail with
    /// [`Error::InvalidHandle`].
    pub fn slot_status(&self, handle: usize) -> Result<SlotStatus> {
        let slots = self.lock_slots();
        match slots.get(handle) {
            Some(slot) => Ok(slot.status),
            None => Err(Error::InvalidHandle {
                handle,
                capacity: self.capacity,
            }),
        }
    }

    /// Total slot count, including the reserved slot 0.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Usable slots currently free.
    pub fn available(&self) -> usize {
        let slots = self.lock_slots();
        slots
            .iter()
            .skip(1)
            .filter(|slot| slot.status == SlotStatus::Free)
            .count()
    }

    /// Consistent snapshot of the slot states.
    pub fn snapshot(&self) -> PoolSnapshot {
        let slots = self.lock_slots();
        let available = slots
            .iter()
            .skip(1)
            .filter(|slot| slot.status == SlotStatus::Free)
            .count();
        let in_use = slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::InUse)
            .count();
        PoolSnapshot {
            capacity: self.capacity,
            available,
            in_use,
        }
    }
}

/// A slot held by one in-flight exchange. Dropping the guard releases the
/// slot; [`release`](SlotGuard::release) does the same with the intent
/// spelled out.
pub struct SlotGuard<'a> {
    pool: &'a SlotPool,
    index: usize,
    transport: Arc<dyn Transport>,
    kind: TransportKind,
}

impl SlotGuard<'_> {
    /// Handle of the held slot.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The slot's cached transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Kind recorded when the slot's transport was constructed.
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Release the slot now.
    pub fn release(self) {}
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.pool.release_index(self.index) {
            tracing::error!(slot = self.index, %error, "failed to release slot");
        }
    }
}
