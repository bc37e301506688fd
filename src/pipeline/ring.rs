//! Bounded lock-free MP/SC ring
//!
//! Array of atomic slots holding owning pointers; a null slot is empty.
//! Producers claim a slot by compare-exchanging null to their pointer and
//! then advance the tail; the single consumer takes ownership back the same
//! way at the head. Head and tail sit on separate cache lines.

use crossbeam_utils::CachePadded;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use thiserror::Error;

/// Ring construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Capacity must be a non-zero power of two
    #[error("queue capacity must be a power of two, got {0}")]
    InvalidArgument(usize),
}

/// Multi-producer/single-consumer bounded queue of boxed items.
///
/// `push` may be called from any number of threads; `pop` must only ever be
/// called from one thread at a time. FIFO per producer.
pub struct LockFreeQueue<T> {
    mask: usize,
    slots: Box<[AtomicPtr<T>]>,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
    /// The queue owns the boxed items currently enqueued
    _owns: PhantomData<Box<T>>,
}

impl<T> LockFreeQueue<T> {
    /// Create a ring with the given power-of-two capacity
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(QueueError::InvalidArgument(capacity));
        }

        let slots = (0..capacity)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();

        Ok(Self {
            mask: capacity - 1,
            slots,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            _owns: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Enqueue an item. Returns the item back when the ring is full or the
    /// slot claim is lost to a concurrent producer.
    pub fn push(&self, item: Box<T>) -> Result<(), Box<T>> {
        let raw = Box::into_raw(item);

        let tail = self.tail.load(Ordering::Relaxed);
        let next = (tail + 1) & self.mask;

        if next == self.head.load(Ordering::Acquire) {
            // SAFETY: `raw` came from Box::into_raw above and was never
            // published, so we still own it.
            return Err(unsafe { Box::from_raw(raw) });
        }

        match self.slots[tail].compare_exchange(
            ptr::null_mut(),
            raw,
            Ordering::Release,
            Ordering::Relaxed,
        ) {
            Ok(_) => {
                // Only the slot winner advances the tail, so it cannot move
                // backwards under producer races.
                let _ = self
                    .tail
                    .compare_exchange(tail, next, Ordering::Release, Ordering::Relaxed);
                Ok(())
            }
            // SAFETY: the claim failed, the pointer was never published.
            Err(_) => Err(unsafe { Box::from_raw(raw) }),
        }
    }

    /// Dequeue the oldest item. Single consumer only.
    pub fn pop(&self) -> Option<Box<T>> {
        let head = self.head.load(Ordering::Relaxed);

        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }

        let raw = self.slots[head].load(Ordering::Acquire);
        if raw.is_null() {
            // Claimed but not yet published
            return None;
        }

        match self.slots[head].compare_exchange(
            raw,
            ptr::null_mut(),
            Ordering::Release,
            Ordering::Relaxed,
        ) {
            Ok(_) => {
                self.head.store((head + 1) & self.mask, Ordering::Release);
                // SAFETY: the compare-exchange transferred ownership of the
                // published pointer to us, exactly once.
                Some(unsafe { Box::from_raw(raw) })
            }
            Err(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head) & self.mask
    }
}

impl<T> Drop for LockFreeQueue<T> {
    fn drop(&mut self) {
        // Drain and free anything still enqueued
        while self.pop().is_some() {}
    }
}
