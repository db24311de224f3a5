//! De-duplication of resubmitted orders
//!
//! Clients may attach a `requestId` to a submission. The ledger remembers
//! which ids are in flight and which completed, so a double-click or a
//! network retry does not send a second email.

use super::Acknowledgement;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Completed entries kept before the oldest are forgotten
pub const DEFAULT_LEDGER_CAPACITY: usize = 10_000;

/// Result of claiming a request id
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// First time this id is seen; the caller now owns it
    Fresh,
    /// Another request with this id has not finished
    InFlight,
    /// This id already completed with the given acknowledgement
    Completed(Acknowledgement),
}

#[derive(Debug, Clone)]
enum Entry {
    InFlight,
    Completed(Acknowledgement),
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    completed_order: VecDeque<String>,
}

/// Tracks request ids across submissions
#[derive(Debug)]
pub struct SubmissionLedger {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl SubmissionLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves the maps consistent, so a poisoned
        // lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `request_id` for a new submission
    pub fn reserve(&self, request_id: &str) -> Reservation {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.entries.get(request_id) {
            Some(Entry::InFlight) => return Reservation::InFlight,
            Some(Entry::Completed(ack)) => return Reservation::Completed(ack.clone()),
            None => {}
        }

        inner
            .entries
            .insert(request_id.to_string(), Entry::InFlight);
        Reservation::Fresh
    }

    /// Record the outcome of a reserved id
    pub fn complete(&self, request_id: &str, ack: Acknowledgement) {
        let mut inner = self.lock();
        inner
            .entries
            .insert(request_id.to_string(), Entry::Completed(ack));
        inner.completed_order.push_back(request_id.to_string());

        while inner.completed_order.len() > self.capacity {
            if let Some(oldest) = inner.completed_order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    /// Give up a reserved id so the client may retry it
    pub fn release(&self, request_id: &str) {
        let mut inner = self.lock();
        if matches!(inner.entries.get(request_id), Some(Entry::InFlight)) {
            inner.entries.remove(request_id);
        }
    }
}

/// Releases a reserved id when dropped unless it was completed
///
/// Covers the request future being dropped mid-send, e.g. when the client
/// disconnects.
pub struct ReservationGuard<'a> {
    ledger: &'a SubmissionLedger,
    request_id: String,
    armed: bool,
}

impl<'a> ReservationGuard<'a> {
    pub fn new(ledger: &'a SubmissionLedger, request_id: impl Into<String>) -> Self {
        Self {
            ledger,
            request_id: request_id.into(),
            armed: true,
        }
    }

    /// Record the acknowledgement and disarm the guard
    pub fn complete(mut self, ack: Acknowledgement) {
        self.ledger.complete(&self.request_id, ack);
        self.armed = false;
    }
}

impl Drop for ReservationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ledger.release(&self.request_id);
        }
    }
}

impl Default for SubmissionLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}
