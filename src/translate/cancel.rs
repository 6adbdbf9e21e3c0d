use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{TranslationError, TranslationResult};

/// Shared cancellation flag checked by scan loops before every row.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    Reading,
    Closed,
}

/// Admits one scan at a time and signals its completion.
///
/// `Idle → Reading → Idle` per scan; `close` waits until no scan is running and moves to the
/// terminal `Closed` state.
#[derive(Debug)]
pub(crate) struct ReadGate {
    state: Mutex<GateState>,
    done: Condvar,
}

impl ReadGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter the reading state. The returned guard leaves it when dropped.
    pub(crate) fn enter(&self) -> TranslationResult<ReadGuard<'_>> {
        let mut state = self.lock();
        match *state {
            GateState::Idle => {
                *state = GateState::Reading;
                Ok(ReadGuard { gate: self })
            }
            GateState::Reading => Err(TranslationError::ReadInProgress),
            GateState::Closed => Err(TranslationError::Closed),
        }
    }

    /// Block until no scan is running, then close the gate.
    ///
    /// Returns `false` if the gate was already closed.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.lock();
        while *state == GateState::Reading {
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let was_open = *state != GateState::Closed;
        *state = GateState::Closed;
        was_open
    }

    pub(crate) fn is_closed(&self) -> bool {
        *self.lock() == GateState::Closed
    }

    pub(crate) fn is_reading(&self) -> bool {
        *self.lock() == GateState::Reading
    }
}

/// Held for the duration of one scan.
#[derive(Debug)]
pub(crate) struct ReadGuard<'a> {
    gate: &'a ReadGate,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        if *state == GateState::Reading {
            *state = GateState::Idle;
        }
        self.gate.done.notify_all();
    }
}
