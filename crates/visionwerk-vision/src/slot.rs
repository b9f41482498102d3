// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keep-only-latest hand-off between the camera callback and the worker.
//
// The camera thread never waits: a new frame replaces any frame the worker
// has not picked up yet, and the replaced frame is released on the spot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use visionwerk_core::frame::Frame;

/// What happened to a frame passed to [`LatestFrameSlot::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    /// Slot was empty.
    Stored,
    /// An undelivered frame was dropped to make room.
    Replaced,
    /// Slot is closed; the frame was released immediately.
    Closed,
}

#[derive(Default)]
struct SlotState {
    frame: Option<Frame>,
    closed: bool,
}

#[derive(Default)]
pub(crate) struct LatestFrameSlot {
    state: Mutex<SlotState>,
    notify: Notify,
}

impl LatestFrameSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn offer(&self, frame: Frame) -> Offer {
        // Evicted frames are released after the lock is dropped.
        let (outcome, evicted) = {
            let mut state = self.lock();
            if state.closed {
                (Offer::Closed, Some(frame))
            } else {
                match state.frame.replace(frame) {
                    Some(old) => (Offer::Replaced, Some(old)),
                    None => (Offer::Stored, None),
                }
            }
        };
        drop(evicted);
        if outcome != Offer::Closed {
            self.notify.notify_one();
        }
        outcome
    }

    /// Wait for the next frame. Returns `None` once the slot is closed.
    pub(crate) async fn next(&self) -> Option<Frame> {
        loop {
            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(frame) = state.frame.take() {
                    return Some(frame);
                }
            }
            self.notify.notified().await;
        }
    }

    /// Stop accepting frames and release any frame still waiting.
    pub(crate) fn close(&self) {
        let pending = {
            let mut state = self.lock();
            state.closed = true;
            state.frame.take()
        };
        drop(pending);
        self.notify.notify_one();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
