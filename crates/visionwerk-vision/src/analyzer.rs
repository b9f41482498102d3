// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis session — one camera session's frame pipeline.
//
// ```text
//   camera callback ──offer──▶ [latest-frame slot] ──▶ worker task
//                                                        │ no image → release
//                                                        │ gate reject → release
//                                                        ▼ gate accept
//                                                  detection task (JoinSet)
//                                                        │ detector.await
//                                                        │ map → publish (watch, if newest)
//                                                        ▼ release
// ```
//
// The worker is the only reader/writer of the sampling gate. Detection runs
// on spawned tasks so a slow detector never stalls intake; the worker keeps
// them in a `JoinSet` and drains it on shutdown so every submitted frame is
// released after its result arrives.
//
// Detections may finish out of order. Each accepted frame carries a sequence
// number and a result is only published if no newer frame's result has been
// published yet. `processing` stays set while any detection is in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, trace, warn};

use visionwerk_core::AppConfig;
use visionwerk_core::frame::Frame;
use visionwerk_core::types::{DetectionResult, DetectorOptions, FaceScreenState, SessionId};

use crate::clock::{MonotonicClock, SystemClock};
use crate::detector::FaceDetector;
use crate::gate::SamplingGate;
use crate::mapping::map_faces;
use crate::slot::{LatestFrameSlot, Offer};

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum spacing between frames forwarded to the detector.
    pub sample_interval: Duration,
    /// Options the detector was built with (logged at session start).
    pub detector: DetectorOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            sample_interval: config.sample_interval(),
            detector: config.detector,
        }
    }
}

/// Snapshot of a session's frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the frame sink.
    pub offered: u64,
    /// Frames replaced in the slot before the worker saw them.
    pub dropped_at_source: u64,
    /// Frames without a decodable image.
    pub no_image: u64,
    /// Frames dropped by the sampling gate.
    pub rejected: u64,
    /// Frames forwarded to the detector.
    pub accepted: u64,
    /// Detections that resolved (successfully or not).
    pub completed: u64,
    /// Detections that failed.
    pub failed: u64,
    /// Results discarded because a newer frame's result was already shown.
    pub superseded: u64,
}

impl SessionStats {
    /// Frames the worker has made a decision about.
    pub fn decided(&self) -> u64 {
        self.no_image + self.rejected + self.accepted
    }
}

#[derive(Debug, Default)]
struct Counters {
    offered: AtomicU64,
    dropped_at_source: AtomicU64,
    no_image: AtomicU64,
    rejected: AtomicU64,
    accepted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    superseded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SessionStats {
        SessionStats {
            offered: self.offered.load(Ordering::Relaxed),
            dropped_at_source: self.dropped_at_source.load(Ordering::Relaxed),
            no_image: self.no_image.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }
}

/// Writer side of the screen state.
///
/// Bookkeeping is updated inside `send_modify`, whose lock serialises every
/// publication, so the in-flight count and the last published sequence always
/// agree with the state observers see.
struct Publisher {
    tx: watch::Sender<FaceScreenState>,
    in_flight: AtomicU64,
    published_seq: AtomicU64,
}

impl Publisher {
    fn new(tx: watch::Sender<FaceScreenState>) -> Self {
        Self {
            tx,
            in_flight: AtomicU64::new(0),
            published_seq: AtomicU64::new(0),
        }
    }

    /// A detection was submitted.
    fn begin(&self) {
        self.tx.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::Relaxed);
            state.processing = true;
        });
    }

    /// The detection for frame `seq` resolved. Returns `false` if its result
    /// was older than the one on screen and was dropped.
    fn finish(&self, seq: u64, result: DetectionResult) -> bool {
        let mut fresh = false;
        self.tx.send_modify(|state| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
            if seq > self.published_seq.load(Ordering::Relaxed) {
                self.published_seq.store(seq, Ordering::Relaxed);
                state.result = result;
                fresh = true;
            }
            state.processing = remaining > 0;
        });
        fresh
    }
}

/// Camera-facing handle of a session.
///
/// Cheap to clone; the platform camera callback holds one and offers every
/// frame it produces. Offering never blocks.
#[derive(Clone)]
pub struct FrameSink {
    slot: Arc<LatestFrameSlot>,
    counters: Arc<Counters>,
}

impl FrameSink {
    /// Hand a frame to the session.
    ///
    /// Returns `false` when the session has shut down; the frame has then
    /// already been released.
    pub fn offer(&self, frame: Frame) -> bool {
        Counters::bump(&self.counters.offered);
        match self.slot.offer(frame) {
            Offer::Stored => true,
            Offer::Replaced => {
                Counters::bump(&self.counters.dropped_at_source);
                true
            }
            Offer::Closed => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.slot.is_closed()
    }
}

/// A running analysis session.
///
/// Must be started from within a Tokio runtime.
pub struct AnalysisSession {
    id: SessionId,
    sink: FrameSink,
    state_rx: watch::Receiver<FaceScreenState>,
    counters: Arc<Counters>,
    worker: JoinHandle<()>,
}

impl AnalysisSession {
    /// Start a session reading time from a fresh [`SystemClock`].
    pub fn start<D: FaceDetector>(detector: Arc<D>, config: SessionConfig) -> Self {
        Self::start_with_clock(detector, SystemClock::new(), config)
    }

    /// Start a session with an explicit time source.
    pub fn start_with_clock<D, C>(detector: Arc<D>, clock: C, config: SessionConfig) -> Self
    where
        D: FaceDetector,
        C: MonotonicClock,
    {
        let id = SessionId::new();
        let slot = Arc::new(LatestFrameSlot::new());
        let counters = Arc::new(Counters::default());
        let (state_tx, state_rx) = watch::channel(FaceScreenState::default());

        info!(
            session = %id,
            interval_ms = config.sample_interval.as_millis() as u64,
            detector = ?config.detector,
            "analysis session started"
        );

        let worker = Worker {
            id,
            detector,
            clock,
            gate: SamplingGate::with_interval(config.sample_interval),
            slot: Arc::clone(&slot),
            publisher: Arc::new(Publisher::new(state_tx)),
            counters: Arc::clone(&counters),
            in_flight: JoinSet::new(),
            next_seq: 0,
        };
        let worker = tokio::spawn(worker.run());

        Self {
            id,
            sink: FrameSink {
                slot,
                counters: Arc::clone(&counters),
            },
            state_rx,
            counters,
            worker,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn frame_sink(&self) -> FrameSink {
        self.sink.clone()
    }

    /// Subscribe to screen state updates.
    pub fn subscribe(&self) -> watch::Receiver<FaceScreenState> {
        self.state_rx.clone()
    }

    /// The most recently published screen state.
    pub fn current(&self) -> FaceScreenState {
        self.state_rx.borrow().clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    /// End the session.
    ///
    /// No further frames are processed and a frame still waiting in the slot
    /// is released. Detections already submitted are awaited, and their
    /// frames released, before this returns.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn shutdown(self) -> SessionStats {
        self.sink.slot.close();
        if let Err(e) = self.worker.await {
            error!(error = %e, "analysis worker terminated abnormally");
        }
        let stats = self.counters.snapshot();
        info!(?stats, "analysis session stopped");
        stats
    }
}

struct Worker<D, C> {
    id: SessionId,
    detector: Arc<D>,
    clock: C,
    gate: SamplingGate,
    slot: Arc<LatestFrameSlot>,
    publisher: Arc<Publisher>,
    counters: Arc<Counters>,
    in_flight: JoinSet<()>,
    /// Sequence number of the last accepted frame.
    next_seq: u64,
}

impl<D: FaceDetector, C: MonotonicClock> Worker<D, C> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                next = self.slot.next() => match next {
                    Some(frame) => self.handle(frame),
                    None => break,
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(session = %self.id, error = %e, "detection task failed");
                    }
                }
            }
        }

        let pending = self.in_flight.len();
        if pending > 0 {
            debug!(session = %self.id, pending, "draining in-flight detections");
        }
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                error!(session = %self.id, error = %e, "detection task failed");
            }
        }
    }

    fn handle(&mut self, frame: Frame) {
        let Some(image) = frame.image().cloned() else {
            Counters::bump(&self.counters.no_image);
            trace!(session = %self.id, "frame carried no image");
            frame.close();
            return;
        };

        let now = self.clock.now_millis();
        if !self.gate.should_accept(now) {
            Counters::bump(&self.counters.rejected);
            frame.close();
            return;
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        trace!(session = %self.id, now, seq, "frame accepted for detection");
        self.publisher.begin();
        Counters::bump(&self.counters.accepted);

        let id = self.id;
        let detector = Arc::clone(&self.detector);
        let publisher = Arc::clone(&self.publisher);
        let counters = Arc::clone(&self.counters);
        let rotation = frame.rotation_degrees();

        self.in_flight.spawn(async move {
            let result = match detector.detect(image, rotation).await {
                Ok(faces) => {
                    debug!(session = %id, faces = faces.len(), "faces detected");
                    map_faces(&faces)
                }
                Err(e) => {
                    warn!(session = %id, error = %e, "face detection failed");
                    Counters::bump(&counters.failed);
                    DetectionResult::empty()
                }
            };
            if !publisher.finish(seq, result) {
                debug!(session = %id, seq, "result superseded by a newer frame");
                Counters::bump(&counters.superseded);
            }
            Counters::bump(&counters.completed);
            frame.close();
        });
    }
}
