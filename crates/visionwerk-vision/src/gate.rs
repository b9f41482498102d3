// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sampling gate — limits face analysis to one frame per interval.
//
// The camera delivers frames far faster than the detector can usefully
// consume them. The gate drops every frame that arrives less than
// `interval` after the last accepted one, so results are delivered at a
// bounded rate regardless of camera frame rate.

use std::time::Duration;

use visionwerk_core::config::DEFAULT_SAMPLE_INTERVAL_MS;

/// Per-session debounce state.
///
/// One gate belongs to one camera session and is owned by that session's
/// worker, so it needs no locking.
#[derive(Debug, Clone)]
pub struct SamplingGate {
    /// Minimum spacing between accepted frames, in milliseconds.
    interval_ms: u64,
    /// Timestamp of the last accepted frame; `None` until the first accept.
    last_accepted: Option<u64>,
}

impl Default for SamplingGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingGate {
    /// Gate with the default 500 ms interval.
    pub fn new() -> Self {
        Self {
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            last_accepted: None,
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_accepted: None,
        }
    }

    /// Decide whether the frame arriving at `now_ms` should be analysed.
    ///
    /// Accepts, and records `now_ms`, when at least one interval has passed
    /// since the last accepted frame. The first call always accepts. A
    /// timestamp earlier than the last accepted one counts as zero elapsed
    /// time. Rejections leave the gate untouched.
    pub fn should_accept(&mut self, now_ms: u64) -> bool {
        let accept = match self.last_accepted {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if accept {
            self.last_accepted = Some(now_ms);
        }
        accept
    }

    /// Forget the last accepted frame, e.g. when the camera restarts.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(gate: &mut SamplingGate, timestamps: &[u64]) -> (Vec<u64>, Vec<u64>) {
        timestamps
            .iter()
            .partition(|&&t| gate.should_accept(t))
    }

    #[test]
    fn accepts_on_interval_boundaries() {
        let mut gate = SamplingGate::new();
        let (accepted, rejected) = partition(&mut gate, &[0, 100, 499, 500, 1000]);
        assert_eq!(accepted, vec![0, 500, 1000]);
        assert_eq!(rejected, vec![100, 499]);
    }

    #[test]
    fn first_frame_always_accepted() {
        let mut gate = SamplingGate::new();
        assert!(gate.should_accept(0));
        assert_eq!(gate.last_accepted(), Some(0));
    }

    #[test]
    fn rejection_never_mutates_state() {
        let mut gate = SamplingGate::new();
        assert!(gate.should_accept(1_000));
        for _ in 0..50 {
            assert!(!gate.should_accept(1_499));
        }
        assert_eq!(gate.last_accepted(), Some(1_000));
        assert!(gate.should_accept(1_500));
    }

    #[test]
    fn accepted_frames_are_at_least_one_interval_apart() {
        // Irregular arrival pattern: 33 ms camera ticks with jitter bursts.
        let mut timestamps = Vec::new();
        let mut t = 0u64;
        for i in 0..400u64 {
            t += 33 + (i * 7919) % 41;
            timestamps.push(t);
        }

        let mut gate = SamplingGate::new();
        let (accepted, _) = partition(&mut gate, &timestamps);
        assert_eq!(accepted.first(), timestamps.first());
        for pair in accepted.windows(2) {
            assert!(pair[1] - pair[0] >= 500, "{pair:?} closer than 500 ms");
        }

        // Same input, same decisions.
        let mut replay = SamplingGate::new();
        let (again, _) = partition(&mut replay, &timestamps);
        assert_eq!(accepted, again);
    }

    #[test]
    fn every_rejected_frame_falls_inside_an_interval() {
        let timestamps: Vec<u64> = (0..3_000).step_by(70).collect();
        let mut gate = SamplingGate::new();
        let mut last = None;
        for &t in &timestamps {
            let accepted = gate.should_accept(t);
            match last {
                None => assert!(accepted),
                Some(prev) => assert_eq!(accepted, t - prev >= 500, "t={t} prev={prev}"),
            }
            if accepted {
                last = Some(t);
            }
        }
    }

    #[test]
    fn clock_going_backwards_rejects() {
        let mut gate = SamplingGate::new();
        assert!(gate.should_accept(10_000));
        assert!(!gate.should_accept(2_000));
        assert_eq!(gate.last_accepted(), Some(10_000));
    }

    #[test]
    fn reset_accepts_next_frame() {
        let mut gate = SamplingGate::new();
        assert!(gate.should_accept(0));
        assert!(!gate.should_accept(10));
        gate.reset();
        assert!(gate.should_accept(10));
    }

    #[test]
    fn custom_interval() {
        let mut gate = SamplingGate::with_interval(Duration::from_millis(100));
        let (accepted, _) = partition(&mut gate, &[0, 50, 100, 150, 199, 200]);
        assert_eq!(accepted, vec![0, 100, 200]);
        assert_eq!(gate.interval(), Duration::from_millis(100));
    }
}
