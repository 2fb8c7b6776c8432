use serde::{Deserialize, Serialize};

/// Pause-aware elapsed time for one round.
///
/// Timestamps are host milliseconds (e.g. the frame callback's clock). Elapsed
/// time excludes every paused interval and is frozen while paused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundClock {
    start_ms: Option<u64>,
    accumulated_paused_ms: u64,
    pause_started_ms: Option<u64>,
}

impl RoundClock {
    pub fn start(&mut self, now_ms: u64) {
        self.start_ms = Some(now_ms);
        self.accumulated_paused_ms = 0;
        self.pause_started_ms = None;
    }

    pub fn is_started(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_ms.is_some()
    }

    /// Returns false if already paused or not started.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.start_ms.is_none() || self.pause_started_ms.is_some() {
            return false;
        }
        self.pause_started_ms = Some(now_ms);
        true
    }

    /// Returns false if not paused.
    pub fn resume(&mut self, now_ms: u64) -> bool {
        let Some(paused_at) = self.pause_started_ms.take() else {
            return false;
        };
        self.accumulated_paused_ms += now_ms.saturating_sub(paused_at);
        true
    }

    pub fn accumulated_paused_ms(&self) -> u64 {
        self.accumulated_paused_ms
    }

    /// Active play time at `now_ms`.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let Some(start) = self.start_ms else {
            return 0;
        };
        let end = self.pause_started_ms.unwrap_or(now_ms);
        end.saturating_sub(start)
            .saturating_sub(self.accumulated_paused_ms)
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> f64 {
        self.elapsed_ms(now_ms) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn unstarted_clock_reads_zero() {
        let clock = RoundClock::default();
        assert_eq!(clock.elapsed_ms(5_000), 0);
    }

    #[test]
    fn excludes_paused_interval() {
        let mut clock = RoundClock::default();
        clock.start(1_000);
        assert!(clock.pause(4_000));
        assert!(clock.resume(9_000));
        assert_eq!(clock.elapsed_ms(10_000), 4_000);
        assert_eq!(clock.accumulated_paused_ms(), 5_000);
    }

    #[test]
    fn frozen_while_paused() {
        let mut clock = RoundClock::default();
        clock.start(0);
        clock.pause(2_500);
        assert_eq!(clock.elapsed_ms(3_000), 2_500);
        assert_eq!(clock.elapsed_ms(60_000), 2_500);
    }

    #[test]
    fn double_pause_keeps_first_timestamp() {
        let mut clock = RoundClock::default();
        clock.start(0);
        assert!(clock.pause(1_000));
        assert!(!clock.pause(2_000));
        clock.resume(3_000);
        assert_eq!(clock.elapsed_ms(4_000), 2_000);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let mut clock = RoundClock::default();
        clock.start(0);
        assert!(!clock.resume(1_000));
        assert_eq!(clock.elapsed_ms(1_000), 1_000);
    }

    #[test]
    fn backwards_timestamps_saturate() {
        let mut clock = RoundClock::default();
        clock.start(5_000);
        assert_eq!(clock.elapsed_ms(4_000), 0);
    }

    #[test]
    fn restart_clears_pauses() {
        let mut clock = RoundClock::default();
        clock.start(0);
        clock.pause(10);
        clock.start(100);
        assert!(!clock.is_paused());
        assert_eq!(clock.elapsed_ms(150), 50);
    }

    proptest! {
        #[test]
        fn elapsed_is_wall_time_minus_pauses(
            spans in proptest::collection::vec((0u64..5_000, 0u64..5_000), 0..20),
            tail in 0u64..5_000,
        ) {
            let mut clock = RoundClock::default();
            let mut now = 1_000u64;
            clock.start(now);
            let mut paused_total = 0u64;
            for (play, pause) in spans {
                now += play;
                clock.pause(now);
                now += pause;
                paused_total += pause;
                clock.resume(now);
            }
            now += tail;
            prop_assert_eq!(clock.elapsed_ms(now), now - 1_000 - paused_total);
        }

        #[test]
        fn monotonic_while_running(steps in proptest::collection::vec(0u64..500, 1..50)) {
            let mut clock = RoundClock::default();
            clock.start(0);
            let mut now = 0;
            let mut last = 0;
            for s in steps {
                now += s;
                let e = clock.elapsed_ms(now);
                prop_assert!(e >= last);
                last = e;
            }
        }
    }
}
