//! Temporal gesture predicates over scalar histories.
//!
//! A reading `>= 0.5` counts as high (pressed), anything below as low.
//! Because histories coalesce repeated readings, the indices inspected here
//! are distinct transitions: `click` sees low → high → low no matter how many
//! identical polls happened in between.

use crate::history::History;
use crate::sample::Vec1;
use serde::{Deserialize, Serialize};

/// Level separating released from pressed on a normalized `[0, 1]` control.
pub const PRESS_LEVEL: f32 = 0.5;

/// Default window for single-edge predicates (`idle`, `trigger`, `release`).
pub const EDGE_INTERVAL: f64 = 0.0125;

/// Default window for multi-edge predicates (`click`, `dclick`).
pub const CLICK_INTERVAL: f64 = 0.5;

/// The fixed set of recognized patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Idle,
    Trigger,
    Hold,
    Release,
    Click,
    DoubleClick,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Trigger => "trigger",
            Self::Hold => "hold",
            Self::Release => "release",
            Self::Click => "click",
            Self::DoubleClick => "dclick",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time windows applied when evaluating predicates on behalf of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureWindows {
    /// Max seconds between the two samples of an edge.
    ///
    /// Only affects edge queries made on later ticks (`is`, `*_within`).
    /// On the tick that records a transition both samples carry the same
    /// timestamp, so [`fired`](Self::fired) reports the edge for any
    /// non-negative value.
    pub edge_interval: f64,
    /// Max seconds spanned by a click or double click.
    pub click_interval: f64,
}

impl Default for GestureWindows {
    fn default() -> Self {
        Self {
            edge_interval: EDGE_INTERVAL,
            click_interval: CLICK_INTERVAL,
        }
    }
}

impl GestureWindows {
    /// Edge gestures completed by the newest transition of `button`.
    ///
    /// Meant to be called right after `set` reported a new transition;
    /// level gestures (`idle`, `hold`) are never reported.  Only
    /// `click_interval` can suppress an event here.
    pub fn fired(&self, button: &History<Vec1>) -> Vec<Gesture> {
        let mut fired = Vec::new();
        if button.trigger_within(self.edge_interval) {
            fired.push(Gesture::Trigger);
        }
        if button.release_within(self.edge_interval) {
            fired.push(Gesture::Release);
        }
        if button.click_within(self.click_interval) {
            fired.push(Gesture::Click);
        }
        if button.dclick_within(self.click_interval) {
            fired.push(Gesture::DoubleClick);
        }
        fired
    }
}

fn high(x: f32) -> bool {
    x >= PRESS_LEVEL
}

impl History<Vec1> {
    /// Levels of the `depth` newest samples, or `None` when the newest and
    /// the deepest sample lie more than `interval` seconds apart.
    fn window(&self, depth: usize, interval: f64) -> Option<Vec<bool>> {
        debug_assert!(
            depth <= self.size(),
            "gesture needs {depth} samples, history holds {}",
            self.size()
        );
        let deepest = self.get(depth - 1)?;
        if self.newest().t - deepest.t > interval {
            return None;
        }
        Some(self.iter().take(depth).map(|s| high(s.x())).collect())
    }

    /// low → low.
    pub fn idle_within(&self, interval: f64) -> bool {
        matches!(self.window(2, interval).as_deref(), Some([false, false]))
    }

    /// low → high.
    pub fn trigger_within(&self, interval: f64) -> bool {
        matches!(self.window(2, interval).as_deref(), Some([true, false]))
    }

    /// high → low.
    pub fn release_within(&self, interval: f64) -> bool {
        matches!(self.window(2, interval).as_deref(), Some([false, true]))
    }

    /// low → high → low.
    pub fn click_within(&self, interval: f64) -> bool {
        matches!(self.window(3, interval).as_deref(), Some([false, true, false]))
    }

    /// low → high → low → high → low.
    pub fn dclick_within(&self, interval: f64) -> bool {
        matches!(
            self.window(5, interval).as_deref(),
            Some([false, true, false, true, false])
        )
    }

    pub fn idle(&self) -> bool {
        self.idle_within(EDGE_INTERVAL)
    }

    pub fn trigger(&self) -> bool {
        self.trigger_within(EDGE_INTERVAL)
    }

    /// Currently high; no time window.
    pub fn hold(&self) -> bool {
        high(self.newest().x())
    }

    pub fn release(&self) -> bool {
        self.release_within(EDGE_INTERVAL)
    }

    pub fn click(&self) -> bool {
        self.click_within(CLICK_INTERVAL)
    }

    pub fn dclick(&self) -> bool {
        self.dclick_within(CLICK_INTERVAL)
    }

    /// Evaluate a single gesture with the given windows.
    pub fn is(&self, gesture: Gesture, windows: &GestureWindows) -> bool {
        match gesture {
            Gesture::Idle => self.idle_within(windows.edge_interval),
            Gesture::Trigger => self.trigger_within(windows.edge_interval),
            Gesture::Hold => self.hold(),
            Gesture::Release => self.release_within(windows.edge_interval),
            Gesture::Click => self.click_within(windows.click_interval),
            Gesture::DoubleClick => self.dclick_within(windows.click_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::history::Button;
    use std::sync::Arc;

    /// 60 Hz poll period.
    const TICK: f64 = 1.0 / 60.0;

    fn button() -> (Arc<ManualClock>, Button) {
        let clock = ManualClock::shared();
        clock.set(10.0);
        let history = History::new(8, clock.clone());
        (clock, history)
    }

    /// Feed one reading per tick.
    fn play(clock: &ManualClock, button: &mut Button, readings: &[f32]) {
        for &x in readings {
            clock.advance(TICK);
            button.set(x);
        }
    }

    #[test]
    fn fresh_history_is_idle() {
        let (_, b) = button();
        assert!(b.idle());
        assert!(!b.hold());
        assert!(!b.trigger());
        assert!(!b.release());
        assert!(!b.click());
    }

    #[test]
    fn trigger_only_on_the_crossing_tick() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[0.0, 0.0]);
        assert!(!b.trigger());

        play(&clock, &mut b, &[1.0]);
        assert!(b.trigger());
        assert!(b.hold());
        assert!(!b.release());

        play(&clock, &mut b, &[1.0]);
        assert!(!b.trigger());
        assert!(b.hold());
    }

    #[test]
    fn release_only_on_the_crossing_tick() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[1.0, 1.0, 1.0, 0.0]);
        assert!(b.release());
        assert!(!b.trigger());
        assert!(!b.hold());

        play(&clock, &mut b, &[0.0]);
        assert!(!b.release());
    }

    #[test]
    fn idle_requires_recent_low_pair() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[0.2, 0.3]);
        assert!(b.idle());

        // Unchanged reading: the low pair now spans one tick.
        play(&clock, &mut b, &[0.3]);
        assert!(!b.idle());
        assert!(b.idle_within(1.0));
    }

    #[test]
    fn click_within_window() {
        let (clock, mut b) = button();
        b.set(0.0_f32);
        clock.advance(0.1);
        b.set(1.0_f32);
        clock.advance(0.1);
        b.set(0.0_f32);
        assert!(b.click());
        assert!(b.release());
    }

    #[test]
    fn slow_click_is_rejected() {
        let (clock, mut b) = button();
        b.set(0.0_f32);
        clock.advance(0.1);
        b.set(1.0_f32);
        clock.advance(0.7);
        b.set(0.0_f32);
        assert!(!b.click());
        assert!(b.click_within(1.0));
    }

    #[test]
    fn click_window_starts_when_the_low_level_was_last_seen() {
        let (clock, mut b) = button();
        b.set(0.0_f32);
        clock.set(10.6);
        b.set(1.0_f32);
        clock.set(10.7);
        b.set(0.0_f32);

        // The press restamped the idle sample, so the long wait before it
        // does not count against the click.
        let times: Vec<f64> = b.iter().take(3).map(|s| s.t).collect();
        assert_eq!(times, [10.7, 10.7, 10.6]);
        assert!(b.click());
        assert!(!b.click_within(0.05));
    }

    #[test]
    fn click_survives_repeated_polls() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        assert!(b.click());
    }

    #[test]
    fn double_click_and_staleness() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[0.0, 1.0, 0.0, 1.0, 0.0]);
        assert!(b.dclick());
        assert!(b.click());

        play(&clock, &mut b, &[1.0]);
        assert!(!b.dclick());
    }

    #[test]
    fn slow_double_click_is_rejected() {
        let (clock, mut b) = button();
        play(&clock, &mut b, &[0.0, 1.0]);
        clock.advance(0.6);
        play(&clock, &mut b, &[0.0, 1.0, 0.0]);
        assert!(!b.dclick());
        assert!(b.click());
    }

    #[test]
    fn fired_reports_completed_edges() {
        let (clock, mut b) = button();
        let windows = GestureWindows::default();

        play(&clock, &mut b, &[1.0]);
        assert_eq!(windows.fired(&b), vec![Gesture::Trigger]);

        play(&clock, &mut b, &[0.0]);
        assert_eq!(windows.fired(&b), vec![Gesture::Release, Gesture::Click]);

        play(&clock, &mut b, &[1.0, 0.0]);
        assert_eq!(
            windows.fired(&b),
            vec![Gesture::Release, Gesture::Click, Gesture::DoubleClick]
        );
    }

    #[test]
    fn fired_edges_ignore_the_edge_interval() {
        let (clock, mut b) = button();
        let windows = GestureWindows {
            edge_interval: 0.0,
            click_interval: 0.01,
        };

        play(&clock, &mut b, &[1.0]);
        assert_eq!(windows.fired(&b), vec![Gesture::Trigger]);

        // The click spans one tick, longer than the click window.
        play(&clock, &mut b, &[0.0]);
        assert_eq!(windows.fired(&b), vec![Gesture::Release]);
    }

    #[test]
    fn is_dispatches_by_gesture() {
        let (clock, mut b) = button();
        let windows = GestureWindows {
            edge_interval: 1.0,
            click_interval: 1.0,
        };
        play(&clock, &mut b, &[1.0]);
        assert!(b.is(Gesture::Trigger, &windows));
        assert!(b.is(Gesture::Hold, &windows));
        assert!(!b.is(Gesture::Idle, &windows));
        assert_eq!(Gesture::DoubleClick.to_string(), "dclick");
    }
}
