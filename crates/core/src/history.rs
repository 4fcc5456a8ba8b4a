use crate::clock::SharedClock;
use crate::sample::{Sample, Value, Vec1, Vec2, Vec3};
use std::collections::VecDeque;

/// Default number of transitions kept per control.
pub const DEFAULT_CAPACITY: usize = 120;

/// Button, key or trigger history.
pub type Button = History<Vec1>;
/// Boolean status history (readiness, hover, cursor requests).
pub type Flag = History<Vec1>;
/// Planar control history (sticks, d-pad, cursor, wheel).
pub type Coordinate = History<Vec2>;
/// Three-axis control history.
pub type Axis = History<Vec3>;

/// Fixed-capacity, newest-first buffer of coalesced samples.
///
/// ```text
/// index:  0         1         ...   N-1
///         newest    previous  ...   oldest
/// ```
///
/// The buffer always holds exactly `capacity` samples: it is primed at
/// construction with zero values stamped "now", and every insertion drops
/// the oldest entry.  Repeated readings of an unchanged value only refresh
/// the newest timestamp, so index `k` means "the k-th distinct value back",
/// not "k polls ago".
#[derive(Debug, Clone)]
pub struct History<T: Value> {
    buffer: VecDeque<Sample<T>>,
    capacity: usize,
    clock: SharedClock,
}

impl<T: Value> History<T> {
    /// Create a primed history holding `capacity` samples.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize, clock: SharedClock) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        let now = clock.elapsed();
        let buffer = std::iter::repeat(Sample::new(T::default(), now))
            .take(capacity)
            .collect();
        Self {
            buffer,
            capacity,
            clock,
        }
    }

    /// Create a primed history with [`DEFAULT_CAPACITY`] slots.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self::new(DEFAULT_CAPACITY, clock)
    }

    // ── Ingestion ─────────────────────────────────────────────────────────────

    /// Record a reading.  Returns `true` if it started a new transition,
    /// `false` if it was coalesced into the newest sample.
    pub fn set(&mut self, value: impl Into<T>) -> bool {
        let value = value.into();
        let now = self.clock.elapsed();

        // The current value held until this instant either way.
        let front = &mut self.buffer[0];
        front.t = now;

        if front.matches(&value) {
            front.delta = T::default();
            self.debug_assert_ordered();
            return false;
        }

        let mut next = *front;
        next.apply(value);
        self.buffer.push_front(next);
        if self.buffer.len() > self.capacity {
            self.buffer.pop_back();
        }

        self.debug_assert_ordered();
        true
    }

    /// Stamp every slot with the current time, keeping the values.
    ///
    /// Used when a device goes away or loses focus: the last known state
    /// stays readable but no longer forms a recent gesture.
    pub fn clear(&mut self) {
        let now = self.clock.elapsed();
        for sample in &mut self.buffer {
            sample.t = now;
        }
    }

    /// Set the deduplication tolerance on every slot.
    pub fn set_threshold(&mut self, threshold: f32) {
        for sample in &mut self.buffer {
            sample.threshold = threshold;
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.newest().threshold
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Most recent sample.
    #[must_use]
    pub fn newest(&self) -> &Sample<T> {
        assert!(!self.buffer.is_empty(), "empty history");
        &self.buffer[0]
    }

    /// Least recent sample.
    #[must_use]
    pub fn oldest(&self) -> &Sample<T> {
        assert!(!self.buffer.is_empty(), "empty history");
        &self.buffer[self.buffer.len() - 1]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sample<T>> {
        self.buffer.get(index)
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample<T>> + '_ {
        self.buffer.iter()
    }

    /// Time spanned by the settled samples, i.e. excluding the newest one
    /// which is still accumulating.
    #[must_use]
    pub fn duration(&self) -> f64 {
        if self.buffer.len() < 2 {
            return 0.0;
        }
        self.buffer[1].t - self.buffer[self.buffer.len() - 1].t
    }

    /// Index of the sample at fraction `dt01` of the buffer: `0.0` is the
    /// newest, `1.0` the oldest.  Out-of-range fractions are clamped.
    #[must_use]
    pub fn find_dt(&self, dt01: f64) -> usize {
        let last = self.buffer.len() - 1;
        let pos = (dt01 * self.buffer.len() as f64).floor();
        if pos.is_nan() || pos <= 0.0 {
            0
        } else {
            (pos as usize).min(last)
        }
    }

    /// Index of the first sample at least `seconds_ago` older than the
    /// newest one.
    #[must_use]
    pub fn find_t(&self, seconds_ago: f64) -> usize {
        let last = self.buffer.len() - 1;
        if seconds_ago <= 0.0 {
            return 0;
        }
        if seconds_ago >= self.duration() {
            return last;
        }

        let target = self.newest().t - seconds_ago;
        self.buffer
            .iter()
            .position(|s| s.t <= target)
            .unwrap_or(last)
    }

    #[must_use]
    pub fn then_dt(&self, dt01: f64) -> &Sample<T> {
        &self.buffer[self.find_dt(dt01)]
    }

    #[must_use]
    pub fn then_t(&self, seconds_ago: f64) -> &Sample<T> {
        &self.buffer[self.find_t(seconds_ago)]
    }

    // ── Slicing ───────────────────────────────────────────────────────────────

    /// Copy the samples between two buffer fractions into a new history.
    ///
    /// # Panics
    /// If both fractions resolve to the same slot.
    #[must_use]
    pub fn interval_dt(&self, from01: f64, to01: f64) -> Self {
        self.extract(self.find_dt(from01), self.find_dt(to01))
    }

    /// Copy the samples between two ages (in seconds) into a new history.
    ///
    /// # Panics
    /// If both ages resolve to the same slot.
    #[must_use]
    pub fn interval_t(&self, from_secs: f64, to_secs: f64) -> Self {
        self.extract(self.find_t(from_secs), self.find_t(to_secs))
    }

    /// Half-open slot range `[min, max)`, newest first.
    fn extract(&self, from: usize, to: usize) -> Self {
        assert!(from != to, "invalid interval: both ends resolve to slot {from}");
        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        Self {
            buffer: self.buffer.range(lo..hi).copied().collect(),
            capacity: hi - lo,
            clock: self.clock.clone(),
        }
    }

    fn debug_assert_ordered(&self) {
        debug_assert!(
            self.buffer
                .iter()
                .zip(self.buffer.iter().skip(1))
                .all(|(newer, older)| newer.t >= older.t),
            "history timestamps out of order"
        );
    }
}
