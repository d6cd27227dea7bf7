//! Keyframe tracks
//!
//! A track records the value of one animated property at discrete times and
//! answers "what is the value at time t" the way a timeline editor does:
//! linear blending between neighbouring keys, held flat outside the keyed range.

use serde::{Deserialize, Serialize};

/// Values that can be blended between two keyframes
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl<const N: usize> Lerp for [f64; N] {
    fn lerp(self, other: Self, t: f64) -> Self {
        let mut out = self;
        for (a, b) in out.iter_mut().zip(other) {
            *a = Lerp::lerp(*a, b, t);
        }
        out
    }
}

/// A recorded value at one point on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
}

/// Time-sorted keyframes of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T> Default for Track<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Lerp> Track<T> {
    /// Record `value` at `time`, replacing any key already at that time
    pub fn insert(&mut self, time: f64, value: T) {
        match self.keys.binary_search_by(|k| k.time.total_cmp(&time)) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, Keyframe { time, value }),
        }
    }

    /// Value at `time`, or `None` for a track without keys
    pub fn sample(&self, time: f64) -> Option<T> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        // first key strictly after `time`; bounded to 1..len by the checks above
        let i = self.keys.partition_point(|k| k.time <= time);
        let (a, b) = (&self.keys[i - 1], &self.keys[i]);
        let t = (time - a.time) / (b.time - a.time);
        Some(a.value.lerp(b.value, t))
    }

    /// Key a new value derived from the value at `time` (`rest` when unkeyed).
    ///
    /// With `hold`, the pre-change value is also keyed one unit earlier so the
    /// change does not bleed back into the preceding interval. No hold is
    /// written before time zero.
    pub fn record(&mut self, time: f64, rest: T, hold: bool, update: impl FnOnce(T) -> T) -> T {
        let current = self.sample(time).unwrap_or(rest);
        if hold && time >= 1.0 {
            self.insert(time - 1.0, current);
        }
        let next = update(current);
        self.insert(time, next);
        next
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time of the last key
    pub fn end_time(&self) -> Option<f64> {
        self.keys.last().map(|k| k.time)
    }
}
