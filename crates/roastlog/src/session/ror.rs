//! Rate-of-rise between consecutive temperature samples.

/// A temperature reading at a point in the roast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Temperature in °C.
    pub temperature: f64,
    /// Seconds since the roast started.
    pub elapsed: u32,
}

impl Sample {
    /// Create a sample.
    #[must_use]
    pub fn new(temperature: f64, elapsed: u32) -> Self {
        Self {
            temperature,
            elapsed,
        }
    }
}

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rate of rise in °C/min from `prev` to `next`, one decimal place.
///
/// Returns `None` when `next` is not strictly later than `prev`.
#[must_use]
pub fn rate_of_rise(prev: Sample, next: Sample) -> Option<f64> {
    if next.elapsed <= prev.elapsed {
        return None;
    }
    let minutes = f64::from(next.elapsed - prev.elapsed) / 60.0;
    Some(round1((next.temperature - prev.temperature) / minutes))
}

/// Sliding window of one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RorTracker {
    previous: Option<Sample>,
    last: Option<f64>,
}

impl RorTracker {
    /// No samples yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a sample and get the rate of rise against the previous one.
    ///
    /// The window moves to `sample` when a rate was computed or when there was
    /// no previous sample. A sample at or before the previous one leaves the
    /// window where it is.
    pub fn observe(&mut self, sample: Sample) -> Option<f64> {
        match self.previous {
            None => {
                self.previous = Some(sample);
                None
            }
            Some(prev) => {
                let ror = rate_of_rise(prev, sample)?;
                self.previous = Some(sample);
                self.last = Some(ror);
                Some(ror)
            }
        }
    }

    /// The most recent rate of rise.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// The sample the next rate is computed against.
    #[must_use]
    pub fn previous(&self) -> Option<Sample> {
        self.previous
    }
}
