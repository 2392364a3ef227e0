//! Half-weight smoothing filter
//!
//! `v = (v + sample) / 2`. This is a recency-weighted low-pass filter,
//! not a mean: after n updates the oldest sample carries 2^-n of the
//! weight, so the value is dominated by the last three or four samples.
//! The first sample seeds the filter as-is; it is not folded against
//! anything. Division truncates toward zero.

/// Recency-weighted filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalfWeightFilter {
    value: Option<i32>,
}

impl HalfWeightFilter {
    /// Create an empty filter
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Create a filter seeded with a first sample
    pub const fn seeded(sample: i32) -> Self {
        Self {
            value: Some(sample),
        }
    }

    /// Fold a sample in and return the new value
    pub fn update(&mut self, sample: i32) -> i32 {
        let next = match self.value {
            None => sample,
            Some(current) => (current + sample) / 2,
        };
        self.value = Some(next);
        next
    }

    /// Current value, `None` until the first sample
    pub const fn value(&self) -> Option<i32> {
        self.value
    }

    /// Check if the filter has seen a sample
    pub const fn is_seeded(&self) -> bool {
        self.value.is_some()
    }
}
