//! Load-factor driven capacity policy.

use crate::error::ConfigError;

/// Thresholds controlling when a container grows or shrinks its block.
///
/// The load factor is `size / capacity`. After a size increase, a load at
/// or above `max_load_factor` multiplies capacity by `resize_factor`. After
/// a size decrease, a load at or below `min_load_factor` divides it.
/// The gap between the two thresholds keeps a container sitting at a
/// boundary from reallocating on every operation.
///
/// Validated at construction; containers never observe an invalid policy.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthPolicy {
    /// Growth threshold.
    ///
    /// Default: 0.75. Must be in `(0.0, 1.0]` so that a full block always
    /// grows before the next element is written.
    pub max_load_factor: f64,

    /// Shrink threshold, or `None` to never shrink on removal.
    ///
    /// Default: `Some(0.25)`. Must be below `max_load_factor / resize_factor`
    /// so a freshly shrunk block sits under the growth threshold.
    pub min_load_factor: Option<f64>,

    /// Multiplicative step for both growth and shrink. Default: 2.
    pub resize_factor: usize,
}

impl GrowthPolicy {
    /// Default growth threshold.
    pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

    /// Default shrink threshold.
    pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.25;

    /// Default resize step.
    pub const DEFAULT_RESIZE_FACTOR: usize = 2;

    /// Smallest capacity a container ever holds, even when empty.
    pub const MIN_CAPACITY: usize = 1;

    /// Create a policy with default thresholds and shrinking enabled.
    pub fn new() -> Self {
        Self {
            max_load_factor: Self::DEFAULT_MAX_LOAD_FACTOR,
            min_load_factor: Some(Self::DEFAULT_MIN_LOAD_FACTOR),
            resize_factor: Self::DEFAULT_RESIZE_FACTOR,
        }
    }

    /// Default thresholds, but capacity is never given back on removal.
    pub fn without_shrink() -> Self {
        Self {
            min_load_factor: None,
            ..Self::new()
        }
    }

    /// Validate all threshold invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Resize factor must actually change the capacity.
        if self.resize_factor < 2 {
            return Err(ConfigError::InvalidResizeFactor {
                value: self.resize_factor,
            });
        }
        // 2. Growth threshold in (0, 1].
        let max = self.max_load_factor;
        if !max.is_finite() || max <= 0.0 || max > 1.0 {
            return Err(ConfigError::InvalidMaxLoadFactor { value: max });
        }
        // 3. Shrink threshold leaves a hysteresis gap.
        if let Some(min) = self.min_load_factor {
            let limit = max / self.resize_factor as f64;
            if !min.is_finite() || min < 0.0 || min >= limit {
                return Err(ConfigError::InvalidMinLoadFactor { value: min, limit });
            }
        }
        Ok(())
    }

    /// Whether removals may give capacity back.
    pub fn shrinks(&self) -> bool {
        self.min_load_factor.is_some()
    }

    /// Ratio of live elements to reserved slots.
    ///
    /// A zero capacity is treated as [`MIN_CAPACITY`](Self::MIN_CAPACITY).
    pub fn load_factor(size: usize, capacity: usize) -> f64 {
        size as f64 / capacity.max(Self::MIN_CAPACITY) as f64
    }

    /// Whether a container that just reached `size` must grow.
    ///
    /// Also true whenever `size` no longer fits in `capacity`.
    pub fn should_grow(&self, size: usize, capacity: usize) -> bool {
        size > capacity || Self::load_factor(size, capacity) >= self.max_load_factor
    }

    /// Whether a container that just dropped to `size` should shrink.
    pub fn should_shrink(&self, size: usize, capacity: usize) -> bool {
        match self.min_load_factor {
            Some(min) => {
                capacity > Self::MIN_CAPACITY && Self::load_factor(size, capacity) <= min
            }
            None => false,
        }
    }

    /// Capacity after one growth step, never below `required`.
    ///
    /// Returns `None` if the multiplication overflows `usize`.
    pub fn grown_capacity(&self, capacity: usize, required: usize) -> Option<usize> {
        capacity
            .max(Self::MIN_CAPACITY)
            .checked_mul(self.resize_factor)
            .map(|c| c.max(required))
    }

    /// Capacity after one shrink step, never below `size` or the minimum.
    pub fn shrunk_capacity(&self, capacity: usize, size: usize) -> usize {
        (capacity / self.resize_factor)
            .max(size)
            .max(Self::MIN_CAPACITY)
    }

    /// Next shrink target for a container that just dropped to `size`.
    ///
    /// `None` unless the load is at or below the low threshold and the
    /// smaller block would still hold one more append without growing.
    pub fn shrink_step(&self, size: usize, capacity: usize) -> Option<usize> {
        if !self.should_shrink(size, capacity) {
            return None;
        }
        let target = self.shrunk_capacity(capacity, size);
        (target < capacity && !self.should_grow(size.saturating_add(1), target)).then_some(target)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}
