//! Price sanity bounds.

use serde::{Deserialize, Serialize};

/// Inclusive price sanity bounds.
///
/// Either side may be absent, meaning no lower or upper limit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBounds {
    /// Lowest accepted price, inclusive.
    pub min: Option<f64>,
    /// Highest accepted price, inclusive.
    pub max: Option<f64>,
}

impl PriceBounds {
    /// Bounds that accept every price.
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    /// Creates bounds from optional limits.
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Returns true if `price` lies within the bounds.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}
