//! Line item quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// The value exceeds the representable range.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed value.
        max: u32,
    },
}

/// A cart or order line item quantity.
///
/// Always at least 1. A line with zero units does not exist; removal is a
/// separate operation, never an update to zero.
///
/// ## Examples
///
/// ```
/// use tienda_core::Quantity;
///
/// let qty = Quantity::parse(3).unwrap();
/// assert_eq!(qty.get(), 3);
///
/// assert!(Quantity::parse(0).is_err());
/// assert!(Quantity::parse(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest valid quantity.
    pub const MIN: Self = Self(1);

    /// Parse a `Quantity` from a possibly-negative integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is less than 1 or does not fit in `u32`.
    pub fn parse(n: i64) -> Result<Self, QuantityError> {
        if n < 1 {
            return Err(QuantityError::NotPositive);
        }

        u32::try_from(n)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge { max: u32::MAX })
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
