//! Product stock level.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing or changing a [`Stock`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    #[error("Stock cannot be negative")]
    Negative,
    #[error("Stock cannot exceed {max}")]
    Overflow {
        /// Largest representable stock level.
        max: i32,
    },
}

/// Units on hand for a product. Never negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Stock(i32);

impl Stock {
    /// An empty shelf.
    pub const ZERO: Self = Self(0);

    /// Validate and wrap a unit count.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::Negative`] if `units < 0`.
    pub const fn new(units: i32) -> Result<Self, StockError> {
        if units < 0 {
            return Err(StockError::Negative);
        }
        Ok(Self(units))
    }

    /// The unit count.
    #[must_use]
    pub const fn units(&self) -> i32 {
        self.0
    }

    /// Whether this level is strictly below `threshold`.
    #[must_use]
    pub const fn is_below(&self, threshold: i32) -> bool {
        self.0 < threshold
    }

    /// Add `units` to the level.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::Overflow`] if the result does not fit, or
    /// [`StockError::Negative`] if it would drop below zero.
    pub const fn add(self, units: i32) -> Result<Self, StockError> {
        match self.0.checked_add(units) {
            Some(total) => Self::new(total),
            None => Err(StockError::Overflow { max: i32::MAX }),
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Stock {
    type Error = StockError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        stock.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Stock {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Stock {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let units = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(units)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Stock {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
