use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is a whole percentage of the order amount.
    Percentage,
    /// `discount_value` is an amount in cents.
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(CouponError::InvalidDiscountType(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("Coupon not found")]
    NotFound,
    #[error("This coupon has expired")]
    Expired,
    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,
    #[error("Minimum order value: {0}")]
    BelowMinimum(Money),
    #[error("Invalid discount type `{0}`")]
    InvalidDiscountType(String),
    #[error("Invalid discount value")]
    InvalidDiscountValue,
    #[error("Invalid order amount")]
    InvalidOrderAmount,
}

/// The parts of a coupon row that decide whether and how much it discounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTerms {
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CouponTerms {
    pub fn check(&self, order_amount: i64, now: DateTime<Utc>) -> Result<(), CouponError> {
        if !self.is_active {
            return Err(CouponError::NotFound);
        }
        if self.expires_at.is_some_and(|expires_at| expires_at < now) {
            return Err(CouponError::Expired);
        }
        if self
            .max_uses
            .is_some_and(|max_uses| self.current_uses >= max_uses)
        {
            return Err(CouponError::UsageLimitReached);
        }
        if let Some(minimum) = self.min_order_value.filter(|minimum| order_amount < *minimum) {
            return Err(CouponError::BelowMinimum(Money(minimum)));
        }
        Ok(())
    }

    /// Discount in cents, never more than `order_amount`.
    pub fn discount_for(&self, order_amount: i64) -> i64 {
        let order_amount = order_amount.max(0);
        let raw = match self.discount_type {
            // Widened so large amounts cannot overflow.
            DiscountType::Percentage => {
                let discount = i128::from(order_amount) * i128::from(self.discount_value) / 100;
                i64::try_from(discount).unwrap_or(i64::MAX)
            }
            DiscountType::Fixed => self.discount_value,
        };
        raw.clamp(0, order_amount)
    }

    pub fn apply(&self, order_amount: i64, now: DateTime<Utc>) -> Result<i64, CouponError> {
        self.check(order_amount, now)?;
        Ok(self.discount_for(order_amount))
    }
}

/// Validate the value an admin entered for a coupon.
pub fn validate_discount(discount_type: DiscountType, value: i64) -> Result<(), CouponError> {
    let valid = match discount_type {
        DiscountType::Percentage => (1..=100).contains(&value),
        DiscountType::Fixed => value > 0,
    };
    if valid {
        Ok(())
    } else {
        Err(CouponError::InvalidDiscountValue)
    }
}

/// Largest order amount a coupon quote accepts, in cents.
pub const MAX_ORDER_AMOUNT: i64 = 10_000_000_000;

/// Order amounts sent by clients must be non-negative and within range.
pub fn validate_order_amount(amount: i64) -> Result<(), CouponError> {
    if (0..=MAX_ORDER_AMOUNT).contains(&amount) {
        Ok(())
    } else {
        Err(CouponError::InvalidOrderAmount)
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
