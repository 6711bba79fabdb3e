use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Estimated minutes until a pickup order is ready.
pub const PICKUP_ESTIMATED_MINUTES: i32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Money,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Money => "money",
            PaymentMethod::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "delivery",
            DeliveryType::Pickup => "pickup",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("A delivery zone is required for delivery orders")]
    MissingZone,
    #[error("A delivery address is required for delivery orders")]
    MissingAddress,
    #[error("Please provide a valid change amount")]
    InvalidChangeAmount,
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AddressParts {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub zip_code: String,
}

impl AddressParts {
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }
        Ok(())
    }

    /// Single-line address stored on the order.
    pub fn format(&self) -> String {
        let mut parts = vec![self.street.trim(), self.number.trim()];
        if let Some(complement) = self
            .complement
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            parts.push(complement);
        }
        parts.push(self.neighborhood.trim());
        parts.push(self.city.trim());
        format!("{}, ZIP: {}", parts.join(", "), self.zip_code.trim())
    }
}

/// Change only applies to cash payments; returns the amount to store.
pub fn change_amount(
    method: PaymentMethod,
    needs_change: bool,
    requested: Option<i64>,
) -> Result<i64, CheckoutError> {
    if method != PaymentMethod::Money || !needs_change {
        return Ok(0);
    }
    match requested {
        Some(amount) if amount > 0 => Ok(amount),
        _ => Err(CheckoutError::InvalidChangeAmount),
    }
}

pub fn require(field: &'static str, value: &str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        Err(CheckoutError::MissingField(field))
    } else {
        Ok(())
    }
}
