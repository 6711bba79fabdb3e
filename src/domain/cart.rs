//! Cart lines keyed by product plus the sorted set of chosen extras.
//!
//! A cart is stored as a JSON array of [`CartLine`]s. Two lines describe the
//! same thing when their [`LineKey`]s are equal, so adding a product with the
//! same extras (in any order) bumps the quantity instead of adding a line.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartExtra {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    /// Unit price of the product alone, in cents.
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub extras: Vec<CartExtra>,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.extras.iter().map(|extra| extra.id))
    }

    /// Product price plus every extra, for a single unit.
    pub fn unit_price(&self) -> i64 {
        self.price + self.extras.iter().map(|extra| extra.price).sum::<i64>()
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price() * i64::from(self.quantity)
    }

    fn normalize(&mut self) {
        self.extras.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    product_id: Uuid,
    extra_ids: Vec<Uuid>,
}

impl LineKey {
    pub fn new(product_id: Uuid, extra_ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut extra_ids: Vec<Uuid> = extra_ids.into_iter().collect();
        extra_ids.sort_unstable();
        Self {
            product_id,
            extra_ids,
        }
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn extra_ids(&self) -> &[Uuid] {
        &self.extra_ids
    }
}

/// `<product>` or `<product>:<extra>,<extra>`.
impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_id)?;
        for (idx, id) in self.extra_ids.iter().enumerate() {
            let sep = if idx == 0 { ':' } else { ',' };
            write!(f, "{sep}{id}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineKeyError {
    #[error("invalid cart line key `{0}`")]
    Invalid(String),
}

impl FromStr for LineKey {
    type Err = LineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LineKeyError::Invalid(s.to_string());
        let (product, extras) = match s.split_once(':') {
            Some((product, extras)) => (product, Some(extras)),
            None => (s, None),
        };
        let product_id = Uuid::parse_str(product.trim()).map_err(|_| invalid())?;
        let extra_ids = match extras {
            Some(list) if !list.trim().is_empty() => list
                .split(',')
                .map(|id| Uuid::parse_str(id.trim()).map_err(|_| invalid()))
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };
        Ok(LineKey::new(product_id, extra_ids))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Cart {
    #[schema(value_type = Vec<CartLine>)]
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from stored lines, merging duplicates and dropping empty lines.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity >= 1 {
                cart.add(line);
            }
        }
        cart
    }

    /// Restore a stored cart document. Anything unreadable yields an empty cart.
    pub fn restore(document: Value) -> Self {
        match serde_json::from_value::<Vec<CartLine>>(document) {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable cart document");
                Cart::new()
            }
        }
    }

    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.lines)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.key() == key)
    }

    /// Merge `line` into the cart and return its key.
    pub fn add(&mut self, mut line: CartLine) -> LineKey {
        line.normalize();
        line.quantity = line.quantity.max(1);
        let key = line.key();
        match self.lines.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
        key
    }

    /// Set the quantity of a line; anything below 1 removes it.
    /// Returns false when no line matches `key`.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i32) -> bool {
        if quantity < 1 {
            return self.remove(key);
        }
        match self.lines.iter_mut().find(|line| &line.key() == key) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.key() != key);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    pub fn total(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
