//! Coupon redemption.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use inventory_store::{Money, OrderRecord};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Coupon {0} does not exist")]
    Unknown(String),

    #[error("Coupon {0} has been used up")]
    Exhausted(String),

    #[error("Coupon {code} requires a subtotal of at least {minimum}")]
    MinimumNotMet { code: String, minimum: Money },
}

/// What a coupon takes off the goods subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponKind {
    Percent(u8),
    Fixed(Money),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub min_subtotal: Option<Money>,
    /// `None` means unlimited.
    pub remaining_uses: Option<u32>,
}

impl Coupon {
    pub fn percent(code: impl Into<String>, percent: u8) -> Self {
        Self {
            code: code.into(),
            kind: CouponKind::Percent(percent),
            min_subtotal: None,
            remaining_uses: None,
        }
    }

    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Self {
            code: code.into(),
            kind: CouponKind::Fixed(amount),
            min_subtotal: None,
            remaining_uses: None,
        }
    }

    /// Discount for a given subtotal, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let discount = match self.kind {
            CouponKind::Percent(percent) => subtotal.percent(percent),
            CouponKind::Fixed(amount) => amount,
        };
        if discount > subtotal { subtotal } else { discount }
    }
}

/// Validates a coupon against a committed order and consumes one use.
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Returns the discount to apply to `order`.
    async fn redeem(&self, code: &str, order: &OrderRecord) -> Result<Money, CouponError>;
}

/// In-memory coupon book.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCouponService {
    coupons: Arc<Mutex<HashMap<String, Coupon>>>,
}

impl InMemoryCouponService {
    pub fn new() -> Self {
        Self::default()
    }

    fn coupons(&self) -> MutexGuard<'_, HashMap<String, Coupon>> {
        self.coupons.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a coupon. Codes are case-insensitive.
    pub fn insert(&self, coupon: Coupon) {
        let code = coupon.code.to_uppercase();
        self.coupons().insert(code.clone(), Coupon { code, ..coupon });
    }

    pub fn remaining_uses(&self, code: &str) -> Option<u32> {
        self.coupons()
            .get(&code.to_uppercase())
            .and_then(|c| c.remaining_uses)
    }
}

#[async_trait]
impl CouponService for InMemoryCouponService {
    async fn redeem(&self, code: &str, order: &OrderRecord) -> Result<Money, CouponError> {
        let code = code.to_uppercase();
        let mut coupons = self.coupons();
        let coupon = coupons
            .get_mut(&code)
            .ok_or_else(|| CouponError::Unknown(code.clone()))?;

        if let Some(minimum) = coupon.min_subtotal
            && order.subtotal < minimum
        {
            return Err(CouponError::MinimumNotMet { code, minimum });
        }
        match coupon.remaining_uses {
            Some(0) => return Err(CouponError::Exhausted(code)),
            Some(ref mut uses) => *uses -= 1,
            None => {}
        }

        Ok(coupon.discount_for(order.subtotal))
    }
}
