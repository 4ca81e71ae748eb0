//! Shipping prices by delivery method.

use common::Money;
use inventory_store::DeliveryMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRates {
    pub pickup_point: Money,
    pub courier: Money,
    pub personal_pickup: Money,
    /// Orders with at least this subtotal ship for free.
    pub free_shipping_from: Option<Money>,
}

impl ShippingRates {
    /// Shipping cost for an order with the given subtotal.
    pub fn cost_for(&self, method: DeliveryMethod, subtotal: Money) -> Money {
        if let Some(threshold) = self.free_shipping_from
            && subtotal >= threshold
        {
            return Money::zero();
        }

        match method {
            DeliveryMethod::PickupPoint => self.pickup_point,
            DeliveryMethod::Courier => self.courier,
            DeliveryMethod::PersonalPickup => self.personal_pickup,
        }
    }
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            pickup_point: Money::from_major(79),
            courier: Money::from_major(129),
            personal_pickup: Money::zero(),
            free_shipping_from: Some(Money::from_major(5_000)),
        }
    }
}
