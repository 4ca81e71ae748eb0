//! Shared types used across the storefront inventory crates.

mod ids;
mod money;

pub use ids::{MovementId, OrderId, SkuId};
pub use money::Money;
