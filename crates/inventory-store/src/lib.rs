//! Persistence for the storefront's stock-bearing records.
//!
//! The catalog (SKUs), the append-only stock ledger and placed orders live
//! behind [`InventoryStore`]. All stock mutations go through a
//! [`StockTransaction`], which the PostgreSQL backend runs at `SERIALIZABLE`
//! isolation and the in-memory backend runs under an exclusive lock.

/// Declares a fieldless enum stored as a TEXT column.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the persisted text form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::StoreError::Corrupt(format!(
                        "unknown {} value '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

pub mod error;
pub mod memory;
pub mod movement;
pub mod order;
pub mod postgres;
pub mod sku;
pub mod store;

pub use common::{MovementId, Money, OrderId, SkuId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryInventoryStore, InMemoryTransaction};
pub use movement::{MovementDirection, StockMovement};
pub use order::{
    DeliveryMethod, DeliveryStatus, OrderItemRecord, OrderRecord, OrderStatus, PaymentStatus,
    PickupPoint, ShippingInfo,
};
pub use postgres::{PostgresInventoryStore, PostgresTransaction};
pub use sku::{NewSku, SaleMode, Sku};
pub use store::{InventoryStore, StockTransaction};
