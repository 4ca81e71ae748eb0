//! Order placement with atomic stock reservation.
//!
//! Checkout runs in three phases:
//! 1. Validate the request and price it fresh through the quote service
//! 2. Reserve stock and create the order in one serializable transaction
//! 3. Best-effort follow-ups after commit: coupon redemption and e-mails
//!
//! Only phase 2 touches stock. Phase 3 failures are logged and never undo
//! a committed order.

pub mod draft;
pub mod error;
pub mod reservation;
pub mod restock;
pub mod service;
pub mod services;
pub mod transactor;

pub use draft::OrderDraft;
pub use error::{CheckoutError, ReservationError, RestockError, StockConflict, RETRY_MESSAGE};
pub use restock::Restocker;
pub use service::CheckoutService;
pub use services::{
    Coupon, CouponError, CouponKind, CouponService, InMemoryCouponService, LogNotifier,
    NotificationError, NotificationKind, OrderNotifier, RecordingNotifier,
};
pub use transactor::{DEFAULT_TIMEOUT, StockReservationTransactor};
