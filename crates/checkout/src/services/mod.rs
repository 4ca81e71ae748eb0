//! Collaborators invoked after an order has been committed.

pub mod coupon;
pub mod notification;

pub use coupon::{Coupon, CouponError, CouponKind, CouponService, InMemoryCouponService};
pub use notification::{
    LogNotifier, NotificationError, NotificationKind, OrderNotifier, RecordingNotifier,
};
