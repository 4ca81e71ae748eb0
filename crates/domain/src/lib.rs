//! Domain layer for the storefront checkout.
//!
//! This crate provides:
//! - Finishing options (`Ending`) and their assembly fees
//! - The quote service that prices cart lines from the catalog
//! - Shipping rates by delivery method
//! - Validation of incoming checkout requests

pub mod checkout;
pub mod ending;
pub mod error;
pub mod quote;
pub mod shipping;

pub use checkout::{CheckoutRequest, ValidCheckout};
pub use ending::{AssemblyFeeSchedule, Ending};
pub use error::{FieldError, QuoteError, ValidationErrors};
pub use quote::{CartLine, CatalogQuoteService, MAX_LINE_GRAMS, Quote, QuoteService, QuotedLine};
pub use shipping::ShippingRates;
