//! Lumera core library — transport-agnostic storefront logic.
//!
//! `lumera-core` holds the domain logic of the Lumera storefront gateway,
//! decoupled from any HTTP framework so the web frontend (`lumera-web`)
//! stays a thin layer of handlers and middleware over it.
//!
//! # Modules
//!
//! - [`limit`] — Fixed-window request limiting: [`FixedWindowLimiter`] and
//!   source-key derivation ([`client_key`]).
//! - [`pricing`] — Order arithmetic: emirate shipping fees, discounts, VAT.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias
//!   ([`CoreResult`]).

pub mod error;
pub mod limit;
pub mod pricing;

pub use error::{CoreError, CoreResult};
pub use limit::{
    client_key, FixedWindowLimiter, LimitConfig, LimitDecision, DEFAULT_LIMIT_MESSAGE,
    UNKNOWN_CLIENT_KEY,
};
pub use pricing::{quote, Emirate, LineItem, QuoteBreakdown, VAT_RATE_PERCENT};
