//! Curex Shared Types
//!
//! This crate contains the domain types shared by the curex conversion
//! pipeline and its front ends: currency codes and the session catalog,
//! dated rate documents, conversion results, historical series, and
//! flag-image helpers.

pub mod currency;
pub mod flags;
pub mod rates;
pub mod time;

pub use currency::*;
pub use flags::*;
pub use rates::*;
pub use time::*;
