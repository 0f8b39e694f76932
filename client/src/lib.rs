//! Curex Client Pipeline
//!
//! Fetches currency catalogs and rate documents from a primary host with a
//! single fallback mirror, converts amounts, and assembles trailing 7-day
//! rate history.
//!
//! # Features
//!
//! - Primary-to-fallback fetch with one hand-off and no retries
//! - Conversion with display rounding and reverse rate
//! - Trailing 7-day historical series, all-or-nothing on transport failure
//! - Presentation port with request sequencing to discard stale responses
//!
//! # Example
//!
//! ```rust,ignore
//! use curex_client::{ConverterSession, FallbackSource, SourceConfig};
//! use std::sync::Arc;
//!
//! let source = Arc::new(FallbackSource::from_config(&SourceConfig::default()));
//! let session = ConverterSession::new(source, my_port);
//!
//! session.load_catalog().await;
//! session.set_amount("10").await?;
//! session.swap().await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod port;
pub mod session;
pub mod source;

pub use config::SourceConfig;
pub use engine::{ConversionEngine, ConversionRequest};
pub use error::{ClientError, ClientResult, ValidationError};
pub use history::SeriesBuilder;
pub use input::ConversionInput;
pub use port::{FlagSide, LoadingGuard, Presentation, RequestToken, SequencedPort};
pub use session::{ConverterSession, Selection};
pub use source::{FallbackSource, HttpRateSource, RateSource};

#[cfg(any(test, feature = "test-utils"))]
pub use source::MockRateSource;
