//! The conversion engine: one rate lookup, two rounded outputs.

use std::sync::Arc;

use curex_common::{Conversion, CurrencyCode};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::{ClientError, ClientResult};
use crate::source::RateSource;

/// A validated request to convert `amount` of `from` into `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionRequest {
    pub fn new(amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { amount, from, to }
    }

    /// The same request in the opposite direction.
    pub fn swapped(&self) -> Self {
        Self {
            amount: self.amount,
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

/// Computes conversions against the latest rate document for the base
/// currency.
///
/// The engine trusts the caller-selected codes; catalog membership is a
/// display concern. There is no special case for `from == to`: a missing
/// or malformed self-rate surfaces as `RateNotFound` like any other.
pub struct ConversionEngine {
    source: Arc<dyn RateSource>,
}

impl ConversionEngine {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }

    /// Fetch the current rate for the request's pair and compute the
    /// converted amount and reverse rate.
    #[instrument(skip(self, request), fields(
        from = %request.from,
        to = %request.to,
        amount = %request.amount
    ))]
    pub async fn convert(&self, request: &ConversionRequest) -> ClientResult<Conversion> {
        let document = self.source.latest(&request.from).await?;

        let rate = document
            .rate_for(&request.to)
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or_else(|| ClientError::RateNotFound {
                from: request.from.clone(),
                to: request.to.clone(),
            })?;

        let conversion = Conversion::compute(
            request.amount,
            request.from.clone(),
            request.to.clone(),
            rate,
            document.date,
        );

        info!(
            conversion_id = %conversion.id,
            converted = %conversion.converted,
            reverse_rate = %conversion.reverse_rate,
            as_of = %conversion.as_of,
            "Conversion completed"
        );

        Ok(conversion)
    }
}
