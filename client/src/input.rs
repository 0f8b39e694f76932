//! User-input validation for conversion requests.

use curex_common::CurrencyCode;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::engine::ConversionRequest;
use crate::error::ValidationError;

/// Raw user input for a conversion: amount text plus two selections.
#[derive(Debug, Clone)]
pub struct ConversionInput {
    pub amount: String,
    pub from: String,
    pub to: String,
}

impl ConversionInput {
    pub fn new(
        amount: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Validate and normalize into a request the engine will accept.
    ///
    /// The session treats a failure as a silent no-op; other callers may
    /// surface the error instead.
    pub fn parse(&self) -> Result<ConversionRequest, ValidationError> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| ValidationError::UnparseableAmount)?;

        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount);
        }

        let from = CurrencyCode::new(&self.from);
        let to = CurrencyCode::new(&self.to);
        if from.is_empty() || to.is_empty() {
            return Err(ValidationError::EmptyCurrency);
        }

        Ok(ConversionRequest::new(amount, from, to))
    }
}
