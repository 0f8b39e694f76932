//! Historical series assembly over a trailing calendar window.

use std::sync::Arc;

use chrono::NaiveDate;
use curex_common::{trailing_window, CurrencyCode, HistoricalSeries, HISTORY_WINDOW_DAYS};
use tracing::{debug, instrument, warn};

use crate::error::{ClientError, ClientResult};
use crate::source::RateSource;

/// Builds the trailing rate series for one conversion direction.
///
/// Days are requested one at a time in ascending date order against the
/// versioned host only. A day without a published document or without the
/// target rate is skipped; a transport failure aborts the whole series and
/// no partial result is returned.
pub struct SeriesBuilder {
    source: Arc<dyn RateSource>,
    window_days: u32,
}

impl SeriesBuilder {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            window_days: HISTORY_WINDOW_DAYS,
        }
    }

    /// Override the window length.
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// Assemble the series for the window ending at `end` inclusive.
    #[instrument(skip(self, from, to), fields(from = %from, to = %to, end = %end))]
    pub async fn build(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        end: NaiveDate,
    ) -> ClientResult<HistoricalSeries> {
        let mut series = HistoricalSeries::new(from.clone(), to.clone());

        for date in trailing_window(end, self.window_days) {
            match self.source.dated(from, date).await {
                Ok(document) => match document.rate_for(to) {
                    Some(rate) => {
                        debug!(%date, %rate, "Rate point added");
                        series.push(date, rate);
                    }
                    None => {
                        debug!(%date, "No rate for target on this day, skipping");
                    }
                },
                Err(ClientError::DocumentMissing { .. }) => {
                    debug!(%date, "No document for this day, skipping");
                }
                Err(e) => {
                    warn!(%date, error = %e, "Historical fetch aborted");
                    return Err(ClientError::HistoricalFetchFailed {
                        date,
                        detail: e.to_string(),
                    });
                }
            }
        }

        debug!(points = series.len(), "Historical series assembled");
        Ok(series)
    }
}
