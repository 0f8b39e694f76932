//! Rate documents, conversion results, and historical series.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::currency::CurrencyCode;

/// Fractional digits shown for a converted amount.
pub const AMOUNT_DP: u32 = 2;

/// Fractional digits shown for a reverse rate.
pub const REVERSE_RATE_DP: u32 = 4;

/// Round a value for display, half away from zero.
pub fn round_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Wire shape of a per-base rate document:
/// `{ "date": "YYYY-MM-DD", "<base>": { "<target>": rate, ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRateDocument {
    /// Publication date of the snapshot.
    pub date: NaiveDate,
    /// Rate tables keyed by base code; one per document in practice.
    #[serde(flatten)]
    tables: HashMap<String, HashMap<String, Decimal>>,
}

/// A dated snapshot answering "1 unit of `base` = rate units of target"
/// for every listed target.
#[derive(Debug, Clone)]
pub struct RateDocument {
    /// Base currency the document was requested for.
    pub base: CurrencyCode,
    /// Publication date of the snapshot.
    pub date: NaiveDate,
    rates: HashMap<String, Decimal>,
}

impl RateDocument {
    /// Build a document from explicit target rates.
    pub fn new(
        base: CurrencyCode,
        date: NaiveDate,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
    ) -> Self {
        Self {
            base,
            date,
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.code().to_string(), rate))
                .collect(),
        }
    }

    /// Bind a wire document to the base it was requested for. A document
    /// without a table for `base` behaves as an empty table, so every
    /// lookup on it misses.
    pub fn from_wire(base: CurrencyCode, mut wire: WireRateDocument) -> Self {
        let rates = wire.tables.remove(base.code()).unwrap_or_default();
        Self {
            base,
            date: wire.date,
            rates,
        }
    }

    /// Rate for one unit of the base in `target` units.
    pub fn rate_for(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(target.code()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// A completed conversion. Ephemeral: recomputed on every request and
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Input amount.
    pub amount: Decimal,
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
    /// `amount * rate`, rounded to two fractional digits.
    pub converted: Decimal,
    /// `1 / rate`, rounded to four fractional digits.
    pub reverse_rate: Decimal,
    /// Publication date of the rate document used.
    pub as_of: NaiveDate,
}

impl Conversion {
    /// Compute a conversion from a direct rate.
    pub fn compute(
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            converted: round_display(amount * rate, AMOUNT_DP),
            reverse_rate: round_display(Decimal::ONE / rate, REVERSE_RATE_DP),
            amount,
            from,
            to,
            as_of,
        }
    }

    /// One unit of the target expressed in base-currency terms,
    /// e.g. `"1 EUR = 1.0870 USD"`.
    pub fn reverse_text(&self) -> String {
        format!("1 {} = {} {}", self.to, self.reverse_rate, self.from)
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount, self.from, self.converted, self.to
        )
    }
}

/// One day of rate history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Ordered (date, rate) pairs for one conversion direction, oldest first.
/// Days without data are omitted, so the sequence may be shorter than the
/// requested window.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalSeries {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    points: Vec<RatePoint>,
}

impl HistoricalSeries {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self {
            from,
            to,
            points: Vec::new(),
        }
    }

    /// Append a point. Callers must append in ascending date order.
    pub fn push(&mut self, date: NaiveDate, rate: Decimal) {
        debug_assert!(self.points.last().map_or(true, |last| last.date < date));
        self.points.push(RatePoint { date, rate });
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the points are strictly chronologically ordered.
    pub fn is_chronological(&self) -> bool {
        self.points.windows(2).all(|pair| pair[0].date < pair[1].date)
    }
}
