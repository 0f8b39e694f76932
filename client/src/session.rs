//! The converter session: event wiring between user input, the pipeline,
//! and the presentation port.

use std::sync::Arc;

use curex_common::{today, CurrencyCatalog, CurrencyCode};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::engine::ConversionEngine;
use crate::error::{ClientError, ValidationError};
use crate::history::SeriesBuilder;
use crate::input::ConversionInput;
use crate::port::{FlagSide, LoadingGuard, Presentation, SequencedPort};
use crate::source::RateSource;

/// Message shown when no source could serve a request.
const SOURCE_UNAVAILABLE_MSG: &str = "Could not load currency data. Check network and try again.";

/// Message shown when the history window could not be fetched.
const HISTORY_FAILED_MSG: &str = "Could not load historical rates.";

/// Current selection, mirrored from the input controls.
#[derive(Debug, Clone)]
pub struct Selection {
    pub amount: String,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            amount: "1".to_string(),
            from: CurrencyCode::usd(),
            to: CurrencyCode::eur(),
        }
    }
}

/// Drives the conversion pipeline from user events and writes outcomes
/// through the presentation port.
///
/// Every failure is caught here and becomes a single user-visible
/// message; nothing propagates further up. Invalid input is a silent
/// no-op by default, with the validation error returned for callers that
/// prefer to surface it.
pub struct ConverterSession<P: Presentation> {
    source: Arc<dyn RateSource>,
    engine: ConversionEngine,
    series: SeriesBuilder,
    port: SequencedPort<P>,
    catalog: Mutex<Option<CurrencyCatalog>>,
    selection: Mutex<Selection>,
}

impl<P: Presentation> ConverterSession<P> {
    pub fn new(source: Arc<dyn RateSource>, port: P) -> Self {
        Self {
            engine: ConversionEngine::new(source.clone()),
            series: SeriesBuilder::new(source.clone()),
            port: SequencedPort::new(port),
            catalog: Mutex::new(None),
            selection: Mutex::new(Selection::default()),
            source,
        }
    }

    /// Fetch the catalog once, point the flags at the default selection,
    /// and run the initial conversion. Returns the catalog on success.
    pub async fn load_catalog(&self) -> Option<CurrencyCatalog> {
        let token = self.port.begin();
        let fetched = {
            let _busy = LoadingGuard::new(self.port.inner());
            self.source.catalog().await
        };

        match fetched {
            Ok(catalog) => {
                info!(currencies = catalog.len(), "Currency catalog loaded");
                *self.catalog.lock() = Some(catalog.clone());
                self.update_flags();
                let _ = self.submit().await;
                Some(catalog)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load currency catalog");
                self.port.fail(token, SOURCE_UNAVAILABLE_MSG);
                None
            }
        }
    }

    /// Latest fetched catalog, if any.
    pub fn catalog(&self) -> Option<CurrencyCatalog> {
        self.catalog.lock().clone()
    }

    pub fn selection(&self) -> Selection {
        self.selection.lock().clone()
    }

    /// Replace the whole selection and update both flags, without
    /// triggering a conversion.
    pub fn replace_selection(&self, selection: Selection) {
        *self.selection.lock() = selection;
        self.update_flags();
    }

    /// Apply an amount edit and reconvert.
    pub async fn set_amount(&self, amount: impl Into<String>) -> Result<(), ValidationError> {
        self.selection.lock().amount = amount.into();
        self.submit().await
    }

    /// Apply a currency change, update its flag, and reconvert.
    pub async fn select(
        &self,
        side: FlagSide,
        code: CurrencyCode,
    ) -> Result<(), ValidationError> {
        {
            let mut selection = self.selection.lock();
            match side {
                FlagSide::From => selection.from = code.clone(),
                FlagSide::To => selection.to = code.clone(),
            }
        }
        self.port.inner().set_flag(side, &code);
        self.submit().await
    }

    /// Swap the two selections, update both flags, and reconvert.
    pub async fn swap(&self) -> Result<(), ValidationError> {
        {
            let mut selection = self.selection.lock();
            let selection = &mut *selection;
            std::mem::swap(&mut selection.from, &mut selection.to);
        }
        self.update_flags();
        self.submit().await
    }

    /// Validate the current selection and run a conversion, applying the
    /// outcome through the sequenced port.
    pub async fn submit(&self) -> Result<(), ValidationError> {
        let selection = self.selection.lock().clone();
        let request = ConversionInput::new(
            selection.amount,
            selection.from.code(),
            selection.to.code(),
        )
        .parse()?;

        let token = self.port.begin();
        let _busy = LoadingGuard::new(self.port.inner());

        match self.engine.convert(&request).await {
            Ok(conversion) => {
                self.port.complete(token, &conversion);
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                let message = match &e {
                    ClientError::SourceUnavailable { .. } => SOURCE_UNAVAILABLE_MSG.to_string(),
                    other => other.to_string(),
                };
                self.port.fail(token, &message);
            }
        }

        Ok(())
    }

    /// Build and present the trailing history for the current pair.
    pub async fn show_history(&self) {
        let selection = self.selection.lock().clone();
        let _busy = LoadingGuard::new(self.port.inner());

        match self
            .series
            .build(&selection.from, &selection.to, today())
            .await
        {
            Ok(series) => self.port.inner().set_series(&series),
            Err(e) => {
                warn!(error = %e, "History fetch failed");
                self.port.inner().set_error(HISTORY_FAILED_MSG);
            }
        }
    }

    fn update_flags(&self) {
        let selection = self.selection.lock().clone();
        self.port.inner().set_flag(FlagSide::From, &selection.from);
        self.port.inner().set_flag(FlagSide::To, &selection.to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FallbackSource, MockRateSource};
    use chrono::NaiveDate;
    use curex_common::{Conversion, HistoricalSeries, RateDocument};
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Result(String),
        Error(String),
        Loading(bool),
        Flag(FlagSide, String),
        Series(usize),
    }

    #[derive(Clone, Default)]
    struct RecordingPort {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl RecordingPort {
        fn events(&self) -> Vec<Event> {
            self.events.lock().clone()
        }
    }

    impl Presentation for RecordingPort {
        fn set_result(&self, conversion: &Conversion) {
            self.events.lock().push(Event::Result(conversion.to_string()));
        }

        fn set_error(&self, message: &str) {
            self.events.lock().push(Event::Error(message.to_string()));
        }

        fn set_loading(&self, loading: bool) {
            self.events.lock().push(Event::Loading(loading));
        }

        fn set_flag(&self, side: FlagSide, code: &CurrencyCode) {
            self.events
                .lock()
                .push(Event::Flag(side, code.code().to_string()));
        }

        fn set_series(&self, series: &HistoricalSeries) {
            self.events.lock().push(Event::Series(series.len()));
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn stocked_source() -> Arc<MockRateSource> {
        let source = Arc::new(MockRateSource::new("test"));
        source.set_catalog(CurrencyCatalog::from_pairs([
            ("usd", "US Dollar"),
            ("eur", "Euro"),
        ]));
        source.set_latest(RateDocument::new(
            CurrencyCode::usd(),
            day(),
            [
                (CurrencyCode::usd(), dec!(1)),
                (CurrencyCode::eur(), dec!(0.92)),
            ],
        ));
        source.set_latest(RateDocument::new(
            CurrencyCode::eur(),
            day(),
            [(CurrencyCode::usd(), dec!(1.0869565))],
        ));
        source
    }

    fn session_with(source: Arc<MockRateSource>) -> (ConverterSession<RecordingPort>, RecordingPort) {
        let port = RecordingPort::default();
        let session = ConverterSession::new(source, port.clone());
        (session, port)
    }

    #[tokio::test]
    async fn test_invalid_amount_is_a_silent_no_op() {
        let (session, port) = session_with(stocked_source());
        session.replace_selection(Selection {
            amount: "not a number".to_string(),
            ..Selection::default()
        });
        port.events.lock().clear();

        let result = session.submit().await;

        assert_eq!(result, Err(ValidationError::UnparseableAmount));
        assert!(port.events().is_empty());
    }

    #[tokio::test]
    async fn test_successful_conversion_reaches_the_port() {
        let (session, port) = session_with(stocked_source());
        session.replace_selection(Selection {
            amount: "10".to_string(),
            ..Selection::default()
        });
        port.events.lock().clear();

        session.submit().await.unwrap();

        assert_eq!(
            port.events(),
            vec![
                Event::Loading(true),
                Event::Result("10 USD = 9.20 EUR".to_string()),
                Event::Loading(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_rate_not_found_clears_loading_and_shows_one_error() {
        let (session, port) = session_with(stocked_source());
        session.replace_selection(Selection {
            amount: "10".to_string(),
            from: CurrencyCode::usd(),
            to: CurrencyCode::new("xyz"),
        });
        port.events.lock().clear();

        session.submit().await.unwrap();

        assert_eq!(
            port.events(),
            vec![
                Event::Loading(true),
                Event::Error("rate not found for USD to XYZ".to_string()),
                Event::Loading(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_source_unavailable_shows_generic_message() {
        let primary: Arc<dyn RateSource> = Arc::new(MockRateSource::failing("primary"));
        let fallback: Arc<dyn RateSource> = Arc::new(MockRateSource::failing("fallback"));
        let chain = Arc::new(FallbackSource::new(vec![primary, fallback]));

        let port = RecordingPort::default();
        let session = ConverterSession::new(chain, port.clone());
        port.events.lock().clear();

        session.submit().await.unwrap();

        let events = port.events();
        assert!(events.contains(&Event::Error(SOURCE_UNAVAILABLE_MSG.to_string())));
        assert_eq!(events.last(), Some(&Event::Loading(false)));
    }

    #[tokio::test]
    async fn test_swap_updates_flags_and_reconverts() {
        let (session, port) = session_with(stocked_source());
        session.replace_selection(Selection {
            amount: "1".to_string(),
            ..Selection::default()
        });
        port.events.lock().clear();

        session.swap().await.unwrap();

        let selection = session.selection();
        assert_eq!(selection.from, CurrencyCode::eur());
        assert_eq!(selection.to, CurrencyCode::usd());

        let events = port.events();
        assert!(events.contains(&Event::Flag(FlagSide::From, "eur".to_string())));
        assert!(events.contains(&Event::Flag(FlagSide::To, "usd".to_string())));
        assert!(events.contains(&Event::Result("1 EUR = 1.09 USD".to_string())));
    }

    #[tokio::test]
    async fn test_amount_edit_and_currency_change_reconvert() {
        let (session, port) = session_with(stocked_source());
        port.events.lock().clear();

        session.set_amount("2").await.unwrap();
        session
            .select(FlagSide::To, CurrencyCode::usd())
            .await
            .unwrap();

        let events = port.events();
        assert!(events.contains(&Event::Result("2 USD = 1.84 EUR".to_string())));
        assert!(events.contains(&Event::Flag(FlagSide::To, "usd".to_string())));
        assert!(events.contains(&Event::Result("2 USD = 2 USD".to_string())));
    }

    #[tokio::test]
    async fn test_load_catalog_runs_initial_conversion() {
        let (session, port) = session_with(stocked_source());

        let catalog = session.load_catalog().await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(session.catalog().is_some());
        assert!(port
            .events()
            .contains(&Event::Result("1 USD = 0.92 EUR".to_string())));
    }

    #[tokio::test]
    async fn test_catalog_failure_shows_generic_message() {
        let source = Arc::new(MockRateSource::failing("down"));
        let (session, port) = session_with(source);

        assert!(session.load_catalog().await.is_none());
        assert!(port
            .events()
            .contains(&Event::Error(SOURCE_UNAVAILABLE_MSG.to_string())));
    }

    #[tokio::test]
    async fn test_history_failure_shows_generic_message() {
        let source = Arc::new(MockRateSource::failing("down"));
        let (session, port) = session_with(source);
        port.events.lock().clear();

        session.show_history().await;

        let events = port.events();
        assert!(events.contains(&Event::Error(HISTORY_FAILED_MSG.to_string())));
        assert_eq!(events.last(), Some(&Event::Loading(false)));
    }

    #[tokio::test]
    async fn test_history_reaches_the_port() {
        let source = stocked_source();
        // Stock a dated document for today so at least one point lands.
        source.set_dated(RateDocument::new(
            CurrencyCode::usd(),
            today(),
            [(CurrencyCode::eur(), dec!(0.92))],
        ));
        let (session, port) = session_with(source);
        port.events.lock().clear();

        session.show_history().await;

        assert!(port.events().contains(&Event::Series(1)));
    }
}
