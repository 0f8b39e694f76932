//! Presentation port and the request-sequencing guard.

use std::sync::atomic::{AtomicU64, Ordering};

use curex_common::{Conversion, CurrencyCode, HistoricalSeries};

/// Which selector a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSide {
    From,
    To,
}

/// The narrow interface the pipeline drives a front end through.
/// Implementations render however they like; no value flows back.
pub trait Presentation: Send + Sync {
    /// Show a successful conversion, replacing any visible error.
    fn set_result(&self, conversion: &Conversion);

    /// Show exactly one error message, replacing any visible result.
    fn set_error(&self, message: &str);

    /// Raise or clear the busy indicator.
    fn set_loading(&self, loading: bool);

    /// Point a flag slot at a currency.
    fn set_flag(&self, side: FlagSide, code: &CurrencyCode);

    /// Hand over a freshly built series for rendering.
    fn set_series(&self, series: &HistoricalSeries);
}

/// Token identifying one user-triggered request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Wraps a port with monotonic request tokens and discards completions
/// that resolve after a newer request has already been applied. Without
/// this, overlapping requests apply in resolution order and a slow stale
/// response can overwrite a fresher result.
pub struct SequencedPort<P> {
    inner: P,
    next: AtomicU64,
    last_applied: AtomicU64,
}

impl<P: Presentation> SequencedPort<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            next: AtomicU64::new(1),
            last_applied: AtomicU64::new(0),
        }
    }

    /// The wrapped port, for writes that are not subject to sequencing
    /// (flags, loading, series).
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Issue the token for a new request.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Apply a successful conversion unless a newer completion already
    /// landed. Returns whether the write went through.
    pub fn complete(&self, token: RequestToken, conversion: &Conversion) -> bool {
        if !self.try_apply(token) {
            return false;
        }
        self.inner.set_result(conversion);
        true
    }

    /// Apply a failure message unless a newer completion already landed.
    pub fn fail(&self, token: RequestToken, message: &str) -> bool {
        if !self.try_apply(token) {
            return false;
        }
        self.inner.set_error(message);
        true
    }

    fn try_apply(&self, token: RequestToken) -> bool {
        let mut current = self.last_applied.load(Ordering::Acquire);
        loop {
            if token.0 <= current {
                return false;
            }
            match self.last_applied.compare_exchange_weak(
                current,
                token.0,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

/// Scoped busy state: raised on creation, unconditionally cleared on
/// drop, so the indicator clears on success and failure paths alike.
pub struct LoadingGuard<'a, P: Presentation> {
    port: &'a P,
}

impl<'a, P: Presentation> LoadingGuard<'a, P> {
    pub fn new(port: &'a P) -> Self {
        port.set_loading(true);
        Self { port }
    }
}

impl<P: Presentation> Drop for LoadingGuard<'_, P> {
    fn drop(&mut self) {
        self.port.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Result(String),
        Error(String),
        Loading(bool),
    }

    #[derive(Default)]
    struct RecordingPort {
        events: Mutex<Vec<Event>>,
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

        fn set_flag(&self, _side: FlagSide, _code: &CurrencyCode) {}

        fn set_series(&self, _series: &HistoricalSeries) {}
    }

    fn conversion(amount: rust_decimal::Decimal) -> Conversion {
        Conversion::compute(
            amount,
            CurrencyCode::usd(),
            CurrencyCode::eur(),
            dec!(0.92),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_tokens_are_monotonic() {
        let port = SequencedPort::new(RecordingPort::default());
        let first = port.begin();
        let second = port.begin();
        assert!(first < second);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let port = SequencedPort::new(RecordingPort::default());
        let old = port.begin();
        let new = port.begin();

        assert!(port.complete(new, &conversion(dec!(2))));
        // The older request resolves later; its result must not land.
        assert!(!port.complete(old, &conversion(dec!(1))));

        let events = port.inner().events();
        assert_eq!(events, vec![Event::Result("2 USD = 1.84 EUR".to_string())]);
    }

    #[test]
    fn test_stale_error_cannot_overwrite_fresh_result() {
        let port = SequencedPort::new(RecordingPort::default());
        let old = port.begin();
        let new = port.begin();

        assert!(port.complete(new, &conversion(dec!(2))));
        assert!(!port.fail(old, "too late"));

        assert_eq!(port.inner().events().len(), 1);
    }

    #[test]
    fn test_loading_guard_clears_on_drop() {
        let port = RecordingPort::default();
        {
            let _busy = LoadingGuard::new(&port);
            assert_eq!(port.events(), vec![Event::Loading(true)]);
        }
        assert_eq!(
            port.events(),
            vec![Event::Loading(true), Event::Loading(false)]
        );
    }
}
