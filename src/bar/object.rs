//! Bar data structures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::constant::{FrameType, ImbalanceDir, MarketType, Provider, VenueId};

/// Plain key/value form of a bar, as stored in the list.
pub type BarRecord = Map<String, Value>;

/// One OHLCV observation for an instrument over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Timeframe label, e.g. "1m"
    pub tf: String,
    pub frame_type: FrameType,
    /// Timeframe length in seconds
    pub tf_s: i64,
    pub market_type: MarketType,
    pub venue_id: VenueId,
    pub venue_symbol: String,
    /// Canonical cross-venue instrument identifier
    pub instrument_uid: String,
    pub provider: Provider,
    /// Window start, UTC epoch ms, aligned to `tf_s`
    pub window_start_ms: i64,
    /// Window end, `window_start_ms + tf_s * 1000 - 1`
    pub window_end_ms: i64,
    pub is_final: bool,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ts_emit_ms: i64,

    #[serde(default)]
    pub quality: Option<Map<String, Value>>,
    #[serde(default)]
    pub imbalance_dir: Option<ImbalanceDir>,
}

impl Bar {
    /// Window end implied by the start and the timeframe, or `None` if it
    /// does not fit in an `i64`.
    pub fn expected_window_end_ms(&self) -> Option<i64> {
        self.tf_s
            .checked_mul(1000)?
            .checked_add(self.window_start_ms)?
            .checked_sub(1)
    }

    /// Whether `low <= min(open, close) <= max(open, close) <= high`.
    pub fn prices_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    /// Convert into the mapping that gets persisted. Optional fields are
    /// always present, as `null` when unset.
    pub fn to_record(&self) -> Result<BarRecord, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object.
            other => Err(serde::ser::Error::custom(format!(
                "bar serialized to non-object: {other}"
            ))),
        }
    }
}

/// Ordered sequence of bars submitted in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarBatch {
    pub items: Vec<Bar>,
}

impl BarBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// The BINANCE 1m bar used across the test suites.
    pub(crate) fn sample_bar_json() -> Value {
        json!({
            "tf": "1m",
            "frame_type": "bar",
            "tf_s": 60,
            "market_type": "centralized",
            "venue_id": "BINANCE",
            "venue_symbol": "BTCUSDT",
            "instrument_uid": "BINANCE:BTCUSDT",
            "provider": "binance-ws-kline",
            "window_start_ms": 1000,
            "window_end_ms": 59999,
            "is_final": true,
            "open": 100.0,
            "high": 101.0,
            "low": 99.5,
            "close": 100.5,
            "volume": 10.0,
            "ts_emit_ms": 60000
        })
    }

    pub(crate) fn sample_bar() -> Bar {
        serde_json::from_value(sample_bar_json()).unwrap()
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let bar = sample_bar();
        assert_eq!(bar.venue_id, VenueId::BINANCE);
        assert_eq!(bar.provider, Provider::BINANCE_WS_KLINE);
        assert!(bar.quality.is_none());
        assert!(bar.imbalance_dir.is_none());
    }

    #[test]
    fn test_to_record_fills_nulls() {
        let record = sample_bar().to_record().unwrap();
        assert_eq!(record.len(), 19);
        assert_eq!(record["quality"], Value::Null);
        assert_eq!(record["imbalance_dir"], Value::Null);
        assert_eq!(record["open"], json!(100.0));
        assert_eq!(record["is_final"], json!(true));
        assert_eq!(record["venue_id"], json!("BINANCE"));
    }

    #[test]
    fn test_invariant_helpers() {
        let mut bar = sample_bar();
        assert_eq!(bar.expected_window_end_ms(), Some(60999));
        assert!(bar.prices_consistent());

        bar.tf_s = i64::MAX / 10;
        assert_eq!(bar.expected_window_end_ms(), None);
        bar.tf_s = 60;
        bar.window_start_ms = i64::MAX - 10;
        assert_eq!(bar.expected_window_end_ms(), None);

        bar.high = 100.2;
        assert!(!bar.prices_consistent());
    }
}
