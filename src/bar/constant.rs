//! Enumerations used by bar records.
//!
//! `FrameType`, `MarketType` and `ImbalanceDir` are closed sets. Venues and
//! providers grow over time, so they are string-backed newtypes checked
//! against an allowlist at validation time (see [`super::schema::BarSchema`]).
//!
//! To make a new venue or provider a built-in, add a constant below and list it
//! in [`KNOWN_VENUES`] / [`KNOWN_PROVIDERS`]. To accept one without a rebuild,
//! set `schema.venues` / `schema.providers` in the settings.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Kind of frame. Only bars exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    #[default]
    Bar,
}

impl FrameType {
    pub const ALL: &'static [&'static str] = &["bar"];

    pub fn value(&self) -> &'static str {
        match self {
            FrameType::Bar => "bar",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Market structure the instrument trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Exchange with a central order book
    Centralized,
    /// Over the counter
    Otc,
}

impl MarketType {
    pub const ALL: &'static [&'static str] = &["centralized", "otc"];

    pub fn value(&self) -> &'static str {
        match self {
            MarketType::Centralized => "centralized",
            MarketType::Otc => "otc",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Directional bias of the order flow within a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceDir {
    Up,
    Down,
    Flat,
}

impl ImbalanceDir {
    pub const ALL: &'static [&'static str] = &["up", "down", "flat"];

    pub fn value(&self) -> &'static str {
        match self {
            ImbalanceDir::Up => "up",
            ImbalanceDir::Down => "down",
            ImbalanceDir::Flat => "flat",
        }
    }
}

impl fmt::Display for ImbalanceDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Built-in venue identifiers.
pub const KNOWN_VENUES: &[&str] = &["B3", "ACTIVE_TRADES", "BINANCE"];

/// Built-in provider identifiers.
pub const KNOWN_PROVIDERS: &[&str] = &["binance-ws-kline", "metatrader", "tradeview", "screen-ocr"];

/// Market or exchange where the instrument trades.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(Cow<'static, str>);

impl VenueId {
    pub const B3: VenueId = VenueId(Cow::Borrowed("B3"));
    pub const ACTIVE_TRADES: VenueId = VenueId(Cow::Borrowed("ACTIVE_TRADES"));
    pub const BINANCE: VenueId = VenueId(Cow::Borrowed("BINANCE"));

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data source that produced the bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provider(Cow<'static, str>);

impl Provider {
    pub const BINANCE_WS_KLINE: Provider = Provider(Cow::Borrowed("binance-ws-kline"));
    pub const METATRADER: Provider = Provider(Cow::Borrowed("metatrader"));
    pub const TRADEVIEW: Provider = Provider(Cow::Borrowed("tradeview"));
    pub const SCREEN_OCR: Provider = Provider(Cow::Borrowed("screen-ocr"));

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_enums_use_wire_names() {
        assert_eq!(serde_json::to_string(&MarketType::Otc).unwrap(), "\"otc\"");
        assert_eq!(serde_json::to_string(&FrameType::Bar).unwrap(), "\"bar\"");
        let dir: ImbalanceDir = serde_json::from_str("\"flat\"").unwrap();
        assert_eq!(dir, ImbalanceDir::Flat);
        assert!(serde_json::from_str::<MarketType>("\"dark_pool\"").is_err());
    }

    #[test]
    fn test_open_enums_compare_by_value() {
        let venue: VenueId = serde_json::from_str("\"BINANCE\"").unwrap();
        assert_eq!(venue, VenueId::BINANCE);
        assert_eq!(Provider::new("screen-ocr"), Provider::SCREEN_OCR);
        assert_eq!(serde_json::to_string(&VenueId::B3).unwrap(), "\"B3\"");
    }

    #[test]
    fn test_known_lists_match_constants() {
        assert!(KNOWN_VENUES.contains(&VenueId::ACTIVE_TRADES.value()));
        assert!(KNOWN_PROVIDERS.contains(&Provider::TRADEVIEW.value()));
        assert!(KNOWN_PROVIDERS.contains(&Provider::METATRADER.value()));
        assert!(KNOWN_PROVIDERS.contains(&Provider::BINANCE_WS_KLINE.value()));
    }
}
