//! Request validation for bar batches.
//!
//! Validation runs over the raw JSON body so that every failing field of every
//! item is reported at once, with its location path. Only a body that passes
//! as a whole is converted into a [`BarBatch`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use super::constant::{FrameType, ImbalanceDir, MarketType, KNOWN_PROVIDERS, KNOWN_VENUES};
use super::object::BarBatch;
use crate::setting::Settings;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the failing value, e.g. `["body", "items", 0, "venue_id"]`
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(loc: Vec<Value>, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Location rendered as a dotted path, for logs.
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Str,
    Int,
    Float,
    Bool,
    Choice(&'static [&'static str]),
    Venue,
    Provider,
    OptionalDict,
    OptionalChoice(&'static [&'static str]),
}

const BAR_FIELDS: &[(&str, FieldKind)] = &[
    ("tf", FieldKind::Str),
    ("frame_type", FieldKind::Choice(FrameType::ALL)),
    ("tf_s", FieldKind::Int),
    ("market_type", FieldKind::Choice(MarketType::ALL)),
    ("venue_id", FieldKind::Venue),
    ("venue_symbol", FieldKind::Str),
    ("instrument_uid", FieldKind::Str),
    ("provider", FieldKind::Provider),
    ("window_start_ms", FieldKind::Int),
    ("window_end_ms", FieldKind::Int),
    ("is_final", FieldKind::Bool),
    ("open", FieldKind::Float),
    ("high", FieldKind::Float),
    ("low", FieldKind::Float),
    ("close", FieldKind::Float),
    ("volume", FieldKind::Float),
    ("ts_emit_ms", FieldKind::Int),
    ("quality", FieldKind::OptionalDict),
    ("imbalance_dir", FieldKind::OptionalChoice(ImbalanceDir::ALL)),
];

/// Allowlists and rules a bar must satisfy.
#[derive(Debug, Clone)]
pub struct BarSchema {
    venues: BTreeSet<String>,
    providers: BTreeSet<String>,
    strict: bool,
}

impl Default for BarSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSchema {
    /// Schema accepting the built-in venues and providers.
    pub fn new() -> Self {
        Self {
            venues: KNOWN_VENUES.iter().map(|v| v.to_string()).collect(),
            providers: KNOWN_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            strict: false,
        }
    }

    /// Schema from `schema.venues`, `schema.providers` and `schema.strict`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_venues(settings.get_list("schema.venues"))
            .with_providers(settings.get_list("schema.providers"))
            .strict(settings.get_bool("schema.strict").unwrap_or(false))
    }

    pub fn with_venues<I, S>(mut self, venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.venues.extend(venues.into_iter().map(Into::into));
        self
    }

    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers.extend(providers.into_iter().map(Into::into));
        self
    }

    /// Also enforce window, OHLC ordering and volume invariants.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn venues(&self) -> impl Iterator<Item = &str> + Clone {
        self.venues.iter().map(String::as_str)
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> + Clone {
        self.providers.iter().map(String::as_str)
    }

    /// Validate a request body and convert it into a batch.
    ///
    /// The batch is built from the coerced values, so `"tf_s": "60"` yields
    /// `tf_s == 60`.
    pub fn parse_batch(&self, body: Value) -> Result<BarBatch, Vec<FieldError>> {
        let normalized = self.normalize_batch(&body)?;

        let batch: BarBatch = serde_json::from_value(normalized).map_err(|e| {
            vec![FieldError::new(vec![json!("body")], e.to_string(), "value_error")]
        })?;

        if self.strict {
            let errors = strict_errors(&batch);
            if !errors.is_empty() {
                return Err(errors);
            }
        }
        Ok(batch)
    }

    /// Collect every structural error in a request body.
    pub fn validate_batch(&self, body: &Value) -> Vec<FieldError> {
        self.normalize_batch(body).err().unwrap_or_default()
    }

    /// Check every item and rebuild the body from the coerced field values.
    /// Unknown fields are dropped.
    fn normalize_batch(&self, body: &Value) -> Result<Value, Vec<FieldError>> {
        let mut errors = Vec::new();

        let Some(object) = body.as_object() else {
            errors.push(FieldError::new(
                vec![json!("body")],
                "Input should be a valid dictionary",
                "dict_type",
            ));
            return Err(errors);
        };

        let items = match object.get("items") {
            None => {
                errors.push(FieldError::new(
                    vec![json!("body"), json!("items")],
                    "Field required",
                    "missing",
                ));
                return Err(errors);
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                errors.push(FieldError::new(
                    vec![json!("body"), json!("items")],
                    "Input should be a valid list",
                    "list_type",
                ));
                return Err(errors);
            }
        };

        let mut normalized = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let loc = vec![json!("body"), json!("items"), json!(index)];
            if let Some(bar) = self.normalize_bar(item, &loc, &mut errors) {
                normalized.push(Value::Object(bar));
            }
        }

        if errors.is_empty() {
            Ok(json!({ "items": normalized }))
        } else {
            Err(errors)
        }
    }

    fn normalize_bar(
        &self,
        item: &Value,
        loc: &[Value],
        errors: &mut Vec<FieldError>,
    ) -> Option<Map<String, Value>> {
        let Some(fields) = item.as_object() else {
            errors.push(FieldError::new(
                loc.to_vec(),
                "Input should be a valid dictionary",
                "dict_type",
            ));
            return None;
        };

        let before = errors.len();
        let mut bar = Map::new();
        for (name, kind) in BAR_FIELDS {
            let field_loc = || {
                let mut field_loc = loc.to_vec();
                field_loc.push(json!(name));
                field_loc
            };
            match self.check_field(fields.get(*name), *kind) {
                Ok(value) => {
                    if *name == "tf_s" && value.as_i64().is_some_and(|tf_s| tf_s <= 0) {
                        errors.push(FieldError::new(
                            field_loc(),
                            "Input should be greater than 0",
                            "greater_than",
                        ));
                    }
                    bar.insert(name.to_string(), value);
                }
                Err((msg, error_type)) => errors.push(FieldError::new(field_loc(), msg, error_type)),
            }
        }

        (errors.len() == before).then_some(bar)
    }

    /// Check one field and return its coerced value. Missing optionals become `null`.
    fn check_field(&self, value: Option<&Value>, kind: FieldKind) -> Result<Value, (String, &'static str)> {
        let value = match (value, kind) {
            (None | Some(Value::Null), FieldKind::OptionalDict | FieldKind::OptionalChoice(_)) => {
                return Ok(Value::Null);
            }
            (None, _) => return Err(("Field required".to_string(), "missing")),
            (Some(value), _) => value,
        };

        match kind {
            FieldKind::Str if value.is_string() => Ok(value.clone()),
            FieldKind::Str => Err(("Input should be a valid string".to_string(), "string_type")),
            FieldKind::Int => coerce_int(value).map(Value::from),
            FieldKind::Float => coerce_float(value).map(Value::from),
            FieldKind::Bool => coerce_bool(value).map(Value::from),
            FieldKind::OptionalDict if value.is_object() => Ok(value.clone()),
            FieldKind::OptionalDict => {
                Err(("Input should be a valid dictionary".to_string(), "dict_type"))
            }
            FieldKind::Choice(allowed) | FieldKind::OptionalChoice(allowed) => {
                check_choice(value, allowed.iter().copied())
            }
            FieldKind::Venue => check_choice(value, self.venues()),
            FieldKind::Provider => check_choice(value, self.providers()),
        }
    }
}

/// Integers, floats without a fractional part, and integer strings.
fn coerce_int(value: &Value) -> Result<i64, (String, &'static str)> {
    let int_type = || ("Input should be a valid integer".to_string(), "int_type");
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err((
                    "Input should be a valid integer, got a number with a fractional part".to_string(),
                    "int_from_float",
                )),
                // i64::MAX as f64 rounds up to 2^63, which is out of range.
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
                _ => Err(int_type()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            (
                "Input should be a valid integer, unable to parse string as an integer".to_string(),
                "int_parsing",
            )
        }),
        _ => Err(int_type()),
    }
}

/// Numbers and finite numeric strings.
fn coerce_float(value: &Value) -> Result<f64, (String, &'static str)> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ("Input should be a valid number".to_string(), "float_type")),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            Ok(_) => Err(("Input should be a finite number".to_string(), "finite_number")),
            Err(_) => Err((
                "Input should be a valid number, unable to parse string as a number".to_string(),
                "float_parsing",
            )),
        },
        _ => Err(("Input should be a valid number".to_string(), "float_type")),
    }
}

/// Booleans, the numbers 0 and 1, and the usual yes/no strings.
fn coerce_bool(value: &Value) -> Result<bool, (String, &'static str)> {
    let unable = || {
        (
            "Input should be a valid boolean, unable to interpret input".to_string(),
            "bool_parsing",
        )
    };
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => Ok(false),
            Some(f) if f == 1.0 => Ok(true),
            _ => Err(unable()),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "off" | "f" | "false" | "n" | "no" => Ok(false),
            "1" | "on" | "t" | "true" | "y" | "yes" => Ok(true),
            _ => Err(unable()),
        },
        _ => Err(("Input should be a valid boolean".to_string(), "bool_type")),
    }
}

fn check_choice<'a>(
    value: &Value,
    allowed: impl Iterator<Item = &'a str> + Clone,
) -> Result<Value, (String, &'static str)> {
    if let Some(s) = value.as_str() {
        if allowed.clone().any(|a| a == s) {
            return Ok(value.clone());
        }
    }
    Err((format!("Input should be {}", describe_choices(allowed)), "enum"))
}

/// `'a', 'b' or 'c'`
fn describe_choices<'a>(allowed: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = allowed.map(|a| format!("'{a}'")).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

fn strict_errors(batch: &BarBatch) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (index, bar) in batch.items.iter().enumerate() {
        let loc = |field: &str| vec![json!("body"), json!("items"), json!(index), json!(field)];

        match bar.expected_window_end_ms() {
            Some(expected) if expected == bar.window_end_ms => {}
            Some(expected) => errors.push(FieldError::new(
                loc("window_end_ms"),
                format!("window_end_ms should equal window_start_ms + tf_s*1000 - 1 ({expected})"),
                "value_error",
            )),
            None => errors.push(FieldError::new(
                loc("window_end_ms"),
                "window_start_ms + tf_s*1000 - 1 is out of the 64-bit integer range",
                "value_error",
            )),
        }
        if !bar.prices_consistent() {
            errors.push(FieldError::new(
                loc("low"),
                "prices should satisfy low <= min(open, close) <= max(open, close) <= high",
                "value_error",
            ));
        }
        if bar.volume < 0.0 {
            errors.push(FieldError::new(
                loc("volume"),
                "Input should be greater than or equal to 0",
                "greater_than_equal",
            ));
        }
    }
    errors
}
