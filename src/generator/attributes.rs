//! Canonical attribute values.
//!
//! Every typed field of the model goes through here before it reaches the
//! element writer. Encoding never fails: an unset field is simply not pushed,
//! except for the few attributes that have documented sentinel text.

use crate::model::UnitKind;

/// Text written for a unit whose kind is unset or not a valid unit name.
pub const INVALID_UNIT_KIND: &str = "(Invalid UnitKind)";

/// Value written for an unset unit `scale`.
pub const UNSET_SCALE: i32 = i32::MAX;

/// Format a double the way SBML readers expect it: `NaN`, `INF`, `-INF`, or
/// the shortest decimal that parses back to the same value.
///
/// Plain notation is used while the decimal exponent lies in `[-4, 15)`,
/// scientific notation (`6.02214076e+23`, `1e-05`) outside of it. The output
/// never depends on the host locale.
pub fn encode_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", value);
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..15).contains(&exponent) {
        format!("{}", value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Inverse of [`encode_double`]. Also accepts anything `f64::from_str` takes.
pub fn decode_double(text: &str) -> Option<f64> {
    match text.trim() {
        "NaN" => Some(f64::NAN),
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

pub fn decode_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// `SBO:0000123` form of an SBO term number.
pub fn encode_sbo_term(term: u32) -> String {
    format!("SBO:{:07}", term)
}

pub fn decode_sbo_term(text: &str) -> Option<u32> {
    let digits = text.trim().strip_prefix("SBO:")?;
    if digits.len() != 7 {
        return None;
    }
    digits.parse().ok()
}

/// Ordered attribute list of one element. Order of insertion is the order of
/// output, so element writers push attributes in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    items: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Push an already encoded value. Escaping happens when the element is written.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.items.push((name.into(), value.into()));
        self
    }

    pub fn string(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.push(name, v);
        }
        self
    }

    pub fn double(&mut self, name: &str, value: Option<f64>) -> &mut Self {
        if let Some(v) = value {
            self.push(name, encode_double(v));
        }
        self
    }

    /// Like [`Attributes::double`] but writes `NaN` when the value is unset.
    pub fn double_or_nan(&mut self, name: &str, value: Option<f64>) -> &mut Self {
        self.push(name, encode_double(value.unwrap_or(f64::NAN)))
    }

    pub fn int(&mut self, name: &str, value: Option<i64>) -> &mut Self {
        if let Some(v) = value {
            self.push(name, v.to_string());
        }
        self
    }

    pub fn boolean(&mut self, name: &str, value: Option<bool>) -> &mut Self {
        if let Some(v) = value {
            self.push(name, encode_bool(v));
        }
        self
    }

    /// Required attribute: written with `default` when the field is unset.
    pub fn required_bool(&mut self, name: &str, value: Option<bool>, default: bool) -> &mut Self {
        self.push(name, encode_bool(value.unwrap_or(default)))
    }

    pub fn unit_kind(&mut self, name: &str, value: Option<UnitKind>) -> &mut Self {
        let text = value.map(UnitKind::name).unwrap_or(INVALID_UNIT_KIND);
        self.push(name, text)
    }

    pub fn scale(&mut self, name: &str, value: Option<i32>) -> &mut Self {
        self.push(name, value.unwrap_or(UNSET_SCALE).to_string())
    }

    pub fn sbo_term(&mut self, value: Option<u32>) -> &mut Self {
        if let Some(term) = value {
            self.push("sboTerm", encode_sbo_term(term));
        }
        self
    }
}
