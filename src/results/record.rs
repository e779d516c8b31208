use crate::coin::Side;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// One search hit: a flat JSON object.
///
/// Only a few keys are known to the engine (see the accessors); any field may
/// be used for sorting and grouping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(Map<String, Value>);

/// A record field as seen by sorting and grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Absent or `null`.
    Missing,
    Number(f64),
    Text(Cow<'a, str>),
}

impl FieldValue<'_> {
    /// String form; missing values are empty.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Missing => Cow::Borrowed(""),
            FieldValue::Number(n) => Cow::Owned(format_number(*n)),
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.is_empty(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{:.0}", n) } else { n.to_string() }
}

impl ResultRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn field(&self, name: &str) -> FieldValue<'_> {
        match self.0.get(name) {
            None | Some(Value::Null) => FieldValue::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
            Some(Value::String(s)) => FieldValue::Text(Cow::Borrowed(s.as_str())),
            Some(Value::Bool(b)) => FieldValue::Text(Cow::Owned(b.to_string())),
            Some(other) => FieldValue::Text(Cow::Owned(other.to_string())),
        }
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// The `type` field (coin or type series item class).
    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn date(&self) -> Option<&str> {
        self.str_field("date")
    }

    pub fn location(&self) -> Option<&str> {
        self.str_field("location")
    }

    pub fn region(&self) -> Option<&str> {
        self.str_field("region")
    }

    pub fn category(&self) -> Option<&str> {
        self.str_field("category")
    }

    pub fn weight(&self) -> Option<f64> {
        self.0.get("weight").and_then(Value::as_f64)
    }

    pub fn max_diameter(&self) -> Option<f64> {
        self.0.get("maxDiameter").and_then(Value::as_f64)
    }

    pub fn thumbnail(&self, side: Side) -> Option<&str> {
        match side {
            Side::Obverse => self.str_field("thumbnailObverse"),
            Side::Reverse => self.str_field("thumbnailReverse"),
        }
    }

    pub fn description(&self, side: Side) -> Option<&str> {
        match side {
            Side::Obverse => self.str_field("descriptionObverse"),
            Side::Reverse => self.str_field("descriptionReverse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> ResultRecord {
        ResultRecord::from_value(v).unwrap()
    }

    #[test]
    fn field_values() {
        let r = record(json!({ "weight": 3.0, "t": "A", "n": null, "e": "", "b": true }));
        assert_eq!(r.field("weight"), FieldValue::Number(3.0));
        assert_eq!(r.field("weight").text(), "3");
        assert_eq!(r.field("t").text(), "A");
        assert_eq!(r.field("b").text(), "true");
        assert!(r.field("n").is_blank());
        assert!(r.field("e").is_blank());
        assert!(r.field("missing").is_blank());
        assert!(!record(json!({ "z": 0 })).field("z").is_blank());
    }

    #[test]
    fn typed_accessors() {
        let r = record(json!({
            "id": "http://example.org/coin/1",
            "type": "NumismaticObject",
            "weight": 17.2,
            "maxDiameter": 27,
            "thumbnailObverse": "obv.jpg",
            "descriptionReverse": "Nike standing",
        }));
        assert_eq!(r.id(), Some("http://example.org/coin/1"));
        assert_eq!(r.kind(), Some("NumismaticObject"));
        assert_eq!(r.weight(), Some(17.2));
        assert_eq!(r.max_diameter(), Some(27.0));
        assert_eq!(r.thumbnail(Side::Obverse), Some("obv.jpg"));
        assert_eq!(r.thumbnail(Side::Reverse), None);
        assert_eq!(r.description(Side::Reverse), Some("Nike standing"));
        assert!(ResultRecord::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(2.5), "2.5");
    }
}
