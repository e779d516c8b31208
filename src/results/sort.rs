use super::record::{FieldValue, ResultRecord};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            _ => Err(EngineError::UnknownSortDirection(s.to_string())),
        }
    }
}

/// Sort key of a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }

    /// Stable sort of `records` under one collation chosen for the whole list.
    pub fn sort(&self, records: &mut [ResultRecord]) {
        let collation = Collation::for_field(records, &self.field);
        records.sort_by(|a, b| self.direction.apply(collation.compare(&a.field(&self.field), &b.field(&self.field))));
    }
}

/// How the values of one field compare across a whole list.
///
/// A field whose present values are all numbers sorts numerically, missing
/// values first. As soon as one value is text, every value compares as
/// lower-cased text (missing as `""`), so mixed columns still get a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collation {
    Numeric,
    Text,
}

impl Collation {
    pub fn for_field(records: &[ResultRecord], field: &str) -> Self {
        let numeric =
            records.iter().all(|r| matches!(r.field(field), FieldValue::Missing | FieldValue::Number(_)));
        if numeric { Collation::Numeric } else { Collation::Text }
    }

    pub fn compare(self, a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
        match self {
            Collation::Numeric => match (a, b) {
                (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
                (FieldValue::Number(_), _) => Ordering::Greater,
                (_, FieldValue::Number(_)) => Ordering::Less,
                _ => Ordering::Equal,
            },
            Collation::Text => a.text().to_lowercase().cmp(&b.text().to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> ResultRecord {
        ResultRecord::from_value(v).unwrap()
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("ascending".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!(matches!("up".parse::<SortDirection>(), Err(EngineError::UnknownSortDirection(_))));
    }

    fn sorted(values: Vec<serde_json::Value>, direction: SortDirection) -> Vec<serde_json::Value> {
        let mut list: Vec<_> = values.into_iter().map(|v| rec(json!({ "v": v }))).collect();
        SortSpec::new("v", direction).sort(&mut list);
        list.iter().map(|r| r.fields().get("v").cloned().unwrap_or(serde_json::Value::Null)).collect()
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(sorted(vec![json!(10), json!(9), json!(2.5)], SortDirection::Ascending), vec![
            json!(2.5),
            json!(9),
            json!(10)
        ]);
    }

    #[test]
    fn missing_values_sort_before_numbers() {
        let mut list = vec![rec(json!({"v": 3})), rec(json!({})), rec(json!({"v": 1}))];
        SortSpec::new("v", SortDirection::Ascending).sort(&mut list);
        assert!(list[0].fields().get("v").is_none());
        assert_eq!(list[1].fields()["v"], json!(1));
    }

    #[test]
    fn text_compares_case_insensitively() {
        let values = vec![json!("Boeotia"), json!("attica")];
        assert_eq!(sorted(values.clone(), SortDirection::Ascending), vec![json!("attica"), json!("Boeotia")]);
        assert_eq!(sorted(values, SortDirection::Descending), vec![json!("Boeotia"), json!("attica")]);
    }

    #[test]
    fn one_text_value_makes_the_whole_field_text() {
        // "10" < "5" < "9" as text.
        assert_eq!(sorted(vec![json!(9), json!("5"), json!(10)], SortDirection::Ascending), vec![
            json!(10),
            json!("5"),
            json!(9)
        ]);
    }

    #[test]
    fn mixed_numbers_and_numeric_strings_sort_without_panicking() {
        let values: Vec<_> =
            (0..2000u64).map(|i| if (i * 7919) % 3 == 0 { json!(i % 97) } else { json!((i % 89).to_string()) }).collect();
        let out = sorted(values, SortDirection::Ascending);
        let texts: Vec<String> = out.iter().map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string)).collect();
        assert!(texts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn equal_keys_keep_their_order() {
        let mut list = vec![rec(json!({"v": 1, "id": "a"})), rec(json!({"v": 0})), rec(json!({"v": 1, "id": "b"}))];
        SortSpec::new("v", SortDirection::Descending).sort(&mut list);
        let ids: Vec<_> = list.iter().map(ResultRecord::id).collect();
        assert_eq!(ids, vec![Some("a"), Some("b"), None]);
    }
}
