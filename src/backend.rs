//! Wire shapes of the external services.
//!
//! The engine never talks to the network. Every call is a request value with
//! an `ACTION` name and a list of form fields, POSTed by the caller to
//! [`CALLBACK_PATH`]; the JSON answer is decoded into a [`ServiceResponse`] and
//! handed back to the engine.
//!
//! ```text
//! getRecommendations  scope[list_*]=true, q          -> { list_*: [item], hierarchy: [item] }
//! generateQuery       coins, relationString, searchType -> query text
//! searchCoin          q, searchType                  -> [record], length
//! download            fileType=csv, searchType, q    -> file (not decoded)
//! ```

use crate::coin::{Category, Item};
use crate::error::{EngineError, Result};
use crate::results::ResultRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Endpoint every request is posted to.
pub const CALLBACK_PATH: &str = "callback";

/// A form-encoded call to the callback endpoint.
pub trait ServiceRequest {
    const ACTION: &'static str;

    /// Form fields in send order, `action` first.
    fn form_fields(&self) -> Vec<(String, String)>;
}

fn field(name: &str, value: impl Into<String>) -> (String, String) {
    (name.to_string(), value.into())
}

/// Which kind of record a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchType {
    #[default]
    NumismaticObject,
    #[serde(alias = "Type")]
    TypeSeriesItem,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::NumismaticObject => "NumismaticObject",
            SearchType::TypeSeriesItem => "TypeSeriesItem",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "NumismaticObject" | "Coin" => Ok(SearchType::NumismaticObject),
            "TypeSeriesItem" | "Type" => Ok(SearchType::TypeSeriesItem),
            _ => Err(EngineError::UnknownSearchType(s.to_string())),
        }
    }
}

bitflags::bitflags! {
    /// Tables a recommendation request searches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecommendationScope: u8 {
        const ANIMAL    = 1 << 0;
        const OBJECT    = 1 << 1;
        const PERSON    = 1 << 2;
        const PLANT     = 1 << 3;
        const VERB      = 1 << 4;
        const HIERARCHY = 1 << 5;

        const DESCRIPTORS = Self::ANIMAL.bits() | Self::OBJECT.bits() | Self::PERSON.bits()
            | Self::PLANT.bits() | Self::VERB.bits();
    }
}

/// Table name of the hierarchy lookup.
pub const HIERARCHY_TABLE: &str = "hierarchy";

impl RecommendationScope {
    pub fn of(category: Category) -> Self {
        match category {
            Category::Animal => Self::ANIMAL,
            Category::Object => Self::OBJECT,
            Category::Person => Self::PERSON,
            Category::Plant => Self::PLANT,
            Category::Verb => Self::VERB,
        }
    }

    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        categories.into_iter().fold(Self::empty(), |acc, c| acc | Self::of(*c))
    }

    /// Table names covered, categories first, in wire order.
    pub fn tables(self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> =
            Category::ALL.iter().filter(|c| self.contains(Self::of(**c))).map(|c| c.table()).collect();
        if self.contains(Self::HIERARCHY) {
            out.push(HIERARCHY_TABLE);
        }
        out
    }
}

impl Default for RecommendationScope {
    fn default() -> Self {
        Self::DESCRIPTORS
    }
}

/// Autocomplete lookup for a description field, or a superclass lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub scope: RecommendationScope,
    pub query: String,
}

impl RecommendationRequest {
    pub fn new(scope: RecommendationScope, query: impl Into<String>) -> Self {
        Self { scope, query: query.into() }
    }

    /// Lookup of a hierarchy class, used for descriptor tooltips.
    pub fn hierarchy(class: impl Into<String>) -> Self {
        Self::new(RecommendationScope::HIERARCHY, class)
    }
}

impl ServiceRequest for RecommendationRequest {
    const ACTION: &'static str = "getRecommendations";

    fn form_fields(&self) -> Vec<(String, String)> {
        let mut out = vec![field("action", Self::ACTION)];
        out.extend(self.scope.tables().into_iter().map(|t| (format!("scope[{t}]"), "true".to_string())));
        out.push(field("q", self.query.as_str()));
        out
    }
}

/// Request to turn the coin set and relation text into a backend query.
///
/// `seq` orders requests issued by one engine; see [`CompileSequencer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub seq: u64,
    /// Portable JSON array of the queried coins.
    pub coins: String,
    pub relation: String,
    pub search_type: SearchType,
}

impl ServiceRequest for CompileRequest {
    const ACTION: &'static str = "generateQuery";

    fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            field("action", Self::ACTION),
            field("coins", self.coins.as_str()),
            field("relationString", self.relation.as_str()),
            field("searchType", self.search_type.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: SearchType,
}

impl ServiceRequest for SearchRequest {
    const ACTION: &'static str = "searchCoin";

    fn form_fields(&self) -> Vec<(String, String)> {
        vec![field("action", Self::ACTION), field("q", self.query.as_str()), field("searchType", self.search_type.as_str())]
    }
}

/// CSV export of the current query's results. The answer is a file, not JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub query: String,
    pub search_type: SearchType,
}

impl ServiceRequest for DownloadRequest {
    const ACTION: &'static str = "download";

    fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            field("action", Self::ACTION),
            field("fileType", "csv"),
            field("searchType", self.search_type.as_str()),
            field("q", self.query.as_str()),
        ]
    }
}

/// JSON envelope of every callback answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub result: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
    /// Number of rows, sent with search results.
    pub length: Option<usize>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(result: T) -> Self {
        Self { success: true, result: Some(result), error: None, message: None, length: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, result: None, error: Some(error.into()), message: None, length: None }
    }

    /// The result of a successful call; anything else is a backend error.
    pub fn into_result(self, action: &'static str) -> Result<T> {
        match (self.success, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(EngineError::Backend { action, message: "response carried no result".into() }),
            (false, _) => {
                let message = self.error.or(self.message).unwrap_or_else(|| "request failed".into());
                Err(EngineError::Backend { action, message })
            }
        }
    }
}

impl<T: serde::de::DeserializeOwned> ServiceResponse<T> {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

pub type CompileResponse = ServiceResponse<String>;
pub type SearchResponse = ServiceResponse<Vec<ResultRecord>>;
pub type RecommendationResponse = ServiceResponse<Map<String, Value>>;

/// Recommendations grouped by table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    by_category: Vec<(Category, Vec<Item>)>,
    hierarchy: Vec<Item>,
}

impl Recommendations {
    /// Decode the `result` object of a recommendation response. Unknown
    /// tables and rows that are not objects are skipped.
    pub fn from_result(result: Map<String, Value>) -> Self {
        let mut out = Self::default();
        for (table, rows) in result {
            let Value::Array(rows) = rows else {
                trace!(table = %table, "recommendation table is not a list; skipped");
                continue;
            };
            let items: Vec<Item> = rows.into_iter().filter_map(Item::from_value).collect();
            if table == HIERARCHY_TABLE {
                out.hierarchy = items;
                continue;
            }
            match table.parse::<Category>() {
                Ok(category) => out.by_category.push((category, items)),
                Err(_) => trace!(table = %table, "unknown recommendation table; skipped"),
            }
        }
        out.by_category.sort_by_key(|(c, _)| *c);
        out
    }

    pub fn entries(&self) -> impl Iterator<Item = (Category, &[Item])> {
        self.by_category.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    pub fn items(&self, category: Category) -> &[Item] {
        self.by_category.iter().find(|(c, _)| *c == category).map_or(&[][..], |(_, items)| items.as_slice())
    }

    /// The `index`-th recommendation of `category`, as listed to the user.
    pub fn item(&self, category: Category, index: usize) -> Option<&Item> {
        self.items(category).get(index)
    }

    pub fn hierarchy(&self) -> &[Item] {
        &self.hierarchy
    }

    /// First hierarchy row; the superclass shown in a tooltip.
    pub fn superclass(&self) -> Option<&Item> {
        self.hierarchy.first()
    }

    pub fn len(&self) -> usize {
        self.by_category.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Orders compile requests so a late answer never overwrites a newer one.
///
/// Every request gets the next sequence number. An answer is accepted only if
/// its number is higher than every number already answered, successful or
/// not; anything else arrived out of order and is dropped.
#[derive(Debug, Clone, Default)]
pub struct CompileSequencer {
    issued: u64,
    answered: u64,
}

impl CompileSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn accept(&mut self, seq: u64) -> bool {
        if seq > self.issued {
            warn!(seq, issued = self.issued, "compile response for a request never issued");
            return false;
        }
        if seq <= self.answered {
            debug!(seq, answered = self.answered, "stale compile response discarded");
            return false;
        }
        self.answered = seq;
        true
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }

    pub fn last_answered(&self) -> u64 {
        self.answered
    }

    /// Whether the newest request is still waiting for its answer.
    pub fn is_pending(&self) -> bool {
        self.answered < self.issued
    }
}
