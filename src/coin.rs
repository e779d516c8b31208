//! Coin data model.
//!
//! A coin description has two sides. Each side carries an ordered list of
//! categorized descriptors (picked from recommendation tables) and an ordered
//! list of free-text keywords. Descriptor order drives how a side is *displayed*
//! (first non-verb is the subject, later non-verbs are objects) but roles are
//! derived on demand and never stored, so they cannot affect equality.
//!
//! The serde representation is the portable form the query compiler expects:
//!
//! ```text
//! { "obverse": { "coin": [ { "category": "list_person", "item": { .. } } ],
//!                "keywords": [ { "text": "wreath", "negated": false } ] },
//!   "reverse": { .. } }
//! ```

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Descriptor category, one per recommendation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "list_animal")]
    Animal,
    #[serde(rename = "list_obj")]
    Object,
    #[serde(rename = "list_person")]
    Person,
    #[serde(rename = "list_plant")]
    Plant,
    #[serde(rename = "list_verb")]
    Verb,
}

impl Category {
    pub const ALL: [Category; 5] = [Category::Animal, Category::Object, Category::Person, Category::Plant, Category::Verb];

    /// Backend table name, e.g. `list_obj`.
    pub fn table(self) -> &'static str {
        match self {
            Category::Animal => "list_animal",
            Category::Object => "list_obj",
            Category::Person => "list_person",
            Category::Plant => "list_plant",
            Category::Verb => "list_verb",
        }
    }

    /// Short label shown next to a recommendation (`obj`, `verb`, ...).
    pub fn label(self) -> &'static str {
        &self.table()["list_".len()..]
    }

    /// Material symbol used for tags of this category.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Animal => "pets",
            Category::Object => "category",
            Category::Person => "accessibility_new",
            Category::Plant => "psychiatry",
            Category::Verb => "keyboard_double_arrow_right",
        }
    }

    pub fn is_verb(self) -> bool {
        self == Category::Verb
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    /// Accepts table names (`list_obj`) and bare names (`obj`, `object`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("list_").unwrap_or(&name);
        match name {
            "animal" => Ok(Category::Animal),
            "obj" | "object" => Ok(Category::Object),
            "person" => Ok(Category::Person),
            "plant" => Ok(Category::Plant),
            "verb" => Ok(Category::Verb),
            _ => Err(EngineError::UnknownCategory(s.to_string())),
        }
    }
}

/// Hierarchy columns consulted for superclass tooltips, most general first.
const HIERARCHY_COLUMNS: [&str; 5] = ["Cat_I", "Cat_II", "Cat_III", "Cat_IV", "Cat_V"];

/// An opaque recommendation row.
///
/// The engine never interprets an item beyond a handful of well-known keys:
/// `found_in_column` (which column matched, and therefore holds the display
/// text), `link` (the concept URI) and the `Cat_*` hierarchy columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value; anything other than an object is rejected.
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

    /// Text of the column the recommendation matched in.
    pub fn display_name(&self) -> Option<&str> {
        let column = self.0.get("found_in_column")?.as_str()?;
        self.0.get(column)?.as_str()
    }

    pub fn link(&self) -> Option<&str> {
        self.0.get("link").and_then(Value::as_str)
    }

    /// Non-null hierarchy classes of this item, in `Cat_I..Cat_V` order.
    pub fn hierarchy_classes(&self) -> Vec<&str> {
        HIERARCHY_COLUMNS.iter().filter_map(|col| self.0.get(*col).and_then(Value::as_str)).collect()
    }
}

/// A categorized iconographic feature on one side of a coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub category: Category,
    pub item: Item,
}

impl Descriptor {
    pub fn new(category: Category, item: Item) -> Self {
        Self { category, item }
    }
}

/// Presentation role of a descriptor within its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Subject,
    Object,
    Relation,
}

/// A free-text keyword, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub negated: bool,
}

impl Keyword {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), negated: false }
    }
}

/// One side of a coin description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinSide {
    #[serde(rename = "coin", default)]
    pub descriptors: Vec<Descriptor>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

impl CoinSide {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty() && self.keywords.is_empty()
    }

    /// Roles of the descriptors, aligned with `descriptors`.
    ///
    /// ```text
    /// [person, verb, object, plant] -> [Subject, Relation, Object, Object]
    /// ```
    pub fn roles(&self) -> Vec<Role> {
        let mut seen_subject = false;
        self.descriptors
            .iter()
            .map(|d| {
                if d.category.is_verb() {
                    Role::Relation
                } else if seen_subject {
                    Role::Object
                } else {
                    seen_subject = true;
                    Role::Subject
                }
            })
            .collect()
    }
}

/// Which face of the coin an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Obverse,
    Reverse,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Obverse, Side::Reverse];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Obverse => "obverse",
            Side::Reverse => "reverse",
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obverse" | "front" => Ok(Side::Obverse),
            "reverse" | "back" => Ok(Side::Reverse),
            _ => Err(EngineError::UnknownSide(s.to_string())),
        }
    }
}

/// The in-progress description of a coin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinDraft {
    pub obverse: CoinSide,
    pub reverse: CoinSide,
}

impl CoinDraft {
    pub fn side(&self, side: Side) -> &CoinSide {
        match side {
            Side::Obverse => &self.obverse,
            Side::Reverse => &self.reverse,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut CoinSide {
        match side {
            Side::Obverse => &mut self.obverse,
            Side::Reverse => &mut self.reverse,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.obverse.is_empty() && self.reverse.is_empty()
    }
}

/// Permanent identity of a finalized coin, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoinId(u64);

impl CoinId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finalized coin. Only the sides are serialized; the id is engine-local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    #[serde(skip)]
    id: CoinId,
    obverse: CoinSide,
    reverse: CoinSide,
}

impl Coin {
    pub(crate) fn new(id: CoinId, draft: CoinDraft) -> Self {
        let CoinDraft { obverse, reverse } = draft;
        Self { id, obverse, reverse }
    }

    pub fn id(&self) -> CoinId {
        self.id
    }

    pub fn obverse(&self) -> &CoinSide {
        &self.obverse
    }

    pub fn reverse(&self) -> &CoinSide {
        &self.reverse
    }

    pub fn side(&self, side: Side) -> &CoinSide {
        match side {
            Side::Obverse => &self.obverse,
            Side::Reverse => &self.reverse,
        }
    }

    /// Copy of the sides, used to load the coin back into the draft for editing.
    pub fn to_draft(&self) -> CoinDraft {
        CoinDraft { obverse: self.obverse.clone(), reverse: self.reverse.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str) -> Item {
        Item::from_value(json!({ "name_en": name, "found_in_column": "name_en" })).unwrap()
    }

    #[test]
    fn category_parses_table_and_bare_names() {
        assert_eq!("list_obj".parse::<Category>().unwrap(), Category::Object);
        assert_eq!("object".parse::<Category>().unwrap(), Category::Object);
        assert_eq!("Verb".parse::<Category>().unwrap(), Category::Verb);
        assert!("list_coin".parse::<Category>().is_err());
        assert_eq!(Category::Object.label(), "obj");
    }

    #[test]
    fn roles_skip_verbs_when_picking_subject() {
        let side = CoinSide {
            descriptors: vec![
                Descriptor::new(Category::Verb, item("hold")),
                Descriptor::new(Category::Person, item("Artemis")),
                Descriptor::new(Category::Object, item("bow")),
            ],
            keywords: vec![],
        };
        assert_eq!(side.roles(), vec![Role::Relation, Role::Subject, Role::Object]);
    }

    #[test]
    fn item_display_name_follows_found_in_column() {
        let it = Item::from_value(json!({ "name": "Zeus", "name_german": "Zeus", "found_in_column": "name" })).unwrap();
        assert_eq!(it.display_name(), Some("Zeus"));
        assert_eq!(Item::default().display_name(), None);
    }

    #[test]
    fn hierarchy_classes_skip_nulls() {
        let it = Item::from_value(json!({ "Cat_I": "Deity", "Cat_II": null, "Cat_III": "Olympian" })).unwrap();
        assert_eq!(it.hierarchy_classes(), vec!["Deity", "Olympian"]);
    }

    #[test]
    fn coin_serializes_in_portable_form() {
        let mut draft = CoinDraft::default();
        draft.obverse.descriptors.push(Descriptor::new(Category::Person, item("Zeus")));
        draft.reverse.keywords.push(Keyword { text: "eagle".into(), negated: true });
        let coin = Coin::new(CoinId::from_raw(7), draft);

        let value = serde_json::to_value(&coin).unwrap();
        assert_eq!(value["obverse"]["coin"][0]["category"], "list_person");
        assert_eq!(value["reverse"]["keywords"][0], json!({ "text": "eagle", "negated": true }));
        assert!(value.get("id").is_none());
    }
}
