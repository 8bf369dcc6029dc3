use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

/// Field name for the product title
pub const FIELD_TITLE: &str = "Title";
/// Field name for the displayed price
pub const FIELD_PRICE: &str = "Price";
/// Field name for the star rating text
pub const FIELD_REVIEWS: &str = "Reviews";

/// Fixed fields every record carries, in output order.
/// Specification tables can never overwrite them.
pub const CORE_FIELDS: [&str; 3] = [FIELD_TITLE, FIELD_PRICE, FIELD_REVIEWS];

/// Result of extracting one scalar field from a page
///
/// Every field extractor reports through this type, so a missing element is
/// always `Missing` regardless of which field it was. Serializes as the text
/// or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FieldValue {
    Present(String),
    #[default]
    Missing,
}

impl FieldValue {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Missing => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Text of the field, or `sentinel` when the element was absent
    pub fn unwrap_or_sentinel(self, sentinel: &str) -> String {
        match self {
            Self::Present(text) => text,
            Self::Missing => sentinel.to_string(),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

impl From<FieldValue> for Option<String> {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Present(text) => Some(text),
            FieldValue::Missing => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Present(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(text) => f.write_str(text),
            Self::Missing => f.write_str("null"),
        }
    }
}

/// One product detail page turned into field name / value pairs
///
/// Field order follows insertion: the core fields first, then specification
/// keys in the order the tables produced them.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    /// Detail page the record was extracted from
    pub source_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_fields")]
    fields: Vec<(String, FieldValue)>,
}

impl ProductRecord {
    pub fn new() -> Self {
        Self {
            source_url: None,
            scraped_at: Utc::now(),
            fields: Vec::new(),
        }
    }

    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Insert or replace a field, keeping the position of an existing key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Overlay specification table entries; later entries win, core fields are never touched
    pub fn merge_specifications<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in entries {
            if CORE_FIELDS.contains(&key.as_str()) {
                continue;
            }
            self.set(key, FieldValue::Present(value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text of a present field; `None` for missing or unknown keys
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_deref)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(FIELD_TITLE)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Plain map view, convenient for comparisons and for callers that do not care about order
    pub fn to_map(&self) -> BTreeMap<String, Option<String>> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.as_deref().map(str::to_string)))
            .collect()
    }
}

impl Default for ProductRecord {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_fields<S>(fields: &[(String, FieldValue)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (key, value) in fields {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_position_of_existing_key() {
        let mut record = ProductRecord::new();
        record.set(FIELD_TITLE, "Widget");
        record.set("Brand", "Acme");
        record.set(FIELD_TITLE, "Widget X");

        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec![FIELD_TITLE, "Brand"]);
        assert_eq!(record.title(), Some("Widget X"));
    }

    #[test]
    fn test_merge_never_overwrites_core_fields() {
        let mut record = ProductRecord::new();
        record.set(FIELD_TITLE, "Widget X");
        record.set(FIELD_REVIEWS, FieldValue::Missing);

        record.merge_specifications(vec![
            ("Title".to_string(), "From table".to_string()),
            ("Reviews".to_string(), "5 stars".to_string()),
            ("Colour".to_string(), "Black".to_string()),
        ]);

        assert_eq!(record.title(), Some("Widget X"));
        assert_eq!(record.get(FIELD_REVIEWS), Some(&FieldValue::Missing));
        assert_eq!(record.text("Colour"), Some("Black"));
    }

    #[test]
    fn test_record_serializes_missing_as_null() {
        let mut record = ProductRecord::new().with_source("https://www.amazon.in/dp/B0TEST");
        record.set(FIELD_TITLE, "Widget X");
        record.set(FIELD_PRICE, "499");
        record.set(FIELD_REVIEWS, FieldValue::Missing);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fields"]["Title"], "Widget X");
        assert_eq!(json["fields"]["Price"], "499");
        assert!(json["fields"]["Reviews"].is_null());
        assert_eq!(json["source_url"], "https://www.amazon.in/dp/B0TEST");
    }

    #[test]
    fn test_field_value_sentinel() {
        assert_eq!(FieldValue::Missing.unwrap_or_sentinel("none"), "none");
        assert_eq!(FieldValue::from("x").unwrap_or_sentinel("none"), "x");
        assert_eq!(FieldValue::from(None::<String>), FieldValue::Missing);
    }
}
