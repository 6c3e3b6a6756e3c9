//! Card records and the reading data around them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::CardId;

/// Accept `7` as well as `"7"`; database dumps quote every column.
fn deserialize_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Text columns may be null or numeric in older dumps.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// One card's display text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u32,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub value: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub reading: String,
}

impl CardRecord {
    #[must_use]
    pub fn card_id(&self) -> CardId {
        CardId::new(self.id)
    }
}

/// An interpretation, matched by arbitrary keys such as `position_id` and
/// `card_id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingResult {
    #[serde(flatten)]
    pub keys: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub content: String,
}

impl ReadingResult {
    /// Does `key` hold `expected`? Numbers and strings compare by text.
    fn matches(&self, key: &str, expected: &str) -> bool {
        match self.keys.get(key) {
            Some(serde_json::Value::String(s)) => s == expected,
            Some(serde_json::Value::Number(n)) => n.to_string() == expected,
            Some(serde_json::Value::Bool(b)) => b.to_string() == expected,
            _ => false,
        }
    }
}

/// Everything a reading needs besides the deck itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardData {
    pub cards: Vec<CardRecord>,
    /// Reading position texts by position id.
    pub positions: BTreeMap<u32, String>,
    pub results: Vec<ReadingResult>,
    pub card_path: String,
    pub extension: String,
}

impl CardData {
    /// Generic data for `count` cards, used when no source is reachable.
    #[must_use]
    pub fn placeholder(count: usize) -> Self {
        let cards = (1..=count as u32)
            .map(|id| CardRecord {
                id,
                title: format!("Card {id}"),
                value: String::new(),
                reading: String::new(),
            })
            .collect();
        Self {
            cards,
            extension: "png".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardRecord> {
        self.cards.iter().find(|record| record.id == id.raw())
    }

    /// Text of a reading position. Unknown ids fall back to position 1.
    #[must_use]
    pub fn position_text(&self, position: u32) -> Option<&str> {
        self.positions
            .get(&position)
            .or_else(|| self.positions.get(&1))
            .map(String::as_str)
    }

    /// Content of the first result whose keys match every filter.
    #[must_use]
    pub fn find_result(&self, filters: &[(&str, &str)]) -> Option<&str> {
        self.results
            .iter()
            .find(|result| filters.iter().all(|(key, value)| result.matches(key, value)))
            .map(|result| result.content.as_str())
    }

    /// Image path of a card face: `<card_path><id>.<extension>`.
    #[must_use]
    pub fn image_path(&self, id: CardId) -> String {
        format!("{}{}.{}", self.card_path, id.raw(), self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> CardData {
        serde_json::from_value(json!({
            "cards": [{ "id": "3", "title": "The Empress", "value": 3, "reading": null }],
            "positions": { "1": "Past", "2": "Present" },
            "results": [
                { "position_id": "1", "card_id": 3, "content": "A fertile past." },
                { "position_id": 2, "card_id": "3", "content": "Abundance now." }
            ],
            "card_path": "/img/tarot/",
            "extension": "jpg"
        }))
        .unwrap()
    }

    #[test]
    fn test_lenient_record_columns() {
        let data = data();
        let record = data.card(CardId::new(3)).unwrap();
        assert_eq!(record.title, "The Empress");
        assert_eq!(record.value, "3");
        assert_eq!(record.reading, "");
    }

    #[test]
    fn test_find_result_compares_loosely() {
        let data = data();
        assert_eq!(
            data.find_result(&[("position_id", "2"), ("card_id", "3")]),
            Some("Abundance now.")
        );
        assert_eq!(data.find_result(&[("position_id", "1")]), Some("A fertile past."));
        assert_eq!(data.find_result(&[("position_id", "9")]), None);
        assert_eq!(data.find_result(&[("missing", "1")]), None);
    }

    #[test]
    fn test_position_text_falls_back_to_first() {
        let data = data();
        assert_eq!(data.position_text(2), Some("Present"));
        assert_eq!(data.position_text(7), Some("Past"));
    }

    #[test]
    fn test_image_path() {
        assert_eq!(data().image_path(CardId::new(12)), "/img/tarot/12.jpg");
    }

    #[test]
    fn test_placeholder() {
        let data = CardData::placeholder(22);
        assert_eq!(data.cards.len(), 22);
        assert_eq!(data.card(CardId::new(22)).unwrap().title, "Card 22");
        assert!(data.find_result(&[("card_id", "1")]).is_none());
    }
}
