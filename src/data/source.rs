//! Loading card data.

use serde_json::json;

use super::record::{CardData, CardRecord};
use crate::core::DataError;

/// Read-only provider of card data.
pub trait CardDataSource {
    fn fetch(&self) -> Result<CardData, DataError>;
}

/// Parse card records.
///
/// Accepts a JSON array, or the older dump format of objects written back
/// to back with no separator. An empty body has no records.
pub fn parse_records(body: &str) -> Result<Vec<CardRecord>, DataError> {
    let body = body.trim();
    if body.starts_with('[') {
        return serde_json::from_str(body).map_err(|e| DataError::malformed(e.to_string()));
    }

    serde_json::Deserializer::from_str(body)
        .into_iter::<CardRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DataError::malformed(e.to_string()))
}

/// Card data held as JSON text.
///
/// `records` is the card list in either format [`parse_records`] accepts;
/// `meta` is an optional [`CardData`] document supplying positions, results
/// and image paths.
#[derive(Clone, Debug, Default)]
pub struct JsonCardSource {
    records: String,
    meta: Option<String>,
}

impl JsonCardSource {
    pub fn new(records: impl Into<String>) -> Self {
        Self {
            records: records.into(),
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

impl CardDataSource for JsonCardSource {
    fn fetch(&self) -> Result<CardData, DataError> {
        let mut data = match &self.meta {
            Some(meta) => serde_json::from_str::<CardData>(meta)
                .map_err(|e| DataError::malformed(format!("meta: {e}")))?,
            None => CardData::default(),
        };
        let records = parse_records(&self.records)?;
        if !records.is_empty() {
            data.cards = records;
        }
        tracing::debug!(cards = data.cards.len(), results = data.results.len(), "card data loaded");
        Ok(data)
    }
}

/// Status and JSON body answering a card list request.
///
/// Success is `200` with the records as an array; any failure is `500`
/// with `{"error": "..."}`.
pub fn respond_cards(result: Result<CardData, DataError>) -> (u16, String) {
    let error = |msg: String| (500, json!({ "error": msg }).to_string());

    match result {
        Ok(data) => match serde_json::to_string(&data.cards) {
            Ok(body) => (200, body),
            Err(e) => error(e.to_string()),
        },
        Err(err) => {
            tracing::warn!(error = %err, "card data request failed");
            error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{"id":"1","title":"The Magician","value":"I","reading":"Will"}{"id":"2","title":"The High Priestess","value":"II","reading":"Intuition"}"#;

    #[test]
    fn test_parse_concatenated_dump() {
        let records = parse_records(DUMP).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[1].title, "The High Priestess");
    }

    #[test]
    fn test_parse_array() {
        let records = parse_records(r#" [{"id": 5, "title": "The Hierophant"}] "#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "");
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(matches!(parse_records("{\"id\":"), Err(DataError::Malformed(_))));
        assert!(matches!(parse_records("[{\"id\":\"x\"}]"), Err(DataError::Malformed(_))));
    }

    #[test]
    fn test_source_merges_meta() {
        let source = JsonCardSource::new(DUMP)
            .with_meta(r#"{"card_path": "/cards/", "extension": "png", "positions": {"1": "You"}}"#);
        let data = source.fetch().unwrap();

        assert_eq!(data.cards.len(), 2);
        assert_eq!(data.position_text(1), Some("You"));
        assert_eq!(data.image_path(data.cards[0].card_id()), "/cards/1.png");
    }

    #[test]
    fn test_source_bad_meta() {
        let source = JsonCardSource::new("[]").with_meta("not json");
        assert!(matches!(source.fetch(), Err(DataError::Malformed(_))));
    }

    #[test]
    fn test_respond_cards() {
        let (status, body) = respond_cards(JsonCardSource::new(DUMP).fetch());
        assert_eq!(status, 200);
        let parsed: Vec<CardRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.len(), 2);

        let (status, body) = respond_cards(Err(DataError::unavailable("connection refused")));
        assert_eq!(status, 500);
        assert_eq!(body, r#"{"error":"card data unavailable: connection refused"}"#);
    }
}
