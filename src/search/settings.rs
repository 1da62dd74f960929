//! Index name, analyzer settings and mappings for the `cars` index.

use serde_json::{json, Value as JsonValue};

pub const INDEX: &str = "cars";

/// Flattened text fields searched by term and field queries.
pub const TEXT_FIELDS: [&str; 5] = ["year", "make", "model", "color", "body_style"];

pub const ID_FIELDS: [&str; 4] = ["model_id", "color_id", "make_id", "body_style_id"];

pub const EDGE_NGRAM_MIN: u32 = 1;
pub const EDGE_NGRAM_MAX: u32 = 20;

/// Edge n-grams are produced at index time only; queries are just lowercased so
/// a prefix like `hond` matches `honda` without `toyota` matching everything
/// starting with `t`.
pub fn index_settings() -> JsonValue {
    json!({
        "number_of_shards": 1,
        "analysis": {
            "filter": {
                "car_filter": {
                    "type": "edge_ngram",
                    "min_gram": EDGE_NGRAM_MIN,
                    "max_gram": EDGE_NGRAM_MAX
                }
            },
            "analyzer": {
                "car_analyzer": {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["lowercase", "car_filter"]
                },
                "car_search_analyzer": {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["lowercase"]
                }
            }
        }
    })
}

pub fn index_mappings() -> JsonValue {
    let mut properties = serde_json::Map::new();
    properties.insert("id".to_string(), json!({ "type": "long" }));
    for field in TEXT_FIELDS {
        properties.insert(
            field.to_string(),
            json!({
                "type": "text",
                "analyzer": "car_analyzer",
                "search_analyzer": "car_search_analyzer"
            }),
        );
    }
    for field in ID_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "long" }));
    }
    json!({ "properties": properties })
}

/// Request body for `PUT /cars`.
pub fn create_index_body() -> JsonValue {
    json!({
        "settings": index_settings(),
        "mappings": index_mappings()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_text_field_uses_the_car_analyzer() {
        let mappings = index_mappings();
        for field in TEXT_FIELDS {
            assert_eq!(mappings["properties"][field]["analyzer"], "car_analyzer");
            assert_eq!(mappings["properties"][field]["search_analyzer"], "car_search_analyzer");
        }
        for field in ID_FIELDS {
            assert_eq!(mappings["properties"][field]["type"], "long");
        }
    }

    #[test]
    fn analyzer_lowercases_then_edge_ngrams() {
        let settings = index_settings();
        assert_eq!(
            settings["analysis"]["analyzer"]["car_analyzer"]["filter"],
            json!(["lowercase", "car_filter"])
        );
        assert_eq!(settings["analysis"]["filter"]["car_filter"]["type"], "edge_ngram");
        assert_eq!(settings["analysis"]["filter"]["car_filter"]["max_gram"], 20);
    }
}
