//! Request bodies for the index's `_search` and `_update_by_query` endpoints.

use crate::domain::{Model, Paging};
use crate::search::index::CarSearchTerms;
use crate::search::settings::TEXT_FIELDS;
use serde_json::{json, Value as JsonValue};

const ASSIGN_FIELD_SCRIPT: &str = "ctx._source[params.field] = params.value";

const ASSIGN_MODEL_SCRIPT: &str = "ctx._source.model = params.model; \
ctx._source.make = params.make; \
ctx._source.body_style = params.body_style; \
ctx._source.body_style_id = params.body_style_id; \
ctx._source.make_id = params.make_id";

/// Ranked match of one term against every flattened text field.
pub fn term_search(term: &str, paging: Paging) -> JsonValue {
    json!({
        "from": paging.offset,
        "size": paging.limit,
        "query": {
            "multi_match": {
                "query": term,
                "fields": TEXT_FIELDS
            }
        }
    })
}

/// Boolean "should" query with one clause per provided field.
///
/// Absent fields add no clause, so this broadens rather than filters.
pub fn fields_search(terms: &CarSearchTerms, paging: Paging) -> JsonValue {
    let mut should = Vec::new();
    if let Some(year) = terms.year {
        should.push(json!({ "match": { "year": year } }));
    }
    if let Some(body_style) = non_blank(&terms.body_style) {
        should.push(json!({ "match": { "body_style": body_style } }));
    }
    if let Some(color) = non_blank(&terms.color) {
        should.push(json!({ "match": { "color": color } }));
    }
    if let Some(make) = non_blank(&terms.make) {
        should.push(json!({ "match": { "make": make } }));
    }
    if let Some(model) = non_blank(&terms.model) {
        should.push(json!({ "match": { "model": model } }));
    }

    json!({
        "from": paging.offset,
        "size": paging.limit,
        "query": {
            "bool": { "should": should }
        }
    })
}

pub fn match_all(paging: Paging) -> JsonValue {
    json!({
        "from": paging.offset,
        "size": paging.limit,
        "query": { "match_all": {} }
    })
}

/// Sets `field` to `value` on every document whose `{field}_id` equals `id`.
pub fn field_update(field: &str, id: i64, value: &str) -> JsonValue {
    let mut term = serde_json::Map::new();
    term.insert(format!("{}_id", field), json!(id));
    json!({
        "query": { "term": term },
        "script": {
            "lang": "painless",
            "source": ASSIGN_FIELD_SCRIPT,
            "params": {
                "field": field,
                "value": value
            }
        }
    })
}

/// Rewrites the model-derived fields on every document of `model`.
pub fn model_update(model: &Model) -> JsonValue {
    json!({
        "query": {
            "term": { "model_id": model.id }
        },
        "script": {
            "lang": "painless",
            "source": ASSIGN_MODEL_SCRIPT,
            "params": {
                "model": model.name,
                "make": model.make.name,
                "body_style": model.body_style.name,
                "body_style_id": model.body_style.id,
                "make_id": model.make.id
            }
        }
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
