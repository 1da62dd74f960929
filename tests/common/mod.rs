//! In-memory stand-ins for the search index and the relation query.
#![allow(dead_code)]

use async_trait::async_trait;
use car_catalog::domain::{Car, CarModel, LookupEntity, Model, PagedResponse, Paging};
use car_catalog::search::index::{check_document, check_propagated_field};
use car_catalog::search::settings::EDGE_NGRAM_MAX;
use car_catalog::search::{CarDocument, CarIndex, CarSearchTerms, IndexError};
use car_catalog::storage::StoreError;
use car_catalog::sync::{ModelRelations, RelationLookup};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Index that keeps documents in a map and mimics the edge n-gram analyzer:
/// a query token matches when it is a prefix of a stored token.
#[derive(Default)]
pub struct InMemoryIndex {
    docs: Mutex<BTreeMap<i64, CarDocument>>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs(docs: Vec<CarDocument>) -> Self {
        let index = Self::new();
        {
            let mut map = index.docs.lock().unwrap();
            for doc in docs {
                map.insert(doc.id, doc);
            }
        }
        index
    }

    pub fn get(&self, id: i64) -> Option<CarDocument> {
        self.docs.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn page(&self, paging: Paging, filter: impl Fn(&CarDocument) -> bool) -> PagedResponse<Car> {
        let docs = self.docs.lock().unwrap();
        let matched: Vec<&CarDocument> = docs.values().filter(|d| filter(d)).collect();
        let total = matched.len() as i64;
        let results = matched
            .into_iter()
            .skip(paging.offset.max(0) as usize)
            .take(paging.limit.max(0) as usize)
            .map(|d| d.clone().into_car())
            .collect();
        PagedResponse { total, results }
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Edge n-gram match: some query token is a prefix of some field token.
fn field_matches(field: &str, query: &str) -> bool {
    let stored = tokens(field);
    tokens(query).iter().any(|q| {
        q.chars().count() <= EDGE_NGRAM_MAX as usize && stored.iter().any(|s| s.starts_with(q.as_str()))
    })
}

fn field_value(doc: &CarDocument, field: &str) -> String {
    match field {
        "year" => doc.year.to_string(),
        "make" => doc.make.clone(),
        "model" => doc.model.clone(),
        "color" => doc.color.clone(),
        _ => doc.body_style.clone(),
    }
}

fn text_fields(doc: &CarDocument) -> [String; 5] {
    [
        doc.year.to_string(),
        doc.make.clone(),
        doc.model.clone(),
        doc.color.clone(),
        doc.body_style.clone(),
    ]
}

#[async_trait]
impl CarIndex for InMemoryIndex {
    async fn ping(&self) -> Result<(), IndexError> {
        self.record("ping");
        Ok(())
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        self.record("exists");
        Ok(true)
    }

    async fn init_index(&self) -> Result<(), IndexError> {
        self.record("init_index");
        Ok(())
    }

    async fn index(&self, document: &CarDocument) -> Result<(), IndexError> {
        self.record("index");
        check_document(document)?;
        self.docs
            .lock()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), IndexError> {
        self.record("delete");
        self.docs.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn bulk_update_field(&self, id: i64, field: &str, value: &str) -> Result<u64, IndexError> {
        self.record("bulk_update_field");
        check_propagated_field(field)?;
        let mut updated = 0;
        for doc in self.docs.lock().unwrap().values_mut() {
            let (target, target_id) = match field {
                "make" => (&mut doc.make, doc.make_id),
                "color" => (&mut doc.color, doc.color_id),
                "body_style" => (&mut doc.body_style, doc.body_style_id),
                _ => (&mut doc.model, doc.model_id),
            };
            if target_id == id {
                *target = value.to_string();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn update_by_model_data(&self, model: &Model) -> Result<u64, IndexError> {
        self.record("update_by_model_data");
        let mut updated = 0;
        for doc in self.docs.lock().unwrap().values_mut() {
            if doc.model_id == model.id {
                doc.model = model.name.clone();
                doc.make = model.make.name.clone();
                doc.make_id = model.make.id;
                doc.body_style = model.body_style.name.clone();
                doc.body_style_id = model.body_style.id;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn search_cars_by_term(
        &self,
        term: &str,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.record("search_cars_by_term");
        Ok(self.page(paging, |doc| {
            text_fields(doc).iter().any(|f| field_matches(f, term))
        }))
    }

    async fn search_cars(
        &self,
        terms: &CarSearchTerms,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.record("search_cars");
        let mut clauses: Vec<(&str, String)> = Vec::new();
        if let Some(year) = terms.year {
            clauses.push(("year", year.to_string()));
        }
        for (field, value) in [
            ("body_style", &terms.body_style),
            ("color", &terms.color),
            ("make", &terms.make),
            ("model", &terms.model),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                clauses.push((field, v.to_string()));
            }
        }

        Ok(self.page(paging, |doc| {
            clauses.is_empty()
                || clauses
                    .iter()
                    .any(|(field, v)| field_matches(&field_value(doc, field), v))
        }))
    }

    async fn match_all(&self, paging: Paging) -> Result<PagedResponse<Car>, IndexError> {
        self.record("match_all");
        Ok(self.page(paging, |_| true))
    }
}

/// Index whose every call fails as if the cluster were down.
#[derive(Default)]
pub struct FailingIndex {
    pub attempts: AtomicUsize,
}

impl FailingIndex {
    fn fail<T>(&self) -> Result<T, IndexError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(IndexError::Status {
            status: 503,
            body: "cluster unavailable".to_string(),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CarIndex for FailingIndex {
    async fn ping(&self) -> Result<(), IndexError> {
        self.fail()
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        self.fail()
    }

    async fn init_index(&self) -> Result<(), IndexError> {
        self.fail()
    }

    async fn index(&self, _document: &CarDocument) -> Result<(), IndexError> {
        self.fail()
    }

    async fn delete(&self, _id: i64) -> Result<(), IndexError> {
        self.fail()
    }

    async fn bulk_update_field(&self, _id: i64, _field: &str, _value: &str) -> Result<u64, IndexError> {
        self.fail()
    }

    async fn update_by_model_data(&self, _model: &Model) -> Result<u64, IndexError> {
        self.fail()
    }

    async fn search_cars_by_term(
        &self,
        _term: &str,
        _paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.fail()
    }

    async fn search_cars(
        &self,
        _terms: &CarSearchTerms,
        _paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.fail()
    }

    async fn match_all(&self, _paging: Paging) -> Result<PagedResponse<Car>, IndexError> {
        self.fail()
    }
}

/// Relation query backed by a fixed map of model id to make/body style.
#[derive(Default)]
pub struct StaticLookup {
    relations: HashMap<i64, ModelRelations>,
    pub queries: AtomicUsize,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model_id: i64, relations: ModelRelations) -> Self {
        self.relations.insert(model_id, relations);
        self
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationLookup for StaticLookup {
    async fn model_relations(&self, model_id: i64) -> Result<Option<ModelRelations>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.relations.get(&model_id).cloned())
    }
}

// --- fixtures ---

pub fn lookup(id: i64, name: &str) -> LookupEntity {
    LookupEntity {
        id,
        name: name.to_string(),
    }
}

pub fn honda_sedan() -> ModelRelations {
    ModelRelations {
        make: "honda".to_string(),
        body_style: "sedan".to_string(),
        make_id: 1,
        body_style_id: 1,
    }
}

/// A car as the service hands it to the hooks right after insert.
pub fn shallow_car(id: i64, year: i32, model: (i64, &str), color: (i64, &str)) -> Car {
    Car {
        id,
        year,
        model: CarModel {
            id: model.0,
            name: model.1.to_string(),
            make: None,
            body_style: None,
        },
        color: lookup(color.0, color.1),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn document(
    id: i64,
    year: i32,
    (model_id, model): (i64, &str),
    (make_id, make): (i64, &str),
    (body_style_id, body_style): (i64, &str),
    (color_id, color): (i64, &str),
) -> CarDocument {
    CarDocument {
        id,
        year,
        model: model.to_string(),
        color: color.to_string(),
        color_id,
        model_id,
        make: make.to_string(),
        body_style: body_style.to_string(),
        make_id,
        body_style_id,
    }
}
