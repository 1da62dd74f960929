//! Elasticsearch implementation of [`CarIndex`] over its HTTP API.

use crate::domain::{Car, Model, PagedResponse, Paging};
use crate::infra::retry::{retry, Backoff};
use crate::search::document::CarDocument;
use crate::search::index::{
    check_document, check_propagated_field, CarIndex, CarSearchTerms, IndexError,
};
use crate::search::{query, settings};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    #[serde(default)]
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// ES 6 reports a bare number, ES 7+ an object with `value`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(i64),
    Object { value: i64 },
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: CarDocument,
}

#[derive(Deserialize)]
struct UpdateByQueryResponse {
    #[serde(default)]
    updated: u64,
    #[serde(default)]
    failures: Vec<JsonValue>,
}

impl EsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client and pings until the cluster answers or `backoff` is spent.
    pub async fn connect(
        base_url: &str,
        timeout: Duration,
        backoff: Backoff,
    ) -> Result<Self, IndexError> {
        let client = Self::new(base_url, timeout)?;
        retry("elasticsearch", backoff, |_| client.ping()).await?;
        tracing::info!(url = %client.base_url, "elasticsearch connected successfully");
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn index_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/{}", self.base_url, settings::INDEX)
        } else {
            format!("{}/{}/{}", self.base_url, settings::INDEX, path)
        }
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, IndexError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn search(&self, body: JsonValue) -> Result<PagedResponse<Car>, IndexError> {
        let resp = self
            .http
            .post(self.index_url("_search"))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp).await?;
        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;

        let total = match parsed.hits.total {
            Some(TotalHits::Count(n)) | Some(TotalHits::Object { value: n }) => n,
            None => 0,
        };
        let results = parsed
            .hits
            .hits
            .into_iter()
            .map(|h| h.source.into_car())
            .collect();
        Ok(PagedResponse { total, results })
    }

    async fn update_by_query(&self, body: JsonValue) -> Result<u64, IndexError> {
        let resp = self
            .http
            .post(self.index_url("_update_by_query"))
            .query(&[("conflicts", "proceed"), ("refresh", "true")])
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp).await?;
        let parsed: UpdateByQueryResponse = resp
            .json()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;
        if !parsed.failures.is_empty() {
            tracing::warn!(
                failures = parsed.failures.len(),
                updated = parsed.updated,
                "update by query reported per-document failures"
            );
        }
        Ok(parsed.updated)
    }
}

#[async_trait]
impl CarIndex for EsClient {
    async fn ping(&self) -> Result<(), IndexError> {
        let resp = self.http.get(&self.base_url).send().await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }

    async fn exists(&self) -> Result<bool, IndexError> {
        let resp = self.http.head(self.index_url("")).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else if status.is_success() {
            Ok(true)
        } else {
            Err(IndexError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    async fn init_index(&self) -> Result<(), IndexError> {
        if self.exists().await? {
            tracing::info!(index = settings::INDEX, "index already exists, skipping creation");
            return Ok(());
        }

        let resp = self
            .http
            .put(self.index_url(""))
            .json(&settings::create_index_body())
            .send()
            .await?;
        match Self::ensure_success(resp).await {
            Ok(_) => {
                tracing::info!(index = settings::INDEX, "created index");
                Ok(())
            }
            // Another instance created it between the existence check and now.
            Err(IndexError::Status { status: 400, body })
                if body.contains("resource_already_exists_exception") =>
            {
                tracing::info!(index = settings::INDEX, "index created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn index(&self, document: &CarDocument) -> Result<(), IndexError> {
        check_document(document)?;
        tracing::debug!(id = document.id, index = settings::INDEX, "indexing document");

        let resp = self
            .http
            .put(self.index_url(&format!("_doc/{}", document.id)))
            .query(&[("refresh", "wait_for")])
            .json(document)
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), IndexError> {
        let resp = self
            .http
            .delete(self.index_url(&format!("_doc/{}", id)))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "document already absent from index");
            return Ok(());
        }
        Self::ensure_success(resp).await?;
        Ok(())
    }

    async fn bulk_update_field(
        &self,
        id: i64,
        field: &str,
        value: &str,
    ) -> Result<u64, IndexError> {
        check_propagated_field(field)?;
        self.update_by_query(query::field_update(field, id, value)).await
    }

    async fn update_by_model_data(&self, model: &Model) -> Result<u64, IndexError> {
        self.update_by_query(query::model_update(model)).await
    }

    async fn search_cars_by_term(
        &self,
        term: &str,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.search(query::term_search(term, paging)).await
    }

    async fn search_cars(
        &self,
        terms: &CarSearchTerms,
        paging: Paging,
    ) -> Result<PagedResponse<Car>, IndexError> {
        self.search(query::fields_search(terms, paging)).await
    }

    async fn match_all(&self, paging: Paging) -> Result<PagedResponse<Car>, IndexError> {
        self.search(query::match_all(paging)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_scoped_to_the_cars_index() {
        let client = EsClient::new("http://localhost:9200/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");
        assert_eq!(client.index_url(""), "http://localhost:9200/cars");
        assert_eq!(client.index_url("_doc/3"), "http://localhost:9200/cars/_doc/3");
    }

    #[test]
    fn search_response_accepts_both_total_shapes() {
        let hit = serde_json::json!({
            "_source": {
                "id": 1, "year": 2020, "model": "civic", "color": "blue",
                "color_id": 3, "model_id": 2, "make": "honda",
                "body_style": "sedan", "make_id": 4, "body_style_id": 5
            }
        });
        let es7: SearchResponse = serde_json::from_value(serde_json::json!({
            "hits": { "total": { "value": 1, "relation": "eq" }, "hits": [hit.clone()] }
        }))
        .unwrap();
        assert!(matches!(es7.hits.total, Some(TotalHits::Object { value: 1 })));
        assert_eq!(es7.hits.hits.len(), 1);

        let es6: SearchResponse = serde_json::from_value(serde_json::json!({
            "hits": { "total": 1, "hits": [hit] }
        }))
        .unwrap();
        assert!(matches!(es6.hits.total, Some(TotalHits::Count(1))));
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected_before_any_request() {
        // Nothing listens on port 9; the field check must fail first.
        let client = EsClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let err = client.bulk_update_field(1, "year", "2020").await.unwrap_err();
        assert!(matches!(err, IndexError::UnknownField(_)));
    }
}
