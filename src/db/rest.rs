//! PostgREST implementation of [`TableStore`] (Supabase `rest/v1`).

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::DatabaseConfig;
use crate::db::error::{DbError, DbResult};
use crate::db::query::{Filter, SelectQuery};
use crate::db::store::{StoreFuture, TableStore};

const REST_PREFIX: &str = "rest/v1/";
const RETURN_REPRESENTATION: &str = "return=representation";

/// REST client for a PostgREST endpoint.
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: Url,
}

impl PostgrestStore {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &DatabaseConfig) -> DbResult<Self> {
        let mut base_url = Url::parse(&config.url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Self::build_client(config)?;
        Ok(Self { client, base_url })
    }

    /// Build an HTTP client that authenticates every call with the service key.
    fn build_client(config: &DatabaseConfig) -> DbResult<reqwest::Client> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| DbError::HttpClient(format!("invalid api key header: {e}")))?;
        headers.insert("apikey", api_key);

        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| DbError::HttpClient(format!("invalid authorization header: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DbError::HttpClient(e.to_string()))
    }

    fn table_url(&self, table: &str) -> DbResult<Url> {
        Ok(self.base_url.join(REST_PREFIX)?.join(table)?)
    }

    fn request(&self, method: Method, table: &str) -> DbResult<RequestBuilder> {
        let url = self.table_url(table)?;
        debug!(%method, %url, "database request");
        Ok(self.client.request(method, url))
    }

    /// Decode a response body, turning non-2xx statuses into [`DbError::Status`].
    async fn read_json(response: Response) -> DbResult<Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DbError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        _ => Vec::new(),
    }
}

impl TableStore for PostgrestStore {
    fn insert(&self, table: &str, row: Value) -> StoreFuture<'_, DbResult<Value>> {
        let table = table.to_string();
        Box::pin(async move {
            let response = self
                .request(Method::POST, &table)?
                .header("Prefer", RETURN_REPRESENTATION)
                .json(&row)
                .send()
                .await?;
            match Self::read_json(response).await? {
                Value::Array(rows) => rows
                    .into_iter()
                    .next()
                    .ok_or(DbError::EmptyInsert(table)),
                object @ Value::Object(_) => Ok(object),
                _ => Err(DbError::EmptyInsert(table)),
            }
        })
    }

    fn select(&self, table: &str, query: SelectQuery) -> StoreFuture<'_, DbResult<Vec<Value>>> {
        let table = table.to_string();
        Box::pin(async move {
            let response = self
                .request(Method::GET, &table)?
                .query(&query.to_query_pairs())
                .send()
                .await?;
            Ok(into_rows(Self::read_json(response).await?))
        })
    }

    fn update(
        &self,
        table: &str,
        patch: Value,
        filter: Filter,
    ) -> StoreFuture<'_, DbResult<Vec<Value>>> {
        let table = table.to_string();
        Box::pin(async move {
            let response = self
                .request(Method::PATCH, &table)?
                .header("Prefer", RETURN_REPRESENTATION)
                .query(&filter.to_query_pairs())
                .json(&patch)
                .send()
                .await?;
            Ok(into_rows(Self::read_json(response).await?))
        })
    }

    fn delete(&self, table: &str, filter: Filter) -> StoreFuture<'_, DbResult<()>> {
        let table = table.to_string();
        Box::pin(async move {
            debug!(%table, %filter, "database delete");
            let response = self
                .request(Method::DELETE, &table)?
                .query(&filter.to_query_pairs())
                .send()
                .await?;
            Self::read_json(response).await?;
            Ok(())
        })
    }
}
