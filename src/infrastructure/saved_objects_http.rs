// Saved objects HTTP store implementation
use crate::application::object_store::{FindQuery, FindResponse, ObjectStore, StoreError, StoreResult, DEFAULT_SPACE};
use crate::domain::saved_object::SavedObject;
use crate::infrastructure::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct SavedObjectsHttpStore {
    host: String,
    client: reqwest::Client,
}

impl SavedObjectsHttpStore {
    pub fn new(host: String, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("kbn-xsrf", HeaderValue::from_static("true"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=UTF-8"));
        let mut auth = HeaderValue::from_str(&format!("ApiKey {}", api_key))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        Self::new(config.host.clone(), &config.api_key)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}/{}", self.host, path))
    }

    async fn execute(&self, request: RequestBuilder, kind: &str, id: &str) -> StoreResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("saved object request for {} {} failed with {}", kind, id, status);
            return Err(error_for_status(status, body, kind, id));
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, kind: &str, id: &str) -> StoreResult<T> {
        let body = self.execute(request, kind, id).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Path prefix of the API for `space`; the default space has none.
pub fn api_namespace(space: Option<&str>) -> String {
    match space {
        None => "api".to_string(),
        Some(s) if s.is_empty() || s == DEFAULT_SPACE => "api".to_string(),
        Some(s) => format!("s/{}/api", urlencoding::encode(s)),
    }
}

pub fn object_path(space: Option<&str>, kind: &str, id: Option<&str>) -> String {
    let base = format!("{}/saved_objects/{}", api_namespace(space), urlencoding::encode(kind));
    match id {
        Some(id) => format!("{}/{}", base, urlencoding::encode(id)),
        None => base,
    }
}

pub fn find_params(query: &FindQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("per_page", query.per_page.to_string()),
        ("page", query.page.to_string()),
    ];
    if let Some(kind) = &query.kind {
        params.push(("type", kind.clone()));
    }
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }
    for field in &query.search_fields {
        params.push(("search_fields", field.clone()));
    }
    if let Some(sort_field) = &query.sort_field {
        params.push(("sort_field", sort_field.clone()));
    }
    params
}

fn error_for_status(status: StatusCode, body: String, kind: &str, id: &str) -> StoreError {
    match status {
        StatusCode::BAD_REQUEST => StoreError::BadRequest(body),
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized(body),
        StatusCode::FORBIDDEN => StoreError::Forbidden(body),
        StatusCode::NOT_FOUND => StoreError::not_found(kind, id),
        StatusCode::CONFLICT => StoreError::Conflict(body),
        StatusCode::TOO_MANY_REQUESTS => StoreError::TooManyRequests(body),
        other => StoreError::Api {
            status: other.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl ObjectStore for SavedObjectsHttpStore {
    async fn get(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<SavedObject> {
        let request = self.request(Method::GET, &object_path(space, kind, Some(id)));
        self.send(request, kind, id).await
    }

    async fn create(&self, space: Option<&str>, object: &SavedObject, overwrite: bool) -> StoreResult<SavedObject> {
        let mut body = json!({
            "attributes": object.attributes,
            "references": object.references,
        });
        if let Some(namespaces) = object.extra.get("initialNamespaces") {
            body["initialNamespaces"] = namespaces.clone();
        }

        let path = object_path(space, &object.kind, object.id.as_deref());
        let request = self
            .request(Method::POST, &path)
            .query(&[("overwrite", overwrite)])
            .json(&body);

        tracing::info!("creating {} {:?}", object.kind, object.id);
        self.send(request, &object.kind, object.id.as_deref().unwrap_or_default()).await
    }

    async fn update(&self, space: Option<&str>, object: &SavedObject) -> StoreResult<SavedObject> {
        let id = object
            .id
            .as_deref()
            .ok_or_else(|| StoreError::InvalidArgument(format!("{} object has no id", object.kind)))?;

        let body = json!({
            "attributes": object.attributes,
            "references": object.references,
        });
        let request = self
            .request(Method::PUT, &object_path(space, &object.kind, Some(id)))
            .json(&body);

        tracing::info!("updating {} {}", object.kind, id);
        let mut updated: SavedObject = self.send(request, &object.kind, id).await?;
        // update responses omit references that were not changed
        if updated.references.is_empty() {
            updated.references = object.references.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<()> {
        let request = self.request(Method::DELETE, &object_path(space, kind, Some(id)));
        tracing::info!("deleting {} {}", kind, id);
        self.execute(request, kind, id).await?;
        Ok(())
    }

    async fn find(&self, space: Option<&str>, query: &FindQuery) -> StoreResult<FindResponse> {
        let path = format!("{}/saved_objects/_find", api_namespace(space));
        let request = self.request(Method::GET, &path).query(&find_params(query));
        self.send(request, query.kind.as_deref().unwrap_or("saved object"), "_find")
            .await
    }
}
