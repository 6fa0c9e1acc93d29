//! Shared HTTP plumbing for the resource services

use reqwest::{header, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::{GroupementService, PersonneService, TeamService, UserService};

/// Handle on the personnel backend
///
/// Cheap to clone; every service owns one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "{} cannot be used as a backend origin",
                config.base_url
            )));
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments against the backend origin
    ///
    /// Each segment is percent-encoded on its own, so a key never changes the route.
    /// Keys that no URL can carry (empty, `.` or `..`) are reported as not found.
    pub(crate) fn endpoint(
        &self,
        resource: &'static str,
        segments: &[&str],
    ) -> Result<Url, ApiError> {
        if let Some(key) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::NotFound {
                resource,
                key: key.to_string(),
            });
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn teams(&self) -> TeamService {
        TeamService::new(self.clone())
    }

    pub fn groupements(&self) -> GroupementService {
        GroupementService::new(self.clone())
    }

    pub fn personnes(&self) -> PersonneService {
        PersonneService::new(self.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.clone())
    }

    /// GET a JSON document; `key` marks a by-key lookup where 404 means not found
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        segments: &[&str],
        key: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self.execute::<()>(Method::GET, resource, segments, None).await?;
        let response = check(response, resource, key)?;
        decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &'static str,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::POST, resource, segments, Some(body)).await?;
        let response = check(response, resource, None)?;
        decode(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &'static str,
        segments: &[&str],
        key: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::PUT, resource, segments, Some(body)).await?;
        let response = check(response, resource, Some(key))?;
        decode(response).await
    }

    /// PUT/POST whose response body is not needed
    pub(crate) async fn send_json<B: Serialize>(
        &self,
        method: Method,
        resource: &'static str,
        segments: &[&str],
        key: Option<&str>,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self.execute(method, resource, segments, Some(body)).await?;
        check(response, resource, key)?;
        Ok(())
    }

    pub(crate) async fn delete(
        &self,
        resource: &'static str,
        segments: &[&str],
        key: &str,
    ) -> Result<(), ApiError> {
        let response = self.execute::<()>(Method::DELETE, resource, segments, None).await?;
        check(response, resource, Some(key))?;
        Ok(())
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        resource: &'static str,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(resource, segments)?;
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

fn check(response: Response, resource: &'static str, key: Option<&str>) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match key {
        Some(key) if status == StatusCode::NOT_FOUND => Err(ApiError::NotFound {
            resource,
            key: key.to_string(),
        }),
        _ => Err(ApiError::Status {
            resource,
            status: status.as_u16(),
        }),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Log a failed operation before handing the error back to the caller
pub(crate) fn report(context: String) -> impl FnOnce(ApiError) -> ApiError {
    move |err| {
        if err.is_not_found() {
            warn!("{}: {}", context, err);
        } else {
            error!("{}: {}", context, err);
        }
        err
    }
}
