use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_CONNECTION_ERRORS, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{
    AuthResponse, ChatId, ChatList, ChatRecord, ChatReply, ChatRequest, LoginRequest,
    RegisterRequest, User,
};

/// API base of the multi-tenant backend.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// API base of the single-tenant demo backend.
pub const DEFAULT_DEMO_API_URL: &str = "http://localhost:5000/api";

/// Client for the chat backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a new client against `base_url` (for example `http://localhost:5001/api`).
    ///
    /// No request timeout is set; requests inherit the transport's behavior.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with an optional request timeout.
    pub fn with_options(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The API base every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Scheme, host and port of the backend, as named in connectivity hints.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn default_headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::authentication(Some("Invalid token format".to_string())))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> Result<RequestBuilder> {
        Ok(self
            .client
            .request(method, url)
            .headers(self.default_headers(token)?))
    }

    /// Send the request and turn transport failures and non-success statuses into errors.
    async fn dispatch(&self, builder: RequestBuilder, method: &Method, url: &Url) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = builder.send().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
            CLIENT_CONNECTION_ERRORS.click();
            tracing::debug!(%method, path = url.path(), error = %e, "request failed");
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    self.timeout.map(|t| t.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Failed to fetch: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;

        let status = response.status();
        tracing::debug!(%method, path = url.path(), status = status.as_u16(), "response");
        if !status.is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorBody {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };
        let message = serde_json::from_str::<ErrorBody>(&error_body)
            .ok()
            .and_then(|body| body.error);

        match status_code {
            401 => Error::authentication(message),
            404 => Error::not_found(message, None),
            _ => Error::api(status_code, message),
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T> {
        let url = self.endpoint(path)?;
        let builder = self.request(Method::GET, url.clone(), token)?;
        let response = self.dispatch(builder, &Method::GET, &url).await?;
        Self::parse_json(response).await
    }

    async fn post<B, T>(&self, path: &str, token: Option<&str>, body: &B) -> Result<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let builder = self.request(Method::POST, url.clone(), token)?.json(body);
        let response = self.dispatch(builder, &Method::POST, &url).await?;
        Self::parse_json(response).await
    }
}

#[async_trait::async_trait]
impl Backend for ApiClient {
    fn location(&self) -> String {
        self.origin()
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.post("login", None, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.post("register", None, request).await
    }

    async fn send_chat(&self, token: Option<&str>, request: &ChatRequest) -> Result<ChatReply> {
        self.post("chat", token, request).await
    }

    async fn list_chats(&self, token: &str) -> Result<Vec<ChatRecord>> {
        let list: ChatList = self.get("chats", Some(token)).await?;
        Ok(list.chats)
    }

    async fn clear_chats(&self, token: &str) -> Result<()> {
        let url = self.endpoint("chats/clear")?;
        let builder = self.request(Method::POST, url.clone(), Some(token))?;
        let _ = self.dispatch(builder, &Method::POST, &url).await?;
        Ok(())
    }

    async fn delete_chat(&self, token: &str, id: &ChatId) -> Result<()> {
        let mut url = self.endpoint("chats")?;
        url.path_segments_mut()
            .map_err(|_| Error::url("API base cannot carry a path", None))?
            .push(id.as_str());
        let builder = self.request(Method::DELETE, url.clone(), Some(token))?;
        let _ = self.dispatch(builder, &Method::DELETE, &url).await?;
        Ok(())
    }

    async fn clear_history(&self) -> Result<()> {
        let url = self.endpoint("clear-history")?;
        let builder = self.request(Method::POST, url.clone(), None)?;
        let _ = self.dispatch(builder, &Method::POST, &url).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User> {
        #[derive(Deserialize)]
        struct UserBody {
            user: User,
        }

        let body: UserBody = self.get("user", Some(token)).await?;
        Ok(body.user)
    }

    async fn health(&self) -> Result<()> {
        let url = self.endpoint("health")?;
        let builder = self.request(Method::GET, url.clone(), None)?;
        let _ = self.dispatch(builder, &Method::GET, &url).await?;
        Ok(())
    }
}

/// Parse the API base and make sure relative joins append to its path.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{base_url} cannot be used as an API base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
