//! REST calls against the bookstore backend.

use std::time::Duration;

use async_trait::async_trait;
use bookstore_access::{ApiError, Credential, IdentitySource, Session};
use bookstore_api_models::{
    Book, BookInput, BookPatch, Credentials, OrderInfo, OrderRecord, OrderRequest, TokenResponse,
    UserProfile, UserUpdate, backend_message,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

/// Header carrying the per-invocation correlation id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin; API paths are joined onto it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Timeout applied when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Configuration with the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client bound to one backend and one session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
    request_id: String,
}

impl ApiClient {
    /// Build a client whose requests share a fresh request id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP stack cannot be initialised.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let mut default_headers = HeaderMap::new();
        let header = HeaderValue::from_str(&request_id)
            .map_err(|err| ApiError::transport(format!("invalid request id: {err}")))?;
        default_headers.insert(HEADER_REQUEST_ID, header);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| ApiError::transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
            request_id,
        })
    }

    /// Session whose credential is attached to requests.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Backend origin.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Correlation id sent with every request from this client.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure; bad credentials surface as
    /// [`ApiError::AuthRequired`] carrying the backend's message.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let path = "/api/auth/login/";
        let request = self.anonymous(Method::POST, path)?.json(credentials);
        self.json(request, path).await
    }

    /// Create an account and receive its first token.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure, e.g. a taken username.
    pub async fn register(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let path = "/api/auth/register/";
        let request = self.anonymous(Method::POST, path)?.json(credentials);
        self.json(request, path).await
    }

    /// Profile of the session's credential holder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthRequired`] for an absent or rejected credential.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get("/api/users/me/").await
    }

    /// Full catalog.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.get("/api/books/").await
    }

    /// Books whose title contains `title`; no match yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure other than "no match".
    pub async fn find_books_by_title(&self, title: &str) -> Result<Vec<Book>, ApiError> {
        let path = "/api/books/by-title/";
        let request = self
            .authorized(Method::GET, path)?
            .query(&[("title", title)]);
        match self.json(request, path).await {
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// One book.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get_book(&self, id: i64) -> Result<Book, ApiError> {
        self.get(&format!("/api/books/{id}/")).await
    }

    /// Add a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure, including field validation messages.
    pub async fn create_book(&self, book: &BookInput) -> Result<Book, ApiError> {
        self.send_body(Method::POST, "/api/books/", book).await
    }

    /// Replace every field of a book.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn replace_book(&self, id: i64, book: &BookInput) -> Result<Book, ApiError> {
        self.send_body(Method::PUT, &format!("/api/books/{id}/"), book)
            .await
    }

    /// Update the supplied fields of a book.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn patch_book(&self, id: i64, patch: &BookPatch) -> Result<Book, ApiError> {
        self.send_body(Method::PATCH, &format!("/api/books/{id}/"), patch)
            .await
    }

    /// Remove a book.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn delete_book(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/books/{id}/")).await
    }

    /// Orders visible to the caller: all of them for staff, own orders otherwise.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn list_orders(&self) -> Result<Vec<OrderInfo>, ApiError> {
        self.get("/api/orders/").await
    }

    /// Orders owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn my_orders(&self) -> Result<Vec<OrderInfo>, ApiError> {
        self.get("/api/orders/my/").await
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for someone else's order unless the caller is staff.
    pub async fn get_order(&self, id: i64) -> Result<OrderInfo, ApiError> {
        self.get(&format!("/api/orders/{id}/")).await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure, e.g. unknown book ids.
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderInfo, ApiError> {
        self.send_body(Method::POST, "/api/orders/", order).await
    }

    /// Replace the books of an order.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn update_order(
        &self,
        id: i64,
        order: &OrderRequest,
    ) -> Result<OrderRecord, ApiError> {
        self.send_body(Method::PUT, &format!("/api/orders/{id}/"), order)
            .await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn delete_order(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/orders/{id}/")).await
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-administrators.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.get("/api/users/").await
    }

    /// One account.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn get_user(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.get(&format!("/api/users/{id}/")).await
    }

    /// Change an account's username or role.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<UserProfile, ApiError> {
        self.send_body(Method::PATCH, &format!("/api/users/{id}/"), update)
            .await
    }

    /// Remove an account.
    ///
    /// # Errors
    ///
    /// Returns the classified backend failure.
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/users/{id}/")).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::transport(format!("invalid URL for {path}: {err}")))
    }

    fn anonymous(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let request = self.anonymous(method, path)?;
        Ok(match self.session.credential() {
            Some(credential) => request.header(AUTHORIZATION, credential.bearer()),
            None => request,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.authorized(Method::GET, path)?;
        self.json(request, path).await
    }

    async fn send_body<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(method, path)?.json(body);
        self.json(request, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, path)?;
        self.execute(request, path).await.map(drop)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(request, path).await?;
        response.json::<T>().await.map_err(|err| {
            tracing::warn!(path, error = %err, "unexpected response body");
            ApiError::transport(format!("invalid response from {path}: {err}"))
        })
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|err| {
            tracing::debug!(path, request_id = %self.request_id, error = %err, "request failed");
            ApiError::transport(format!("request to {path} failed: {err}"))
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_response(response).await)
        }
    }
}

#[async_trait]
impl IdentitySource for ApiClient {
    async fn who_am_i(&self, credential: &Credential) -> Result<UserProfile, ApiError> {
        let path = "/api/users/me/";
        let request = self
            .anonymous(Method::GET, path)?
            .header(AUTHORIZATION, credential.bearer());
        self.json(request, path).await
    }
}

/// Turn a non-success response into an [`ApiError`], keeping the backend's message.
pub async fn classify_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let message = backend_message(&body);
    tracing::debug!(
        status = status.as_u16(),
        message = message.as_deref().unwrap_or(""),
        "backend rejected request"
    );
    ApiError::from_status(status.as_u16(), message)
}
