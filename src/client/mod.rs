//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod logger;

use std::error::Error as StdError;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::domain::{
    ApiError, ApiKey, Balance, BatchResult, Message, SendBatch, ValidationError,
};
use crate::transport::DecodeError;

pub use logger::{TracingXmlLogger, XmlLogger};

const DEFAULT_API_HOST: &str = "api.clockworksms.com";
const DEFAULT_USER_AGENT: &str = concat!("clockwork-sms-rust/", env!("CARGO_PKG_VERSION"));

const SMS_METHOD: &str = "sms";
const CREDIT_METHOD: &str = "credit";
const BALANCE_METHOD: &str = "balance";
const AUTHENTICATE_METHOD: &str = "authenticate";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_xml<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    /// Whether `https` URLs can be used with this transport.
    fn supports_tls(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpTransport for ReqwestTransport {
    fn post_xml<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "text/xml")
                .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`ClockworkClient`].
///
/// This error preserves:
/// - HTTP-level failures (non-2xx status or transport failures),
/// - API-level failures (top-level `ErrNo` in the response),
/// - validation/protocol failures.
pub enum ClockworkError {
    /// HTTP client / transport failure (DNS, TLS, proxy, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Clockwork rejected the whole request.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Response did not match the expected XML schema, or its entries could not be
    /// matched to the submitted messages.
    #[error("protocol error: {0}")]
    Protocol(#[source] Box<dyn StdError + Send + Sync>),

    /// The request document could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn map_decode_error(err: DecodeError) -> ClockworkError {
    match err {
        DecodeError::Api(api) => ClockworkError::Api(api),
        other => ClockworkError::Protocol(Box::new(other)),
    }
}

#[derive(Clone)]
/// Builder for [`ClockworkClient`].
///
/// Use this when you need to force SSL on or off, go through a proxy, or set a
/// timeout, user-agent, or XML logger.
pub struct ClockworkClientBuilder {
    api_key: ApiKey,
    ssl: Option<bool>,
    proxy: Option<(String, u16)>,
    api_host: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    logger: Option<Arc<dyn XmlLogger>>,
    pretty_log: bool,
}

impl ClockworkClientBuilder {
    /// Create a builder with the default host, automatic SSL, and no proxy or logger.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            ssl: None,
            proxy: None,
            api_host: DEFAULT_API_HOST.to_owned(),
            timeout: None,
            user_agent: None,
            logger: None,
            pretty_log: false,
        }
    }

    /// Force `https` (`true`) or `http` (`false`).
    ///
    /// When unset, `https` is used whenever the HTTP client supports it.
    pub fn ssl(mut self, ssl: bool) -> Self {
        self.ssl = Some(ssl);
        self
    }

    /// Send every request through an HTTP proxy at `host:port`.
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some((host.into(), port));
        self
    }

    /// Override the API host (default `api.clockworksms.com`).
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Log every request and response document through `logger`.
    pub fn logger(mut self, logger: impl XmlLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Indent logged XML. Documents that fail to parse are logged unchanged.
    pub fn pretty_log(mut self, pretty: bool) -> Self {
        self.pretty_log = pretty;
        self
    }

    /// Build a [`ClockworkClient`].
    pub fn build(self) -> Result<ClockworkClient, ClockworkError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some((host, port)) = self.proxy {
            let proxy = reqwest::Proxy::all(format!("http://{host}:{port}"))
                .map_err(|err| ClockworkError::Transport(Box::new(err)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|err| ClockworkError::Transport(Box::new(err)))?;

        Ok(ClockworkClient {
            api_key: self.api_key,
            ssl: self.ssl,
            api_host: self.api_host,
            http: Arc::new(ReqwestTransport {
                client,
                user_agent: self
                    .user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            }),
            logger: self.logger,
            pretty_log: self.pretty_log,
        })
    }
}

#[derive(Clone)]
/// High-level Clockwork client.
///
/// Each method builds the request document, POSTs it to
/// `{scheme}://api.clockworksms.com/xml/{method}` and decodes the reply. Calls are
/// independent; the client holds no state besides its configuration.
pub struct ClockworkClient {
    api_key: ApiKey,
    ssl: Option<bool>,
    api_host: String,
    http: Arc<dyn HttpTransport>,
    logger: Option<Arc<dyn XmlLogger>>,
    pretty_log: bool,
}

impl ClockworkClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`ClockworkClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            ssl: None,
            api_host: DEFAULT_API_HOST.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
                user_agent: DEFAULT_USER_AGENT.to_owned(),
            }),
            logger: None,
            pretty_log: false,
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> ClockworkClientBuilder {
        ClockworkClientBuilder::new(api_key)
    }

    /// Send a batch of messages.
    ///
    /// The result holds one entry per message, in batch order, each owning the message
    /// it reports on. Per-message failures are reported in the entries, not as `Err`.
    ///
    /// Errors:
    /// - [`ClockworkError::Transport`] / [`ClockworkError::HttpStatus`] for HTTP failures,
    /// - [`ClockworkError::Api`] when Clockwork rejects the whole request,
    /// - [`ClockworkError::Protocol`] when the response is malformed or cannot be matched
    ///   to the batch.
    pub async fn send(&self, batch: SendBatch) -> Result<BatchResult, ClockworkError> {
        let request = crate::transport::encode_send_sms_xml(&self.api_key, &batch)
            .map_err(|err| ClockworkError::Encode(Box::new(err)))?;
        let body = self.post(SMS_METHOD, request).await?;
        crate::transport::decode_send_sms_xml_response(batch, &body).map_err(map_decode_error)
    }

    /// Send messages, rejecting an empty list with [`ClockworkError::Validation`] before
    /// any network call.
    pub async fn send_messages(
        &self,
        messages: Vec<Message>,
    ) -> Result<BatchResult, ClockworkError> {
        let batch = SendBatch::new(messages)?;
        self.send(batch).await
    }

    /// Number of SMS credits left on the account.
    #[deprecated(note = "Clockwork bills in currency now; use `check_balance`")]
    pub async fn check_credit(&self) -> Result<i64, ClockworkError> {
        let request = crate::transport::encode_credit_xml(&self.api_key)
            .map_err(|err| ClockworkError::Encode(Box::new(err)))?;
        let body = self.post(CREDIT_METHOD, request).await?;
        crate::transport::decode_credit_xml_response(&body).map_err(map_decode_error)
    }

    /// Current account balance.
    pub async fn check_balance(&self) -> Result<Balance, ClockworkError> {
        let request = crate::transport::encode_balance_xml(&self.api_key)
            .map_err(|err| ClockworkError::Encode(Box::new(err)))?;
        let body = self.post(BALANCE_METHOD, request).await?;
        crate::transport::decode_balance_xml_response(&body).map_err(map_decode_error)
    }

    /// Whether the API key is valid.
    ///
    /// An unknown key is `Ok(false)`, not an error, unless Clockwork reports an `ErrNo`.
    pub async fn check_key(&self) -> Result<bool, ClockworkError> {
        let request = crate::transport::encode_authenticate_xml(&self.api_key)
            .map_err(|err| ClockworkError::Encode(Box::new(err)))?;
        let body = self.post(AUTHENTICATE_METHOD, request).await?;
        crate::transport::decode_authenticate_xml_response(&body).map_err(map_decode_error)
    }

    fn use_ssl(&self) -> bool {
        self.ssl.unwrap_or_else(|| self.http.supports_tls())
    }

    fn endpoint(&self, method: &str) -> Result<Url, ClockworkError> {
        let scheme = if self.use_ssl() { "https" } else { "http" };
        Url::parse(&format!("{scheme}://{}/xml/", self.api_host))
            .and_then(|base| base.join(method))
            .map_err(|err| ClockworkError::Transport(Box::new(err)))
    }

    async fn post(&self, method: &str, request: String) -> Result<String, ClockworkError> {
        let url = self.endpoint(method)?;
        self.log_xml(&format!("API {method} Request XML"), &request);

        tracing::debug!(method, url = %url, "posting request to Clockwork");
        let response = self
            .http
            .post_xml(url.as_str(), request)
            .await
            .map_err(ClockworkError::Transport)?;
        tracing::debug!(method, status = response.status, "received response from Clockwork");

        self.log_xml(&format!("API {method} Response XML"), &response.body);

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(ClockworkError::HttpStatus {
                status: response.status,
                body,
            });
        }

        Ok(response.body)
    }

    fn log_xml(&self, label: &str, xml: &str) {
        let Some(logger) = self.logger.as_ref() else {
            return;
        };
        let pretty = if self.pretty_log {
            crate::transport::pretty_print(xml)
        } else {
            None
        };
        let xml = pretty.as_deref().unwrap_or(xml);
        match panic::catch_unwind(AssertUnwindSafe(|| logger.log(label, xml))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(label, error = %err, "XML logger failed"),
            Err(_) => tracing::warn!(label, "XML logger panicked"),
        }
    }
}
