use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;

use crate::{
    decode::decode_body,
    form::build_upload_form,
    request::PreparedRequest,
    Result, StatusClass, UploadConfig, UploadError, UploadOptions, UploadRequest,
    UploadResponse,
};

/// Backoff before retry number `retry`: `sqrt(2)^retry * base_ms` milliseconds.
///
/// Example: with the default 100 ms base, retry 1 waits ~141 ms, retry 2
/// 200 ms, retry 4 400 ms.
pub fn retry_delay(retry: u32, base_ms: u64) -> Duration {
    let exp = retry.min(64) as i32;
    let millis = std::f64::consts::SQRT_2.powi(exp) * base_ms as f64;
    Duration::try_from_secs_f64(millis / 1_000.0).unwrap_or(Duration::MAX)
}

#[derive(Clone)]
/// Uploads local files as multipart form data, retrying rate-limited and
/// failed-server responses.
pub struct UploadClient {
    http: reqwest::Client,
    config: UploadConfig,
    options: UploadOptions,
}

impl fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self
            .config
            .default_headers()
            .keys()
            .map(String::as_str)
            .collect();
        f.debug_struct("UploadClient")
            .field("default_headers", &header_names)
            .field("options", &self.options)
            .finish()
    }
}

impl UploadClient {
    /// Creates a client whose requests fall back to `config`'s headers.
    pub fn new(config: UploadConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            options: UploadOptions::default(),
        }
    }

    /// Applies options such as timeout, retry limit and backoff base.
    pub fn with_options(mut self, opts: UploadOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the underlying `reqwest` client, e.g. to share a pool or set
    /// a proxy.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Uploads `file_path` as the upload field of `request`'s form data.
    ///
    /// `retry` is the starting retry counter and defaults to 1. Responses are
    /// handled by status:
    /// - 200..=399 resolves with the response
    /// - 429 waits and retries with the counter unchanged
    /// - 500 and above waits and retries with the counter incremented
    /// - anything else fails with [`UploadError::Request`]
    ///
    /// Once the counter exceeds [`UploadOptions::max_retry_limit`] the upload
    /// fails with [`UploadError::RetryLimitExceeded`] without sending again.
    /// Transport errors are not retried.
    pub async fn upload(
        &self,
        request: &UploadRequest,
        file_path: impl AsRef<Path>,
        retry: Option<u32>,
    ) -> Result<UploadResponse> {
        let prepared = request.prepare(&self.config)?;
        let path = file_path.as_ref();
        let limit = self.options.max_retry_limit;
        let mut retry = retry.unwrap_or(1);

        loop {
            if retry > limit {
                #[cfg(feature = "tracing")]
                tracing::debug!("max retry limit exceeded for {}", prepared.target);
                return Err(UploadError::RetryLimitExceeded { retry, limit });
            }

            let response = self.send_once(&prepared, path).await?;

            match StatusClass::of(response.status) {
                StatusClass::Success => return Ok(response),
                StatusClass::RateLimited => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "rate limit exceeded for {}, body: {}",
                        prepared.target,
                        response.body
                    );
                    self.wait_before_retry(&prepared, retry).await;
                }
                StatusClass::ServerError => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "received {} from {}, body: {}",
                        response.status,
                        prepared.target,
                        response.body
                    );
                    self.wait_before_retry(&prepared, retry).await;
                    retry = match retry.checked_add(1) {
                        Some(next) => next,
                        None => return Err(UploadError::RetryLimitExceeded { retry, limit }),
                    };
                }
                StatusClass::Failed => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "{} {} failed with status {}",
                        prepared.method,
                        prepared.target,
                        response.status
                    );
                    return Err(UploadError::Request {
                        status: response.status,
                        body: response.body,
                    });
                }
            }
        }
    }

    async fn send_once(&self, prepared: &PreparedRequest, path: &Path) -> Result<UploadResponse> {
        let form =
            build_upload_form(&prepared.form_data, &self.options.upload_field, path).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!("{}: {}", prepared.method, prepared.target);

        let response = self
            .http
            .request(prepared.method.clone(), &prepared.target)
            .headers(prepared.headers.clone())
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::Transport)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(UploadError::Transport)?;

        Ok(UploadResponse {
            status,
            headers,
            body: decode_body(body, prepared.json),
        })
    }

    async fn wait_before_retry(&self, prepared: &PreparedRequest, retry: u32) {
        let delay = retry_delay(retry, self.options.retry_base_delay_ms);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying {} after {:?}", prepared.target, delay);
        #[cfg(not(feature = "tracing"))]
        let _ = prepared;

        sleep(delay).await;
    }
}
