//! `asset-upload-http` uploads local files to an HTTP endpoint as multipart
//! form data.
//!
//! [`UploadClient::upload`] validates an [`UploadRequest`], streams the file
//! under the upload field, and retries:
//! - HTTP 429 after a backoff, without advancing the retry counter
//! - HTTP 5xx after a backoff, advancing the retry counter
//!
//! Backoff is `sqrt(2)^retry * 100` ms (see [`retry_delay`]). A counter past
//! [`MAX_RETRY_LIMIT`] ends the upload with [`UploadError::RetryLimitExceeded`].
//!
//! The `tracing` feature is on by default: retry decisions are the main thing
//! an operator needs to see when an upload stalls on rate limits. Disable
//! default features to drop the dependency.

mod client;
mod config;
mod decode;
mod error;
mod form;
mod options;
mod request;
mod types;

pub use client::{retry_delay, UploadClient};
pub use config::UploadConfig;
pub use error::UploadError;
pub use options::{UploadOptions, DEFAULT_UPLOAD_FIELD, MAX_RETRY_LIMIT};
pub use request::UploadRequest;
pub use types::{ResponseBody, StatusClass, UploadResponse};

pub type Result<T> = std::result::Result<T, UploadError>;
