/// Maximum value the retry counter may take before an upload gives up.
pub const MAX_RETRY_LIMIT: u32 = 5;

/// Form field the file stream is attached under.
pub const DEFAULT_UPLOAD_FIELD: &str = "asset[upload]";

/// Configures timeout, retry and form behavior of an upload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UploadOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Highest retry counter value that still sends a request.
    pub max_retry_limit: u32,
    /// Base of the `sqrt(2)^retry * base` backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Multipart field name carrying the file content.
    pub upload_field: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_retry_limit: MAX_RETRY_LIMIT,
            retry_base_delay_ms: 100,
            upload_field: DEFAULT_UPLOAD_FIELD.to_owned(),
        }
    }
}
