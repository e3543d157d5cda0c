/// Application-wide constants
///
/// Environment variable names, defaults and limits used throughout the proxy.

// ============================================================================
// Environment Variables
// ============================================================================

/// Upstream credential, required for every chat request
pub const API_KEY_ENV: &str = "API_KEY";

/// Optional model override
pub const MODEL_ENV: &str = "GENAI_MODEL";

/// Optional upstream base URL override (useful for regional endpoints and tests)
pub const API_BASE_ENV: &str = "GENAI_API_BASE";

/// Overall upstream request timeout in seconds
pub const TIMEOUT_ENV: &str = "GENAI_TIMEOUT_SECS";

/// Listening port
pub const PORT_ENV: &str = "HOST_PORT";

// ============================================================================
// Defaults
// ============================================================================

/// Model used when no override is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini REST API base URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_PORT: u16 = 8080;

// ============================================================================
// Request Handling Limits
// ============================================================================

/// Maximum accepted request body (10MB)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Number of characters of an invalid payload that get logged
/// Keeps log lines bounded for oversized or hostile bodies
pub const PAYLOAD_SAMPLE_CHARS: usize = 200;

// ============================================================================
// Upstream Protocol
// ============================================================================

/// Header carrying the upstream credential
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Streaming method name appended to the model resource path
pub const STREAM_METHOD: &str = "streamGenerateContent";

/// Message used when the upstream rejects a call without a readable error
pub const UPSTREAM_CALL_FALLBACK_MESSAGE: &str = "Error calling streamGenerateContent";

/// Content type of a successful streamed chat response
pub const STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
