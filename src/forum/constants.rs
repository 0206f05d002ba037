//! Shared constants for the forum client.

// =============================================================================
// Backend
// =============================================================================

/// Default base URL of the forum backend API.
pub const DEFAULT_API_URL: &str = "http://localhost:8888/api";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "AGORA_API_URL";
