//! Admin GraphQL API error types.
//!
//! - [`GraphqlError::Http`]: a non-2xx response
//! - [`GraphqlError::MaxRetries`]: 429/500 responses outlasted the retry budget
//! - [`GraphqlError::Query`]: HTTP 200 with a top-level `errors` array
//! - [`GraphqlError::Network`]: the request never got a response

use thiserror::Error;

/// Error type for Admin GraphQL API calls.
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// The API answered with a non-2xx status.
    #[error("Admin API request failed with status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, as received.
        body: String,
        /// Value of the `X-Request-Id` header, if any.
        error_reference: Option<String>,
    },

    /// Every attempt ended in a retryable status.
    #[error("Exceeded maximum retry count of {tries}. Last status: {status}")]
    MaxRetries {
        /// Status of the last attempt.
        status: u16,
        /// Attempts made.
        tries: u32,
    },

    /// The query was rejected. Shopify reports these with HTTP 200.
    #[error("GraphQL errors: {message}")]
    Query {
        /// The `errors` array, serialized.
        message: String,
    },

    /// Transport failure or an unreadable body.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GraphqlError {
    /// The HTTP status, when the API answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::MaxRetries { status, .. } => Some(*status),
            Self::Query { .. } | Self::Network(_) => None,
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_includes_status_and_body() {
        let error = GraphqlError::Http {
            status: 401,
            body: r#"{"errors":"[API] Invalid API key or access token"}"#.to_string(),
            error_reference: Some("req-1".to_string()),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid API key"));
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn test_max_retries_message() {
        let error = GraphqlError::MaxRetries {
            status: 429,
            tries: 3,
        };
        assert_eq!(
            error.to_string(),
            "Exceeded maximum retry count of 3. Last status: 429"
        );
    }

    #[test]
    fn test_query_error_has_no_status() {
        let error = GraphqlError::Query {
            message: "[]".to_string(),
        };
        assert!(error.status().is_none());
    }
}
