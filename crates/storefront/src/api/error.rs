//! Error types for the backend REST client.
//!
//! Every failure is classified once, here, into an [`ErrorKind`]. Stores
//! branch on the kind and never inspect messages themselves.

use thiserror::Error;

/// Substrings (lowercased) that mark a response as a stock/availability problem.
pub const STOCK_KEYWORDS: &[&str] = &[
    "stock",
    "inventory",
    "existencia",
    "inventario",
    "agotado",
    "agotada",
];

/// "disponible" alone is too broad; it only counts after a "no hay".
const UNAVAILABLE_PREFIX: &str = "no hay";
const UNAVAILABLE_WORD: &str = "disponible";

/// Coarse classification of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend rejected the credentials (HTTP 401).
    SessionInvalid,
    /// A business rule the user must see, e.g. not enough stock.
    Business,
    /// Anything else: network failures, timeouts, 5xx, unexpected bodies.
    Transient,
}

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401.
    #[error("Session invalid: {message}")]
    SessionInvalid {
        /// Message from the response body, or the reason phrase.
        message: String,
    },

    /// The backend rejected the request for a stock/availability reason.
    #[error("{message}")]
    Business {
        /// HTTP status code.
        status: u16,
        /// Message to show to the user.
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the reason phrase.
        message: String,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build an error from a non-success status and its raw body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| default_message(status));

        if status == 401 {
            return Self::SessionInvalid { message };
        }
        if is_stock_message(&message) {
            return Self::Business { status, message };
        }
        Self::Status { status, message }
    }

    /// Classification used by the stores.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionInvalid { .. } => ErrorKind::SessionInvalid,
            Self::Business { .. } => ErrorKind::Business,
            Self::Status { .. } | Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => {
                ErrorKind::Transient
            }
        }
    }

    /// HTTP status, when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionInvalid { .. } => Some(401),
            Self::Business { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Whether this is a stock/availability error.
    #[must_use]
    pub fn is_business(&self) -> bool {
        self.kind() == ErrorKind::Business
    }

    /// Whether the session was rejected.
    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        self.kind() == ErrorKind::SessionInvalid
    }
}

/// Whether a message mentions stock or availability.
#[must_use]
pub fn is_stock_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    if STOCK_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        return true;
    }
    lower
        .find(UNAVAILABLE_PREFIX)
        .and_then(|at| lower.get(at..))
        .is_some_and(|rest| rest.contains(UNAVAILABLE_WORD))
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": "..."}`, `{"message": ["...", "..."]}` and
/// `{"error": "..."}`; a short plain-text body is used verbatim.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let field = value.get("message").or_else(|| value.get("error"))?;
        return match field {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Array(parts) => {
                let joined = parts
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        };
    }

    (!trimmed.starts_with('<')).then(|| trimmed.chars().take(200).collect())
}

fn default_message(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_is_session_invalid() {
        let err = ApiError::from_response(401, r#"{"message":"Unauthorized","statusCode":401}"#);
        assert_eq!(err.kind(), ErrorKind::SessionInvalid);
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_stock_message_is_business() {
        let err = ApiError::from_response(400, r#"{"message":"Insufficient stock for Cashmere scarf"}"#);
        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.to_string(), "Insufficient stock for Cashmere scarf");

        let err = ApiError::from_response(409, r#"{"message":["Producto agotado"]}"#);
        assert!(err.is_business());
    }

    #[test]
    fn test_other_status_is_transient() {
        let err = ApiError::from_response(500, r#"{"message":"Internal server error"}"#);
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.to_string(), "HTTP 500: Internal server error");
    }

    #[test]
    fn test_service_unavailable_is_not_business() {
        let err = ApiError::from_response(503, "");
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[test]
    fn test_message_array_joined() {
        let err = ApiError::from_response(400, r#"{"message":["quantity must be positive","productId required"]}"#);
        assert_eq!(
            err.to_string(),
            "HTTP 400: quantity must be positive; productId required"
        );
    }

    #[test]
    fn test_plain_text_and_html_bodies() {
        let err = ApiError::from_response(502, "upstream timed out");
        assert_eq!(err.to_string(), "HTTP 502: upstream timed out");

        let err = ApiError::from_response(502, "<html><body>Bad Gateway</body></html>");
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_error_field_fallback() {
        let err = ApiError::from_response(404, r#"{"error":"Not Found"}"#);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_stock_keyword_case_insensitive() {
        assert!(is_stock_message("OUT OF STOCK"));
        assert!(is_stock_message("Inventory exhausted"));
        assert!(!is_stock_message("Service Unavailable"));
        assert!(is_stock_message("No hay existencias suficientes"));
        assert!(is_stock_message("No hay unidades disponibles"));
        assert!(is_stock_message("Talla AGOTADA"));
        assert!(!is_stock_message("Servicio no disponible"));
        assert!(!is_stock_message("Disponible en 3 días; no hay envío hoy"));
    }
}
