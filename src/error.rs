//! Failure taxonomy for calls to the scoring backend.

use serde::Deserialize;

/// The operation a request belonged to, used to pick the fallback
/// message shown when the backend gives no usable `detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Predict,
    ListStudents,
    Analytics,
    DatasetColumns,
    Health,
}

impl Operation {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Predict => "Error al realizar la predicción",
            Operation::ListStudents => "Error al obtener estudiantes",
            Operation::Analytics => "Error al obtener analíticas",
            Operation::DatasetColumns => "Error al obtener columnas del dataset",
            Operation::Health => "Error de conexión con el servidor",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be completed (connect, DNS, TLS, timeout).
    #[error("{}", .operation.fallback_message())]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    RequestFailed {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// A success status whose body does not match the contract.
    #[error("{}", .operation.fallback_message())]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayError::Transport { operation, .. }
            | GatewayError::RequestFailed { operation, .. }
            | GatewayError::Decode { operation, .. } => *operation,
        }
    }

    /// Build a `RequestFailed` from a non-success response body, using the
    /// backend's `detail` verbatim when present.
    pub fn from_error_body(operation: Operation, status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<String>,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| operation.fallback_message().to_string());

        GatewayError::RequestFailed {
            operation,
            status,
            message,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
