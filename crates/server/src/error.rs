use hyper::StatusCode;
use thiserror::Error;

/// Failure exchanging an authorization code (or short-lived token) for an
/// access token at a provider's token endpoint.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Timeout after {0:?} while exchanging authorization grant")]
    Timeout(std::time::Duration),
    #[error("HTTP {status} from token endpoint: {context}")]
    Http { status: StatusCode, context: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),
}

/// Failure fetching or validating profile data with an access token.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Provider profile contains no email address")]
    MissingEmail,
    #[error("Token verification failed: {0}")]
    Verification(String),
    #[error("Timeout after {0:?} while fetching profile")]
    Timeout(std::time::Duration),
    #[error("HTTP {status} from profile endpoint: {context}")]
    Http { status: StatusCode, context: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),
}

/// Failure revoking a token upstream. Advisory only: logout proceeds
/// regardless, so this never crosses the request boundary as a fault.
#[derive(Debug, Error)]
pub enum RevokeError {
    #[error("Timeout after {0:?} while revoking token")]
    Timeout(std::time::Duration),
    #[error("HTTP {status} from revocation endpoint: {context}")]
    Http { status: StatusCode, context: String },
    #[error("Network error: {0}")]
    Network(String),
}

/// The login/logout flow taxonomy surfaced to the request layer.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("Invalid state parameter")]
    InvalidState,
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("Current user is already connected")]
    AlreadyConnected,
    #[error("Current user is not connected")]
    NotConnected,
    #[error("Identity store error: {0}")]
    Store(#[from] sea_orm::DbErr),
}

impl AuthFlowError {
    /// Informational outcomes short-circuit the flow but are not faults.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            AuthFlowError::AlreadyConnected | AuthFlowError::NotConnected
        )
    }
}
