#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Login error: {0}")]
    Auth(String),

    #[error("Register error: {0}")]
    Register(String),

    #[error("Received a non-JSON response from {base_url}, check the backend")]
    BackendUnreachable { base_url: String, detail: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Failed creating payment order: {0}")]
    OrderCreationFailed(String),

    #[error("Payment verification failed: {0}")]
    PaymentVerificationFailed(String),

    #[error("Booking failed: {0}")]
    BookingFailed(String),

    #[error("Stored session is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event is sold out: {0}")]
    SoldOut(String),

    #[error("Booking step not allowed while {0}")]
    InvalidState(&'static str),

    #[error("Checkout error: {0}")]
    Checkout(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The user-facing text for this failure. Variants that carry the
    /// server's raw error text return it untouched.
    pub fn message(&self) -> String {
        match self {
            ClientError::Auth(msg)
            | ClientError::Register(msg)
            | ClientError::OrderCreationFailed(msg)
            | ClientError::PaymentVerificationFailed(msg)
            | ClientError::BookingFailed(msg)
            | ClientError::Checkout(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keeps_raw_server_text() {
        let err = ClientError::BookingFailed("Sold out".to_string());
        assert_eq!(err.message(), "Sold out");
        assert_eq!(err.to_string(), "Booking failed: Sold out");
    }

    #[test]
    fn login_and_register_failures_are_labelled_apart() {
        assert_eq!(
            ClientError::Auth("Invalid credentials".to_string()).to_string(),
            "Login error: Invalid credentials"
        );
        let err = ClientError::Register("Email taken".to_string());
        assert_eq!(err.to_string(), "Register error: Email taken");
        assert_eq!(err.message(), "Email taken");
    }

    #[test]
    fn message_falls_back_to_display() {
        assert_eq!(ClientError::Unauthenticated.message(), "Not authenticated");
        let err = ClientError::BackendUnreachable {
            base_url: "http://localhost:3001".to_string(),
            detail: "text/html".to_string(),
        };
        assert!(err.message().contains("http://localhost:3001"));
    }
}
