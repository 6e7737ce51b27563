pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use auth::{AuthClient, SessionStore};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use services::api::ApiClient;
pub use services::booking::{BookingOrchestrator, BookingState, PurchaseOutcome};
