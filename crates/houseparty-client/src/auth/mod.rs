pub mod client;
pub mod session;
pub mod watcher;

pub use client::AuthClient;
pub use session::SessionStore;
