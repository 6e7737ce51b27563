use crate::auth::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{Session, TicketGroup, User};
use crate::services::api::ApiClient;
use crate::services::tickets;

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: User,
    pub tickets: Vec<TicketGroup>,
}

/// The signed-in user with their tickets grouped per event.
pub async fn load_profile(api: &ApiClient, store: &SessionStore) -> ClientResult<Profile> {
    let (token, user) = match store.read() {
        Session::LoggedIn { token, user } => (token, user),
        Session::LoggedOut => return Err(ClientError::Unauthenticated),
    };

    let owned = tickets::list_tickets(api, &token).await?;
    tracing::debug!("Loaded {} ticket(s) for profile", owned.len());

    Ok(Profile {
        user,
        tickets: tickets::group_by_event(&owned),
    })
}
