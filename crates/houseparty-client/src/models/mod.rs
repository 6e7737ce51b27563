use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

/// Identifier as issued by the backend, which may be numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Profile returned by the backend on login.
///
/// The object is kept exactly as the server sent it, including unknown keys
/// and explicit nulls, so the stored copy round-trips unchanged. The typed
/// accessors read from it leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct User {
    id: Option<RecordId>,
    name: Option<String>,
    email: Option<String>,
    raw: Map<String, Value>,
}

impl From<Map<String, Value>> for User {
    fn from(raw: Map<String, Value>) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let id = raw.get("id").and_then(|v| RecordId::deserialize(v).ok());
        let name = text("name");
        let email = text("email");
        Self {
            id,
            name,
            email,
            raw,
        }
    }
}

impl From<User> for Map<String, Value> {
    fn from(user: User) -> Self {
        user.raw
    }
}

impl User {
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Up to two uppercase initials of the user's name, `U` when unnamed.
    pub fn initials(&self) -> String {
        let name = match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => "U",
        };
        name.split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Persisted authentication state. A token never exists without its user.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    LoggedOut,
    LoggedIn { token: String, user: User },
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::LoggedIn { token, .. } => Some(token),
            Session::LoggedOut => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::LoggedIn { user, .. } => Some(user),
            Session::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn { .. })
    }
}

/// What a view knows about the session, including before the first read.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    LoggedOut,
    LoggedIn(User),
}

impl From<&Session> for SessionState {
    fn from(session: &Session) -> Self {
        match session {
            Session::LoggedOut => SessionState::LoggedOut,
            Session::LoggedIn { user, .. } => SessionState::LoggedIn(user.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Written,
    Cleared,
    /// Another process sharing the same storage changed the session.
    External,
    /// Tickets were booked; views showing ticket counts should refresh.
    TicketsBooked,
}

// Auth wire types

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

// Catalog

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "Sold Out")]
    SoldOut,
    #[serde(rename = "Tickets Available")]
    Available,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::SoldOut => f.write_str("Sold Out"),
            EventStatus::Available => f.write_str("Tickets Available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: &'static str,
    pub date: &'static str,
    pub iso_date: &'static str,
    pub price: u64,
    pub status: EventStatus,
    pub description: &'static str,
    pub details: &'static str,
}

impl Event {
    pub fn is_bookable(&self) -> bool {
        self.status == EventStatus::Available
    }
}

// Booking

/// A purchase attempt in progress. Prices are whole currency units.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOrder {
    pub event_title: String,
    pub event_date: String,
    pub price: u64,
    pub quantity: u32,
    pub amount: u64,
}

impl BookingOrder {
    pub fn new(
        event_title: impl Into<String>,
        event_date: impl Into<String>,
        unit_price: u64,
        quantity: u32,
    ) -> ClientResult<Self> {
        let event_title = event_title.into();
        if event_title.trim().is_empty() {
            return Err(ClientError::InvalidInput("Event title is required".to_string()));
        }
        if quantity == 0 {
            return Err(ClientError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let amount = unit_price
            .checked_mul(u64::from(quantity))
            .filter(|amount| amount.checked_mul(100).is_some())
            .ok_or_else(|| ClientError::InvalidInput("Order amount is too large".to_string()))?;
        Ok(Self {
            event_title,
            event_date: event_date.into(),
            price: unit_price,
            quantity,
            amount,
        })
    }

    pub fn for_event(event: &Event, quantity: u32) -> ClientResult<Self> {
        Self::new(event.title, event.iso_date, event.price, quantity)
    }

    /// Amount in minor currency units (paise).
    pub fn amount_minor(&self) -> ClientResult<u64> {
        self.amount
            .checked_mul(100)
            .ok_or_else(|| ClientError::InvalidInput("Order amount is too large".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub event_title: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount_paise: u64,
    pub receipt: String,
    pub notes: OrderNotes,
}

/// Payment intent returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub key_id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
}

/// Identifiers issued by the payment provider once the user has paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prefill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Everything the payment widget needs to open a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub theme_color: String,
}

// Tickets

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub event_title: String,
    pub event_date: String,
    pub price: u64,
    pub quantity: u32,
}

impl From<&BookingOrder> for TicketRequest {
    fn from(order: &BookingOrder) -> Self {
        Self {
            event_title: order.event_title.clone(),
            event_date: order.event_date.clone(),
            price: order.price,
            quantity: order.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Prices arrive as numbers, numeric strings (`"20.00"`) or null. Text that
/// is not a number counts as no price.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Deserialize)]
pub struct BookResponse {
    #[serde(default)]
    pub ticket: Option<Ticket>,
    #[serde(default)]
    pub tickets: Option<Vec<Ticket>>,
}

impl BookResponse {
    pub fn into_tickets(self) -> Vec<Ticket> {
        match (self.tickets, self.ticket) {
            (Some(tickets), _) => tickets,
            (None, Some(ticket)) => vec![ticket],
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketsResponse {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// Tickets for one event, aggregated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketGroup {
    pub event_title: String,
    pub event_date: Option<String>,
    pub count: usize,
    pub total_price: f64,
    pub latest_created_at: Option<String>,
}
