//! The multi-step ticket purchase: create a payment order, collect payment
//! through the widget, verify it with the backend, then book the tickets.

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    BookingOrder, CheckoutOptions, Event, PaymentOrder, PaymentReceipt, Prefill, SessionChange,
    Ticket, TicketRequest,
};
use crate::services::api::ApiClient;
use crate::services::checkout::PaymentWidget;
use crate::services::{payments, tickets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    OrderCreation,
    PaymentCollection,
    PaymentVerification,
    TicketBooking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingFailure {
    pub stage: BookingStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    Idle,
    /// Also where the flow rests when the user abandons the checkout.
    OrderCreated {
        order: BookingOrder,
        payment: PaymentOrder,
        checkout: CheckoutOptions,
        token: String,
    },
    PaymentCollected {
        order: BookingOrder,
        receipt: PaymentReceipt,
        token: String,
    },
    Verified {
        order: BookingOrder,
        receipt: PaymentReceipt,
        token: String,
    },
    TicketBooked {
        order: BookingOrder,
        tickets: Vec<Ticket>,
    },
    Failed(BookingFailure),
}

impl BookingState {
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::Idle => "idle",
            BookingState::OrderCreated { .. } => "order created",
            BookingState::PaymentCollected { .. } => "payment collected",
            BookingState::Verified { .. } => "payment verified",
            BookingState::TicketBooked { .. } => "tickets booked",
            BookingState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Booked(Vec<Ticket>),
    /// The user left the checkout; the order stays created and unpaid.
    Abandoned,
}

/// Drives one purchase attempt at a time. Nothing is retried: a failure
/// leaves the orchestrator in [`BookingState::Failed`] until the caller
/// starts a new attempt.
pub struct BookingOrchestrator {
    api: ApiClient,
    store: SessionStore,
    widget: Arc<dyn PaymentWidget>,
    brand_name: String,
    theme_color: String,
    state: BookingState,
}

impl BookingOrchestrator {
    pub fn new(api: ApiClient, store: SessionStore, widget: Arc<dyn PaymentWidget>) -> Self {
        Self {
            api,
            store,
            widget,
            brand_name: "House Party".to_string(),
            theme_color: "#8b5cf6".to_string(),
            state: BookingState::Idle,
        }
    }

    pub fn with_branding(mut self, brand_name: impl Into<String>, theme_color: impl Into<String>) -> Self {
        self.brand_name = brand_name.into();
        self.theme_color = theme_color.into();
        self
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    /// Book `quantity` tickets for a catalog event at its listed price.
    pub async fn book_event(&mut self, event: &Event, quantity: u32) -> ClientResult<PurchaseOutcome> {
        self.ensure_can_start()?;
        if !self.store.read().is_logged_in() {
            return Err(self.fail(BookingStage::OrderCreation, ClientError::Unauthenticated));
        }
        if !event.is_bookable() {
            return Err(ClientError::SoldOut(event.title.to_string()));
        }
        let order = BookingOrder::for_event(event, quantity)?;
        self.purchase(order).await
    }

    /// Run every step for `order`, stopping early if the user abandons the
    /// checkout.
    pub async fn purchase(&mut self, order: BookingOrder) -> ClientResult<PurchaseOutcome> {
        self.create_order(order).await?;
        if !self.collect_payment().await? {
            return Ok(PurchaseOutcome::Abandoned);
        }
        self.verify_payment().await?;
        let tickets = self.book_tickets().await?;
        Ok(PurchaseOutcome::Booked(tickets))
    }

    /// `Idle -> OrderCreated`. Needs a logged-in session; without one this
    /// fails before any request is made.
    pub async fn create_order(&mut self, order: BookingOrder) -> ClientResult<PaymentOrder> {
        self.ensure_can_start()?;
        if let BookingState::OrderCreated { payment, .. } = &self.state {
            tracing::warn!("Starting over; order {} is left unpaid", payment.order_id);
        }

        let session = self.store.read();
        let (token, user) = match (session.token(), session.user()) {
            (Some(token), Some(user)) => (token.to_string(), user.clone()),
            _ => return Err(self.fail(BookingStage::OrderCreation, ClientError::Unauthenticated)),
        };

        let payment = match payments::create_order(&self.api, &order).await {
            Ok(payment) => payment,
            Err(e) => return Err(self.fail(BookingStage::OrderCreation, e)),
        };

        let checkout = CheckoutOptions {
            key: payment.key_id.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            name: self.brand_name.clone(),
            description: order.event_title.clone(),
            order_id: payment.order_id.clone(),
            prefill: Prefill {
                name: user.name().map(str::to_string),
                email: user.email().map(str::to_string),
            },
            theme_color: self.theme_color.clone(),
        };

        self.transition(BookingState::OrderCreated {
            order,
            payment: payment.clone(),
            checkout,
            token,
        });
        Ok(payment)
    }

    /// `OrderCreated -> PaymentCollected`. Returns false, leaving the state
    /// untouched, when the user abandons the checkout.
    pub async fn collect_payment(&mut self) -> ClientResult<bool> {
        let (order, checkout, token) = match &self.state {
            BookingState::OrderCreated {
                order,
                checkout,
                token,
                ..
            } => (order.clone(), checkout.clone(), token.clone()),
            other => return Err(ClientError::InvalidState(other.name())),
        };

        let widget = Arc::clone(&self.widget);
        match widget.collect(&checkout).await {
            Ok(Some(receipt)) => {
                self.transition(BookingState::PaymentCollected {
                    order,
                    receipt,
                    token,
                });
                Ok(true)
            }
            Ok(None) => {
                tracing::warn!("Checkout for order {} abandoned", checkout.order_id);
                Ok(false)
            }
            Err(e) => Err(self.fail(BookingStage::PaymentCollection, e)),
        }
    }

    /// `PaymentCollected -> Verified`.
    pub async fn verify_payment(&mut self) -> ClientResult<()> {
        let (order, receipt, token) = match &self.state {
            BookingState::PaymentCollected {
                order,
                receipt,
                token,
            } => (order.clone(), receipt.clone(), token.clone()),
            other => return Err(ClientError::InvalidState(other.name())),
        };

        if let Err(e) = payments::verify_payment(&self.api, &receipt).await {
            return Err(self.fail(BookingStage::PaymentVerification, e));
        }

        self.transition(BookingState::Verified {
            order,
            receipt,
            token,
        });
        Ok(())
    }

    /// `Verified -> TicketBooked`, then announce the booking and return to
    /// `Idle`.
    pub async fn book_tickets(&mut self) -> ClientResult<Vec<Ticket>> {
        let (order, token) = match &self.state {
            BookingState::Verified { order, token, .. } => (order.clone(), token.clone()),
            other => return Err(ClientError::InvalidState(other.name())),
        };

        let request = TicketRequest::from(&order);
        let booked = match tickets::book_tickets(&self.api, &token, &request).await {
            Ok(booked) => booked,
            Err(e) => return Err(self.fail(BookingStage::TicketBooking, e)),
        };

        self.transition(BookingState::TicketBooked {
            order,
            tickets: booked.clone(),
        });
        self.store.notify(SessionChange::TicketsBooked);
        self.transition(BookingState::Idle);
        Ok(booked)
    }

    /// Abandon the current attempt. Orders already created with the backend
    /// are left as they are.
    pub fn cancel(&mut self) {
        match &self.state {
            BookingState::OrderCreated { payment, .. } => {
                tracing::warn!("Cancelling booking; order {} left unpaid", payment.order_id);
            }
            BookingState::PaymentCollected { receipt, .. } | BookingState::Verified { receipt, .. } => {
                tracing::warn!(
                    "Cancelling booking after payment {}",
                    receipt.razorpay_payment_id
                );
            }
            _ => {}
        }
        self.transition(BookingState::Idle);
    }

    /// A new attempt may not replace one whose payment was already taken.
    fn ensure_can_start(&self) -> ClientResult<()> {
        match self.state {
            BookingState::PaymentCollected { .. } | BookingState::Verified { .. } => {
                Err(ClientError::InvalidState(self.state.name()))
            }
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: BookingState) {
        tracing::debug!("Booking {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn fail(&mut self, stage: BookingStage, err: ClientError) -> ClientError {
        tracing::warn!("Booking failed during {stage:?}: {err}");
        self.transition(BookingState::Failed(BookingFailure {
            stage,
            message: err.message(),
        }));
        err
    }
}
