use chrono::Utc;

use crate::error::{ClientError, ClientResult};
use crate::models::{BookingOrder, CreateOrderRequest, OrderNotes, PaymentOrder, PaymentReceipt};
use crate::services::api::ApiClient;

/// Ask the backend for a payment order covering `order.amount`.
pub async fn create_order(api: &ApiClient, order: &BookingOrder) -> ClientResult<PaymentOrder> {
    let body = CreateOrderRequest {
        amount_paise: order.amount_minor()?,
        receipt: format!("rcpt_{}", Utc::now().timestamp_millis()),
        notes: OrderNotes {
            event_title: order.event_title.clone(),
            quantity: order.quantity,
        },
    };

    let resp = api.send(api.post("/payments/create-order").json(&body)).await?;
    if !resp.status().is_success() {
        return Err(api
            .fail(
                resp,
                "Failed creating payment order",
                ClientError::OrderCreationFailed,
            )
            .await);
    }

    let payment: PaymentOrder = api.parse(resp).await?;
    tracing::info!(
        "Payment order {} created for {} {}",
        payment.order_id,
        payment.amount,
        payment.currency
    );
    Ok(payment)
}

/// Have the backend confirm the provider's signature for a payment.
pub async fn verify_payment(api: &ApiClient, receipt: &PaymentReceipt) -> ClientResult<()> {
    let resp = api.send(api.post("/payments/verify").json(receipt)).await?;
    if !resp.status().is_success() {
        return Err(api
            .fail(
                resp,
                "Payment verification failed",
                ClientError::PaymentVerificationFailed,
            )
            .await);
    }

    tracing::info!("Payment {} verified", receipt.razorpay_payment_id);
    Ok(())
}
