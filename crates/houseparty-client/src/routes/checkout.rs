use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, response::Html, Json};
use tokio::sync::oneshot;

use crate::models::{CheckoutOptions, PaymentReceipt};

const PROVIDER_SCRIPT: &str = "https://checkout.razorpay.com/v1/checkout.js";

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Completed(PaymentReceipt),
    Dismissed,
}

/// One checkout: the options it was opened with and where its single
/// outcome goes.
pub struct CheckoutPage {
    options: CheckoutOptions,
    outcome: Mutex<Option<oneshot::Sender<CheckoutOutcome>>>,
}

impl CheckoutPage {
    pub fn new(options: CheckoutOptions, outcome: oneshot::Sender<CheckoutOutcome>) -> Self {
        Self {
            options,
            outcome: Mutex::new(Some(outcome)),
        }
    }

    /// Hand over the outcome; false if one was already delivered.
    fn resolve(&self, outcome: CheckoutOutcome) -> bool {
        let sender = match self.outcome.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

pub async fn page(State(page): State<Arc<CheckoutPage>>) -> Html<String> {
    Html(render_page(&page.options))
}

pub async fn complete(
    State(page): State<Arc<CheckoutPage>>,
    Json(receipt): Json<PaymentReceipt>,
) -> StatusCode {
    if receipt.razorpay_order_id != page.options.order_id {
        tracing::warn!(
            "Checkout callback for order {} does not match {}",
            receipt.razorpay_order_id,
            page.options.order_id
        );
        return StatusCode::BAD_REQUEST;
    }

    tracing::info!("Checkout completed with payment {}", receipt.razorpay_payment_id);
    if page.resolve(CheckoutOutcome::Completed(receipt)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

pub async fn dismiss(State(page): State<Arc<CheckoutPage>>) -> StatusCode {
    tracing::info!("Checkout dismissed for order {}", page.options.order_id);
    if page.resolve(CheckoutOutcome::Dismissed) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

fn render_page(options: &CheckoutOptions) -> String {
    // Safe to inline inside <script>: no closing tag can appear
    let options_json = serde_json::to_string(options)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    let title = escape_html(&options.description);
    let brand = escape_html(&options.name);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>{brand} checkout</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #18181b; color: #fff; text-align: center; padding: 40px;">
  <h2>{title}</h2>
  <p id="status">Opening payment window...</p>
  <script src="{PROVIDER_SCRIPT}"></script>
  <script>
    const opts = {options_json};
    function report(path, body) {{
      return fetch(path, {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: body ? JSON.stringify(body) : undefined,
      }});
    }}
    const rzp = new Razorpay({{
      key: opts.key,
      amount: opts.amount,
      currency: opts.currency,
      name: opts.name,
      description: opts.description,
      order_id: opts.order_id,
      prefill: opts.prefill,
      theme: {{ color: opts.theme_color }},
      handler: function (response) {{
        report('/complete', {{
          razorpay_payment_id: response.razorpay_payment_id,
          razorpay_order_id: response.razorpay_order_id,
          razorpay_signature: response.razorpay_signature,
        }}).then(function () {{
          document.getElementById('status').textContent = 'Payment received. You can close this tab.';
        }});
      }},
      modal: {{
        ondismiss: function () {{
          report('/dismiss').then(function () {{
            document.getElementById('status').textContent = 'Checkout cancelled. You can close this tab.';
          }});
        }},
      }},
    }});
    rzp.open();
  </script>
</body>
</html>"#
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prefill;

    fn options(description: &str) -> CheckoutOptions {
        CheckoutOptions {
            key: "rzp_test_key".to_string(),
            amount: 99800,
            currency: "INR".to_string(),
            name: "House Party".to_string(),
            description: description.to_string(),
            order_id: "order_1".to_string(),
            prefill: Prefill::default(),
            theme_color: "#8b5cf6".to_string(),
        }
    }

    #[test]
    fn page_embeds_options_and_script() {
        let html = render_page(&options("Love House"));
        assert!(html.contains(PROVIDER_SCRIPT));
        assert!(html.contains("\"order_id\":\"order_1\""));
        assert!(html.contains("<h2>Love House</h2>"));
    }

    #[test]
    fn page_cannot_break_out_of_script() {
        let html = render_page(&options("</script><b>x</b>"));
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("&lt;/script&gt;"));
    }

    #[test]
    fn outcome_delivered_once() {
        let (tx, mut rx) = oneshot::channel();
        let page = CheckoutPage::new(options("Love House"), tx);
        assert!(page.resolve(CheckoutOutcome::Dismissed));
        assert!(!page.resolve(CheckoutOutcome::Dismissed));
        assert_eq!(rx.try_recv().unwrap(), CheckoutOutcome::Dismissed);
    }
}
