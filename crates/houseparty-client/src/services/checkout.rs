use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::error::{ClientError, ClientResult};
use crate::models::{CheckoutOptions, PaymentReceipt};
use crate::routes::{create_router, CheckoutOutcome, CheckoutPage};

/// What a payment widget resolves to: the provider's identifiers, or `None`
/// when the user walked away from the checkout.
pub type WidgetFuture<'a> =
    Pin<Box<dyn Future<Output = ClientResult<Option<PaymentReceipt>>> + Send + 'a>>;

/// The payment provider's checkout, treated as an opaque collaborator.
pub trait PaymentWidget: Send + Sync {
    fn collect<'a>(&'a self, options: &'a CheckoutOptions) -> WidgetFuture<'a>;
}

type Announce = Arc<dyn Fn(&str) + Send + Sync>;

/// Serves the provider's checkout page on a local port and waits for the
/// browser to report completion or dismissal.
///
/// There is no timeout: a page that is never completed nor dismissed keeps
/// the checkout open until the caller drops the future.
#[derive(Clone)]
pub struct BrowserCheckout {
    port: u16,
    announce: Announce,
}

impl BrowserCheckout {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            announce: Arc::new(|url| tracing::info!("Complete your payment at {url}")),
        }
    }

    /// Called with the checkout URL once the page is being served.
    pub fn with_announce(mut self, announce: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.announce = Arc::new(announce);
        self
    }

    async fn serve(&self, options: CheckoutOptions) -> ClientResult<Option<PaymentReceipt>> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], self.port)))
            .await
            .map_err(|e| ClientError::Checkout(format!("Failed to open checkout page: {e}")))?;
        let addr = listener.local_addr()?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let app = create_router(Arc::new(CheckoutPage::new(options, outcome_tx)));

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });

        (self.announce)(&format!("http://{addr}/"));
        let outcome = outcome_rx.await;

        let _ = stop_tx.send(());
        match server.await {
            Ok(Err(e)) => tracing::warn!("Checkout server stopped with error: {e}"),
            Err(e) => tracing::warn!("Checkout server task failed: {e}"),
            Ok(Ok(())) => {}
        }

        match outcome {
            Ok(CheckoutOutcome::Completed(receipt)) => Ok(Some(receipt)),
            Ok(CheckoutOutcome::Dismissed) => Ok(None),
            Err(_) => Err(ClientError::Checkout(
                "Checkout page closed without a result".to_string(),
            )),
        }
    }
}

impl PaymentWidget for BrowserCheckout {
    fn collect<'a>(&'a self, options: &'a CheckoutOptions) -> WidgetFuture<'a> {
        Box::pin(self.serve(options.clone()))
    }
}
