//! Checkout submission.
//!
//! A [`CheckoutSession`] belongs to one checkout form. It checks the cart
//! and the form locally, sends the order, and on success clears the cart.
//!
//! # States
//!
//! `Idle -> Submitting -> Succeeded | Failed`. A second submit while
//! `Submitting` is rejected and `Succeeded` is final for the session.
//! `Failed` is published with the customer-facing message, after which the
//! session returns to `Idle` on its own; the message stays available from
//! [`CheckoutSession::error_message`] until the next submission starts.

mod form;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use vitashop_core::{CartId, SubmissionState};

use crate::api::{ApiError, OrderResult};
use crate::cart::CartSync;

pub use form::{CheckoutForm, CustomerDetails, FieldError, FormField, ValidationErrors};

/// Message shown when the server gives no reason for a failed order.
pub const FAILED_ORDER_MESSAGE: &str = "Failed to place order.";

/// Remote order service.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Submit an order for the cart in `request`.
    async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderResult, ApiError>;
}

/// Everything the order service needs for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub cart_id: CartId,
    pub customer: CustomerDetails,
}

/// A placed order and the message to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order: OrderResult,
    pub message: String,
}

/// Reasons a submission did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty!")]
    EmptyCart,

    #[error("Invalid checkout details: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("An order is already being submitted")]
    InProgress,

    #[error("This order has already been placed")]
    AlreadyCompleted,

    /// The order service failed; `message` is what to show the customer.
    #[error("{message}")]
    Order {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// Checkout state for a single form.
pub struct CheckoutSession {
    cart: CartSync,
    orders: Arc<dyn OrderService>,
    state: watch::Sender<SubmissionState>,
    error: watch::Sender<Option<String>>,
}

impl CheckoutSession {
    #[must_use]
    pub fn new(cart: CartSync, orders: Arc<dyn OrderService>) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        let (error, _) = watch::channel(None);
        Self {
            cart,
            orders,
            state,
            error,
        }
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Message from the last failed order, if no submission has started since.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartSync {
        &self.cart
    }

    /// Submit the order.
    ///
    /// The cart and form are checked before anything is sent. On success
    /// the cart is cleared; a failure to clear is logged but does not undo
    /// the order. Dropping the returned future mid-flight puts the session
    /// back to `Idle`.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::AlreadyCompleted` / `InProgress` if the session is
    ///   not accepting submissions
    /// - `CheckoutError::EmptyCart` if the cart has no lines
    /// - `CheckoutError::Invalid` with every failing field
    /// - `CheckoutError::Order` if the order service fails
    #[instrument(skip_all, fields(cart_id = %self.cart.cart_id()))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<OrderConfirmation, CheckoutError> {
        let mut outcome = Err(CheckoutError::InProgress);
        self.state.send_if_modified(|state| {
            outcome = self.precheck(state, form);
            if outcome.is_ok() {
                *state = SubmissionState::Submitting;
            }
            outcome.is_ok()
        });
        let customer = outcome?;
        self.error.send_replace(None);

        let mut guard = SubmittingGuard {
            state: &self.state,
            armed: true,
        };

        let request = CheckoutRequest {
            cart_id: self.cart.cart_id().clone(),
            customer,
        };
        info!("Submitting order");

        match self.orders.checkout(&request).await {
            Ok(order) => {
                info!(order_id = %order.id, "Order placed");
                if let Err(e) = self.cart.clear().await {
                    warn!(error = %e, "Order placed but the cart could not be cleared");
                }
                guard.finish(SubmissionState::Succeeded {
                    order_id: order.id.to_string(),
                });
                Ok(OrderConfirmation {
                    message: format!("Order #{} placed successfully!", order.id),
                    order,
                })
            }
            Err(source) => {
                error!(error = %source, "Order submission failed");
                let message = source
                    .server_message()
                    .unwrap_or_else(|| FAILED_ORDER_MESSAGE.to_string());
                self.error.send_replace(Some(message.clone()));
                guard.finish(SubmissionState::Failed {
                    message: message.clone(),
                });
                self.state.send_replace(SubmissionState::Idle);
                Err(CheckoutError::Order { message, source })
            }
        }
    }

    /// Local checks run before entering `Submitting`.
    fn precheck(
        &self,
        state: &SubmissionState,
        form: &CheckoutForm,
    ) -> Result<CustomerDetails, CheckoutError> {
        match state {
            SubmissionState::Succeeded { .. } => return Err(CheckoutError::AlreadyCompleted),
            SubmissionState::Submitting => return Err(CheckoutError::InProgress),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }

        if self.cart.is_empty() {
            warn!("Checkout attempted with an empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        form.validate().map_err(|errors| {
            warn!(invalid_fields = errors.len(), "Checkout form is invalid");
            CheckoutError::from(errors)
        })
    }
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("cart", &self.cart)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Resets the state to `Idle` if a submission is dropped before finishing.
struct SubmittingGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
    armed: bool,
}

impl SubmittingGuard<'_> {
    fn finish(&mut self, state: SubmissionState) {
        self.armed = false;
        self.state.send_replace(state);
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Order submission cancelled");
            self.state.send_replace(SubmissionState::Idle);
        }
    }
}
