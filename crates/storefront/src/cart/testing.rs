//! In-memory cart store for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use vitashop_core::{CartId, CartLine, CartSnapshot, ProductId};

use super::CartStore;
use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch,
    Replace(CartSnapshot),
    DeleteLine(ProductId),
    DeleteCart,
}

/// Records every call; fetches and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FakeCartStore {
    remote: Mutex<CartSnapshot>,
    calls: Mutex<Vec<Call>>,
    pub fail_fetch: AtomicBool,
    pub fail_writes: AtomicBool,
}

#[allow(clippy::unwrap_used)]
impl FakeCartStore {
    pub fn with_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        Self {
            remote: Mutex::new(CartSnapshot::from_lines(lines)),
            ..Self::default()
        }
    }

    pub fn remote(&self) -> CartSnapshot {
        self.remote.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every snapshot sent through `replace`, in order.
    pub fn replaces(&self) -> Vec<CartSnapshot> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Replace(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(flag: &AtomicBool) -> Result<(), ApiError> {
        if flag.load(Ordering::SeqCst) {
            Err(ApiError::Api {
                status: 500,
                message: "store unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl CartStore for FakeCartStore {
    async fn fetch(&self, _cart_id: &CartId) -> Result<CartSnapshot, ApiError> {
        self.record(Call::Fetch);
        Self::check(&self.fail_fetch)?;
        Ok(self.remote())
    }

    async fn replace(&self, _cart_id: &CartId, snapshot: &CartSnapshot) -> Result<(), ApiError> {
        // Give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        self.record(Call::Replace(snapshot.clone()));
        Self::check(&self.fail_writes)?;
        *self.remote.lock().unwrap() = snapshot.clone();
        Ok(())
    }

    async fn delete_line(&self, _cart_id: &CartId, product_id: &ProductId) -> Result<(), ApiError> {
        self.record(Call::DeleteLine(product_id.clone()));
        Self::check(&self.fail_writes)?;
        let mut remote = self.remote.lock().unwrap();
        *remote = remote.without(product_id);
        Ok(())
    }

    async fn delete_cart(&self, _cart_id: &CartId) -> Result<(), ApiError> {
        self.record(Call::DeleteCart);
        Self::check(&self.fail_writes)?;
        *self.remote.lock().unwrap() = CartSnapshot::empty();
        Ok(())
    }
}
