//! Confirmation before destructive actions.
//!
//! Callers await the answer before proceeding, so the prompt behind a
//! [`Confirmer`] may be synchronous or a dialog resolved later.

use async_trait::async_trait;

/// Yes/no question asked before a destructive action
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm_destructive(&self, message: &str) -> bool;
}

/// Answers yes to everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmer for AlwaysConfirm {
    async fn confirm_destructive(&self, _message: &str) -> bool {
        true
    }
}

/// Answers no to everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

#[async_trait]
impl Confirmer for NeverConfirm {
    async fn confirm_destructive(&self, _message: &str) -> bool {
        false
    }
}
