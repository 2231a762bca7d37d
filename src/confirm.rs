//! Native yes/no dialog for destructive actions.

use async_trait::async_trait;
use notedesk_core::Confirmer;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// [`Confirmer`] backed by the platform message box
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogConfirm;

#[async_trait]
impl Confirmer for DialogConfirm {
    async fn confirm_destructive(&self, message: &str) -> bool {
        let message = message.to_string();
        // Blocking dialog, run off the UI task so the window keeps painting
        let answer = tokio::task::spawn_blocking(move || {
            MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("Please confirm")
                .set_description(message)
                .set_buttons(MessageButtons::YesNo)
                .show()
        })
        .await;

        match answer {
            Ok(MessageDialogResult::Yes) => true,
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation dialog failed");
                false
            }
        }
    }
}
