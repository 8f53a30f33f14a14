use inquire::Confirm;
use weather_core::PermissionPrompt;

/// Terminal counterpart of the OS location-permission dialog.
#[derive(Debug, Clone, Copy)]
pub struct InquirePrompt;

impl PermissionPrompt for InquirePrompt {
    fn confirm(&self, message: &str) -> bool {
        match Confirm::new(message).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(err) => {
                // Not a TTY or the prompt was cancelled.
                tracing::debug!(error = %err, "Location permission prompt unavailable");
                false
            }
        }
    }
}
