//! Native browser dialogs

/// Asks the user to confirm an action. Returns `false` when no window is
/// available or the dialog could not be shown.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.alert_with_message(message) {
            log::warn!("Failed to show alert: {:?}", err);
        }
    }
}
