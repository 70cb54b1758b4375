//! Order status state machine
//!
//! The forward path is linear; cancellation branches off every non-terminal
//! state. `delivered` and `cancelled` are terminal.

use shared::models::OrderStatus;

use crate::utils::AppError;

/// Legal next states for a given status
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Preparing, Cancelled],
        Preparing => &[Ready, Cancelled],
        Ready => &[OutForDelivery, Cancelled],
        OutForDelivery => &[Delivered, Cancelled],
        Delivered | Cancelled => &[],
    }
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// Validate a requested transition
///
/// The rejection message enumerates the legal next states so the client can
/// recover without a second round trip.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
    let allowed = allowed_transitions(from);
    if allowed.contains(&to) {
        return Ok(());
    }

    if allowed.is_empty() {
        return Err(AppError::business_rule(format!(
            "Order is {from} and cannot change status"
        )));
    }

    let allowed_list = allowed
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::business_rule(format!(
        "Cannot change order status from {from} to {to}; allowed: {allowed_list}"
    )))
}
