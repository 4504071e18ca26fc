use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{displayed_actions, ActionResult, ReviewAction};
use crate::domain::request::DiscountRequest;
use crate::turnaround::Turnaround;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub action: ReviewAction,
    pub enabled: bool,
}

/// What the action column of one row shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowControls {
    Taken { badge: &'static str, taken_at: DateTime<Utc>, tat: Option<Turnaround> },
    Buttons { buttons: [ButtonState; 3], selectable: bool },
}

/// A recorded decision, local or from the store, replaces the buttons with a badge.
/// Buttons are disabled while a submission is in flight or a bulk selection exists.
pub fn row_controls(
    request: &DiscountRequest,
    local_result: Option<&ActionResult>,
    in_flight: bool,
    bulk_mode_active: bool,
) -> RowControls {
    let taken = local_result.cloned().or_else(|| ActionResult::from_store(request));
    if let Some(result) = taken {
        return RowControls::Taken {
            badge: result.badge(),
            taken_at: result.timestamp,
            tat: result.tat,
        };
    }

    let permitted = request.permitted_actions();
    let buttons = displayed_actions(request.eligible).map(|action| ButtonState {
        action,
        enabled: !in_flight && !bulk_mode_active && permitted.contains(action),
    });

    RowControls::Buttons { buttons, selectable: !in_flight }
}
