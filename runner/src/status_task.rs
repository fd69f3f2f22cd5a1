use defmt::{debug, info, warn};
use toggle::ToggleEvent;

use crate::toggle_task::TOGGLE_EVENT_CHANNEL;

#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started");

    let receiver = TOGGLE_EVENT_CHANNEL.receiver();

    loop {
        match receiver.receive().await {
            ToggleEvent::Toggled {
                input,
                output,
                level,
            } => info!("{} toggled {} to {}", input, output, level),
            ToggleEvent::Bounced { input } => debug!("Edge on {} bounced, ignoring", input),
            ToggleEvent::Unmapped { input } => warn!("Edge on unmapped pin {}", input),
        }
    }
}
