//! Interaction surface
//!
//! Translates inbound platform events into desk calls, validates raw user
//! input, and renders desk errors as short user-facing replies. Nothing
//! that happens here may take the process down: every error is caught at
//! this boundary.

use std::sync::Arc;

use tracing::{debug, error, warn};

use usher_core::{ChannelId, Error, Result, UserId};
use usher_net::{Control, Event};

use crate::desk::TicketDesk;
use crate::gateway::{ChatGateway, SendOptions};

const MAX_SUBJECT_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Event-to-desk dispatcher
pub struct Surface {
    desk: Arc<TicketDesk>,
    gateway: Arc<dyn ChatGateway>,
}

impl Surface {
    pub fn new(desk: Arc<TicketDesk>, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { desk, gateway }
    }

    /// Handle one platform event. Never returns an error.
    pub async fn handle(&self, event: Event) {
        match event {
            Event::PanelRequested { channel, user } => {
                let result = self.desk.post_panel(channel, user).await;
                self.report(channel, result).await;
            }

            Event::TicketSubmitted {
                user,
                subject,
                description,
                priority,
            } => {
                if let Err(e) = self.submit(user, &subject, &description, &priority).await {
                    self.log(&e);
                    // Modal submissions carry no channel; failures go to
                    // the user directly
                    if let Err(send_err) =
                        self.gateway.send_direct_message(user, &user_message(&e)).await
                    {
                        warn!(user = %user, error = %send_err, "Could not deliver failure reply");
                    }
                }
            }

            Event::ControlPressed {
                channel,
                user,
                control,
            } => match control {
                // The adapter shows the creation modal itself; the result
                // arrives later as TicketSubmitted
                Control::OpenTicket => {}
                Control::CloseTicket => {
                    let result = self.desk.close(channel, user).await;
                    self.report(channel, result).await;
                }
                Control::AssignTicket => {
                    let result = self.desk.assign(channel, user).await;
                    self.report(channel, result).await;
                }
            },

            Event::ChannelMessage { channel, .. } => {
                if let Err(e) = self.desk.note_activity(channel) {
                    warn!(channel = %channel, error = %e, "Failed to record activity");
                }
            }

            Event::StatsRequested { channel, user } => {
                let result = self.desk.stats(channel, user).await;
                self.report(channel, result).await;
            }

            Event::MyTicketsRequested { channel, user } => {
                let result = self.desk.my_tickets(channel, user).await;
                self.report(channel, result).await;
            }
        }
    }

    /// Validate modal fields, then open the ticket
    async fn submit(
        &self,
        user: UserId,
        subject: &str,
        description: &str,
        priority: &str,
    ) -> Result<i64> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(Error::InvalidInput("The subject must not be empty.".to_string()));
        }
        if subject.chars().count() > MAX_SUBJECT_CHARS {
            return Err(Error::InvalidInput(format!(
                "The subject must be at most {} characters.",
                MAX_SUBJECT_CHARS
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(Error::InvalidInput(format!(
                "The description must be at most {} characters.",
                MAX_DESCRIPTION_CHARS
            )));
        }

        self.desk.open_ticket(user, subject, description, priority).await
    }

    /// Render a failed desk call into the channel it came from
    async fn report(&self, channel: ChannelId, result: Result<()>) {
        if let Err(e) = result {
            self.log(&e);
            if let Err(send_err) = self
                .gateway
                .send_message(channel, &user_message(&e), SendOptions::default())
                .await
            {
                warn!(channel = %channel, error = %send_err, "Could not deliver failure reply");
            }
        }
    }

    fn log(&self, err: &Error) {
        match err {
            Error::Unauthorized(_)
            | Error::NotFound(_)
            | Error::RateLimited(_)
            | Error::InvalidInput(_) => debug!(error = %err, "Rejected interaction"),
            _ => error!(error = %err, "Interaction failed"),
        }
    }
}

/// Short user-facing text for a desk error
fn user_message(err: &Error) -> String {
    match err {
        Error::Configuration(_) => {
            "The ticket system is not fully configured. Please contact an administrator."
                .to_string()
        }
        Error::Unauthorized(_) => "You do not have permission to do that.".to_string(),
        Error::NotFound(_) => "There is no open ticket here.".to_string(),
        Error::RateLimited(_) => {
            "You already opened a ticket recently. Please try again later.".to_string()
        }
        Error::InvalidInput(msg) => msg.clone(),
        _ => "Something went wrong. Please try again later.".to_string(),
    }
}
