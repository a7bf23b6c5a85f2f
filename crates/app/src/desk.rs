//! Ticket desk - ticket lifecycle manager
//!
//! All state changes flow through here: opening tickets, assignment,
//! closing with transcript delivery, stats, and the inactivity sweep.
//! Platform access goes through the `ChatGateway` trait; persistence
//! through the core storage traits.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use usher_core::{
    AuditRepository, ChannelId, Database, DeskAction, DeskRole, Error, GuildId, PermissionMatrix,
    Priority, Result, RoleId, SettingsRepository, TicketAction, TicketRepository, TicketStatus,
    UserId,
};
use usher_net::{Control, Embed, EmbedField};

use crate::gateway::{ChatGateway, SendOptions};
use crate::transcript;

/// Desk configuration resolved from the config file
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub guild: GuildId,
    pub ticket_category: Option<ChannelId>,
    pub staff_role: Option<RoleId>,
    pub transcript_channel: Option<ChannelId>,
    /// How long the closure confirmation stays visible before channel
    /// deletion
    pub close_grace: Duration,
}

/// Ticket lifecycle manager
pub struct TicketDesk {
    gateway: Arc<dyn ChatGateway>,
    db: Arc<Mutex<Database>>,
    config: DeskConfig,
}

impl TicketDesk {
    pub fn new(gateway: Arc<dyn ChatGateway>, db: Arc<Mutex<Database>>, config: DeskConfig) -> Self {
        Self {
            gateway,
            db,
            config,
        }
    }

    /// Lock the database, recovering from poisoning
    fn storage(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Database mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Resolve the caller's desk role from platform checks
    async fn resolve_role(&self, user: UserId) -> Result<DeskRole> {
        if self.gateway.is_admin(user).await? {
            return Ok(DeskRole::Admin);
        }
        if let Some(staff_role) = self.config.staff_role {
            if self.gateway.has_role(user, staff_role).await? {
                return Ok(DeskRole::Staff);
            }
        }
        Ok(DeskRole::Member)
    }

    async fn authorize(&self, user: UserId, action: DeskAction) -> Result<DeskRole> {
        let role = self.resolve_role(user).await?;
        if !PermissionMatrix::can_perform(role, action) {
            return Err(Error::Unauthorized(format!(
                "{:?} is not allowed for the {} role",
                action,
                role.display_name()
            )));
        }
        Ok(role)
    }

    /// Open a ticket: create the private channel, then the store row, then
    /// post the management message.
    ///
    /// Returns the durable ticket id. The channel name carries a separate
    /// display number derived from the category's current channel count;
    /// it can collide under concurrent creation and is cosmetic only.
    #[instrument(skip(self, subject, description))]
    pub async fn open_ticket(
        &self,
        user: UserId,
        subject: &str,
        description: &str,
        priority_raw: &str,
    ) -> Result<i64> {
        let priority = Priority::parse(priority_raw);

        // Both must be configured before anything external happens
        let category = self.config.ticket_category.ok_or_else(|| {
            Error::Configuration("Ticket category is not configured".to_string())
        })?;
        let staff_role = self
            .config
            .staff_role
            .ok_or_else(|| Error::Configuration("Staff role is not configured".to_string()))?;

        // Per-guild rate limit on ticket creation
        let limit = {
            let db = self.storage();
            let settings = db.guild_settings(self.config.guild)?;
            let since = Utc::now() - chrono::Duration::hours(1);
            let recent = db.count_tickets_created_since(user, since)?;
            if recent >= u64::from(settings.tickets_per_hour) {
                return Err(Error::RateLimited(format!(
                    "Limit of {} ticket(s) per hour reached",
                    settings.tickets_per_hour
                )));
            }
            settings.tickets_per_hour
        };

        let display_number = self.gateway.count_category_channels(category).await? + 1;
        let channel = self
            .gateway
            .create_private_channel(
                category,
                &format!("ticket-{}", display_number),
                &[user],
                &[staff_role],
            )
            .await?;

        // A store failure here leaves the created channel behind; that is
        // logged and accepted rather than rolled back.
        let ticket_id = {
            let db = self.storage();
            let ticket_id = db.create_ticket(user, channel, priority).map_err(|e| {
                warn!(channel = %channel, error = %e, "Ticket row insert failed after channel creation");
                e
            })?;
            db.record_ticket_action(ticket_id, TicketAction::Created, Some(user))?;
            ticket_id
        };

        info!(
            ticket_id,
            user = %user,
            channel = %channel,
            priority = %priority,
            rate_limit = limit,
            "Ticket opened"
        );

        let content = if priority.is_urgent() {
            format!("**URGENT** ticket from <@{}>.", user)
        } else {
            format!("New ticket from <@{}>.", user)
        };

        self.gateway
            .send_message(
                channel,
                &content,
                SendOptions {
                    embed: Some(Embed {
                        title: subject.to_string(),
                        description: description.to_string(),
                        fields: vec![EmbedField {
                            name: "Priority".to_string(),
                            value: priority.as_str().to_string(),
                        }],
                        footer: Some(format!("Ticket #{}", ticket_id)),
                    }),
                    controls: vec![Control::CloseTicket, Control::AssignTicket],
                    mention_role: Some(staff_role),
                },
            )
            .await?;

        Ok(ticket_id)
    }

    /// Assign the open ticket in `channel` to `actor`. Staff only;
    /// reassignment is allowed.
    #[instrument(skip(self))]
    pub async fn assign(&self, channel: ChannelId, actor: UserId) -> Result<()> {
        self.authorize(actor, DeskAction::AssignTicket).await?;

        let ticket_id = {
            let db = self.storage();
            let ticket = db
                .find_ticket_by_channel(channel)?
                .filter(|t| t.is_open())
                .ok_or_else(|| Error::NotFound(format!("No open ticket for channel {}", channel)))?;
            db.set_ticket_assignee(channel, actor)?;
            db.record_ticket_action(ticket.id, TicketAction::Assigned, Some(actor))?;
            ticket.id
        };

        info!(ticket_id, actor = %actor, "Ticket assigned");

        self.gateway
            .send_message(
                channel,
                &format!("Ticket #{} is now handled by <@{}>.", ticket_id, actor),
                SendOptions::default(),
            )
            .await
    }

    /// Close the ticket in `channel`: deliver a transcript if configured,
    /// mark it closed, confirm, and delete the channel after the grace
    /// period.
    ///
    /// Already-closed and unknown channels are `NotFound`, so a second
    /// close never produces a second transcript.
    #[instrument(skip(self))]
    pub async fn close(&self, channel: ChannelId, actor: UserId) -> Result<()> {
        self.authorize(actor, DeskAction::CloseTicket).await?;

        let ticket = {
            let db = self.storage();
            db.find_ticket_by_channel(channel)?
                .filter(|t| t.is_open())
                .ok_or_else(|| Error::NotFound(format!("No open ticket for channel {}", channel)))?
        };

        let history = self.gateway.fetch_history(channel).await?;

        if let Some(transcript_channel) = self.config.transcript_channel {
            let rendered = transcript::render(&history);
            self.gateway
                .send_file(
                    transcript_channel,
                    &transcript::filename(ticket.id),
                    &rendered,
                )
                .await?;
        }

        {
            let db = self.storage();
            db.set_ticket_status(channel, TicketStatus::Closed)?;
            db.record_ticket_action(ticket.id, TicketAction::Closed, Some(actor))?;
        }

        info!(ticket_id = ticket.id, actor = %actor, "Ticket closed");

        self.gateway
            .send_message(
                channel,
                &format!(
                    "Ticket #{} closed by <@{}>. This channel will be removed shortly.",
                    ticket.id, actor
                ),
                SendOptions::default(),
            )
            .await?;

        // Leave the confirmation visible before removing the channel
        tokio::time::sleep(self.config.close_grace).await;

        self.gateway.delete_channel(channel).await
    }

    /// Post the ticket-creation panel in `channel`. Admin only.
    #[instrument(skip(self))]
    pub async fn post_panel(&self, channel: ChannelId, actor: UserId) -> Result<()> {
        self.authorize(actor, DeskAction::PostPanel).await?;

        self.gateway
            .send_message(
                channel,
                "Need help?",
                SendOptions {
                    embed: Some(Embed {
                        title: "Support".to_string(),
                        description: "Open a ticket and staff will get back to you.".to_string(),
                        ..Default::default()
                    }),
                    controls: vec![Control::OpenTicket],
                    mention_role: None,
                },
            )
            .await
    }

    /// Post the open/closed ticket counts in `channel`. Staff only.
    #[instrument(skip(self))]
    pub async fn stats(&self, channel: ChannelId, actor: UserId) -> Result<()> {
        self.authorize(actor, DeskAction::ViewStats).await?;

        let counts = {
            let db = self.storage();
            db.count_tickets_by_status()?
        };

        self.gateway
            .send_message(
                channel,
                &format!("Tickets: {} open, {} closed.", counts.open, counts.closed),
                SendOptions::default(),
            )
            .await
    }

    /// Post the caller's own tickets in `channel`
    #[instrument(skip(self))]
    pub async fn my_tickets(&self, channel: ChannelId, user: UserId) -> Result<()> {
        let tickets = {
            let db = self.storage();
            db.list_tickets_by_user(user)?
        };

        let content = if tickets.is_empty() {
            "You have no tickets.".to_string()
        } else {
            let mut lines = vec![format!("Your tickets ({}):", tickets.len())];
            for ticket in &tickets {
                lines.push(format!(
                    "#{} - {} ({} priority)",
                    ticket.id, ticket.status, ticket.priority
                ));
            }
            lines.join("\n")
        };

        self.gateway
            .send_message(channel, &content, SendOptions::default())
            .await
    }

    /// Record user activity in a ticket channel. Unknown channels are a
    /// silent no-op.
    pub fn note_activity(&self, channel: ChannelId) -> Result<()> {
        let db = self.storage();
        db.touch_ticket_activity(channel)?;
        Ok(())
    }

    /// Warn every open ticket idle past the guild's auto-close threshold.
    /// Returns the number warned. Warning never closes the ticket.
    #[instrument(skip(self))]
    pub async fn sweep_inactive(&self) -> Result<usize> {
        let (channels, threshold_hours) = {
            let db = self.storage();
            let settings = db.guild_settings(self.config.guild)?;
            let channels = db.list_inactive_open_tickets(settings.auto_close_hours)?;
            (channels, settings.auto_close_hours)
        };

        let mut warned = 0;
        for channel in channels {
            let ticket = {
                let db = self.storage();
                match db.find_ticket_by_channel(channel)? {
                    Some(ticket) => ticket,
                    None => continue,
                }
            };

            let message = format!(
                "This ticket has seen no activity for over {} hours. \
                 Reply to keep it open, or staff can close it.",
                threshold_hours
            );

            if let Err(e) = self
                .gateway
                .send_message(channel, &message, SendOptions::default())
                .await
            {
                warn!(channel = %channel, error = %e, "Failed to deliver inactivity warning");
                continue;
            }

            {
                let db = self.storage();
                db.record_ticket_action(ticket.id, TicketAction::Warned, None)?;
            }
            warned += 1;
        }

        if warned > 0 {
            info!(warned, threshold_hours, "Inactivity sweep complete");
        }

        Ok(warned)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use usher_net::HistoryEntry;

    /// Recording gateway: canned answers, every call logged
    #[derive(Default)]
    pub(crate) struct MockGateway {
        pub admins: Vec<UserId>,
        pub staff: Vec<UserId>,
        pub channel_count: u64,
        pub next_channel: u64,
        pub history: Vec<HistoryEntry>,
        pub calls: Mutex<Vec<GatewayCall>>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum GatewayCall {
        CreateChannel { name: String },
        SendMessage { channel: ChannelId, content: String },
        SendDirectMessage { user: UserId, content: String },
        SendFile { channel: ChannelId, filename: String },
        DeleteChannel { channel: ChannelId },
    }

    impl MockGateway {
        fn record(&self, call: GatewayCall) {
            self.calls.lock().unwrap().push(call);
        }

        pub(crate) fn calls(&self) -> Vec<GatewayCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn create_private_channel(
            &self,
            _category: ChannelId,
            name: &str,
            _allow_users: &[UserId],
            _allow_roles: &[RoleId],
        ) -> Result<ChannelId> {
            self.record(GatewayCall::CreateChannel {
                name: name.to_string(),
            });
            Ok(ChannelId(self.next_channel))
        }

        async fn send_message(
            &self,
            channel: ChannelId,
            content: &str,
            _options: SendOptions,
        ) -> Result<()> {
            self.record(GatewayCall::SendMessage {
                channel,
                content: content.to_string(),
            });
            Ok(())
        }

        async fn send_direct_message(&self, user: UserId, content: &str) -> Result<()> {
            self.record(GatewayCall::SendDirectMessage {
                user,
                content: content.to_string(),
            });
            Ok(())
        }

        async fn send_file(
            &self,
            channel: ChannelId,
            filename: &str,
            _contents: &str,
        ) -> Result<()> {
            self.record(GatewayCall::SendFile {
                channel,
                filename: filename.to_string(),
            });
            Ok(())
        }

        async fn fetch_history(&self, _channel: ChannelId) -> Result<Vec<HistoryEntry>> {
            Ok(self.history.clone())
        }

        async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
            self.record(GatewayCall::DeleteChannel { channel });
            Ok(())
        }

        async fn count_category_channels(&self, _category: ChannelId) -> Result<u64> {
            Ok(self.channel_count)
        }

        async fn has_role(&self, user: UserId, _role: RoleId) -> Result<bool> {
            Ok(self.staff.contains(&user))
        }

        async fn is_admin(&self, user: UserId) -> Result<bool> {
            Ok(self.admins.contains(&user))
        }
    }

    pub(crate) const GUILD: GuildId = GuildId(1);
    pub(crate) const CATEGORY: ChannelId = ChannelId(10);
    pub(crate) const STAFF_ROLE: RoleId = RoleId(20);
    pub(crate) const TRANSCRIPTS: ChannelId = ChannelId(30);
    pub(crate) const MEMBER: UserId = UserId(100);
    pub(crate) const STAFF: UserId = UserId(200);
    pub(crate) const STAFF_2: UserId = UserId(201);
    pub(crate) const ADMIN: UserId = UserId(300);

    pub(crate) fn desk_config() -> DeskConfig {
        DeskConfig {
            guild: GUILD,
            ticket_category: Some(CATEGORY),
            staff_role: Some(STAFF_ROLE),
            transcript_channel: Some(TRANSCRIPTS),
            close_grace: Duration::ZERO,
        }
    }

    pub(crate) fn mock_gateway() -> MockGateway {
        MockGateway {
            admins: vec![ADMIN],
            staff: vec![STAFF, STAFF_2],
            next_channel: 50,
            ..Default::default()
        }
    }

    pub(crate) fn desk_with(gateway: MockGateway, config: DeskConfig) -> (Arc<TicketDesk>, Arc<Mutex<Database>>) {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let desk = Arc::new(TicketDesk::new(Arc::new(gateway), db.clone(), config));
        (desk, db)
    }

    fn ticket_in(db: &Arc<Mutex<Database>>, channel: ChannelId) -> usher_core::Ticket {
        db.lock()
            .unwrap()
            .find_ticket_by_channel(channel)
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_ticket_creates_channel_then_row() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());

        let ticket_id = desk
            .open_ticket(MEMBER, "Broken login", "Cannot sign in", "high")
            .await
            .unwrap();

        let ticket = ticket_in(&db, ChannelId(50));
        assert_eq!(ticket.id, ticket_id);
        assert_eq!(ticket.user_id, MEMBER);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.last_activity, ticket.created_at);
        assert!(ticket.assigned_to.is_none());
    }

    #[tokio::test]
    async fn test_open_ticket_channel_name_and_message() {
        let mut gateway = mock_gateway();
        gateway.channel_count = 3;
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let gateway = Arc::new(gateway);
        let desk = TicketDesk::new(gateway.clone(), db, desk_config());

        desk.open_ticket(MEMBER, "Subject", "Description", "high")
            .await
            .unwrap();

        let calls = gateway.calls();
        assert_eq!(
            calls[0],
            GatewayCall::CreateChannel {
                name: "ticket-4".to_string()
            }
        );
        match &calls[1] {
            GatewayCall::SendMessage { content, .. } => {
                assert!(content.contains("URGENT"));
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_ticket_unconfigured_category_touches_nothing() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let config = DeskConfig {
            ticket_category: None,
            ..desk_config()
        };
        let desk = TicketDesk::new(gateway.clone(), db, config);

        let err = desk
            .open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_ticket_rate_limited() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());

        desk.open_ticket(MEMBER, "First", "one", "medium")
            .await
            .unwrap();

        // Default limit is 1 per hour
        let err = desk
            .open_ticket(MEMBER, "Second", "two", "medium")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));

        // Another user is unaffected
        desk.open_ticket(UserId(101), "Other", "three", "medium")
            .await
            .unwrap();

        let counts = db.lock().unwrap().count_tickets_by_status().unwrap();
        assert_eq!(counts.open, 2);
    }

    #[tokio::test]
    async fn test_unknown_priority_stored_as_medium() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());

        desk.open_ticket(MEMBER, "Subject", "Description", "ALTA")
            .await
            .unwrap();

        assert_eq!(ticket_in(&db, ChannelId(50)).priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_assign_requires_staff() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        let err = desk.assign(ChannelId(50), MEMBER).await.unwrap_err();
        match err {
            Error::Unauthorized(msg) => assert!(msg.contains("Member")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(ticket_in(&db, ChannelId(50)).assigned_to.is_none());
    }

    #[tokio::test]
    async fn test_assign_closed_ticket_rejected() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();
        desk.assign(ChannelId(50), STAFF).await.unwrap();
        desk.close(ChannelId(50), STAFF).await.unwrap();

        // A stray assign control pressed after close changes nothing
        let err = desk.assign(ChannelId(50), STAFF_2).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(ticket_in(&db, ChannelId(50)).assigned_to, Some(STAFF));
    }

    #[tokio::test]
    async fn test_assign_and_reassign() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        desk.assign(ChannelId(50), STAFF).await.unwrap();
        assert_eq!(ticket_in(&db, ChannelId(50)).assigned_to, Some(STAFF));

        desk.assign(ChannelId(50), STAFF_2).await.unwrap();
        assert_eq!(ticket_in(&db, ChannelId(50)).assigned_to, Some(STAFF_2));
    }

    #[tokio::test]
    async fn test_assign_unknown_channel() {
        let (desk, _db) = desk_with(mock_gateway(), desk_config());

        let err = desk.assign(ChannelId(999), STAFF).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_close_once_with_transcript() {
        let mut gateway = mock_gateway();
        gateway.history = vec![HistoryEntry {
            timestamp: Utc::now(),
            author: "alice".to_string(),
            content: "hello".to_string(),
        }];
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let gateway = Arc::new(gateway);
        let desk = TicketDesk::new(gateway.clone(), db.clone(), desk_config());

        let ticket_id = desk
            .open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();
        desk.close(ChannelId(50), STAFF).await.unwrap();

        let ticket = ticket_in(&db, ChannelId(50));
        assert_eq!(ticket.status, TicketStatus::Closed);

        let calls = gateway.calls();
        assert!(calls.contains(&GatewayCall::SendFile {
            channel: TRANSCRIPTS,
            filename: format!("ticket-{}.txt", ticket_id),
        }));
        assert!(calls.contains(&GatewayCall::DeleteChannel {
            channel: ChannelId(50)
        }));

        // Second close finds no open ticket and produces no second
        // transcript
        let err = desk.close(ChannelId(50), STAFF).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let transcripts = gateway
            .calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::SendFile { .. }))
            .count();
        assert_eq!(transcripts, 1);
    }

    #[tokio::test]
    async fn test_close_without_transcript_channel() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let config = DeskConfig {
            transcript_channel: None,
            ..desk_config()
        };
        let desk = TicketDesk::new(gateway.clone(), db.clone(), config);

        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();
        desk.close(ChannelId(50), STAFF).await.unwrap();

        assert_eq!(ticket_in(&db, ChannelId(50)).status, TicketStatus::Closed);
        assert!(!gateway
            .calls()
            .iter()
            .any(|c| matches!(c, GatewayCall::SendFile { .. })));
    }

    #[tokio::test]
    async fn test_close_requires_staff() {
        let (desk, db) = desk_with(mock_gateway(), desk_config());
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        let err = desk.close(ChannelId(50), MEMBER).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(ticket_in(&db, ChannelId(50)).status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_panel_admin_only() {
        let (desk, _db) = desk_with(mock_gateway(), desk_config());

        let err = desk.post_panel(ChannelId(5), STAFF).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        desk.post_panel(ChannelId(5), ADMIN).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_gated_and_counted() {
        let mut gateway = mock_gateway();
        gateway.next_channel = 50;
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let gateway = Arc::new(gateway);
        let desk = TicketDesk::new(gateway.clone(), db.clone(), desk_config());

        // Three tickets from distinct users, one closed
        desk.open_ticket(UserId(100), "a", "a", "low").await.unwrap();
        {
            // Distinct channels per ticket
            let db = db.lock().unwrap();
            db.create_ticket(UserId(101), ChannelId(51), Priority::Low)
                .unwrap();
            db.create_ticket(UserId(102), ChannelId(52), Priority::Low)
                .unwrap();
            db.set_ticket_status(ChannelId(52), TicketStatus::Closed)
                .unwrap();
        }

        let err = desk.stats(ChannelId(5), MEMBER).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        desk.stats(ChannelId(5), STAFF).await.unwrap();
        let last = gateway.calls().pop().unwrap();
        match last {
            GatewayCall::SendMessage { content, .. } => {
                assert_eq!(content, "Tickets: 2 open, 1 closed.");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_my_tickets_lists_own() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let desk = TicketDesk::new(gateway.clone(), db.clone(), desk_config());

        desk.open_ticket(MEMBER, "Subject", "Description", "low")
            .await
            .unwrap();

        desk.my_tickets(ChannelId(5), MEMBER).await.unwrap();
        match gateway.calls().pop().unwrap() {
            GatewayCall::SendMessage { content, .. } => {
                assert!(content.contains("#1"));
                assert!(content.contains("low priority"));
            }
            other => panic!("unexpected call: {:?}", other),
        }

        desk.my_tickets(ChannelId(5), UserId(999)).await.unwrap();
        match gateway.calls().pop().unwrap() {
            GatewayCall::SendMessage { content, .. } => {
                assert_eq!(content, "You have no tickets.");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_note_activity_unknown_channel_is_noop() {
        let (desk, _db) = desk_with(mock_gateway(), desk_config());
        desk.note_activity(ChannelId(999)).unwrap();
    }

    #[tokio::test]
    async fn test_sweep_warns_idle_tickets() {
        let gateway = Arc::new(mock_gateway());
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let desk = TicketDesk::new(gateway.clone(), db.clone(), desk_config());

        // Threshold of zero hours makes any existing ticket idle
        {
            let db = db.lock().unwrap();
            let mut settings = usher_core::GuildSettings::defaults_for(GUILD);
            settings.auto_close_hours = 0;
            db.save_guild_settings(&settings).unwrap();
        }

        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        let warned = desk.sweep_inactive().await.unwrap();
        assert_eq!(warned, 1);

        // Warning does not close the ticket
        assert_eq!(ticket_in(&db, ChannelId(50)).status, TicketStatus::Open);

        let last = gateway.calls().pop().unwrap();
        match last {
            GatewayCall::SendMessage { channel, content } => {
                assert_eq!(channel, ChannelId(50));
                assert!(content.contains("no activity"));
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sweep_skips_active_tickets() {
        let (desk, _db) = desk_with(mock_gateway(), desk_config());

        // Default threshold is 48 hours; a fresh ticket is not idle
        desk.open_ticket(MEMBER, "Subject", "Description", "medium")
            .await
            .unwrap();

        assert_eq!(desk.sweep_inactive().await.unwrap(), 0);
    }
}
