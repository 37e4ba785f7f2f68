//! Support desk: user-to-admin tickets and anonymous exit feedback.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use domains::{
    AppError, ExitFeedback, FeedbackRepo, Message, MessageRepo, MessageStatus, Result,
};

/// Free-text comment cap on exit feedback.
pub const MAX_COMMENT_LEN: usize = 500;

pub struct SupportService {
    messages: Arc<dyn MessageRepo>,
    feedback: Arc<dyn FeedbackRepo>,
}

impl SupportService {
    pub fn new(messages: Arc<dyn MessageRepo>, feedback: Arc<dyn FeedbackRepo>) -> Self {
        Self { messages, feedback }
    }

    // ── Tickets ─────────────────────────────────────────────────────────

    pub async fn contact_admin(&self, user: Uuid, subject: &str, body: &str) -> Result<Message> {
        if subject.trim().is_empty() || body.trim().is_empty() {
            return Err(AppError::Validation("subject and body are required".into()));
        }
        let message = Message {
            id: Uuid::new_v4(),
            user_id: user,
            subject: subject.trim().to_owned(),
            body: body.trim().to_owned(),
            status: MessageStatus::Unread,
            admin_reply: None,
            read_at: None,
            resolved_at: None,
            created_at: Utc::now(),
        };
        self.messages.insert(&message).await?;
        info!(message = %message.id, %user, "support message received");
        Ok(message)
    }

    pub async fn my_messages(&self, user: Uuid) -> Result<Vec<Message>> {
        self.messages.list_by_user(user).await
    }

    pub async fn all_messages(&self) -> Result<Vec<Message>> {
        self.messages.list_all().await
    }

    /// Unread -> Read. Forward-only: anything else is rejected.
    pub async fn mark_read(&self, id: Uuid) -> Result<Message> {
        let message = self.require(id).await?;
        if message.status != MessageStatus::Unread {
            return Err(AppError::Validation(format!(
                "message is already {}",
                message.status
            )));
        }
        self.messages.mark_read(id, Utc::now()).await?;
        self.require(id).await
    }

    /// Unread/Read -> Resolved, optionally with a reply. Tickets are never
    /// re-opened.
    pub async fn resolve(&self, id: Uuid, reply: Option<&str>) -> Result<Message> {
        let message = self.require(id).await?;
        if message.status == MessageStatus::Resolved {
            return Err(AppError::Validation("message is already resolved".into()));
        }
        self.messages.resolve(id, reply, Utc::now()).await?;
        self.require(id).await
    }

    // ── Exit feedback ───────────────────────────────────────────────────

    /// Session-deduplicated insert. Returns `false` when this session already
    /// submitted; a duplicate is benign, not an error. The check-then-insert
    /// race under concurrent duplicates is accepted.
    pub async fn submit_exit_feedback(&self, feedback: ExitFeedback) -> Result<bool> {
        if feedback.session_id.trim().is_empty() {
            return Err(AppError::Validation("sessionId is required".into()));
        }
        if let Some(comment) = &feedback.comment {
            if comment.len() > MAX_COMMENT_LEN {
                return Err(AppError::Validation(format!(
                    "comment must be at most {MAX_COMMENT_LEN} characters"
                )));
            }
        }
        if !(0..=100).contains(&feedback.completion_percent) {
            return Err(AppError::Validation(
                "completionPercent must be between 0 and 100".into(),
            ));
        }
        self.feedback.insert_if_absent(&feedback).await
    }

    pub async fn feedback_exists(&self, session_id: &str) -> Result<bool> {
        self.feedback.exists(session_id).await
    }

    async fn require(&self, id: Uuid) -> Result<Message> {
        self.messages
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message", id.to_string()))
    }
}
