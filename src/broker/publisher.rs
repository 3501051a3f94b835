use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::topology::{
    EXCHANGE_RESUME, EXCHANGE_USER, KEY_RESUME_NOTIFICATION, KEY_RESUME_UPDATE, KEY_USER_ACTIVITY,
};
use super::{BrokerError, BrokerService};

#[derive(Debug, Clone, Copy)]
enum ResumeEvent {
    Updated,
    Deleted,
}

impl ResumeEvent {
    fn kind(self) -> &'static str {
        match self {
            ResumeEvent::Updated => "RESUME_UPDATE",
            ResumeEvent::Deleted => "RESUME_DELETE",
        }
    }

    fn notification(self) -> &'static str {
        match self {
            ResumeEvent::Updated => "Your resume has been updated",
            ResumeEvent::Deleted => "Your resume has been deleted",
        }
    }
}

/// Emits the per-mutation message fanout.
///
/// The publishes are sequential and independent: a failure part-way through
/// is surfaced to the caller but neither rolled back nor retried, and the
/// database write that triggered it stands.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<BrokerService>,
}

impl EventPublisher {
    pub fn new(broker: Arc<BrokerService>) -> Self {
        Self { broker }
    }

    pub async fn resume_updated(&self, user_id: i64, content: &Value) -> Result<(), BrokerError> {
        self.broker
            .publish(
                EXCHANGE_RESUME,
                KEY_RESUME_UPDATE,
                &update_payload(user_id, content),
            )
            .await?;
        self.broker
            .publish(
                EXCHANGE_RESUME,
                KEY_RESUME_NOTIFICATION,
                &notification_payload(user_id, ResumeEvent::Updated),
            )
            .await?;
        self.broker
            .publish(
                EXCHANGE_USER,
                KEY_USER_ACTIVITY,
                &activity_payload(user_id, ResumeEvent::Updated, Utc::now()),
            )
            .await?;
        Ok(())
    }

    pub async fn resume_deleted(&self, user_id: i64) -> Result<(), BrokerError> {
        self.broker
            .publish(
                EXCHANGE_RESUME,
                KEY_RESUME_NOTIFICATION,
                &notification_payload(user_id, ResumeEvent::Deleted),
            )
            .await?;
        self.broker
            .publish(
                EXCHANGE_USER,
                KEY_USER_ACTIVITY,
                &activity_payload(user_id, ResumeEvent::Deleted, Utc::now()),
            )
            .await?;
        Ok(())
    }
}

fn update_payload(user_id: i64, content: &Value) -> Value {
    json!({
        "userId": user_id,
        "resumeData": content,
    })
}

fn notification_payload(user_id: i64, event: ResumeEvent) -> Value {
    json!({
        "userId": user_id,
        "type": event.kind(),
        "content": event.notification(),
    })
}

fn activity_payload(user_id: i64, event: ResumeEvent, at: DateTime<Utc>) -> Value {
    json!({
        "userId": user_id,
        "activity": event.kind(),
        "timestamp": at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_shape() {
        let content = json!({"summary": "hello"});
        let payload = update_payload(7, &content);
        assert_eq!(payload["userId"], 7);
        assert_eq!(payload["resumeData"], content);
    }

    #[test]
    fn notification_payload_shape() {
        let payload = notification_payload(7, ResumeEvent::Updated);
        assert_eq!(payload["userId"], 7);
        assert_eq!(payload["type"], "RESUME_UPDATE");
        assert_eq!(payload["content"], "Your resume has been updated");

        let payload = notification_payload(7, ResumeEvent::Deleted);
        assert_eq!(payload["type"], "RESUME_DELETE");
        assert_eq!(payload["content"], "Your resume has been deleted");
    }

    #[test]
    fn activity_payload_carries_rfc3339_timestamp() {
        let at = Utc::now();
        let payload = activity_payload(7, ResumeEvent::Updated, at);
        assert_eq!(payload["userId"], 7);
        assert_eq!(payload["activity"], "RESUME_UPDATE");
        assert_eq!(payload["timestamp"], at.to_rfc3339());
    }
}
