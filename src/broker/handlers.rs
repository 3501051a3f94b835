//! Queue handlers. Placeholders today: each logs receipt and succeeds,
//! which acknowledges the delivery. Real persistence logic slots in here
//! without touching the broker plumbing.

use async_trait::async_trait;
use tracing::info;

use super::consumer::{MessageHandler, ProcessingError};

pub struct ResumeUpdateHandler;

#[async_trait]
impl MessageHandler for ResumeUpdateHandler {
    fn name(&self) -> &'static str {
        "resume-update"
    }

    async fn handle(&self, payload: serde_json::Value) -> Result<(), ProcessingError> {
        info!("Received resume update: {}", payload);
        Ok(())
    }
}

pub struct NotificationHandler;

#[async_trait]
impl MessageHandler for NotificationHandler {
    fn name(&self) -> &'static str {
        "resume-notification"
    }

    async fn handle(&self, payload: serde_json::Value) -> Result<(), ProcessingError> {
        info!("Received notification: {}", payload);
        Ok(())
    }
}

pub struct ActivityHandler;

#[async_trait]
impl MessageHandler for ActivityHandler {
    fn name(&self) -> &'static str {
        "user-activity"
    }

    async fn handle(&self, payload: serde_json::Value) -> Result<(), ProcessingError> {
        info!("Received user activity: {}", payload);
        Ok(())
    }
}
