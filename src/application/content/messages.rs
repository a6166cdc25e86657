use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::RecordStore;
use crate::domain::entities::MessageRecord;

use super::{Collection, ContentError, TARGET, non_blank, required};

/// A contact form submission.
#[derive(Debug, Clone, Default)]
pub struct CreateMessageCommand {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    pub message: String,
}

#[derive(Clone)]
pub struct MessageService {
    records: Collection<MessageRecord>,
}

impl MessageService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            records: Collection::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<MessageRecord>, ContentError> {
        Ok(self.records.list().await?)
    }

    pub async fn submit(&self, command: CreateMessageCommand) -> Result<MessageRecord, ContentError> {
        let record = MessageRecord {
            id: format!("msg-{}", Uuid::new_v4()),
            name: required(&command.name, "name is required")?,
            email: required(&command.email, "email is required")?,
            phone: non_blank(command.phone),
            project_type: non_blank(command.project_type),
            budget: non_blank(command.budget),
            message: required(&command.message, "message is required")?,
            read: false,
            created_at: OffsetDateTime::now_utc(),
            read_at: None,
            read_by: None,
        };
        self.records.put(&record).await?;
        info!(target = TARGET, id = %record.id, "Contact message received");
        Ok(record)
    }

    /// Mark a message read. A message that is already read is returned as is.
    pub async fn mark_read(&self, actor: &str, id: &str) -> Result<MessageRecord, ContentError> {
        let mut record = self.records.load(id).await?;
        if record.read {
            return Ok(record);
        }
        record.read = true;
        record.read_at = Some(OffsetDateTime::now_utc());
        record.read_by = Some(actor.to_string());
        self.records.put(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        self.records.remove(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryStore;

    fn submission() -> CreateMessageCommand {
        CreateMessageCommand {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: Some("  ".into()),
            message: "Need a quote".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn submit_starts_unread() {
        let service = MessageService::new(Arc::new(MemoryStore::new()));

        let message = service.submit(submission()).await.expect("submit");

        assert!(message.id.starts_with("msg-"));
        assert!(!message.read);
        assert_eq!(message.phone, None);
        assert_eq!(service.list().await.expect("list"), vec![message]);
    }

    #[tokio::test]
    async fn submit_requires_body() {
        let service = MessageService::new(Arc::new(MemoryStore::new()));

        let err = service
            .submit(CreateMessageCommand {
                message: " ".into(),
                ..submission()
            })
            .await
            .expect_err("empty message");

        assert_eq!(err.to_string(), "message is required");
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let service = MessageService::new(Arc::new(MemoryStore::new()));
        let message = service.submit(submission()).await.expect("submit");

        let first = service.mark_read("admin-1", &message.id).await.expect("read");
        let second = service.mark_read("admin-2", &message.id).await.expect("again");

        assert!(first.read);
        assert_eq!(second.read_at, first.read_at);
        assert_eq!(second.read_by.as_deref(), Some("admin-1"));
    }
}
