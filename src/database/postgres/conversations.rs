use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::repository::ConversationRepository;
use crate::error::{Error, Result};
use crate::models::conversation::{Conversation, Message, NewConversation};

const CONVERSATION_COLUMNS: &str =
    "id, application_id, candidate_id, recruiter_id, created_at, updated_at";

#[async_trait]
impl ConversationRepository for PgStore {
    async fn open(&self, conversation: NewConversation) -> Result<Conversation> {
        let inserted = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            INSERT INTO conversations (application_id, candidate_id, recruiter_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (application_id) DO NOTHING
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(conversation.application_id)
        .bind(conversation.candidate_id)
        .bind(conversation.recruiter_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(conversation) = inserted {
            return Ok(conversation);
        }

        let existing = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE application_id = $1"
        ))
        .bind(conversation.application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(existing)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE candidate_id = $1 OR recruiter_id = $1
            ORDER BY updated_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(conversations)
    }

    async fn add_message(&self, conversation_id: Uuid, sender_id: Uuid, body: &str) -> Result<Message> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(Error::NotFound("Conversation not found".to_string()));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, conversation_id, sender_id, body, read_at, created_at
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, sender_id, body, read_at, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE conversation_id = $1 AND sender_id <> $2 AND read_at IS NULL
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.candidate_id = $1 OR c.recruiter_id = $1)
              AND m.sender_id <> $1
              AND m.read_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
