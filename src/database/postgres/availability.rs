use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::repository::AvailabilityRepository;
use crate::error::Result;
use crate::models::availability::{AvailabilitySlot, NewSlot};

#[async_trait]
impl AvailabilityRepository for PgStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<AvailabilitySlot>> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT id, user_id, weekday, start_time, end_time
            FROM availability_slots
            WHERE user_id = $1
            ORDER BY weekday, start_time
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    async fn replace(&self, user_id: Uuid, slots: Vec<NewSlot>) -> Result<Vec<AvailabilitySlot>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM availability_slots WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(slots.len());
        for slot in slots {
            let row = sqlx::query_as::<_, AvailabilitySlot>(
                r#"
                INSERT INTO availability_slots (user_id, weekday, start_time, end_time)
                VALUES ($1, $2, $3, $4)
                RETURNING id, user_id, weekday, start_time, end_time
                "#,
            )
            .bind(user_id)
            .bind(slot.weekday)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row);
        }

        tx.commit().await?;
        stored.sort_by(|a, b| (a.weekday, a.start_time).cmp(&(b.weekday, b.start_time)));
        Ok(stored)
    }
}
