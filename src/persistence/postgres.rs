//! PostgreSQL implementation of the document store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{Collection, StoredDocument};
use crate::config::HubConfig;
use crate::domain::{Event, EventId, User};
use crate::error::HubError;

/// PostgreSQL-backed document store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresDocuments {
    pool: PgPool,
}

impl PostgresDocuments {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from the configured database settings and
    /// applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] if the database cannot be
    /// reached or a migration fails.
    pub async fn connect(config: &HubConfig) -> Result<Self, HubError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Inserts or replaces an event document.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &Event) -> Result<(), HubError> {
        self.upsert(Collection::Events, *event.id.as_uuid(), event).await
    }

    /// Deletes an event document. Deleting a missing document is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] on database failure.
    pub async fn delete_event(&self, id: EventId) -> Result<(), HubError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Collection::Events.table());
        sqlx::query(&sql)
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Loads every event document.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] on database failure.
    pub async fn load_events(&self) -> Result<Vec<Event>, HubError> {
        self.load_all(Collection::Events).await
    }

    /// Inserts or replaces a user document.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] on database failure.
    pub async fn save_user(&self, user: &User) -> Result<(), HubError> {
        self.upsert(Collection::Users, *user.id.as_uuid(), user).await
    }

    /// Loads every user document.
    ///
    /// # Errors
    ///
    /// Returns a [`HubError::PersistenceError`] on database failure.
    pub async fn load_users(&self) -> Result<Vec<User>, HubError> {
        self.load_all(Collection::Users).await
    }

    async fn upsert<T: Serialize>(
        &self,
        collection: Collection,
        id: Uuid,
        entity: &T,
    ) -> Result<(), HubError> {
        let body =
            serde_json::to_value(entity).map_err(|e| HubError::Internal(e.to_string()))?;
        let sql = format!(
            "INSERT INTO {} (id, body, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
            collection.table()
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn fetch_all(&self, collection: Collection) -> Result<Vec<StoredDocument>, HubError> {
        let sql = format!(
            "SELECT id, body, updated_at FROM {} ORDER BY updated_at ASC",
            collection.table()
        );
        let rows = sqlx::query_as::<_, (Uuid, serde_json::Value, DateTime<Utc>)>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HubError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, body, updated_at)| StoredDocument {
                id,
                body,
                updated_at,
            })
            .collect())
    }

    /// Documents that no longer deserialize are skipped with a warning so
    /// one bad row cannot block startup.
    async fn load_all<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, HubError> {
        let docs = self.fetch_all(collection).await?;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<T>(doc.body) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    tracing::warn!(
                        table = collection.table(),
                        id = %doc.id,
                        error = %e,
                        "skipping unreadable document"
                    );
                }
            }
        }
        Ok(entities)
    }
}
