use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tokio::time::timeout;
use tracing::info;

use super::Store;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{AvgVoteResult, Session, Vote};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_SESSIONS: &str = "CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    expire_at  TIMESTAMPTZ NOT NULL
)";

const CREATE_VOTES: &str = "CREATE TABLE IF NOT EXISTS votes (
    session_id TEXT NOT NULL,
    product_id TEXT NOT NULL,
    score      INTEGER NOT NULL,
    PRIMARY KEY (session_id, product_id)
)";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects, pings and bootstraps the tables. No retries: any failure
    /// here is meant to abort startup.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(&config.uri)
            .map_err(|e| StoreError::backend("cannot connect to postgres", e))?
            .database(&config.database);

        let pool = timeout(
            CONNECT_TIMEOUT,
            PgPoolOptions::new()
                .acquire_timeout(CONNECT_TIMEOUT)
                .connect_with(options),
        )
        .await
        .map_err(|e| StoreError::backend("cannot connect to postgres", e))?
        .map_err(|e| StoreError::backend("cannot connect to postgres", e))?;

        timeout(config.ping_timeout, sqlx::query("SELECT 1").execute(&pool))
            .await
            .map_err(|e| StoreError::backend("pinging failed", e))?
            .map_err(|e| StoreError::backend("pinging failed", e))?;

        info!(database = %config.database, "Connected to postgres");

        let store = Self { pool };
        store.ensure_schema().await?;

        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in [CREATE_SESSIONS, CREATE_VOTES] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::backend("cannot create tables", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn store_session(
        &self,
        session_id: &str,
        expire_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        sqlx::query("INSERT INTO sessions (session_id, expire_at) VALUES ($1, $2)")
            .bind(session_id)
            .bind(expire_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("cannot insert session", e))?;

        Ok(Session {
            session_id: session_id.to_string(),
            expire_at,
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        sqlx::query_as::<_, Session>(
            "SELECT session_id, expire_at FROM sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("cannot find session", e))
    }

    async fn upsert_vote(
        &self,
        session_id: &str,
        product_id: &str,
        score: i32,
    ) -> Result<Vote, StoreError> {
        sqlx::query(
            "INSERT INTO votes (session_id, product_id, score) VALUES ($1, $2, $3)
             ON CONFLICT (session_id, product_id) DO UPDATE SET score = EXCLUDED.score",
        )
        .bind(session_id)
        .bind(product_id)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("cannot upsert vote", e))?;

        Ok(Vote {
            session_id: session_id.to_string(),
            product_id: product_id.to_string(),
            score,
        })
    }

    async fn get_session_votes(&self, session_id: &str) -> Result<Vec<Vote>, StoreError> {
        sqlx::query_as::<_, Vote>(
            "SELECT session_id, product_id, score FROM votes WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("cannot list votes", e))
    }

    async fn get_avg_product_votes(
        &self,
        product_id: &str,
    ) -> Result<Option<AvgVoteResult>, StoreError> {
        // filter -> group (avg + count in one pass) -> shape
        sqlx::query_as::<_, AvgVoteResult>(
            "SELECT AVG(score)::FLOAT8 AS avg, COUNT(*) AS vote_count, product_id
             FROM votes
             WHERE product_id = $1
             GROUP BY product_id",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("cannot aggregate votes", e))
    }
}
