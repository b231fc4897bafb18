//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with the full schema applied, so
//! that tests in dependent crates can exercise real queries.

use std::sync::Arc;

use chrono::{Duration, Utc};
use polls_common::IdGenerator;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{choice, question};
use crate::migrations::Migrator;

/// URL of a private in-memory `SQLite` database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        // Each pooled connection to `sqlite::memory:` would see its own database.
        let mut opt = ConnectOptions::new(IN_MEMORY_URL);
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
            id_gen: IdGenerator::new(),
        })
    }

    /// Get the shared database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Create a question whose `pub_date` is `offset` away from now.
    ///
    /// Use a negative offset for questions published in the past.
    pub async fn create_question(
        &self,
        text: &str,
        offset: Duration,
    ) -> Result<question::Model, DbErr> {
        question::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(text.to_string()),
            pub_date: Set(Utc::now() + offset),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Add a choice to a question.
    pub async fn create_choice(
        &self,
        question_id: &str,
        text: &str,
        votes: i32,
    ) -> Result<choice::Model, DbErr> {
        choice::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question_id.to_string()),
            text: Set(text.to_string()),
            votes: Set(votes),
        }
        .insert(self.conn.as_ref())
        .await
    }
}
