//! Question entity.

use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A poll prompt. `pub_date` gates its visibility on the public pages.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    /// Unique question ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The question text.
    pub text: String,

    /// Publication date. May lie in the future.
    #[sea_orm(indexed)]
    pub pub_date: DateTime<Utc>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::choice::Entity")]
    Choices,
}

impl Related<super::choice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Choices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Returns true iff `pub_date` lies within `[now - 1 day, now]`.
#[must_use]
pub fn published_recently(pub_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - Duration::days(1) <= pub_date && pub_date <= now
}

impl Model {
    /// Whether the question was published within the day before `now`.
    #[must_use]
    pub fn was_published_recently_at(&self, now: DateTime<Utc>) -> bool {
        published_recently(self.pub_date, now)
    }

    /// Whether the question was published within the last day.
    #[must_use]
    pub fn was_published_recently(&self) -> bool {
        self.was_published_recently_at(Utc::now())
    }

    /// Whether the question is visible at `now`.
    #[must_use]
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }
}
