use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub owner: UserId,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Trip {
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner,
            title: title.into(),
            started_at: Utc::now(),
            ended_at: None,
            notes: None,
        }
    }
}
