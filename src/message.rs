use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::copy::CopyState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Question,
    Answer,
}

/// One conversation turn, as the host keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub id: String,
}

impl Message {
    pub fn question(text: impl Into<String>) -> Self {
        Self::at(Role::Question, text, Utc::now())
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self::at(Role::Answer, text, Utc::now())
    }

    /// Build a message stamped at `timestamp`; the id is its millisecond
    /// timestamp.
    pub fn at(role: Role, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp,
            id: timestamp.timestamp_millis().to_string(),
        }
    }

    /// The answer card for answers. Questions are shown as typed by the
    /// host and are never passed through the renderer.
    pub fn render(&self, config: &Config, state: &CopyState) -> Option<String> {
        match self.role {
            Role::Answer => Some(crate::render_answer(&self.text, config, state)),
            Role::Question => None,
        }
    }
}
