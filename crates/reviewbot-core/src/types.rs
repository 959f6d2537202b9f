//! Common types used across the review chatbot

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the review corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Best Character")]
    pub best_character: String,
    /// Kept as the literal cell text; the corpus mixes numbers and words.
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Review")]
    pub review: String,
}

/// Attributes carried alongside a unit but never embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub rating: String,
    pub date: String,
    pub best_character: String,
}

/// A unit stored in the vector index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievableUnit {
    pub id: String,
    pub content: String,
    pub metadata: UnitMetadata,
}

impl RetrievableUnit {
    /// Build the unit for the record at `position` in the corpus
    pub fn from_record(position: usize, record: &Record) -> Self {
        Self {
            id: position.to_string(),
            content: format!("{} {}", record.title, record.review),
            metadata: UnitMetadata {
                rating: record.rating.clone(),
                date: record.date.clone(),
                best_character: record.best_character.clone(),
            },
        }
    }
}

/// A retrieved unit together with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredUnit {
    pub unit: RetrievableUnit,
    pub score: f32,
}

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

impl Role {
    /// Label used when rendering the turn into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Role::Human => "Human",
            Role::Ai => "AI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }
}

/// Identifies one conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    pub const DEFAULT: &'static str = "default";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
