// Sentence entity and group derivation.
//
// Groups have no storage of their own: a group exists while at least one
// sentence carries its name in the `group` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SentenceId = u64;

/// A sentence as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: SentenceId,
    pub content: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub copy_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sentence {
    pub fn new(id: SentenceId, content: impl Into<String>, group: impl Into<String>) -> Self {
        Sentence {
            id,
            content: content.into(),
            group: group.into(),
            copy_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    /// The group this sentence belongs to, treating an empty tag as the
    /// default group.
    pub fn group_or<'a>(&'a self, default_group: &'a str) -> &'a str {
        if self.group.is_empty() {
            default_group
        } else {
            &self.group
        }
    }
}

/// Body of `POST /api/sentences`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSentence {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Body of `PUT /api/sentences/:id`. `None` fields are left unchanged by the
/// backend and are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SentenceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl SentenceUpdate {
    pub fn regroup(group: impl Into<String>) -> Self {
        SentenceUpdate {
            content: None,
            group: Some(group.into()),
        }
    }
}

/// Which sentences the card list shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Named(String),
}

impl GroupFilter {
    pub fn matches(&self, sentence: &Sentence, default_group: &str) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Named(name) => sentence.group_or(default_group) == name,
        }
    }

    pub fn group_name(&self) -> Option<&str> {
        match self {
            GroupFilter::All => None,
            GroupFilter::Named(name) => Some(name),
        }
    }
}

/// Distinct group names in order of first appearance.
pub fn groups(sentences: &[Sentence], default_group: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for sentence in sentences {
        let name = sentence.group_or(default_group);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Sentences tagged with `group`.
pub fn members<'a>(
    sentences: &'a [Sentence],
    group: &'a str,
    default_group: &'a str,
) -> impl Iterator<Item = &'a Sentence> + 'a {
    sentences
        .iter()
        .filter(move |s| s.group_or(default_group) == group)
}

/// Sentences matching `filter`, in list order.
pub fn filtered<'a>(
    sentences: &'a [Sentence],
    filter: &'a GroupFilter,
    default_group: &'a str,
) -> Vec<&'a Sentence> {
    sentences
        .iter()
        .filter(|s| filter.matches(s, default_group))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
