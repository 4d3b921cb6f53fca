//! Decides which channel posts count toward statistics.

use alertstat_common::Message;

/// Tag marking curated "useful information" posts.
pub const USEFUL_TAG: &str = "#полезное";

/// Tag marking generated statistics posts. Reports carry it so they never
/// feed back into later scans.
pub const STATISTICS_TAG: &str = "#статистика";

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Counts toward statistics.
    Accepted,
    /// The source provided no timestamp.
    MissingTimestamp,
    /// A forward of another post.
    Forwarded,
    /// No text after trimming.
    EmptyText,
    /// Carries one of the reserved marker tags.
    Tagged(&'static str),
}

impl Classification {
    /// Whether the message counts.
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Pure predicate over messages.
#[derive(Debug, Clone)]
pub struct MessageClassifier {
    excluded_tags: Vec<&'static str>,
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self {
            excluded_tags: vec![USEFUL_TAG, STATISTICS_TAG],
        }
    }
}

impl MessageClassifier {
    /// Classifier excluding both reserved tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a message, reporting the first failed rule.
    pub fn classify(&self, message: &Message) -> Classification {
        if message.timestamp.is_none() {
            return Classification::MissingTimestamp;
        }
        if message.is_forwarded {
            return Classification::Forwarded;
        }
        if message.text.trim().is_empty() {
            return Classification::EmptyText;
        }
        if let Some(tag) = self
            .excluded_tags
            .iter()
            .copied()
            .find(|tag| message.text.contains(tag))
        {
            return Classification::Tagged(tag);
        }
        Classification::Accepted
    }

    /// Whether a message counts toward statistics.
    pub fn accepts(&self, message: &Message) -> bool {
        self.classify(message).is_accepted()
    }
}
