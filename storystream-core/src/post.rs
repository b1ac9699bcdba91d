use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: &str, author: &str, text: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("c{}-{}", post_id, now.timestamp_millis()),
            author: author.to_owned(),
            text: text.to_owned(),
            timestamp: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Human-readable date, fixed when the post was created.
    pub date: String,
    pub excerpt: String,
    /// Rendered markup.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Post {
    /// Copy of this post with `comment` appended.
    pub fn with_comment(&self, comment: Comment) -> Self {
        let mut comments = self.comments.clone();
        comments.push(comment);
        Self {
            comments,
            ..self.clone()
        }
    }

    /// Copy of this post with one more `emoji` reaction.
    ///
    /// An emoji already present keeps its position and gains one; a new emoji
    /// is appended with a count of 1.
    pub fn with_reaction(&self, emoji: &str) -> Self {
        let mut reactions = self.reactions.clone();
        match reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(existing) => existing.count += 1,
            None => reactions.push(Reaction {
                emoji: emoji.to_owned(),
                count: 1,
            }),
        }
        Self {
            reactions,
            ..self.clone()
        }
    }

    pub fn reaction_count(&self, emoji: &str) -> u32 {
        self.reactions
            .iter()
            .find(|r| r.emoji == emoji)
            .map(|r| r.count)
            .unwrap_or(0)
    }
}
