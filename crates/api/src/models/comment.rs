//! Product comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoe_store_core::{CommentId, ProductId, UserId};

/// A comment with its author's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
    pub product_id: ProductId,
}

/// Body of comment create/update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub content: String,
}

impl CommentInput {
    /// Trimmed content.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when the content is blank.
    pub fn content(&self) -> Result<&str, &'static str> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err("Comment content cannot be empty");
        }
        Ok(content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_trimmed() {
        let input = CommentInput {
            content: "  Great fit  ".to_owned(),
        };
        assert_eq!(input.content().unwrap(), "Great fit");
    }

    #[test]
    fn test_blank_content_rejected() {
        let input: CommentInput = serde_json::from_str("{}").unwrap();
        assert!(input.content().is_err());
    }
}
