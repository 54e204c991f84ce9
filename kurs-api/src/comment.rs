use crate::{CommentId, PostId, Time};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiUser {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub username: String,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// A comment as the backend sends it, with its replies nested inside
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiComment {
    pub id: CommentId,
    pub post_id: PostId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub user: ApiUser,
    pub content: String,
    pub created_at: Time,
    pub like_count: i64,
    pub reply_count: i64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<ApiComment>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPage {
    pub results: Vec<ApiComment>,

    /// Opaque marker for the following page, absent on the last one
    #[serde(default)]
    pub next: Option<String>,
}

impl CommentPage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
