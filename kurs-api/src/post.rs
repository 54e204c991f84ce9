use crate::{ApiUser, PostId, Time};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiPost {
    pub id: PostId,
    pub user: ApiUser,
    pub content: String,
    pub created_at: Time,
    pub like_count: i64,
    pub comment_count: i64,
    #[serde(default)]
    pub is_liked: bool,
}
