use async_trait::async_trait;
use chrono::Utc;

mod comment;
pub use comment::{ApiComment, ApiUser, CommentPage, NewComment};

mod error;
pub use error::Error;

mod post;
pub use post::ApiPost;

mod rate;
pub use rate::{ApiRate, Rate};

pub type Time = chrono::DateTime<Utc>;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub i64);

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub i64);

#[async_trait]
pub trait CommentApi {
    /// Pages are numbered from 1, top-level comments come newest first
    async fn fetch_comments(&mut self, post: PostId, page: u32) -> Result<CommentPage, Error>;
    async fn create_comment(&mut self, c: NewComment) -> Result<ApiComment, Error>;
    async fn update_comment(&mut self, id: CommentId, content: String)
        -> Result<ApiComment, Error>;
    /// Also deletes all the replies to this comment
    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error>;
    async fn set_comment_liked(&mut self, id: CommentId, liked: bool) -> Result<(), Error>;
}

#[async_trait]
pub trait RateApi {
    async fn fetch_rates(&mut self) -> Result<Vec<ApiRate>, Error>;
    /// Creates the rate, or replaces the one already quoted for this currency
    async fn save_rate(&mut self, r: ApiRate) -> Result<ApiRate, Error>;
    async fn delete_rate(&mut self, currency_code: &str) -> Result<(), Error>;
    async fn clear_rates(&mut self) -> Result<(), Error>;
}
