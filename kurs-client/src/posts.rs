use std::collections::HashMap;

use crate::{
    api::{ApiPost, PostId, Time},
    optimistic::{self, UndoToken},
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub id: PostId,
    pub author_name: String,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: Time,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
}

impl From<ApiPost> for PostData {
    fn from(p: ApiPost) -> PostData {
        PostData {
            id: p.id,
            author_name: p.user.display_name,
            author_username: p.user.username,
            author_avatar_url: p.user.profile_picture_url,
            content: p.content,
            created_at: p.created_at,
            like_count: p.like_count,
            comment_count: p.comment_count,
            is_liked: p.is_liked,
        }
    }
}

/// A feed of posts, newest first
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PostsState {
    by_id: HashMap<PostId, PostData>,
    feed_ids: Vec<PostId>,
}

impl PostsState {
    pub fn new() -> PostsState {
        PostsState::default()
    }

    pub fn get(&self, id: &PostId) -> Option<&PostData> {
        self.by_id.get(id)
    }

    pub fn feed(&self) -> impl Iterator<Item = &PostData> {
        self.feed_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn apply_fetched_page(&mut self, posts: Vec<ApiPost>, is_first_page: bool) {
        if is_first_page {
            self.by_id.clear();
            self.feed_ids.clear();
        }
        for p in posts {
            if !self.by_id.contains_key(&p.id) {
                self.feed_ids.push(p.id);
            }
            self.by_id.insert(p.id, PostData::from(p));
        }
    }

    pub fn insert_created(&mut self, p: ApiPost) {
        if !self.by_id.contains_key(&p.id) {
            self.feed_ids.insert(0, p.id);
        }
        self.by_id.insert(p.id, PostData::from(p));
    }

    pub fn update(&mut self, p: ApiPost) {
        match self.by_id.get_mut(&p.id) {
            None => tracing::debug!(id = ?p.id, "ignoring update of unknown post"),
            Some(existing) => *existing = PostData::from(p),
        }
    }

    pub fn remove(&mut self, id: PostId) -> Option<PostData> {
        self.feed_ids.retain(|f| *f != id);
        self.by_id.remove(&id)
    }

    /// Tracks comments created (+1) or deleted (-1) on `id`
    pub fn adjust_comment_count(&mut self, id: PostId, delta: i64) {
        if let Some(p) = self.by_id.get_mut(&id) {
            p.comment_count += delta;
        }
    }

    pub fn toggle_like(&mut self, id: PostId) -> Option<UndoToken<PostId>> {
        let p = self.by_id.get_mut(&id)?;
        Some(optimistic::toggle(id, &mut p.is_liked, &mut p.like_count))
    }

    pub fn commit(&self, tok: UndoToken<PostId>) {
        tracing::trace!(id = ?tok.id(), liked = tok.liked(), "like confirmed");
    }

    pub fn rollback(&mut self, tok: UndoToken<PostId>) {
        if let Some(p) = self.by_id.get_mut(&tok.id()) {
            optimistic::undo(&tok, &mut p.is_liked, &mut p.like_count);
        }
    }
}
