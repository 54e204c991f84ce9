use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::TimeZone;
use kurs_api::{
    ApiComment, ApiRate, ApiUser, CommentApi, CommentId, CommentPage, Error, NewComment, PostId,
    RateApi, Time,
};

const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory backend for a single logged-in user
pub struct MockServer {
    user: ApiUser,
    comments: BTreeMap<CommentId, StoredComment>,
    rates: Vec<ApiRate>,
    next_id: i64,
    clock: Time,
    page_size: usize,
    fail_next: Option<Error>,
}

#[derive(Debug)]
struct StoredComment {
    post_id: PostId,
    parent_id: Option<CommentId>,
    user: ApiUser,
    content: String,
    created_at: Time,
    like_count: i64,
    liked: bool,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            user: ApiUser {
                display_name: String::from("Test User"),
                username: String::from("test"),
                profile_picture_url: None,
            },
            comments: BTreeMap::new(),
            rates: Vec::new(),
            next_id: 1,
            clock: chrono::Utc
                .timestamp_opt(1_700_000_000, 0)
                .single()
                .expect("valid mock server start time"),
            page_size: DEFAULT_PAGE_SIZE,
            fail_next: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> MockServer {
        self.page_size = page_size.max(1);
        self
    }

    /// Makes the next request fail with `err`, without side effects
    pub fn fail_next(&mut self, err: Error) {
        self.fail_next = Some(err);
    }

    /// Stores a comment written by someone else, bypassing failure injection
    pub fn test_add_comment(
        &mut self,
        post_id: PostId,
        parent_id: Option<CommentId>,
        author: &str,
        content: &str,
    ) -> CommentId {
        let user = ApiUser {
            display_name: author.to_string(),
            username: author.to_lowercase(),
            profile_picture_url: None,
        };
        self.store(post_id, parent_id, user, content.to_string())
    }

    /// Returns the comment with its replies, as the backend would send it
    pub fn test_get_comment(&self, id: CommentId) -> Option<ApiComment> {
        self.comments.contains_key(&id).then(|| self.nested(id))
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    pub fn test_rates(&self) -> &[ApiRate] {
        &self.rates
    }

    fn take_failure(&mut self) -> Result<(), Error> {
        match self.fail_next.take() {
            Some(err) => {
                tracing::debug!(%err, "injecting failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn store(
        &mut self,
        post_id: PostId,
        parent_id: Option<CommentId>,
        user: ApiUser,
        content: String,
    ) -> CommentId {
        let id = CommentId(self.next_id);
        self.next_id += 1;
        self.clock += chrono::Duration::minutes(1);
        self.comments.insert(
            id,
            StoredComment {
                post_id,
                parent_id,
                user,
                content,
                created_at: self.clock,
                like_count: 0,
                liked: false,
            },
        );
        id
    }

    fn children(&self, id: CommentId) -> Vec<CommentId> {
        self.comments
            .iter()
            .filter(|(_, c)| c.parent_id == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    /// Panics if `id` is not stored
    fn nested(&self, id: CommentId) -> ApiComment {
        let c = &self.comments[&id];
        let replies = self
            .children(id)
            .into_iter()
            .map(|r| self.nested(r))
            .collect::<Vec<_>>();
        ApiComment {
            id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            user: c.user.clone(),
            content: c.content.clone(),
            created_at: c.created_at,
            like_count: c.like_count,
            reply_count: replies.len() as i64,
            is_liked: c.liked,
            replies,
        }
    }

    fn validate_content(content: &str) -> Result<(), Error> {
        match content.trim().is_empty() {
            true => Err(Error::InvalidInput(String::from("comment cannot be empty"))),
            false => Ok(()),
        }
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentApi for MockServer {
    async fn fetch_comments(&mut self, post: PostId, page: u32) -> Result<CommentPage, Error> {
        self.take_failure()?;
        if page == 0 {
            return Err(Error::InvalidInput(String::from("pages start at 1")));
        }
        // ids grow with time, so newest first is highest id first
        let top_level = self
            .comments
            .iter()
            .rev()
            .filter(|(_, c)| c.post_id == post && c.parent_id.is_none())
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        let start = (page as usize - 1) * self.page_size;
        let results = top_level
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|id| self.nested(*id))
            .collect();
        let next =
            (start + self.page_size < top_level.len()).then(|| format!("?page={}", page + 1));
        Ok(CommentPage { results, next })
    }

    async fn create_comment(&mut self, c: NewComment) -> Result<ApiComment, Error> {
        self.take_failure()?;
        Self::validate_content(&c.content)?;
        if let Some(parent) = c.parent_id {
            match self.comments.get(&parent) {
                Some(p) if p.post_id == c.post_id => (),
                _ => return Err(Error::comment_not_found(parent)),
            }
        }
        let user = self.user.clone();
        let id = self.store(c.post_id, c.parent_id, user, c.content);
        Ok(self.nested(id))
    }

    async fn update_comment(
        &mut self,
        id: CommentId,
        content: String,
    ) -> Result<ApiComment, Error> {
        self.take_failure()?;
        Self::validate_content(&content)?;
        let c = self
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::comment_not_found(id))?;
        c.content = content;
        Ok(self.nested(id))
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        self.take_failure()?;
        if !self.comments.contains_key(&id) {
            return Err(Error::comment_not_found(id));
        }
        let mut to_remove = vec![id];
        while let Some(next) = to_remove.pop() {
            to_remove.extend(self.children(next));
            self.comments.remove(&next);
        }
        Ok(())
    }

    async fn set_comment_liked(&mut self, id: CommentId, liked: bool) -> Result<(), Error> {
        self.take_failure()?;
        let c = self
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::comment_not_found(id))?;
        if c.liked != liked {
            c.liked = liked;
            c.like_count += if liked { 1 } else { -1 };
        }
        Ok(())
    }
}

#[async_trait]
impl RateApi for MockServer {
    async fn fetch_rates(&mut self) -> Result<Vec<ApiRate>, Error> {
        self.take_failure()?;
        Ok(self.rates.clone())
    }

    async fn save_rate(&mut self, r: ApiRate) -> Result<ApiRate, Error> {
        self.take_failure()?;
        if r.currency_code.trim().is_empty() {
            return Err(Error::InvalidInput(String::from("currency code is required")));
        }
        let valid = |v: f64| v.is_finite() && v >= 0.;
        if !valid(r.buy_rate) || !valid(r.sell_rate) {
            return Err(Error::InvalidInput(String::from(
                "rates must be non-negative numbers",
            )));
        }
        match self
            .rates
            .iter_mut()
            .find(|q| q.currency_code == r.currency_code)
        {
            Some(q) => *q = r.clone(),
            None => self.rates.push(r.clone()),
        }
        Ok(r)
    }

    async fn delete_rate(&mut self, currency_code: &str) -> Result<(), Error> {
        self.take_failure()?;
        let pos = self
            .rates
            .iter()
            .position(|r| r.currency_code == currency_code)
            .ok_or_else(|| Error::rate_not_found(currency_code))?;
        self.rates.remove(pos);
        Ok(())
    }

    async fn clear_rates(&mut self) -> Result<(), Error> {
        self.take_failure()?;
        self.rates.clear();
        Ok(())
    }
}
