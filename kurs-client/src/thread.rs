use futures::channel::mpsc::UnboundedSender;

use crate::{
    api::{CommentApi, CommentId, Error, NewComment, PostId},
    flatten,
    notice::Notices,
    CommentData, CommentsState, Notice,
};

/// Outcome of a successful `CommentThread::create`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Created {
    pub id: CommentId,
    /// To feed `PostsState::adjust_comment_count`; posts only count
    /// top-level comments
    pub post_comment_delta: i64,
}

/// Outcome of a successful `CommentThread::delete`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deleted {
    /// Comments gone from the thread, replies included
    pub removed: usize,
    pub post_comment_delta: i64,
}

/// The comment section of one post, kept in sync with the server
pub struct CommentThread<A> {
    api: A,
    post: PostId,
    state: CommentsState,
    next_page: Option<u32>,
    notices: Notices,
}

impl<A: CommentApi> CommentThread<A> {
    pub fn new(api: A, post: PostId) -> CommentThread<A> {
        CommentThread {
            api,
            post,
            state: CommentsState::new(),
            next_page: None,
            notices: Notices::default(),
        }
    }

    pub fn with_notices(mut self, sender: UnboundedSender<Notice>) -> CommentThread<A> {
        self.notices = Notices::new(sender);
        self
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn state(&self) -> &CommentsState {
        &self.state
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Reloads the thread from scratch
    pub async fn load_first_page(&mut self) -> Result<(), Error> {
        self.load_page(1).await
    }

    /// Does nothing once the last page was loaded
    pub async fn load_next_page(&mut self) -> Result<(), Error> {
        match self.next_page {
            Some(page) => self.load_page(page).await,
            None => Ok(()),
        }
    }

    async fn load_page(&mut self, page: u32) -> Result<(), Error> {
        let res = match self.api.fetch_comments(self.post, page).await {
            Ok(res) => res,
            Err(err) => return Err(self.failed(err)),
        };
        tracing::debug!(post = ?self.post, page, num = res.results.len(), "fetched comments");
        self.state.apply_fetched_page(flatten(&res.results), page == 1);
        self.next_page = res.has_next().then_some(page + 1);
        Ok(())
    }

    /// Posts a comment, or a reply if `parent` is set
    pub async fn create(
        &mut self,
        parent: Option<CommentId>,
        content: String,
    ) -> Result<Created, Error> {
        let new = NewComment {
            post_id: self.post,
            parent_id: parent,
            content,
        };
        let c = match self.api.create_comment(new).await {
            Ok(c) => c,
            Err(err) => return Err(self.failed(err)),
        };
        let created = Created {
            id: c.id,
            post_comment_delta: if parent.is_none() { 1 } else { 0 },
        };
        self.state.insert_created(CommentData::from_api(&c));
        self.notices.success("Comment posted");
        Ok(created)
    }

    pub async fn edit(&mut self, id: CommentId, content: String) -> Result<(), Error> {
        let c = match self.api.update_comment(id, content).await {
            Ok(c) => c,
            Err(err) => return Err(self.failed(err)),
        };
        self.state.update(CommentData::from_api(&c));
        self.notices.success("Comment updated");
        Ok(())
    }

    /// Deletes a comment along with its replies
    pub async fn delete(&mut self, id: CommentId) -> Result<Deleted, Error> {
        if let Err(err) = self.api.delete_comment(id).await {
            return Err(self.failed(err));
        }
        let post_comment_delta = match self.state.get(&id) {
            Some(c) if c.parent_id.is_none() => -1,
            Some(_) => 0,
            None => {
                tracing::debug!(?id, "deleted comment was not loaded, post count unknown");
                0
            }
        };
        let removed = self.state.delete_cascade(id);
        self.notices.success("Comment deleted");
        Ok(Deleted {
            removed,
            post_comment_delta,
        })
    }

    /// Likes or unlikes a comment right away, undoing it if the server refuses
    pub async fn toggle_like(&mut self, id: CommentId) -> Result<(), Error> {
        let tok = self
            .state
            .toggle_like(id)
            .ok_or_else(|| Error::comment_not_found(id))?;
        match self.api.set_comment_liked(id, tok.liked()).await {
            Ok(()) => {
                self.state.commit(tok);
                Ok(())
            }
            Err(err) => {
                self.state.rollback(tok);
                Err(self.failed(err))
            }
        }
    }

    fn failed(&self, err: Error) -> Error {
        tracing::info!(post = ?self.post, %err, "comment request failed");
        self.notices.error(&err);
        err
    }
}
