use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    api::CommentId,
    optimistic::{self, UndoToken},
    CommentData,
};

#[derive(Clone, Debug, PartialEq)]
pub enum CommentsAction {
    FetchedPage {
        comments: Vec<CommentData>,
        is_first_page: bool,
    },
    Created(CommentData),
    Updated(CommentData),
    Deleted(CommentId),
    LikeToggled(CommentId),
    LikeRolledBack(UndoToken<CommentId>),
}

/// Comments of a post, normalized: one flat map plus ordering indices
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentsState {
    by_id: HashMap<CommentId, CommentData>,

    /// Newest first
    top_level_ids: Vec<CommentId>,

    /// Oldest first
    reply_ids_by_parent: HashMap<CommentId, Vec<CommentId>>,
}

impl CommentsState {
    pub fn new() -> CommentsState {
        CommentsState::default()
    }

    pub fn get(&self, id: &CommentId) -> Option<&CommentData> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn top_level_ids(&self) -> &[CommentId] {
        &self.top_level_ids
    }

    pub fn reply_ids(&self, parent: &CommentId) -> &[CommentId] {
        self.reply_ids_by_parent
            .get(parent)
            .map(|v| v as &[_])
            .unwrap_or(&[])
    }

    pub fn top_level(&self) -> impl Iterator<Item = &CommentData> {
        self.top_level_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn replies(&self, parent: &CommentId) -> impl Iterator<Item = &CommentData> {
        self.reply_ids(parent)
            .iter()
            .filter_map(|id| self.by_id.get(id))
    }

    /// Applies `action`, returning the undo token for like toggles
    pub fn apply(&mut self, action: CommentsAction) -> Option<UndoToken<CommentId>> {
        match action {
            CommentsAction::FetchedPage {
                comments,
                is_first_page,
            } => self.apply_fetched_page(comments, is_first_page),
            CommentsAction::Created(c) => self.insert_created(c),
            CommentsAction::Updated(c) => self.update(c),
            CommentsAction::Deleted(id) => {
                self.delete_cascade(id);
            }
            CommentsAction::LikeToggled(id) => return self.toggle_like(id),
            CommentsAction::LikeRolledBack(tok) => self.rollback(tok),
        }
        None
    }

    /// Inserts a page of flattened comments; the first page replaces everything
    pub fn apply_fetched_page(&mut self, comments: Vec<CommentData>, is_first_page: bool) {
        if is_first_page {
            self.by_id.clear();
            self.top_level_ids.clear();
            self.reply_ids_by_parent.clear();
        }
        for c in comments {
            let id = c.id;
            let index = match c.parent_id {
                Some(parent) => self.reply_ids_by_parent.entry(parent).or_default(),
                None => &mut self.top_level_ids,
            };
            if !index.contains(&id) {
                index.push(id);
            }
            self.by_id.insert(id, c);
        }
    }

    /// Inserts a comment the user just wrote: top-level comments go first,
    /// replies go last under their parent
    pub fn insert_created(&mut self, c: CommentData) {
        let id = c.id;
        if self.by_id.contains_key(&id) {
            tracing::debug!(?id, "created comment already known, updating it");
            self.by_id.insert(id, c);
            return;
        }
        match c.parent_id {
            None => self.top_level_ids.insert(0, id),
            Some(parent) => {
                self.reply_ids_by_parent.entry(parent).or_default().push(id);
                match self.by_id.get_mut(&parent) {
                    Some(p) => p.reply_count += 1,
                    None => tracing::warn!(?id, ?parent, "created reply to unknown comment"),
                }
            }
        }
        self.by_id.insert(id, c);
    }

    /// Replaces the contents of a known comment, keeping its position and the
    /// locally tracked reply count
    pub fn update(&mut self, c: CommentData) {
        match self.by_id.get_mut(&c.id) {
            None => tracing::debug!(id = ?c.id, "ignoring update of unknown comment"),
            Some(existing) => {
                let reply_count = existing.reply_count;
                let parent_id = existing.parent_id;
                *existing = c;
                existing.reply_count = reply_count;
                existing.parent_id = parent_id;
            }
        }
    }

    /// Removes `id` and all its descendants, returning how many comments
    /// were removed
    pub fn delete_cascade(&mut self, id: CommentId) -> usize {
        let parent_id = match self.by_id.get(&id) {
            None => {
                tracing::debug!(?id, "ignoring deletion of unknown comment");
                return 0;
            }
            Some(c) => c.parent_id,
        };

        let mut removed = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(next) = queue.pop_front() {
            if !removed.insert(next) {
                continue;
            }
            if let Some(children) = self.reply_ids_by_parent.remove(&next) {
                queue.extend(children);
            }
        }
        for r in removed.iter() {
            self.by_id.remove(r);
        }

        match parent_id {
            Some(parent) => {
                if let Some(siblings) = self.reply_ids_by_parent.get_mut(&parent) {
                    siblings.retain(|s| *s != id);
                }
                if let Some(p) = self.by_id.get_mut(&parent) {
                    if p.reply_count > 0 {
                        p.reply_count -= 1;
                    } else {
                        tracing::warn!(?id, ?parent, "deleted reply of a comment with no replies");
                    }
                }
            }
            None => self.top_level_ids.retain(|t| *t != id),
        }
        removed.len()
    }

    /// Flips the like of `id` before the server confirms it
    pub fn toggle_like(&mut self, id: CommentId) -> Option<UndoToken<CommentId>> {
        let c = match self.by_id.get_mut(&id) {
            Some(c) => c,
            None => {
                tracing::debug!(?id, "ignoring like of unknown comment");
                return None;
            }
        };
        Some(optimistic::toggle(id, &mut c.is_liked, &mut c.like_count))
    }

    pub fn commit(&self, tok: UndoToken<CommentId>) {
        tracing::trace!(id = ?tok.id(), liked = tok.liked(), "like confirmed");
    }

    pub fn rollback(&mut self, tok: UndoToken<CommentId>) {
        match self.by_id.get_mut(&tok.id()) {
            None => tracing::debug!(id = ?tok.id(), "comment gone before like rollback"),
            Some(c) => {
                if !optimistic::undo(&tok, &mut c.is_liked, &mut c.like_count) {
                    tracing::debug!(id = ?tok.id(), "like changed again before rollback");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{comment::tests::comment, flatten};

    /// Checks that indices and the map agree
    fn assert_consistent(s: &CommentsState) {
        let mut indexed = HashSet::new();
        for id in s.top_level_ids() {
            assert_eq!(s.get(id).expect("dangling top-level id").parent_id, None);
            assert!(indexed.insert(*id), "{id:?} indexed twice");
        }
        for (parent, children) in s.reply_ids_by_parent.iter() {
            for id in children {
                let c = s.get(id).expect("dangling reply id");
                assert_eq!(c.parent_id, Some(*parent));
                assert!(indexed.insert(*id), "{id:?} indexed twice");
            }
        }
        assert_eq!(indexed.len(), s.len());
    }

    fn ids<'a>(it: impl Iterator<Item = &'a CommentData>) -> Vec<i64> {
        it.map(|c| c.id.0).collect()
    }

    /// 1 -> (2 -> (4, 5), 3), 6
    fn sample() -> CommentsState {
        let mut s = CommentsState::new();
        s.apply_fetched_page(
            vec![
                comment(1, None),
                comment(2, Some(1)),
                comment(4, Some(2)),
                comment(5, Some(2)),
                comment(3, Some(1)),
                comment(6, None),
            ],
            true,
        );
        s.by_id.get_mut(&CommentId(1)).unwrap().reply_count = 2;
        s.by_id.get_mut(&CommentId(2)).unwrap().reply_count = 2;
        s
    }

    #[test]
    fn fetched_pages_are_indexed() {
        let s = sample();
        assert_consistent(&s);
        assert_eq!(ids(s.top_level()), vec![1, 6]);
        assert_eq!(ids(s.replies(&CommentId(1))), vec![2, 3]);
        assert_eq!(ids(s.replies(&CommentId(2))), vec![4, 5]);
        assert!(s.reply_ids(&CommentId(6)).is_empty());
    }

    #[test]
    fn fetched_pages_are_idempotent() {
        let mut s = sample();
        let page = vec![comment(1, None), comment(2, Some(1)), comment(7, None)];
        s.apply_fetched_page(page.clone(), false);
        s.apply_fetched_page(page, false);
        assert_consistent(&s);
        assert_eq!(ids(s.top_level()), vec![1, 6, 7]);
        assert_eq!(ids(s.replies(&CommentId(1))), vec![2, 3]);
        assert_eq!(s.len(), 7);
    }

    #[test]
    fn first_page_resets() {
        let mut s = sample();
        s.apply_fetched_page(vec![comment(9, None)], true);
        assert_consistent(&s);
        assert_eq!(s.len(), 1);
        assert_eq!(ids(s.top_level()), vec![9]);
        assert!(s.reply_ids(&CommentId(1)).is_empty());
    }

    #[test]
    fn created_top_level_goes_first_and_replies_go_last() {
        let mut s = sample();
        s.insert_created(comment(10, None));
        s.insert_created(comment(11, Some(1)));
        assert_consistent(&s);
        assert_eq!(ids(s.top_level()), vec![10, 1, 6]);
        assert_eq!(ids(s.replies(&CommentId(1))), vec![2, 3, 11]);
        assert_eq!(s.get(&CommentId(1)).unwrap().reply_count, 3);

        // inserting the same comment again does not index it twice
        s.insert_created(comment(11, Some(1)));
        assert_consistent(&s);
        assert_eq!(s.get(&CommentId(1)).unwrap().reply_count, 3);
    }

    #[test]
    fn update_keeps_position_and_reply_count() {
        let mut s = sample();
        let mut c = comment(2, Some(1));
        c.content = String::from("edited");
        c.reply_count = 0;
        s.update(c);
        let c = s.get(&CommentId(2)).unwrap();
        assert_eq!(c.content, "edited");
        assert_eq!(c.reply_count, 2);
        assert_eq!(ids(s.replies(&CommentId(1))), vec![2, 3]);

        let before = s.clone();
        s.update(comment(42, None));
        assert_eq!(s, before);
    }

    #[test]
    fn delete_removes_the_whole_subtree() {
        let mut s = sample();
        assert_eq!(s.delete_cascade(CommentId(2)), 3);
        assert_consistent(&s);
        for gone in [2, 4, 5] {
            assert!(s.get(&CommentId(gone)).is_none());
            assert!(s.reply_ids(&CommentId(gone)).is_empty());
        }
        assert_eq!(ids(s.replies(&CommentId(1))), vec![3]);
        assert_eq!(s.get(&CommentId(1)).unwrap().reply_count, 1);

        assert_eq!(s.delete_cascade(CommentId(1)), 2);
        assert_consistent(&s);
        assert_eq!(ids(s.top_level()), vec![6]);
        assert_eq!(s.delete_cascade(CommentId(1)), 0);
    }

    #[test]
    fn stale_reply_count_does_not_go_negative() {
        let mut s = sample();
        s.apply_fetched_page(vec![comment(7, Some(6))], false);
        assert_eq!(s.get(&CommentId(6)).unwrap().reply_count, 0);
        assert_eq!(s.delete_cascade(CommentId(7)), 1);
        assert_consistent(&s);
        assert_eq!(s.get(&CommentId(6)).unwrap().reply_count, 0);
        assert!(s.reply_ids(&CommentId(6)).is_empty());
    }

    #[test]
    fn like_rollback_restores_state() {
        let mut s = sample();
        let before = s.clone();
        let tok = s.toggle_like(CommentId(4)).unwrap();
        let c = s.get(&CommentId(4)).unwrap();
        assert!(c.is_liked);
        assert_eq!(c.like_count, 1);
        s.rollback(tok);
        assert_eq!(s, before);

        let tok = s.toggle_like(CommentId(4)).unwrap();
        s.commit(tok);
        assert!(s.get(&CommentId(4)).unwrap().is_liked);
        assert!(s.toggle_like(CommentId(42)).is_none());
    }

    #[test]
    fn rollback_after_delete_is_noop() {
        let mut s = sample();
        let tok = s.toggle_like(CommentId(5)).unwrap();
        s.delete_cascade(CommentId(2));
        let before = s.clone();
        s.rollback(tok);
        assert_eq!(s, before);
    }

    #[test]
    fn actions_dispatch_to_operations() {
        let mut s = CommentsState::new();
        let tree = vec![crate::comment::tests::api_comment(
            1,
            None,
            vec![crate::comment::tests::api_comment(2, Some(1), Vec::new())],
        )];
        assert_eq!(
            s.apply(CommentsAction::FetchedPage {
                comments: flatten(&tree),
                is_first_page: true,
            }),
            None
        );
        s.apply(CommentsAction::Created(comment(3, Some(1))));
        assert_eq!(s.get(&CommentId(1)).unwrap().reply_count, 2);
        let tok = s.apply(CommentsAction::LikeToggled(CommentId(3))).unwrap();
        assert_eq!(s.get(&CommentId(3)).unwrap().like_count, 1);
        s.apply(CommentsAction::LikeRolledBack(tok));
        assert_eq!(s.get(&CommentId(3)).unwrap().like_count, 0);
        let mut edited = comment(3, Some(1));
        edited.content = String::from("edited");
        s.apply(CommentsAction::Updated(edited));
        assert_eq!(s.get(&CommentId(3)).unwrap().content, "edited");
        s.apply(CommentsAction::Deleted(CommentId(1)));
        assert!(s.is_empty());
    }

    #[test]
    fn delete_counts_descendants_in_random_trees() {
        // entry i describes comment i+1: a reply to an earlier comment or top-level
        bolero::check!()
            .with_type::<(Vec<(u8, bool)>, u8)>()
            .cloned()
            .for_each(|(shape, victim)| {
                if shape.is_empty() {
                    return;
                }
                let mut s = CommentsState::new();
                let mut parents = Vec::new();
                for (i, (p, is_reply)) in shape.iter().enumerate() {
                    let parent = (*is_reply && i > 0).then(|| (usize::from(*p) % i) as i64 + 1);
                    parents.push(parent);
                    s.insert_created(comment(i as i64 + 1, parent));
                }
                assert_consistent(&s);

                let victim = usize::from(victim) % shape.len();
                let victim_id = victim as i64 + 1;
                let mut descendants = 0;
                for i in 0..parents.len() {
                    let mut cur = parents[i];
                    while let Some(p) = cur {
                        if p == victim_id {
                            descendants += 1;
                            break;
                        }
                        cur = parents[(p - 1) as usize];
                    }
                }
                let parent_count_before = parents[victim]
                    .map(|p| s.get(&CommentId(p)).unwrap().reply_count);
                let len_before = s.len();

                assert_eq!(s.delete_cascade(CommentId(victim_id)), descendants + 1);
                assert_eq!(s.len(), len_before - descendants - 1);
                assert_consistent(&s);
                if let (Some(p), Some(before)) = (parents[victim], parent_count_before) {
                    assert_eq!(s.get(&CommentId(p)).unwrap().reply_count, before - 1);
                }
            })
    }
}
