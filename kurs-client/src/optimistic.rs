/// Record of an optimistic like toggle, to be either committed once the
/// server agreed or rolled back if it refused
#[must_use]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UndoToken<Id> {
    pub(crate) id: Id,
    /// Value of `is_liked` right after the toggle
    pub(crate) liked: bool,
}

impl<Id: Copy> UndoToken<Id> {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Whether the toggle liked (as opposed to unliked) the entity
    pub fn liked(&self) -> bool {
        self.liked
    }
}

pub(crate) fn flip_like(is_liked: &mut bool, like_count: &mut i64) {
    *is_liked = !*is_liked;
    *like_count += if *is_liked { 1 } else { -1 };
}

/// Flips the like and returns the token recording it
pub(crate) fn toggle<Id>(id: Id, is_liked: &mut bool, like_count: &mut i64) -> UndoToken<Id> {
    flip_like(is_liked, like_count);
    UndoToken {
        id,
        liked: *is_liked,
    }
}

/// Reverts the toggle recorded in `token`, unless something else already
/// changed the like state since then. Returns whether anything was reverted.
pub(crate) fn undo<Id>(token: &UndoToken<Id>, is_liked: &mut bool, like_count: &mut i64) -> bool {
    if *is_liked != token.liked {
        return false;
    }
    flip_like(is_liked, like_count);
    true
}
