//! Insertion-ordered storage for the users of one stage.

use triviarena_protocol::UserId;
use triviarena_session::Stage;

use crate::itertools::VecExt;

/// All users currently in stage `S`, oldest first.
///
/// Linear lookups by id. The arena holds at most a few hundred users and
/// matchmaking needs the insertion order anyway.
#[derive(Debug)]
pub struct Bucket<S> {
    users: Vec<S>,
}

impl<S> Default for Bucket<S> {
    fn default() -> Self {
        Self { users: Vec::new() }
    }
}

impl<S: Stage> Bucket<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Appends at the back.
    pub fn push(&mut self, user: S) {
        self.users.push(user);
    }

    pub fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.id() == id)
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.position(id).is_some()
    }

    pub fn get_mut(&mut self, id: UserId) -> Option<&mut S> {
        self.users.iter_mut().find(|u| u.id() == id)
    }

    /// Removes a user, keeping everyone else in order.
    pub fn remove(&mut self, id: UserId) -> Option<S> {
        self.position(id).map(|i| self.users.remove(i))
    }

    /// Puts a user back at `index`, e.g. after a transition that didn't
    /// happen. Clamped to the end.
    pub fn insert(&mut self, index: usize, user: S) {
        let index = index.min(self.users.len());
        self.users.insert(index, user);
    }

    /// Mutable access to two distinct users at once.
    pub fn pair_mut(&mut self, a: UserId, b: UserId) -> Option<(&mut S, &mut S)> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        if i == j {
            return None;
        }
        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = self.users.split_at_mut(hi);
        let (first, second) = (&mut head[lo], &mut tail[0]);
        Some(if i < j { (first, second) } else { (second, first) })
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.users.iter()
    }

    pub fn ids(&self) -> Vec<UserId> {
        self.users.iter().map(Stage::id).collect()
    }

    /// Takes users two at a time in insertion order. An odd user out
    /// stays in the bucket.
    pub fn drain_pairs(&mut self) -> Vec<(S, S)> {
        self.users.drain_pairs()
    }

    /// Empties the bucket.
    pub fn drain(&mut self) -> Vec<S> {
        std::mem::take(&mut self.users)
    }
}
