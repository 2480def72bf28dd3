//! Game state store
//!
//! One owned `GameState`, replaced wholesale once per tick. Subscribers are
//! called after every commit, in the order they subscribed.

use crate::sim::GameState;

/// Handle returned by `GameStore::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&GameState)>;

pub struct GameStore {
    state: GameState,
    revision: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl std::fmt::Debug for GameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStore")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl GameStore {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            revision: 0,
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of commits so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&GameState) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    /// Replace the state and notify subscribers
    pub fn commit(&mut self, next: GameState) {
        self.state = next;
        self.revision += 1;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }

    /// Compute the next state from the current one and commit it
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&GameState) -> GameState,
    {
        let next = f(&self.state);
        self.commit(next);
    }
}
