//! Concurrent in-memory event storage.
//!
//! [`EventStore`] keeps every event in a `HashMap` behind a single
//! [`tokio::sync::RwLock`]. Reads (listing, filtering) share the lock;
//! each mutation holds the write lock across its check-and-mutate step,
//! so two RSVPs can never both take the last seat. The `*_with` variants
//! also run a commit step (the document write-through) inside that
//! section, so stored documents change in the same order as the map.

use std::collections::HashMap;
use std::future::ready;

use tokio::sync::RwLock;

use super::EventId;
use super::event::Event;
use crate::error::HubError;

/// Central store for all events.
#[derive(Debug)]
pub struct EventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl EventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the contents of the store, e.g. with documents loaded at
    /// startup. Returns the number of events loaded.
    pub async fn load(&self, events: Vec<Event>) -> usize {
        let mut map = self.events.write().await;
        map.clear();
        map.extend(events.into_iter().map(|e| (e.id, e)));
        map.len()
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] if an event with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, event: Event) -> Result<EventId, HubError> {
        self.insert_with(event, |_| ready(Ok(()))).await
    }

    /// Inserts a new event once `commit` has accepted it.
    ///
    /// `commit` runs under the write lock; the event is only stored when
    /// it succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidRequest`] on a duplicate ID, or whatever
    /// error `commit` returns.
    pub async fn insert_with<C, Fut>(&self, event: Event, commit: C) -> Result<EventId, HubError>
    where
        C: FnOnce(Event) -> Fut,
        Fut: Future<Output = Result<(), HubError>>,
    {
        let id = event.id;
        let mut map = self.events.write().await;
        if map.contains_key(&id) {
            return Err(HubError::InvalidRequest(format!("event {id} already exists")));
        }
        commit(event.clone()).await?;
        map.insert(id, event);
        Ok(id)
    }

    /// Returns a copy of the event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`] if no event has the given ID.
    pub async fn get(&self, id: EventId) -> Result<Event, HubError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(HubError::EventNotFound(id))
    }

    /// Applies `f` to a working copy of the event under the write lock.
    ///
    /// # Errors
    ///
    /// See [`EventStore::update_with`].
    pub async fn update<T, F>(&self, id: EventId, f: F) -> Result<(Event, T), HubError>
    where
        F: FnOnce(&mut Event) -> Result<T, HubError>,
    {
        self.update_with(id, f, |_| ready(Ok(()))).await
    }

    /// Applies `f` to a working copy of the event, then hands the result
    /// to `commit`, all under the write lock.
    ///
    /// The copy replaces the stored event only when both succeed, so a
    /// rejected mutation leaves no partial change behind. Holding the lock
    /// through `commit` means commits happen in the same order as the
    /// in-memory changes. Returns the updated event alongside `f`'s result.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`] if no event has the given ID,
    /// or whatever error `f` or `commit` returns.
    pub async fn update_with<T, F, C, Fut>(
        &self,
        id: EventId,
        f: F,
        commit: C,
    ) -> Result<(Event, T), HubError>
    where
        F: FnOnce(&mut Event) -> Result<T, HubError>,
        C: FnOnce(Event) -> Fut,
        Fut: Future<Output = Result<(), HubError>>,
    {
        let mut map = self.events.write().await;
        let mut working = map.get(&id).cloned().ok_or(HubError::EventNotFound(id))?;
        let out = f(&mut working)?;
        commit(working.clone()).await?;
        map.insert(id, working.clone());
        Ok((working, out))
    }

    /// Removes an event, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`] if no event has the given ID.
    pub async fn remove(&self, id: EventId) -> Result<Event, HubError> {
        self.remove_with(id, |_| ready(Ok(()))).await
    }

    /// Removes an event once `commit` has accepted the removal, under the
    /// write lock.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::EventNotFound`] if no event has the given ID,
    /// or whatever error `commit` returns.
    pub async fn remove_with<C, Fut>(&self, id: EventId, commit: C) -> Result<Event, HubError>
    where
        C: FnOnce(EventId) -> Fut,
        Fut: Future<Output = Result<(), HubError>>,
    {
        let mut map = self.events.write().await;
        if !map.contains_key(&id) {
            return Err(HubError::EventNotFound(id));
        }
        commit(id).await?;
        map.remove(&id).ok_or(HubError::EventNotFound(id))
    }

    /// Returns every event ordered by start time, then creation time.
    pub async fn list(&self) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events: Vec<Event> = map.values().cloned().collect();
        events.sort_by(|a, b| {
            a.start_date_time
                .cmp(&b.start_date_time)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        events
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
