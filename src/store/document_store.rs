//! Document store handle — durable persistence plus change notification.
//!
//! Wraps the SQLite connection behind a mutex and keeps a listener
//! registry keyed by user id. Every successful write commits first, then
//! notifies each live subscriber with the freshly persisted state, so a
//! notification can never precede its write. Subscriptions unsubscribe on
//! `Drop`, guaranteeing a torn-down view is never notified.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::repository::{self, DocumentPatch};
use super::{sqlite, StoreError};
use crate::models::HealthDocument;

/// Change callback. Receives the current persisted document, or `None`
/// when no document exists (initial subscription before first analysis,
/// or after deletion).
///
/// Callbacks run synchronously on the writer's thread: keep them quick,
/// and do not call back into the store from inside one.
pub type ChangeCallback = Box<dyn Fn(Option<&HealthDocument>) + Send + Sync>;

struct Listener {
    user_id: String,
    callback: ChangeCallback,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Durable single-document-per-user store with change notification.
pub struct DocumentStore {
    conn: Mutex<Connection>,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl DocumentStore {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_connection(sqlite::open_database(path)?))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(sqlite::open_memory_database()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    /// Get the stored document for a user.
    pub fn get(&self, user_id: &str) -> Result<Option<HealthDocument>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        repository::get_document(&conn, user_id)
    }

    /// Write the full document for a user, overwriting any prior state,
    /// then notify subscribers.
    pub fn put(&self, user_id: &str, doc: &HealthDocument) -> Result<(), StoreError> {
        {
            let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            repository::put_document(&conn, user_id, doc)?;
        }
        tracing::info!(user_id = %user_id, "Document written");
        self.notify(user_id, Some(doc));
        Ok(())
    }

    /// Apply a partial update to a user's document, then notify subscribers
    /// with the merged result.
    ///
    /// Fails with [`StoreError::NotFound`] if no document exists.
    pub fn merge(&self, user_id: &str, patch: DocumentPatch) -> Result<(), StoreError> {
        let merged = {
            let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            repository::merge_document(&mut conn, user_id, patch)?
        };
        self.notify(user_id, Some(&merged));
        Ok(())
    }

    /// Remove a user's document entirely (account-deletion analogue), then
    /// notify subscribers with `None`.
    pub fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        {
            let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            repository::delete_document(&conn, user_id)?;
        }
        tracing::info!(user_id = %user_id, "Document deleted");
        self.notify(user_id, None);
        Ok(())
    }

    /// Subscribe to changes for a user's document.
    ///
    /// The callback is invoked once immediately with the current state and
    /// again after every successful `put`/`merge`/`delete` for that user.
    /// Any number of subscribers may be live at once. Dropping the returned
    /// [`Subscription`] unsubscribes.
    pub fn subscribe<F>(&self, user_id: &str, callback: F) -> Result<Subscription, StoreError>
    where
        F: Fn(Option<&HealthDocument>) + Send + Sync + 'static,
    {
        let current = self.get(user_id)?;

        let id = {
            let mut registry = self.registry.lock().map_err(|_| StoreError::LockPoisoned)?;
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.insert(
                id,
                Listener {
                    user_id: user_id.to_string(),
                    callback: Box::new(callback),
                },
            );
            id
        };
        tracing::debug!(user_id = %user_id, listener_id = id, "Subscriber registered");

        // Initial delivery with the current snapshot, outside the registry lock.
        if let Ok(registry) = self.registry.lock() {
            if let Some(listener) = registry.listeners.get(&id) {
                (listener.callback)(current.as_ref());
            }
        }

        Ok(Subscription {
            id,
            registry: Arc::clone(&self.registry),
        })
    }

    fn notify(&self, user_id: &str, doc: Option<&HealthDocument>) {
        let registry = match self.registry.lock() {
            Ok(registry) => registry,
            Err(_) => {
                tracing::warn!("Listener registry lock poisoned, skipping notification");
                return;
            }
        };
        for listener in registry.listeners.values() {
            if listener.user_id == user_id {
                (listener.callback)(doc);
            }
        }
    }
}

/// RAII subscription handle. Dropping it removes the listener, so views
/// torn down at session end can never receive further notifications.
pub struct Subscription {
    id: u64,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.listeners.remove(&self.id);
        }
    }
}
