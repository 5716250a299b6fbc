//! Transaction listener registry
//!
//! Listeners are kept in registration order and invoked synchronously with
//! each committed transaction.

use indexmap::IndexMap;
use roast_core::Transaction;
use roast_core_types::SubscriptionId;

/// Callback invoked with every committed transaction
pub type TransactionListener = Box<dyn Fn(&Transaction) + Send + Sync>;

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: IndexMap<SubscriptionId, TransactionListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` and return its subscription handle
    pub fn add<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Transaction) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.insert(id.clone(), Box::new(listener));
        id
    }

    /// Remove a listener; unknown ids are ignored
    ///
    /// Returns true if a listener was removed. Remaining listeners keep their
    /// relative order.
    pub fn remove(&mut self, id: &SubscriptionId) -> bool {
        self.listeners.shift_remove(id).is_some()
    }

    /// Invoke every listener with `tx`, in registration order
    pub fn notify(&self, tx: &Transaction) {
        for listener in self.listeners.values() {
            listener(tx);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("subscriptions", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
