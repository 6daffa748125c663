use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tracing::trace;

use crate::ShareLock;

/// Named, unbounded collection of records keyed by id.
///
/// Records stay until they are replaced; nothing is evicted.
#[derive(Debug)]
pub struct Collect<T> {
    name: String,
    items: ShareLock<HashMap<String, T>>,
}

impl<T> Collect<T>
where
    T: Clone,
{
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: ShareLock::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn find(
        &self,
        id: &str,
    ) -> Option<T> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }

    /// Inserts or replaces the record stored under `id`.
    pub fn upsert(
        &self,
        id: &str,
        item: T,
    ) {
        trace!("{}::upsert({})", self.name, id);
        self.items.write().unwrap_or_else(PoisonError::into_inner).insert(id.to_string(), item);
    }

    /// Applies `f` to every record under one write lock.
    pub fn update_all<F>(
        &self,
        mut f: F,
    ) where
        F: FnMut(&str, &mut T),
    {
        trace!("{}::update_all()", self.name);
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        for (id, item) in items.iter_mut() {
            f(id, item);
        }
    }
}
