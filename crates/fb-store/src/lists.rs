//! Predefined option lists stored under the `lists` key

use crate::backend::KvBackend;
use crate::error::Result;
use crate::json::JsonStore;
use crate::key::RecordKey;
use fb_model::{default_lists, Lists, OptionList};

/// Read and seed access to the lists record
#[derive(Debug)]
pub struct ListCatalog<'a, B> {
    store: &'a JsonStore<B>,
}

impl<'a, B: KvBackend> ListCatalog<'a, B> {
    /// Catalogue over `store`
    pub fn new(store: &'a JsonStore<B>) -> Self {
        Self { store }
    }

    /// Stored lists, empty when the record is absent or unreadable
    pub fn all(&self) -> Lists {
        self.store.get(&RecordKey::Lists).unwrap_or_default()
    }

    /// Write the default lists when no lists record exists
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    /// Backend failure.
    pub fn ensure_defaults(&self) -> Result<bool> {
        if self.store.get_value(&RecordKey::Lists).is_some() {
            return Ok(false);
        }
        self.store.try_set(&RecordKey::Lists, &default_lists())?;
        tracing::info!("seeded default option lists");
        Ok(true)
    }

    /// Stored lists, seeding the defaults first if none exist
    ///
    /// # Errors
    /// Backend failure while seeding.
    pub fn load_or_seed(&self) -> Result<Lists> {
        self.ensure_defaults()?;
        Ok(self.all())
    }

    /// Replace the whole lists record
    ///
    /// # Errors
    /// Serialisation or backend failure.
    pub fn replace(&self, lists: &Lists) -> Result<()> {
        self.store.try_set(&RecordKey::Lists, lists)
    }

    /// One list by id
    pub fn get(&self, list_id: &str) -> Option<OptionList> {
        self.all().shift_remove(list_id)
    }
}
