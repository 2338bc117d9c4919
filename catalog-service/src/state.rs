use std::collections::BTreeMap;
use std::sync::Mutex;

use bourse_base::{Error, Result};
use bourse_store::FileStore;
use bourse_wire::{FrontendClient, Instrument, TxnType};

pub struct CatalogState {
    table: Mutex<BTreeMap<String, Instrument>>,
    store: FileStore<BTreeMap<String, Instrument>>,
    front: FrontendClient,
    cache_mode: bool,
}

impl CatalogState {
    pub fn new(
        initial: BTreeMap<String, Instrument>,
        store: FileStore<BTreeMap<String, Instrument>>,
        front: FrontendClient,
        cache_mode: bool,
    ) -> Self {
        CatalogState { table: Mutex::new(initial), store, front, cache_mode }
    }

    pub fn lookup(&self, name: &str) -> Result<Instrument> {
        let table = self.table.lock().unwrap();
        table
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found("stock not found"))
    }

    /// Applies an update under the table lock, persisting before releasing
    /// it, then (outside the lock) fires the fire-and-forget invalidation —
    /// the one place this component's lock discipline allows a network call
    /// to follow a held lock, by *not* holding it across that call.
    pub async fn update(&self, name: &str, quantity: i64, kind: TxnType) -> Result<()> {
        {
            let mut table = self.table.lock().unwrap();
            let instrument = table
                .get_mut(name)
                .ok_or_else(|| Error::not_found("stock not found"))?;
            match kind {
                TxnType::Sell => instrument.quantity += quantity,
                TxnType::Buy => {
                    if quantity > instrument.quantity {
                        return Err(Error::rejected("insufficient shares for buy"));
                    }
                    instrument.quantity -= quantity;
                }
            }
            self.store.save(&*table)?;
        }

        if self.cache_mode {
            self.front.invalidate(name).await;
        }
        Ok(())
    }
}
