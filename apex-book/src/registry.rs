use crate::OrderBook;
use fnv::FnvHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Symbol -> `OrderBook` lookup with concurrent create/delete.
///
/// Readers (`get`/`has`/`symbols`) take a shared lock; writers
/// (`get_or_create`/`remove`/`clear_all`) take an exclusive lock — readers
/// never block each other.
#[derive(Debug, Default)]
pub struct OrderBookRegistry {
    books: RwLock<FnvHashMap<String, Arc<OrderBook>>>,
}

impl OrderBookRegistry {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(FnvHashMap::default()),
        }
    }

    /// Returns the stable `OrderBook` for `symbol`, creating one if absent.
    pub fn get_or_create(&self, symbol: &str) -> Arc<OrderBook> {
        if let Some(book) = self.books.read().get(symbol) {
            return book.clone();
        }
        let mut books = self.books.write();
        books
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(OrderBook::new(symbol)))
            .clone()
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.books.read().get(symbol).cloned()
    }

    pub fn has(&self, symbol: &str) -> bool {
        self.books.read().contains_key(symbol)
    }

    pub fn remove(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.books.write().remove(symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.books.read().keys().cloned().collect()
    }

    pub fn clear_all(&self) {
        self.books.write().clear();
    }
}
