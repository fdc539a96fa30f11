use crate::RecordId;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Results are delivered ten records at a time.
pub const PAGE_SIZE: usize = 10;

/// Identifier of the chat user a session belongs to.
pub type UserId = u64;

/// One slice of a session's result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub ids: Vec<RecordId>,
    pub has_more: bool,
}

/// The most recent result set of one user, with a pagination cursor.
///
/// A session is overwritten by every new query and lives for the process
/// lifetime; there is no expiry.
#[derive(Debug, Default)]
pub struct SearchSession {
    records: Vec<RecordId>,
    cursor: usize,
}

impl SearchSession {
    pub fn new(records: Vec<RecordId>) -> Self {
        Self { records, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The page starting at `offset`, independent of the cursor. Offsets past
    /// the end yield an empty page with `has_more == false`.
    pub fn page(&self, offset: usize) -> Page {
        let ids = self
            .records
            .iter()
            .copied()
            .skip(offset)
            .take(PAGE_SIZE)
            .collect();
        Page {
            ids,
            has_more: offset + PAGE_SIZE < self.records.len(),
        }
    }

    /// The page at the cursor; advances the cursor past it.
    pub fn next_page(&mut self) -> Page {
        let page = self.page(self.cursor);
        self.cursor = (self.cursor + PAGE_SIZE).min(self.records.len());
        page
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

/// Sessions keyed by user id.
///
/// Each session sits behind its own lock so concurrent requests for the same
/// user serialize on that session alone, while requests for different users
/// never contend beyond the brief map access.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Arc<Mutex<SearchSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces (or creates) `user`'s session with a fresh result set.
    pub fn replace(&self, user: UserId, records: Vec<RecordId>) -> Arc<Mutex<SearchSession>> {
        let session = Arc::new(Mutex::new(SearchSession::new(records)));
        self.sessions.lock().insert(user, Arc::clone(&session));
        session
    }

    pub fn get(&self, user: UserId) -> Option<Arc<Mutex<SearchSession>>> {
        self.sessions.lock().get(&user).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_of_twenty_three_records() {
        let session = SearchSession::new((0..23).collect());

        let page = session.page(0);
        assert_eq!(page.ids.len(), 10);
        assert!(page.has_more);

        let page = session.page(10);
        assert_eq!(page.ids.len(), 10);
        assert!(page.has_more);

        let page = session.page(20);
        assert_eq!(page.ids, [20, 21, 22]);
        assert!(!page.has_more);
    }

    #[test]
    fn cursor_walks_the_result_set_once() {
        let mut session = SearchSession::new((0..12).collect());
        assert_eq!(session.next_page().ids.len(), 10);
        let tail = session.next_page();
        assert_eq!(tail.ids, [10, 11]);
        assert!(!tail.has_more);
        assert!(session.next_page().ids.is_empty());

        session.rewind();
        assert_eq!(session.next_page().ids.len(), 10);
    }

    #[test]
    fn exact_multiple_of_page_size_has_no_phantom_page() {
        let session = SearchSession::new((0..20).collect());
        assert!(session.page(0).has_more);
        let last = session.page(10);
        assert_eq!(last.ids.len(), 10);
        assert!(!last.has_more);
    }

    #[test]
    fn store_overwrites_per_user() {
        let store = SessionStore::new();
        assert!(store.get(7).is_none());
        store.replace(7, vec![1, 2, 3]);
        store.replace(7, vec![4]);
        let session = store.get(7).unwrap();
        assert_eq!(session.lock().len(), 1);
        assert!(store.get(8).is_none());
    }
}
