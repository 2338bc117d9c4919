// The replicated order ledger: a contiguous, gap-free, append-only sequence
// of transactions. The leader assigns ids; followers apply pushes
// idempotently by id and report what they're missing via `since`.

use std::collections::BTreeMap;

use bourse_wire::LedgerEntry;

#[derive(Debug, Default)]
pub struct Ledger {
    entries: BTreeMap<i64, LedgerEntry>,
    next_id: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger { entries: BTreeMap::new(), next_id: 0 }
    }

    /// Rebuilds a ledger from a loaded snapshot (boot-time restore from
    /// `bourse-store`, or a `/sync` response's transaction map).
    pub fn from_entries(entries: BTreeMap<i64, LedgerEntry>) -> Self {
        let next_id = entries.keys().next_back().map(|id| id + 1).unwrap_or(0);
        Ledger { entries, next_id }
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn entries(&self) -> &BTreeMap<i64, LedgerEntry> {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&LedgerEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leader-side: assigns the next id and appends. Callers hold the
    /// ledger lock across this *and* the catalog update it guards, per the
    /// one ordering exception the replication protocol allows.
    pub fn append_next(&mut self, entry: LedgerEntry) -> i64 {
        let id = self.next_id;
        self.entries.insert(id, entry);
        self.next_id = id + 1;
        id
    }

    /// Follower-side: applies a pushed entry at a specific id. A push for an
    /// id already present is a no-op — replication is idempotent by id, so
    /// a retried push or a push racing with a sync catch-up can't duplicate
    /// or corrupt an entry.
    pub fn apply_push(&mut self, id: i64, entry: LedgerEntry) {
        if self.entries.contains_key(&id) {
            return;
        }
        self.entries.insert(id, entry);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    /// What `GET /sync` answers: every entry after `last_id`. Empty when
    /// the asker is already caught up or ahead — not an error.
    pub fn since(&self, last_id: i64) -> BTreeMap<String, LedgerEntry> {
        self.entries
            .range((last_id + 1)..)
            .map(|(id, entry)| (id.to_string(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_wire::TxnType;
    use test_log::test;

    fn entry(name: &str) -> LedgerEntry {
        LedgerEntry { name: name.to_string(), quantity: 1, kind: TxnType::Buy }
    }

    #[test]
    fn ids_increase_without_gaps() {
        let mut ledger = Ledger::new();
        let a = ledger.append_next(entry("AAA"));
        let b = ledger.append_next(entry("BBB"));
        let c = ledger.append_next(entry("CCC"));
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(ledger.next_id(), 3);
    }

    #[test]
    fn push_is_idempotent_by_id() {
        let mut ledger = Ledger::new();
        ledger.apply_push(0, entry("AAA"));
        ledger.apply_push(0, entry("ZZZ"));
        assert_eq!(ledger.get(0), Some(&entry("AAA")));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn since_is_empty_when_caller_is_ahead() {
        let mut ledger = Ledger::new();
        ledger.append_next(entry("AAA"));
        assert!(ledger.since(5).is_empty());
    }

    #[test]
    fn since_returns_missing_suffix() {
        let mut ledger = Ledger::new();
        ledger.append_next(entry("AAA"));
        ledger.append_next(entry("BBB"));
        ledger.append_next(entry("CCC"));
        let missing = ledger.since(0);
        assert_eq!(missing.len(), 2);
        assert!(missing.contains_key("1"));
        assert!(missing.contains_key("2"));
    }

    #[test]
    fn from_entries_resumes_next_id_past_the_snapshot() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert(0, entry("AAA"));
        snapshot.insert(1, entry("BBB"));
        let ledger = Ledger::from_entries(snapshot);
        assert_eq!(ledger.next_id(), 2);
    }
}
