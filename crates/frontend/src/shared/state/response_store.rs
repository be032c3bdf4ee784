//! Client-side cache of indicator responses for one program.
//!
//! Edits land here immediately and are flushed to the backend on save. Each
//! entry walks a small state machine:
//!
//! ```text
//! Clean --set--> Dirty --begin_save--> Saving --complete--> Clean
//!                  ^                      |
//!                  +------ fail / edit ---+--> Error (still unsaved)
//! ```
//!
//! Only `Clean` entries can be dropped without asking the user.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use contracts::domain::a002_indicator_response::{
    Evaluation, IndicatorResponse, SaveResponseRequest,
};

/// Composite key rendered as `"{domain_id}-{indicator_id}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseKey {
    pub domain_id: i64,
    pub indicator_id: i64,
}

impl ResponseKey {
    pub fn new(domain_id: i64, indicator_id: i64) -> Self {
        Self {
            domain_id,
            indicator_id,
        }
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.domain_id, self.indicator_id)
    }
}

impl FromStr for ResponseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, indicator) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid response key: {}", s))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| format!("Invalid response key {}: {}", s, e))
        };
        Ok(Self::new(parse(domain)?, parse(indicator)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    Clean,
    Dirty,
    Saving,
    Error(String),
}

impl EntryState {
    pub fn is_unsaved(&self) -> bool {
        !matches!(self, EntryState::Clean)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryState::Clean => "Saved",
            EntryState::Dirty => "Unsaved",
            EntryState::Saving => "Saving…",
            EntryState::Error(_) => "Not saved",
        }
    }
}

/// Placeholder ids are handed out locally until the server assigns a real one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    Local(u64),
    Server(i64),
}

impl EntryId {
    pub fn server_id(&self) -> Option<i64> {
        match self {
            EntryId::Server(id) => Some(*id),
            EntryId::Local(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntry {
    pub id: EntryId,
    pub evaluation: Evaluation,
    pub notes: String,
    pub version: Option<i64>,
    pub state: EntryState,
    /// Fresh store-wide number on every local edit; lets a finished save tell
    /// whether the entry changed while the request was in flight
    revision: u64,
}

/// Request prepared by `begin_save`
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub key: ResponseKey,
    pub revision: u64,
    pub request: SaveResponseRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseStore {
    program_id: i64,
    entries: BTreeMap<ResponseKey, ResponseEntry>,
    next_local_id: u64,
    /// Store-wide, so a recreated entry never reuses an in-flight revision
    next_revision: u64,
    /// Server records already deleted by `remove`
    deleted_ids: HashSet<i64>,
}

impl ResponseStore {
    pub fn new(program_id: i64) -> Self {
        Self {
            program_id,
            entries: BTreeMap::new(),
            next_local_id: 1,
            next_revision: 1,
            deleted_ids: HashSet::new(),
        }
    }

    pub fn program_id(&self) -> i64 {
        self.program_id
    }

    /// Merges server records. Entries with unsaved local edits are kept as they are.
    pub fn load(&mut self, responses: Vec<IndicatorResponse>) {
        for response in responses {
            if response.program_id != self.program_id {
                log::warn!(
                    "Ignoring response {} for program {} while editing program {}",
                    response.id,
                    response.program_id,
                    self.program_id
                );
                continue;
            }
            let key = ResponseKey::new(response.domain_id, response.indicator_id);
            if self.entries.get(&key).is_some_and(|e| e.state.is_unsaved()) {
                continue;
            }
            self.entries.insert(
                key,
                ResponseEntry {
                    id: EntryId::Server(response.id),
                    evaluation: response.evaluation,
                    notes: response.comment.unwrap_or_default(),
                    version: response.version,
                    state: EntryState::Clean,
                    revision: 0,
                },
            );
        }
    }

    pub fn get(&self, key: &ResponseKey) -> Option<&ResponseEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bump_revision(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }

    /// Optimistic local edit; the entry stays unsaved until a save succeeds
    pub fn set_response(
        &mut self,
        domain_id: i64,
        indicator_id: i64,
        evaluation: Evaluation,
        notes: impl Into<String>,
    ) {
        let key = ResponseKey::new(domain_id, indicator_id);
        let notes = notes.into();
        if self.entries.get(&key).is_some_and(|entry| {
            entry.state == EntryState::Clean && entry.evaluation == evaluation && entry.notes == notes
        }) {
            return;
        }
        let revision = self.bump_revision();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.evaluation = evaluation;
                entry.notes = notes;
                entry.revision = revision;
                entry.state = EntryState::Dirty;
            }
            None => {
                let id = EntryId::Local(self.next_local_id);
                self.next_local_id += 1;
                self.entries.insert(
                    key,
                    ResponseEntry {
                        id,
                        evaluation,
                        notes,
                        version: None,
                        state: EntryState::Dirty,
                        revision,
                    },
                );
            }
        }
    }

    /// Updates only the notes of an existing entry
    pub fn set_notes(&mut self, key: &ResponseKey, notes: impl Into<String>) -> bool {
        let evaluation = match self.entries.get(key) {
            Some(entry) => entry.evaluation,
            None => return false,
        };
        self.set_response(key.domain_id, key.indicator_id, evaluation, notes);
        true
    }

    /// Marks unsaved entries (all of them, or only `keys`) as `Saving` and
    /// returns the requests to send.
    pub fn begin_save(&mut self, keys: Option<&[ResponseKey]>) -> Vec<PendingSave> {
        let program_id = self.program_id;
        self.entries
            .iter_mut()
            .filter(|(key, entry)| {
                matches!(entry.state, EntryState::Dirty | EntryState::Error(_))
                    && keys.map_or(true, |keys| keys.contains(*key))
            })
            .map(|(key, entry)| {
                entry.state = EntryState::Saving;
                PendingSave {
                    key: *key,
                    revision: entry.revision,
                    request: SaveResponseRequest {
                        domain_id: key.domain_id,
                        indicator_id: key.indicator_id,
                        program_id,
                        evaluation: entry.evaluation,
                        comment: Some(entry.notes.trim().to_string()).filter(|n| !n.is_empty()),
                        expected_version: entry.version,
                    },
                }
            })
            .collect()
    }

    /// Applies a successful save. Returns the server id of a record whose
    /// local entry was removed while the save was in flight and that nobody
    /// has deleted yet; the caller should delete it.
    pub fn complete_save(
        &mut self,
        key: &ResponseKey,
        revision: u64,
        record: &IndicatorResponse,
    ) -> Option<i64> {
        let already_deleted = self.deleted_ids.remove(&record.id);
        let Some(entry) = self.entries.get_mut(key) else {
            return (!already_deleted).then_some(record.id);
        };
        if already_deleted {
            // The entry was removed and answered again; the saved record is gone
            return None;
        }
        entry.id = EntryId::Server(record.id);
        entry.version = record.version;
        entry.state = if entry.revision == revision {
            EntryState::Clean
        } else {
            EntryState::Dirty
        };
        None
    }

    /// Records a failed save. User input is kept.
    pub fn fail_save(&mut self, key: &ResponseKey, message: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.state = EntryState::Error(message.into());
        }
    }

    /// Drops the local entry and returns its server id, if it has one.
    /// `None` means there is nothing to delete on the server.
    pub fn remove(&mut self, key: &ResponseKey) -> Option<i64> {
        let entry = self.entries.remove(key)?;
        let server_id = entry.id.server_id()?;
        if entry.state == EntryState::Saving {
            self.deleted_ids.insert(server_id);
        }
        Some(server_id)
    }

    pub fn is_discardable(&self, key: &ResponseKey) -> bool {
        self.entries
            .get(key)
            .map_or(true, |entry| entry.state == EntryState::Clean)
    }

    pub fn unsaved_keys(&self) -> Vec<ResponseKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.state.is_unsaved())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn unsaved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.state.is_unsaved())
            .count()
    }

    pub fn is_saving(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.state == EntryState::Saving)
    }

    pub fn answered_ids(&self, domain_id: i64) -> HashSet<i64> {
        self.entries
            .keys()
            .filter(|key| key.domain_id == domain_id)
            .map(|key| key.indicator_id)
            .collect()
    }

    /// Indicator ids with a recorded answer, grouped by domain
    pub fn answered_by_domain(&self) -> HashMap<i64, HashSet<i64>> {
        let mut answered: HashMap<i64, HashSet<i64>> = HashMap::new();
        for key in self.entries.keys() {
            answered
                .entry(key.domain_id)
                .or_default()
                .insert(key.indicator_id);
        }
        answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, domain_id: i64, indicator_id: i64, version: Option<i64>) -> IndicatorResponse {
        IndicatorResponse {
            id,
            domain_id,
            indicator_id,
            program_id: 5,
            evaluation: Evaluation::Yes,
            comment: Some("from server".to_string()),
            version,
        }
    }

    #[test]
    fn test_key_format() {
        let key = ResponseKey::new(3, 41);
        assert_eq!(key.to_string(), "3-41");
        assert_eq!("3-41".parse::<ResponseKey>(), Ok(key));
        assert!("3_41".parse::<ResponseKey>().is_err());
        assert!("a-41".parse::<ResponseKey>().is_err());
    }

    #[test]
    fn test_set_response_is_optimistic_and_unsaved() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Maybe, "partly");

        let key = ResponseKey::new(1, 10);
        let entry = store.get(&key).unwrap();
        assert_eq!(entry.evaluation, Evaluation::Maybe);
        assert_eq!(entry.notes, "partly");
        assert_eq!(entry.state, EntryState::Dirty);
        assert_eq!(entry.id, EntryId::Local(1));
        assert_eq!(store.unsaved_keys(), vec![key]);
        assert!(!store.is_discardable(&key));
    }

    #[test]
    fn test_successful_save_replaces_placeholder_id() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Yes, "");
        let pending = store.begin_save(None);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.program_id, 5);
        assert_eq!(pending[0].request.comment, None);
        assert!(store.is_saving());

        let orphan = store.complete_save(&pending[0].key, pending[0].revision, &record(77, 1, 10, Some(1)));
        assert_eq!(orphan, None);
        let entry = store.get(&pending[0].key).unwrap();
        assert_eq!(entry.id, EntryId::Server(77));
        assert_eq!(entry.version, Some(1));
        assert_eq!(entry.state, EntryState::Clean);
        assert_eq!(store.unsaved_count(), 0);
        assert!(store.is_discardable(&pending[0].key));
    }

    #[test]
    fn test_failed_save_keeps_input() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::No, "missing policy");
        let pending = store.begin_save(None);
        store.fail_save(&pending[0].key, "HTTP error: 500");

        let entry = store.get(&pending[0].key).unwrap();
        assert_eq!(entry.state, EntryState::Error("HTTP error: 500".to_string()));
        assert_eq!(entry.notes, "missing policy");
        assert_eq!(entry.evaluation, Evaluation::No);
        assert_eq!(entry.id, EntryId::Local(1));

        // Error entries are retried by the next save
        assert_eq!(store.begin_save(None).len(), 1);
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Maybe, "");
        let pending = store.begin_save(None);
        store.set_response(1, 10, Evaluation::Yes, "");

        store.complete_save(&pending[0].key, pending[0].revision, &record(77, 1, 10, None));
        let entry = store.get(&pending[0].key).unwrap();
        assert_eq!(entry.id, EntryId::Server(77));
        assert_eq!(entry.state, EntryState::Dirty);
        assert_eq!(entry.evaluation, Evaluation::Yes);
    }

    #[test]
    fn test_begin_save_limits_to_keys_and_sends_version() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, Some(4))]);
        store.set_response(1, 10, Evaluation::No, "changed");
        store.set_response(2, 20, Evaluation::Yes, "");

        let only = [ResponseKey::new(1, 10)];
        let pending = store.begin_save(Some(&only));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request.expected_version, Some(4));
        assert_eq!(pending[0].request.comment.as_deref(), Some("changed"));
        assert_eq!(
            store.get(&ResponseKey::new(2, 20)).unwrap().state,
            EntryState::Dirty
        );
    }

    #[test]
    fn test_remove_without_server_id_needs_no_request() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Yes, "");
        assert_eq!(store.remove(&ResponseKey::new(1, 10)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_with_server_id_returns_it() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, None)]);
        assert_eq!(store.remove(&ResponseKey::new(1, 10)), Some(70));
        assert!(store.get(&ResponseKey::new(1, 10)).is_none());
    }

    #[test]
    fn test_removed_while_saving_reports_orphan() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Yes, "");
        let pending = store.begin_save(None);
        assert_eq!(store.remove(&pending[0].key), None);
        assert_eq!(
            store.complete_save(&pending[0].key, pending[0].revision, &record(90, 1, 10, None)),
            Some(90)
        );
    }

    #[test]
    fn test_answer_recreated_during_save_stays_unsaved() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::Maybe, "");
        let pending = store.begin_save(None);
        assert_eq!(store.remove(&pending[0].key), None);
        store.set_response(1, 10, Evaluation::No, "new answer");

        let mut saved = record(90, 1, 10, Some(1));
        saved.evaluation = Evaluation::Maybe;
        let orphan = store.complete_save(&pending[0].key, pending[0].revision, &saved);
        assert_eq!(orphan, None);

        let entry = store.get(&pending[0].key).unwrap();
        assert_eq!(entry.state, EntryState::Dirty);
        assert_eq!(entry.evaluation, Evaluation::No);
        assert_eq!(entry.notes, "new answer");
        assert_eq!(store.unsaved_count(), 1);
    }

    #[test]
    fn test_server_entry_removed_during_save_is_deleted_once() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, Some(2))]);
        store.set_response(1, 10, Evaluation::No, "changed");
        let pending = store.begin_save(None);
        assert_eq!(store.remove(&pending[0].key), Some(70));

        let orphan =
            store.complete_save(&pending[0].key, pending[0].revision, &record(70, 1, 10, Some(3)));
        assert_eq!(orphan, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_server_entry_removed_during_save_and_answered_again() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, Some(2))]);
        store.set_response(1, 10, Evaluation::No, "");
        let pending = store.begin_save(None);
        assert_eq!(store.remove(&pending[0].key), Some(70));
        store.set_response(1, 10, Evaluation::Maybe, "");

        store.complete_save(&pending[0].key, pending[0].revision, &record(70, 1, 10, Some(3)));
        let entry = store.get(&pending[0].key).unwrap();
        assert_eq!(entry.id, EntryId::Local(1));
        assert_eq!(entry.version, None);
        assert_eq!(entry.state, EntryState::Dirty);
    }

    #[test]
    fn test_load_keeps_unsaved_edits_and_skips_other_programs() {
        let mut store = ResponseStore::new(5);
        store.set_response(1, 10, Evaluation::No, "local");
        let mut foreign = record(71, 2, 20, None);
        foreign.program_id = 6;
        store.load(vec![record(70, 1, 10, None), foreign, record(72, 3, 30, None)]);

        assert_eq!(store.get(&ResponseKey::new(1, 10)).unwrap().notes, "local");
        assert!(store.get(&ResponseKey::new(2, 20)).is_none());
        assert_eq!(
            store.get(&ResponseKey::new(3, 30)).unwrap().state,
            EntryState::Clean
        );
    }

    #[test]
    fn test_setting_same_value_on_clean_entry_is_a_no_op() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, None)]);
        store.set_response(1, 10, Evaluation::Yes, "from server");
        assert_eq!(store.unsaved_count(), 0);
    }

    #[test]
    fn test_answered_by_domain() {
        let mut store = ResponseStore::new(5);
        store.load(vec![record(70, 1, 10, None), record(71, 1, 11, None)]);
        store.set_response(2, 20, Evaluation::Maybe, "");
        let answered = store.answered_by_domain();
        assert_eq!(answered[&1].len(), 2);
        assert!(answered[&2].contains(&20));
        assert_eq!(store.answered_ids(1), HashSet::from([10, 11]));
        assert!(store.answered_ids(9).is_empty());
    }
}
