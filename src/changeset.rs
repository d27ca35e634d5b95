/// Changeset - Local patching of record snapshots
///
/// After a create, update or delete succeeds on the service, the caller can
/// patch its local snapshot instead of reloading the whole collection. A
/// change that does not fit the snapshot (creating an id that already
/// exists, touching an id that does not) is reported as `Error::Conflict`;
/// the caller then falls back to a full reload.
///
/// # Usage Pattern
///
/// 1. The service confirms a mutation
/// 2. The caller records it as a `RecordChange` in a `Changeset`
/// 3. `apply_changes()` produces the next snapshot, or a conflict
/// 4. Views are recomputed from the new snapshot

use crate::error::{Error, Result};
use crate::record::{Record, RecordId};
use crate::value::FieldValue;
use std::collections::{BTreeMap, HashMap};

/// A single confirmed mutation of a collection
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// A record was created; it must carry its new id
    Created(Record),

    /// Some fields of an existing record changed
    Updated {
        id: RecordId,
        fields: BTreeMap<String, FieldValue>,
    },

    /// A record was removed
    Deleted { id: RecordId },
}

impl RecordChange {
    /// Returns the id of the record affected by this change
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            RecordChange::Created(record) => record.id(),
            RecordChange::Updated { id, .. } | RecordChange::Deleted { id } => Some(*id),
        }
    }

    /// Returns true if this change adds or removes a record
    pub fn adds_or_removes(&self) -> bool {
        matches!(self, RecordChange::Created(_) | RecordChange::Deleted { .. })
    }
}

/// Pending changes for one collection
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    changes: Vec<RecordChange>,
    /// Incremented each time the changeset is drained
    generation: u64,
}

impl Changeset {
    pub fn new() -> Self {
        Changeset::default()
    }

    pub fn push(&mut self, change: RecordChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[RecordChange] {
        &self.changes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Drain changes, returning ownership and clearing the buffer
    pub fn drain(&mut self) -> Vec<RecordChange> {
        self.generation += 1;
        std::mem::take(&mut self.changes)
    }

    /// Apply and drain the pending changes.
    ///
    /// On conflict the changes are still drained: the caller is expected to
    /// reload the collection, which supersedes them.
    pub fn apply_to(&mut self, snapshot: &[Record]) -> Result<Vec<Record>> {
        let changes = self.drain();
        apply_changes(snapshot, &changes)
    }
}

/// Apply `changes` in order to `snapshot`, returning the patched snapshot.
///
/// Records keep their position; created records are appended. The input
/// snapshot is never modified, so a conflict leaves the caller's data
/// untouched.
pub fn apply_changes(snapshot: &[Record], changes: &[RecordChange]) -> Result<Vec<Record>> {
    let mut records: Vec<Option<Record>> = Vec::with_capacity(snapshot.len() + changes.len());
    let mut positions: HashMap<RecordId, usize> = HashMap::with_capacity(snapshot.len());

    for record in snapshot {
        if let Some(id) = record.id() {
            if positions.insert(id, records.len()).is_some() {
                return Err(Error::Conflict {
                    id: Some(id),
                    reason: "duplicate id in snapshot",
                });
            }
        }
        records.push(Some(record.clone()));
    }

    for change in changes {
        match change {
            RecordChange::Created(record) => {
                let id = record.id().ok_or(Error::Conflict {
                    id: None,
                    reason: "created record has no id",
                })?;
                if positions.contains_key(&id) {
                    return Err(Error::Conflict {
                        id: Some(id),
                        reason: "record already exists",
                    });
                }
                positions.insert(id, records.len());
                records.push(Some(record.clone()));
            }
            RecordChange::Updated { id, fields } => {
                let slot = positions
                    .get(id)
                    .and_then(|&pos| records[pos].as_mut())
                    .ok_or(Error::Conflict {
                        id: Some(*id),
                        reason: "record to update not found",
                    })?;
                let mut fields = fields.clone();
                // the id of a record is not patchable
                fields.remove(crate::record::ID_FIELD);
                *slot = slot.merged(&fields);
            }
            RecordChange::Deleted { id } => {
                let pos = positions.remove(id).ok_or(Error::Conflict {
                    id: Some(*id),
                    reason: "record to delete not found",
                })?;
                records[pos] = None;
            }
        }
        log::trace!("applied change to record {:?}", change.record_id());
    }

    Ok(records.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: RecordId, nombre: &str, cantidad: i64) -> Record {
        Record::builder()
            .id(id)
            .field("nombre", nombre)
            .field("cantidad", cantidad)
            .build()
    }

    fn snapshot() -> Vec<Record> {
        vec![product(1, "Martillo", 4), product(2, "Clavos", 100), product(3, "Sierra", 0)]
    }

    fn ids(records: &[Record]) -> Vec<Option<RecordId>> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn test_create_update_delete() {
        let mut fields = BTreeMap::new();
        fields.insert("cantidad".to_string(), FieldValue::Int(7));

        let changes = vec![
            RecordChange::Created(product(4, "Taladro", 2)),
            RecordChange::Updated { id: 1, fields },
            RecordChange::Deleted { id: 2 },
        ];
        let next = apply_changes(&snapshot(), &changes).unwrap();

        assert_eq!(ids(&next), vec![Some(1), Some(3), Some(4)]);
        assert_eq!(next[0].number("cantidad"), 7.0);
        assert_eq!(next[0].text("nombre"), Some("Martillo"));
    }

    #[test]
    fn test_conflicts() {
        let create_existing = [RecordChange::Created(product(2, "Otra", 1))];
        assert!(matches!(
            apply_changes(&snapshot(), &create_existing),
            Err(Error::Conflict { id: Some(2), .. })
        ));

        let update_missing = [RecordChange::Updated { id: 9, fields: BTreeMap::new() }];
        assert!(matches!(
            apply_changes(&snapshot(), &update_missing),
            Err(Error::Conflict { id: Some(9), .. })
        ));

        let delete_twice = [RecordChange::Deleted { id: 3 }, RecordChange::Deleted { id: 3 }];
        assert!(matches!(
            apply_changes(&snapshot(), &delete_twice),
            Err(Error::Conflict { id: Some(3), .. })
        ));

        let no_id = [RecordChange::Created(Record::builder().field("nombre", "x").build())];
        assert!(matches!(
            apply_changes(&snapshot(), &no_id),
            Err(Error::Conflict { id: None, .. })
        ));
    }

    #[test]
    fn test_update_cannot_change_id() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), FieldValue::Int(99));
        fields.insert("nombre".to_string(), FieldValue::from("Mazo"));

        let next = apply_changes(&snapshot(), &[RecordChange::Updated { id: 1, fields }]).unwrap();
        assert_eq!(next[0].id(), Some(1));
        assert_eq!(next[0].text("nombre"), Some("Mazo"));
    }

    #[test]
    fn test_recreate_after_delete() {
        let changes = [
            RecordChange::Deleted { id: 1 },
            RecordChange::Created(product(1, "Martillo nuevo", 1)),
        ];
        let next = apply_changes(&snapshot(), &changes).unwrap();
        assert_eq!(ids(&next), vec![Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_changeset_generation() {
        let mut changeset = Changeset::new();
        assert!(changeset.is_empty());

        changeset.push(RecordChange::Deleted { id: 3 });
        assert_eq!(changeset.len(), 1);
        assert!(changeset.changes()[0].adds_or_removes());

        let next = changeset.apply_to(&snapshot()).unwrap();
        assert_eq!(next.len(), 2);
        assert!(changeset.is_empty());
        assert_eq!(changeset.generation(), 1);
    }
}
