//! Optimistic status/priority updates.
//!
//! [`PendingUpdates`] owns the bookkeeping for in-flight field changes. A
//! change is applied to the local item straight away and stamped with a
//! request token; only the most recent token for an (item, field) pair is
//! allowed to apply its outcome, so a slow response to an earlier request can
//! never undo a later one.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::model::work_item::{Field, FieldChange, ItemId, WorkItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("work item #{0} is not in the current list")]
    UnknownItem(ItemId),
}

pub type RequestToken = u64;

/// One issued update: what was asked for, what it replaced, and its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedUpdate {
    pub item_id: ItemId,
    pub change: FieldChange,
    pub previous: FieldChange,
    pub token: RequestToken,
}

impl IssuedUpdate {
    pub fn field(&self) -> Field {
        self.change.field()
    }
}

/// How a backing response was reconciled with local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The latest request succeeded; the optimistic value stays.
    Confirmed,
    /// The latest request failed; the field was restored.
    RolledBack { restored: FieldChange, error: String },
    /// A newer request for the same pair exists; the outcome was ignored.
    Superseded,
    /// The item left the collection while the request was in flight.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    token: RequestToken,
    intended: FieldChange,
}

#[derive(Debug, Default)]
pub struct PendingUpdates {
    next_token: RequestToken,
    in_flight: HashMap<(ItemId, Field), InFlight>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `change` to the item locally and record it as in flight.
    /// The caller is responsible for sending the returned update to the
    /// backend and feeding the outcome to [`PendingUpdates::resolve`].
    pub fn begin(
        &mut self,
        items: &mut [WorkItem],
        item_id: ItemId,
        change: FieldChange,
    ) -> Result<IssuedUpdate, MutationError> {
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(MutationError::UnknownItem(item_id))?;

        let previous = item.field_value(change.field());
        item.apply(change);

        self.next_token += 1;
        let token = self.next_token;
        let superseded = self
            .in_flight
            .insert(
                (item_id, change.field()),
                InFlight {
                    token,
                    intended: change,
                },
            )
            .map(|f| f.token);

        info!(item_id, %change, token, ?superseded, "optimistic update issued");

        Ok(IssuedUpdate {
            item_id,
            change,
            previous,
            token,
        })
    }

    /// Reconcile the outcome of `update` with the collection.
    pub fn resolve(
        &mut self,
        items: &mut [WorkItem],
        update: &IssuedUpdate,
        outcome: Result<(), BackendError>,
    ) -> Resolution {
        let key = (update.item_id, update.field());
        let is_latest = self
            .in_flight
            .get(&key)
            .is_some_and(|latest| latest.token == update.token);
        if !is_latest {
            debug!(
                item_id = update.item_id,
                token = update.token,
                failed = outcome.is_err(),
                "superseded update outcome ignored"
            );
            return Resolution::Superseded;
        }
        self.in_flight.remove(&key);

        let Some(item) = items.iter_mut().find(|i| i.id == update.item_id) else {
            debug!(item_id = update.item_id, token = update.token, "stale update outcome dropped");
            return Resolution::Stale;
        };

        match outcome {
            Ok(()) => {
                info!(item_id = update.item_id, change = %update.change, token = update.token, "update confirmed");
                Resolution::Confirmed
            }
            Err(e) => {
                item.apply(update.previous);
                warn!(
                    item_id = update.item_id,
                    restored = %update.previous,
                    token = update.token,
                    error = %e,
                    "update failed, rolled back"
                );
                Resolution::RolledBack {
                    restored: update.previous,
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_pending(&self, item_id: ItemId, field: Field) -> bool {
        self.in_flight.contains_key(&(item_id, field))
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Lay in-flight values over a freshly fetched collection, and forget
    /// requests whose item is gone.
    pub fn reapply(&mut self, items: &mut [WorkItem]) {
        self.in_flight.retain(|(item_id, _), flight| {
            match items.iter_mut().find(|i| i.id == *item_id) {
                Some(item) => {
                    item.apply(flight.intended);
                    true
                }
                None => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::item;
    use crate::model::work_item::{Priority, Status};

    fn items() -> Vec<WorkItem> {
        vec![
            item(5, "Ship release", Status::Pending, Priority::Low),
            item(6, "Write notes", Status::InProgress, Priority::High),
        ]
    }

    fn failure() -> Result<(), BackendError> {
        Err(BackendError::Status {
            status: 500,
            body: "boom".into(),
        })
    }

    fn status_of(items: &[WorkItem], id: ItemId) -> Status {
        items.iter().find(|i| i.id == id).map(|i| i.status).unwrap()
    }

    #[test]
    fn begin_applies_immediately_and_marks_pending() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let update = pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();

        assert_eq!(status_of(&items, 5), Status::Completed);
        assert_eq!(update.previous, FieldChange::Status(Status::Pending));
        assert!(pending.is_pending(5, Field::Status));
        assert!(!pending.is_pending(5, Field::Priority));
    }

    #[test]
    fn success_clears_marker_and_keeps_value() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let update = pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();

        assert_eq!(pending.resolve(&mut items, &update, Ok(())), Resolution::Confirmed);
        assert_eq!(status_of(&items, 5), Status::Completed);
        assert!(pending.is_empty());
    }

    #[test]
    fn failure_reverts_to_previous_value() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let update = pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();

        let resolution = pending.resolve(&mut items, &update, failure());
        assert!(matches!(
            resolution,
            Resolution::RolledBack {
                restored: FieldChange::Status(Status::Pending),
                ..
            }
        ));
        assert_eq!(status_of(&items, 5), Status::Pending);
        assert!(!pending.is_pending(5, Field::Status));
    }

    #[test]
    fn unknown_item_issues_nothing() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let err = pending
            .begin(&mut items, 99, FieldChange::Status(Status::Completed))
            .unwrap_err();
        assert_eq!(err, MutationError::UnknownItem(99));
        assert!(pending.is_empty());
    }

    #[test]
    fn later_request_wins_in_either_response_order() {
        for first_response_fails in [false, true] {
            for first_arrives_first in [false, true] {
                let mut items = items();
                let mut pending = PendingUpdates::new();
                let first = pending
                    .begin(&mut items, 5, FieldChange::Status(Status::InProgress))
                    .unwrap();
                let second = pending
                    .begin(&mut items, 5, FieldChange::Status(Status::Completed))
                    .unwrap();
                assert!(second.token > first.token);

                let first_outcome = if first_response_fails { failure() } else { Ok(()) };
                if first_arrives_first {
                    assert_eq!(
                        pending.resolve(&mut items, &first, first_outcome),
                        Resolution::Superseded
                    );
                    assert!(pending.is_pending(5, Field::Status));
                    pending.resolve(&mut items, &second, Ok(()));
                } else {
                    pending.resolve(&mut items, &second, Ok(()));
                    assert_eq!(
                        pending.resolve(&mut items, &first, first_outcome),
                        Resolution::Superseded
                    );
                }

                assert_eq!(status_of(&items, 5), Status::Completed);
                assert!(pending.is_empty());
            }
        }
    }

    #[test]
    fn later_failure_restores_its_own_previous_value() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let first = pending
            .begin(&mut items, 5, FieldChange::Status(Status::InProgress))
            .unwrap();
        let second = pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();

        pending.resolve(&mut items, &first, Ok(()));
        pending.resolve(&mut items, &second, failure());
        assert_eq!(status_of(&items, 5), Status::InProgress);
    }

    #[test]
    fn status_and_priority_are_independent() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let status = pending
            .begin(&mut items, 6, FieldChange::Status(Status::Completed))
            .unwrap();
        let priority = pending
            .begin(&mut items, 6, FieldChange::Priority(Priority::Medium))
            .unwrap();

        assert!(matches!(
            pending.resolve(&mut items, &priority, failure()),
            Resolution::RolledBack { .. }
        ));
        assert!(pending.is_pending(6, Field::Status));
        assert_eq!(pending.resolve(&mut items, &status, Ok(())), Resolution::Confirmed);

        let item = items.iter().find(|i| i.id == 6).unwrap();
        assert_eq!(item.status, Status::Completed);
        assert_eq!(item.priority, Priority::High);
    }

    #[test]
    fn removed_item_outcome_is_stale() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        let update = pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();
        items.retain(|i| i.id != 5);

        assert_eq!(pending.resolve(&mut items, &update, failure()), Resolution::Stale);
        assert!(pending.is_empty());
    }

    #[test]
    fn reapply_keeps_optimistic_value_over_refresh() {
        let mut items = items();
        let mut pending = PendingUpdates::new();
        pending
            .begin(&mut items, 5, FieldChange::Status(Status::Completed))
            .unwrap();
        pending
            .begin(&mut items, 6, FieldChange::Priority(Priority::Low))
            .unwrap();

        // server has not seen the change to #5 yet, and #6 was deleted
        let mut fresh = vec![item(5, "Ship release", Status::Pending, Priority::Low)];
        pending.reapply(&mut fresh);

        assert_eq!(fresh[0].status, Status::Completed);
        assert!(pending.is_pending(5, Field::Status));
        assert!(!pending.is_pending(6, Field::Priority));
        assert_eq!(pending.len(), 1);
    }
}
