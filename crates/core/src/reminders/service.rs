//! Reminder service - one tick of the scheduling engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use agenda_domain::{EventId, OwnerId, Result};

use super::ports::Notifier;
use crate::clock::Clock;
use crate::events::ports::EventRepository;

/// Outcome of a single tick, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub dispatched: usize,
    pub dispatch_failures: usize,
}

/// Converts "wall-clock time has crossed an event's reminder threshold" into
/// "exactly one notification sent, with a durable record of having been
/// sent".
///
/// Exactly-once delivery rests on two legs: the selection window is sized to
/// the tick period, and every selected event is marked `reminded` before the
/// next tick can see it again.
pub struct ReminderService {
    events: Arc<dyn EventRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    window_minutes: i64,
}

impl ReminderService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        window_minutes: i64,
    ) -> Self {
        Self { events, notifier, clock, window_minutes }
    }

    /// Run one tick: select due events, dispatch one notification each, and
    /// mark the batch `reminded`.
    ///
    /// A dispatch failure for one recipient is logged and does not abort the
    /// rest of the batch. The affected event is still marked `reminded`
    /// (accepting a missed reminder over a duplicate one). Only the initial
    /// selection query can fail the tick as a whole.
    pub async fn run_tick(&self) -> Result<TickReport> {
        let now = self.clock.now();
        let due = self.events.find_due_reminders(now, self.window_minutes).await?;

        if due.is_empty() {
            debug!(%now, "no reminders due");
            return Ok(TickReport::default());
        }

        let mut report = TickReport { due: due.len(), ..TickReport::default() };
        let mut per_owner: BTreeMap<OwnerId, Vec<EventId>> = BTreeMap::new();

        for reminder in &due {
            let text = format!(
                "Reminder: {} in {} minutes",
                reminder.title, reminder.lead_minutes
            );
            match self.notifier.notify(reminder.owner_id, &text).await {
                Ok(()) => report.dispatched += 1,
                Err(err) => {
                    report.dispatch_failures += 1;
                    warn!(
                        owner = reminder.owner_id,
                        event = reminder.event_id,
                        error = %err,
                        "reminder dispatch failed"
                    );
                }
            }
            per_owner.entry(reminder.owner_id).or_default().push(reminder.event_id);
        }

        for (owner, event_ids) in per_owner {
            if let Err(err) = self.events.mark_reminded(owner, &event_ids).await {
                error!(owner, error = %err, "failed to mark reminded batch");
            }
        }

        info!(
            due = report.due,
            dispatched = report.dispatched,
            failures = report.dispatch_failures,
            "reminder tick completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};

    use agenda_domain::{AgendaError, DueReminder, Event, EventStatus, NewEvent};

    use super::*;

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    /// Scripted repository: hands out a fixed due batch once and records the
    /// reminded ids it is asked to persist.
    #[derive(Default)]
    struct ScriptedRepository {
        due: Mutex<Vec<DueReminder>>,
        reminded: Mutex<Vec<(OwnerId, Vec<EventId>)>>,
        fail_marks: bool,
    }

    #[async_trait]
    impl EventRepository for ScriptedRepository {
        async fn create_event(&self, _event: NewEvent) -> agenda_domain::Result<EventId> {
            Err(AgendaError::Internal("not used".into()))
        }

        async fn list_events_for_date(
            &self,
            _owner: OwnerId,
            _date: NaiveDate,
        ) -> agenda_domain::Result<Vec<Event>> {
            Ok(Vec::new())
        }

        async fn list_all_events(&self, _owner: OwnerId) -> agenda_domain::Result<Vec<Event>> {
            Ok(Vec::new())
        }

        async fn delete_event(
            &self,
            _id: EventId,
            _owner: OwnerId,
        ) -> agenda_domain::Result<bool> {
            Ok(false)
        }

        async fn set_status(
            &self,
            _id: EventId,
            _owner: OwnerId,
            _status: EventStatus,
        ) -> agenda_domain::Result<bool> {
            Ok(false)
        }

        async fn find_due_reminders(
            &self,
            _now: NaiveDateTime,
            _window_minutes: i64,
        ) -> agenda_domain::Result<Vec<DueReminder>> {
            Ok(std::mem::take(&mut *self.due.lock().unwrap()))
        }

        async fn mark_reminded(
            &self,
            owner: OwnerId,
            event_ids: &[EventId],
        ) -> agenda_domain::Result<()> {
            if self.fail_marks {
                return Err(AgendaError::Database("write failed".into()));
            }
            self.reminded.lock().unwrap().push((owner, event_ids.to_vec()));
            Ok(())
        }
    }

    /// Recording notifier that can be told to fail for specific owners.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(OwnerId, String)>>,
        fail_for: Vec<OwnerId>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, owner: OwnerId, text: &str) -> agenda_domain::Result<()> {
            if self.fail_for.contains(&owner) {
                return Err(AgendaError::Dispatch(format!("owner {owner} unreachable")));
            }
            self.sent.lock().unwrap().push((owner, text.to_string()));
            Ok(())
        }
    }

    fn due(owner: OwnerId, event_id: EventId, title: &str) -> DueReminder {
        DueReminder { owner_id: owner, event_id, title: title.into(), lead_minutes: 60 }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 11).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn build(
        repo: Arc<ScriptedRepository>,
        notifier: Arc<RecordingNotifier>,
    ) -> ReminderService {
        ReminderService::new(repo, notifier, Arc::new(FixedClock(noon())), 1)
    }

    #[tokio::test]
    async fn tick_dispatches_and_marks_batches_per_owner() {
        let repo = Arc::new(ScriptedRepository::default());
        *repo.due.lock().unwrap() = vec![
            due(1, 10, "Standup"),
            due(1, 11, "Review"),
            due(2, 20, "Dentist"),
        ];
        let notifier = Arc::new(RecordingNotifier::default());
        let service = build(Arc::clone(&repo), Arc::clone(&notifier));

        let report = service.run_tick().await.unwrap();
        assert_eq!(report, TickReport { due: 3, dispatched: 3, dispatch_failures: 0 });

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].1, "Reminder: Standup in 60 minutes");

        let reminded = repo.reminded.lock().unwrap();
        assert_eq!(*reminded, vec![(1, vec![10, 11]), (2, vec![20])]);
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_abort_batch_and_still_marks_reminded() {
        let repo = Arc::new(ScriptedRepository::default());
        *repo.due.lock().unwrap() = vec![due(1, 10, "Standup"), due(2, 20, "Dentist")];
        let notifier =
            Arc::new(RecordingNotifier { fail_for: vec![1], ..Default::default() });
        let service = build(Arc::clone(&repo), Arc::clone(&notifier));

        let report = service.run_tick().await.unwrap();
        assert_eq!(report, TickReport { due: 2, dispatched: 1, dispatch_failures: 1 });

        // Owner 2 was still notified despite owner 1 being unreachable.
        assert_eq!(notifier.sent.lock().unwrap()[0].0, 2);
        // Both events are marked reminded, including the failed dispatch.
        let reminded = repo.reminded.lock().unwrap();
        assert_eq!(*reminded, vec![(1, vec![10]), (2, vec![20])]);
    }

    #[tokio::test]
    async fn empty_selection_is_a_quiet_tick() {
        let repo = Arc::new(ScriptedRepository::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = build(Arc::clone(&repo), Arc::clone(&notifier));

        let report = service.run_tick().await.unwrap();
        assert_eq!(report, TickReport::default());
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(repo.reminded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_failure_is_contained_to_the_tick() {
        let repo = Arc::new(ScriptedRepository { fail_marks: true, ..Default::default() });
        *repo.due.lock().unwrap() = vec![due(1, 10, "Standup")];
        let notifier = Arc::new(RecordingNotifier::default());
        let service = build(Arc::clone(&repo), Arc::clone(&notifier));

        // The status write failure is logged, not propagated.
        let report = service.run_tick().await.unwrap();
        assert_eq!(report.dispatched, 1);
    }
}
