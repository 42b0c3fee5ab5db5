use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use trip_tracker_lib::{transport_mode::TransportMode, trip_record::TripRecord, trip_status::TripStatus};

use crate::{
    clock::{Clock, SystemClock},
    controller::TripController,
    distance::{DistanceEstimator, RandomDistance},
    presets::Preset,
    store::{DatasetSource, DatasetStore},
    TripError, DEFAULT_LABEL_PREFIX, DEFAULT_MAX_DISTANCE_KM, EVENT_CHANNEL_CAPACITY,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub initial_preset: Preset,
    pub default_mode: TransportMode,
    pub label_prefix: String,
    pub max_distance_km: f64,
    pub distance_seed: Option<u64>,
    /// Append finished trips to the displayed dataset.
    pub merge_completed_trips: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_preset: Preset::Initial,
            default_mode: TransportMode::Car,
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            distance_seed: None,
            merge_completed_trips: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartTrip,
    EndTrip,
    CancelTrip,
    RefreshData(Preset),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    TripStarted { started_at: DateTime<Utc> },
    TripEnded { record: TripRecord, merged: bool },
    TripCancelled,
    DataRefreshed { records: usize, revision: u64 },
}

/// What the trip panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPanel {
    pub status: TripStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<i64>,
    pub summary: Option<TripRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub panel: TripPanel,
    pub trips: Vec<TripRecord>,
    pub revision: u64,
}

/// Owns the controller and the dataset for one user session.
pub struct Session {
    controller: TripController,
    store: DatasetStore,
    merge_completed_trips: bool,
    tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let distance = match config.distance_seed {
            Some(seed) => RandomDistance::seeded(seed, config.max_distance_km),
            None => RandomDistance::new(config.max_distance_km),
        };
        Self::with_parts(config, Box::new(SystemClock), Box::new(distance))
    }

    pub fn with_parts(config: SessionConfig, clock: Box<dyn Clock>, distance: Box<dyn DistanceEstimator>) -> Self {
        let store = DatasetStore::new(config.initial_preset.records());
        let mut controller = TripController::new(clock, distance)
            .with_mode(config.default_mode)
            .with_label_prefix(config.label_prefix);
        controller.reserve_labels(store.current());

        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!("Session started with {} trips from the {} preset", store.len(), config.initial_preset);

        Self {
            controller,
            store,
            merge_completed_trips: config.merge_completed_trips,
            tx,
        }
    }

    pub fn controller(&self) -> &TripController {
        &self.controller
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn dispatch(&mut self, action: Action) -> Result<SessionEvent, TripError> {
        let event = match action {
            Action::StartTrip => {
                let started_at = self.controller.start()?;
                SessionEvent::TripStarted { started_at }
            },
            Action::EndTrip => {
                let record = self.controller.end()?;
                if self.merge_completed_trips {
                    self.store.append(record.clone());
                }
                SessionEvent::TripEnded { record, merged: self.merge_completed_trips }
            },
            Action::CancelTrip => {
                self.controller.cancel()?;
                SessionEvent::TripCancelled
            },
            Action::RefreshData(preset) => return Ok(self.refresh_from(&preset)),
        };

        self.publish(event.clone());
        Ok(event)
    }

    /// Replaces the dataset from any source, not just the presets.
    pub fn refresh_from<S: DatasetSource + ?Sized>(&mut self, source: &S) -> SessionEvent {
        self.store.refresh(source);
        self.controller.reserve_labels(self.store.current());

        let event = SessionEvent::DataRefreshed {
            records: self.store.len(),
            revision: self.store.revision(),
        };
        self.publish(event.clone());
        event
    }

    pub fn panel(&self) -> TripPanel {
        TripPanel {
            status: self.controller.status(),
            started_at: self.controller.started_at(),
            elapsed_seconds: self.controller.active_elapsed().map(|elapsed| elapsed.num_seconds()),
            summary: self.controller.last_summary().cloned(),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            panel: self.panel(),
            trips: self.store.current().to_vec(),
            revision: self.store.revision(),
        }
    }

    fn publish(&self, event: SessionEvent) {
        // Err only means nobody is subscribed.
        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for session event");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::{
        clock::ManualClock,
        distance::{FixedDistance, RandomDistance},
        TripAction,
    };

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn session(config: SessionConfig) -> (Session, ManualClock) {
        let clock = ManualClock::new(t0());
        let session = Session::with_parts(config, Box::new(clock.clone()), Box::new(FixedDistance(6.5)));
        (session, clock)
    }

    #[test]
    fn first_trip_continues_preset_labels() {
        let (mut session, clock) = session(SessionConfig::default());
        session.dispatch(Action::StartTrip).unwrap();
        clock.advance(TimeDelta::minutes(30));

        let event = session.dispatch(Action::EndTrip).unwrap();
        let expected = TripRecord::new("Trip 6", 30, 6.5, TransportMode::Car);
        assert_eq!(event, SessionEvent::TripEnded { record: expected.clone(), merged: true });
        assert_eq!(session.store().len(), 6);
        assert_eq!(session.store().current()[5], expected);
        assert_eq!(session.store().current(), Preset::PostTrip.records().as_slice());
    }

    #[test]
    fn disjoint_mode_does_not_touch_dataset() {
        let config = SessionConfig {
            merge_completed_trips: false,
            ..SessionConfig::default()
        };
        let (mut session, _) = session(config);
        session.dispatch(Action::StartTrip).unwrap();
        let event = session.dispatch(Action::EndTrip).unwrap();

        assert!(matches!(event, SessionEvent::TripEnded { merged: false, .. }));
        assert_eq!(session.store().current(), Preset::Initial.records().as_slice());
        assert_eq!(session.store().revision(), 0);
        assert!(session.panel().summary.is_some());
    }

    #[test]
    fn rejected_end_leaves_everything_unchanged() {
        let (mut session, _) = session(SessionConfig::default());
        session.dispatch(Action::StartTrip).unwrap();
        let summary = match session.dispatch(Action::EndTrip).unwrap() {
            SessionEvent::TripEnded { record, .. } => record,
            other => panic!("unexpected event {other:?}"),
        };

        let mut rx = session.subscribe();
        let err = session.dispatch(Action::EndTrip).unwrap_err();
        assert_eq!(err, TripError::InvalidStateTransition { from: TripStatus::Summarized, action: TripAction::End });
        assert_eq!(session.panel().summary, Some(summary));
        assert_eq!(session.store().len(), 6);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn events_reach_subscribers_in_order() {
        let (mut session, clock) = session(SessionConfig::default());
        let mut rx = session.subscribe();

        session.dispatch(Action::StartTrip).unwrap();
        clock.advance(TimeDelta::minutes(4));
        session.dispatch(Action::CancelTrip).unwrap();
        session.dispatch(Action::RefreshData(Preset::PostTrip)).unwrap();

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::TripStarted { started_at: t0() });
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::TripCancelled);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::DataRefreshed { records: 6, revision: 1 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn refresh_keeps_new_labels_unique() {
        let (mut session, _) = session(SessionConfig::default());
        session.dispatch(Action::RefreshData(Preset::PostTrip)).unwrap();
        session.dispatch(Action::StartTrip).unwrap();
        session.dispatch(Action::EndTrip).unwrap();

        let labels: Vec<&str> = session.store().current().iter().map(TripRecord::label).collect();
        assert_eq!(labels.last(), Some(&"Trip 7"));
        assert_eq!(labels.len(), 7);
    }

    #[test]
    fn refresh_twice_is_stable() {
        let (mut session, _) = session(SessionConfig::default());
        session.dispatch(Action::RefreshData(Preset::PostTrip)).unwrap();
        let first = session.store().current().to_vec();
        session.dispatch(Action::RefreshData(Preset::PostTrip)).unwrap();
        assert_eq!(session.store().current(), first.as_slice());
    }

    #[test]
    fn refresh_from_custom_source() {
        let (mut session, _) = session(SessionConfig::default());
        let source = vec![TripRecord::new("Commute", 45, 12.0, TransportMode::Train)];
        let event = session.refresh_from(&source);
        assert_eq!(event, SessionEvent::DataRefreshed { records: 1, revision: 1 });
        assert_eq!(session.controller().next_label(), "Trip 6");
    }

    #[test]
    fn merged_trip_never_reuses_refreshed_label() {
        let (mut session, _) = session(SessionConfig::default());
        let source = vec![
            TripRecord::new("Trip 6", 12, 2.0, TransportMode::Bus),
            TripRecord::new("Trip 9", 30, 8.0, TransportMode::Train),
        ];
        session.refresh_from(&source);
        session.dispatch(Action::StartTrip).unwrap();
        session.dispatch(Action::EndTrip).unwrap();

        let labels: Vec<&str> = session.store().current().iter().map(TripRecord::label).collect();
        assert_eq!(labels, ["Trip 6", "Trip 9", "Trip 10"]);
    }

    #[test]
    fn summarized_panel_keeps_start_time() {
        let (mut session, clock) = session(SessionConfig::default());
        session.dispatch(Action::StartTrip).unwrap();
        clock.advance(TimeDelta::minutes(25));
        session.dispatch(Action::EndTrip).unwrap();

        let panel = session.panel();
        assert_eq!(panel.status, TripStatus::Summarized);
        assert_eq!(panel.started_at, Some(t0()));
        assert_eq!(panel.elapsed_seconds, None);
    }

    #[test]
    fn panel_reflects_active_trip() {
        let (mut session, clock) = session(SessionConfig::default());
        assert_eq!(session.panel().status, TripStatus::Idle);

        session.dispatch(Action::StartTrip).unwrap();
        clock.advance(TimeDelta::seconds(125));

        let panel = session.panel();
        assert_eq!(panel.status, TripStatus::Active);
        assert_eq!(panel.started_at, Some(t0()));
        assert_eq!(panel.elapsed_seconds, Some(125));
        assert!(panel.summary.is_none());
    }

    #[test]
    fn snapshot_serializes() {
        let (session, _) = session(SessionConfig::default());
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["panel"]["status"], "idle");
        assert_eq!(json["trips"].as_array().unwrap().len(), 5);
        assert_eq!(json["trips"][1]["mode"], "Bus");
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let config = SessionConfig {
            distance_seed: Some(9),
            ..SessionConfig::default()
        };
        let mut a = Session::with_parts(config.clone(), Box::new(ManualClock::new(t0())), Box::new(RandomDistance::seeded(9, 10.0)));
        let mut b = Session::new(config);

        a.dispatch(Action::StartTrip).unwrap();
        b.dispatch(Action::StartTrip).unwrap();
        let a = a.dispatch(Action::EndTrip).unwrap();
        let b = b.dispatch(Action::EndTrip).unwrap();

        match (a, b) {
            (SessionEvent::TripEnded { record: a, .. }, SessionEvent::TripEnded { record: b, .. }) => {
                assert_eq!(a.distance_km(), b.distance_km());
            },
            other => panic!("unexpected events {other:?}"),
        }
    }
}
