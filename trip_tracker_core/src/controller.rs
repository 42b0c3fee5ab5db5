use chrono::{DateTime, TimeDelta, Utc};
use trip_tracker_lib::{transport_mode::TransportMode, trip_record::TripRecord, trip_status::TripStatus};

use crate::{clock::Clock, distance::DistanceEstimator, TripAction, TripError, DEFAULT_LABEL_PREFIX};

#[derive(Debug, Clone, PartialEq)]
enum TripState {
    Idle,
    Active { started_at: DateTime<Utc> },
    Summarized { started_at: DateTime<Utc>, summary: TripRecord },
}

/// Start/stop lifecycle of a single trip.
///
/// `Idle --start--> Active --end--> Summarized --start--> Active ...`
/// An active trip can also be cancelled back to `Idle` without producing a record.
pub struct TripController {
    state: TripState,
    clock: Box<dyn Clock>,
    distance: Box<dyn DistanceEstimator>,
    mode: TransportMode,
    label_prefix: String,
    next_index: u32,
}

impl TripController {
    pub fn new(clock: Box<dyn Clock>, distance: Box<dyn DistanceEstimator>) -> Self {
        Self {
            state: TripState::Idle,
            clock,
            distance,
            mode: TransportMode::Car,
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            next_index: 1,
        }
    }

    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Number used in the label of the next finished trip.
    pub fn with_first_index(mut self, index: u32) -> Self {
        self.next_index = index;
        self
    }

    /// Moves the label counter past every `"{prefix} N"` label in `records`,
    /// so new labels stay unique in the displayed batch. The counter never goes back.
    pub fn reserve_labels(&mut self, records: &[TripRecord]) {
        let highest = records
            .iter()
            .filter_map(|record| record.label().strip_prefix(self.label_prefix.as_str()))
            .filter_map(|rest| rest.strip_prefix(' '))
            .filter_map(|number| number.parse::<u32>().ok())
            .max();

        if let Some(highest) = highest {
            self.next_index = self.next_index.max(highest.saturating_add(1));
        }
    }

    pub fn status(&self) -> TripStatus {
        match self.state {
            TripState::Idle => TripStatus::Idle,
            TripState::Active { .. } => TripStatus::Active,
            TripState::Summarized { .. } => TripStatus::Summarized,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            TripState::Active { started_at } | TripState::Summarized { started_at, .. } => Some(started_at),
            TripState::Idle => None,
        }
    }

    pub fn last_summary(&self) -> Option<&TripRecord> {
        match &self.state {
            TripState::Summarized { summary, .. } => Some(summary),
            _ => None,
        }
    }

    pub fn next_label(&self) -> String {
        format!("{} {}", self.label_prefix, self.next_index)
    }

    pub fn start(&mut self) -> Result<DateTime<Utc>, TripError> {
        if self.status().is_active() {
            return Err(self.reject(TripAction::Start));
        }

        let started_at = self.clock.now();
        self.state = TripState::Active { started_at };
        tracing::info!("Trip started at {}", started_at);
        Ok(started_at)
    }

    pub fn end(&mut self) -> Result<TripRecord, TripError> {
        let TripState::Active { started_at } = self.state else {
            return Err(self.reject(TripAction::End));
        };

        let ended_at = self.clock.now();
        let elapsed = ended_at - started_at;
        if elapsed < TimeDelta::zero() {
            tracing::warn!("Refusing to end trip: clock went back from {} to {}", started_at, ended_at);
            return Err(TripError::ClockSkew { started_at, ended_at });
        }

        let duration_minutes = u32::try_from(elapsed.num_minutes()).unwrap_or(u32::MAX);
        let distance_km = self.distance.estimate(started_at, ended_at);
        let record = TripRecord::new(self.next_label(), duration_minutes, distance_km, self.mode.clone());

        self.next_index = self.next_index.saturating_add(1);
        self.state = TripState::Summarized { started_at, summary: record.clone() };

        tracing::info!(
            "Trip ended: {} took {} min over {} km by {}",
            record.label(),
            record.duration_minutes(),
            record.distance_km(),
            record.mode()
        );
        Ok(record)
    }

    /// Discards the active trip. No record is produced and the label counter is not advanced.
    pub fn cancel(&mut self) -> Result<(), TripError> {
        let TripState::Active { started_at } = self.state else {
            return Err(self.reject(TripAction::Cancel));
        };

        self.state = TripState::Idle;
        tracing::info!("Trip started at {} was cancelled", started_at);
        Ok(())
    }

    /// Time since the active trip started, `None` unless a trip is active.
    pub fn active_elapsed(&self) -> Option<TimeDelta> {
        match self.state {
            TripState::Active { started_at } => Some(self.clock.now() - started_at),
            _ => None,
        }
    }

    fn reject(&self, action: TripAction) -> TripError {
        let from = self.status();
        tracing::warn!("Rejected {} while trip is {}", action, from);
        TripError::InvalidStateTransition { from, action }
    }
}
