use trip_tracker_lib::trip_record::TripRecord;

use crate::presets::Preset;

/// Anything the dataset can be refreshed from.
pub trait DatasetSource {
    fn load(&self) -> Vec<TripRecord>;
}

impl DatasetSource for Preset {
    fn load(&self) -> Vec<TripRecord> {
        self.records()
    }
}

impl DatasetSource for [TripRecord] {
    fn load(&self) -> Vec<TripRecord> {
        self.to_vec()
    }
}

impl DatasetSource for Vec<TripRecord> {
    fn load(&self) -> Vec<TripRecord> {
        self.clone()
    }
}

/// The ordered trips shown on the dashboard. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    records: Vec<TripRecord>,
    revision: u64,
}

impl DatasetStore {
    pub fn new(records: Vec<TripRecord>) -> Self {
        Self { records, revision: 0 }
    }

    pub fn current(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bumped on every mutation, including refreshes to identical contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the whole dataset. The source is loaded fully before the swap.
    pub fn refresh<S: DatasetSource + ?Sized>(&mut self, source: &S) {
        let records = source.load();
        tracing::debug!("Refreshing dataset: {} -> {} records", self.records.len(), records.len());
        self.records = records;
        self.revision += 1;
    }

    pub fn append(&mut self, record: TripRecord) {
        tracing::debug!("Appending {} to dataset", record.label());
        self.records.push(record);
        self.revision += 1;
    }

    pub fn max_duration(&self) -> Option<u32> {
        self.records.iter().map(TripRecord::duration_minutes).max()
    }
}
