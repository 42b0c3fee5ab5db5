use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use trip_tracker_core::{DatasetStore, SessionEvent, TripPanel};
use trip_tracker_lib::trip_status::TripStatus;

const BAR: char = '#';

pub fn panel(panel: &TripPanel) -> String {
    match panel.status {
        TripStatus::Active => {
            let mut out = String::from("Trip in progress...");
            if let Some(started_at) = panel.started_at {
                let _ = write!(out, "\n  Started at: {}", local_time(started_at));
            }
            if let Some(seconds) = panel.elapsed_seconds {
                let _ = write!(out, "\n  Elapsed: {}", elapsed(seconds));
            }
            out
        },
        TripStatus::Summarized => match &panel.summary {
            Some(summary) => format!(
                "Trip Summary ({})\n  Duration: {} mins\n  Distance: {:.1} km\n  Mode: {}",
                summary.label(),
                summary.duration_minutes(),
                summary.distance_km(),
                summary.mode()
            ),
            None => String::from("Trip Summary unavailable"),
        },
        TripStatus::Idle => String::from("No trip in progress. Type `start` to begin."),
    }
}

/// Horizontal bars keyed by duration, scaled so the longest trip fills `width`.
pub fn chart(store: &DatasetStore, width: usize) -> String {
    let mut out = String::from("Ridership Trends");
    let records = store.current();
    if records.is_empty() {
        out.push_str("\n  (no trips)");
        return out;
    }

    let max = store.max_duration().unwrap_or(0);
    let label_width = records.iter().map(|r| r.label().chars().count()).max().unwrap_or(0);

    for record in records {
        let duration = record.duration_minutes();
        let bar_len = if max == 0 {
            0
        } else {
            let scaled = (duration as f64 / max as f64 * width as f64).round() as usize;
            if duration > 0 { scaled.max(1) } else { 0 }
        };
        let bar: String = std::iter::repeat_n(BAR, bar_len).collect();
        let _ = write!(out, "\n  {:<label_width$} |{} {} min", record.label(), bar, duration);
    }
    out
}

pub fn event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::TripStarted { started_at } => format!("Trip started at {}", local_time(*started_at)),
        SessionEvent::TripEnded { record, merged: true } => format!("{} recorded and added to the dashboard", record.label()),
        SessionEvent::TripEnded { record, merged: false } => format!("{} recorded", record.label()),
        SessionEvent::TripCancelled => String::from("Trip cancelled"),
        SessionEvent::DataRefreshed { records, .. } => format!("Dashboard refreshed with {records} trips"),
    }
}

/// Line printed by the live timer, only while a trip is active.
pub fn live_line(panel: &TripPanel) -> Option<String> {
    match (panel.status, panel.elapsed_seconds) {
        (TripStatus::Active, Some(seconds)) => Some(format!("Trip in progress... {}", elapsed(seconds))),
        _ => None,
    }
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn elapsed(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}")
    }
}
