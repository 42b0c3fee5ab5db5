use trip_tracker_core::{presets::Preset, Action};

/// A line typed into the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    Status,
    Chart,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  start                      start a trip
  end                        end the active trip and show its summary
  cancel                     discard the active trip
  refresh [initial|post-trip] replace the dashboard data (default post-trip)
  status                     show the trip panel
  chart                      show trip durations
  json                       print the full dashboard state as JSON
  help                       show this text
  quit                       leave";

impl Command {
    /// Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument: {extra}"));
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("start", None) => Command::Action(Action::StartTrip),
            ("end" | "stop", None) => Command::Action(Action::EndTrip),
            ("cancel", None) => Command::Action(Action::CancelTrip),
            ("refresh", None) => Command::Action(Action::RefreshData(Preset::PostTrip)),
            ("refresh", Some(preset)) => Command::Action(Action::RefreshData(preset.parse()?)),
            ("status", None) => Command::Status,
            ("chart", None) => Command::Chart,
            ("json", None) => Command::Json,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            (_, Some(arg)) => return Err(format!("unexpected argument: {arg}")),
            (verb, None) => return Err(format!("unknown command: {verb} (type `help`)")),
        };

        Ok(Some(command))
    }
}
