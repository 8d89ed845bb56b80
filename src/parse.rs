//! Extraction of machine status events from notifier messages.
//!
//! The notifier posts messages of the form `"<machine> is now <status...>"`,
//! for example `"Laser Cutter is now in use by Alice"`.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;
use usagewatch_types::{Event, Message, Status};

/// Separator between the machine name and its status.
pub const STATUS_SEPARATOR: &str = " is now ";

/// Sender name the notifier posts under by default.
pub const DEFAULT_NOTIFIER: &str = "incoming-webhook";

/// Events per machine, machines in first-seen order, each list in message
/// order.
pub type MachineEvents = IndexMap<String, Vec<Event>>;

/// A notifier message whose text does not carry a recognizable status.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unable to parse valid status from {text:?}")]
pub struct UnparseableEvent {
    pub text: String,
    pub timestamp: f64,
}

/// Everything extracted from a batch of messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub events: MachineEvents,
    /// Notifier messages that were dropped.
    pub unparseable: Vec<UnparseableEvent>,
    /// Messages from other senders.
    pub ignored: usize,
}

impl ParseReport {
    /// Total number of events across all machines.
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

/// Parses notifier messages into per-machine events.
#[derive(Debug, Clone)]
pub struct EventParser {
    notifier: String,
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFIER)
    }
}

impl EventParser {
    /// Create a parser that only trusts messages from `notifier`.
    pub fn new(notifier: impl Into<String>) -> Self {
        Self {
            notifier: notifier.into(),
        }
    }

    /// Returns the trusted sender name.
    pub fn notifier(&self) -> &str {
        &self.notifier
    }

    /// Group the notifier's status messages by machine.
    pub fn parse(&self, messages: &[Message]) -> ParseReport {
        let mut report = ParseReport::default();

        for message in messages {
            if !message.is_from(&self.notifier) {
                report.ignored += 1;
                continue;
            }

            match parse_event(message) {
                Ok(event) => report
                    .events
                    .entry(event.machine.clone())
                    .or_default()
                    .push(event),
                Err(unparseable) => {
                    warn!(text = %unparseable.text, "{}", unparseable);
                    report.unparseable.push(unparseable);
                }
            }
        }

        report
    }
}

/// Parse a single status message.
pub fn parse_event(message: &Message) -> Result<Event, UnparseableEvent> {
    let unparseable = || UnparseableEvent {
        text: message.text.clone(),
        timestamp: message.timestamp,
    };

    let (machine, rest) = message
        .text
        .split_once(STATUS_SEPARATOR)
        .ok_or_else(unparseable)?;
    let status = Status::from_prefix(rest).ok_or_else(unparseable)?;

    Ok(Event::new(machine, status, message.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(text: &str, ts: f64) -> Message {
        Message::new(DEFAULT_NOTIFIER, text, ts)
    }

    #[test]
    fn test_parse_event_statuses() {
        let event = parse_event(&notice("bench1 is now in use", 1000.0)).unwrap();
        assert_eq!(event, Event::new("bench1", Status::InUse, 1000.0));

        let event = parse_event(&notice("Laser Cutter is now available", 5.5)).unwrap();
        assert_eq!(event.machine, "Laser Cutter");
        assert_eq!(event.status, Status::Available);
    }

    #[test]
    fn test_parse_event_uses_status_prefix() {
        let event = parse_event(&notice("lathe is now in use by Alice", 1.0)).unwrap();
        assert_eq!(event.status, Status::InUse);
    }

    #[test]
    fn test_parse_event_rejects_unknown_status() {
        let err = parse_event(&notice("lathe is now on fire", 7.0)).unwrap_err();
        assert_eq!(err.text, "lathe is now on fire");
        assert_eq!(err.timestamp, 7.0);
    }

    #[test]
    fn test_parse_event_rejects_missing_separator() {
        assert!(parse_event(&notice("hello everyone", 1.0)).is_err());
    }

    #[test]
    fn test_parser_filters_by_sender() {
        let messages = vec![
            notice("bench1 is now in use", 1.0),
            Message::new("alice", "bench1 is now available", 2.0),
            Message {
                sender_name: None,
                text: "bench1 is now available".to_string(),
                timestamp: 3.0,
            },
            notice("bench1 is now available", 4.0),
        ];

        let report = EventParser::default().parse(&messages);
        assert_eq!(report.ignored, 2);
        assert_eq!(report.event_count(), 2);

        let times: Vec<f64> = report.events["bench1"].iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 4.0]);
    }

    #[test]
    fn test_parser_groups_by_machine_and_reports_bad_text() {
        let messages = vec![
            notice("lathe is now available", 30.0),
            notice("bench1 is now in use", 20.0),
            notice("lathe is now exploding", 15.0),
            notice("lathe is now in use", 10.0),
        ];

        let report = EventParser::default().parse(&messages);
        assert_eq!(report.events.keys().collect::<Vec<_>>(), vec!["lathe", "bench1"]);
        assert_eq!(report.events["lathe"].len(), 2);
        assert_eq!(report.events["lathe"][0].time, 30.0);
        assert_eq!(report.events["bench1"].len(), 1);
        assert_eq!(report.unparseable.len(), 1);
        assert_eq!(report.unparseable[0].text, "lathe is now exploding");
    }

    #[test]
    fn test_custom_notifier() {
        let parser = EventParser::new("tinker-bot");
        let report = parser.parse(&[notice("x is now in use", 1.0)]);
        assert_eq!(report.ignored, 1);
        assert!(report.events.is_empty());
    }
}
