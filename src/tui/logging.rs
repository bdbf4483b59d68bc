//! Custom tracing Layer for dashboard log capture
//!
//! Captures log events and pushes them into the bot store, where the logs
//! screen picks them up on the next frame.

use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::core::{BotStore, LogEntry};

/// Structured fields appended to the captured message
const CAPTURED_FIELDS: [&str; 6] = ["event_type", "screen", "from", "to", "chord", "error"];

/// Layer that captures logs for the logs screen.
///
/// `on_event()` only ever calls `BotStore::try_push_log()`: tracing events
/// can fire while the store lock is held (e.g. logging inside
/// `BotStore::update`), and a blocking lock here would deadlock. Lines
/// dropped under contention are counted by the store.
pub struct DashboardLogLayer {
    store: Arc<BotStore>,
}

impl DashboardLogLayer {
    pub fn new(store: Arc<BotStore>) -> Self {
        Self { store }
    }
}

impl<S: Subscriber> Layer<S> for DashboardLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        let mut extra_fields = Vec::new();
        let mut visitor = MessageVisitor {
            message: &mut message,
            extra_fields: &mut extra_fields,
        };
        event.record(&mut visitor);

        if !extra_fields.is_empty() {
            message.push_str(" [");
            message.push_str(&extra_fields.join(", "));
            message.push(']');
        }

        self.store.try_push_log(LogEntry {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            level: event.metadata().level().to_string(),
            message,
        });
    }
}

/// Visitor to extract message and key structured fields from tracing events
struct MessageVisitor<'a> {
    message: &'a mut String,
    extra_fields: &'a mut Vec<String>,
}

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{:?}", value).trim_matches('"').to_string();
        } else if CAPTURED_FIELDS.contains(&field.name()) {
            self.extra_fields
                .push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else if CAPTURED_FIELDS.contains(&field.name()) {
            self.extra_fields
                .push(format!("{}={}", field.name(), value));
        }
    }
}
