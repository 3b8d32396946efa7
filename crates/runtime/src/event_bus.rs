/// Severity of a diagnostic event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// One entry in the diagnostic stream.
///
/// The text is informational only; hosts forward it to their console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub level: Level,
    pub kind: &'static str,
    pub message: String,
}

/// Ordered diagnostic stream shared by every controller.
///
/// Events are buffered until the host drains them and are mirrored to
/// `tracing` as they are emitted.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, level: Level, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Debug => tracing::debug!(kind, "{message}"),
            Level::Info => tracing::info!(kind, "{message}"),
            Level::Warn => tracing::warn!(kind, "{message}"),
        }
        self.events.push(Event {
            seq: self.next_seq,
            level,
            kind,
            message,
        });
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    pub fn debug(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Level::Debug, kind, message);
    }

    pub fn info(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Level::Info, kind, message);
    }

    pub fn warn(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Level::Warn, kind, message);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.level == Level::Warn)
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
