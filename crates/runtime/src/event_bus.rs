/// Severity of a diagnostic [`Event`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Structured diagnostic line.
///
/// `kind` is a stable machine-readable tag (`"lookup_miss"`, `"route"`, ...);
/// `message` is free text for humans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

/// In-memory diagnostic channel.
///
/// Core crates never print; they emit here and the host drains the bus into
/// its own sink (browser console, `tracing`, stderr).
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, severity: Severity, kind: &'static str, message: impl Into<String>) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.events.push(Event {
            seq,
            severity,
            kind,
            message: message.into(),
        });
    }

    pub fn debug(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Debug, kind, message);
    }

    pub fn info(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Info, kind, message);
    }

    pub fn warn(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Warn, kind, message);
    }

    pub fn error(&mut self, kind: &'static str, message: impl Into<String>) {
        self.emit(Severity::Error, kind, message);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
