//! Single-slot feedback message with ticketed auto-clear.
//!
//! DESIGN
//! ======
//! Every shown message gets a fresh ticket. A delayed clear carries the
//! ticket it was scheduled for and is ignored once a newer message has
//! replaced it, so an old timer can never blank a newer message.

#[cfg(test)]
#[path = "feedback_test.rs"]
mod feedback_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    /// CSS modifier used by the message banner.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "message message--success",
            Self::Error => "message message--error",
            Self::Info => "message message--info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub ticket: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feedback {
    current: Option<Message>,
    last_ticket: u64,
}

impl Feedback {
    /// Replace the visible message and return its ticket.
    pub fn show(&mut self, text: impl Into<String>, kind: MessageKind) -> u64 {
        self.last_ticket += 1;
        self.current = Some(Message { kind, text: text.into(), ticket: self.last_ticket });
        self.last_ticket
    }

    /// Clear the slot only if `ticket` still names the visible message.
    pub fn clear_if_current(&mut self, ticket: u64) -> bool {
        if self.current.as_ref().is_some_and(|m| m.ticket == ticket) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.text.as_str())
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.current.as_ref().map(|m| m.kind)
    }
}
