use std::sync::{Arc, Mutex, MutexGuard};

use crate::message::Message;

/// Chat history shared between an agent and whoever displays it.
///
/// Clones share the same underlying history.
#[derive(Debug, Clone, Default)]
pub struct ChatMemory {
    inner: Arc<Mutex<Vec<Message>>>,
}

impl ChatMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        // history stays usable even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn push(&self, message: Message) {
        self.lock().push(message);
    }

    /// Record a user question and the agent's answer.
    pub fn add_exchange(&self, input: impl Into<String>, output: impl Into<String>) {
        let mut history = self.lock();
        history.push(Message::user(input));
        history.push(Message::assistant(output));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
