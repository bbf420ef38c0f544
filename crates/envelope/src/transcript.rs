//! Sink for the intermediate values of a protocol run.
//!
//! The protocol reports each stage's output to a [`Transcript`] supplied by
//! the caller. Recording session keys outside of tests or demos defeats the
//! envelope; production callers keep the default [`NoopTranscript`].

/// Receives `(label, value)` pairs as the protocol runs.
pub trait Transcript {
    /// Records one intermediate value.
    fn record(&mut self, label: &str, value: &[u8]);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTranscript;

impl Transcript for NoopTranscript {
    fn record(&mut self, _label: &str, _value: &[u8]) {}
}

/// Keeps every entry in memory, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryTranscript {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryTranscript {
    /// All recorded entries.
    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    /// The most recent value recorded under `label`.
    pub fn get(&self, label: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_slice())
    }
}

impl Transcript for MemoryTranscript {
    fn record(&mut self, label: &str, value: &[u8]) {
        self.entries.push((label.to_string(), value.to_vec()));
    }
}

impl<T: Transcript + ?Sized> Transcript for &mut T {
    fn record(&mut self, label: &str, value: &[u8]) {
        (**self).record(label, value);
    }
}
