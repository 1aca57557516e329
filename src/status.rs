//! Status reporting seam between the engine and whatever surface hosts it.
//!
//! Fire-and-forget: the engine writes, never reads, and clears the slot on
//! every exit path of an operation.

pub trait StatusSink {
    fn set_status(&self, text: &str);
    fn clear_status(&self);
}

/// Sink for contexts with no interactive surface, such as tests.
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn set_status(&self, _text: &str) {}
    fn clear_status(&self) {}
}
