//! Integration tests for the romdeck launch pipeline
//!
//! Tests full launches from each config source, stage failures and their
//! user-visible messages, and save data handling across a session's lifetime.

#[cfg(test)]
mod failure_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::bootstrap::SessionState;

    /// A GBA cartridge image: entry branch, logo area, title and the fixed byte.
    pub fn gba_rom(title: &str) -> Vec<u8> {
        let mut rom = vec![0u8; 0x200];
        rom[..4].copy_from_slice(&[0x2E, 0x00, 0x00, 0xEA]);
        let title = title.as_bytes();
        let len = title.len().min(12);
        rom[0xA0..0xA0 + len].copy_from_slice(&title[..len]);
        rom[0xB2] = 0x96;
        rom
    }

    /// Shared log of `(from, to)` transitions.
    pub type TransitionLog = Rc<RefCell<Vec<(SessionState, SessionState)>>>;

    /// Create a transition log and a callback appending to it.
    pub fn transition_recorder() -> (TransitionLog, impl FnMut(SessionState, SessionState)) {
        let log = TransitionLog::default();
        let sink = Rc::clone(&log);
        (log, move |from, to| sink.borrow_mut().push((from, to)))
    }
}
