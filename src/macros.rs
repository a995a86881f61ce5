/// Keyboard macro recorder.
///
/// While recording, every key consumed by a dispatched command is appended
/// to the current macro. Replay feeds the recorded keys back to the front
/// of the key stream, so a macro expands before any key already waiting;
/// the loop itself is never re-entered.
#[derive(Debug, Default)]
pub(crate) struct MacroEngine {
    recording: Option<Vec<char>>,
    last: Vec<char>,
}

impl MacroEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start recording a new macro
    pub(crate) fn start_record(&mut self) {
        self.recording = Some(Vec::new());
    }

    /// Stop recording and keep the result as the last macro.
    ///
    /// The keys that triggered the stop command itself were already
    /// recorded when the command ran; `trailing` tells how many to trim.
    pub(crate) fn stop_record(&mut self, trailing: usize) {
        if let Some(mut keys) = self.recording.take() {
            keys.truncate(keys.len().saturating_sub(trailing));
            self.last = keys;
        }
    }

    /// True while a macro is being recorded
    pub(crate) fn recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Append consumed keys to the macro in progress
    pub(crate) fn record(&mut self, keys: &[char]) {
        if let Some(current) = self.recording.as_mut() {
            current.extend_from_slice(keys);
        }
    }

    /// The last recorded macro
    pub(crate) fn last(&self) -> &[char] {
        &self.last
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_between_start_and_stop() {
        let mut macros = MacroEngine::new();
        macros.record(&['i', 'g']); // not recording yet
        macros.start_record();
        macros.record(&['a', 'b']);
        macros.record(&['c']);
        macros.stop_record(1); // drop the key that stopped the recording
        assert_eq!(macros.last(), &['a', 'b']);
        assert!(!macros.recording());
    }
}
