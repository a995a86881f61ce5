/// Pending numeric prefix (repeat count / argument) for the next command.
///
/// Digits accumulate as text so that multi-digit counts and a leading `-`
/// work the way `digit-argument` specifies. Consuming the count resets it.
#[derive(Debug, Clone, Default)]
pub struct Iterations {
    pending: String,
    active: bool,
}

impl Iterations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append digits (or a leading minus) to the pending count and keep the
    /// argument alive through the next dispatch.
    pub fn add(&mut self, digits: &str) {
        self.active = true;
        for c in digits.chars() {
            if c == '-' && self.pending.is_empty() {
                self.pending.push('-');
            } else if c.is_ascii_digit() {
                self.pending.push(c);
            }
        }
    }

    /// Consume the count. Always at least 1; a bare `-` counts as -1.
    pub fn consume(&mut self) -> isize {
        let times = match self.pending.as_str() {
            "" => 1,
            "-" => -1,
            text => text.parse().unwrap_or(1),
        };
        self.reset();
        times
    }

    /// Consume the count as a repetition factor (never below 1)
    pub fn consume_times(&mut self) -> usize {
        self.consume().max(1) as usize
    }

    /// True when the user typed an argument that has not been consumed yet
    pub fn is_set(&self) -> bool {
        !self.pending.is_empty()
    }

    /// True while an argument is still being entered; the keymap must not
    /// run a pending operator in that case.
    pub fn is_pending(&self) -> bool {
        self.active
    }

    /// Called after each dispatched command: keeps the argument alive only
    /// for the command immediately following the digits.
    pub fn end_of_dispatch(&mut self) {
        self.active = false;
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.active = false;
    }

    /// Hint text shown while an argument is pending
    pub fn hint(&self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(format!("(arg: {})", self.pending))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_count_is_one() {
        let mut iterations = Iterations::new();
        assert_eq!(iterations.consume_times(), 1);
    }

    #[test]
    fn digits_accumulate() {
        let mut iterations = Iterations::new();
        iterations.add("2");
        iterations.add("0");
        assert!(iterations.is_set());
        assert_eq!(iterations.consume_times(), 20);
        assert!(!iterations.is_set());
    }

    #[test]
    fn negative_argument() {
        let mut iterations = Iterations::new();
        iterations.add("-");
        iterations.add("3");
        assert_eq!(iterations.consume(), -3);
    }

    #[test]
    fn pending_cleared_at_end_of_dispatch() {
        let mut iterations = Iterations::new();
        iterations.add("4");
        assert!(iterations.is_pending());
        iterations.end_of_dispatch();
        assert!(iterations.is_pending() == false && iterations.is_set());
    }
}
