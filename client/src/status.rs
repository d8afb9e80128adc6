#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Connecting,
    Ready,
    Busy,
    Blank,
    Error,
}

impl Status {
    pub fn data_state(self) -> &'static str {
        match self {
            Status::Connecting => "connecting",
            Status::Ready => "ready",
            Status::Busy => "busy",
            Status::Blank => "blank",
            Status::Error => "error",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Status::Connecting => "Waking up the classifier…",
            Status::Ready => "Ready",
            Status::Busy => "Predicting…",
            Status::Blank => "Draw a digit first",
            Status::Error => "Something went wrong",
        }
    }

    /// Status to show after Clear, if it should change at all. A connecting
    /// widget or an in-flight request keeps what it has.
    pub fn after_clear(ready: bool, busy: bool) -> Option<Status> {
        (ready && !busy).then_some(Status::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_to_ready_only_when_idle() {
        assert_eq!(Status::after_clear(true, false), Some(Status::Ready));
        assert_eq!(Status::after_clear(true, true), None);
        assert_eq!(Status::after_clear(false, false), None);
    }

    #[test]
    fn data_states_are_distinct() {
        let states = [
            Status::Connecting,
            Status::Ready,
            Status::Busy,
            Status::Blank,
            Status::Error,
        ]
        .map(Status::data_state);
        for (index, state) in states.iter().enumerate() {
            assert!(!states[index + 1..].contains(state));
        }
    }
}
