//! Lifecycle of one asynchronous request made by a screen

/// `Idle → Pending → {Success, Failure}`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Pending,
    Success(T),
    Failure(String),
}

impl<T> RequestState<T> {
    /// Move to `Pending`. Returns `false` if a request is already in flight,
    /// in which case the caller must not issue another one.
    pub fn start(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = RequestState::Pending;
        true
    }

    pub fn succeed(&mut self, value: T) {
        *self = RequestState::Success(value);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = RequestState::Failure(message.into());
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestState::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RequestState::Success(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut state: RequestState<usize> = RequestState::default();
        assert_eq!(state, RequestState::Idle);

        assert!(state.start());
        assert!(state.is_pending());
        assert!(!state.start(), "second start while pending must be refused");

        state.succeed(3);
        assert_eq!(state.value(), Some(&3));

        assert!(state.start());
        state.fail("boom");
        assert_eq!(state.error(), Some("boom"));
        assert!(!state.is_success());
    }
}
