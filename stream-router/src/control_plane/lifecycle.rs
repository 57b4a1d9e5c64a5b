//! One-shot router lifecycle: `NotStarted -> Running -> Stopped`.

use crate::error::RouterError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Launched,
    AlreadyRunning,
}

pub(crate) fn begin_start(state: &mut LifecycleState) -> Result<StartOutcome, RouterError> {
    match state {
        LifecycleState::NotStarted => {
            *state = LifecycleState::Running;
            Ok(StartOutcome::Launched)
        }
        LifecycleState::Running => Ok(StartOutcome::AlreadyRunning),
        LifecycleState::Stopped => Err(RouterError::Stopped),
    }
}

/// Returns `false` when the router was already stopped.
pub(crate) fn begin_stop(state: &mut LifecycleState) -> bool {
    if *state == LifecycleState::Stopped {
        return false;
    }
    *state = LifecycleState::Stopped;
    true
}

pub(crate) fn ensure_not_stopped(state: LifecycleState) -> Result<(), RouterError> {
    if state == LifecycleState::Stopped {
        return Err(RouterError::Stopped);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{begin_start, begin_stop, ensure_not_stopped, LifecycleState, StartOutcome};
    use crate::error::RouterError;

    #[test]
    fn second_start_reports_already_running() {
        let mut state = LifecycleState::NotStarted;

        assert_eq!(begin_start(&mut state).unwrap(), StartOutcome::Launched);
        assert_eq!(begin_start(&mut state).unwrap(), StartOutcome::AlreadyRunning);
        assert_eq!(state, LifecycleState::Running);
    }

    #[test]
    fn start_after_stop_fails_fast() {
        let mut state = LifecycleState::NotStarted;
        begin_start(&mut state).unwrap();

        assert!(begin_stop(&mut state));
        assert!(!begin_stop(&mut state));
        assert!(matches!(begin_start(&mut state), Err(RouterError::Stopped)));
        assert!(matches!(ensure_not_stopped(state), Err(RouterError::Stopped)));
    }

    #[test]
    fn stop_before_start_is_terminal() {
        let mut state = LifecycleState::NotStarted;

        assert!(begin_stop(&mut state));
        assert_eq!(state, LifecycleState::Stopped);
    }
}
