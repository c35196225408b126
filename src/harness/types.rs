use serde::{Deserialize, Serialize};

use crate::page::Readiness;

/// One interaction with a resolved element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Type text into a field
    Type(&'a str),

    /// Clear a field
    Clear,

    /// Click a link or button
    Click,
}

impl Action<'_> {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Type(_) => ActionKind::Type,
            Action::Clear => ActionKind::Clear,
            Action::Click => ActionKind::Click,
        }
    }

    /// Readiness the element must reach before the action is performed
    pub fn readiness(&self) -> Readiness {
        match self {
            Action::Type(_) | Action::Clear => Readiness::Present,
            Action::Click => Readiness::Clickable,
        }
    }
}

/// Action without its payload, retained in errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Type,
    Clear,
    Click,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Type => write!(f, "type into"),
            ActionKind::Clear => write!(f, "clear"),
            ActionKind::Click => write!(f, "click"),
        }
    }
}

/// Where a run is in its scenario sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    NotStarted,
    LoggedOut,
    LoggedIn,
    TestingTransfer,
    TestingAccounts,
    Finished,
    Aborted,
}

/// Something that moves a run between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    SessionOpened,
    LoggedIn,
    LoggedOut,
    TransferStarted,
    AccountsStarted,
    Completed,
    Failed,
}

impl RunState {
    /// Transition function. `None` means the event is not valid here.
    ///
    /// Any failure before a terminal state aborts the run; terminal states
    /// accept nothing.
    pub fn on(self, event: RunEvent) -> Option<RunState> {
        use RunEvent as E;
        use RunState as S;

        match (self, event) {
            (S::Finished | S::Aborted, _) => None,
            (_, E::Failed) => Some(S::Aborted),
            (S::NotStarted, E::SessionOpened) => Some(S::LoggedOut),
            (S::LoggedOut, E::LoggedIn) => Some(S::LoggedIn),
            (S::LoggedIn, E::TransferStarted) => Some(S::TestingTransfer),
            (S::LoggedIn, E::AccountsStarted) => Some(S::TestingAccounts),
            (S::LoggedIn | S::TestingTransfer | S::TestingAccounts, E::LoggedOut) => {
                Some(S::LoggedOut)
            }
            (S::LoggedOut, E::Completed) => Some(S::Finished),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Finished | RunState::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_readiness() {
        assert_eq!(Action::Type("john").readiness(), Readiness::Present);
        assert_eq!(Action::Clear.readiness(), Readiness::Present);
        assert_eq!(Action::Click.readiness(), Readiness::Clickable);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = RunState::NotStarted;
        for event in [
            RunEvent::SessionOpened,
            RunEvent::LoggedIn,
            RunEvent::LoggedOut,
            RunEvent::LoggedIn,
            RunEvent::TransferStarted,
            RunEvent::LoggedOut,
            RunEvent::LoggedIn,
            RunEvent::AccountsStarted,
            RunEvent::LoggedOut,
            RunEvent::Completed,
        ] {
            state = state.on(event).unwrap_or_else(|| panic!("{:?} rejected", event));
        }
        assert_eq!(state, RunState::Finished);
    }

    #[test]
    fn test_failure_aborts_from_any_live_state() {
        for state in [
            RunState::NotStarted,
            RunState::LoggedOut,
            RunState::LoggedIn,
            RunState::TestingTransfer,
            RunState::TestingAccounts,
        ] {
            assert_eq!(state.on(RunEvent::Failed), Some(RunState::Aborted));
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        assert_eq!(RunState::Aborted.on(RunEvent::SessionOpened), None);
        assert_eq!(RunState::Finished.on(RunEvent::Failed), None);
        assert!(RunState::Aborted.is_terminal());
    }

    #[test]
    fn test_completion_requires_logged_out() {
        assert_eq!(RunState::LoggedIn.on(RunEvent::Completed), None);
        assert_eq!(RunState::LoggedOut.on(RunEvent::TransferStarted), None);
    }
}
