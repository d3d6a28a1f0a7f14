//! Code-submission state machine using rust-fsm.
//!
//! One machine instance lives per mounted challenge controller. Submission
//! state is explicit rather than derived from in-flight request handles.
//!
//! ## State Diagram
//!
//! ```text
//! ┌──────────┐   Submit    ┌──────────────┐
//! │   Idle   │ ──────────► │  Submitting  │
//! └──────────┘             └──────┬───────┘
//!      ▲                          │
//!      │ Rejected                 │ Accepted ──────► Succeeded
//!      └──────────────────────────┤
//!                                 │ Chained ───────► ChainRequired
//! ```
//!
//! `Rejected` covers validation-passing submissions the backend turned down
//! and transport failures alike; both return the controller to `Idle` for
//! another attempt. `Succeeded` and `ChainRequired` are terminal: a chained
//! challenge hands over to a fresh controller on the next screen.

use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub challenge_machine(Idle)

    Idle => {
        Submit => Submitting
    },
    Submitting => {
        Accepted => Succeeded,
        Chained => ChainRequired,
        Rejected => Idle
    }
}

// Re-export the generated types with clearer names
pub use challenge_machine::Input as ChallengeMachineInput;
pub use challenge_machine::State as ChallengeMachineState;
pub use challenge_machine::StateMachine as ChallengeMachine;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let machine = ChallengeMachine::new();
        assert_eq!(*machine.state(), ChallengeMachineState::Idle);
    }

    #[test]
    fn test_accepted_submission_terminates() {
        let mut machine = ChallengeMachine::new();

        machine.consume(&ChallengeMachineInput::Submit).unwrap();
        assert_eq!(*machine.state(), ChallengeMachineState::Submitting);

        machine.consume(&ChallengeMachineInput::Accepted).unwrap();
        assert_eq!(*machine.state(), ChallengeMachineState::Succeeded);

        // Terminal: nothing consumes from Succeeded.
        assert!(machine.consume(&ChallengeMachineInput::Submit).is_err());
    }

    #[test]
    fn test_rejection_returns_to_idle_for_retry() {
        let mut machine = ChallengeMachine::new();

        machine.consume(&ChallengeMachineInput::Submit).unwrap();
        machine.consume(&ChallengeMachineInput::Rejected).unwrap();
        assert_eq!(*machine.state(), ChallengeMachineState::Idle);

        // Re-entrant: another attempt is allowed.
        machine.consume(&ChallengeMachineInput::Submit).unwrap();
        assert_eq!(*machine.state(), ChallengeMachineState::Submitting);
    }

    #[test]
    fn test_chain_required_is_terminal() {
        let mut machine = ChallengeMachine::new();

        machine.consume(&ChallengeMachineInput::Submit).unwrap();
        machine.consume(&ChallengeMachineInput::Chained).unwrap();
        assert_eq!(*machine.state(), ChallengeMachineState::ChainRequired);

        assert!(machine.consume(&ChallengeMachineInput::Submit).is_err());
    }

    #[test]
    fn test_double_submit_is_rejected_by_machine() {
        let mut machine = ChallengeMachine::new();

        machine.consume(&ChallengeMachineInput::Submit).unwrap();
        assert!(machine.consume(&ChallengeMachineInput::Submit).is_err());
        assert_eq!(*machine.state(), ChallengeMachineState::Submitting);
    }

    #[test]
    fn test_cannot_accept_from_idle() {
        let mut machine = ChallengeMachine::new();
        assert!(machine.consume(&ChallengeMachineInput::Accepted).is_err());
        assert!(machine.consume(&ChallengeMachineInput::Chained).is_err());
    }
}
