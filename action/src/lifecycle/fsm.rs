//! Per-deployment lifecycle state machine
//!
//! The machine only knows what this run has observed. It decides which write
//! a step makes; it does not guard against remote history it never read, so a
//! handle seeded with `existing(None)` accepts any final status.

use github_models::DeploymentState;

use crate::errors::ActionError;

/// What this run knows about a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No deployment exists yet
    Absent,

    /// Deployment exists; its latest status is unknown or unset
    Created,

    /// Latest status of the deployment
    Status(DeploymentState),
}

/// Deployment event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Create a new deployment
    Create,

    /// Take over an existing deployment by id
    Adopt,

    /// Mark the deployment as in progress
    Begin,

    /// Write a final (or intermediate) status
    Finish(DeploymentState),

    /// Mark the deployment inactive
    Deactivate,
}

/// Remote effect required by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Create the deployment object
    Create,

    /// Write a status with this state
    Write(DeploymentState),

    /// Nothing to send
    Noop,
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: LifecycleState,
}

impl DeploymentFsm {
    /// Create a new FSM for a deployment that doesn't exist yet
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Absent,
        }
    }

    /// FSM for an existing deployment, seeded with its latest status if known
    pub fn existing(latest: Option<DeploymentState>) -> Self {
        Self {
            state: latest
                .map(LifecycleState::Status)
                .unwrap_or(LifecycleState::Created),
        }
    }

    /// Get current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Process an event that must produce a status write
    pub fn write(&mut self, event: LifecycleEvent) -> Result<DeploymentState, ActionError> {
        let from = self.state;
        match self.process(event)? {
            Transition::Write(state) => Ok(state),
            other => {
                self.state = from;
                Err(ActionError::InvalidTransition(format!(
                    "{:?} -> {:?} writes nothing ({:?})",
                    from, event, other
                )))
            }
        }
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: LifecycleEvent) -> Result<Transition, ActionError> {
        use DeploymentState::{InProgress, Inactive, Pending, Queued};

        let (next, transition) = match (self.state, event) {
            // From Absent
            (LifecycleState::Absent, LifecycleEvent::Create) => {
                (LifecycleState::Created, Transition::Create)
            }
            (LifecycleState::Absent, LifecycleEvent::Adopt) => {
                (LifecycleState::Created, Transition::Noop)
            }

            // Towards in_progress, only from a non-terminal state
            (LifecycleState::Created, LifecycleEvent::Begin)
            | (LifecycleState::Status(Queued | Pending | InProgress), LifecycleEvent::Begin) => (
                LifecycleState::Status(InProgress),
                Transition::Write(InProgress),
            ),

            (LifecycleState::Created, LifecycleEvent::Finish(state))
            | (LifecycleState::Status(Queued | Pending | InProgress), LifecycleEvent::Finish(state)) => {
                (LifecycleState::Status(state), Transition::Write(state))
            }

            // Deactivation is the one way out of a terminal state
            (LifecycleState::Status(Inactive), LifecycleEvent::Deactivate) => {
                (LifecycleState::Status(Inactive), Transition::Noop)
            }
            (LifecycleState::Created | LifecycleState::Status(_), LifecycleEvent::Deactivate) => (
                LifecycleState::Status(Inactive),
                Transition::Write(Inactive),
            ),

            // Invalid transitions
            (state, event) => {
                return Err(ActionError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = next;
        Ok(transition)
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
