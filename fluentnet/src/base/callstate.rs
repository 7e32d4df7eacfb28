/// The current state of a logical call's send loop.
/// Modeled after net/base/load_states.h, reduced to the states a call
/// moves through between hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    /// The call has not started.
    #[default]
    Idle,

    /// Resolving settings and preparing the outgoing message for a hop.
    Building,

    /// Waiting on the transport for the hop's response.
    Sending,

    /// A redirect is being followed; the next hop will be built.
    Redirecting,

    /// The call produced its final response.
    Completed,

    /// The call failed and error hooks are being run.
    Failed,
}

impl CallState {
    /// Whether the send loop has stopped.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Completed | CallState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: CallState) -> bool {
        matches!(
            (self, next),
            (CallState::Idle, CallState::Building)
                | (CallState::Building, CallState::Sending)
                | (CallState::Building, CallState::Failed)
                | (CallState::Sending, CallState::Completed)
                | (CallState::Sending, CallState::Redirecting)
                | (CallState::Sending, CallState::Failed)
                | (CallState::Redirecting, CallState::Building)
                | (CallState::Completed, CallState::Failed)
        )
    }
}
