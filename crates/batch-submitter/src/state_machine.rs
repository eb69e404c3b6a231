use relay_types::submission::SubmissionStatus;

/// Result of the step run for the current status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The step completed: the transaction was sent, or confirmed.
    Success,
    /// The step cannot run yet, e.g. gas is too expensive or confirmations
    /// are still missing.
    Pending,
    Failed,
    /// The batch itself is invalid. Retrying would fail the same way.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Run the `SENT` step in the same cycle.
    Confirm,
    /// Try again next cycle.
    Retry,
    /// The batch is final. Release its queue slot.
    Release,
    /// Stop submitting. Later batches must not overtake this one.
    Halt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: SubmissionStatus,
    pub action: Action,
}

/// Never moves a batch backwards. A failed send retries from `QUEUED` with
/// fresh calldata; a failed confirmation stays `SENT` and is never resent.
pub fn transition(status: SubmissionStatus, outcome: Outcome) -> Transition {
    use Action::*;
    use Outcome::*;
    use SubmissionStatus::*;

    let (next, action) = match (status, outcome) {
        (Queued, Success) => (Sent, Confirm),
        (Queued, Pending | Failed) => (Queued, Retry),
        (Queued, Rejected) => (Queued, Halt),
        (Sent, Success) => (Finalized, Release),
        (Sent, Pending | Failed) => (Sent, Retry),
        (Sent, Rejected) => (Sent, Halt),
        (Finalized, _) => (Finalized, Release),
    };
    Transition { next, action }
}
