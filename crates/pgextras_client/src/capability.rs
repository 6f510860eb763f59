use crate::error::{ExtrasError, ExtrasResult};

/// A fact about the connected server, resolved at most once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Capability<T> {
    #[default]
    Unresolved,
    Resolved(T),
    Failed(ExtrasError),
}

impl<T: Copy> Capability<T> {
    /// The memoized outcome, or `None` while unresolved.
    pub fn cached(&self) -> Option<ExtrasResult<T>> {
        match self {
            Capability::Unresolved => None,
            Capability::Resolved(v) => Some(Ok(*v)),
            Capability::Failed(e) => Some(Err(e.clone())),
        }
    }

    /// Record a lookup outcome and hand it back.
    pub fn record(&mut self, outcome: ExtrasResult<T>) -> ExtrasResult<T> {
        *self = match &outcome {
            Ok(v) => Capability::Resolved(*v),
            Err(e) => Capability::Failed(e.clone()),
        };
        outcome
    }
}
