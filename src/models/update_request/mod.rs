//! Innovation update requests: the moderation workflow.
//!
//! An innovator proposes an edit to one of their innovations; the proposal
//! is stored as a pending request and touches nothing else. An admin later
//! approves it (merging the proposed fields into the live record inside one
//! transaction) or rejects it. Requests are never deleted; resolved rows
//! form the audit trail.

mod queries;
mod types;

pub use queries::*;
pub use types::*;
