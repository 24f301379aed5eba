//! Pre-built [`tracing::Span`] constructors for ledger operations.
//!
//! Consistent span names and fields make traces easy to filter by
//! transaction id or function name.

use tracing::{debug_span, info_span, Span};

/// Span covering evaluation and commit of one transaction.
pub fn execute_span(function: &str) -> Span {
    info_span!("execute", function = %function)
}

/// Span covering the commit phase of an evaluated transaction.
pub fn apply_span(tx_id: &str, function: &str) -> Span {
    info_span!("apply", tx = %tx_id, function = %function)
}

/// Span covering a finalize step against the public mapping.
pub fn finalize_span(tx_id: &str) -> Span {
    debug_span!("finalize", tx = %tx_id)
}

/// Span covering evaluation of a batch of calls.
pub fn batch_span(size: usize) -> Span {
    info_span!("execute_batch", size = size)
}

/// Span covering loading or saving a state file.
pub fn state_file_span(path: &str) -> Span {
    info_span!("state_file", path = %path)
}
