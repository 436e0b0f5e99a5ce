//! Context accumulation: selected chunks are folded into the running `context` string.
//!
//! Strictly additive. Each batch is joined with a blank line and appended as is; no separator
//! is inserted between batches.

use crate::message::Message;
use crate::state::AgentState;
use crate::tool_source::PASSAGE_SEPARATOR;

pub const CONTEXT_UPDATED: &str = "Context Updated";
pub const NO_NEW_CONTEXT: &str = "No new Context";

/// Appends `chunks` (joined by a blank line) to `context`. Returns whether anything was added.
pub fn accumulate(context: &mut String, chunks: Option<Vec<String>>) -> bool {
    match chunks {
        Some(chunks) if !chunks.is_empty() => {
            context.push_str(&chunks.join(PASSAGE_SEPARATOR));
            true
        }
        _ => false,
    }
}

/// Folds `state.chunks` into `state.context`, clears the chunks and logs the outcome.
pub fn update_context(state: &mut AgentState) {
    let chunks = state.chunks.take();
    let updated = accumulate(&mut state.context, chunks);
    let note = if updated {
        CONTEXT_UPDATED
    } else {
        NO_NEW_CONTEXT
    };
    tracing::debug!(context_len = state.context.len(), "{}", note);
    state.messages.push(Message::assistant(note));
}
