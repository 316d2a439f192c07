//! Ingestion hooks and the auxiliary Run Record consumer interface.
//!
//! Indexing/ingestion and the long-term "brain" analytics pipeline are
//! deliberately out of this core's scope (see the spec's scope section);
//! these are the seams a full deployment wires real implementations into.

use ragline_core::types::RunRecord;
use tracing::info;

/// Trigger a refresh of the vector store's index. The core does not
/// implement ingestion: a real deployment replaces this with a call into
/// its indexing service. Here it only logs the request.
pub fn update_vector_store(project: &str) {
    info!(project, "update_vector_store requested; ingestion is out of core scope, no-op");
}

/// Trigger a refresh of any local knowledge caches (e.g. the code symbol
/// index, entity graph). Same out-of-scope contract as
/// [`update_vector_store`].
pub fn update_local_knowledge(project: &str) {
    info!(project, "update_local_knowledge requested; ingestion is out of core scope, no-op");
}

/// An auxiliary consumer of completed [`RunRecord`]s — the seam the
/// ingestion/feedback "brain" attaches to. The core pipeline calls every
/// registered consumer after logging a run but does not require any of
/// them to do anything.
pub trait InteractionConsumer: Send + Sync {
    /// Observe a completed run. Must not fail the pipeline; implementations
    /// that need fallible I/O should catch their own errors.
    fn record_interaction(&self, record: &RunRecord);
}

/// A consumer that does nothing, used when no auxiliary analytics pipeline
/// is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConsumer;

impl InteractionConsumer for NoopConsumer {
    fn record_interaction(&self, _record: &RunRecord) {}
}
