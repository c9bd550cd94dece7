//! Turning persisted ids back into live entities.
//!
//! A [`Resolver`] is supplied by the caller of a resolve pass and maps
//! `(type, id, assembly)` to an entity handle. [`GraphLookup`] resolves
//! against the graph's own identity index, which is what loading a model
//! normally wants.

use crate::{Error, Graph, ObjectId, TypeId, entity::EntityHandle};

/// Lookup used by resolve passes.
///
/// Never called with the empty-slot id `0`; those references become null
/// without a lookup. May be called any number of times.
pub trait Resolver {
    fn find(
        &self,
        graph: &Graph,
        type_id: TypeId,
        id: ObjectId,
        assembly: &[i32],
    ) -> Option<EntityHandle>;
}

impl<F> Resolver for F
where
    F: Fn(&Graph, TypeId, ObjectId, &[i32]) -> Option<EntityHandle>,
{
    fn find(
        &self,
        graph: &Graph,
        type_id: TypeId,
        id: ObjectId,
        assembly: &[i32],
    ) -> Option<EntityHandle> {
        self(graph, type_id, id, assembly)
    }
}

/// Pins down the closure signature so a closure can be passed wherever a
/// [`Resolver`] is expected.
///
/// ```
/// use fieldgraph::resolver;
///
/// let nothing = resolver::from_fn(|_, _, _, _| None);
/// # let _ = nothing;
/// ```
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&Graph, TypeId, ObjectId, &[i32]) -> Option<EntityHandle>,
{
    f
}

/// Resolves through [`Graph::lookup`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphLookup;

impl Resolver for GraphLookup {
    fn find(
        &self,
        graph: &Graph,
        type_id: TypeId,
        id: ObjectId,
        assembly: &[i32],
    ) -> Option<EntityHandle> {
        graph.lookup(type_id, id, assembly)
    }
}

/// Outcome of a resolve pass.
///
/// Failures are recoverable: each failed reference has been left null and
/// logged. The errors are collected here so callers and tests can inspect
/// them.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// References that ended up bound to a target.
    pub resolved: usize,
    /// Empty slots that became null without a lookup.
    pub empty: usize,
    /// List items removed because they could not be resolved.
    pub removed: usize,
    pub failures: Vec<Error>,
}

impl ResolveReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: ResolveReport) {
        self.resolved += other.resolved;
        self.empty += other.empty;
        self.removed += other.removed;
        self.failures.extend(other.failures);
    }
}
