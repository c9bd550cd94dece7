//! The object graph.
//!
//! [`Graph`] is a generational arena owning every [`Entity`]. All operations
//! that touch both ends of a reference live here, split by concern:
//!
//! * `references.rs`: binding, assigning, resolving and text I/O of single references
//! * `lists.rs`: the same for reference lists
//! * `entities.rs`: per-entity operations (fields, copying, back-edge queries)
//!
//! Every forward edge that is bound appears exactly once in its target's
//! back-edge set, and no bound reference ever outlives its target: after any
//! public call returns, both hold for the whole graph.

mod entities;
mod errors;
mod lists;
mod references;

pub use errors::GraphError;

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    GraphConfig, ObjectId, Result, TypeId,
    constants::DEFAULT_TYPE,
    entity::{Entity, EntityBuilder, EntityHandle},
    intern::{FieldName, FieldNames},
    reference::RefKey,
    registry::TypeRegistry,
    resolver::{ResolveReport, Resolver},
};

#[derive(Debug)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena of entities connected by guarded references.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fieldgraph::{Entity, Graph, Reference, RefKey, TypeTable};
///
/// let mut types = TypeTable::new();
/// let part = types.register("PART", None).unwrap();
/// let mut graph = Graph::new(Arc::new(types));
///
/// let a = graph.insert(Entity::builder(part, 10).reference(Reference::new("parent", part)));
/// let b = graph.insert(Entity::builder(part, 20));
///
/// let key = RefKey::single(a, 0);
/// graph.set_target(key, Some(b)).unwrap();
/// assert_eq!(graph.reference_text(key).unwrap(), "20");
///
/// graph.destroy(b).unwrap();
/// assert!(graph.reference(key).unwrap().is_null());
/// ```
#[derive(Debug)]
pub struct Graph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    by_id: HashMap<(Vec<i32>, ObjectId), Vec<EntityHandle>>,
    names: FieldNames,
    registry: Arc<dyn TypeRegistry>,
    config: GraphConfig,
}

impl Graph {
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Self {
        Self::with_config(registry, GraphConfig::default())
    }

    pub fn with_config(registry: Arc<dyn TypeRegistry>, config: GraphConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            by_id: HashMap::new(),
            names: FieldNames::new(),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GraphConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &dyn TypeRegistry {
        self.registry.as_ref()
    }

    /// Field name table shared by all entities of this graph.
    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    pub fn intern(&mut self, name: &str) -> FieldName {
        self.names.intern(name)
    }

    // Arena

    /// Place a new entity in the graph.
    ///
    /// Its references keep whatever state they were declared with; unresolved
    /// ones are bound by a later resolve pass.
    pub fn insert(&mut self, builder: EntityBuilder) -> EntityHandle {
        let entity = builder.build(&mut self.names);
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entity = Some(entity);
                EntityHandle::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entity: Some(entity),
                });
                EntityHandle::new((self.slots.len() - 1) as u32, 0)
            }
        };
        self.live += 1;
        self.index_insert(handle);
        tracing::trace!(%handle, "Inserted entity");
        handle
    }

    /// Remove an entity from the graph.
    ///
    /// Its own references are unbound first, then every reference bound to it
    /// is nulled, and removed from its list if that list is auto-sizing. The
    /// back-edge set is walked as a snapshot since each notification edits
    /// the graph.
    pub fn destroy(&mut self, handle: EntityHandle) -> Result<Entity> {
        self.entity(handle)?;
        self.index_remove(handle);

        let slot = &mut self.slots[handle.index() as usize];
        let Some(mut entity) = slot.entity.take() else {
            return Err(GraphError::StaleHandle { handle }.into());
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.live -= 1;

        for (slot, target) in entity.bound_targets() {
            if target == handle {
                continue;
            }
            let key = RefKey {
                owner: handle,
                slot,
            };
            if let Some(target) = self.get_mut(target) {
                // A failure here has been logged by the target.
                let _ = target.delete_from_ref_by(key);
            }
        }
        entity.zero_out_all();

        let referring = entity.take_referred_by();
        let mut released = 0;
        for key in referring {
            if key.owner == handle {
                continue;
            }
            self.zero_out_or_remove(key);
            released += 1;
        }

        tracing::debug!(
            %handle,
            type_id = entity.type_id(),
            object_id = entity.id(),
            released,
            "Destroyed entity"
        );
        Ok(entity)
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.entity.as_ref()
    }

    pub(crate) fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.entity.as_mut()
    }

    /// The entity behind `handle`, or [`GraphError::StaleHandle`].
    pub fn entity(&self, handle: EntityHandle) -> Result<&Entity> {
        self.get(handle)
            .ok_or_else(|| GraphError::StaleHandle { handle }.into())
    }

    /// Mutable access for editing fields and declaring slots. Identity
    /// changes go through [`Graph::set_identity`].
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Result<&mut Entity> {
        self.get_mut(handle)
            .ok_or_else(|| GraphError::StaleHandle { handle }.into())
    }

    /// Two distinct entities at once.
    pub(crate) fn pair_mut(
        &mut self,
        first: EntityHandle,
        second: EntityHandle,
    ) -> Result<(&mut Entity, &mut Entity)> {
        self.entity(first)?;
        self.entity(second)?;
        if first == second {
            return Err(GraphError::SameEntity { handle: first }.into());
        }
        let (a, b) = (first.index() as usize, second.index() as usize);
        let (first_slot, second_slot) = if a < b {
            let (low, high) = self.slots.split_at_mut(b);
            (&mut low[a], &mut high[0])
        } else {
            let (low, high) = self.slots.split_at_mut(a);
            (&mut high[0], &mut low[b])
        };
        match (first_slot.entity.as_mut(), second_slot.entity.as_mut()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(GraphError::StaleHandle { handle: first }.into()),
        }
    }

    /// Handles of all live entities, in slot order.
    pub fn handles(&self) -> Vec<EntityHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity
                .as_ref()
                .map(|entity| (EntityHandle::new(index as u32, slot.generation), entity))
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    // Identity

    /// Find an entity of `type_id` (or a subtype) by object id and assembly.
    /// [`DEFAULT_TYPE`] matches any type.
    pub fn lookup(&self, type_id: TypeId, id: ObjectId, assembly: &[i32]) -> Option<EntityHandle> {
        let candidates = self.by_id.get(&(assembly.to_vec(), id))?;
        candidates.iter().copied().find(|handle| {
            self.get(*handle)
                .is_some_and(|entity| self.type_matches(entity.type_id(), type_id))
        })
    }

    /// Change an entity's object id and assembly path.
    pub fn set_identity(
        &mut self,
        handle: EntityHandle,
        id: ObjectId,
        assembly: Vec<i32>,
    ) -> Result<()> {
        self.entity(handle)?;
        self.index_remove(handle);
        self.entity_mut(handle)?.set_identity(id, assembly);
        self.index_insert(handle);
        Ok(())
    }

    /// Whether the entity is of type `expected` or derives from it.
    pub fn is_of_type(&self, handle: EntityHandle, expected: TypeId) -> bool {
        self.get(handle)
            .is_some_and(|entity| self.type_matches(entity.type_id(), expected))
    }

    pub(crate) fn type_matches(&self, actual: TypeId, expected: TypeId) -> bool {
        expected == DEFAULT_TYPE || self.registry.is_of_type(actual, expected)
    }

    /// Short human readable form of an entity for diagnostics.
    pub fn describe(&self, handle: EntityHandle) -> String {
        match self.get(handle) {
            Some(entity) => {
                let name = self.registry.display_name(entity.type_id());
                if entity.assembly().is_empty() {
                    format!("{name} [{}]", entity.id())
                } else {
                    format!("{name} [{}] in {:?}", entity.id(), entity.assembly())
                }
            }
            None => format!("(destroyed {handle})"),
        }
    }

    fn index_insert(&mut self, handle: EntityHandle) {
        if let Some(entity) = self.get(handle) {
            let key = (entity.assembly().to_vec(), entity.id());
            self.by_id.entry(key).or_default().push(handle);
        }
    }

    fn index_remove(&mut self, handle: EntityHandle) {
        let Some(entity) = self.get(handle) else {
            return;
        };
        let key = (entity.assembly().to_vec(), entity.id());
        if let Some(handles) = self.by_id.get_mut(&key) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.by_id.remove(&key);
            }
        }
    }

    // Graph-wide passes

    /// Resolve every unresolved reference in the graph.
    pub fn resolve_all(&mut self, resolver: &impl Resolver) -> ResolveReport {
        let mut report = ResolveReport::default();
        for handle in self.handles() {
            match self.resolve_entity(handle, resolver) {
                Ok(entity_report) => report.merge(entity_report),
                Err(err) => report.failures.push(err),
            }
        }
        tracing::debug!(
            resolved = report.resolved,
            failed = report.failures.len(),
            "Resolve pass finished"
        );
        report
    }

    /// Convert every bound reference in the graph back to its persisted form.
    pub fn unresolve_all(&mut self) {
        for handle in self.handles() {
            // Handles come from the live set, so this cannot fail.
            let _ = self.unresolve_entity(handle);
        }
    }
}
