//! Single-reference operations: binding, assignment, resolving and text I/O.

use super::{Graph, GraphError};
use crate::{
    Error, Result, TypeId,
    constants::{DEFAULT_TYPE, UNNUMBERED},
    entity::EntityHandle,
    field::TextCursor,
    reference::{RefKey, RefSlot, RefState, Reference, ReferenceError, UnresolvedRef, text},
    resolver::Resolver,
};

/// What a resolve attempt did to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOutcome {
    AlreadyResolved,
    Empty,
    Bound,
}

impl Graph {
    pub fn reference(&self, key: RefKey) -> Result<&Reference> {
        self.entity(key.owner)?
            .slot(key.slot)
            .ok_or_else(|| GraphError::NoSuchReference { key }.into())
    }

    pub(crate) fn reference_mut(&mut self, key: RefKey) -> Result<&mut Reference> {
        self.entity_mut(key.owner)?
            .slot_mut(key.slot)
            .ok_or_else(|| GraphError::NoSuchReference { key }.into())
    }

    /// Key of the first single reference of `owner` with this context name.
    pub fn find_reference(&self, owner: EntityHandle, context: &str) -> Option<RefKey> {
        let entity = self.get(owner)?;
        let index = entity
            .references()
            .iter()
            .position(|r| r.context_name() == context)?;
        Some(RefKey::single(owner, index as u32))
    }

    /// The live target of a reference, if any.
    pub fn target(&self, key: RefKey) -> Result<Option<EntityHandle>> {
        Ok(self
            .reference(key)?
            .target()
            .filter(|target| self.contains(*target)))
    }

    /// Register the reference in its target's back-edge set.
    ///
    /// Does nothing unless the reference is resolved, has a target and is
    /// not bound yet. A duplicate registration is logged by the target and
    /// returned; the reference counts as bound afterwards either way.
    pub fn bind(&mut self, key: RefKey) -> Result<()> {
        let target = match *self.reference(key)?.state() {
            RefState::Resolved {
                target: Some(target),
                bound: false,
            } => target,
            _ => return Ok(()),
        };
        let Some(entity) = self.get_mut(target) else {
            tracing::warn!(%key, %target, "Target no longer exists, reference left empty");
            self.reference_mut(key)?.zero_out();
            return Ok(());
        };
        let inserted = entity.insert_in_ref_by(key);
        self.reference_mut(key)?.set_bound(true);
        inserted.map_err(Error::from)
    }

    /// Remove the reference from its target's back-edge set. Safe to call on
    /// a reference that was never bound.
    pub fn unbind(&mut self, key: RefKey) -> Result<()> {
        let target = match *self.reference(key)?.state() {
            RefState::Resolved {
                target: Some(target),
                bound: true,
            } => target,
            _ => return Ok(()),
        };
        self.reference_mut(key)?.set_bound(false);
        match self.get_mut(target) {
            Some(entity) => entity.delete_from_ref_by(key).map_err(Error::from),
            None => {
                tracing::error!(%key, %target, "Bound reference outlived its target");
                Ok(())
            }
        }
    }

    /// Empty the slot, unbinding it first.
    pub fn clear_reference(&mut self, key: RefKey) -> Result<()> {
        self.reference(key)?;
        // Binding violations are logged where they are detected.
        let _ = self.unbind(key);
        self.reference_mut(key)?.zero_out();
        Ok(())
    }

    /// Point the reference at `target`, or empty it with `None`.
    ///
    /// A target whose type does not match the slot's expected type is
    /// refused: the reference is left empty and
    /// [`ReferenceError::TypeMismatch`] is returned.
    pub fn set_target(&mut self, key: RefKey, target: Option<EntityHandle>) -> Result<()> {
        self.clear_reference(key)?;
        let Some(target) = target else {
            return Ok(());
        };

        let actual = self.entity(target)?.type_id();
        let reference = self.reference(key)?;
        let expected = reference.expected_type();
        if !self.type_matches(actual, expected) {
            let expected_name = self.registry.display_name(expected).to_string();
            let actual_name = self.registry.display_name(actual).to_string();
            tracing::warn!(
                %key,
                context = reference.context_name(),
                expected,
                expected_name = %expected_name,
                actual,
                actual_name = %actual_name,
                "Refusing to bind incompatible entity"
            );
            return Err(ReferenceError::TypeMismatch {
                expected,
                expected_name,
                actual,
                actual_name,
            }
            .into());
        }

        self.reference_mut(key)?.set_state(RefState::Resolved {
            target: Some(target),
            bound: false,
        });
        self.bind(key)
    }

    /// Store a persisted descriptor, dropping whatever the slot held.
    pub fn set_unresolved(&mut self, key: RefKey, unresolved: UnresolvedRef) -> Result<()> {
        self.clear_reference(key)?;
        self.reference_mut(key)?
            .set_state(RefState::Unresolved(unresolved));
        Ok(())
    }

    /// Resolve one reference through `resolver`.
    ///
    /// Already resolved references are left alone and the empty-slot id
    /// becomes null without a lookup. A lookup that finds nothing leaves the
    /// reference null, logs the failure and returns
    /// [`ReferenceError::ResolutionFailed`].
    pub fn resolve_reference(&mut self, key: RefKey, resolver: &impl Resolver) -> Result<()> {
        self.resolve_slot(key, resolver).map(|_| ())
    }

    pub(crate) fn resolve_slot(
        &mut self,
        key: RefKey,
        resolver: &impl Resolver,
    ) -> Result<SlotOutcome> {
        let reference = self.reference(key)?;
        let Some(unresolved) = reference.unresolved_ref().cloned() else {
            return Ok(SlotOutcome::AlreadyResolved);
        };
        let context = reference.context_name().to_string();
        let type_id = reference.lookup_type(unresolved.type_id);

        if unresolved.is_empty() {
            self.reference_mut(key)?.zero_out();
            return Ok(SlotOutcome::Empty);
        }

        if unresolved.type_id < DEFAULT_TYPE {
            tracing::warn!(
                %key,
                context = %context,
                object_id = unresolved.id,
                type_id = unresolved.type_id,
                "Cannot resolve reference of unknown type"
            );
            self.reference_mut(key)?.zero_out();
            return Err(ReferenceError::InvalidType {
                type_id: unresolved.type_id,
                object_id: unresolved.id,
                context,
            }
            .into());
        }

        match resolver.find(self, type_id, unresolved.id, &unresolved.assembly) {
            Some(found) => {
                self.set_target(key, Some(found))?;
                tracing::trace!(%key, target = %found, "Resolved reference");
                Ok(SlotOutcome::Bound)
            }
            None => {
                let type_name = self.registry.display_name(type_id).to_string();
                tracing::warn!(
                    type_id,
                    type_name = %type_name,
                    object_id = unresolved.id,
                    assembly = ?unresolved.assembly,
                    owner = %self.describe(key.owner),
                    context = %context,
                    "Resolve failure"
                );
                self.reference_mut(key)?.zero_out();
                Err(ReferenceError::ResolutionFailed {
                    type_id,
                    type_name,
                    object_id: unresolved.id,
                    assembly: unresolved.assembly,
                    context,
                }
                .into())
            }
        }
    }

    /// Replace a live target with its persisted descriptor.
    ///
    /// Empty and already unresolved references are left alone. Resolving
    /// again with a lookup over the same identities restores the target.
    pub fn unresolve_reference(&mut self, key: RefKey) -> Result<()> {
        let Some(target) = self.reference(key)?.target() else {
            return Ok(());
        };
        let unresolved = self.descriptor_of(target)?;
        // Binding violations are logged where they are detected.
        let _ = self.unbind(key);
        self.reference_mut(key)?
            .set_state(RefState::Unresolved(unresolved));
        Ok(())
    }

    /// The `(type, id, assembly)` triple identifying an entity.
    pub fn descriptor_of(&self, handle: EntityHandle) -> Result<UnresolvedRef> {
        let entity = self.entity(handle)?;
        Ok(UnresolvedRef::new(
            entity.type_id(),
            entity.id(),
            entity.assembly().to_vec(),
        ))
    }

    /// Copy the content of `src` into `dst`.
    ///
    /// An unresolved source is copied as is. With `force_unresolve` a
    /// resolved source is copied as its descriptor, so `dst` ends up
    /// unresolved while `src` keeps its binding; targets with the unnumbered
    /// id are exempt when the graph config says so. Otherwise `dst` is bound
    /// to the same target.
    pub fn copy_reference(&mut self, dst: RefKey, src: RefKey, force_unresolve: bool) -> Result<()> {
        if dst == src {
            return Ok(());
        }
        let source = self.reference(src)?;
        let (unresolved, target) = (source.unresolved_ref().cloned(), source.target());
        if let Some(unresolved) = unresolved {
            return self.set_unresolved(dst, unresolved);
        }

        if force_unresolve {
            let descriptor = match target {
                Some(target) => self.descriptor_of(target)?,
                None => UnresolvedRef::default(),
            };
            let exempt =
                self.config.exempt_unnumbered_from_unresolve && descriptor.id == UNNUMBERED;
            if !exempt {
                return self.set_unresolved(dst, descriptor);
            }
        }
        self.set_target(dst, target)
    }

    /// Compare two references: by target when both are resolved, by stored
    /// descriptor when both are unresolved.
    pub fn references_equal(&self, a: RefKey, b: RefKey) -> Result<bool> {
        Ok(self.reference(a)? == self.reference(b)?)
    }

    /// Append the text form of a reference.
    ///
    /// An empty reference is written as `0`. The type name is added when it
    /// differs from the slot's expected type. Unresolved references are
    /// written from their stored descriptor, including a type name the
    /// registry did not recognise.
    pub fn write_reference(&self, out: &mut String, key: RefKey) -> Result<()> {
        let reference = self.reference(key)?;
        let expected = reference.expected_type();
        let type_name = |type_id: TypeId| {
            if type_id > DEFAULT_TYPE && type_id != expected {
                self.registry.type_name(type_id)
            } else {
                None
            }
        };

        if let Some(unresolved) = reference.unresolved_ref() {
            if unresolved.is_empty() {
                out.push('0');
            } else {
                let name = if unresolved.type_id < DEFAULT_TYPE {
                    unresolved.type_name.as_deref()
                } else {
                    type_name(unresolved.type_id)
                };
                text::write_reference(out, unresolved.id, &unresolved.assembly, name);
            }
            return Ok(());
        }

        match reference.target().and_then(|target| self.get(target)) {
            Some(entity) => text::write_reference(
                out,
                entity.id(),
                entity.assembly(),
                type_name(entity.type_id()),
            ),
            None => out.push('0'),
        }
        Ok(())
    }

    pub fn reference_text(&self, key: RefKey) -> Result<String> {
        let mut out = String::new();
        self.write_reference(&mut out, key)?;
        Ok(out)
    }

    /// Read a reference from `cursor` into the unresolved state.
    ///
    /// Unreadable text leaves the reference empty, logs a warning and
    /// returns [`ReferenceError::Malformed`].
    pub fn read_reference(&mut self, key: RefKey, cursor: &mut TextCursor<'_>) -> Result<()> {
        self.reference(key)?;
        match text::parse_reference(cursor) {
            Ok(parsed) => {
                let mut unresolved = UnresolvedRef::new(DEFAULT_TYPE, parsed.id, parsed.assembly);
                if let Some(name) = parsed.type_name {
                    unresolved.type_id = self.registry.type_id_from_name(name);
                    if unresolved.type_id < DEFAULT_TYPE {
                        tracing::debug!(%key, type_name = name, "Unknown type name kept for writing");
                        unresolved.type_name = Some(name.to_string());
                    }
                }
                self.set_unresolved(key, unresolved)
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "Unreadable reference left empty");
                self.clear_reference(key)?;
                Err(err.into())
            }
        }
    }

    pub fn read_reference_str(&mut self, key: RefKey, text: &str) -> Result<()> {
        self.read_reference(key, &mut TextCursor::new(text))
    }

    /// Called for every reference bound to an entity being destroyed: the
    /// reference is emptied, or removed if it sits in an auto-sizing list.
    /// The destroyed target's back-edge set is not touched.
    pub(crate) fn zero_out_or_remove(&mut self, key: RefKey) {
        let Some(owner) = self.get_mut(key.owner) else {
            tracing::error!(%key, "Back-edge names an owner that no longer exists");
            return;
        };
        match key.slot {
            RefSlot::Single(index) => {
                if let Some(reference) = owner.reference_mut(index) {
                    reference.zero_out();
                }
            }
            RefSlot::Listed { list, item } => {
                if let Some(list) = owner.reference_list_mut(list) {
                    if list.is_auto_sizing() {
                        list.remove_item(item);
                    } else if let Some(reference) = list.item_mut(item) {
                        reference.zero_out();
                    }
                }
            }
        }
    }
}
