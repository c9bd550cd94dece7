//! Per-entity operations: fields, back-edge queries, copying, resolving.

use sha2::{Digest, Sha256};

use super::{Graph, GraphError, references::SlotOutcome};
use crate::{
    Result,
    entity::EntityHandle,
    field::{Field, FieldValue, TextCursor, TypedField},
    reference::{ListKey, RefKey, UnresolvedRef},
    resolver::{ResolveReport, Resolver},
};

impl Graph {
    // Fields

    /// Register a field on an entity, returning the one it replaced.
    pub fn add_field(
        &mut self,
        handle: EntityHandle,
        name: &str,
        field: impl Field + 'static,
    ) -> Result<Option<Box<dyn Field>>> {
        self.entity(handle)?;
        let name = self.names.intern(name);
        Ok(self.entity_mut(handle)?.add_field(name, Box::new(field)))
    }

    pub fn remove_field(
        &mut self,
        handle: EntityHandle,
        name: &str,
    ) -> Result<Option<Box<dyn Field>>> {
        let name = self.names.get(name);
        let entity = self.entity_mut(handle)?;
        Ok(name.and_then(|name| entity.remove_field(name)))
    }

    /// Typed access to a field by name.
    pub fn field<T: FieldValue>(&self, handle: EntityHandle, name: &str) -> Result<&TypedField<T>> {
        let entity = self.entity(handle)?;
        let missing = || GraphError::NoSuchField {
            handle,
            name: name.to_string(),
        };
        let key = self.names.get(name).ok_or_else(missing)?;
        let field = entity.field(key).ok_or_else(missing)?;
        field.as_any().downcast_ref().ok_or_else(|| {
            GraphError::FieldTypeMismatch {
                handle,
                name: name.to_string(),
                expected: T::TYPE_NAME,
            }
            .into()
        })
    }

    pub fn field_mut<T: FieldValue>(
        &mut self,
        handle: EntityHandle,
        name: &str,
    ) -> Result<&mut TypedField<T>> {
        let key = self.names.get(name);
        let entity = self.entity_mut(handle)?;
        let missing = || GraphError::NoSuchField {
            handle,
            name: name.to_string(),
        };
        let field = entity.field_mut(key.ok_or_else(missing)?).ok_or_else(missing)?;
        field.as_any_mut().downcast_mut().ok_or_else(|| {
            GraphError::FieldTypeMismatch {
                handle,
                name: name.to_string(),
                expected: T::TYPE_NAME,
            }
            .into()
        })
    }

    /// Set a field value, returning whether it changed.
    pub fn set_field_value<T: FieldValue>(
        &mut self,
        handle: EntityHandle,
        name: &str,
        value: T,
    ) -> Result<bool> {
        Ok(self.field_mut::<T>(handle, name)?.set_value(value))
    }

    /// Read one field value from `cursor`.
    ///
    /// Returns false when the entity has no field called `key`, or when
    /// `data_fields_only` is set and the field is internal.
    pub fn read_field(
        &mut self,
        handle: EntityHandle,
        key: &str,
        cursor: &mut TextCursor<'_>,
        data_fields_only: bool,
    ) -> Result<bool> {
        self.entity(handle)?;
        let Some(name) = self.names.get(key) else {
            return Ok(false);
        };
        let Some(field) = self.entity_mut(handle)?.field_mut(name) else {
            return Ok(false);
        };
        if data_fields_only && !field.is_data_field() {
            return Ok(false);
        }
        field.read(cursor)?;
        Ok(true)
    }

    /// Printed `(name, value)` pairs of an entity's fields, sorted by name.
    pub fn field_texts(
        &self,
        handle: EntityHandle,
        printable_only: bool,
    ) -> Result<Vec<(String, String)>> {
        let entity = self.entity(handle)?;
        let mut texts: Vec<(String, String)> = entity
            .fields()
            .filter(|(_, field)| field.is_data_field())
            .filter(|(_, field)| !printable_only || field.is_printable())
            .filter_map(|(name, field)| {
                let name = self.names.name(name)?;
                let mut value = String::new();
                field.write(&mut value);
                Some((name.to_string(), value))
            })
            .collect();
        texts.sort();
        Ok(texts)
    }

    /// SHA-256 over the printed data fields, hex encoded.
    ///
    /// Two entities with equal field values have equal checksums regardless
    /// of their identity and references.
    pub fn checksum(&self, handle: EntityHandle) -> Result<String> {
        let mut hasher = Sha256::new();
        for (name, value) in self.field_texts(handle, false)? {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Restore the default value of every field of `handle` that `other`
    /// also has. Returns false if some field of `other` was missing.
    pub fn reset_fields(&mut self, handle: EntityHandle, other: EntityHandle) -> Result<bool> {
        let names: Vec<_> = self.entity(other)?.fields().map(|(name, _)| name).collect();
        let entity = self.entity_mut(handle)?;
        let mut found_all = true;
        for name in names {
            match entity.field_mut(name) {
                Some(field) => field.reset(),
                None => found_all = false,
            }
        }
        Ok(found_all)
    }

    // Back-edges

    /// Register `key` in the back-edge set of `handle`.
    pub fn insert_in_ref_by(&mut self, handle: EntityHandle, key: RefKey) -> Result<()> {
        Ok(self.entity_mut(handle)?.insert_in_ref_by(key)?)
    }

    /// Remove `key` from the back-edge set of `handle`.
    pub fn delete_from_ref_by(&mut self, handle: EntityHandle, key: RefKey) -> Result<()> {
        Ok(self.entity_mut(handle)?.delete_from_ref_by(key)?)
    }

    /// Owners of the references bound to `handle`, one per reference.
    ///
    /// An empty `context` selects every reference. With `sort_by_id` the
    /// owners are ordered by type id and object id; otherwise the order
    /// follows binding history and should not be relied on.
    pub fn referring_objects(
        &self,
        handle: EntityHandle,
        context: &str,
        sort_by_id: bool,
    ) -> Result<Vec<EntityHandle>> {
        let mut owners = Vec::new();
        for key in self.entity(handle)?.referred_by() {
            if context.is_empty() || self.reference(*key)?.context_name() == context {
                owners.push(key.owner);
            }
        }
        if sort_by_id {
            owners.sort_by_key(|owner| {
                self.get(*owner)
                    .map(|entity| (entity.type_id(), entity.id()))
            });
        }
        Ok(owners)
    }

    /// `(context, owner)` for every reference bound to `handle`, ordered by context.
    pub fn referring_with_context(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<(String, EntityHandle)>> {
        let mut pairs = Vec::new();
        for key in self.entity(handle)?.referred_by() {
            let context = self.reference(*key)?.context_name().to_string();
            pairs.push((context, key.owner));
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(pairs)
    }

    /// `(context, target)` for every bound reference held by `handle`,
    /// ordered by context.
    pub fn referred_objects(&self, handle: EntityHandle) -> Result<Vec<(String, EntityHandle)>> {
        let entity = self.entity(handle)?;
        let mut pairs: Vec<(String, EntityHandle)> = entity
            .bound_targets()
            .into_iter()
            .filter_map(|(slot, target)| {
                let context = entity.slot(slot)?.context_name().to_string();
                Some((context, target))
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(pairs)
    }

    /// Redirect references bound to `handle` to `replacement`.
    ///
    /// Only references with the given context name are touched; an empty
    /// name selects all of them. References left empty, because there is no
    /// replacement or it has the wrong type, are removed from auto-sizing
    /// lists. Returns how many references were released.
    pub fn release_references_to_me(
        &mut self,
        handle: EntityHandle,
        context: &str,
        replacement: Option<EntityHandle>,
    ) -> Result<usize> {
        if let Some(replacement) = replacement {
            self.entity(replacement)?;
        }
        let snapshot = self.entity(handle)?.referred_by().to_vec();
        let mut released = 0;
        for key in snapshot {
            if !context.is_empty() && self.reference(key)?.context_name() != context {
                continue;
            }
            if let Err(err) = self.set_target(key, replacement) {
                tracing::debug!(%key, error = %err, "Replacement refused, reference left empty");
            }
            if self.reference(key)?.is_null() {
                self.zero_out_or_remove(key);
            }
            released += 1;
        }
        Ok(released)
    }

    // Resolving

    /// Resolve every reference and reference list of one entity.
    pub fn resolve_entity(
        &mut self,
        handle: EntityHandle,
        resolver: &impl Resolver,
    ) -> Result<ResolveReport> {
        let entity = self.entity(handle)?;
        let singles = entity.references().len() as u32;
        let lists = entity.reference_lists().len() as u32;

        let mut report = ResolveReport::default();
        for index in 0..singles {
            match self.resolve_slot(RefKey::single(handle, index), resolver) {
                Ok(SlotOutcome::Bound) => report.resolved += 1,
                Ok(SlotOutcome::Empty) => report.empty += 1,
                Ok(SlotOutcome::AlreadyResolved) => {}
                Err(err) => report.failures.push(err),
            }
        }
        for list in 0..lists {
            report.merge(self.resolve_list(ListKey { owner: handle, list }, resolver)?);
        }
        Ok(report)
    }

    /// Unresolve every reference and reference list of one entity.
    pub fn unresolve_entity(&mut self, handle: EntityHandle) -> Result<()> {
        let entity = self.entity(handle)?;
        let singles = entity.references().len() as u32;
        let lists = entity.reference_lists().len() as u32;
        for index in 0..singles {
            self.unresolve_reference(RefKey::single(handle, index))?;
        }
        for list in 0..lists {
            self.unresolve_list(ListKey { owner: handle, list })?;
        }
        Ok(())
    }

    // Copying

    /// Copy fields, and unless `fields_only` also references and lists,
    /// from `src` into `dst`.
    ///
    /// Fields are matched by name; fields `dst` lacks are skipped. Default
    /// values are copied too unless `fields_only`. References and lists are
    /// matched by position, so both entities should declare them in the
    /// same order. Returns false when anything of `src` had no counterpart.
    pub fn copy_entity(
        &mut self,
        dst: EntityHandle,
        src: EntityHandle,
        fields_only: bool,
        force_unresolve: bool,
    ) -> Result<bool> {
        if dst == src {
            return Ok(true);
        }
        let (to, from) = self.pair_mut(dst, src)?;
        let mut found_all = true;
        let mut refused = Vec::new();
        for (name, field) in from.fields() {
            let Some(target) = to.field_mut(name) else {
                found_all = false;
                continue;
            };
            if let Err(err) = target.copy_from(field, !fields_only) {
                refused.push((name, err));
            }
        }
        for (name, err) in refused {
            tracing::warn!(
                %dst,
                %src,
                field = self.names.name(name).unwrap_or("?"),
                error = %err,
                "Field not copied"
            );
            found_all = false;
        }
        if fields_only {
            return Ok(found_all);
        }

        let (dst_entity, src_entity) = (self.entity(dst)?, self.entity(src)?);
        let singles = dst_entity.references().len().min(src_entity.references().len());
        let lists = dst_entity
            .reference_lists()
            .len()
            .min(src_entity.reference_lists().len());
        found_all &= dst_entity.references().len() == src_entity.references().len();
        found_all &= dst_entity.reference_lists().len() == src_entity.reference_lists().len();

        for index in 0..singles as u32 {
            let (to, from) = (RefKey::single(dst, index), RefKey::single(src, index));
            if let Err(err) = self.copy_reference(to, from, force_unresolve) {
                tracing::debug!(key = %to, error = %err, "Reference not copied");
            }
        }
        for list in 0..lists as u32 {
            let to = ListKey { owner: dst, list };
            let from = ListKey { owner: src, list };
            if let Err(err) = self.copy_list(to, from, force_unresolve) {
                tracing::debug!(key = %to, error = %err, "Reference list not fully copied");
            }
        }
        Ok(found_all)
    }

    // Assembly paths

    /// Rewrite the assembly prefix `from` into `to` in every unresolved
    /// reference held by `handle`. Returns how many references changed.
    pub fn replace_assembly_prefix(
        &mut self,
        handle: EntityHandle,
        from: &[i32],
        to: &[i32],
    ) -> Result<usize> {
        self.rewrite_unresolved(handle, |unresolved| {
            unresolved.replace_assembly_prefix(from, to)
        })
    }

    /// Replace assembly level `level` equal to `from` with `to` in every
    /// unresolved reference held by `handle`. Moving from the top level into
    /// an assembly adds a level. Returns how many references changed.
    pub fn rebase_assembly(
        &mut self,
        handle: EntityHandle,
        from: i32,
        to: i32,
        level: usize,
    ) -> Result<usize> {
        self.rewrite_unresolved(handle, |unresolved| {
            unresolved.rebase_assembly(from, to, level)
        })
    }

    fn rewrite_unresolved(
        &mut self,
        handle: EntityHandle,
        mut rewrite: impl FnMut(&mut UnresolvedRef) -> bool,
    ) -> Result<usize> {
        let entity = self.entity_mut(handle)?;
        let mut changed = 0;
        for slot in entity.slots() {
            let Some(reference) = entity.slot_mut(slot) else {
                continue;
            };
            if let Some(unresolved) = reference.unresolved_mut() {
                if rewrite(unresolved) {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }
}
