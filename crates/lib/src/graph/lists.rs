//! Reference list operations.
//!
//! Every element of a list is addressed by a [`RefKey`] carrying the
//! element's stable item id, so the single-reference machinery in
//! `references.rs` does the binding work for lists too.

use super::{Graph, GraphError, references::SlotOutcome};
use crate::{
    Result,
    entity::EntityHandle,
    field::TextCursor,
    reference::{ListKey, RefKey, RefSlot, Reference, ReferenceError, ReferenceList, text},
    resolver::{ResolveReport, Resolver},
};

impl Graph {
    pub fn list(&self, key: ListKey) -> Result<&ReferenceList> {
        self.entity(key.owner)?
            .reference_list(key.list)
            .ok_or_else(|| GraphError::NoSuchList { key }.into())
    }

    fn list_mut(&mut self, key: ListKey) -> Result<&mut ReferenceList> {
        self.entity_mut(key.owner)?
            .reference_list_mut(key.list)
            .ok_or_else(|| GraphError::NoSuchList { key }.into())
    }

    /// Key of the first reference list of `owner` with this context name.
    pub fn find_list(&self, owner: EntityHandle, context: &str) -> Option<ListKey> {
        let entity = self.get(owner)?;
        let list = entity
            .reference_lists()
            .iter()
            .position(|l| l.context_name() == context)?;
        Some(ListKey {
            owner,
            list: list as u32,
        })
    }

    /// Key of the element currently at `index`.
    pub fn list_item_key(&self, key: ListKey, index: usize) -> Result<Option<RefKey>> {
        Ok(self
            .list(key)?
            .item_id(index)
            .map(|item| RefKey::listed(key.owner, key.list, item)))
    }

    fn item_keys(&self, key: ListKey) -> Result<Vec<RefKey>> {
        Ok(self
            .list(key)?
            .item_ids()
            .into_iter()
            .map(|item| RefKey::listed(key.owner, key.list, item))
            .collect())
    }

    /// Append a reference to the list, binding it if it already has a target.
    pub fn insert_last(&mut self, key: ListKey, mut reference: Reference) -> Result<RefKey> {
        let list = self.list_mut(key)?;
        reference.set_bound(false);
        let item = list.push(reference);
        let item_key = RefKey::listed(key.owner, key.list, item);
        self.bind(item_key)?;
        Ok(item_key)
    }

    /// Append a new element pointing at `target`.
    ///
    /// A target of the wrong type is refused and nothing is appended.
    pub fn insert_last_target(&mut self, key: ListKey, target: EntityHandle) -> Result<RefKey> {
        let element = self.list(key)?.new_element();
        let item_key = self.insert_last(key, element)?;
        if let Err(err) = self.set_target(item_key, Some(target)) {
            self.remove_list_item(item_key)?;
            return Err(err);
        }
        Ok(item_key)
    }

    /// Unbind and drop one element.
    fn remove_list_item(&mut self, item_key: RefKey) -> Result<()> {
        let RefSlot::Listed { list, item } = item_key.slot else {
            return Err(GraphError::NoSuchReference { key: item_key }.into());
        };
        // Binding violations are logged where they are detected.
        let _ = self.unbind(item_key);
        self.list_mut(ListKey {
            owner: item_key.owner,
            list,
        })?
        .remove_item(item);
        Ok(())
    }

    /// Remove the element at `index`. Returns false when out of range.
    pub fn erase(&mut self, key: ListKey, index: usize) -> Result<bool> {
        match self.list_item_key(key, index)? {
            Some(item_key) => {
                self.remove_list_item(item_key)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rotate the list so the element at `new_first` comes first.
    /// Returns false when `new_first` is out of range.
    pub fn shuffle(&mut self, key: ListKey, new_first: usize) -> Result<bool> {
        let list = self.list_mut(key)?;
        if new_first == 0 {
            return Ok(true);
        }
        if new_first >= list.len() {
            return Ok(false);
        }
        list.rotate_to(new_first);
        Ok(true)
    }

    /// Unbind and drop every element.
    pub fn clear_list(&mut self, key: ListKey) -> Result<()> {
        for item_key in self.item_keys(key)? {
            let _ = self.unbind(item_key);
        }
        self.list_mut(key)?.clear_items();
        Ok(())
    }

    /// Live targets in list order, empty slots skipped.
    pub fn list_targets(&self, key: ListKey) -> Result<Vec<EntityHandle>> {
        Ok(self.list(key)?.targets())
    }

    /// Target of the element at `index`.
    pub fn list_get(&self, key: ListKey, index: usize) -> Result<Option<EntityHandle>> {
        Ok(self.list(key)?.get(index).and_then(Reference::target))
    }

    pub fn list_position(&self, key: ListKey, target: EntityHandle) -> Result<Option<usize>> {
        Ok(self.list(key)?.position_of(target))
    }

    /// Remove every element pointing at `target`. Returns how many went.
    pub fn remove_target(&mut self, key: ListKey, target: EntityHandle) -> Result<usize> {
        let matching = self.items_pointing_at(key, target)?;
        for item_key in &matching {
            self.remove_list_item(*item_key)?;
        }
        Ok(matching.len())
    }

    /// Empty every element pointing at `target`, keeping the slots.
    pub fn zero_out_target(&mut self, key: ListKey, target: EntityHandle) -> Result<usize> {
        let matching = self.items_pointing_at(key, target)?;
        for item_key in &matching {
            self.clear_reference(*item_key)?;
        }
        Ok(matching.len())
    }

    fn items_pointing_at(&self, key: ListKey, target: EntityHandle) -> Result<Vec<RefKey>> {
        let mut matching = Vec::new();
        for item_key in self.item_keys(key)? {
            if self.reference(item_key)?.target() == Some(target) {
                matching.push(item_key);
            }
        }
        Ok(matching)
    }

    /// Resolve every element. In an auto-sizing list elements that fail to
    /// resolve are removed; otherwise they stay as empty placeholders.
    pub fn resolve_list(&mut self, key: ListKey, resolver: &impl Resolver) -> Result<ResolveReport> {
        let auto_sizing = self.list(key)?.is_auto_sizing();
        let mut report = ResolveReport::default();
        for item_key in self.item_keys(key)? {
            match self.resolve_slot(item_key, resolver) {
                Ok(SlotOutcome::Bound) => report.resolved += 1,
                Ok(SlotOutcome::Empty) => report.empty += 1,
                Ok(SlotOutcome::AlreadyResolved) => {}
                Err(err) => {
                    if auto_sizing && self.reference(item_key)?.is_null() {
                        self.remove_list_item(item_key)?;
                        report.removed += 1;
                    }
                    report.failures.push(err);
                }
            }
        }
        Ok(report)
    }

    pub fn unresolve_list(&mut self, key: ListKey) -> Result<()> {
        for item_key in self.item_keys(key)? {
            self.unresolve_reference(item_key)?;
        }
        Ok(())
    }

    /// Append the elements, space separated, in list order.
    pub fn write_list(&self, out: &mut String, key: ListKey) -> Result<()> {
        for (i, item_key) in self.item_keys(key)?.into_iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.write_reference(out, item_key)?;
        }
        Ok(())
    }

    pub fn list_text(&self, key: ListKey) -> Result<String> {
        let mut out = String::new();
        self.write_list(&mut out, key)?;
        Ok(out)
    }

    /// Replace the list content with references read from `cursor`.
    ///
    /// Reading stops at the first token that cannot start a reference. Empty
    /// references are skipped in auto-sizing lists. An unreadable reference
    /// ends the read: it is dropped from an auto-sizing list and kept as an
    /// empty placeholder otherwise, and its error is returned.
    ///
    /// With [`GraphConfig::lenient_list_reading`](crate::GraphConfig) off,
    /// anything left before the closing `;` is reported as malformed too.
    pub fn read_list(&mut self, key: ListKey, cursor: &mut TextCursor<'_>) -> Result<()> {
        self.clear_list(key)?;
        let auto_sizing = self.list(key)?.is_auto_sizing();

        while text::starts_reference(cursor) {
            let element = self.list(key)?.new_element();
            let item_key = self.insert_last(key, element)?;
            if let Err(err) = self.read_reference(item_key, cursor) {
                if auto_sizing {
                    self.remove_list_item(item_key)?;
                }
                return Err(err);
            }
            let reference = self.reference(item_key)?;
            if auto_sizing && reference.unresolved_ref().is_some_and(|u| u.is_empty()) {
                self.remove_list_item(item_key)?;
            }
        }

        if !self.config.lenient_list_reading {
            if let Some(token) = cursor.peek_token() {
                if !token.starts_with(';') {
                    tracing::warn!(%key, found = token, "Unexpected token after reference list");
                    let err = ReferenceError::malformed("expected ';' after the list", token);
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    pub fn read_list_str(&mut self, key: ListKey, text: &str) -> Result<()> {
        self.read_list(key, &mut TextCursor::new(text))
    }

    /// Replace the content of `dst` with copies of the elements of `src`.
    ///
    /// Elements are copied with [`Graph::copy_reference`]; one that cannot be
    /// copied stays empty and the first such error is returned after the
    /// whole list has been copied.
    pub fn copy_list(&mut self, dst: ListKey, src: ListKey, force_unresolve: bool) -> Result<()> {
        if dst == src {
            return Ok(());
        }
        self.clear_list(dst)?;
        let mut first_error = None;
        for src_key in self.item_keys(src)? {
            let element = self.list(dst)?.new_element();
            let dst_key = self.insert_last(dst, element)?;
            if let Err(err) = self.copy_reference(dst_key, src_key, force_unresolve) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
