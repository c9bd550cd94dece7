use std::fmt::Write as _;

use crate::{
    Graph, Result,
    constants::{ASSEMBLY_KEY, ID_KEY},
    entity::EntityHandle,
    reference::{ListKey, RefKey},
};

/// All entities as records, ordered by type id, assembly path and object id
/// so that equal graphs produce equal text.
pub fn write_model(graph: &Graph) -> Result<String> {
    let mut order: Vec<_> = graph
        .iter()
        .map(|(handle, entity)| ((entity.type_id(), entity.assembly().to_vec(), entity.id()), handle))
        .collect();
    order.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for (_, handle) in order {
        write_record(graph, &mut out, handle)?;
    }
    Ok(out)
}

/// Append the record of one entity.
///
/// Entities of unregistered types are skipped with a warning, since their
/// record could not be read back. Empty references are left out unless
/// flagged with `print_if_zero`; empty lists are left out.
pub fn write_record(graph: &Graph, out: &mut String, handle: EntityHandle) -> Result<()> {
    let entity = graph.entity(handle)?;
    let Some(type_name) = graph.registry().type_name(entity.type_id()) else {
        tracing::warn!(%handle, type_id = entity.type_id(), "Entity of unregistered type not written");
        return Ok(());
    };

    let _ = writeln!(out, "{type_name} {{");
    let _ = writeln!(out, "  {ID_KEY} = {};", entity.id());
    if !entity.assembly().is_empty() {
        let levels: Vec<String> = entity.assembly().iter().map(i32::to_string).collect();
        let _ = writeln!(out, "  {ASSEMBLY_KEY} = {};", levels.join(" "));
    }

    for (name, value) in graph.field_texts(handle, true)? {
        let _ = writeln!(out, "  {name} = {value};");
    }

    for (index, reference) in entity.references().iter().enumerate() {
        let text = graph.reference_text(RefKey::single(handle, index as u32))?;
        if text == "0" && !reference.print_if_zero() {
            continue;
        }
        let _ = writeln!(out, "  {} = {text};", reference.context_name());
    }

    for (index, list) in entity.reference_lists().iter().enumerate() {
        if list.is_empty() {
            continue;
        }
        let key = ListKey {
            owner: handle,
            list: index as u32,
        };
        let _ = writeln!(out, "  {} = {};", list.context_name(), graph.list_text(key)?);
    }

    out.push_str("}\n");
    Ok(())
}
