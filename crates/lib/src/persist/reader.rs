use super::{EntityFactory, LoadReport, PersistError};
use crate::{
    Error, Graph, Result,
    constants::{ASSEMBLY_KEY, DEFAULT_TYPE, ID_KEY},
    entity::EntityHandle,
    field::{FieldError, TextCursor},
    resolver::GraphLookup,
};

/// Read model records into the graph, then resolve the whole graph.
///
/// Records of unknown types and unknown keys are skipped, and values that
/// cannot be read (including an unreadable `ID` or `ASSEMBLY_ID`) are
/// collected in the report; all of these are logged.
/// Broken record structure aborts the read with [`PersistError`], leaving
/// the entities read so far in the graph.
pub fn read_model(
    graph: &mut Graph,
    text: &str,
    factory: &impl EntityFactory,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    let mut cursor = TextCursor::new(text);
    while !cursor.is_exhausted() {
        read_record(graph, &mut cursor, factory, &mut report)?;
    }

    report.resolve = graph.resolve_all(&GraphLookup);
    tracing::info!(
        entities = report.entities.len(),
        skipped = report.skipped_records,
        unknown_keys = report.unknown_keys,
        value_errors = report.value_errors.len(),
        unresolved = report.resolve.failures.len(),
        "Read model"
    );
    Ok(report)
}

fn malformed(cursor: &TextCursor<'_>, reason: &'static str) -> PersistError {
    PersistError::malformed(cursor.position(), reason, cursor.rest().trim_start())
}

fn read_record(
    graph: &mut Graph,
    cursor: &mut TextCursor<'_>,
    factory: &impl EntityFactory,
    report: &mut LoadReport,
) -> Result<()> {
    let Some(type_name) = cursor.read_word() else {
        return Err(malformed(cursor, "expected a type name").into());
    };
    if !cursor.eat_prefix("{") {
        return Err(malformed(cursor, "expected '{' after the type name").into());
    }

    let type_id = graph.registry().type_id_from_name(type_name);
    let builder = if type_id > DEFAULT_TYPE {
        factory.create(type_id, type_name)
    } else {
        None
    };
    let Some(builder) = builder else {
        tracing::warn!(type_name, position = cursor.position(), "Skipping record");
        if !cursor.skip_past('}') {
            return Err(PersistError::UnterminatedRecord {
                type_name: type_name.to_string(),
            }
            .into());
        }
        report.skipped_records += 1;
        return Ok(());
    };

    let handle = graph.insert(builder);
    report.entities.push(handle);

    let mut id = None;
    let mut assembly = None;
    loop {
        if cursor.eat_prefix("}") {
            break;
        }
        if cursor.is_exhausted() {
            return Err(PersistError::UnterminatedRecord {
                type_name: type_name.to_string(),
            }
            .into());
        }
        let Some(key) = cursor.read_word() else {
            return Err(malformed(cursor, "expected a key or '}'").into());
        };
        if !cursor.eat_prefix("=") {
            return Err(malformed(cursor, "expected '=' after the key").into());
        }

        let read = match key {
            ID_KEY => cursor.read_int().map_err(Error::from).map(|value| {
                id = Some(value);
                true
            }),
            ASSEMBLY_KEY => read_assembly(cursor).map(|path| {
                assembly = Some(path);
                true
            }),
            _ => read_value(graph, handle, key, cursor),
        };
        match read {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(type_name, key, "Unknown key skipped");
                report.unknown_keys += 1;
                cursor.skip_past(';');
                continue;
            }
            Err(err) => {
                tracing::warn!(type_name, key, error = %err, "Value not read");
                report.value_errors.push(err);
                cursor.skip_past(';');
                continue;
            }
        }

        if !cursor.eat_prefix(";") {
            return Err(malformed(cursor, "expected ';' after the value").into());
        }
    }

    if id.is_some() || assembly.is_some() {
        let entity = graph.entity(handle)?;
        let id = id.unwrap_or(entity.id());
        let assembly = assembly.unwrap_or_else(|| entity.assembly().to_vec());
        graph.set_identity(handle, id, assembly)?;
    }
    Ok(())
}

/// Read an assembly path: integers up to the terminating `;`.
fn read_assembly(cursor: &mut TextCursor<'_>) -> Result<Vec<i32>> {
    let mut path = Vec::new();
    while let Some(level) = cursor.try_int() {
        path.push(level);
    }
    match cursor.peek_char() {
        Some(';') => Ok(path),
        _ => Err(FieldError::read_failure("an assembly level", cursor.rest()).into()),
    }
}

/// Read the value of a data field, reference or reference list. Returns
/// false when `key` names none of them.
fn read_value(
    graph: &mut Graph,
    handle: EntityHandle,
    key: &str,
    cursor: &mut TextCursor<'_>,
) -> Result<bool> {
    if graph.read_field(handle, key, cursor, true)? {
        return Ok(true);
    }
    if let Some(reference) = graph.find_reference(handle, key) {
        graph.read_reference(reference, cursor)?;
        return Ok(true);
    }
    if let Some(list) = graph.find_list(handle, key) {
        graph.read_list(list, cursor)?;
        return Ok(true);
    }
    Ok(false)
}
