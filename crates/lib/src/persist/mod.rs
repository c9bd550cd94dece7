//! Whole-graph text persistence.
//!
//! A model is a sequence of records, one per entity:
//!
//! ```text
//! PART {
//!   ID = 10;
//!   ASSEMBLY_ID = 1 4;
//!   length = 2.5;
//!   parent = 20;
//!   members = 21 22 aID: 3 uID: 7 BEAM;
//! }
//! ```
//!
//! Keys other than `ID` and `ASSEMBLY_ID` name data fields, references and
//! reference lists of the entity (the latter two by context name). Records
//! are created through an [`EntityFactory`], which declares the fields and
//! reference slots for a type name. References are read unresolved and bound
//! by a resolve pass once every record has been read.

mod errors;
mod reader;
mod writer;

pub use errors::PersistError;
pub use reader::read_model;
pub use writer::{write_model, write_record};

use std::path::Path;

use crate::{
    Error, Graph, Result, TypeId,
    entity::{EntityBuilder, EntityHandle},
    resolver::ResolveReport,
};

/// Creates the empty entity for a record of a given type.
///
/// Returning `None` skips the record.
pub trait EntityFactory {
    fn create(&self, type_id: TypeId, type_name: &str) -> Option<EntityBuilder>;
}

impl<F> EntityFactory for F
where
    F: Fn(TypeId, &str) -> Option<EntityBuilder>,
{
    fn create(&self, type_id: TypeId, type_name: &str) -> Option<EntityBuilder> {
        self(type_id, type_name)
    }
}

/// Pins down the closure signature so a closure can be passed wherever an
/// [`EntityFactory`] is expected.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(TypeId, &str) -> Option<EntityBuilder>,
{
    f
}

/// Outcome of reading a model.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Entities created, in record order.
    pub entities: Vec<EntityHandle>,
    /// Records whose type was unknown or refused by the factory.
    pub skipped_records: usize,
    /// Keys that named nothing on their entity.
    pub unknown_keys: usize,
    /// Values that could not be read. The affected field keeps its previous
    /// value and the affected reference is left empty.
    pub value_errors: Vec<Error>,
    /// The resolve pass run after reading.
    pub resolve: ResolveReport,
}

impl LoadReport {
    /// True when every record, key and reference was understood.
    pub fn is_clean(&self) -> bool {
        self.skipped_records == 0
            && self.unknown_keys == 0
            && self.value_errors.is_empty()
            && self.resolve.is_clean()
    }
}

/// Write every entity of the graph to a file.
pub fn save_to_file<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let text = write_model(graph)?;
    std::fs::write(path.as_ref(), text)?;
    tracing::debug!(path = %path.as_ref().display(), entities = graph.len(), "Saved model");
    Ok(())
}

/// Read a model file into the graph.
///
/// A missing file loads nothing and is not an error.
pub fn load_from_file<P: AsRef<Path>>(
    graph: &mut Graph,
    path: P,
    factory: &impl EntityFactory,
) -> Result<LoadReport> {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(text) => read_model(graph, &text, factory),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.as_ref().display(), "No model file, nothing loaded");
            Ok(LoadReport::default())
        }
        Err(e) => Err(e.into()),
    }
}
