//! Reading native objects back after dispatch.

use tracing::{debug, trace};

use crate::error::CodegenError;
use crate::outputs::ObjectSink;
use crate::registry::UnitRegistry;
use crate::unit::{CompilationUnit, UnitState};

/// Read every selected unit's object into `objects`, in task order.
///
/// A missing or unreadable object is recorded and the batch continues.
/// Harvested units become `Consumed`, so a second call is a no-op for
/// them. Returns the number of objects harvested, or every failure joined.
pub fn harvest(registry: &mut UnitRegistry, objects: &mut dyn ObjectSink) -> Result<usize, CodegenError> {
    let mut pending: Vec<&mut CompilationUnit> = registry
        .iter_mut()
        .filter(|u| u.state() == UnitState::Selected)
        .collect();
    pending.sort_by_key(|u| u.task_number());

    let mut harvested = 0;
    let mut errors = Vec::new();
    for unit in pending {
        match read_object(unit) {
            Ok(buffer) => {
                let task = unit.task_number().unwrap_or_default();
                trace!(task, module = unit.id(), bytes = buffer.len(), "harvested object");
                objects.add_object(task, unit.id(), buffer);
                unit.consume();
                harvested += 1;
            }
            Err(e) => errors.push(e),
        }
    }

    debug!(harvested, failed = errors.len(), "harvest done");
    match CodegenError::combine(errors) {
        Some(e) => Err(e),
        None => Ok(harvested),
    }
}

fn read_object(unit: &CompilationUnit) -> Result<Vec<u8>, CodegenError> {
    let path = unit.native_object_path();
    if !path.exists() {
        return Err(CodegenError::MissingOutput {
            module: unit.id().to_string(),
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|e| CodegenError::io("read", path, e))
}

#[cfg(test)]
mod tests;
