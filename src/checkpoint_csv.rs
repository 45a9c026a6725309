// Checkpoint CSV export/import: no header, one row per checkpoint,
// five fields in axis order.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use log::info;

use crate::checkpoints::{Axis, Checkpoint, AXIS_COUNT};
use crate::error::{ControllerError, Result};

pub fn write_checkpoints<W: Write>(writer: W, checkpoints: &[Checkpoint]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    for checkpoint in checkpoints {
        wtr.write_record(checkpoint.values())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse every row; any bad row fails the whole read
pub fn read_checkpoints<R: Read>(reader: R) -> Result<Vec<Checkpoint>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut checkpoints = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let row = idx + 1;
        if record.len() != AXIS_COUNT {
            return Err(ControllerError::FieldCount { row, found: record.len() });
        }
        let raw = Checkpoint::new(Axis::ALL.map(|axis| record[axis.index()].to_string()));
        let values = raw.numeric().map_err(|axis| ControllerError::NotNumeric {
            row,
            axis,
            value: raw.value(axis).to_string(),
        })?;
        checkpoints.push(Checkpoint::from_numbers(values));
    }
    Ok(checkpoints)
}

pub fn export_checkpoints(path: &Path, checkpoints: &[Checkpoint]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_checkpoints(file, checkpoints)?;
    info!(target: "checkpoint_csv", "Exported {} checkpoint(s) to {}", checkpoints.len(), path.display());
    Ok(())
}

pub fn import_checkpoints(path: &Path) -> Result<Vec<Checkpoint>> {
    let file = std::fs::File::open(path)?;
    let checkpoints = read_checkpoints(file)?;
    info!(target: "checkpoint_csv", "Imported {} checkpoint(s) from {}", checkpoints.len(), path.display());
    Ok(checkpoints)
}
