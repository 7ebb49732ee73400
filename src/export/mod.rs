//! # Alignment Export
//!
//! CSV tables of an aligned peak set. Every table has one row per aligned
//! position; every field is double-quoted and gaps are written as `NA`.
//!
//! - **Retention-time table**: one column per experiment, times with three
//!   decimals in minutes or seconds.
//! - **Area table**: same layout, normalised areas (raw when not normalised)
//!   with four decimals.
//! - **Composite table**: one consensus peak per position with its UID,
//!   mean retention time and the number of contributing peaks.

mod error;

pub use error::ExportError;

use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::alignment::{Alignment, Cell};

/// Placeholder written for a gap
pub const GAP_TOKEN: &str = "NA";

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer)
}

fn format_rt(retention_time: f64, minutes: bool) -> String {
    let value = if minutes {
        retention_time / 60.0
    } else {
        retention_time
    };
    format!("{:.3}", value)
}

fn check_exportable(alignment: &Alignment) -> Result<(), ExportError> {
    if alignment.nrows() == 0 {
        return Err(ExportError::InvalidAlignment(
            "alignment has no experiments".to_string(),
        ));
    }
    Ok(())
}

/// Write the retention-time and area tables to any writers
pub fn write_csv_to<R: Write, A: Write>(
    alignment: &Alignment,
    rt_writer: R,
    area_writer: A,
    minutes: bool,
) -> Result<(), ExportError> {
    check_exportable(alignment)?;

    let mut rt_csv = csv_writer(rt_writer);
    let mut area_csv = csv_writer(area_writer);
    rt_csv.write_record(alignment.expr_codes())?;
    area_csv.write_record(alignment.expr_codes())?;

    for col in 0..alignment.ncols() {
        let mut rts = Vec::with_capacity(alignment.nrows());
        let mut areas = Vec::with_capacity(alignment.nrows());
        for cell in alignment.column(col) {
            match cell {
                Cell::Occupied(peak) => {
                    rts.push(format_rt(peak.retention_time, minutes));
                    areas.push(format!("{:.4}", peak.area()));
                }
                Cell::Gap => {
                    rts.push(GAP_TOKEN.to_string());
                    areas.push(GAP_TOKEN.to_string());
                }
            }
        }
        rt_csv.write_record(&rts)?;
        area_csv.write_record(&areas)?;
    }

    rt_csv.flush()?;
    area_csv.flush()?;
    Ok(())
}

/// Write the retention-time table to `rt_path` and the area table to `area_path`
pub fn write_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    alignment: &Alignment,
    rt_path: P,
    area_path: Q,
    minutes: bool,
) -> Result<(), ExportError> {
    let (rt_path, area_path) = (rt_path.as_ref(), area_path.as_ref());
    let rt_file = BufWriter::new(File::create(rt_path)?);
    let area_file = BufWriter::new(File::create(area_path)?);
    write_csv_to(alignment, rt_file, area_file, minutes)?;
    info!(
        "Wrote {} aligned positions to '{}' and '{}'",
        alignment.ncols(),
        rt_path.display(),
        area_path.display()
    );
    Ok(())
}

/// Write the composite-peak table to any writer
pub fn write_composite_csv_to<W: Write>(
    alignment: &Alignment,
    writer: W,
    minutes: bool,
) -> Result<(), ExportError> {
    check_exportable(alignment)?;

    let mut csv = csv_writer(writer);
    csv.write_record(["UID", "RT", "Peaks"])?;
    for col in 0..alignment.ncols() {
        let Some(composite) = alignment.composite_peak(col) else {
            continue;
        };
        csv.write_record([
            composite.uid(),
            format_rt(composite.retention_time, minutes),
            alignment.column_peak_count(col).to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the composite-peak table to `path`
pub fn write_composite_csv<P: AsRef<Path>>(
    alignment: &Alignment,
    path: P,
    minutes: bool,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    write_composite_csv_to(alignment, file, minutes)?;
    info!("Wrote composite peaks to '{}'", path.display());
    Ok(())
}
