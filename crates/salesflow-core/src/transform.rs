use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::model::{PRICE, QUANTITY, TOTAL_AMOUNT};

#[derive(Debug, Clone, PartialEq)]
pub struct TransformSummary {
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Appends `TotalAmount = Quantity * Price` to every row.
///
/// Both inputs must be present and numeric. Integer x integer stays integer,
/// anything involving a float becomes a float, and nulls stay null. A frame
/// with no rows has no inferred types, so its operands are treated as floats.
pub fn derive_total_amount(df: DataFrame) -> Result<DataFrame> {
    let empty = df.height() == 0;

    for name in [QUANTITY, PRICE] {
        let column = df
            .column(name)
            .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
        if !empty && !is_numeric(column.dtype()) {
            return Err(PipelineError::NonNumericColumn {
                column: name.to_string(),
                dtype: column.dtype().clone(),
            });
        }
    }

    let operand = |name: &str| {
        if empty {
            col(name).cast(DataType::Float64)
        } else {
            col(name)
        }
    };

    let out = df
        .lazy()
        .with_column((operand(QUANTITY) * operand(PRICE)).alias(TOTAL_AMOUNT))
        .collect()?;

    Ok(out)
}

/// Reads the raw CSV at `raw`, derives `TotalAmount`, and writes the result
/// (original columns first, header included) to `out`.
pub fn transform_file(raw: &Path, out: &Path) -> Result<TransformSummary> {
    let contents = std::fs::read(raw).map_err(|err| PipelineError::io(raw, err))?;

    // Infer over every row so a float appearing late still widens the column.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(contents))
        .finish()?;
    let input_rows = df.height();

    let mut df = derive_total_amount(df)?;
    debug_assert_eq!(df.height(), input_rows);

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }
    let mut file = File::create(out).map_err(|err| PipelineError::io(out, err))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    info!(
        raw = %raw.display(),
        out = %out.display(),
        rows = df.height(),
        "derived TotalAmount"
    );

    Ok(TransformSummary {
        rows: df.height(),
        columns,
    })
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}
