use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use salesflow_table::ItemTable;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::model::{SalesItem, TransformedRow, ORDER_ID, TOTAL_AMOUNT};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub items_written: usize,
    pub distinct_keys: usize,
}

/// Writes one item per data row of the transformed file at `path`, in file
/// order. Each write is an unconditional put, so a repeated `OrderID` leaves
/// the last row's values in the table. The first failure stops the load;
/// earlier writes are not undone.
pub async fn load_file(table: &dyn ItemTable, path: &Path) -> Result<LoadSummary> {
    let file = File::open(path).map_err(|err| PipelineError::io(path, err))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?.clone();
    for required in [ORDER_ID, TOTAL_AMOUNT] {
        if !headers.iter().any(|header| header == required) {
            return Err(PipelineError::MissingColumn(required.to_string()));
        }
    }

    let mut summary = LoadSummary::default();
    let mut keys = HashSet::new();

    for (index, record) in reader.deserialize::<TransformedRow>().enumerate() {
        let line = index as u64 + 1;
        let row = record.map_err(|err| PipelineError::InvalidRow {
            line,
            message: err.to_string(),
        })?;
        let item = sales_item(row, line)?;

        table.put_item(item.to_item()).await?;
        debug!(order_id = %item.order_id, total_amount = %item.total_amount, "put item");

        keys.insert(item.order_id);
        summary.items_written += 1;
    }

    summary.distinct_keys = keys.len();
    info!(
        table = table.table_name(),
        items_written = summary.items_written,
        distinct_keys = summary.distinct_keys,
        "loaded sales items"
    );

    Ok(summary)
}

fn sales_item(row: TransformedRow, line: u64) -> Result<SalesItem> {
    let raw = row.total_amount.trim();
    // Parsed only to reject bad rows; the stored value is the original text.
    let total_amount: f64 = raw.parse().map_err(|_| PipelineError::InvalidRow {
        line,
        message: format!("{TOTAL_AMOUNT} `{raw}` is not a number"),
    })?;
    if !total_amount.is_finite() {
        return Err(PipelineError::InvalidRow {
            line,
            message: format!("{TOTAL_AMOUNT} `{raw}` is not finite"),
        });
    }

    Ok(SalesItem {
        order_id: row.order_id,
        total_amount: raw.to_string(),
    })
}
