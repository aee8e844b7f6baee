use polars::prelude::*;
use salesflow_core::error::PipelineError;
use salesflow_core::transform::{derive_total_amount, transform_file};

fn sales_frame() -> DataFrame {
    df!(
        "OrderID" => &[1i64, 2, 3],
        "Quantity" => &[2i64, 3, 7],
        "Price" => &[5.0f64, 10.0, 0.25],
    )
    .unwrap()
}

#[test]
fn total_amount_is_exact_product() -> anyhow::Result<()> {
    let df = derive_total_amount(sales_frame())?;

    let total = df.column("TotalAmount")?.f64()?;
    assert_eq!(total.get(0), Some(10.0));
    assert_eq!(total.get(1), Some(30.0));
    assert_eq!(total.get(2), Some(1.75));
    assert_eq!(df.height(), 3);
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, ["OrderID", "Quantity", "Price", "TotalAmount"]);

    Ok(())
}

#[test]
fn integer_operands_stay_integer() -> anyhow::Result<()> {
    let df = df!(
        "Quantity" => &[4i64, 6],
        "Price" => &[3i64, 11],
    )?;

    let df = derive_total_amount(df)?;
    let total = df.column("TotalAmount")?.i64()?;
    assert_eq!(total.get(0), Some(12));
    assert_eq!(total.get(1), Some(66));

    Ok(())
}

#[test]
fn null_operands_produce_null_totals() -> anyhow::Result<()> {
    let df = df!(
        "Quantity" => &[Some(2i64), None],
        "Price" => &[Some(1.5f64), Some(4.0)],
    )?;

    let df = derive_total_amount(df)?;
    let total = df.column("TotalAmount")?.f64()?;
    assert_eq!(total.get(0), Some(3.0));
    assert_eq!(total.get(1), None);
    assert_eq!(df.height(), 2);

    Ok(())
}

#[test]
fn missing_price_column_is_rejected() {
    let df = df!(
        "OrderID" => &[1i64],
        "Quantity" => &[2i64],
    )
    .unwrap();

    let err = derive_total_amount(df).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn(ref name) if name == "Price"));
}

#[test]
fn non_numeric_quantity_is_rejected() {
    let df = df!(
        "Quantity" => &["two", "three"],
        "Price" => &[5.0f64, 10.0],
    )
    .unwrap();

    let err = derive_total_amount(df).unwrap_err();
    match err {
        PipelineError::NonNumericColumn { column, dtype } => {
            assert_eq!(column, "Quantity");
            assert_eq!(dtype, DataType::String);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn transform_file_appends_column_and_keeps_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = dir.path().join("sales_data.csv");
    let out = dir.path().join("transformed_sales_data.csv");
    std::fs::write(
        &raw,
        "OrderID,Region,Quantity,Price\n1,west,2,5.0\n2,east,3,10.0\n3,west,1,2.5\n",
    )?;

    let summary = transform_file(&raw, &out)?;
    assert_eq!(summary.rows, 3);
    assert_eq!(
        summary.columns,
        vec!["OrderID", "Region", "Quantity", "Price", "TotalAmount"]
    );

    let written = std::fs::read_to_string(&out)?;
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("OrderID,Region,Quantity,Price,TotalAmount"));
    assert_eq!(lines.next(), Some("1,west,2,5.0,10.0"));
    assert_eq!(lines.next(), Some("2,east,3,10.0,30.0"));
    assert_eq!(lines.next(), Some("3,west,1,2.5,2.5"));
    assert_eq!(lines.next(), None);

    Ok(())
}

#[test]
fn late_float_price_widens_the_column() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = dir.path().join("raw.csv");
    let out = dir.path().join("out.csv");

    let mut contents = String::from("OrderID,Quantity,Price\n");
    for id in 0..150 {
        contents.push_str(&format!("{id},2,5\n"));
    }
    contents.push_str("999,2,2.5\n");
    std::fs::write(&raw, contents)?;

    let summary = transform_file(&raw, &out)?;
    assert_eq!(summary.rows, 151);

    let written = std::fs::read_to_string(&out)?;
    let last = written.lines().last().expect("output has rows");
    assert_eq!(last, "999,2,2.5,5.0");
    assert!(written.lines().nth(1).is_some_and(|line| line == "0,2,5.0,10.0"));

    Ok(())
}

#[test]
fn transform_file_overwrites_previous_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = dir.path().join("raw.csv");
    let out = dir.path().join("out.csv");
    std::fs::write(&out, "left over from an earlier run\n".repeat(10))?;
    std::fs::write(&raw, "OrderID,Quantity,Price\n9,1,1.0\n")?;

    transform_file(&raw, &out)?;
    let written = std::fs::read_to_string(&out)?;
    assert_eq!(written.lines().count(), 2);
    assert!(!written.contains("left over"));

    Ok(())
}

#[test]
fn header_only_file_produces_header_only_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = dir.path().join("raw.csv");
    let out = dir.path().join("out.csv");
    std::fs::write(&raw, "OrderID,Quantity,Price\n")?;

    let summary = transform_file(&raw, &out)?;
    assert_eq!(summary.rows, 0);

    let written = std::fs::read_to_string(&out)?;
    assert_eq!(written.trim_end(), "OrderID,Quantity,Price,TotalAmount");

    Ok(())
}

#[test]
fn missing_price_in_file_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = dir.path().join("raw.csv");
    let out = dir.path().join("out.csv");
    std::fs::write(&raw, "OrderID,Quantity\n1,2\n")?;

    let err = transform_file(&raw, &out).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn(ref name) if name == "Price"));
    assert!(!out.exists());

    Ok(())
}

#[test]
fn missing_raw_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("absent.csv");

    let err = transform_file(&raw, &dir.path().join("out.csv")).unwrap_err();
    match err {
        PipelineError::Io { path, .. } => assert!(path.ends_with("absent.csv")),
        other => panic!("unexpected error: {other}"),
    }
}
