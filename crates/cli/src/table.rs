//! Renders a JSON array of objects as a banded table.

use std::error::Error;
use std::fs;
use std::path::Path;

use log::{debug, info};
use pdf_bands::{Align, Border, CellOptions, FontSettings, PageSetup, Report, VAlign};
use serde_json::Value;

const COLUMNS: &str = "columns";
const ROWS: &str = "rows";

/// Column names plus row cells rendered as text.
#[derive(Debug, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parses `json` into a table.
///
/// Without explicit `columns` the keys of the first object are used, in the
/// order `serde_json` yields them (sorted by name).
pub fn parse_table(json: &str, columns: Option<Vec<String>>) -> Result<Table, Box<dyn Error>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err("table data must be a JSON array of objects".into());
    };

    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(object) => objects.push(object),
            other => {
                return Err(format!("row {} is not an object: {}", index, other).into());
            }
        }
    }

    let columns = match columns {
        Some(columns) if !columns.is_empty() => columns,
        _ => objects
            .first()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default(),
    };
    if columns.is_empty() {
        return Err("no columns to render; pass --columns or provide at least one row".into());
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|column| cell_text(object.get(column)))
                .collect()
        })
        .collect();

    Ok(Table { columns, rows })
}

/// Reads and parses the JSON file at `path`.
pub fn load_table(path: &Path, columns: Option<Vec<String>>) -> Result<Table, Box<dyn Error>> {
    let json = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let table = parse_table(&json, columns)?;
    info!(
        "Loaded {} rows with {} columns from {}",
        table.rows.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

fn column_width(canvas: &pdf_bands::Canvas<'_>, count: usize) -> f64 {
    let margins = canvas.margins();
    (canvas.page_width() - margins.left - margins.right) / count as f64
}

fn print_cells(
    canvas: &mut pdf_bands::Canvas<'_>,
    cells: &[String],
    options: &CellOptions,
) -> Result<(), pdf_bands::ReportError> {
    let width = column_width(canvas, cells.len());
    canvas.start_row();
    for (index, text) in cells.iter().enumerate() {
        let last = index + 1 == cells.len();
        let options = options.clone().with_width(if last { 0.0 } else { width });
        canvas.column(text, &options, last)?;
    }
    canvas.end_row()
}

/// Builds a report printing `table` with a repeated column header.
pub fn build_table_report(title: &str, table: Table, setup: PageSetup) -> Report {
    debug!("Building table report '{}'", title);
    let heading = title.to_string();

    Report::new()
        .with_title(title)
        .page_start(setup)
        .page_header(move |canvas| {
            canvas.bookmark(format!("Page {}", canvas.page_number()));
            canvas.column(
                &heading,
                &CellOptions::new()
                    .with_font(FontSettings::new().with_size(14).bold())
                    .with_border(Border::NONE),
                true,
            )
        })
        .master_header(|canvas| {
            let columns = canvas.variable::<Vec<String>>(COLUMNS)?;
            let options = CellOptions::new()
                .with_font(FontSettings::new().bold())
                .with_valign(VAlign::Bottom);
            print_cells(canvas, &columns, &options)
        })
        .master_data(ROWS, |canvas, row: &Vec<String>, _| {
            let options = CellOptions::new()
                .with_multiline(true)
                .with_valign(VAlign::Top);
            print_cells(canvas, row, &options)
        })
        .master_footer(|canvas| {
            let rows = canvas.variable::<Vec<Vec<String>>>(ROWS)?;
            canvas.column(
                format!("{} rows", rows.len()),
                &CellOptions::new()
                    .with_font(FontSettings::new().italic())
                    .with_border(Border::NONE)
                    .with_align(Align::Right),
                true,
            )
        })
        .page_footer(|canvas| {
            canvas.column(
                format!("Page {}", canvas.page_number()),
                &CellOptions::new()
                    .with_font(FontSettings::new().with_size(8))
                    .with_border(Border::NONE)
                    .with_align(Align::Center),
                true,
            )
        })
        .page_end()
        .with_variable(COLUMNS, table.columns)
        .with_variable(ROWS, table.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_bands::{PageFormat, RecordingSurface, Unit};

    #[test]
    fn columns_default_to_first_object_keys() {
        let table = parse_table(r#"[{"b": 2, "a": "x"}, {"a": null}]"#, None).unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["x", "2"], vec!["", ""]]);
    }

    #[test]
    fn explicit_columns_select_and_order_fields() {
        let table = parse_table(
            r#"[{"name": "bolt", "qty": 4, "note": "zinc"}]"#,
            Some(vec!["qty".into(), "name".into()]),
        )
        .unwrap();
        assert_eq!(table.rows, vec![vec!["4", "bolt"]]);
    }

    #[test]
    fn non_array_input_is_rejected() {
        assert!(parse_table(r#"{"a": 1}"#, None).is_err());
        assert!(parse_table(r#"[1, 2]"#, None).is_err());
        assert!(parse_table("[]", None).is_err());
    }

    #[test]
    fn table_report_repeats_header_on_each_page() {
        let rows = (0..60).map(|i| format!(r#"{{"id": {i}, "name": "item {i}"}}"#));
        let json = format!("[{}]", rows.collect::<Vec<_>>().join(","));
        let table = parse_table(&json, None).unwrap();

        let setup = PageSetup::default()
            .with_format(PageFormat::A5)
            .with_unit(Unit::Millimetre)
            .with_margins(10.0);
        let report = build_table_report("Parts", table, setup);
        let mut surface = RecordingSurface::new();
        let rendered = report.render_with(&mut surface).unwrap();

        assert!(rendered.page_count > 1);
        let headers = surface
            .texts()
            .into_iter()
            .filter(|(_, text)| *text == "name")
            .count();
        assert_eq!(headers, rendered.page_count);
        assert!(surface.texts().iter().any(|(_, text)| *text == "60 rows"));
    }
}
