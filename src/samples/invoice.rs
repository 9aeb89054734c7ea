use crate::canvas::Canvas;
use crate::error::ReportError;
use crate::report::Report;
use crate::style::{Align, Border, CellOptions, FontSettings, TextFit, VAlign};
use crate::units::PageSetup;
use crate::Color;

/// Variable holding the `Vec<InvoiceLine>` dataset.
pub const INVOICE_DATASET: &str = "invoice_lines";

const DESCRIPTION_WIDTH: f64 = 3.6;
const QUANTITY_WIDTH: f64 = 0.8;
const PRICE_WIDTH: f64 = 1.4;

const HEADING_COLOR: Color = Color::Rgb(36, 92, 160);

/// One billed item.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceLine {
    /// Free text, wrapped over several lines when long.
    pub description: String,
    /// Billed quantity.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: f64,
}

impl InvoiceLine {
    /// Creates a line item.
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Quantity times unit price.
    pub fn amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Deterministic line items, long enough to span several pages.
pub fn sample_invoice_lines() -> Vec<InvoiceLine> {
    const ITEMS: &[(&str, f64)] = &[
        ("Consulting hours", 95.0),
        ("On-site workshop including travel, preparation and follow-up notes", 1250.0),
        ("Hosting (monthly)", 49.9),
        ("Support retainer", 300.0),
        ("Hardware: rack-mounted storage node with redundant power supplies", 2199.0),
        ("Licence renewal", 120.0),
    ];

    (0..48)
        .map(|index| {
            let (description, price) = ITEMS[index % ITEMS.len()];
            let quantity = (index % 5 + 1) as u32;
            InvoiceLine::new(format!("{:02}. {}", index + 1, description), quantity, price)
        })
        .collect()
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn cell(width: f64) -> CellOptions {
    CellOptions::new().with_width(width)
}

fn print_table_header(canvas: &mut Canvas<'_>) -> Result<(), ReportError> {
    let heading = FontSettings::new().bold().with_color(HEADING_COLOR);
    let base = CellOptions::new()
        .with_font(heading)
        .with_border("B".parse::<Border>()?)
        .with_valign(VAlign::Bottom);

    canvas.start_row();
    canvas.column("Description", &base.clone().with_width(DESCRIPTION_WIDTH), false)?;
    canvas.column(
        "Qty",
        &base.clone().with_width(QUANTITY_WIDTH).with_align(Align::Right),
        false,
    )?;
    canvas.column(
        "Unit price",
        &base.clone().with_width(PRICE_WIDTH).with_align(Align::Right),
        false,
    )?;
    canvas.column("Amount", &base.with_align(Align::Right), true)?;
    canvas.end_row()
}

fn print_line(canvas: &mut Canvas<'_>, line: &InvoiceLine, index: usize) -> Result<(), ReportError> {
    if index == 0 {
        canvas.bookmark("Line items");
    }
    let border = Border::NONE;

    canvas.start_row();
    canvas.column(
        &line.description,
        &cell(DESCRIPTION_WIDTH)
            .with_multiline(true)
            .with_border(border)
            .with_valign(VAlign::Top),
        false,
    )?;
    canvas.column(
        line.quantity.to_string(),
        &cell(QUANTITY_WIDTH)
            .with_align(Align::Right)
            .with_border(border)
            .with_valign(VAlign::Top),
        false,
    )?;
    canvas.column(
        money(line.unit_price),
        &cell(PRICE_WIDTH)
            .with_align(Align::Right)
            .with_border(border)
            .with_valign(VAlign::Top),
        false,
    )?;
    canvas.column(
        money(line.amount()),
        &cell(0.0)
            .with_align(Align::Right)
            .with_border(border)
            .with_valign(VAlign::Top),
        true,
    )?;
    canvas.end_row()
}

fn print_totals(canvas: &mut Canvas<'_>) -> Result<(), ReportError> {
    let lines = canvas.variable::<Vec<InvoiceLine>>(INVOICE_DATASET)?;
    let total: f64 = lines.iter().map(InvoiceLine::amount).sum();
    let strong = FontSettings::new().bold();
    let border = "T".parse::<Border>()?;

    canvas.column(
        "Invoice total",
        &cell(DESCRIPTION_WIDTH + QUANTITY_WIDTH + PRICE_WIDTH)
            .with_font(strong.clone())
            .with_border(border),
        false,
    )?;
    canvas.column(
        money(total),
        &cell(0.0)
            .with_font(strong)
            .with_align(Align::Right)
            .with_border(border),
        true,
    )
}

/// Builds the sample invoice: a titled page header, a column header repeated
/// after every page break, one row per line item, a totals footer and a page
/// footer with the page number.
///
/// The returned report already holds `lines` under [`INVOICE_DATASET`].
pub fn build_invoice_report(lines: Vec<InvoiceLine>) -> Report {
    Report::new()
        .with_title("Invoice INV-2024-017")
        .page_start(PageSetup::default())
        .page_header(|canvas| {
            canvas.bookmark(format!("Page {}", canvas.page_number()));
            canvas.set_y(0.15);
            canvas.column(
                "Invoice INV-2024-017",
                &CellOptions::new()
                    .with_font(FontSettings::new().with_size(16).bold())
                    .with_border(Border::NONE)
                    .with_width(4.0),
                false,
            )?;
            canvas.column(
                "Northwind Traders",
                &CellOptions::new()
                    .with_align(Align::Right)
                    .with_border(Border::NONE)
                    .with_fit(TextFit::Shrink),
                true,
            )
        })
        .master_header(print_table_header)
        .master_data(INVOICE_DATASET, print_line)
        .master_footer(print_totals)
        .page_footer(|canvas| {
            let small = FontSettings::new().with_size(8).italic();
            canvas.column(
                "Payable within 30 days",
                &CellOptions::new()
                    .with_font(small.clone())
                    .with_border("T".parse::<Border>()?)
                    .with_width(4.0),
                false,
            )?;
            canvas.column(
                format!("Page {}", canvas.page_number()),
                &CellOptions::new()
                    .with_font(small)
                    .with_border("T".parse::<Border>()?)
                    .with_align(Align::Right),
                true,
            )
        })
        .page_end()
        .with_variable(INVOICE_DATASET, lines)
}
