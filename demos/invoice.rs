use std::error::Error;

use pdf_bands::samples::{build_invoice_report, sample_invoice_lines};

fn main() -> Result<(), Box<dyn Error>> {
    let report = build_invoice_report(sample_invoice_lines());
    let rendered = report.render_to_file("invoice.pdf")?;
    println!(
        "Generated invoice.pdf ({} pages, {} bytes)",
        rendered.page_count,
        rendered.bytes.len()
    );
    Ok(())
}
