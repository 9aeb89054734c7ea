#[cfg(feature = "bookmarks")]
use std::error::Error;

#[cfg(feature = "bookmarks")]
fn main() -> Result<(), Box<dyn Error>> {
    use pdf_bands::samples::{build_invoice_report, sample_invoice_lines};

    let report = build_invoice_report(sample_invoice_lines());
    let rendered = report.render_with_bookmarks()?;
    rendered.save("invoice_with_bookmarks.pdf")?;
    println!(
        "Generated invoice_with_bookmarks.pdf ({} bookmarks, {} bytes)",
        rendered.bookmarks.len(),
        rendered.bytes.len()
    );
    Ok(())
}

#[cfg(not(feature = "bookmarks"))]
fn main() {
    eprintln!(
        "Enable the `bookmarks` feature to run this example: \
         cargo run --example invoice_bookmarks --features bookmarks"
    );
}
