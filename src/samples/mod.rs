//! Ready-made reports shared by the CLI, the demos and the tests.

mod invoice;

pub use invoice::{build_invoice_report, sample_invoice_lines, InvoiceLine, INVOICE_DATASET};
