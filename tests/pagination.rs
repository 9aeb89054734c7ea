use std::cell::Cell;
use std::rc::Rc;

use pdf_bands::surface::DrawOp;
use pdf_bands::{
    Align, BandKind, Border, Canvas, CellOptions, FontSettings, Padding, PageFormat, PageSetup,
    RecordingSurface, Report, ReportError, TextFit, Unit, VAlign,
};

const EPSILON: f64 = 1e-6;

/// Line height of a 12pt font on the recording surface, in millimetres.
const LINE_HEIGHT: f64 = 1.25 * 12.0 * 25.4 / 72.0;

/// Advance of one character at 12pt on the recording surface.
const CHAR_WIDTH: f64 = 0.5 * 12.0 * 25.4 / 72.0;

/// Glyph height of a 12pt font on the recording surface.
const GLYPH_HEIGHT: f64 = 0.75 * 12.0 * 25.4 / 72.0;

fn small_page() -> PageSetup {
    PageSetup::default()
        .with_format(PageFormat::Custom {
            width_mm: 100.0,
            height_mm: 100.0,
        })
        .with_unit(Unit::Millimetre)
        .with_margins(10.0)
}

fn report() -> Report {
    Report::new().with_default_padding(0.0)
}

fn fixed(width: f64, height: f64) -> CellOptions {
    CellOptions::new().with_width(width).with_height(height)
}

fn render(report: &Report) -> (RecordingSurface, usize) {
    let mut surface = RecordingSurface::new();
    let rendered = report.render_with(&mut surface).expect("render");
    (surface, rendered.page_count)
}

/// Page, x and y of the first drawn occurrence of `wanted`.
fn text_position(surface: &RecordingSurface, wanted: &str) -> (usize, f64, f64) {
    surface
        .operations()
        .iter()
        .find_map(|op| match op {
            DrawOp::Text {
                page, x, y, text, ..
            } if text == wanted => Some((*page, *x, *y)),
            _ => None,
        })
        .unwrap_or_else(|| panic!("'{wanted}' was not drawn"))
}

fn print_row(canvas: &mut Canvas<'_>, row: &u32, _: usize) -> Result<(), ReportError> {
    canvas.start_row();
    canvas.column(format!("row {row}"), &fixed(40.0, 10.0), false)?;
    canvas.column(row.to_string(), &fixed(0.0, 10.0), true)?;
    canvas.end_row()
}

fn master_report(rows: u32) -> Report {
    report()
        .page_start(small_page())
        .page_header(|canvas| canvas.column("page head", &fixed(0.0, 10.0), true))
        .page_footer(|canvas| canvas.column("page foot", &fixed(0.0, 10.0), true))
        .master_header(|canvas| canvas.column("head", &fixed(0.0, 10.0), true))
        .master_data("rows", print_row)
        .master_footer(|canvas| canvas.column("foot", &fixed(0.0, 10.0), true))
        .page_end()
        .with_variable("rows", (0..rows).collect::<Vec<u32>>())
}

#[test]
fn master_rows_break_before_the_master_footer() {
    let (surface, pages) = render(&master_report(10));
    assert_eq!(pages, 2);

    let mut first: Vec<String> = vec!["page head".into(), "page foot".into(), "head".into()];
    for row in 0..6 {
        first.push(format!("row {row}"));
        first.push(row.to_string());
    }
    first.push("foot".into());
    assert_eq!(surface.texts_on_page(1), first);

    assert_eq!(
        surface.texts_on_page(2),
        vec![
            "page head", "page foot", "head", "row 6", "6", "row 7", "7", "row 8", "8", "row 9",
            "9", "foot"
        ]
    );
}

#[test]
fn rows_resume_below_the_repeated_master_header() {
    let (surface, _) = render(&master_report(10));
    let resumed = surface
        .operations()
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { page: 2, y, text, .. } if text == "row 6" => Some(*y),
            _ => None,
        })
        .expect("row 6 on page 2");
    // Body starts at the top margin; the master header takes 10mm.
    let expected = 20.0 + (10.0 - LINE_HEIGHT) / 2.0;
    assert!((resumed - expected).abs() < EPSILON, "row 6 at {resumed}");
}

#[test]
fn short_dataset_stays_on_one_page() {
    let (surface, pages) = render(&master_report(6));
    assert_eq!(pages, 1);
    let feet = surface
        .texts()
        .into_iter()
        .filter(|(_, text)| *text == "foot")
        .count();
    assert_eq!(feet, 1);
}

#[test]
fn row_cells_share_the_tallest_height() {
    let cursor = Rc::new(Cell::new(0.0));
    let seen = Rc::clone(&cursor);
    let report = report()
        .page_start(small_page())
        .page_body(move |canvas| {
            canvas.start_row();
            canvas.column(
                "aaaa bbbb cccc dddd eeee",
                &CellOptions::new().with_width(30.0).with_multiline(true),
                false,
            )?;
            canvas.column("x", &CellOptions::new().with_width(20.0), true)?;
            canvas.end_row()?;
            seen.set(canvas.y());
            Ok(())
        });

    let (surface, _) = render(&report);
    assert_eq!(
        surface.texts_on_page(1),
        vec!["aaaa bbbb cccc", "dddd eeee", "x"]
    );

    let row_height = 2.0 * LINE_HEIGHT;
    assert!((cursor.get() - (10.0 + row_height)).abs() < EPSILON);

    let right_cell_left_border = surface.lines().into_iter().any(|(_, from, to)| {
        (from.0 - 40.0).abs() < EPSILON
            && (from.1 - 10.0).abs() < EPSILON
            && (to.0 - 40.0).abs() < EPSILON
            && (to.1 - (10.0 + row_height)).abs() < EPSILON
    });
    assert!(right_cell_left_border);

    let x_top = surface
        .operations()
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { y, text, .. } if text == "x" => Some(*y),
            _ => None,
        })
        .expect("x drawn");
    assert!((x_top - (10.0 + (row_height - LINE_HEIGHT) / 2.0)).abs() < EPSILON);
}

#[test]
fn zero_width_extends_to_the_right_margin() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        canvas.set_x(30.0);
        canvas.column("wide", &CellOptions::new(), true)
    });
    let (surface, _) = render(&report);
    let top = surface.lines().into_iter().any(|(_, from, to)| {
        (from.0 - 30.0).abs() < EPSILON
            && (from.1 - 10.0).abs() < EPSILON
            && (to.0 - 90.0).abs() < EPSILON
            && (to.1 - 10.0).abs() < EPSILON
    });
    assert!(top, "expected a top border from x=30 to the right margin");
}

#[test]
fn borderless_cells_draw_no_lines() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        canvas.column("plain", &CellOptions::new().with_border(Border::NONE), true)
    });
    let (surface, _) = render(&report);
    assert!(surface.lines().is_empty());
    assert_eq!(surface.texts_on_page(1), vec!["plain"]);
}

#[test]
fn single_line_text_is_clipped_or_shrunk() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let narrow = CellOptions::new().with_width(10.0).with_border(Border::NONE);
        canvas.column("abcdefghij", &narrow, true)?;
        canvas.column("abcdefghij", &narrow.with_fit(TextFit::Shrink), true)
    });
    let (surface, _) = render(&report);
    let texts: Vec<_> = surface
        .operations()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, font, .. } => Some((text.as_str(), font.size())),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec![("abcd", 12), ("abcdefghij", 5)]);
}

#[test]
fn measuring_a_band_draws_nothing_and_keeps_the_cursor() {
    let measured = Rc::new(Cell::new(0.0));
    let seen = Rc::clone(&measured);
    let report = report()
        .page_start(small_page())
        .master_footer(|canvas| {
            canvas.column("total", &fixed(0.0, 12.5), true)?;
            canvas.column("notes", &fixed(0.0, 7.5), true)
        })
        .page_body(move |canvas| {
            let y = canvas.y();
            seen.set(canvas.measure_band(BandKind::MasterFooter)?);
            assert_eq!(canvas.y(), y);
            Ok(())
        });

    let (surface, _) = render(&report);
    assert!((measured.get() - 20.0).abs() < EPSILON);
    assert!(surface.texts().is_empty());
}

#[test]
fn manual_page_break_repeats_page_bands() {
    let report = report()
        .page_start(small_page())
        .page_header(|canvas| {
            let title = format!("header {}", canvas.page_number());
            canvas.column(title, &fixed(0.0, 10.0), true)
        })
        .page_body(|canvas| {
            canvas.column("first", &fixed(0.0, 10.0), true)?;
            canvas.page_break()?;
            canvas.column("second", &fixed(0.0, 10.0), true)
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    assert_eq!(surface.texts_on_page(1), vec!["header 1", "first"]);
    assert_eq!(surface.texts_on_page(2), vec!["header 2", "second"]);
}

#[test]
fn body_overflow_starts_a_new_page_without_master_bands() {
    let report = report()
        .page_start(small_page())
        .master_footer(|canvas| canvas.column("never", &fixed(0.0, 10.0), true))
        .page_body(|canvas| {
            for index in 0..9 {
                canvas.column(format!("line {index}"), &fixed(0.0, 10.0), true)?;
            }
            Ok(())
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    // 80mm of body space holds eight 10mm cells.
    assert_eq!(surface.texts_on_page(1).len(), 8);
    assert_eq!(surface.texts_on_page(2), vec!["line 8"]);
}

#[test]
fn dataset_of_the_wrong_type_is_reported() {
    let report = report()
        .page_start(small_page())
        .master_data("rows", print_row)
        .with_variable("rows", vec!["not", "numbers"]);
    let mut surface = RecordingSurface::new();
    assert!(matches!(
        report.render_with(&mut surface),
        Err(ReportError::VariableType { name, .. }) if name == "rows"
    ));
}

#[test]
fn bands_before_the_first_page_start_are_rejected() {
    let report = report()
        .page_body(|canvas| canvas.column("orphan", &CellOptions::new(), true))
        .page_start(small_page());
    let mut surface = RecordingSurface::new();
    assert!(matches!(
        report.render_with(&mut surface),
        Err(ReportError::BandOutsidePage {
            index: 0,
            kind: BandKind::PageBody
        })
    ));
}

#[test]
fn headers_registered_after_the_body_still_print() {
    let report = report()
        .page_start(small_page())
        .page_body(|canvas| canvas.column("body", &fixed(0.0, 10.0), true))
        .page_header(|canvas| canvas.column("late header", &fixed(0.0, 10.0), true))
        .page_end();
    let (surface, _) = render(&report);
    assert_eq!(surface.texts_on_page(1), vec!["late header", "body"]);
}

#[test]
fn each_page_range_uses_its_own_setup() {
    let report = report()
        .page_start(small_page())
        .page_body(|canvas| canvas.column("small", &fixed(0.0, 10.0), true))
        .page_end()
        .page_start(small_page().with_format(PageFormat::Custom {
            width_mm: 200.0,
            height_mm: 120.0,
        }))
        .page_body(|canvas| {
            assert_eq!(canvas.page_width(), 200.0);
            assert_eq!(canvas.page_number(), 2);
            canvas.column("large", &fixed(0.0, 10.0), true)
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    let sizes: Vec<_> = surface
        .operations()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Page { width, height } => Some((*width, *height)),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![(100.0, 100.0), (200.0, 120.0)]);
}

#[test]
fn justify_leaves_paragraph_final_lines_flush_left() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let options = CellOptions::new()
            .with_width(20.0)
            .with_multiline(true)
            .with_align(Align::Justify)
            .with_border(Border::NONE);
        canvas.column("aaaa bbbb cccc dddd\nee ff", &options, true)
    });
    let (surface, _) = render(&report);
    assert_eq!(
        surface.texts_on_page(1),
        vec!["aaaa", "bbbb", "cccc dddd", "ee ff"]
    );

    // A line wrapped inside a paragraph is spread to the right edge.
    let (_, bbbb_x, _) = text_position(&surface, "bbbb");
    assert!((bbbb_x - (30.0 - 4.0 * CHAR_WIDTH)).abs() < EPSILON, "bbbb at {bbbb_x}");

    let (_, last_x, last_y) = text_position(&surface, "ee ff");
    assert!((last_x - 10.0).abs() < EPSILON);
    assert!((last_y - (10.0 + 2.0 * LINE_HEIGHT)).abs() < EPSILON);
}

#[test]
fn justify_keeps_single_line_paragraphs_together() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let options = CellOptions::new()
            .with_width(60.0)
            .with_multiline(true)
            .with_align(Align::Justify);
        canvas.column("ab cd\nef gh", &options, true)
    });
    let (surface, _) = render(&report);
    assert_eq!(surface.texts_on_page(1), vec!["ab cd", "ef gh"]);
    let (_, x, _) = text_position(&surface, "ab cd");
    assert!((x - 10.0).abs() < EPSILON);
}

#[test]
fn underlined_text_gets_a_stroke_below_the_glyphs() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let options = fixed(50.0, 10.0)
            .with_border(Border::NONE)
            .with_font(FontSettings::new().underline());
        canvas.column("under", &options, true)
    });
    let (surface, _) = render(&report);
    let (_, x, y) = text_position(&surface, "under");
    let underline_y = y + GLYPH_HEIGHT + 0.4;

    let lines = surface.lines();
    assert_eq!(lines.len(), 1);
    let (page, from, to) = lines[0];
    assert_eq!(page, 1);
    assert!((from.0 - x).abs() < EPSILON);
    assert!((to.0 - (x + 5.0 * CHAR_WIDTH)).abs() < EPSILON);
    assert!((from.1 - underline_y).abs() < EPSILON);
    assert!((to.1 - underline_y).abs() < EPSILON);
}

#[test]
fn multiline_height_never_drops_below_the_text() {
    let cursors = Rc::new(Cell::new((0.0, 0.0)));
    let seen = Rc::clone(&cursors);
    let report = report().page_start(small_page()).page_body(move |canvas| {
        let wrapped = CellOptions::new().with_width(20.0).with_multiline(true);
        canvas.column("aaaa bbbb cccc dddd", &wrapped.clone().with_height(5.0), true)?;
        let after_short = canvas.y();
        canvas.column("aaaa bbbb cccc dddd", &wrapped.with_height(30.0), true)?;
        seen.set((after_short, canvas.y()));
        Ok(())
    });
    render(&report);

    let (after_short, after_tall) = cursors.get();
    let natural = 2.0 * LINE_HEIGHT;
    assert!((after_short - (10.0 + natural)).abs() < EPSILON);
    assert!((after_tall - (10.0 + natural + 30.0)).abs() < EPSILON);
}

#[test]
fn vertical_alignment_places_text_at_the_top_or_bottom() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let tall = fixed(0.0, 20.0).with_border(Border::NONE);
        canvas.column("top", &tall.clone().with_valign(VAlign::Top), true)?;
        canvas.column("bottom", &tall.with_valign(VAlign::Bottom), true)
    });
    let (surface, _) = render(&report);
    let (_, _, top) = text_position(&surface, "top");
    let (_, _, bottom) = text_position(&surface, "bottom");
    assert!((top - 10.0).abs() < EPSILON);
    assert!((bottom - (50.0 - LINE_HEIGHT)).abs() < EPSILON);
}

#[test]
fn centering_happens_inside_the_padding() {
    let report = report().page_start(small_page()).page_body(|canvas| {
        let options = fixed(50.0, 30.0)
            .with_border(Border::NONE)
            .with_align(Align::Center)
            .with_valign(VAlign::Center)
            .with_padding(Padding::Sides {
                left: 10.0,
                top: 2.0,
                right: 0.0,
                bottom: 8.0,
            });
        canvas.column("ab", &options, true)
    });
    let (surface, _) = render(&report);
    let (_, x, y) = text_position(&surface, "ab");
    assert!((x - (20.0 + (40.0 - 2.0 * CHAR_WIDTH) / 2.0)).abs() < EPSILON, "x = {x}");
    assert!((y - (12.0 + (20.0 - LINE_HEIGHT) / 2.0)).abs() < EPSILON, "y = {y}");
}

#[test]
fn later_page_starts_are_read_in_the_first_unit() {
    let cursors = Rc::new(Cell::new((0.0, 0.0)));
    let seen = Rc::clone(&cursors);
    let report = report()
        .page_start(small_page())
        .page_body(|canvas| canvas.column("first", &fixed(0.0, 10.0), true))
        .page_end()
        .page_start(small_page().with_unit(Unit::Inch))
        .page_body(move |canvas| {
            assert_eq!(canvas.unit(), Unit::Millimetre);
            seen.set((canvas.x(), canvas.y()));
            canvas.column("second", &fixed(0.0, 10.0), true)
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);

    // Margins of 10 stay 10mm instead of becoming ten inches.
    assert_eq!(cursors.get(), (10.0, 10.0));
    let (page, x, _) = text_position(&surface, "second");
    assert_eq!(page, 2);
    assert!((x - 10.0).abs() < EPSILON);
}

#[test]
fn printing_a_band_keeps_overflow_checks_on() {
    let report = report()
        .page_start(small_page())
        .master_header(|canvas| canvas.column("banner", &fixed(0.0, 10.0), true))
        .page_body(|canvas| {
            canvas.print_band(BandKind::MasterHeader)?;
            for index in 0..8 {
                canvas.column(format!("line {index}"), &fixed(0.0, 10.0), true)?;
            }
            Ok(())
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    assert_eq!(surface.texts_on_page(1).len(), 8);
    assert_eq!(surface.texts_on_page(2), vec!["line 7"]);
}

#[test]
fn oversized_cell_is_drawn_once_on_a_fresh_page() {
    let report = report()
        .page_start(small_page())
        .page_body(|canvas| canvas.column("tall", &fixed(0.0, 200.0), true))
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    assert!(surface.texts_on_page(1).is_empty());
    assert_eq!(surface.texts_on_page(2), vec!["tall"]);
}

#[test]
fn page_break_inside_a_row_keeps_header_cells_out_of_the_row() {
    let report = report()
        .page_start(small_page())
        .page_header(|canvas| canvas.column("HEADER", &fixed(0.0, 10.0), true))
        .page_body(|canvas| {
            canvas.start_row();
            canvas.column("a", &fixed(20.0, 10.0), false)?;
            canvas.page_break()?;
            assert!(canvas.in_row());
            canvas.column("b", &fixed(20.0, 10.0), true)?;
            canvas.end_row()
        })
        .page_end();
    let (surface, pages) = render(&report);
    assert_eq!(pages, 2);
    assert_eq!(surface.texts_on_page(1), vec!["HEADER"]);
    assert_eq!(surface.texts_on_page(2), vec!["HEADER", "a", "b"]);

    let (_, header_x, header_y) = text_position(&surface, "HEADER");
    assert!((header_x - 10.0).abs() < EPSILON);
    assert!((header_y - (10.0 - LINE_HEIGHT) / 2.0).abs() < EPSILON);

    let (_, b_x, b_y) = text_position(&surface, "b");
    assert!((b_x - 30.0).abs() < EPSILON);
    assert!((b_y - (10.0 + (10.0 - LINE_HEIGHT) / 2.0)).abs() < EPSILON);
}

#[test]
fn measuring_a_band_that_breaks_pages_adds_no_page() {
    let measured = Rc::new(Cell::new(0.0));
    let seen = Rc::clone(&measured);
    let report = report()
        .page_start(small_page())
        .master_footer(|canvas| {
            canvas.column("total", &fixed(0.0, 10.0), true)?;
            canvas.page_break()?;
            canvas.column("notes", &fixed(0.0, 10.0), true)
        })
        .page_body(move |canvas| {
            seen.set(canvas.measure_band(BandKind::MasterFooter)?);
            Ok(())
        });
    let (surface, pages) = render(&report);
    assert_eq!(pages, 1);
    assert!(surface.texts().is_empty());
    assert!((measured.get() - 20.0).abs() < EPSILON);
}
