//! Report rendering into a standalone PDF document.
//!
//! A4 portrait, builtin Helvetica only. printpdf positions from the
//! bottom-left corner and never paginates on its own, so the table loop
//! tracks the cursor and opens pages itself.

use chrono::Utc;
use ledger::{EntryKind, ReportDocument, ReportEntry};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::ServerError;

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const BAND_HEIGHT: f64 = 30.0;
const FOOTER_Y: f64 = 10.0;
const BOTTOM_MARGIN: f64 = 20.0;

const TABLE_X: f64 = 10.0;
const DATE_WIDTH: f64 = 35.0;
const DESCRIPTION_WIDTH: f64 = 85.0;
const KIND_WIDTH: f64 = 35.0;
const AMOUNT_WIDTH: f64 = 35.0;
const TABLE_WIDTH: f64 = DATE_WIDTH + DESCRIPTION_WIDTH + KIND_WIDTH + AMOUNT_WIDTH;
const TABLE_HEADER_HEIGHT: f64 = 7.0;
const ROW_HEIGHT: f64 = 6.0;

// Builtin fonts carry no metrics here; half an em per glyph is close
// enough for centering and right-alignment with Helvetica.
const GLYPH_WIDTH_EM: f64 = 0.5;
const PT_TO_MM: f64 = 0.352_778;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Attachment / download name derived from the echoed report window.
pub(crate) fn report_filename(month: Option<u32>, year: Option<i32>) -> String {
    match (month, year) {
        (Some(month), Some(year)) => format!("report_{month}_{year}.pdf"),
        (None, Some(year)) => format!("report_{year}.pdf"),
        _ => "report.pdf".to_string(),
    }
}

fn period_line(month: Option<u32>, year: Option<i32>) -> Option<String> {
    match (month, year) {
        (Some(month), Some(year)) => Some(format!("Period: {month:02}/{year}")),
        (None, Some(year)) => Some(format!("Period: {year}")),
        _ => None,
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > 45 {
        let prefix: String = description.chars().take(42).collect();
        format!("{prefix}...")
    } else {
        description.to_string()
    }
}

fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Income => "Income",
        EntryKind::Expense => "Expense",
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn income_green() -> Color {
    rgb(34, 139, 34)
}

fn expense_red() -> Color {
    rgb(220, 20, 60)
}

fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_EM * PT_TO_MM
}

fn centered_x(text: &str, font_size: f64) -> f64 {
    (PAGE_WIDTH - text_width(text, font_size)) / 2.0
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, ServerError> {
    doc.add_builtin_font(font)
        .map_err(|err| ServerError::Pdf(err.to_string()))
}

fn filled_rect(layer: &PdfLayerReference, x: f64, y: f64, width: f64, height: f64, color: Color) {
    layer.set_fill_color(color);
    let shape = Line {
        points: vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ],
        is_closed: true,
        has_fill: true,
        has_stroke: false,
        is_clipping_path: false,
    };
    layer.add_shape(shape);
}

fn stroke_line(layer: &PdfLayerReference, x1: f64, y1: f64, x2: f64, y2: f64) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    };
    layer.add_shape(line);
}

/// Header band plus footer, drawn on every page.
fn page_chrome(layer: &PdfLayerReference, fonts: &Fonts, user_name: &str, generated: &str) {
    filled_rect(
        layer,
        0.0,
        PAGE_HEIGHT - BAND_HEIGHT,
        PAGE_WIDTH,
        BAND_HEIGHT,
        rgb(50, 90, 160),
    );

    let title = format!("Financial Report - {user_name}");
    layer.set_fill_color(rgb(255, 255, 255));
    layer.use_text(
        title.as_str(),
        16.0,
        Mm(centered_x(&title, 16.0)),
        Mm(PAGE_HEIGHT - 18.0),
        &fonts.bold,
    );

    layer.set_outline_color(rgb(255, 255, 255));
    layer.set_outline_thickness(0.5);
    stroke_line(
        layer,
        30.0,
        PAGE_HEIGHT - 23.0,
        PAGE_WIDTH - 30.0,
        PAGE_HEIGHT - 23.0,
    );

    layer.set_fill_color(rgb(120, 120, 120));
    layer.use_text(
        generated,
        9.0,
        Mm(centered_x(generated, 9.0)),
        Mm(FOOTER_Y),
        &fonts.italic,
    );
}

fn new_page(
    doc: &PdfDocumentReference,
    fonts: &Fonts,
    user_name: &str,
    generated: &str,
) -> (PdfLayerReference, f64) {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);
    page_chrome(&layer, fonts, user_name, generated);
    (layer, PAGE_HEIGHT - BAND_HEIGHT - 10.0)
}

/// Draws the three-row totals box and returns the cursor below it.
fn summary_box(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    document: &ReportDocument,
    top: f64,
) -> f64 {
    const BOX_X: f64 = 45.0;
    const LABEL_WIDTH: f64 = 70.0;
    const VALUE_WIDTH: f64 = 50.0;
    const SUMMARY_ROW_HEIGHT: f64 = 8.0;
    let width = LABEL_WIDTH + VALUE_WIDTH;

    let header_bottom = top - SUMMARY_ROW_HEIGHT;
    filled_rect(
        layer,
        BOX_X,
        header_bottom,
        width,
        SUMMARY_ROW_HEIGHT,
        rgb(70, 130, 180),
    );
    layer.set_fill_color(rgb(255, 255, 255));
    let title = "Financial Summary";
    layer.use_text(
        title,
        12.0,
        Mm(centered_x(title, 12.0)),
        Mm(header_bottom + 2.5),
        &fonts.bold,
    );

    let balance_color = if document.balance.is_negative() {
        expense_red()
    } else {
        income_green()
    };
    let rows = [
        ("Total Income", document.total_income, income_green()),
        ("Total Expenses", document.total_expense, expense_red()),
        ("Balance", document.balance, balance_color),
    ];

    let mut row_bottom = header_bottom;
    for (index, (label, amount, color)) in rows.into_iter().enumerate() {
        row_bottom -= SUMMARY_ROW_HEIGHT;
        let fill = if index % 2 == 0 {
            rgb(240, 248, 255)
        } else {
            rgb(255, 255, 255)
        };
        filled_rect(layer, BOX_X, row_bottom, width, SUMMARY_ROW_HEIGHT, fill);

        layer.set_fill_color(rgb(50, 50, 50));
        layer.use_text(
            label,
            11.0,
            Mm(BOX_X + 3.0),
            Mm(row_bottom + 2.5),
            &fonts.regular,
        );

        let value = amount.to_string();
        layer.set_fill_color(color);
        layer.use_text(
            value.as_str(),
            11.0,
            Mm(BOX_X + width - 3.0 - text_width(&value, 11.0)),
            Mm(row_bottom + 2.5),
            &fonts.bold,
        );
    }

    row_bottom - 12.0
}

fn table_header(layer: &PdfLayerReference, fonts: &Fonts, top: f64) {
    filled_rect(
        layer,
        TABLE_X,
        top - TABLE_HEADER_HEIGHT,
        TABLE_WIDTH,
        TABLE_HEADER_HEIGHT,
        rgb(70, 130, 180),
    );

    layer.set_fill_color(rgb(255, 255, 255));
    let baseline = top - TABLE_HEADER_HEIGHT + 2.2;
    layer.use_text("Date", 10.0, Mm(TABLE_X + 2.0), Mm(baseline), &fonts.bold);
    layer.use_text(
        "Description",
        10.0,
        Mm(TABLE_X + DATE_WIDTH + 2.0),
        Mm(baseline),
        &fonts.bold,
    );
    layer.use_text(
        "Kind",
        10.0,
        Mm(TABLE_X + DATE_WIDTH + DESCRIPTION_WIDTH + 2.0),
        Mm(baseline),
        &fonts.bold,
    );
    layer.use_text(
        "Amount (R$)",
        10.0,
        Mm(TABLE_X + DATE_WIDTH + DESCRIPTION_WIDTH + KIND_WIDTH + 2.0),
        Mm(baseline),
        &fonts.bold,
    );
}

fn table_row(layer: &PdfLayerReference, fonts: &Fonts, entry: &ReportEntry, index: usize, top: f64) {
    let fill = if index % 2 == 0 {
        rgb(248, 248, 248)
    } else {
        rgb(255, 255, 255)
    };
    filled_rect(layer, TABLE_X, top - ROW_HEIGHT, TABLE_WIDTH, ROW_HEIGHT, fill);

    let baseline = top - ROW_HEIGHT + 1.8;
    layer.set_fill_color(rgb(50, 50, 50));
    let date = entry.date.format("%d/%m/%Y").to_string();
    layer.use_text(
        date.as_str(),
        9.0,
        Mm(TABLE_X + 2.0),
        Mm(baseline),
        &fonts.regular,
    );
    let description = truncate_description(&entry.description);
    layer.use_text(
        description.as_str(),
        9.0,
        Mm(TABLE_X + DATE_WIDTH + 2.0),
        Mm(baseline),
        &fonts.regular,
    );
    layer.use_text(
        kind_label(entry.kind),
        9.0,
        Mm(TABLE_X + DATE_WIDTH + DESCRIPTION_WIDTH + 2.0),
        Mm(baseline),
        &fonts.regular,
    );

    let amount = entry.amount.to_string();
    let color = match entry.kind {
        EntryKind::Income => income_green(),
        EntryKind::Expense => expense_red(),
    };
    layer.set_fill_color(color);
    layer.use_text(
        amount.as_str(),
        9.0,
        Mm(TABLE_X + TABLE_WIDTH - 2.0 - text_width(&amount, 9.0)),
        Mm(baseline),
        &fonts.regular,
    );
}

pub(crate) fn render_report(
    document: &ReportDocument,
    user_name: &str,
) -> Result<Vec<u8>, ServerError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Financial Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: add_font(&doc, BuiltinFont::Helvetica)?,
        bold: add_font(&doc, BuiltinFont::HelveticaBold)?,
        italic: add_font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    let generated = format!("Generated at {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    page_chrome(&layer, &fonts, user_name, &generated);

    let mut y = PAGE_HEIGHT - BAND_HEIGHT - 12.0;
    if let Some(period) = period_line(document.month, document.year) {
        layer.set_fill_color(rgb(50, 50, 50));
        layer.use_text(
            period.as_str(),
            11.0,
            Mm(centered_x(&period, 11.0)),
            Mm(y),
            &fonts.regular,
        );
    }
    y -= 12.0;

    y = summary_box(&layer, &fonts, document, y);

    layer.set_fill_color(rgb(50, 50, 50));
    layer.use_text(
        "Transaction Details",
        14.0,
        Mm(TABLE_X),
        Mm(y),
        &fonts.bold,
    );
    y -= 8.0;

    if document.transactions.is_empty() {
        let empty = "No transactions recorded in this period.";
        layer.set_fill_color(rgb(120, 120, 120));
        layer.use_text(
            empty,
            11.0,
            Mm(centered_x(empty, 11.0)),
            Mm(y - 4.0),
            &fonts.italic,
        );
    } else {
        table_header(&layer, &fonts, y);
        y -= TABLE_HEADER_HEIGHT;

        for (index, entry) in document.transactions.iter().enumerate() {
            if y < BOTTOM_MARGIN + ROW_HEIGHT {
                let (next_layer, next_y) = new_page(&doc, &fonts, user_name, &generated);
                layer = next_layer;
                y = next_y;
            }
            table_row(&layer, &fonts, entry, index, y);
            y -= ROW_HEIGHT;
        }
    }

    doc.save_to_bytes()
        .map_err(|err| ServerError::Pdf(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledger::{MoneyCents, ReportKind};

    fn sample_document(transactions: Vec<ReportEntry>) -> ReportDocument {
        let total_income = MoneyCents::new(150_000);
        let total_expense = MoneyCents::new(42_050);
        ReportDocument {
            kind: ReportKind::Monthly,
            month: Some(3),
            year: Some(2026),
            total_income,
            total_expense,
            balance: total_income - total_expense,
            transactions,
        }
    }

    #[test]
    fn filename_follows_the_window() {
        assert_eq!(report_filename(Some(3), Some(2026)), "report_3_2026.pdf");
        assert_eq!(report_filename(None, Some(2026)), "report_2026.pdf");
        assert_eq!(report_filename(None, None), "report.pdf");
        assert_eq!(report_filename(Some(3), None), "report.pdf");
    }

    #[test]
    fn period_line_is_omitted_without_a_year() {
        assert_eq!(period_line(Some(3), Some(2026)).as_deref(), Some("Period: 03/2026"));
        assert_eq!(period_line(None, Some(2026)).as_deref(), Some("Period: 2026"));
        assert_eq!(period_line(Some(3), None), None);
        assert_eq!(period_line(None, None), None);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "a".repeat(60);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 45);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_description("rent"), "rent");
    }

    #[test]
    fn renders_a_report_with_rows() {
        let entries = vec![
            ReportEntry {
                id: 1,
                description: "groceries".to_string(),
                amount: MoneyCents::new(12_345),
                kind: EntryKind::Expense,
                date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                category_id: Some(7),
            },
            ReportEntry {
                id: 2,
                description: "salary".to_string(),
                amount: MoneyCents::new(150_000),
                kind: EntryKind::Income,
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                category_id: None,
            },
        ];
        let bytes = render_report(&sample_document(entries), "Alice").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_an_empty_report() {
        let bytes = render_report(&sample_document(Vec::new()), "Alice").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn paginates_long_reports() {
        let entries = (0..120)
            .map(|index| ReportEntry {
                id: index,
                description: format!("entry {index}"),
                amount: MoneyCents::new(1_000),
                kind: EntryKind::Expense,
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                category_id: None,
            })
            .collect();
        let bytes = render_report(&sample_document(entries), "Alice").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
