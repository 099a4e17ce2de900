//! Single-table PDF documents.
//!
//! Produces a PDF 1.4 file on A4 pages using the built-in Helvetica fonts:
//! a title on the first page, then a striped table whose header row is
//! repeated on every page the rows spill onto.

use std::fmt::Write as _;
use std::ops::Range;

const PAGE_W: f32 = 595.28;
const PAGE_H: f32 = 841.89;
// 14 mm
const MARGIN: f32 = 39.69;
// title baseline, 16 mm from the top
const TITLE_Y: f32 = 45.35;
// 20 mm
const TABLE_TOP: f32 = 56.69;
const ROW_H: f32 = 20.0;
const PAD: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;

const HEADER_FILL: (f32, f32, f32) = (0.16, 0.50, 0.73);
const STRIPE_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

/// Render `rows` as a titled table. Each row should have `header.len()` cells.
pub fn render_table(title: &str, header: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
    let pages: Vec<String> = paginate(rows.len())
        .into_iter()
        .enumerate()
        .map(|(i, range)| page_content(i == 0, title, header, &rows[range]))
        .collect();
    assemble(&pages)
}

fn rows_per_page(first: bool) -> usize {
    let top = if first { TABLE_TOP } else { MARGIN };
    let fit = ((PAGE_H - top - MARGIN) / ROW_H).floor() as usize;
    // one slot goes to the header row
    fit.saturating_sub(1).max(1)
}

fn paginate(total: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut first = true;
    loop {
        let end = (start + rows_per_page(first)).min(total);
        pages.push(start..end);
        if end >= total {
            break;
        }
        start = end;
        first = false;
    }
    pages
}

fn page_content(first: bool, title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
    let mut s = String::new();
    let mut top = MARGIN;
    if first {
        let _ = writeln!(
            s,
            "BT /F1 {TITLE_SIZE:.0} Tf 0 0 0 rg {MARGIN:.2} {:.2} Td ({}) Tj ET",
            PAGE_H - TITLE_Y,
            pdf_text(title, usize::MAX)
        );
        top = TABLE_TOP;
    }
    let cols = header.len().max(1);
    let col_w = (PAGE_W - 2.0 * MARGIN) / cols as f32;
    let max_chars = ((col_w - 2.0 * PAD) / (FONT_SIZE * 0.5)).floor() as usize;

    let header_cells: Vec<&str> = header.to_vec();
    draw_row(&mut s, top, col_w, max_chars, &header_cells, "/F2", Some(HEADER_FILL), (1.0, 1.0, 1.0));
    top += ROW_H;
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        let fill = (i % 2 == 1).then_some(STRIPE_FILL);
        draw_row(&mut s, top, col_w, max_chars, &cells, "/F1", fill, (0.2, 0.2, 0.2));
        top += ROW_H;
    }
    s
}

#[allow(clippy::too_many_arguments)]
fn draw_row(
    s: &mut String,
    top: f32,
    col_w: f32,
    max_chars: usize,
    cells: &[&str],
    font: &str,
    fill: Option<(f32, f32, f32)>,
    text_rgb: (f32, f32, f32),
) {
    let y = PAGE_H - top - ROW_H;
    if let Some((r, g, b)) = fill {
        let _ = writeln!(
            s,
            "{r:.2} {g:.2} {b:.2} rg {MARGIN:.2} {y:.2} {:.2} {ROW_H:.2} re f",
            PAGE_W - 2.0 * MARGIN
        );
    }
    let baseline = y + (ROW_H - FONT_SIZE) / 2.0 + 1.5;
    let (r, g, b) = text_rgb;
    for (i, cell) in cells.iter().enumerate() {
        let x = MARGIN + i as f32 * col_w + PAD;
        let _ = writeln!(
            s,
            "BT {font} {FONT_SIZE:.0} Tf {r:.2} {g:.2} {b:.2} rg {x:.2} {baseline:.2} Td ({}) Tj ET",
            pdf_text(cell, max_chars)
        );
    }
}

/// Escape for a PDF literal string; non-ASCII becomes `?`, long text is cut.
fn pdf_text(text: &str, max_chars: usize) -> String {
    let mut chars: Vec<char> = text
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();
    if chars.len() > max_chars {
        chars.truncate(max_chars.saturating_sub(3));
        chars.extend("...".chars());
    }
    let mut out = String::with_capacity(chars.len());
    for c in chars {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn assemble(pages: &[String]) -> Vec<u8> {
    // 1 catalog, 2 page tree, 3/4 fonts, then (page, contents) pairs
    let page_obj = |k: usize| 5 + 2 * k;
    let kids = (0..pages.len())
        .map(|k| format!("{} 0 R", page_obj(k)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_string(),
    ];
    for (k, content) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_W:.2} {PAGE_H:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            page_obj(k) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = out.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        let _ = writeln!(tail, "{off:010} 00000 n ");
    }
    let _ = write!(
        tail,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(tail.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn document_has_header_title_and_trailer() {
        let rows = vec![vec!["alice".to_string(), "user".to_string(), "N/A".to_string()]];
        let pdf = render_table("User List", &["Username", "Role", "Modified"], &rows);
        assert!(pdf.starts_with(b"%PDF-1.4"));
        let text = as_text(&pdf);
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("(User List) Tj"));
        assert!(text.contains("(Username) Tj"));
        assert!(text.contains("(alice) Tj"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_table("T", &["A"], &[]);
        let text = as_text(&pdf);
        let xref = text.find("xref\n").unwrap();
        let first_entry = text[xref..].lines().nth(3).unwrap();
        let off: usize = first_entry[..10].parse().unwrap();
        assert!(pdf[off..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn long_tables_spill_onto_more_pages() {
        let rows: Vec<Vec<String>> = (0..100).map(|i| vec![format!("user{i}")]).collect();
        let pdf = as_text(&render_table("Many", &["Username"], &rows));
        assert!(pdf.contains("/Count 3"));
        assert!(pdf.contains("(user99) Tj"));
        assert_eq!(pdf.matches("(Username) Tj").count(), 3);
        assert_eq!(pdf.matches("(Many) Tj").count(), 1);
    }

    #[test]
    fn text_is_escaped_and_clamped() {
        assert_eq!(pdf_text("a(b)c\\", usize::MAX), "a\\(b\\)c\\\\");
        assert_eq!(pdf_text("José", usize::MAX), "Jos?");
        assert_eq!(pdf_text("abcdefghij", 6), "abc...");
    }

    #[test]
    fn empty_table_still_has_one_page() {
        assert_eq!(paginate(0), vec![0..0]);
        let first = rows_per_page(true);
        assert_eq!(paginate(first + 1), vec![0..first, first..first + 1]);
    }
}
