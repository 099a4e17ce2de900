//! Minimal CSV writer: comma separated, `\n` between rows.

use std::borrow::Cow;

/// Quote `field` when it holds a delimiter, a quote or a line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Header row first, then every row; no trailing newline.
pub fn render<R, F>(header: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let mut lines = vec![join_row(header.iter())];
    lines.extend(rows.into_iter().map(|r| join_row(r.into_iter())));
    lines.join("\n")
}

fn join_row<I>(fields: I) -> String
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    fields
        .map(|f| escape_field(f.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
