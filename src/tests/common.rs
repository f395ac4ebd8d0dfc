//! Shared helpers for building well-formed CSV fixtures.

/// Quotes `field` when it contains the delimiter, the quote character, CR,
/// or LF; doubles any embedded quote.
#[allow(dead_code)]
pub(crate) fn escape_csv_field(field: &str, delimiter: char) -> String {
    if field.is_empty()
        || field.contains(delimiter)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Builds a CSV document from a header row and data rows, joined with
/// `delimiter` and terminated with `line_ending` (e.g. `"\n"` or `"\r\n"`).
#[allow(dead_code)]
pub(crate) fn create_csv(
    header: &[String],
    rows: &[Vec<String>],
    delimiter: char,
    line_ending: &str,
) -> String {
    let mut csv = String::new();
    csv.push_str(
        &header
            .iter()
            .map(|h| escape_csv_field(h, delimiter))
            .collect::<Vec<_>>()
            .join(&delimiter.to_string()),
    );
    csv.push_str(line_ending);

    for row in rows {
        csv.push_str(
            &row.iter()
                .map(|f| escape_csv_field(f, delimiter))
                .collect::<Vec<_>>()
                .join(&delimiter.to_string()),
        );
        csv.push_str(line_ending);
    }

    csv
}

/// Runs `input` through a fresh [`crate::ScalarLexer`] and
/// [`crate::Assembler`] pair with default options, returning every record.
#[allow(dead_code)]
pub(crate) fn parse_default(input: &str) -> crate::Result<Vec<crate::Record>> {
    parse_with(input, crate::AssemblerOptions::default())
}

#[allow(dead_code)]
pub(crate) fn parse_with(
    input: &str,
    assembler_options: crate::AssemblerOptions,
) -> crate::Result<Vec<crate::Record>> {
    let lexer = crate::ScalarLexer::new(crate::LexerOptions::default())?;
    let mut pipeline = crate::Pipeline::new(lexer, assembler_options)?;
    let mut records = pipeline.feed(input)?;
    records.extend(pipeline.flush()?);
    Ok(records)
}
