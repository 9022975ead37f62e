/// Minimal CSV reader for scenario tables.
///
/// Handles quoted cells that span lines. Malformed input is never rejected:
/// an unterminated quote simply runs to the end of the text.

/// Split raw text into rows of cells.
///
/// Rules:
/// - `,` ends a cell and `\n` ends a row (outside quotes)
/// - `\r` is dropped outside quotes, so `\r\n` files read like `\n` files
/// - `"` opens a quoted run; inside it `""` is a literal `"` and a lone `"`
///   closes the run
/// - the final cell and row are always flushed, even when empty
pub fn parse_table(input: &str) -> Vec<Vec<String>> {
    let mut table = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                table.push(std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    row.push(cell);
    table.push(row);
    table
}

/// Pad or truncate a row to exactly `width` cells.
pub fn normalize_width(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cells() {
        let t = parse_table("a,b,c\nd,e,f");
        assert_eq!(t, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn quoted_cell_with_newline_and_doubled_quote() {
        let t = parse_table("\"He said \"\"hi\"\"\nand left\"");
        assert_eq!(t, vec![vec!["He said \"hi\"\nand left".to_string()]]);
    }

    #[test]
    fn comma_inside_quotes_is_literal() {
        let t = parse_table("Aoi,\"well, maybe\"");
        assert_eq!(t[0], vec!["Aoi", "well, maybe"]);
    }

    #[test]
    fn crlf_reads_like_lf() {
        assert_eq!(parse_table("a,b\r\nc,d\r\n"), parse_table("a,b\nc,d\n"));
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let t = parse_table("a\nb");
        assert_eq!(t.len(), 2);
        assert_eq!(t[1], vec!["b"]);
    }

    #[test]
    fn trailing_newline_flushes_an_empty_row() {
        let t = parse_table("a\n");
        assert_eq!(t, vec![vec!["a".to_string()], vec![String::new()]]);
    }

    #[test]
    fn empty_input_is_one_empty_row() {
        assert_eq!(parse_table(""), vec![vec![String::new()]]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let t = parse_table("x,\"open\nstill open,here");
        assert_eq!(t, vec![vec!["x".to_string(), "open\nstill open,here".to_string()]]);
    }

    #[test]
    fn normalize_pads_and_truncates() {
        let short = normalize_width(vec!["a".into()], 3);
        assert_eq!(short, vec!["a", "", ""]);
        let long = normalize_width(vec!["a".into(), "b".into(), "c".into()], 2);
        assert_eq!(long, vec!["a", "b"]);
    }
}
