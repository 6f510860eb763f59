use pgextras_client::{ResultSet, Row};

/// Output mode for report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    Expanded,
    TuplesOnly,
    Csv,
    Json,
}

impl OutputMode {
    /// Scriptable formats never go through the pager.
    pub fn is_scriptable(&self) -> bool {
        matches!(self, OutputMode::Csv | OutputMode::Json | OutputMode::TuplesOnly)
    }
}

/// Render a result set in the given mode. Table and expanded output end
/// with a row-count footer; table and CSV output keep their header when no
/// row came back.
pub fn format_rows(set: &ResultSet, mode: OutputMode) -> String {
    let cols = set.columns();
    let rows = set.rows();
    match mode {
        OutputMode::Json => format_json(set),
        OutputMode::Csv => format_csv(cols, rows),
        OutputMode::TuplesOnly => format_tuples_only(cols, rows),
        OutputMode::Expanded => {
            let mut s = format_expanded(cols, rows);
            s.push_str(&row_count_footer(rows.len()));
            s
        }
        OutputMode::Table => {
            let mut s = format_table(cols, rows);
            s.push_str(&row_count_footer(rows.len()));
            s
        }
    }
}

fn row_count_footer(count: usize) -> String {
    format!("({} row{})\n", count, if count == 1 { "" } else { "s" })
}

fn get_val(row: &Row, idx: usize) -> &str {
    row.get(idx).unwrap_or("NULL")
}

fn format_table(cols: &[String], rows: &[Row]) -> String {
    if cols.is_empty() {
        return String::new();
    }
    let mut out = String::new();

    let mut widths: Vec<usize> = cols.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(get_val(row, i).chars().count());
        }
    }

    let header: Vec<String> = cols
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    out.push_str(&format!(" {} \n", header.join(" | ")));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w + 2)).collect();
    out.push_str(&format!("{}\n", sep.join("+")));

    for row in rows {
        let cells: Vec<String> = (0..cols.len())
            .map(|i| format!("{:<width$}", get_val(row, i), width = widths[i]))
            .collect();
        out.push_str(&format!(" {} \n", cells.join(" | ")));
    }
    out
}

fn format_tuples_only(cols: &[String], rows: &[Row]) -> String {
    let ncols = cols.len();
    let mut out = String::new();
    for row in rows {
        let vals: Vec<&str> = (0..ncols).map(|i| get_val(row, i)).collect();
        out.push_str(&vals.join("|"));
        out.push('\n');
    }
    out
}

fn format_expanded(cols: &[String], rows: &[Row]) -> String {
    let col_width = cols
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (ridx, row) in rows.iter().enumerate() {
        out.push_str(&format!("-[ RECORD {} ]\n", ridx + 1));
        for (col, val) in row.iter() {
            out.push_str(&format!(
                "{:<width$} | {}\n",
                col,
                val.unwrap_or("NULL"),
                width = col_width
            ));
        }
    }
    out
}

fn quote_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_csv(cols: &[String], rows: &[Row]) -> String {
    if cols.is_empty() {
        return String::new();
    }
    let mut out = String::new();

    let header: Vec<String> = cols.iter().map(|c| quote_csv(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        // NULL is an empty field, as in COPY ... CSV.
        let vals: Vec<String> = (0..cols.len())
            .map(|i| row.get(i).map(quote_csv).unwrap_or_default())
            .collect();
        out.push_str(&vals.join(","));
        out.push('\n');
    }
    out
}

fn format_json(set: &ResultSet) -> String {
    let mut out = serde_json::to_string_pretty(set).unwrap_or_else(|_| "[]".to_string());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> ResultSet {
        ResultSet::from_rows(vec![
            Row::from_pairs([("name", Some("index hit rate")), ("ratio", Some("0.99"))]),
            Row::from_pairs([("name", Some("table hit rate")), ("ratio", None)]),
        ])
    }

    fn empty(cols: &[&str]) -> ResultSet {
        let cols: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        ResultSet::new(cols.into(), Vec::new())
    }

    #[test]
    fn test_table_output() {
        let out = format_rows(&rows(), OutputMode::Table);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " name           | ratio ");
        assert_eq!(lines[1], "----------------+-------");
        assert_eq!(lines[2], " index hit rate | 0.99  ");
        assert_eq!(lines[3], " table hit rate | NULL  ");
        assert_eq!(lines[4], "(2 rows)");
    }

    #[test]
    fn test_empty_report_keeps_header() {
        let set = empty(&["name", "count"]);
        assert_eq!(
            format_rows(&set, OutputMode::Table),
            " name | count \n------+-------\n(0 rows)\n"
        );
        assert_eq!(format_rows(&set, OutputMode::Csv), "name,count\n");
        assert_eq!(format_rows(&set, OutputMode::Json), "[]\n");
    }

    #[test]
    fn test_undescribed_empty_result_prints_only_footer() {
        let set = ResultSet::from_rows(Vec::new());
        assert_eq!(format_rows(&set, OutputMode::Table), "(0 rows)\n");
        assert_eq!(format_rows(&set, OutputMode::Csv), "");
    }

    #[test]
    fn test_tuples_only_output() {
        let out = format_rows(&rows(), OutputMode::TuplesOnly);
        assert_eq!(out, "index hit rate|0.99\ntable hit rate|NULL\n");
    }

    #[test]
    fn test_expanded_output() {
        let first = ResultSet::from_rows(vec![rows()[0].clone()]);
        let out = format_rows(&first, OutputMode::Expanded);
        assert_eq!(
            out,
            "-[ RECORD 1 ]\nname  | index hit rate\nratio | 0.99\n(1 row)\n"
        );
    }

    #[test]
    fn test_csv_quotes_and_nulls() {
        let rows = ResultSet::from_rows(vec![Row::from_pairs([
            ("query", Some("SELECT a, b FROM t")),
            ("calls", None),
        ])]);
        let out = format_rows(&rows, OutputMode::Csv);
        assert_eq!(out, "query,calls\n\"SELECT a, b FROM t\",\n");
    }

    #[test]
    fn test_json_output() {
        let out = format_rows(&rows(), OutputMode::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "index hit rate");
        assert!(parsed[1]["ratio"].is_null());
    }

    #[test]
    fn test_scriptable_modes() {
        assert!(OutputMode::Json.is_scriptable());
        assert!(!OutputMode::Table.is_scriptable());
    }
}
