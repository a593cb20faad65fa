use std::io::Read;

#[derive(Debug)]
pub(crate) struct CsvTable {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<CsvRow>,
}

#[derive(Debug)]
pub(crate) struct CsvRow {
    /// 1-based line in the source file.
    pub(crate) line: u64,
    pub(crate) outcome: Result<Vec<String>, String>,
}

impl CsvRow {
    pub(crate) fn is_blank(&self) -> bool {
        matches!(&self.outcome, Ok(values) if values.iter().all(|value| value.is_empty()))
    }
}

/// Reads the header line and every data row. Undecodable rows are kept as
/// row-level failures so one bad line does not sink the whole file.
pub(crate) fn read_table<R: Read>(reader: R) -> Result<CsvTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(|header| header.replace(['\u{feff}', '\u{200b}'], "").trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut fallback_line = 1;

    loop {
        fallback_line += 1;
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                rows.push(CsvRow {
                    line,
                    outcome: Ok(record.iter().map(str::to_string).collect()),
                });
            }
            Err(err) if is_row_error(&err) => {
                let line = err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                rows.push(CsvRow {
                    line,
                    outcome: Err(format!("unreadable row ({err})")),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(CsvTable { headers, rows })
}

fn is_row_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Utf8 { .. })
}
