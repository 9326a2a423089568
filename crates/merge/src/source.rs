use crate::error::MergeError;
use crate::model::{Record, Source};

/// Parse CSV text with a header row into a [`Source`].
///
/// A leading UTF-8 byte-order mark is ignored. Rows whose field count
/// differs from the header are rejected.
pub fn load_source(name: &str, csv_data: &str) -> Result<Source, MergeError> {
    let data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MergeError::source_read(name, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| MergeError::source_read(name, e.to_string()))?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.as_str(), v))
            .collect();
        records.push(record);
    }

    log::info!("{name}: loaded {} rows, {} columns", records.len(), headers.len());

    Ok(Source {
        name: name.to_string(),
        headers,
        records,
    })
}

/// Serialize records as CSV using `headers` as the column order.
/// Columns a record lacks are written empty.
pub fn write_records(sink: &str, headers: &[String], records: &[Record]) -> Result<String, MergeError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(headers)
        .map_err(|e| MergeError::sink_write(sink, e.to_string()))?;
    for record in records {
        writer
            .write_record(headers.iter().map(|h| record.value(h)))
            .map_err(|e| MergeError::sink_write(sink, e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| MergeError::sink_write(sink, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| MergeError::sink_write(sink, e.to_string()))
}
