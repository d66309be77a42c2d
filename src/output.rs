//! Feature table writer.
//!
//! One header record `id,classe,<columns>` followed by one record per
//! recording, every feature printed with six decimals. Ids and class labels
//! are quoted when they contain separators.

use std::io::{self, Write};

use csv::{Writer, WriterBuilder};

use crate::analysis::FeatureVector;

/// Label of the class column, kept for compatibility with existing tables.
pub const CLASS_COLUMN: &str = "classe";

/// Writes feature rows to any sink.
pub struct FeatureTableWriter<W: Write> {
    writer: Writer<W>,
    columns: usize,
    rows_written: usize,
}

impl<W: Write> FeatureTableWriter<W> {
    /// Write the header record and return the writer.
    ///
    /// # Arguments
    /// * `writer` - Destination sink
    /// * `column_names` - Feature column names in vector order
    pub fn new(writer: W, column_names: &[String]) -> io::Result<Self> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        let header = ["id", CLASS_COLUMN]
            .into_iter()
            .chain(column_names.iter().map(String::as_str));
        writer.write_record(header)?;

        Ok(Self {
            writer,
            columns: column_names.len(),
            rows_written: 0,
        })
    }

    /// Append one recording's row.
    ///
    /// Fails with `InvalidInput` if the vector width does not match the header.
    pub fn write_row(&mut self, id: &str, class_label: &str, vector: &FeatureVector) -> io::Result<()> {
        if vector.len() != self.columns {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "row {} has {} features, header has {}",
                    id,
                    vector.len(),
                    self.columns
                ),
            ));
        }

        let mut record = Vec::with_capacity(self.columns + 2);
        record.push(id.to_string());
        record.push(class_label.to_string());
        record.extend(vector.values().iter().map(|value| format!("{:.6}", value)));
        self.writer.write_record(&record)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flush and hand back the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;

    #[test]
    fn writes_header_and_rows_with_six_decimals() {
        let columns = vec!["a_mean".to_string(), "b_mean".to_string()];
        let mut table = FeatureTableWriter::new(Vec::new(), &columns).unwrap();
        let vector = FeatureVector::new(vec![1.0, -0.1234567]).unwrap();
        table.write_row("rec1", "healthy", &vector).unwrap();
        assert_eq!(table.rows_written(), 1);

        let text = String::from_utf8(table.into_inner().unwrap()).unwrap();
        assert_eq!(text, "id,classe,a_mean,b_mean\nrec1,healthy,1.000000,-0.123457\n");
    }

    #[test]
    fn quoted_id_keeps_row_as_wide_as_header() {
        let columns = vec!["a_mean".to_string(), "b_mean".to_string()];
        let mut table = FeatureTableWriter::new(Vec::new(), &columns).unwrap();
        let vector = FeatureVector::new(vec![0.5, 2.0]).unwrap();
        table.write_row("a,b", "say \"hi\"", &vector).unwrap();
        let bytes = table.into_inner().unwrap();

        let mut reader = ReaderBuilder::new().from_reader(bytes.as_slice());
        let header_len = reader.headers().unwrap().len();
        let rows: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), header_len);
        assert_eq!(&rows[0][0], "a,b");
        assert_eq!(&rows[0][1], "say \"hi\"");
        assert_eq!(&rows[0][2], "0.500000");
    }

    #[test]
    fn rejects_width_mismatch() {
        let columns = vec!["a".to_string()];
        let mut table = FeatureTableWriter::new(Vec::new(), &columns).unwrap();
        let vector = FeatureVector::new(vec![1.0, 2.0]).unwrap();
        let err = table.write_row("rec1", "x", &vector).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(table.rows_written(), 0);
    }
}
