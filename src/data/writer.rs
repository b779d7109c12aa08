use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::model::{AppointmentRecord, COLUMNS};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Write records as CSV with the standard header and column order.
///
/// The header is written even when there are no records. Billing amounts
/// always carry two decimals, so the output loads back into the same records.
pub fn write_csv<'a, W, I>(out: W, records: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(COLUMNS)?;
    for rec in records {
        writer.serialize(rec)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render records as a CSV string, e.g. for a download buffer.
pub fn to_csv_string<'a, I>(records: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let mut buf = Vec::new();
    write_csv(&mut buf, records)?;
    Ok(String::from_utf8(buf)?)
}

/// Write records to a CSV file, replacing any existing file.
pub fn write_file<'a, I>(path: &Path, records: I) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let file = std::fs::File::create(path)?;
    let mut count = 0usize;
    write_csv(file, records.into_iter().inspect(|_| count += 1))?;
    log::info!("Wrote {count} appointments to {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter_records, FilterCriteria};
    use crate::data::loader::{load_file, load_reader};
    use crate::data::model::tests::record;
    use crate::data::model::AppointmentDataset;
    use crate::data::model::AppointmentStatus::{Completed, NoShow};
    use crate::data::model::Doctor::{Ayesha, Bilal, Zara};
    use crate::data::model::ProcedureType::{Extraction, Filling, Whitening};

    fn dataset() -> AppointmentDataset {
        AppointmentDataset::from_records(vec![
            record(1001, "2025-05-01", Ayesha, Filling, Completed, 100.5),
            record(1002, "2025-05-02", Bilal, Whitening, NoShow, 333.33),
            record(1003, "2025-05-02", Zara, Extraction, Completed, 150.0),
            record(1004, "2025-05-04", Bilal, Filling, Completed, 249.99),
        ])
    }

    #[test]
    fn header_and_row_layout() {
        let ds = dataset();
        let text = to_csv_string(&ds.records[..1]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Appointment ID,Date,Patient Name,Patient Age,Gender,Doctor Name,\
Procedure Type,Appointment Status,Duration (minutes),Billing Amount ($),Payment Status"
            )
        );
        assert_eq!(
            lines.next(),
            Some("1001,2025-05-01,Sana Tariq,34,Female,Dr. Ayesha,Filling,Completed,45,100.50,Paid")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn non_ascii_names_survive_string_export() {
        let mut rec = record(1001, "2025-05-01", Ayesha, Filling, Completed, 100.5);
        rec.patient_name = "Zoë Çelik".to_string();
        let text = to_csv_string([&rec]).unwrap();
        assert!(text.contains(",Zoë Çelik,"));

        let reloaded = load_reader(text.as_bytes()).unwrap();
        assert_eq!(reloaded.records[0].patient_name, "Zoë Çelik");
    }

    #[test]
    fn empty_export_still_has_header() {
        let text = to_csv_string(std::iter::empty()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Appointment ID,Date,"));
    }

    #[test]
    fn filtered_subset_round_trips() {
        let ds = dataset();
        let mut criteria = FilterCriteria::from_dataset(&ds);
        criteria.set_selected(crate::data::model::Dimension::Doctor, "Dr. Zara", false);
        let filtered = filter_records(&ds.records, &criteria);

        let text = to_csv_string(filtered.iter().copied()).unwrap();
        let reloaded = load_reader(text.as_bytes()).unwrap();

        assert_eq!(reloaded.dropped_rows, 0);
        assert_eq!(reloaded.len(), filtered.len());
        for (a, b) in reloaded.records.iter().zip(&filtered) {
            assert_eq!(a, *b);
        }
    }

    #[test]
    fn write_file_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_dental_data.csv");
        let ds = dataset();

        let written = write_file(&path, &ds.records).unwrap();
        assert_eq!(written, 4);

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.records, ds.records);
    }
}
