//! Tabular Dataset

use crate::DatasetError;
use calamine::{Data, Reader, Xlsx};
use feature_aligner::{FieldValue, RawRecord};
use std::collections::{HashMap, HashSet};
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

/// Label column present in historical data, removed before scoring
pub const TARGET_COLUMN: &str = "Attrition";

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    /// First worksheet of an Excel workbook
    Xlsx,
}

impl UploadFormat {
    /// Pick a format from the uploaded file name
    pub fn from_filename(filename: &str) -> Result<Self, DatasetError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(UploadFormat::Csv),
            Some("xlsx") => Ok(UploadFormat::Xlsx),
            _ => Err(DatasetError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// Header row plus one raw record per data row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<RawRecord>,
}

impl Dataset {
    /// Parse CSV with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?.iter().map(String::from).collect());
        }
        Self::from_cells(headers, rows)
    }

    /// Parse the first worksheet of an `.xlsx` workbook; its first row is the header
    pub fn from_xlsx_reader<R: Read + Seek>(reader: R) -> Result<Self, DatasetError> {
        let mut workbook: Xlsx<R> = Xlsx::new(reader)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DatasetError::MissingHeader)??;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(cell_text).collect(),
            None => return Err(DatasetError::MissingHeader),
        };
        let rows = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Self::from_cells(headers, rows)
    }

    /// Parse CSV from memory
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DatasetError> {
        Self::from_csv_reader(bytes)
    }

    /// Read a `.csv` or `.xlsx` file from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let format = UploadFormat::from_filename(&path.to_string_lossy())?;
        let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let reader = BufReader::new(file);
        let dataset = match format {
            UploadFormat::Csv => Self::from_csv_reader(reader)?,
            UploadFormat::Xlsx => Self::from_xlsx_reader(reader)?,
        };
        info!("Loaded dataset {} ({} rows)", path.display(), dataset.len());
        Ok(dataset)
    }

    /// Parse an uploaded file, choosing the reader by file name
    pub fn from_upload(filename: &str, bytes: &[u8]) -> Result<Self, DatasetError> {
        match UploadFormat::from_filename(filename)? {
            UploadFormat::Csv => Self::from_csv_bytes(bytes),
            UploadFormat::Xlsx => Self::from_xlsx_reader(Cursor::new(bytes)),
        }
    }

    /// Type columns and build records.
    ///
    /// A column whose every non-empty cell parses as a number is numeric;
    /// any other column is categorical, including its numeric-looking cells.
    /// Empty cells are missing.
    fn from_cells(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        let headers = dedup_headers(headers);
        if headers.is_empty() {
            return Err(DatasetError::MissingHeader);
        }

        let numeric: Vec<bool> = (0..headers.len())
            .map(|j| {
                rows.iter()
                    .filter_map(|row| row.get(j))
                    .filter(|cell| !cell.is_empty())
                    .all(|cell| cell.parse::<f64>().is_ok())
            })
            .collect();

        let records = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .zip(&numeric)
                    .enumerate()
                    .map(|(j, (header, is_numeric))| {
                        let cell = row.get(j).map_or("", String::as_str);
                        (header.clone(), parse_cell(cell, *is_numeric))
                    })
                    .collect::<RawRecord>()
            })
            .collect::<Vec<_>>();

        debug!("Parsed {} rows x {} columns", records.len(), headers.len());
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[RawRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Remove a column from the header and every row; false if absent
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.headers.iter().position(|h| h == name) else {
            return false;
        };
        self.headers.remove(idx);
        for record in &mut self.records {
            record.remove(name);
        }
        true
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn parse_cell(cell: &str, numeric: bool) -> FieldValue {
    if cell.is_empty() {
        return FieldValue::Missing;
    }
    if numeric {
        if let Ok(value) = cell.parse::<f64>() {
            return FieldValue::Number(value);
        }
    }
    FieldValue::Category(cell.to_string())
}

/// Repeated headers get the first free `.1`, `.2`, ... suffix.
///
/// A suffixed name never reuses a header that appears anywhere in the row.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = headers.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut counts: HashMap<String, usize> = HashMap::new();

    headers
        .into_iter()
        .map(|header| {
            let name = if used.contains(&header) {
                let count = counts.entry(header.clone()).or_insert(0);
                loop {
                    *count += 1;
                    let candidate = format!("{}.{}", header, count);
                    if !used.contains(&candidate) && !original.contains(&candidate) {
                        break candidate;
                    }
                }
            } else {
                header
            };
            used.insert(name.clone());
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Age,Attrition,BusinessTravel,Gender,JobLevel,MonthlyIncome,OverTime
41,Yes,Travel_Rarely,Female,2,5993,Yes
49,No,Travel_Frequently,Male,senior,5130,No
37,Yes,Travel_Rarely,Male,1,,Yes
";

    #[test]
    fn test_column_types_inferred() {
        let dataset = Dataset::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records()[0];
        assert_eq!(first.get("Age"), Some(&FieldValue::Number(41.0)));
        assert_eq!(first.get("Gender"), Some(&FieldValue::from("Female")));
        // One non-numeric cell makes the whole column categorical
        assert_eq!(first.get("JobLevel"), Some(&FieldValue::from("2")));
        assert_eq!(
            dataset.records()[2].get("MonthlyIncome"),
            Some(&FieldValue::Missing)
        );
    }

    #[test]
    fn test_drop_target_column() {
        let mut dataset = Dataset::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        assert!(dataset.drop_column(TARGET_COLUMN));
        assert!(!dataset.drop_column(TARGET_COLUMN));
        assert!(!dataset.headers().iter().any(|h| h == TARGET_COLUMN));
        assert!(dataset.records().iter().all(|r| r.get(TARGET_COLUMN).is_none()));
    }

    #[test]
    fn test_head() {
        let dataset = Dataset::from_csv_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(10).len(), 3);
    }

    #[test]
    fn test_duplicate_headers_suffixed() {
        let dataset = Dataset::from_csv_bytes(b"Age,Age,Age\n1,2,3\n").unwrap();
        assert_eq!(dataset.headers(), &["Age", "Age.1", "Age.2"]);
        assert_eq!(dataset.records()[0].get("Age.2"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn test_suffix_never_collides_with_real_header() {
        let dataset = Dataset::from_csv_bytes(b"Age,Age.1,Age\n1,2,3\n").unwrap();
        assert_eq!(dataset.headers(), &["Age", "Age.1", "Age.2"]);
        assert_eq!(dataset.records()[0].len(), 3);
        assert_eq!(dataset.records()[0].get("Age.1"), Some(&FieldValue::Number(2.0)));

        let dataset = Dataset::from_csv_bytes(b"Age,Age,Age.1\n1,2,3\n").unwrap();
        assert_eq!(dataset.headers(), &["Age", "Age.2", "Age.1"]);
        assert_eq!(dataset.records()[0].get("Age.1"), Some(&FieldValue::Number(3.0)));
    }

    /// Write rows to an in-memory workbook; numeric-looking cells become numbers
    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(value) => sheet.write_number(r as u32, c as u16, value).unwrap(),
                    Err(_) => sheet.write_string(r as u32, c as u16, *cell).unwrap(),
                };
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_xlsx_upload_uses_same_type_inference() {
        let bytes = workbook(&[
            &["Age", "Attrition", "Gender", "JobLevel", "MonthlyIncome"],
            &["41", "Yes", "Female", "2", "5993"],
            &["49", "No", "Male", "senior", ""],
        ]);
        let dataset = Dataset::from_upload("future.xlsx", &bytes).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.headers()[1], "Attrition");
        let first = &dataset.records()[0];
        assert_eq!(first.get("Age"), Some(&FieldValue::Number(41.0)));
        assert_eq!(first.get("Gender"), Some(&FieldValue::from("Female")));
        assert_eq!(first.get("JobLevel"), Some(&FieldValue::from("2")));
        assert_eq!(
            dataset.records()[1].get("MonthlyIncome"),
            Some(&FieldValue::Missing)
        );
    }

    #[test]
    fn test_xlsx_from_path() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&workbook(&[&["Age", "OverTime"], &["30", "Yes"]]))
            .unwrap();

        let dataset = Dataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.headers(), &["Age", "OverTime"]);
        assert_eq!(dataset.records()[0].get("OverTime"), Some(&FieldValue::from("Yes")));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let err = Dataset::from_csv_bytes(b"Age,Gender\n30\n").unwrap_err();
        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn test_upload_format_by_extension() {
        assert!(Dataset::from_upload("future.CSV", SAMPLE.as_bytes()).is_ok());
        assert!(matches!(
            Dataset::from_upload("future.xls", b"PK"),
            Err(DatasetError::UnsupportedFormat(name)) if name == "future.xls"
        ));
        assert!(matches!(
            Dataset::from_upload("future.xlsx", b"not a zip archive"),
            Err(DatasetError::Excel(_))
        ));
        assert!(matches!(
            Dataset::from_upload("noextension", b""),
            Err(DatasetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = Dataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.headers().len(), 7);

        let err = Dataset::from_path("/nonexistent/employees.csv").unwrap_err();
        assert!(err.to_string().contains("employees.csv"));
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(
            Dataset::from_csv_bytes(b""),
            Err(DatasetError::MissingHeader)
        ));
    }
}
