//! Reads rows from a CSV file with a header line.

use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{VectorError, VectorResult};
use crate::models::{Row, RowOrder};

/// Header plus the rows selected from a CSV file.
///
/// Lines that fail to parse are kept as errors in their file position so
/// the caller can count them.
#[derive(Debug)]
pub struct RowSet {
    pub header: Vec<String>,
    pub rows: Vec<VectorResult<Row>>,
}

/// CSV file used as an ingestion source
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, used as the default dataset name.
    pub fn dataset_name(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    }

    /// Reads the header and up to `max_rows` rows.
    ///
    /// `RowOrder::Random` draws a uniform sample of `max_rows` rows and
    /// returns it in file order.
    pub fn read(&self, order: RowOrder, max_rows: Option<usize>) -> VectorResult<RowSet> {
        self.read_with_rng(order, max_rows, &mut rand::rng())
    }

    pub fn read_with_rng<R: Rng + ?Sized>(
        &self,
        order: RowOrder,
        max_rows: Option<usize>,
        rng: &mut R,
    ) -> VectorResult<RowSet> {
        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| VectorError::Input(format!("{}: {}", self.path.display(), e)))?;

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() {
            return Err(VectorError::Input(format!(
                "{}: missing header row",
                self.path.display()
            )));
        }

        let records = reader.into_records().map(|record| match record {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                let values = header
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect();
                Ok(Row::new(line, values))
            }
            Err(e) => Err(VectorError::Input(e.to_string())),
        });

        let rows = match (order, max_rows) {
            (RowOrder::Random, Some(k)) => sample_in_order(records, k, rng),
            (_, Some(k)) => records.take(k).collect(),
            (_, None) => records.collect(),
        };

        debug!(
            path = %self.path.display(),
            columns = header.len(),
            rows = rows.len(),
            ?order,
            "Read CSV rows"
        );

        Ok(RowSet { header, rows })
    }
}

/// Reservoir sample of `k` items, returned in their original order.
fn sample_in_order<T, I, R>(items: I, k: usize, rng: &mut R) -> Vec<T>
where
    I: Iterator<Item = T>,
    R: Rng + ?Sized,
{
    if k == 0 {
        return Vec::new();
    }

    let mut reservoir: Vec<(usize, T)> = Vec::with_capacity(k);
    for (i, item) in items.enumerate() {
        if reservoir.len() < k {
            reservoir.push((i, item));
        } else {
            let j = rng.random_range(0..=i);
            if j < k {
                reservoir[j] = (i, item);
            }
        }
    }

    reservoir.sort_by_key(|(i, _)| *i);
    reservoir.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_header_and_rows_in_order() {
        let file = csv_file("question_id,question\n1,first\n2,\"second, quoted\"\n");
        let set = CsvRowSource::new(file.path())
            .read(RowOrder::Sequential, None)
            .unwrap();

        assert_eq!(set.header, vec!["question_id", "question"]);
        assert_eq!(set.rows.len(), 2);

        let second = set.rows[1].as_ref().unwrap();
        assert_eq!(second.get("question"), Some("second, quoted"));
        assert_eq!(second.line(), 3);
    }

    #[test]
    fn test_max_rows_caps_sequential_read() {
        let file = csv_file("id,t\n1,a\n2,b\n3,c\n");
        let set = CsvRowSource::new(file.path())
            .read(RowOrder::Sequential, Some(2))
            .unwrap();

        let ids: Vec<_> = set
            .rows
            .iter()
            .map(|r| r.as_ref().unwrap().get("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_malformed_line_is_kept_as_error() {
        let file = csv_file("id,t\n1,a\n2\n3,c\n");
        let set = CsvRowSource::new(file.path())
            .read(RowOrder::Sequential, None)
            .unwrap();

        assert_eq!(set.rows.len(), 3);
        assert!(set.rows[0].is_ok());
        assert!(matches!(set.rows[1], Err(VectorError::Input(_))));
        assert!(set.rows[2].is_ok());
    }

    #[test]
    fn test_random_sample_respects_cap_and_file_order() {
        let mut contents = String::from("id,t\n");
        for i in 0..50 {
            contents.push_str(&format!("{},row{}\n", i, i));
        }
        let file = csv_file(&contents);
        let mut rng = StdRng::seed_from_u64(7);

        let set = CsvRowSource::new(file.path())
            .read_with_rng(RowOrder::Random, Some(10), &mut rng)
            .unwrap();

        let ids: Vec<i64> = set
            .rows
            .iter()
            .map(|r| r.as_ref().unwrap().get("id").unwrap().parse().unwrap())
            .collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_random_sample_larger_than_file_returns_everything() {
        let file = csv_file("id,t\n1,a\n2,b\n");
        let set = CsvRowSource::new(file.path())
            .read(RowOrder::Random, Some(100))
            .unwrap();
        assert_eq!(set.rows.len(), 2);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let result = CsvRowSource::new("/nonexistent/data.csv").read(RowOrder::Sequential, None);
        assert!(matches!(result, Err(VectorError::Input(_))));
    }

    #[test]
    fn test_dataset_name_is_file_stem() {
        let source = CsvRowSource::new("/data/Questions Master.csv");
        assert_eq!(source.dataset_name().as_deref(), Some("Questions Master"));
    }
}
