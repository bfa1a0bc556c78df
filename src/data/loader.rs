// ============================================================
// Layer 4 — CSV Pair Loader
// ============================================================
// Reads the (input, output) table with the csv crate.
//
// Both columns are deserialised as String, never as numbers:
//   output = "000731"  must stay "000731", not 731
//
// The file must have a header row naming `input` and `output`;
// any other columns are ignored. A missing file or a malformed
// row is fatal and the error names the offending path.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::pair::RawPair;
use crate::domain::traits::PairSource;

pub struct CsvPairLoader {
    path: PathBuf,
}

impl CsvPairLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PairSource for CsvPairLoader {
    fn load_pairs(&self) -> Result<Vec<RawPair>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let mut pairs = Vec::new();
        for (row, record) in reader.deserialize::<RawPair>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let pair = record.with_context(|| {
                format!("Malformed row at line {} of '{}'", row + 2, self.path.display())
            })?;
            pairs.push(pair);
        }

        tracing::info!("Loaded {} rows from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_leading_zeros_survive() {
        let file  = write_csv("input,output\n17,000731\n0042,5\n");
        let pairs = CsvPairLoader::new(file.path()).load_pairs().unwrap();
        assert_eq!(pairs, vec![RawPair::new("17", "000731"), RawPair::new("0042", "5")]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let file  = write_csv("id,output,input\n1,09,3\n");
        let pairs = CsvPairLoader::new(file.path()).load_pairs().unwrap();
        assert_eq!(pairs, vec![RawPair::new("3", "09")]);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let file = write_csv("input,result\n1,2\n");
        let err  = CsvPairLoader::new(file.path()).load_pairs().unwrap_err();
        assert!(err.to_string().contains("Malformed row at line 2"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = CsvPairLoader::new("no/such/data.csv").load_pairs().unwrap_err();
        assert!(err.to_string().contains("no/such/data.csv"));
    }
}
