//! On-disk layout of the published benchmark datasets.
//!
//! Each dataset lives in its own directory under a data root and ships one
//! test set per negative:positive ratio:
//!
//!   <root>/Helwak_2013/miRNA_test_set_10.tsv
//!   <root>/Helwak_2013/miRNA_test_set_10_predictions.tsv
//!
//! Fetching the files is left to external tooling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::DatasetError;

/// Negative:positive ratios every dataset is published at.
pub const RATIOS: [u32; 3] = [1, 10, 100];

/// The known benchmark datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenchmarkDataset {
    /// Helwak et al. 2013, AGO1-CLASH.
    Helwak2013,
    /// Hejret et al. 2023, AGO2-CLASH.
    Hejret2023,
    /// Klimentova et al. 2022, AGO2-eCLIP.
    Klimentova2022,
}

pub const ALL_DATASETS: [BenchmarkDataset; 3] = [
    BenchmarkDataset::Helwak2013,
    BenchmarkDataset::Hejret2023,
    BenchmarkDataset::Klimentova2022,
];

impl BenchmarkDataset {
    /// Directory name under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            BenchmarkDataset::Helwak2013 => "Helwak_2013",
            BenchmarkDataset::Hejret2023 => "Hejret_2023",
            BenchmarkDataset::Klimentova2022 => "Klimentova_2022",
        }
    }

    /// Name accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            BenchmarkDataset::Helwak2013 => "helwak",
            BenchmarkDataset::Hejret2023 => "hejret",
            BenchmarkDataset::Klimentova2022 => "klimentova",
        }
    }

    /// Experimental protocol the interactions come from.
    pub fn protocol(self) -> &'static str {
        match self {
            BenchmarkDataset::Helwak2013 => "AGO1-CLASH",
            BenchmarkDataset::Hejret2023 => "AGO2-CLASH",
            BenchmarkDataset::Klimentova2022 => "AGO2-eCLIP",
        }
    }

    pub fn ratios(self) -> &'static [u32] {
        &RATIOS
    }

    /// Column renames needed to bring the raw file onto the shared schema.
    /// Helwak ships its miRNA column as `miRNA`.
    pub fn column_aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            BenchmarkDataset::Helwak2013 => &[("miRNA", "noncodingRNA")],
            BenchmarkDataset::Hejret2023 | BenchmarkDataset::Klimentova2022 => &[],
        }
    }

    pub fn dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }

    /// Path of the test set at `ratio`.
    pub fn test_set_path(self, root: &Path, ratio: u32) -> Result<PathBuf, DatasetError> {
        self.check_ratio(ratio)?;
        Ok(self.dir(root).join(format!("miRNA_test_set_{}.tsv", ratio)))
    }

    /// Path tools write their scored copy of the test set at `ratio` to.
    pub fn predictions_path(self, root: &Path, ratio: u32) -> Result<PathBuf, DatasetError> {
        self.check_ratio(ratio)?;
        Ok(self
            .dir(root)
            .join(format!("miRNA_test_set_{}_predictions.tsv", ratio)))
    }

    fn check_ratio(self, ratio: u32) -> Result<(), DatasetError> {
        if self.ratios().contains(&ratio) {
            Ok(())
        } else {
            Err(DatasetError::UnknownRatio {
                dataset: self.dir_name(),
                ratio,
            })
        }
    }
}

impl FromStr for BenchmarkDataset {
    type Err = DatasetError;

    /// Accepts the short CLI names and the directory names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ALL_DATASETS
            .iter()
            .copied()
            .find(|d| lower == d.dir_name().to_ascii_lowercase() || lower == d.short_name())
            .ok_or_else(|| DatasetError::UnknownDataset(s.to_string()))
    }
}

impl fmt::Display for BenchmarkDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.dir_name(), self.protocol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_directory_names() {
        assert_eq!("helwak".parse::<BenchmarkDataset>().unwrap(), BenchmarkDataset::Helwak2013);
        assert_eq!("Hejret_2023".parse::<BenchmarkDataset>().unwrap(), BenchmarkDataset::Hejret2023);
        assert_eq!("KLIMENTOVA".parse::<BenchmarkDataset>().unwrap(), BenchmarkDataset::Klimentova2022);
        assert!("clash".parse::<BenchmarkDataset>().is_err());
    }

    #[test]
    fn builds_test_set_and_prediction_paths() {
        let root = Path::new("/data");
        assert_eq!(
            BenchmarkDataset::Helwak2013.test_set_path(root, 10).unwrap(),
            PathBuf::from("/data/Helwak_2013/miRNA_test_set_10.tsv")
        );
        assert_eq!(
            BenchmarkDataset::Klimentova2022.predictions_path(root, 100).unwrap(),
            PathBuf::from("/data/Klimentova_2022/miRNA_test_set_100_predictions.tsv")
        );
    }

    #[test]
    fn rejects_unpublished_ratio() {
        let err = BenchmarkDataset::Hejret2023
            .test_set_path(Path::new("/data"), 5)
            .unwrap_err();
        assert!(matches!(err, DatasetError::UnknownRatio { ratio: 5, .. }));
    }

    #[test]
    fn only_helwak_needs_column_alias() {
        assert_eq!(
            BenchmarkDataset::Helwak2013.column_aliases(),
            &[("miRNA", "noncodingRNA")]
        );
        assert!(BenchmarkDataset::Hejret2023.column_aliases().is_empty());
        assert!(BenchmarkDataset::Klimentova2022.column_aliases().is_empty());
    }
}
