use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use csv::Writer;
use tokio::sync::Mutex;
use tracing::info;

use crate::record::{ProductRecord, HEADERS};

const OUTPUT_ROOT: &str = "private_repo/clean_data";

/// Map an output file name to its category folder by keyword. Unmatched
/// names are a configuration error, caught before any browser work starts.
///
/// "women_*" must be checked before "men_*": the former contains the latter
/// as a substring.
pub fn resolve_category(filename: &str) -> Result<&'static str> {
    let folder = if filename.contains("jewelry") {
        "jewelry"
    } else if filename.contains("women_shoes") || filename.contains("woman_shoes") {
        "women_shoes"
    } else if filename.contains("men_shoes") || filename.contains("man_shoes") {
        "men_shoes"
    } else if filename.contains("women_clothing") {
        "women_clothing"
    } else if filename.contains("men_clothing") {
        "men_clothing"
    } else if filename.contains("belts") {
        "belts"
    } else if filename.contains("bags") {
        "bags"
    } else {
        bail!("file name {:?} matches no known category", filename);
    };
    Ok(folder)
}

/// The one shared mutable resource of a run: a CSV file all jobs append to.
/// The header is written once at creation and every append is serialized
/// through the internal lock, so rows from concurrent jobs never interleave.
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<Writer<File>>,
}

impl CsvSink {
    /// Create the sink under `private_repo/clean_data/<category>/`. A file
    /// left over from a previous run is deleted first: every run starts from
    /// an empty file.
    pub fn create(filename: &str) -> Result<Self> {
        Self::create_in(Path::new(OUTPUT_ROOT), filename)
    }

    fn create_in(root: &Path, filename: &str) -> Result<Self> {
        let category = resolve_category(filename)?;
        let dir = root.join(category);
        fs::create_dir_all(&dir)
            .with_context(|| format!("could not create output folder {}", dir.display()))?;

        let path = dir.join(filename);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("could not remove stale output {}", path.display()))?;
        }

        let file = File::create(&path)
            .with_context(|| format!("could not create output file {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADERS)?;
        writer.flush()?;

        info!("writing to {}", path.display());
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row. The lock covers serialization and flush, so a row is
    /// fully on disk before the next writer gets in.
    pub async fn append(&self, record: &ProductRecord) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{build_tags, join_sizes};

    fn sample() -> ProductRecord {
        ProductRecord {
            sku: "BX9".into(),
            title: "Suede belt".into(),
            product_type: "Belts".into(),
            vendor: "TOD'S".into(),
            price: String::new(),
            discounted_price: String::new(),
            collection: "SS25".into(),
            color: "Brown".into(),
            tags: build_tags("Belts", "Brown", "SS25"),
            size: join_sizes(&[]),
            images: String::new(),
            description: None,
            size_and_fit: None,
            made_in: None,
            composition: None,
            tissue: None,
        }
    }

    #[test]
    fn category_table() {
        assert_eq!(resolve_category("jewelry_run.csv").unwrap(), "jewelry");
        assert_eq!(resolve_category("women_shoes_a.csv").unwrap(), "women_shoes");
        assert_eq!(resolve_category("woman_shoes_a.csv").unwrap(), "women_shoes");
        assert_eq!(resolve_category("men_shoes_a.csv").unwrap(), "men_shoes");
        assert_eq!(resolve_category("man_shoes_a.csv").unwrap(), "men_shoes");
        assert_eq!(resolve_category("women_clothing.csv").unwrap(), "women_clothing");
        assert_eq!(resolve_category("men_clothing.csv").unwrap(), "men_clothing");
        assert_eq!(resolve_category("belts_test.csv").unwrap(), "belts");
        assert_eq!(resolve_category("summer_bags.csv").unwrap(), "bags");
    }

    #[test]
    fn unmatched_filename_is_an_error() {
        assert!(resolve_category("scarves.csv").is_err());
    }

    #[test]
    fn sink_path_is_category_folder_plus_filename() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::create_in(dir.path(), "belts_test.csv").unwrap();
        assert_eq!(sink.path(), dir.path().join("belts").join("belts_test.csv"));
    }

    #[test]
    fn fresh_start_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("belts").join("belts_test.csv");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old,rows,from,a,previous,run\n").unwrap();

        let sink = CsvSink::create_in(dir.path(), "belts_test.csv").unwrap();
        let content = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("SKU,"));
    }

    #[tokio::test]
    async fn appended_rows_have_full_field_set() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::create_in(dir.path(), "belts_test.csv").unwrap();
        sink.append(&sample()).await.unwrap();
        sink.append(&sample()).await.unwrap();

        let content = fs::read_to_string(sink.path()).unwrap();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(content.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3); // header + two appends, no dedup
        assert!(rows.iter().all(|r| r.len() == HEADERS.len()));
        assert_eq!(&rows[1][9], crate::record::OUT_OF_STOCK);
    }
}
