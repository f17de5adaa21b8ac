//! Loader for chimeric-read tables.
//!
//! The table is tab separated, headerless, with 15 columns per read:
//! read id, two auxiliary fields, then for each of segment A and segment B
//! its reference name, two auxiliary fields, start, end and score.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use polars::prelude::*;
use rayon::prelude::*;

use crate::duplex_structs::{ChimericRecord, Sample, SampleId, Segment};
use crate::error::{Error, Result};

/// Column names in file order. Every column is read as text; coordinates
/// are parsed per row so a bad value can be reported with its row.
const COLUMNS: [&str; 15] = [
    "read_id", "aux_1", "aux_2", "a_name", "a_aux_1", "a_aux_2", "a_start", "a_end", "a_score",
    "b_name", "b_aux_1", "b_aux_2", "b_start", "b_end", "b_score",
];

fn schema() -> Schema {
    Schema::from_iter(
        COLUMNS
            .iter()
            .map(|name| Field::new((*name).into(), DataType::String)),
    )
}

/// Read one table into a `DataFrame` with the named schema above.
///
/// Quoting is off: read ids and auxiliary fields are taken verbatim.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(Error::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            path,
        ));
    }
    let parse_options = CsvParseOptions::default()
        .with_separator(b'\t')
        .with_quote_char(None)
        .with_comment_prefix(Some("#"));
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(schema())))
        .with_rechunk(true)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Turn a loaded table into records. Missing names, and coordinates that
/// are missing or not integers, are reported with their 1-based data row.
/// Missing auxiliary fields become empty text.
pub fn records_from_table(df: &DataFrame, path: &Path) -> Result<Vec<ChimericRecord>> {
    let cols = COLUMNS
        .iter()
        .map(|name| Ok(df.column(name)?.str()?))
        .collect::<Result<Vec<&StringChunked>>>()?;
    let malformed = |row: usize, detail: String| Error::Malformed {
        path: path.to_path_buf(),
        row: row + 1,
        detail,
    };

    let text = |c: usize, row: usize| cols[c].get(row).unwrap_or("").to_string();
    let required = |c: usize, row: usize| -> Result<String> {
        cols[c]
            .get(row)
            .map(str::to_string)
            .ok_or_else(|| malformed(row, format!("missing {}", COLUMNS[c])))
    };
    let coord = |c: usize, row: usize| -> Result<i64> {
        let raw = cols[c]
            .get(row)
            .ok_or_else(|| malformed(row, format!("missing {}", COLUMNS[c])))?;
        raw.trim().parse::<i64>().map_err(|_| {
            malformed(row, format!("{} '{}' is not an integer", COLUMNS[c], raw))
        })
    };

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(ChimericRecord {
            id: required(0, row)?,
            aux: [text(1, row), text(2, row)],
            seg_a: Segment {
                name: required(3, row)?,
                aux: [text(4, row), text(5, row)],
                start: coord(6, row)?,
                end: coord(7, row)?,
                score: text(8, row),
            },
            seg_b: Segment {
                name: required(9, row)?,
                aux: [text(10, row), text(11, row)],
                start: coord(12, row)?,
                end: coord(13, row)?,
                score: text(14, row),
            },
        });
    }
    Ok(records)
}

pub fn read_sample(id: SampleId, path: &Path) -> Result<Sample> {
    let start = Instant::now();
    let df = read_table(path)?;
    let records = records_from_table(&df, path)?;
    debug!("Time elapsed reading {}: {:?}", path.display(), start.elapsed());
    info!("sample {}: {} records from {}", id, records.len(), path.display());
    Ok(Sample::new(id, records))
}

/// Load every `(id, path)` pair. Output order follows input order.
pub fn read_samples(inputs: &[(SampleId, PathBuf)]) -> Result<Vec<Sample>> {
    inputs
        .par_iter()
        .map(|(id, path)| read_sample(id.clone(), path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_table(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_fifteen_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(
            &dir,
            "s1.tsv",
            "# header comment\n\
             read1\t12\t0.5\tRNA1\t+\tx\t10\t20\t33\tRNA1\t-\ty\t100\t110\t41\n\
             read2\t7\t0.1\tRNA2\t+\tx\t5\t9\t12\tRNA1\t+\ty\t300\t320\t15\n",
        );
        let sample = read_sample(SampleId::from("s1"), &path).unwrap();
        assert_eq!(sample.records.len(), 2);
        let r = &sample.records[0];
        assert_eq!(r.id, "read1");
        assert_eq!(r.aux, ["12".to_string(), "0.5".to_string()]);
        assert_eq!(r.seg_a.name, "RNA1");
        assert_eq!((r.seg_a.start, r.seg_a.end), (10, 20));
        assert_eq!(r.seg_b.aux[0], "-");
        assert_eq!((r.seg_b.start, r.seg_b.end), (100, 110));
        assert_eq!(r.seg_b.score, "41");
        assert_eq!(sample.records[1].seg_a.name, "RNA2");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_sample(SampleId::from("x"), Path::new("/nonexistent/table.tsv"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_non_integer_coordinate_names_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(
            &dir,
            "bad.tsv",
            "read1\t1\t1\tRNA1\t+\tx\t10\t20\t3\tRNA1\t-\ty\t100\t110\t4\n\
             read2\t1\t1\tRNA1\t+\tx\tNA\t20\t3\tRNA1\t-\ty\t100\t110\t4\n",
        );
        let err = read_sample(SampleId::from("bad"), &path).unwrap_err();
        match err {
            Error::Malformed { path: p, row, detail } => {
                assert_eq!(p, path);
                assert_eq!(row, 2);
                assert!(detail.contains("a_start"), "{detail}");
                assert!(detail.contains("NA"), "{detail}");
            }
            other => panic!("expected a malformed row, got {other}"),
        }
    }

    #[test]
    fn test_short_row_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(
            &dir,
            "short.tsv",
            "read1\t1\t1\tRNA1\t+\tx\t10\t20\t3\tRNA1\t-\ty\t100\t110\t4\n\
             read2\t1\t1\tRNA1\t+\tx\t10\t20\n",
        );
        let err = read_sample(SampleId::from("short"), &path).unwrap_err();
        assert!(matches!(err, Error::Malformed { row: 2, .. }), "{err}");
    }

    #[test]
    fn test_quote_in_read_id_is_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(
            &dir,
            "quoted.tsv",
            "\"read1\t1\t1\tRNA1\t+\tx\t10\t20\t3\tRNA1\t-\ty\t100\t110\t4\n",
        );
        let sample = read_sample(SampleId::from("quoted"), &path).unwrap();
        assert_eq!(sample.records.len(), 1);
        assert_eq!(sample.records[0].id, "\"read1");
    }
}
