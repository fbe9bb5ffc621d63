use crate::models::{CLEAN_COLUMNS, CleanRow, RawRecord};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Save the raw API payload as a pretty (2-space indented) JSON array.
pub fn save_raw_json<P: AsRef<Path>>(records: &[RawRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    f.write_all(b"\n")?;
    Ok(())
}

/// Load a payload written by [`save_raw_json`] (or saved straight from the API).
pub fn load_raw_json<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let body: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {}", path.display()))?;
    crate::api::records_from_value(body)
}

/// Save cleaned rows as CSV with header, columns in `CLEAN_COLUMNS` order, no index.
pub fn save_clean_csv<P: AsRef<Path>>(rows: &[CleanRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    // Written explicitly so an empty table still gets its header.
    wtr.write_record(CLEAN_COLUMNS)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read rows written by [`save_clean_csv`].
pub fn load_clean_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CleanRow>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize().enumerate() {
        let row: CleanRow = rec.with_context(|| format!("{} row {}", path.display(), i + 1))?;
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DensityBin;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let rows = vec![CleanRow {
            name: Some("Malta".into()),
            region: Some("Europe".into()),
            subregion: Some("Southern Europe".into()),
            population: 525285.0,
            area: 316.0,
            pop_density: 525285.0 / 316.0,
            density_bin: DensityBin::VeryHigh,
        }];
        save_clean_csv(&rows, &csvp).unwrap();
        let raw: Vec<RawRecord> = vec![serde_json::Map::new()];
        save_raw_json(&raw, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("empty.csv");
        save_clean_csv(&[], &p).unwrap();
        let txt = std::fs::read_to_string(&p).unwrap();
        assert_eq!(
            txt.trim_end(),
            "name,region,subregion,population,area,pop_density,density_bin"
        );
    }
}
