/// Spreadsheet input: delimited text files read with the csv crate.
///
/// Separator defaults to tab for `.tsv` files and comma otherwise.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bestworst_core::{parse_trial_row, BwsError, ColumnLayout, Item, Trial, TrialColumns};
use log::warn;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Separator must be a single byte, got \"{0}\"")]
    BadSeparator(String),

    #[error("{}: column \"{column}\" not found", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: row {row}: \"{value}\" in column \"{column}\" is not a number", path.display())]
    BadNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{}: {source}", path.display())]
    Trial { path: PathBuf, source: BwsError },
}

/// A header row plus data rows, all as trimmed strings.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Every value of one column. Short rows yield empty strings.
    pub fn column(&self, path: &Path, name: &str) -> Result<Vec<String>, SheetError> {
        let idx = self.column_index(name).ok_or_else(|| SheetError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect())
    }

    pub fn trial_layout(&self, path: &Path, columns: &TrialColumns) -> Result<ColumnLayout, SheetError> {
        columns.locate(&self.header).map_err(|source| SheetError::Trial {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve the column separator: an explicit `--sep` (with `\t` accepted as
/// an escape), else tab for `.tsv`, else comma.
pub fn separator_for(path: &Path, explicit: Option<&str>) -> Result<u8, SheetError> {
    match explicit {
        Some("\\t") | Some("\t") => Ok(b'\t'),
        Some(sep) if sep.len() == 1 => Ok(sep.as_bytes()[0]),
        Some(sep) => Err(SheetError::BadSeparator(sep.to_string())),
        None if path.extension().is_some_and(|ext| ext == "tsv") => Ok(b'\t'),
        None => Ok(b','),
    }
}

/// Read a delimited file with a header row. Rows may vary in length.
pub fn read_sheet(path: &Path, delimiter: u8) -> Result<Sheet, SheetError> {
    let csv_err = |source| SheetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let header = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Sheet { header, rows })
}

/// Load item labels for trial generation.
///
/// A `.txt` file with no column given is split on whitespace. Anything else
/// is read as a sheet and the labels come from `column`. Empty labels are
/// dropped.
pub fn read_items(path: &Path, column: Option<&str>, delimiter: u8) -> Result<Vec<Item>, SheetError> {
    let is_txt = path.extension().is_some_and(|ext| ext == "txt");
    let items = match column {
        None if is_txt => {
            let content = std::fs::read_to_string(path).map_err(|source| SheetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            content.split_whitespace().map(str::to_string).collect()
        }
        None => {
            return Err(SheetError::MissingColumn {
                path: path.to_path_buf(),
                column: "--column".to_string(),
            })
        }
        Some(name) => read_sheet(path, delimiter)?.column(path, name)?,
    };

    Ok(items.into_iter().filter(|item: &Item| !item.is_empty()).collect())
}

/// Every trial in a judged sheet. Fails on the first malformed row.
pub fn read_trials(path: &Path, delimiter: u8, columns: &TrialColumns) -> Result<Vec<Trial>, SheetError> {
    let sheet = read_sheet(path, delimiter)?;
    let layout = sheet.trial_layout(path, columns)?;
    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            parse_trial_row(&layout, row, i + 1).map_err(|source| SheetError::Trial {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Trials tagged with the participant who judged them.
///
/// The participant is read from `id_column` when given, otherwise every row
/// belongs to a participant named after the file. Malformed rows, such as one
/// naming the same item best and worst, are skipped with a warning.
pub fn read_responses(
    path: &Path,
    delimiter: u8,
    columns: &TrialColumns,
    id_column: Option<&str>,
) -> Result<Vec<(String, Trial)>, SheetError> {
    let sheet = read_sheet(path, delimiter)?;
    let layout = sheet.trial_layout(path, columns)?;
    let ids = match id_column {
        Some(name) => sheet.column(path, name)?,
        None => vec![path.display().to_string(); sheet.rows.len()],
    };

    let mut responses = Vec::with_capacity(sheet.rows.len());
    for (i, (row, id)) in sheet.rows.iter().zip(ids).enumerate() {
        match parse_trial_row(&layout, row, i + 1) {
            Ok(trial) => responses.push((id, trial)),
            Err(e) => warn!("{}: skipping trial: {e}", path.display()),
        }
    }
    Ok(responses)
}

/// Items and their latent values, in file order.
pub fn read_latent_values(
    path: &Path,
    delimiter: u8,
    item_column: &str,
    value_column: &str,
) -> Result<(Vec<Item>, HashMap<Item, f64>), SheetError> {
    let sheet = read_sheet(path, delimiter)?;
    let items = sheet.column(path, item_column)?;
    let raw_values = sheet.column(path, value_column)?;

    let mut order = Vec::with_capacity(items.len());
    let mut values = HashMap::with_capacity(items.len());
    for (i, (item, raw)) in items.into_iter().zip(raw_values).enumerate() {
        let value: f64 = raw.parse().map_err(|_| SheetError::BadNumber {
            path: path.to_path_buf(),
            row: i + 1,
            column: value_column.to_string(),
            value: raw.clone(),
        })?;
        if values.insert(item.clone(), value).is_none() {
            order.push(item);
        }
    }

    Ok((order, values))
}

/// One method's scores from a previously written scores file. Item labels
/// are read from the first column.
pub fn read_scores(path: &Path, delimiter: u8, method: &str) -> Result<HashMap<Item, f64>, SheetError> {
    let sheet = read_sheet(path, delimiter)?;
    let col = sheet.column_index(method).ok_or_else(|| SheetError::MissingColumn {
        path: path.to_path_buf(),
        column: method.to_string(),
    })?;

    let mut scores = HashMap::with_capacity(sheet.rows.len());
    for (i, row) in sheet.rows.iter().enumerate() {
        let (Some(item), Some(raw)) = (row.first(), row.get(col)) else {
            continue;
        };
        let score: f64 = raw.parse().map_err(|_| SheetError::BadNumber {
            path: path.to_path_buf(),
            row: i + 1,
            column: method.to_string(),
            value: raw.clone(),
        })?;
        scores.insert(item.clone(), score);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_separator_defaults_and_escape() {
        assert_eq!(separator_for(Path::new("x.tsv"), None).unwrap(), b'\t');
        assert_eq!(separator_for(Path::new("x.csv"), None).unwrap(), b',');
        assert_eq!(separator_for(Path::new("x.txt"), None).unwrap(), b',');
        assert_eq!(separator_for(Path::new("x.csv"), Some("\\t")).unwrap(), b'\t');
        assert_eq!(separator_for(Path::new("x.tsv"), Some(";")).unwrap(), b';');
        assert!(matches!(
            separator_for(Path::new("x.csv"), Some(";;")),
            Err(SheetError::BadSeparator(_))
        ));
    }

    #[test]
    fn test_read_sheet_flexible_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "trials.csv", "best,worst,option1,option2,option3\na, c ,a,b,c\nd,e,d,e\n");
        let sheet = read_sheet(&path, b',').unwrap();
        assert_eq!(sheet.header, vec!["best", "worst", "option1", "option2", "option3"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], "c");
        assert_eq!(sheet.rows[1].len(), 4);
    }

    #[test]
    fn test_read_items_from_txt_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let txt = write_file(&dir, "words.txt", "apple banana\n\ncherry\tdate\n");
        assert_eq!(read_items(&txt, None, b',').unwrap(), vec!["apple", "banana", "cherry", "date"]);

        let tsv = write_file(&dir, "words.tsv", "Word\tFreq\nfig\t3\n\t1\ngrape\t9\n");
        let items = read_items(&tsv, Some("Word"), b'\t').unwrap();
        assert_eq!(items, vec!["fig", "grape"]);
    }

    #[test]
    fn test_read_items_needs_column_for_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_file(&dir, "words.csv", "Word\nfig\n");
        assert!(matches!(read_items(&csv, None, b','), Err(SheetError::MissingColumn { .. })));
        assert!(matches!(
            read_items(&csv, Some("Nope"), b','),
            Err(SheetError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_read_latent_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "latent.csv", "Item,LatentValue\nb,0.5\na,1.5\n");
        let (order, values) = read_latent_values(&path, b',', "Item", "LatentValue").unwrap();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(values["a"], 1.5);

        let bad = write_file(&dir, "bad.csv", "Item,LatentValue\nb,high\n");
        assert!(matches!(
            read_latent_values(&bad, b',', "Item", "LatentValue"),
            Err(SheetError::BadNumber { row: 1, .. })
        ));
    }

    #[test]
    fn test_read_scores_uses_first_column_for_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scores.csv", "Word,Elo,Value\nx,12.5,0.7\ny,-3,0.2\n");
        let scores = read_scores(&path, b',', "Value").unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["x"], 0.7);
        assert!(matches!(read_scores(&path, b',', "RW"), Err(SheetError::MissingColumn { .. })));
    }

    #[test]
    fn test_read_trials_reports_file_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "good.csv", "best,worst,option1,option2,option3\na,c,a,b,c\n");
        let trials = read_trials(&good, b',', &TrialColumns::default()).unwrap();
        assert_eq!(trials.len(), 1);
        assert_eq!(trials[0].others, vec!["b"]);

        let bad = write_file(&dir, "bad.csv", "best,worst\na,c\nb,b\n");
        let err = read_trials(&bad, b',', &TrialColumns::default()).unwrap_err();
        assert!(matches!(
            err,
            SheetError::Trial { source: BwsError::MalformedTrial { row: 2, .. }, .. }
        ));
    }

    #[test]
    fn test_read_responses_ids_and_skipping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "responses.csv",
            "user,best,worst,option1,option2\nu1,a,b,a,b\nu2,c,c,c,d\nu2,d,c,c,d\nu3,e,f,e,e\n",
        );
        let columns = TrialColumns::default();

        let by_column = read_responses(&path, b',', &columns, Some("user")).unwrap();
        let ids: Vec<&str> = by_column.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert_eq!(by_column[1].1.best, "d");

        let by_file = read_responses(&path, b',', &columns, None).unwrap();
        assert_eq!(by_file.len(), 2);
        assert!(by_file.iter().all(|(id, _)| id.ends_with("responses.csv")));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_sheet(Path::new("/definitely/not/here.csv"), b',').unwrap_err();
        assert!(matches!(err, SheetError::Csv { .. }));
    }
}
