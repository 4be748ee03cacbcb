//! Turn rows of named fields into `Trial`s.
//!
//! The core never touches files. Callers read a spreadsheet however they like
//! and hand over the header plus the data rows as strings.
use crate::error::{BwsError, Result};
use crate::types::{Item, Trial};

/// Names of the columns that hold a trial.
///
/// Option columns are `{option_prefix}1`, `{option_prefix}2`, ... up to the
/// first index missing from the header. They list every item shown, best and
/// worst included.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialColumns {
    pub best: String,
    pub worst: String,
    pub option_prefix: String,
}

impl Default for TrialColumns {
    fn default() -> Self {
        TrialColumns {
            best: "best".to_string(),
            worst: "worst".to_string(),
            option_prefix: "option".to_string(),
        }
    }
}

/// Column positions resolved against one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    best: usize,
    worst: usize,
    options: Vec<usize>,
}

impl TrialColumns {
    /// Find the trial columns in `header`. Extra columns are ignored.
    pub fn locate<S: AsRef<str>>(&self, header: &[S]) -> Result<ColumnLayout> {
        let position = |name: &str| header.iter().position(|h| h.as_ref().trim() == name);

        let best = position(&self.best).ok_or_else(|| BwsError::MissingColumn(self.best.clone()))?;
        let worst =
            position(&self.worst).ok_or_else(|| BwsError::MissingColumn(self.worst.clone()))?;

        let mut options = Vec::new();
        while let Some(idx) = position(&format!("{}{}", self.option_prefix, options.len() + 1)) {
            options.push(idx);
        }

        Ok(ColumnLayout { best, worst, options })
    }
}

impl ColumnLayout {
    pub fn num_options(&self) -> usize {
        self.options.len()
    }

    fn width(&self) -> usize {
        self.options
            .iter()
            .copied()
            .chain([self.best, self.worst])
            .max()
            .map_or(0, |idx| idx + 1)
    }
}

/// Parse one data row. `row_number` is 1-based and only used in errors.
///
/// Empty option cells are skipped, so designs with varying trial sizes can
/// share a sheet. The best and worst picks are removed from the options once
/// each; whatever remains is the unchosen middle.
pub fn parse_trial_row<S: AsRef<str>>(
    layout: &ColumnLayout,
    row: &[S],
    row_number: usize,
) -> Result<Trial> {
    if row.len() < layout.width() {
        return Err(BwsError::MalformedTrial {
            row: row_number,
            reason: format!("expected at least {} fields, found {}", layout.width(), row.len()),
        });
    }

    let field = move |idx: usize| row[idx].as_ref().trim();
    let best = field(layout.best);
    let worst = field(layout.worst);
    if best.is_empty() || worst.is_empty() {
        return Err(BwsError::MalformedTrial {
            row: row_number,
            reason: "best and worst must both be filled in".to_string(),
        });
    }

    let mut others: Vec<Item> = layout
        .options
        .iter()
        .map(|&idx| field(idx))
        .filter(|opt| !opt.is_empty())
        .map(str::to_string)
        .collect();
    remove_first(&mut others, best);
    remove_first(&mut others, worst);

    Trial::new(best, worst, others).map_err(|err| match err {
        BwsError::InvalidTrial(reason) => BwsError::MalformedTrial { row: row_number, reason },
        other => other,
    })
}

/// Parse every data row. Fails on the first bad row.
pub fn parse_trials<H, R>(header: &[H], rows: &[R], columns: &TrialColumns) -> Result<Vec<Trial>>
where
    H: AsRef<str>,
    R: AsRef<[String]>,
{
    let layout = columns.locate(header)?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_trial_row(&layout, row.as_ref(), i + 1))
        .collect()
}

fn remove_first(items: &mut Vec<Item>, target: &str) {
    if let Some(pos) = items.iter().position(|item| item == target) {
        items.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_standard_layout() {
        let header = strings(&["best", "worst", "option1", "option2", "option3", "option4"]);
        let rows = vec![
            strings(&["a", "d", "a", "b", "c", "d"]),
            strings(&["c", "b", "b", "c", "e", "f"]),
        ];
        let trials = parse_trials(&header, &rows, &TrialColumns::default()).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[0].best, "a");
        assert_eq!(trials[0].worst, "d");
        assert_eq!(trials[0].others, strings(&["b", "c"]));
        assert_eq!(trials[1].others, strings(&["e", "f"]));
    }

    #[test]
    fn test_options_stop_at_first_gap_and_extra_columns_ignored() {
        let header = strings(&["id", "option1", "option2", "option4", "worst", "best"]);
        let layout = TrialColumns::default().locate(&header).unwrap();
        assert_eq!(layout.num_options(), 2);

        let row = strings(&["u1", "x", "y", "ignored", "y", "x"]);
        let trial = parse_trial_row(&layout, &row, 1).unwrap();
        assert_eq!(trial.best, "x");
        assert_eq!(trial.worst, "y");
        assert!(trial.others.is_empty());
    }

    #[test]
    fn test_custom_column_names() {
        let columns = TrialColumns {
            best: "Most".into(),
            worst: "Least".into(),
            option_prefix: "choice".into(),
        };
        let header = strings(&["Most", "Least", "choice1", "choice2", "choice3"]);
        let rows = vec![strings(&["p", "q", "q", "r", "p"])];
        let trials = parse_trials(&header, &rows, &columns).unwrap();
        assert_eq!(trials[0].others, strings(&["r"]));
    }

    #[test]
    fn test_missing_best_column() {
        let header = strings(&["worst", "option1"]);
        let rows: Vec<Vec<String>> = Vec::new();
        let err = parse_trials(&header, &rows, &TrialColumns::default()).unwrap_err();
        assert_eq!(err, BwsError::MissingColumn("best".into()));
    }

    #[test]
    fn test_short_row_reports_one_based_row() {
        let header = strings(&["best", "worst", "option1", "option2"]);
        let rows = vec![strings(&["a", "b", "a", "b"]), strings(&["a", "b", "a"])];
        let err = parse_trials(&header, &rows, &TrialColumns::default()).unwrap_err();
        assert!(matches!(err, BwsError::MalformedTrial { row: 2, .. }));
    }

    #[test]
    fn test_best_equals_worst_is_malformed() {
        let header = strings(&["best", "worst"]);
        let rows = vec![strings(&["a", "b"]), strings(&["a", "b"]), strings(&["z", "z"])];
        let err = parse_trials(&header, &rows, &TrialColumns::default()).unwrap_err();
        assert!(matches!(err, BwsError::MalformedTrial { row: 3, .. }));
    }

    #[test]
    fn test_repeated_option_is_malformed() {
        let header = strings(&["best", "worst", "option1", "option2", "option3"]);
        let rows = vec![strings(&["a", "b", "a", "c", "b"]), strings(&["a", "b", "a", "a", "b"])];
        let err = parse_trials(&header, &rows, &TrialColumns::default()).unwrap_err();
        assert!(
            matches!(&err, BwsError::MalformedTrial { row: 2, reason } if reason.contains("\"a\"")),
            "{err:?}"
        );

        let rows = vec![strings(&["a", "b", "c", "c", "b"])];
        let err = parse_trials(&header, &rows, &TrialColumns::default()).unwrap_err();
        assert!(matches!(err, BwsError::MalformedTrial { row: 1, .. }));
    }

    #[test]
    fn test_blank_options_are_skipped() {
        let header = strings(&["best", "worst", "option1", "option2", "option3", "option4"]);
        let rows = vec![strings(&[" a ", "c", "a", "b", "c", ""])];
        let trials = parse_trials(&header, &rows, &TrialColumns::default()).unwrap();
        assert_eq!(trials[0].best, "a");
        assert_eq!(trials[0].others, strings(&["b"]));
        assert_eq!(trials[0].size(), 3);
    }
}
