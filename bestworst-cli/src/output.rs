/// Output formatting: CSV via the csv crate, and JSON.
use std::collections::HashMap;
use std::io::Write;

use bestworst_core::{Item, ParticipantCompliance, ScoreTable};
use serde::Serialize;

#[derive(Serialize)]
struct JsonScoredItem<'a> {
    name: &'a str,
    scores: &'a [f64],
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    methods: Vec<&'static str>,
    items: Vec<JsonScoredItem<'a>>,
    iterations: usize,
}

fn number(value: f64) -> String {
    value.to_string()
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().flexible(true).from_writer(out)
}

/// One row per group, no header.
pub fn write_groups<W: Write>(out: W, groups: &[Vec<Item>]) -> csv::Result<()> {
    let mut wtr = writer(out);
    for group in groups {
        wtr.write_record(group)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header `name_column, methods...`, then one row per item.
pub fn write_score_table<W: Write>(out: W, name_column: &str, table: &ScoreTable) -> csv::Result<()> {
    let mut wtr = writer(out);

    let mut header = vec![name_column.to_string()];
    header.extend(table.methods.iter().map(|m| m.name().to_string()));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.item.clone()];
        record.extend(row.scores.iter().copied().map(number));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Like `write_score_table`, with each item's latent value after its name.
pub fn write_simulation<W: Write>(
    out: W,
    item_column: &str,
    latent_column: &str,
    table: &ScoreTable,
    latent_values: &HashMap<Item, f64>,
) -> csv::Result<()> {
    let mut wtr = writer(out);

    let mut header = vec![item_column.to_string(), latent_column.to_string()];
    header.extend(table.methods.iter().map(|m| m.name().to_string()));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let latent = latent_values.get(&row.item).copied().unwrap_or(f64::NAN);
        let mut record = vec![row.item.clone(), number(latent)];
        record.extend(row.scores.iter().copied().map(number));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `ID,Compliance`, accuracy to three decimals, in report order.
pub fn write_compliance<W: Write>(out: W, report: &[ParticipantCompliance]) -> csv::Result<()> {
    let mut wtr = writer(out);
    wtr.write_record(["ID", "Compliance"])?;
    for participant in report {
        wtr.write_record([participant.participant.clone(), format!("{:.3}", participant.accuracy)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Trials of the given participants in a layout `score` reads back:
/// `User,best,worst,option1..`. The options are the unchosen items.
pub fn write_participant_trials<W: Write>(out: W, report: &[ParticipantCompliance]) -> csv::Result<()> {
    let mut wtr = writer(out);

    let widest = report
        .iter()
        .flat_map(|p| p.trials.iter())
        .map(|t| t.others.len())
        .max()
        .unwrap_or(0);
    let mut header = vec!["User".to_string(), "best".to_string(), "worst".to_string()];
    header.extend((1..=widest).map(|i| format!("option{i}")));
    wtr.write_record(&header)?;

    for participant in report {
        for trial in &participant.trials {
            let mut record = vec![participant.participant.clone(), trial.best.clone(), trial.worst.clone()];
            record.extend(trial.others.iter().cloned());
            wtr.write_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// A score table as pretty-printed JSON.
pub fn render_json(table: &ScoreTable, iterations: usize) -> serde_json::Result<String> {
    let output = JsonOutput {
        methods: table.methods.iter().map(|m| m.name()).collect(),
        items: table
            .rows
            .iter()
            .map(|row| JsonScoredItem {
                name: &row.item,
                scores: &row.scores,
            })
            .collect(),
        iterations,
    };
    serde_json::to_string_pretty(&output)
}
