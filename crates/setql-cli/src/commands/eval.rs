//! Expression evaluation command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color};
use serde::Serialize;
use setql_common::types::Value;
use setql_engine::{Config, Engine};
use tracing::info;

use crate::OutputFormat;
use crate::document::Document;
use crate::output::{self, Format};

/// Static facts about the expression.
#[derive(Serialize)]
struct SummaryOutput {
    #[serde(rename = "type")]
    ty: String,
    cardinality: String,
    volatility: String,
    estimated_rows: f64,
}

/// Evaluation result.
#[derive(Serialize)]
struct EvalOutput {
    #[serde(flatten)]
    summary: SummaryOutput,
    values: Vec<Value>,
}

/// Explain result.
#[derive(Serialize)]
struct ExplainOutput {
    #[serde(flatten)]
    summary: SummaryOutput,
    fragment: String,
}

/// Run the eval command.
pub fn run(path: &Path, explain: bool, no_fold: bool, format: OutputFormat, quiet: bool) -> Result<()> {
    let (mut tree, source) = Document::load(path)?.into_parts()?;

    let engine = Engine::builtin(Config::default().with_constant_folding(!no_fold))?;
    let session = engine.session();
    session.bind(&mut tree)?;

    let node = tree.try_info()?;
    let summary = SummaryOutput {
        ty: node.ty.to_string(),
        cardinality: node.cardinality.to_string(),
        volatility: node.volatility.to_string(),
        estimated_rows: node.estimated_rows,
    };

    let fmt: Format = format.into();
    if explain {
        let fragment = session.compile(&mut tree)?;
        let output = ExplainOutput {
            summary,
            fragment: fragment.to_string(),
        };
        match fmt {
            Format::Json => output::print_json(&output, quiet)?,
            Format::Table => {
                print_summary(&output.summary, quiet);
                output::status(&format!("\n{}", output.fragment), quiet);
            }
        }
        return Ok(());
    }

    let values = session.evaluate(&mut tree, &source)?;
    info!(values = values.len(), "evaluated expression");
    let output = EvalOutput { summary, values };

    match fmt {
        Format::Json => output::print_json(&output, quiet)?,
        Format::Table => {
            print_summary(&output.summary, quiet);
            if !quiet {
                let mut table = output::create_table();
                output::add_header(&mut table, &["#", "Value"]);
                for (i, value) in output.values.iter().enumerate() {
                    table.add_row(vec![
                        Cell::new(i + 1).fg(Color::Green),
                        Cell::new(value.to_string()),
                    ]);
                }
                println!("\n{table}");
            }
            output::status(&format!("{} value(s)", output.values.len()), quiet);
        }
    }

    Ok(())
}

fn print_summary(summary: &SummaryOutput, quiet: bool) {
    let items = vec![
        ("Type", summary.ty.clone()),
        ("Cardinality", summary.cardinality.clone()),
        ("Volatility", summary.volatility.clone()),
        ("Estimated rows", format!("{:.1}", summary.estimated_rows)),
    ];
    output::print_key_value_table(&items, quiet);
}
