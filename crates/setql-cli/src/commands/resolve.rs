//! Overload resolution command.

use anyhow::Result;
use serde::Serialize;
use setql_engine::Catalog;
use setql_engine::query::resolve;

use crate::OutputFormat;
use crate::document::parse_type;
use crate::output::{self, Format};

/// How a call resolved.
#[derive(Serialize)]
struct ResolutionOutput {
    signature: String,
    declaration: String,
    binding: Option<String>,
    return_type: String,
    cost: u32,
    coercions: Vec<String>,
    defaults: Vec<String>,
}

/// Run the resolve command.
pub fn run(name: &str, types: &[String], format: OutputFormat, quiet: bool) -> Result<()> {
    let arg_types = types
        .iter()
        .map(|t| parse_type(t))
        .collect::<Result<Vec<_>>>()?;
    let catalog = Catalog::builtin()?;
    let resolved = resolve(&catalog, name, &arg_types)?;

    let output = ResolutionOutput {
        signature: resolved.signature.specialized_name(),
        declaration: resolved.signature.to_string(),
        binding: resolved.binding.map(|t| t.to_string()),
        return_type: resolved.return_type.to_string(),
        cost: resolved.cost,
        coercions: resolved
            .coercions()
            .iter()
            .map(|c| format!("${}: {} -> {}", c.arg, c.from, c.to))
            .collect(),
        defaults: resolved
            .defaults_used
            .iter()
            .filter_map(|&index| resolved.signature.params.get(index))
            .filter_map(|p| p.default.as_ref().map(|v| format!("{} = {v}", p.name)))
            .collect(),
    };

    let fmt: Format = format.into();
    match fmt {
        Format::Json => output::print_json(&output, quiet)?,
        Format::Table => {
            let none = || "-".to_string();
            let join = |items: &[String]| {
                if items.is_empty() {
                    none()
                } else {
                    items.join(", ")
                }
            };
            let items = vec![
                ("Signature", output.signature.clone()),
                ("Declaration", output.declaration.clone()),
                ("Binding", output.binding.clone().unwrap_or_else(none)),
                ("Returns", output.return_type.clone()),
                ("Cost", output.cost.to_string()),
                ("Coercions", join(&output.coercions)),
                ("Defaults", join(&output.defaults)),
            ];
            output::print_key_value_table(&items, quiet);
        }
    }

    Ok(())
}
