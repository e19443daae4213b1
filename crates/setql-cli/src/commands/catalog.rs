//! Operator catalog listing command.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color};
use serde::Serialize;
use setql_engine::{Catalog, OperatorSignature};

use crate::OutputFormat;
use crate::output::{self, Format};

/// One declared overload.
#[derive(Serialize)]
struct SignatureOutput {
    name: String,
    kind: String,
    signature: String,
    returns: String,
    volatility: String,
    implementation: String,
}

impl From<&OperatorSignature> for SignatureOutput {
    fn from(sig: &OperatorSignature) -> Self {
        Self {
            name: sig.name.clone(),
            kind: sig.kind.to_string(),
            signature: sig.specialized_name(),
            returns: format!("{}{}", sig.returns.mode.keyword(), sig.returns.ty),
            volatility: sig.volatility.to_string(),
            implementation: sig.implementation.to_string(),
        }
    }
}

/// Run the catalog command.
pub fn run(name: Option<&str>, format: OutputFormat, quiet: bool) -> Result<()> {
    let catalog = Catalog::builtin()?;

    let signatures: Vec<SignatureOutput> = match name {
        Some(name) => {
            let overloads = catalog.lookup(name);
            if overloads.is_empty() {
                bail!("no operator named '{name}'");
            }
            overloads.iter().map(|sig| sig.as_ref().into()).collect()
        }
        None => catalog.iter().map(|sig| sig.as_ref().into()).collect(),
    };

    let fmt: Format = format.into();
    match fmt {
        Format::Json => output::print_json(&signatures, quiet)?,
        Format::Table => {
            if !quiet {
                let mut table = output::create_table();
                output::add_header(
                    &mut table,
                    &["Signature", "Kind", "Returns", "Volatility", "Implementation"],
                );
                for sig in &signatures {
                    table.add_row(vec![
                        Cell::new(&sig.signature).fg(Color::Green),
                        Cell::new(&sig.kind),
                        Cell::new(&sig.returns),
                        Cell::new(&sig.volatility),
                        Cell::new(&sig.implementation),
                    ]);
                }
                println!("{table}");
            }
            output::status(&format!("\n{} signature(s)", signatures.len()), quiet);
        }
    }

    Ok(())
}
