//! JSON expression documents.
//!
//! A document declares named inputs with their values and one expression
//! over them:
//!
//! ```json
//! {
//!   "inputs": {
//!     "nick": { "type": "str", "cardinality": "at_most_one", "values": [] }
//!   },
//!   "expr": { "call": { "name": "??", "args": [
//!     { "input": "nick" },
//!     { "literal": "anonymous" }
//!   ] } }
//! }
//! ```
//!
//! Literals infer `bool`, `int64`, `float64` or `str` from the JSON value;
//! other types use the `{ "type": ..., "value": ... }` form.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use setql_common::types::{Cardinality, LogicalType, Value, Volatility};
use setql_core::execution::InMemorySource;
use setql_engine::{ExprNode, InputRef};
use tracing::debug;

/// A parsed expression document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    inputs: BTreeMap<String, InputDecl>,
    expr: ExprDoc,
}

/// A declared input and its values.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputDecl {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default = "default_cardinality")]
    cardinality: Cardinality,
    #[serde(default = "default_volatility")]
    volatility: Volatility,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

fn default_cardinality() -> Cardinality {
    Cardinality::Many
}

fn default_volatility() -> Volatility {
    Volatility::Stable
}

/// One expression node.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ExprDoc {
    Literal(serde_json::Value),
    Set(SetDoc),
    Input(String),
    Call(CallDoc),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetDoc {
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CallDoc {
    name: String,
    #[serde(default)]
    args: Vec<ExprDoc>,
}

impl Document {
    /// Reads and parses a document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid document {}", path.display()))
    }

    /// Parses a document from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the expression tree and a data source holding the inputs.
    pub fn into_parts(self) -> Result<(ExprNode, InMemorySource)> {
        let mut refs = BTreeMap::new();
        let mut source = InMemorySource::new();
        for (name, decl) in self.inputs {
            let ty = parse_type(&decl.ty)?;
            let values = decl
                .values
                .iter()
                .map(|v| typed_value(ty, v))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("input '{name}'"))?;
            debug!(input = %name, %ty, values = values.len(), "declared input");
            source = source.with_values(name.clone(), values);
            refs.insert(
                name.clone(),
                InputRef::new(name, ty, decl.cardinality).with_volatility(decl.volatility),
            );
        }
        let tree = build(self.expr, &refs)?;
        Ok((tree, source))
    }
}

fn build(expr: ExprDoc, inputs: &BTreeMap<String, InputRef>) -> Result<ExprNode> {
    match expr {
        ExprDoc::Literal(json) => Ok(ExprNode::literal(literal_value(&json)?)),
        ExprDoc::Set(set) => {
            let Some(ty) = set.ty else {
                if !set.values.is_empty() {
                    bail!("a set with values needs a type");
                }
                return Ok(ExprNode::empty_set());
            };
            let ty = parse_type(&ty)?;
            let values = set
                .values
                .iter()
                .map(|v| typed_value(ty, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(ExprNode::set(ty, values))
        }
        ExprDoc::Input(name) => inputs
            .get(&name)
            .cloned()
            .map(ExprNode::input)
            .ok_or_else(|| anyhow!("input '{name}' is not declared")),
        ExprDoc::Call(call) => {
            let args = call
                .args
                .into_iter()
                .map(|arg| build(arg, inputs))
                .collect::<Result<Vec<_>>>()?;
            Ok(ExprNode::call(call.name, args))
        }
    }
}

/// Parses a type name as accepted on the command line.
pub fn parse_type(name: &str) -> Result<LogicalType> {
    LogicalType::parse(name).ok_or_else(|| anyhow!("unknown type '{name}'"))
}

fn literal_value(json: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    match json {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(v) => Ok(Value::Int64(v)),
            None => n
                .as_f64()
                .map(Value::Float64)
                .ok_or_else(|| anyhow!("number {n} is out of range")),
        },
        Json::String(s) => Ok(Value::from(s.as_str())),
        Json::Object(fields) => {
            let ty = fields
                .get("type")
                .and_then(Json::as_str)
                .ok_or_else(|| anyhow!("typed literal needs a \"type\" name"))?;
            let value = fields
                .get("value")
                .ok_or_else(|| anyhow!("typed literal needs a \"value\""))?;
            typed_value(parse_type(ty)?, value)
        }
        Json::Null | Json::Array(_) => bail!("{json} is not a literal; use a set for collections"),
    }
}

fn typed_value(ty: LogicalType, json: &serde_json::Value) -> Result<Value> {
    let value = match ty {
        LogicalType::Bool => json.as_bool().map(Value::Bool),
        LogicalType::Int16 => json
            .as_i64()
            .and_then(|v| i16::try_from(v).ok())
            .map(Value::Int16),
        LogicalType::Int32 => json
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32),
        LogicalType::Int64 => json.as_i64().map(Value::Int64),
        LogicalType::Float32 => json.as_f64().map(|v| Value::Float32(v as f32)),
        LogicalType::Float64 => json.as_f64().map(Value::Float64),
        LogicalType::Decimal => decimal(json).map(Value::Decimal),
        LogicalType::String => json.as_str().map(Value::from),
        LogicalType::Bytes => json.as_str().map(|s| Value::Bytes(s.as_bytes().into())),
        LogicalType::Json => Some(Value::Json(json.to_string().into())),
        LogicalType::Unknown => None,
    };
    value.ok_or_else(|| anyhow!("{json} is not a valid {ty} value"))
}

fn decimal(json: &serde_json::Value) -> Option<BigDecimal> {
    match json {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
