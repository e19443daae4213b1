//! Expression trees.
//!
//! Front-ends build [`ExprNode`] trees; the binder annotates every node in
//! place exactly once. Annotations cannot be changed afterwards: to alter a
//! tree, build fresh nodes.

use super::resolver::ResolvedSignature;
use serde::{Deserialize, Serialize};
use setql_common::types::{Cardinality, LogicalType, SetMode, Value, Volatility};
use setql_common::utils::error::ResolveError;

/// A reference to data supplied by the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRef {
    /// Name the data source knows the input by.
    pub name: String,
    /// Element type.
    #[serde(rename = "type")]
    pub ty: LogicalType,
    /// Declared cardinality.
    pub cardinality: Cardinality,
    /// Whether reads are observable or may change within an evaluation.
    pub volatility: Volatility,
}

impl InputRef {
    /// Declares a stable input.
    pub fn new(name: impl Into<String>, ty: LogicalType, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            ty,
            cardinality,
            volatility: Volatility::Stable,
        }
    }

    /// Sets the volatility.
    #[must_use]
    pub fn with_volatility(mut self, volatility: Volatility) -> Self {
        self.volatility = volatility;
        self
    }
}

/// What an expression node is.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A single constant.
    Literal(Value),
    /// A constant set. `element_type` is `Unknown` only for `{}`.
    Set {
        /// Element type.
        element_type: LogicalType,
        /// Elements, with multiplicity.
        values: Vec<Value>,
    },
    /// Engine-supplied data.
    Input(InputRef),
    /// An operator call.
    Call {
        /// Operator name.
        name: String,
        /// Arguments, in parameter order.
        args: Vec<ExprNode>,
    },
}

/// Annotations of a bound node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    /// Element type of the result.
    pub ty: LogicalType,
    /// Static cardinality of the result.
    pub cardinality: Cardinality,
    /// Volatility of the whole subtree.
    pub volatility: Volatility,
    /// Estimated number of elements.
    pub estimated_rows: f64,
    /// Resolution details, for calls.
    pub call: Option<ResolvedSignature>,
}

impl NodeInfo {
    /// Set-mode corresponding to the cardinality.
    #[must_use]
    pub fn mode(&self) -> SetMode {
        self.cardinality.mode()
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    kind: ExprKind,
    info: Option<NodeInfo>,
}

impl ExprNode {
    fn new(kind: ExprKind) -> Self {
        Self { kind, info: None }
    }

    /// A single constant.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(ExprKind::Literal(value.into()))
    }

    /// A constant set of `element_type` elements.
    pub fn set(element_type: LogicalType, values: Vec<Value>) -> Self {
        Self::new(ExprKind::Set {
            element_type,
            values,
        })
    }

    /// The untyped empty set `{}`.
    #[must_use]
    pub fn empty_set() -> Self {
        Self::set(LogicalType::Unknown, Vec::new())
    }

    /// A reference to engine-supplied data.
    #[must_use]
    pub fn input(input: InputRef) -> Self {
        Self::new(ExprKind::Input(input))
    }

    /// A call of `name`.
    pub fn call(name: impl Into<String>, args: Vec<ExprNode>) -> Self {
        Self::new(ExprKind::Call {
            name: name.into(),
            args,
        })
    }

    /// Returns what this node is.
    #[must_use]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn children(&self) -> &[ExprNode] {
        match &self.kind {
            ExprKind::Call { args, .. } => args,
            _ => &[],
        }
    }

    /// Returns the annotations, if bound.
    #[must_use]
    pub fn info(&self) -> Option<&NodeInfo> {
        self.info.as_ref()
    }

    /// Returns the annotations of a bound node.
    pub fn try_info(&self) -> Result<&NodeInfo, ResolveError> {
        self.info.as_ref().ok_or(ResolveError::NotResolved)
    }

    /// Returns true once the binder has annotated this node.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.info.is_some()
    }

    /// Returns true if this node or a descendant reads an input.
    #[must_use]
    pub fn has_inputs(&self) -> bool {
        matches!(self.kind, ExprKind::Input(_)) || self.children().iter().any(ExprNode::has_inputs)
    }

    /// Returns the maximum nesting depth, counting this node as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(ExprNode::depth).max().unwrap_or(0)
    }

    pub(crate) fn args_mut(&mut self) -> &mut [ExprNode] {
        match &mut self.kind {
            ExprKind::Call { args, .. } => args,
            _ => &mut [],
        }
    }

    pub(crate) fn annotate(&mut self, info: NodeInfo) -> Result<(), ResolveError> {
        if self.info.is_some() {
            return Err(ResolveError::AlreadyResolved);
        }
        self.info = Some(info);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_helpers() {
        let tree = ExprNode::call(
            "UNION",
            vec![
                ExprNode::literal(1i64),
                ExprNode::call(
                    "DISTINCT",
                    vec![ExprNode::input(InputRef::new(
                        "ids",
                        LogicalType::Int64,
                        Cardinality::Many,
                    ))],
                ),
            ],
        );
        assert_eq!(tree.depth(), 3);
        assert!(tree.has_inputs());
        assert!(!tree.children()[0].has_inputs());
        assert_eq!(tree.try_info(), Err(ResolveError::NotResolved));
    }

    #[test]
    fn test_annotate_once() {
        let mut node = ExprNode::literal(true);
        let info = NodeInfo {
            ty: LogicalType::Bool,
            cardinality: Cardinality::One,
            volatility: Volatility::Immutable,
            estimated_rows: 1.0,
            call: None,
        };
        node.annotate(info.clone()).unwrap();
        assert_eq!(node.annotate(info), Err(ResolveError::AlreadyResolved));
        assert_eq!(node.try_info().map(NodeInfo::mode), Ok(SetMode::Singleton));
    }

    #[test]
    fn test_input_ref_json() {
        let input: InputRef = serde_json::from_str(
            r#"{"name":"now","type":"int64","cardinality":"one","volatility":"volatile"}"#,
        )
        .unwrap();
        assert_eq!(input.volatility, Volatility::Volatile);
        assert_eq!(input.ty, LogicalType::Int64);
    }
}
