//! Executable fragment representation.
//!
//! A [`Fragment`] is what lowering produces for the reference executor.
//! Production engines implement [`FragmentBuilder`](super::FragmentBuilder)
//! over their own plan types instead.

use setql_common::types::{Cardinality, LogicalType, SetMode, Value, Volatility};
use std::fmt;

/// A reference to data supplied by the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Name the data source knows the input by.
    pub name: String,
    /// Element type.
    pub ty: LogicalType,
    /// Declared cardinality; checked when the input is fetched.
    pub cardinality: Cardinality,
    /// Whether one fetch may be reused within an evaluation.
    pub reuse: bool,
}

/// When the fallback side of a coalesce may be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Only when the left side turns out empty.
    Lazy,
    /// Unconditionally; allowed only when evaluation is unobservable.
    Eager,
}

/// A node of an executable fragment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A constant set.
    Literal {
        /// Element type.
        ty: LogicalType,
        /// Elements, with multiplicity.
        values: Vec<Value>,
    },

    /// Data fetched from the data source.
    Input(InputSpec),

    /// Explicit element conversion.
    Cast {
        /// Set to convert.
        input: Box<Fragment>,
        /// Source element type.
        from: LogicalType,
        /// Target element type.
        to: LogicalType,
    },

    /// Element-wise membership test.
    Membership {
        /// Elements to test.
        element: Box<Fragment>,
        /// Set to test against.
        set: Box<Fragment>,
        /// `NOT IN` instead of `IN`.
        negated: bool,
    },

    /// Cardinality-to-boolean reduction.
    Exists(Box<Fragment>),

    /// Deduplication.
    Distinct(Box<Fragment>),

    /// Bag union of all inputs.
    UnionAll(Vec<Fragment>),

    /// Left if non-empty, else right.
    Coalesce {
        /// Preferred set.
        left: Box<Fragment>,
        /// Fallback set.
        right: Box<Fragment>,
        /// When the fallback may run.
        evaluation: Evaluation,
    },

    /// Selects exactly one branch per condition value.
    Conditional {
        /// Must evaluate to exactly one boolean.
        condition: Box<Fragment>,
        /// Result when the condition is true.
        if_true: Box<Fragment>,
        /// Result when the condition is false.
        if_false: Box<Fragment>,
    },

    /// Call of an engine-bound function.
    Call {
        /// Function name in the function registry.
        function: String,
        /// Arguments with the set-mode of their parameter.
        args: Vec<(SetMode, Fragment)>,
        /// Classification of the function itself.
        volatility: Volatility,
    },
}

impl Fragment {
    /// Returns the number of nodes in this fragment.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match self {
            Fragment::Literal { .. } | Fragment::Input(_) => 0,
            Fragment::Cast { input, .. } => input.node_count(),
            Fragment::Membership { element, set, .. } => element.node_count() + set.node_count(),
            Fragment::Exists(input) | Fragment::Distinct(input) => input.node_count(),
            Fragment::UnionAll(inputs) => inputs.iter().map(Fragment::node_count).sum(),
            Fragment::Coalesce { left, right, .. } => left.node_count() + right.node_count(),
            Fragment::Conditional {
                condition,
                if_true,
                if_false,
            } => condition.node_count() + if_true.node_count() + if_false.node_count(),
            Fragment::Call { args, .. } => args.iter().map(|(_, a)| a.node_count()).sum(),
        }
    }

    /// Returns the names of all inputs referenced, in visit order.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_inputs(&mut names);
        names
    }

    fn collect_inputs<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Fragment::Literal { .. } => {}
            Fragment::Input(spec) => names.push(&spec.name),
            Fragment::Cast { input, .. }
            | Fragment::Exists(input)
            | Fragment::Distinct(input) => input.collect_inputs(names),
            Fragment::Membership { element, set, .. } => {
                element.collect_inputs(names);
                set.collect_inputs(names);
            }
            Fragment::UnionAll(inputs) => {
                for input in inputs {
                    input.collect_inputs(names);
                }
            }
            Fragment::Coalesce { left, right, .. } => {
                left.collect_inputs(names);
                right.collect_inputs(names);
            }
            Fragment::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                condition.collect_inputs(names);
                if_true.collect_inputs(names);
                if_false.collect_inputs(names);
            }
            Fragment::Call { args, .. } => {
                for (_, arg) in args {
                    arg.collect_inputs(names);
                }
            }
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Fragment::Literal { ty, values } => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                writeln!(f, "{pad}Literal<{ty}> {{{}}}", items.join(", "))
            }
            Fragment::Input(spec) => writeln!(
                f,
                "{pad}Input {} <{}> [{}{}]",
                spec.name,
                spec.ty,
                spec.cardinality,
                if spec.reuse { ", reusable" } else { "" }
            ),
            Fragment::Cast { input, from, to } => {
                writeln!(f, "{pad}Cast {from} -> {to}")?;
                input.fmt_tree(f, depth + 1)
            }
            Fragment::Membership {
                element,
                set,
                negated,
            } => {
                writeln!(f, "{pad}{}", if *negated { "NotIn" } else { "In" })?;
                element.fmt_tree(f, depth + 1)?;
                set.fmt_tree(f, depth + 1)
            }
            Fragment::Exists(input) => {
                writeln!(f, "{pad}Exists")?;
                input.fmt_tree(f, depth + 1)
            }
            Fragment::Distinct(input) => {
                writeln!(f, "{pad}Distinct")?;
                input.fmt_tree(f, depth + 1)
            }
            Fragment::UnionAll(inputs) => {
                writeln!(f, "{pad}UnionAll")?;
                for input in inputs {
                    input.fmt_tree(f, depth + 1)?;
                }
                Ok(())
            }
            Fragment::Coalesce {
                left,
                right,
                evaluation,
            } => {
                writeln!(f, "{pad}Coalesce ({evaluation:?})")?;
                left.fmt_tree(f, depth + 1)?;
                right.fmt_tree(f, depth + 1)
            }
            Fragment::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                writeln!(f, "{pad}Conditional")?;
                condition.fmt_tree(f, depth + 1)?;
                if_true.fmt_tree(f, depth + 1)?;
                if_false.fmt_tree(f, depth + 1)
            }
            Fragment::Call {
                function,
                args,
                volatility,
            } => {
                writeln!(f, "{pad}Call {function} ({volatility})")?;
                for (_, arg) in args {
                    arg.fmt_tree(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(values: &[i64]) -> Fragment {
        Fragment::Literal {
            ty: LogicalType::Int64,
            values: values.iter().map(|v| Value::Int64(*v)).collect(),
        }
    }

    #[test]
    fn test_node_count_and_inputs() {
        let fragment = Fragment::Coalesce {
            left: Box::new(Fragment::Input(InputSpec {
                name: "user.nickname".to_string(),
                ty: LogicalType::String,
                cardinality: Cardinality::AtMostOne,
                reuse: true,
            })),
            right: Box::new(Fragment::Literal {
                ty: LogicalType::String,
                values: vec![Value::from("anonymous")],
            }),
            evaluation: Evaluation::Eager,
        };

        assert_eq!(fragment.node_count(), 3);
        assert_eq!(fragment.input_names(), vec!["user.nickname"]);
    }

    #[test]
    fn test_display_renders_tree() {
        let fragment = Fragment::Distinct(Box::new(Fragment::UnionAll(vec![
            literal(&[1, 2]),
            literal(&[2]),
        ])));

        let rendered = fragment.to_string();
        assert_eq!(
            rendered,
            "Distinct\n  UnionAll\n    Literal<int64> {1, 2}\n    Literal<int64> {2}\n"
        );
    }
}
