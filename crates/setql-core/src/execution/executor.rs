//! Reference in-memory executor.

use super::fragment::{Evaluation, Fragment, InputSpec};
use super::functions::{FunctionImpl, FunctionRegistry};
use super::operators::{cast_set, distinct, membership, union_all};
use super::source::DataSource;
use hashbrown::HashMap;
use setql_common::types::{LogicalType, SetMode, Value};
use setql_common::utils::error::ExecutionError;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

/// Evaluates [`Fragment`]s against a [`DataSource`].
///
/// Reusable inputs are fetched at most once per call to
/// [`execute`](Self::execute); all other inputs are fetched at every
/// point where the fragment references them.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    functions: Arc<FunctionRegistry>,
}

struct EvalContext<'a> {
    source: &'a dyn DataSource,
    cache: HashMap<String, Vec<Value>>,
}

impl Executor {
    /// Creates an executor that resolves calls through `functions`.
    #[must_use]
    pub fn new(functions: Arc<FunctionRegistry>) -> Self {
        Self { functions }
    }

    /// Returns the function registry.
    #[must_use]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Evaluates `fragment` and returns the resulting set.
    ///
    /// # Errors
    ///
    /// Returns an error on cardinality violations, failed casts, unbound
    /// inputs, unknown functions or function failures.
    pub fn execute(
        &self,
        fragment: &Fragment,
        source: &dyn DataSource,
    ) -> Result<Vec<Value>, ExecutionError> {
        let mut ctx = EvalContext {
            source,
            cache: HashMap::new(),
        };
        self.eval(fragment, &mut ctx)
    }

    fn eval(&self, fragment: &Fragment, ctx: &mut EvalContext<'_>) -> Result<Vec<Value>, ExecutionError> {
        match fragment {
            Fragment::Literal { values, .. } => Ok(values.clone()),
            Fragment::Input(spec) => Self::fetch(spec, ctx),
            Fragment::Cast { input, to, .. } => cast_set(self.eval(input, ctx)?, *to),
            Fragment::Membership {
                element,
                set,
                negated,
            } => {
                let elements = self.eval(element, ctx)?;
                let set = self.eval(set, ctx)?;
                Ok(membership(&elements, &set, *negated))
            }
            Fragment::Exists(input) => {
                let values = self.eval(input, ctx)?;
                Ok(vec![Value::Bool(!values.is_empty())])
            }
            Fragment::Distinct(input) => Ok(distinct(self.eval(input, ctx)?)),
            Fragment::UnionAll(inputs) => {
                let sets = inputs
                    .iter()
                    .map(|input| self.eval(input, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(union_all(sets))
            }
            Fragment::Coalesce {
                left,
                right,
                evaluation,
            } => {
                let left = self.eval(left, ctx)?;
                match evaluation {
                    Evaluation::Eager => {
                        let right = self.eval(right, ctx)?;
                        Ok(if left.is_empty() { right } else { left })
                    }
                    Evaluation::Lazy if left.is_empty() => self.eval(right, ctx),
                    Evaluation::Lazy => Ok(left),
                }
            }
            Fragment::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                let condition = self.eval(condition, ctx)?;
                let [value] = condition.as_slice() else {
                    return Err(ExecutionError::CardinalityViolation {
                        context: "IF condition".to_string(),
                        found: condition.len(),
                    });
                };
                let flag = value.as_bool().ok_or_else(|| ExecutionError::TypeMismatch {
                    expected: LogicalType::Bool.to_string(),
                    found: value.logical_type().to_string(),
                })?;
                if flag {
                    self.eval(if_true, ctx)
                } else {
                    self.eval(if_false, ctx)
                }
            }
            Fragment::Call { function, args, .. } => {
                let implementation = self
                    .functions
                    .get(function)
                    .ok_or_else(|| ExecutionError::UnknownFunction(function.clone()))?
                    .clone();
                let mut evaluated = Vec::with_capacity(args.len());
                for (mode, arg) in args {
                    evaluated.push((*mode, self.eval(arg, ctx)?));
                }
                apply_elementwise(&implementation, evaluated)
            }
        }
    }

    fn fetch(spec: &InputSpec, ctx: &mut EvalContext<'_>) -> Result<Vec<Value>, ExecutionError> {
        // Cached sets are rechecked: two references to one name may declare
        // different types or cardinalities.
        if spec.reuse {
            if let Some(values) = ctx.cache.get(&spec.name) {
                Self::check(spec, values)?;
                return Ok(values.clone());
            }
        }

        let values = ctx.source.fetch(&spec.name)?;
        Self::check(spec, &values)?;
        if spec.reuse {
            ctx.cache.insert(spec.name.clone(), values.clone());
        }
        Ok(values)
    }

    fn check(spec: &InputSpec, values: &[Value]) -> Result<(), ExecutionError> {
        if let Some(bad) = values.iter().find(|v| v.logical_type() != spec.ty) {
            return Err(ExecutionError::TypeMismatch {
                expected: spec.ty.to_string(),
                found: bad.logical_type().to_string(),
            });
        }
        if !spec.cardinality.admits(values.len()) {
            return Err(ExecutionError::CardinalityViolation {
                context: format!("input '{}' declared {}", spec.name, spec.cardinality),
                found: values.len(),
            });
        }
        Ok(())
    }
}

/// Applies `function` once per combination of element-wise arguments.
///
/// Singleton arguments contribute each of their elements; an empty one
/// means no application at all. Optional arguments contribute each element,
/// or a single empty application when they are empty. `SET OF` arguments
/// are passed whole to every application.
fn apply_elementwise(
    function: &FunctionImpl,
    args: Vec<(SetMode, Vec<Value>)>,
) -> Result<Vec<Value>, ExecutionError> {
    let choices: SmallVec<[Vec<Vec<Value>>; 4]> = args
        .into_iter()
        .map(|(mode, values)| match mode {
            SetMode::SetOf => vec![values],
            SetMode::Optional if values.is_empty() => vec![Vec::new()],
            SetMode::Singleton | SetMode::Optional => {
                values.into_iter().map(|v| vec![v]).collect()
            }
        })
        .collect();
    if choices.iter().any(Vec::is_empty) {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut positions: SmallVec<[usize; 4]> = smallvec![0; choices.len()];
    loop {
        let application: Vec<Vec<Value>> = choices
            .iter()
            .zip(&positions)
            .map(|(choice, &i)| choice[i].clone())
            .collect();
        out.extend(function(&application)?);

        // Advance the rightmost position, carrying leftwards.
        let mut slot = choices.len();
        loop {
            if slot == 0 {
                return Ok(out);
            }
            slot -= 1;
            positions[slot] += 1;
            if positions[slot] < choices[slot].len() {
                break;
            }
            positions[slot] = 0;
        }
    }
}
