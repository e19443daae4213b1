//! The fragment-builder interface lowering targets.

use super::fragment::{Evaluation, Fragment, InputSpec};
use hashbrown::HashSet;
use setql_common::types::{LogicalType, SetMode, Value, Volatility};
use setql_common::utils::error::LoweringError;

/// Constructs executable fragments for a target engine.
///
/// Lowering walks a resolved expression tree and calls one method per
/// node. Implementations decide the concrete plan representation.
pub trait FragmentBuilder {
    /// The target's fragment type.
    type Fragment;

    /// A constant set of `ty` elements.
    fn literal(&mut self, ty: LogicalType, values: Vec<Value>) -> Self::Fragment;

    /// A reference to engine-supplied data.
    fn input(&mut self, spec: InputSpec) -> Self::Fragment;

    /// Returns true if the target can convert `from` elements to `to`.
    fn supports_cast(&self, from: LogicalType, to: LogicalType) -> bool;

    /// An explicit element conversion.
    ///
    /// # Errors
    ///
    /// Returns `LoweringError::UnsupportedCast` if the target cannot
    /// express the conversion.
    fn cast(
        &mut self,
        input: Self::Fragment,
        from: LogicalType,
        to: LogicalType,
    ) -> Result<Self::Fragment, LoweringError>;

    /// Element-wise membership test of `element` in `set`.
    fn membership(
        &mut self,
        element: Self::Fragment,
        set: Self::Fragment,
        negated: bool,
    ) -> Self::Fragment;

    /// One boolean: whether `input` is non-empty.
    fn exists(&mut self, input: Self::Fragment) -> Self::Fragment;

    /// `input` without duplicates.
    fn distinct(&mut self, input: Self::Fragment) -> Self::Fragment;

    /// Bag union of `inputs`.
    fn union_all(&mut self, inputs: Vec<Self::Fragment>) -> Self::Fragment;

    /// `left` if non-empty, else `right`.
    fn coalesce(
        &mut self,
        left: Self::Fragment,
        right: Self::Fragment,
        evaluation: Evaluation,
    ) -> Self::Fragment;

    /// One branch, selected by a single boolean.
    fn conditional(
        &mut self,
        condition: Self::Fragment,
        if_true: Self::Fragment,
        if_false: Self::Fragment,
    ) -> Self::Fragment;

    /// A call of an engine-bound function.
    ///
    /// # Errors
    ///
    /// Returns `LoweringError::Unsupported` if the target does not know
    /// the function.
    fn call(
        &mut self,
        function: &str,
        args: Vec<(SetMode, Self::Fragment)>,
        volatility: Volatility,
    ) -> Result<Self::Fragment, LoweringError>;
}

/// Builds [`Fragment`] trees for the in-memory [`Executor`](super::Executor).
///
/// Supports identity casts, numeric-to-numeric casts and casts from the
/// untyped empty set. Individual casts can be denied to model a target
/// with a narrower conversion matrix.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    denied_casts: HashSet<(LogicalType, LogicalType)>,
    denied_functions: HashSet<String>,
}

impl PlanBuilder {
    /// Creates a builder with the full cast matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes one conversion from the cast matrix.
    #[must_use]
    pub fn deny_cast(mut self, from: LogicalType, to: LogicalType) -> Self {
        self.denied_casts.insert((from, to));
        self
    }

    /// Marks a function as unavailable on this target.
    #[must_use]
    pub fn deny_function(mut self, name: impl Into<String>) -> Self {
        self.denied_functions.insert(name.into());
        self
    }
}

impl FragmentBuilder for PlanBuilder {
    type Fragment = Fragment;

    fn literal(&mut self, ty: LogicalType, values: Vec<Value>) -> Fragment {
        Fragment::Literal { ty, values }
    }

    fn input(&mut self, spec: InputSpec) -> Fragment {
        Fragment::Input(spec)
    }

    fn supports_cast(&self, from: LogicalType, to: LogicalType) -> bool {
        if self.denied_casts.contains(&(from, to)) {
            return false;
        }
        from == to || from == LogicalType::Unknown || (from.is_numeric() && to.is_numeric())
    }

    fn cast(
        &mut self,
        input: Fragment,
        from: LogicalType,
        to: LogicalType,
    ) -> Result<Fragment, LoweringError> {
        if !self.supports_cast(from, to) {
            return Err(LoweringError::UnsupportedCast { from, to });
        }
        if from == to {
            return Ok(input);
        }
        Ok(Fragment::Cast {
            input: Box::new(input),
            from,
            to,
        })
    }

    fn membership(&mut self, element: Fragment, set: Fragment, negated: bool) -> Fragment {
        Fragment::Membership {
            element: Box::new(element),
            set: Box::new(set),
            negated,
        }
    }

    fn exists(&mut self, input: Fragment) -> Fragment {
        Fragment::Exists(Box::new(input))
    }

    fn distinct(&mut self, input: Fragment) -> Fragment {
        Fragment::Distinct(Box::new(input))
    }

    fn union_all(&mut self, inputs: Vec<Fragment>) -> Fragment {
        // Nested unions flatten into one node.
        let mut flat = Vec::with_capacity(inputs.len());
        for input in inputs {
            match input {
                Fragment::UnionAll(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        Fragment::UnionAll(flat)
    }

    fn coalesce(&mut self, left: Fragment, right: Fragment, evaluation: Evaluation) -> Fragment {
        Fragment::Coalesce {
            left: Box::new(left),
            right: Box::new(right),
            evaluation,
        }
    }

    fn conditional(&mut self, condition: Fragment, if_true: Fragment, if_false: Fragment) -> Fragment {
        Fragment::Conditional {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    fn call(
        &mut self,
        function: &str,
        args: Vec<(SetMode, Fragment)>,
        volatility: Volatility,
    ) -> Result<Fragment, LoweringError> {
        if self.denied_functions.contains(function) {
            return Err(LoweringError::Unsupported(format!("function {function}")));
        }
        Ok(Fragment::Call {
            function: function.to_string(),
            args,
            volatility,
        })
    }
}
