//! Operator signature declarations.

use setql_common::types::{LogicalType, SetMode, Value, Volatility};
use setql_common::utils::error::CatalogError;
use std::fmt;

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// The generic `anytype`; all occurrences in one signature share a
    /// single binding.
    Any,
    /// A concrete type.
    Concrete(LogicalType),
}

impl DeclaredType {
    /// Parses `anytype` or a concrete type name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "anytype" | "std::anytype" => Some(DeclaredType::Any),
            other => LogicalType::parse(other).map(DeclaredType::Concrete),
        }
    }

    /// Returns true for `anytype`.
    #[must_use]
    pub const fn is_generic(self) -> bool {
        matches!(self, DeclaredType::Any)
    }
}

impl From<LogicalType> for DeclaredType {
    fn from(ty: LogicalType) -> Self {
        DeclaredType::Concrete(ty)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Any => f.write_str("anytype"),
            DeclaredType::Concrete(ty) => write!(f, "{ty}"),
        }
    }
}

/// How a parameter binds arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Binds exactly one argument.
    Positional,
    /// Binds all remaining arguments, possibly none. Must be last.
    Variadic,
}

/// Syntactic form of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `a OP b`
    Infix,
    /// `OP a`
    Prefix,
    /// `a IF b ELSE c`
    Ternary,
    /// `name(args...)`
    Function,
}

impl OperatorKind {
    /// The number of parameters the form requires, if fixed.
    #[must_use]
    pub const fn arity(self) -> Option<usize> {
        match self {
            OperatorKind::Infix => Some(2),
            OperatorKind::Prefix => Some(1),
            OperatorKind::Ternary => Some(3),
            OperatorKind::Function => None,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatorKind::Infix => "infix",
            OperatorKind::Prefix => "prefix",
            OperatorKind::Ternary => "ternary",
            OperatorKind::Function => "function",
        };
        f.write_str(s)
    }
}

/// How the execution engine implements an operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorImpl {
    /// Element-wise membership test.
    Membership {
        /// `NOT IN` instead of `IN`.
        negated: bool,
        /// Type both operands are converted to before comparing, when the
        /// declared operand types differ.
        compare_as: Option<LogicalType>,
    },
    /// Non-emptiness test.
    Exists,
    /// Deduplication.
    Distinct,
    /// Bag union.
    Union,
    /// Left unless empty, else right.
    Coalesce,
    /// Branch selection.
    Conditional,
    /// A function implemented by the execution engine.
    EngineFunction {
        /// Name the engine knows the function by.
        name: String,
    },
}

impl fmt::Display for OperatorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorImpl::Membership {
                negated,
                compare_as,
            } => {
                f.write_str(if *negated { "not-in" } else { "in" })?;
                if let Some(ty) = compare_as {
                    write!(f, " as {ty}")?;
                }
                Ok(())
            }
            OperatorImpl::Exists => f.write_str("exists"),
            OperatorImpl::Distinct => f.write_str("distinct"),
            OperatorImpl::Union => f.write_str("union"),
            OperatorImpl::Coalesce => f.write_str("coalesce"),
            OperatorImpl::Conditional => f.write_str("conditional"),
            OperatorImpl::EngineFunction { name } => write!(f, "function {name}"),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Declared element type.
    pub ty: DeclaredType,
    /// How arguments are passed.
    pub mode: SetMode,
    /// Positional or variadic.
    pub kind: ParameterKind,
    /// Value used when the argument is omitted.
    pub default: Option<Value>,
}

impl ParameterSpec {
    /// A positional singleton parameter.
    pub fn new(name: impl Into<String>, ty: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            mode: SetMode::Singleton,
            kind: ParameterKind::Positional,
            default: None,
        }
    }

    /// Sets the set-mode to `SET OF`.
    #[must_use]
    pub fn set_of(mut self) -> Self {
        self.mode = SetMode::SetOf;
        self
    }

    /// Sets the set-mode to `OPTIONAL`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.mode = SetMode::Optional;
        self
    }

    /// Makes the parameter variadic.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.kind = ParameterKind::Variadic;
        self
    }

    /// Gives the parameter a default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ParameterKind::Variadic {
            f.write_str("VARIADIC ")?;
        }
        write!(f, "{}: {}{}", self.name, self.mode.keyword(), self.ty)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// Declared result of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnSpec {
    /// Element type; `Any` resolves to the generic binding.
    pub ty: DeclaredType,
    /// Set-mode of one application's result.
    pub mode: SetMode,
}

/// A declared operator overload.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSignature {
    /// Operator name; shared by all overloads.
    pub name: String,
    /// Syntactic form.
    pub kind: OperatorKind,
    /// Declared parameters, in order.
    pub params: Vec<ParameterSpec>,
    /// Declared result.
    pub returns: ReturnSpec,
    /// Classification of the operator itself.
    pub volatility: Volatility,
    /// Engine binding.
    pub implementation: OperatorImpl,
}

impl OperatorSignature {
    /// Starts a declaration. Defaults to an immutable operator returning a
    /// singleton of the generic type.
    pub fn new(name: impl Into<String>, kind: OperatorKind, implementation: OperatorImpl) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            returns: ReturnSpec {
                ty: DeclaredType::Any,
                mode: SetMode::Singleton,
            },
            volatility: Volatility::Immutable,
            implementation,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the declared result.
    #[must_use]
    pub fn returns(mut self, ty: impl Into<DeclaredType>, mode: SetMode) -> Self {
        self.returns = ReturnSpec { ty: ty.into(), mode };
        self
    }

    /// Sets the volatility.
    #[must_use]
    pub fn volatility(mut self, volatility: Volatility) -> Self {
        self.volatility = volatility;
        self
    }

    /// Returns `name(type, SET OF type, ...)`, identifying this overload.
    #[must_use]
    pub fn specialized_name(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}{}", p.mode.keyword(), p.ty))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }

    /// The key two overloads must not share: name and parameter types.
    pub(crate) fn identity(&self) -> (String, Vec<DeclaredType>) {
        (
            self.name.clone(),
            self.params.iter().map(|p| p.ty).collect(),
        )
    }

    /// Returns true if any parameter is `anytype`.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.params.iter().any(|p| p.ty.is_generic())
    }

    /// Returns the variadic parameter, if any.
    #[must_use]
    pub fn variadic(&self) -> Option<&ParameterSpec> {
        self.params
            .last()
            .filter(|p| p.kind == ParameterKind::Variadic)
    }

    /// Number of positional parameters.
    #[must_use]
    pub fn positional_count(&self) -> usize {
        self.params.len() - usize::from(self.variadic().is_some())
    }

    /// Number of arguments that must be supplied.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParameterKind::Positional && p.default.is_none())
            .count()
    }

    /// Returns true if a call with `count` arguments can bind.
    #[must_use]
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.required_count()
            && (count <= self.positional_count() || self.variadic().is_some())
    }

    /// Returns the parameter that binds argument `index`.
    #[must_use]
    pub fn parameter_for(&self, index: usize) -> Option<&ParameterSpec> {
        if index < self.positional_count() {
            self.params.get(index)
        } else {
            self.variadic()
        }
    }

    /// Checks the declaration for internal consistency.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidSignature {
            signature: self.specialized_name(),
            reason,
        };

        if let Some(arity) = self.kind.arity() {
            if self.params.len() != arity {
                return Err(invalid(format!(
                    "{} operators take {arity} operands, {} declared",
                    self.kind,
                    self.params.len()
                )));
            }
        }

        let mut seen_default = false;
        for (index, param) in self.params.iter().enumerate() {
            if param.kind == ParameterKind::Variadic && index + 1 != self.params.len() {
                return Err(invalid(format!(
                    "variadic parameter '{}' must be the last parameter",
                    param.name
                )));
            }
            match (&param.default, param.ty) {
                (Some(_), DeclaredType::Any) => {
                    return Err(invalid(format!(
                        "polymorphic parameter '{}' cannot have a default value",
                        param.name
                    )));
                }
                (Some(value), DeclaredType::Concrete(ty)) => {
                    if value.logical_type() != ty {
                        return Err(invalid(format!(
                            "default value of parameter '{}' has type {}, expected {ty}",
                            param.name,
                            value.logical_type()
                        )));
                    }
                    seen_default = true;
                }
                (None, _) => {
                    if seen_default && param.kind == ParameterKind::Positional {
                        return Err(invalid(format!(
                            "parameter '{}' without a default follows a defaulted parameter",
                            param.name
                        )));
                    }
                }
            }
        }

        if self.returns.ty.is_generic() && !self.is_generic() {
            return Err(invalid(
                "cannot return anytype without an anytype parameter".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for OperatorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} {}({}) -> {}{}",
            self.kind,
            self.name,
            params.join(", "),
            self.returns.mode.keyword(),
            self.returns.ty
        )
    }
}
