//! Symbolic parameter expressions.
//!
//! Gate angles may refer to free parameters (`theta`, `phi[0]`, ...) combined
//! with arithmetic and a handful of elementary functions. An expression only
//! becomes a number once every symbol in it has been bound.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// Elementary functions that may appear inside a parameter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterFunction {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl ParameterFunction {
    /// Look up a function by its textual name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "exp" => Self::Exp,
            "ln" => Self::Ln,
            "sqrt" => Self::Sqrt,
            _ => return None,
        })
    }

    /// Textual name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Sqrt => x.sqrt(),
        }
    }
}

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A free parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Exponentiation.
    Pow(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Function application.
    Func(ParameterFunction, Box<ParameterExpression>),
}

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    pub fn apply(func: ParameterFunction, arg: ParameterExpression) -> Self {
        ParameterExpression::Func(func, Box::new(arg))
    }

    pub fn sin(self) -> Self {
        Self::apply(ParameterFunction::Sin, self)
    }

    pub fn cos(self) -> Self {
        Self::apply(ParameterFunction::Cos, self)
    }

    pub fn exp(self) -> Self {
        Self::apply(ParameterFunction::Exp, self)
    }

    pub fn pow(self, exponent: ParameterExpression) -> Self {
        ParameterExpression::Pow(Box::new(self), Box::new(exponent))
    }

    /// Check if this expression contains any free parameter.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to a number, if the expression is fully bound.
    ///
    /// Division by zero yields `None` rather than an infinity.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
            ParameterExpression::Pow(a, b) => Some(a.as_f64()?.powf(b.as_f64()?)),
            ParameterExpression::Func(func, e) => e.as_f64().map(|v| func.apply(v)),
        }
    }

    /// Names of all free parameters, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    pub(crate) fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => {
                e.collect_symbols(set);
            }
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Substitute a single parameter.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        self.substitute(&|n| (n == name).then_some(value))
    }

    /// Substitute every parameter present in `values`; others stay symbolic.
    pub fn bind_all(&self, values: &FxHashMap<String, f64>) -> Self {
        self.substitute(&|n| values.get(n).copied())
    }

    fn substitute(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Self {
        let sub = |e: &ParameterExpression| Box::new(e.substitute(lookup));
        match self {
            ParameterExpression::Symbol(n) => match lookup(n) {
                Some(v) => ParameterExpression::Constant(v),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(sub(e)),
            ParameterExpression::Func(f, e) => ParameterExpression::Func(*f, sub(e)),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(sub(a), sub(b)),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(sub(a), sub(b)),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(sub(a), sub(b)),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(sub(a), sub(b)),
            ParameterExpression::Pow(a, b) => ParameterExpression::Pow(sub(a), sub(b)),
        }
    }

    /// Fold every constant subtree into a single [`ParameterExpression::Constant`].
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        let s = |e: &ParameterExpression| Box::new(e.simplify());
        match self {
            ParameterExpression::Neg(e) => ParameterExpression::Neg(s(e)),
            ParameterExpression::Func(f, e) => ParameterExpression::Func(*f, s(e)),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(s(a), s(b)),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(s(a), s(b)),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(s(a), s(b)),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(s(a), s(b)),
            ParameterExpression::Pow(a, b) => ParameterExpression::Pow(s(a), s(b)),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
            ParameterExpression::Pow(a, b) => write!(f, "({a} ^ {b})"),
            ParameterExpression::Func(func, e) => write!(f, "{}({e})", func.name()),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl std::ops::$trait for ParameterExpression {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                ParameterExpression::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}
