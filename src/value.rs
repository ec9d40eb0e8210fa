use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::EnvRef;

/// A dynamically typed runtime value.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Callable(Callable<'a>),
}

impl<'a> Value<'a> {
    /// `false` and `nil` are falsy; everything else, `0` and `""` included,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }
}

/// `nil` equals only `nil`; numbers compare numerically (`1 == 1.0`),
/// strings by contents, callables by identity.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            // 3.0 → "3", 2.5 → "2.5"
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

/// Anything that can appear before `( … )`.
#[derive(Debug, Clone)]
pub enum Callable<'a> {
    Function(Rc<Function<'a>>),
    Native(Rc<NativeFunction<'a>>),
}

impl<'a> Callable<'a> {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(fun) => fun.declaration.params.len(),
            Callable::Native(native) => native.arity,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Function(fun) => fun.declaration.name.lexeme,
            Callable::Native(native) => native.name,
        }
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(_) => write!(f, "<fn {}>", self.name()),
            Callable::Native(_) => write!(f, "<native fn {}>", self.name()),
        }
    }
}

/// A user‑defined function: its declaration plus the frame that was active
/// where it was declared.
pub struct Function<'a> {
    pub declaration: &'a FunctionDecl<'a>,
    pub closure: EnvRef<'a>,
}

// The closure frame usually contains this very function, so a derived
// `Debug` would recurse forever.
impl fmt::Debug for Function<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .finish_non_exhaustive()
    }
}

/// A host function exposed to scripts.  Failures are plain messages; the
/// interpreter attaches the call site.
#[derive(Debug)]
pub struct NativeFunction<'a> {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value<'a>]) -> Result<Value<'a>, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_without_needless_fraction() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn equality_rules() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::from("ab"), Value::from("ab"));
        assert_ne!(Value::from("1"), Value::Number(1.0));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
    }
}
