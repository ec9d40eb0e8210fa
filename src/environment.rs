//! Chained scope frames.
//!
//! A frame maps identifier text to a value and optionally points at its
//! enclosing frame; the global frame has none. Blocks and calls push a new
//! frame whose parent is whichever frame was active when it was created,
//! which is what lets closures keep their defining scope alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// Shared, mutable handle to a frame.
pub type EnvRef<'a> = Rc<RefCell<Environment<'a>>>;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<EnvRef<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef<'a>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef<'a> {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this frame, silently replacing an existing binding.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        debug!("define '{}' = {}", name, value);

        self.values.insert(name, value);
    }

    /// Look `name` up in this frame, then outward through the chain.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>, RuntimeError<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite the nearest existing binding of `name`.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<(), RuntimeError<'a>> {
        if let Some(slot) = self.values.get_mut(name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the frame exactly `hops` links up from `env`.
    pub fn get_at(
        env: &EnvRef<'a>,
        hops: usize,
        name: &Token<'a>,
    ) -> Result<Value<'a>, RuntimeError<'a>> {
        let frame = Self::ancestor(env, hops).ok_or_else(|| undefined(name))?;
        let value = frame.borrow().values.get(name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Write `name` in the frame exactly `hops` links up from `env`.
    pub fn assign_at(
        env: &EnvRef<'a>,
        hops: usize,
        name: &Token<'a>,
        value: Value<'a>,
    ) -> Result<(), RuntimeError<'a>> {
        let frame = Self::ancestor(env, hops).ok_or_else(|| undefined(name))?;
        frame.borrow_mut().values.insert(name.lexeme, value);

        Ok(())
    }

    fn ancestor(env: &EnvRef<'a>, hops: usize) -> Option<EnvRef<'a>> {
        let mut frame = Rc::clone(env);

        for _ in 0..hops {
            let parent = frame.borrow().enclosing.clone()?;
            frame = parent;
        }

        Some(frame)
    }
}

fn undefined<'a>(name: &Token<'a>) -> RuntimeError<'a> {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}
