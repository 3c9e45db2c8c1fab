use gc::{Finalize, Trace};
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt::{Debug, Error as FmtError, Formatter};

use super::gc::{shared, GcShared};
use super::value::Value;
use super::ExecutionError;
use crate::helpers::ImmutableString;

/// Marks the parameter that collects the remaining arguments as a list
pub const VARIADIC_MARKER: &str = "&";

/// One frame of the lexical scope chain
pub struct Environment {
    pub(super) parent: Option<GcShared<Environment>>,
    pub(super) bindings: HashMap<ImmutableString, Value>,
}

impl Default for Environment {
    fn default() -> Environment {
        Environment {
            parent: None,
            bindings: HashMap::new(),
        }
    }
}

#[derive(Debug)]
struct FmtEnvironment<'a> {
    parent: Option<&'a GcShared<Environment>>,
    bindings: hash_map::Keys<'a, ImmutableString, Value>,
}

impl Debug for Environment {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), FmtError> {
        FmtEnvironment {
            parent: self.parent.as_ref(),
            bindings: self.bindings.keys(),
        }
        .fmt(fmt)
    }
}

impl Finalize for Environment {}
unsafe impl Trace for Environment {
    custom_trace!(this, {
        if let Some(ref env) = this.parent {
            mark(env);
        }
        for v in this.bindings.values() {
            mark(v);
        }
    });
}

impl Environment {
    /// A child frame of `outer`, binding `parameters` to `arguments`
    /// positionally. A parameter named `&` makes the following parameter
    /// collect the rest of the arguments, possibly none. Other parameters
    /// without an argument are left unbound; surplus arguments are ignored.
    pub fn new(
        outer: Option<GcShared<Environment>>,
        parameters: &[ImmutableString],
        arguments: Vec<Value>,
    ) -> Environment {
        let mut env = Environment {
            parent: outer,
            bindings: HashMap::new(),
        };

        let mut arguments = arguments.into_iter();
        let mut parameters = parameters.iter();
        while let Some(name) = parameters.next() {
            if &**name == VARIADIC_MARKER {
                if let Some(rest) = parameters.next() {
                    env.set(rest.clone(), Value::list(arguments.by_ref().collect()));
                }
                break;
            }
            if let Some(value) = arguments.next() {
                env.set(name.clone(), value);
            }
        }

        env
    }

    /// Binds `name` in this frame, shadowing any outer binding
    pub fn set(&mut self, name: ImmutableString, value: Value) -> Value {
        self.bindings.insert(name, value.clone());
        value
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        let mut environment = self.parent.clone()?;
        loop {
            environment = {
                let borrowed = environment.borrow();
                if let Some(value) = borrowed.bindings.get(name) {
                    return Some(value.clone());
                }
                borrowed.parent.clone()?
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, ExecutionError> {
        self.lookup(name)
            .ok_or_else(|| ExecutionError::UnboundVar(name.to_string()))
    }
}

/// Helpers that need the frame itself, not just a borrow of it
pub trait Frame: Sized {
    fn child(&self, parameters: &[ImmutableString], arguments: Vec<Value>) -> Self;
    fn find(&self, name: &str) -> Option<Self>;
    fn root(&self) -> Self;
}

impl Frame for GcShared<Environment> {
    fn child(
        &self,
        parameters: &[ImmutableString],
        arguments: Vec<Value>,
    ) -> GcShared<Environment> {
        shared(Environment::new(Some(self.clone()), parameters, arguments))
    }

    /// The innermost frame binding `name`
    fn find(&self, name: &str) -> Option<GcShared<Environment>> {
        let mut environment = self.clone();
        loop {
            let (found, parent) = {
                let borrowed = environment.borrow();
                (borrowed.bindings.contains_key(name), borrowed.parent.clone())
            };
            if found {
                return Some(environment);
            }
            environment = parent?;
        }
    }

    /// The outermost frame of the chain
    fn root(&self) -> GcShared<Environment> {
        let mut environment = self.clone();
        loop {
            let parent = environment.borrow().parent.clone();
            match parent {
                Some(parent) => environment = parent,
                None => return environment,
            }
        }
    }
}
