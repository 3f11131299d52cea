use std::collections::HashMap;
use std::rc::Rc;

use gc::{Finalize, Gc, GcCell, Trace};

use crate::object::{EvaluationError, Value};

#[derive(Trace, Finalize)]
struct EnvironmentCore {
    store: HashMap<Rc<str>, Value>,
    outer: Option<Environment>,
}

/// A scope frame. Cloning shares the frame; closures and nested call frames
/// keep their parents alive through `outer`. Frames are garbage collected,
/// so a frame that holds a closure capturing itself is still reclaimed.
#[derive(Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer.clone()),
            })),
        }
    }

    pub fn is_root(&self) -> bool {
        self.environment.borrow().outer.is_none()
    }

    /// Whether both handles refer to the same frame.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }

    /// The innermost frame, starting at this one, that binds `name`.
    fn lookup(&self, name: &str) -> Option<Environment> {
        let mut scope = Some(self.clone());
        while let Some(env) = scope {
            let core = env.environment.borrow();
            if core.store.contains_key(name) {
                drop(core);
                return Some(env);
            }
            scope = core.outer.clone();
        }
        None
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lookup(name)
            .and_then(|env| env.environment.borrow().store.get(name).cloned())
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.environment.borrow_mut().store.insert(name, value);
    }

    /// Rebinds `name` in the nearest frame that already binds it. An unbound
    /// name is defined here only when this is the root frame.
    pub fn set(&self, name: Rc<str>, value: Value) -> Result<Value, EvaluationError> {
        match self.lookup(&name) {
            Some(scope) => scope.define(name, value.clone()),
            None if self.is_root() => self.define(name, value.clone()),
            None => return Err(EvaluationError::UndefinedVariable(name)),
        }
        Ok(value)
    }

    pub fn names(&self) -> Vec<Rc<str>> {
        let mut names = self
            .environment
            .borrow()
            .store
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("is_root", &self.is_root())
            .finish()
    }
}
