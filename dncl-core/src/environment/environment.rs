use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::prelude::DnclObject;

/// One lexical scope. Lookups fall through to `outer`.
#[derive(Default)]
pub struct Environment {
    pub store: HashMap<String, DnclObject>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.store.keys().collect::<Vec<&String>>();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            outer: None
        }
    }

    pub fn new_shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Child scope of `outer`.
    pub fn enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer: Some(outer)
        }))
    }

    pub fn get(&self, name: &str) -> Option<DnclObject> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref()
                .and_then(|outer| outer.borrow().get(name))
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.store.contains_key(name) || self.outer.as_ref()
            .is_some_and(|outer| outer.borrow().is_defined(name))
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: String, value: DnclObject) {
        self.store.insert(name, value);
    }

    /// Rebinds `name` in the innermost scope that has it, or defines it here.
    pub fn assign(&mut self, name: String, value: DnclObject) {
        if self.store.contains_key(&name) {
            self.store.insert(name, value);
            return;
        }

        let owner = self.outer.as_ref()
            .filter(|outer| outer.borrow().is_defined(&name))
            .cloned();

        match owner {
            Some(outer) => outer.borrow_mut().assign(name, value),
            None => self.define(name, value),
        }
    }
}
