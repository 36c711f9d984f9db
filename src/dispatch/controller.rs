//! Registry of controller actions, keyed by `controller#action`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::context::{Completion, ExecutionContext};
use crate::dispatch::handler::Action;
use crate::routing::params::ParamBag;

#[derive(Clone, Default)]
pub struct ControllerRegistry {
    actions: HashMap<(String, String), Arc<dyn Action>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure as `controller#name`, replacing any previous one.
    pub fn register<F>(&mut self, controller: &str, name: &str, f: F) -> &mut Self
    where
        F: Fn(ExecutionContext, ParamBag, Completion) + Send + Sync + 'static,
    {
        self.register_action(controller, name, Arc::new(f))
    }

    pub fn register_action(&mut self, controller: &str, name: &str, action: Arc<dyn Action>) -> &mut Self {
        self.actions
            .insert((controller.to_string(), name.to_string()), action);
        self
    }

    pub fn get(&self, controller: &str, name: &str) -> Option<Arc<dyn Action>> {
        self.actions
            .get(&(controller.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .actions
            .keys()
            .map(|(c, a)| format!("{}#{}", c, a))
            .collect();
        names.sort();
        f.debug_struct("ControllerRegistry").field("actions", &names).finish()
    }
}
