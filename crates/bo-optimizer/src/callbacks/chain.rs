use bo_types::{CallbackError, OptError, OptResult};

use crate::callbacks::callback::{Callback, CallbackCommand};
use crate::state::OptimizationState;

/// Ordered composition of callbacks.
///
/// Every member is invoked on every step, in insertion order. The chain
/// votes stop if any member did, reporting the first member's reason.
pub struct CallbackChain<'a> {
    callbacks: Vec<Box<dyn Callback + 'a>>,
}

impl<'a> std::fmt::Debug for CallbackChain<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackChain")
            .field("callbacks", &self.names().collect::<Vec<&str>>().join(", "))
            .finish()
    }
}

impl<'a> Default for CallbackChain<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CallbackChain<'a> {
    pub fn new() -> CallbackChain<'a> {
        CallbackChain {
            callbacks: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> CallbackChain<'a> {
        CallbackChain {
            callbacks: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vec(callbacks: Vec<Box<dyn Callback + 'a>>) -> CallbackChain<'a> {
        CallbackChain { callbacks }
    }

    /// Append a callback; builder form of [`CallbackChain::add`].
    pub fn with<C>(mut self, callback: C) -> Self
    where
        C: Callback + 'a,
    {
        self.add(callback);
        self
    }

    pub fn add<C>(&mut self, callback: C)
    where
        C: Callback + 'a,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn add_boxed(&mut self, callback: Box<dyn Callback + 'a>) {
        self.callbacks.push(callback);
    }

    /// Insert a callback ahead of all current members.
    pub fn prepend<C>(&mut self, callback: C)
    where
        C: Callback + 'a,
    {
        self.callbacks.insert(0, Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Member names in invocation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.callbacks.iter().map(|c| c.name())
    }

    /// Invoke every member and aggregate their votes.
    ///
    /// A failing member aborts the step; the error names it.
    pub fn notify(&mut self, state: &OptimizationState) -> OptResult<CallbackCommand> {
        self.step(state).map_err(|(name, source)| OptError::Callback { name, source })
    }

    fn step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, (String, CallbackError)> {
        let mut command = CallbackCommand::Continue;
        for callback in &mut self.callbacks {
            match callback.on_step(state) {
                Ok(CallbackCommand::Stop(reason)) if !command.is_stop() => {
                    command = CallbackCommand::Stop(reason);
                }
                Ok(_) => {}
                Err(e) => return Err((callback.name().to_string(), e)),
            }
        }
        Ok(command)
    }
}

impl<'a> FromIterator<Box<dyn Callback + 'a>> for CallbackChain<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Callback + 'a>>,
    {
        CallbackChain {
            callbacks: iter.into_iter().collect(),
        }
    }
}

impl<'a> Callback for CallbackChain<'a> {
    fn name(&self) -> &str {
        "CallbackChain"
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        self.step(state)
            .map_err(|(name, source)| CallbackError::Failed(format!("{name}: {source}")))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::state::test_support::state_with_values;

    /// Logs its label into a shared journal and votes as configured.
    struct Probe {
        label: &'static str,
        vote: Option<&'static str>,
        fail: bool,
        journal: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Probe {
        fn monitor(label: &'static str, journal: &Rc<RefCell<Vec<&'static str>>>) -> Self {
            Self {
                label,
                vote: None,
                fail: false,
                journal: Rc::clone(journal),
            }
        }

        fn stopper(label: &'static str, journal: &Rc<RefCell<Vec<&'static str>>>) -> Self {
            Self {
                vote: Some(label),
                ..Self::monitor(label, journal)
            }
        }
    }

    impl Callback for Probe {
        fn name(&self) -> &str {
            self.label
        }

        fn on_step(&mut self, _state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
            self.journal.borrow_mut().push(self.label);
            if self.fail {
                return Err(CallbackError::Failed("probe failure".to_string()));
            }
            Ok(match self.vote {
                Some(reason) => CallbackCommand::Stop(reason.to_string()),
                None => CallbackCommand::Continue,
            })
        }
    }

    #[test]
    fn empty_chain_continues() {
        let mut chain = CallbackChain::new();
        let state = state_with_values(3, 1, &[1.0]);
        assert_eq!(chain.notify(&state).unwrap(), CallbackCommand::Continue);
        assert!(chain.is_empty());
    }

    #[test]
    fn members_run_in_configuration_order() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut chain = CallbackChain::new()
            .with(Probe::monitor("a", &journal))
            .with(Probe::monitor("b", &journal))
            .with(Probe::monitor("c", &journal));

        let state = state_with_values(3, 1, &[1.0]);
        chain.notify(&state).unwrap();
        chain.notify(&state).unwrap();

        assert_eq!(*journal.borrow(), vec!["a", "b", "c", "a", "b", "c"]);
        assert_eq!(chain.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn stop_vote_does_not_short_circuit() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut chain = CallbackChain::new()
            .with(Probe::stopper("first", &journal))
            .with(Probe::stopper("second", &journal))
            .with(Probe::monitor("after", &journal));

        let state = state_with_values(3, 1, &[1.0]);
        let command = chain.notify(&state).unwrap();

        assert_eq!(command, CallbackCommand::Stop("first".to_string()));
        assert_eq!(*journal.borrow(), vec!["first", "second", "after"]);
    }

    #[test]
    fn failing_member_is_named() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut broken = Probe::monitor("broken", &journal);
        broken.fail = true;
        let mut chain = CallbackChain::new()
            .with(broken)
            .with(Probe::monitor("never", &journal));

        let state = state_with_values(3, 1, &[1.0]);
        match chain.notify(&state) {
            Err(OptError::Callback { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected callback error, got {other:?}"),
        }
        assert_eq!(*journal.borrow(), vec!["broken"]);
    }

    #[test]
    fn prepend_and_borrowed_members() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let mut owned_by_caller = Probe::monitor("borrowed", &journal);

        {
            let mut chain = CallbackChain::new().with(&mut owned_by_caller);
            chain.prepend(Probe::monitor("front", &journal));
            let state = state_with_values(3, 1, &[1.0]);
            chain.notify(&state).unwrap();
        }

        assert_eq!(*journal.borrow(), vec!["front", "borrowed"]);
        assert_eq!(owned_by_caller.name(), "borrowed");
    }

    #[test]
    fn chains_nest() {
        let journal = Rc::new(RefCell::new(Vec::new()));
        let inner = CallbackChain::new().with(Probe::stopper("inner", &journal));
        let mut outer = CallbackChain::new()
            .with(Probe::monitor("outer", &journal))
            .with(inner);

        let state = state_with_values(3, 1, &[1.0]);
        assert!(outer.notify(&state).unwrap().is_stop());
        assert_eq!(*journal.borrow(), vec!["outer", "inner"]);
    }
}
