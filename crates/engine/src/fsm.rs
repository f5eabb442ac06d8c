//! Event-driven finite state machine shared by every actor.
//!
//! A machine owns one boxed [`State`] per key, keeps the index of the active
//! one, and an ordered list of `(from, guard, to)` rules consulted by
//! [`StateMachine::handle_event`]. States may also request a transition from
//! their per-tick [`State::step`].

use std::fmt::Debug;

use thiserror::Error;
use tracing::debug;

use crate::app::{Camera2D, Painter};

/// Guard predicate for a transition rule.
pub type Guard<C, E> = fn(&E, &C) -> bool;

/// A transition requested by a state from inside [`State::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<K, E> {
    pub to: K,
    pub cause: E,
}

impl<K, E> Transition<K, E> {
    pub fn new(to: K, cause: E) -> Self {
        Self { to, cause }
    }
}

pub trait State<K, C, E> {
    fn enter(&mut self, ctx: &mut C, event: &E);
    fn exit(&mut self, _ctx: &mut C, _event: &E) {}
    fn step(&mut self, ctx: &mut C, dt: f32) -> Option<Transition<K, E>>;
    fn draw(&self, ctx: &C, painter: &mut dyn Painter, camera: &Camera2D);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("state machine has no states")]
    NoStates,
    #[error("state {0} registered more than once")]
    DuplicateState(String),
    #[error("state {0} is not registered")]
    UnknownState(String),
}

struct Rule<K, C, E> {
    from: K,
    guard: Guard<C, E>,
    to: K,
}

pub struct StateMachine<K, C, E> {
    states: Vec<(K, Box<dyn State<K, C, E>>)>,
    rules: Vec<Rule<K, C, E>>,
    current: usize,
}

impl<K, C, E> StateMachine<K, C, E>
where
    K: Copy + PartialEq + Debug,
{
    pub fn builder() -> StateMachineBuilder<K, C, E> {
        StateMachineBuilder::default()
    }

    pub fn current(&self) -> K {
        self.states[self.current].0
    }

    /// Enters the initial state. Called once after construction.
    pub fn start(&mut self, ctx: &mut C, cause: &E) {
        self.states[self.current].1.enter(ctx, cause);
    }

    /// Runs the active state's per-tick behavior. Returns the new state key
    /// when the state requested a transition.
    pub fn update(&mut self, ctx: &mut C, dt: f32) -> Option<K> {
        let transition = self.states[self.current].1.step(ctx, dt)?;
        let index = self.index_of(transition.to)?;
        self.switch(ctx, index, &transition.cause);
        Some(transition.to)
    }

    /// Dispatches a discrete event. The first rule registered for the
    /// current state whose guard accepts the event wins; no match leaves the
    /// machine untouched.
    pub fn handle_event(&mut self, ctx: &mut C, event: &E) -> bool {
        let current = self.current();
        let Some(target) = self
            .rules
            .iter()
            .find(|rule| rule.from == current && (rule.guard)(event, ctx))
            .map(|rule| rule.to)
        else {
            return false;
        };
        let Some(index) = self.index_of(target) else {
            return false;
        };
        self.switch(ctx, index, event);
        true
    }

    /// Forces a transition regardless of the rule table.
    pub fn reset_to(&mut self, ctx: &mut C, to: K, cause: &E) -> bool {
        match self.index_of(to) {
            Some(index) => {
                self.switch(ctx, index, cause);
                true
            }
            None => false,
        }
    }

    pub fn draw(&self, ctx: &C, painter: &mut dyn Painter, camera: &Camera2D) {
        self.states[self.current].1.draw(ctx, painter, camera);
    }

    fn index_of(&self, key: K) -> Option<usize> {
        self.states.iter().position(|(candidate, _)| *candidate == key)
    }

    fn switch(&mut self, ctx: &mut C, index: usize, cause: &E) {
        let from = self.current();
        self.states[self.current].1.exit(ctx, cause);
        self.current = index;
        self.states[self.current].1.enter(ctx, cause);
        debug!(from = ?from, to = ?self.current(), "state_transition");
    }
}

pub struct StateMachineBuilder<K, C, E> {
    states: Vec<(K, Box<dyn State<K, C, E>>)>,
    rules: Vec<Rule<K, C, E>>,
    initial: Option<K>,
}

impl<K, C, E> Default for StateMachineBuilder<K, C, E> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            rules: Vec::new(),
            initial: None,
        }
    }
}

impl<K, C, E> StateMachineBuilder<K, C, E>
where
    K: Copy + PartialEq + Debug,
{
    pub fn state(mut self, key: K, state: impl State<K, C, E> + 'static) -> Self {
        self.states.push((key, Box::new(state)));
        self
    }

    pub fn initial(mut self, key: K) -> Self {
        self.initial = Some(key);
        self
    }

    pub fn rule(mut self, from: K, guard: Guard<C, E>, to: K) -> Self {
        self.rules.push(Rule { from, guard, to });
        self
    }

    /// Registers the same guard for several source states.
    pub fn rules_from(mut self, from: &[K], guard: Guard<C, E>, to: K) -> Self {
        for key in from {
            self.rules.push(Rule {
                from: *key,
                guard,
                to,
            });
        }
        self
    }

    pub fn build(self) -> Result<StateMachine<K, C, E>, FsmError> {
        if self.states.is_empty() {
            return Err(FsmError::NoStates);
        }
        for (index, (key, _)) in self.states.iter().enumerate() {
            if self.states[..index].iter().any(|(other, _)| other == key) {
                return Err(FsmError::DuplicateState(format!("{key:?}")));
            }
        }
        let known = |key: &K| self.states.iter().any(|(candidate, _)| candidate == key);
        for rule in &self.rules {
            for key in [&rule.from, &rule.to] {
                if !known(key) {
                    return Err(FsmError::UnknownState(format!("{key:?}")));
                }
            }
        }
        let current = match self.initial {
            Some(key) => self
                .states
                .iter()
                .position(|(candidate, _)| *candidate == key)
                .ok_or_else(|| FsmError::UnknownState(format!("{key:?}")))?,
            None => 0,
        };
        Ok(StateMachine {
            states: self.states,
            rules: self.rules,
            current,
        })
    }
}
