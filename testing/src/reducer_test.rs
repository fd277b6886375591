//! Given-When-Then checks for a single reducer
//!
//! No runtime is involved: effects are inspected as values and never run.
//! Use [`crate::helpers::settle`] when a test needs the outcome of a remote
//! call.

#![allow(clippy::module_name_repetitions)]

use todo_core::{effect::Effect, reducer::Reducer};

/// A deferred check over the final state and the last action's effects
type Check<S, A> = Box<dyn FnOnce(&S, &[Effect<A>])>;

/// Builder that reduces a list of actions and then runs its checks
///
/// ```ignore
/// ReducerTest::new(TodoReducer::new())
///     .with_env(environment)
///     .given_state(TodoState::new())
///     .when_action(TodoAction::Refresh)
///     .then_state(|state| assert!(state.is_busy()))
///     .then_effects(assertions::assert_has_future_effect)
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    env: Option<R::Environment>,
    state: Option<R::State>,
    actions: Vec<R::Action>,
    checks: Vec<Check<R::State, R::Action>>,
}

impl<R: Reducer> ReducerTest<R>
where
    R::State: 'static,
    R::Action: 'static,
{
    /// Start a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            state: None,
            actions: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Environment passed to every reduce call
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// State before the first action
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Queue an action. Actions are reduced in the order they were queued.
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Check the state after the last action
    #[must_use]
    pub fn then_state(mut self, check: impl FnOnce(&R::State) + 'static) -> Self {
        self.checks.push(Box::new(move |state: &R::State, _: &[Effect<R::Action>]| check(state)));
        self
    }

    /// Check the effects returned for the last queued action
    #[must_use]
    pub fn then_effects(mut self, check: impl FnOnce(&[Effect<R::Action>]) + 'static) -> Self {
        self.checks.push(Box::new(move |_: &R::State, effects: &[Effect<R::Action>]| check(effects)));
        self
    }

    /// Reduce every queued action, then run the checks in order
    ///
    /// # Panics
    ///
    /// Panics when state, environment or actions are missing, and when a
    /// check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let (Some(mut state), Some(env)) = (self.state, self.env) else {
            panic!("ReducerTest needs given_state() and with_env() before run()");
        };
        assert!(!self.actions.is_empty(), "ReducerTest needs at least one when_action()");

        let mut last = Vec::new();
        for action in self.actions {
            last = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for check in self.checks {
            check(&state, &last);
        }
    }
}

/// Ready-made effect checks for [`ReducerTest::then_effects`]
pub mod assertions {
    use todo_core::effect::Effect;

    /// Only `Effect::None` (or nothing at all) was returned
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        let live = effects.iter().filter(|e| !e.is_none()).count();
        assert_eq!(live, 0, "expected no effects, got {live} of {}", effects.len());
    }

    /// Exactly `expected` effects were returned, `Effect::None` included
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// At least one remote call was started
    #[allow(clippy::panic)]
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "expected a Future effect"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::{SmallVec, async_effect, smallvec};

    #[derive(Debug)]
    enum Light {
        Flip,
        Report,
    }

    struct Switch;

    impl Reducer for Switch {
        type State = bool;
        type Action = Light;
        type Environment = ();

        fn reduce(&self, on: &mut bool, action: Light, _env: &()) -> SmallVec<[Effect<Light>; 4]> {
            match action {
                Light::Flip => {
                    *on = !*on;
                    SmallVec::new()
                },
                Light::Report => smallvec![async_effect! { None }],
            }
        }
    }

    #[test]
    fn actions_are_reduced_in_order() {
        ReducerTest::new(Switch)
            .with_env(())
            .given_state(false)
            .when_action(Light::Flip)
            .when_action(Light::Flip)
            .when_action(Light::Flip)
            .then_state(|on| assert!(*on))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn effects_come_from_the_last_action() {
        ReducerTest::new(Switch)
            .with_env(())
            .given_state(false)
            .when_action(Light::Flip)
            .when_action(Light::Report)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "given_state")]
    fn missing_state_is_reported() {
        ReducerTest::new(Switch).with_env(()).when_action(Light::Flip).run();
    }

    #[test]
    fn none_effect_counts_as_no_effect() {
        assertions::assert_no_effects::<Light>(&[Effect::None]);
        assertions::assert_no_effects::<Light>(&[]);
    }
}
