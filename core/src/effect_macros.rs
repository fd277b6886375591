//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```
/// use todo_core::{async_effect, effect::Effect};
///
/// #[derive(Debug)]
/// enum Action {
///     Loaded { count: usize },
/// }
///
/// let effect: Effect<Action> = async_effect! {
///     Some(Action::Loaded { count: 3 })
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug)]
    enum TestAction {
        Fetched { count: usize },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Fetched { count: 2 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[tokio::test]
    async fn test_async_effect_produces_action() {
        let effect = async_effect! {
            Some(TestAction::Fetched { count: 2 })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds a Future effect");
        };
        assert!(matches!(fut.await, Some(TestAction::Fetched { count: 2 })));
    }
}
