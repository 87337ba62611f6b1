//! Coercion stage.
//!
//! Rewrites the request state's typed fields in place according to the
//! declared schema (e.g. string-to-number path parameters). Coercion runs
//! after request validation and has no failure path of its own; the coerced
//! result is not re-validated.

use std::sync::Arc;

use daedalus_core::context::RequestState;
use daedalus_core::features::Coercer;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Runs the operation's coercer.
pub struct CoercionStep {
    coercer: Arc<dyn Coercer>,
}

impl CoercionStep {
    /// Creates the step from the operation's coercer.
    #[must_use]
    pub fn new(coercer: Arc<dyn Coercer>) -> Self {
        Self { coercer }
    }
}

impl Step for CoercionStep {
    fn name(&self) -> &'static str {
        "coercion"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            self.coercer.coerce(state);
            next.run(state, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use daedalus_core::handler::FnHandler;
    use daedalus_core::types::{Response, ResponseExt};
    use http::StatusCode;
    use serde_json::Value;

    struct NumericPathParams;

    impl Coercer for NumericPathParams {
        fn coerce(&self, state: &mut RequestState) {
            for value in state.path_params_mut().values_mut() {
                if let Some(n) = value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                    *value = Value::from(n);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_coercion_rewrites_in_place() {
        let step = CoercionStep::new(Arc::new(NumericPathParams));
        let handler = FnHandler::new(|_state, _request| {
            Box::pin(async { Ok(Response::error(StatusCode::OK, "ok")) })
        });

        let mut state = RequestState::new();
        state.set_path_param("petId", Value::String("42".into()));
        state.set_path_param("name", Value::String("rex".into()));

        let request = http::Request::builder()
            .uri("/pets/42")
            .body(Bytes::new())
            .unwrap();
        let chain = Next::new(&step, Next::terminal(&handler));
        chain.run(&mut state, request).await.unwrap();

        assert_eq!(state.path_param("petId"), Some(&Value::from(42)));
        // Non-numeric values are left untouched
        assert_eq!(state.path_param("name"), Some(&Value::String("rex".into())));
    }

    #[test]
    fn test_step_name() {
        let step = CoercionStep::new(Arc::new(NumericPathParams));
        assert_eq!(step.name(), "coercion");
    }
}
