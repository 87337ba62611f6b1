//! Security-enforcement stage.
//!
//! Appended near the end of the chain, after validation, coercion, defaults,
//! and consumes middleware. Resolves the security handler's asynchronous
//! accept/reject contract: an accept lets the chain proceed, a rejection
//! becomes a terminal failure whose challenge (if any) is surfaced via the
//! `WWW-Authenticate` response header when the failure is rendered.

use std::sync::Arc;

use daedalus_core::context::RequestState;
use daedalus_core::error::Failure;
use daedalus_core::features::SecurityHandler;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Runs the operation's security handler.
pub struct SecurityStep {
    handler: Arc<dyn SecurityHandler>,
}

impl SecurityStep {
    /// Creates the step from the operation's security handler.
    #[must_use]
    pub fn new(handler: Arc<dyn SecurityHandler>) -> Self {
        Self { handler }
    }
}

impl Step for SecurityStep {
    fn name(&self) -> &'static str {
        "security"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            if let Err(rejection) = self.handler.authenticate(state, &request).await {
                return Err(Failure::from(rejection));
            }
            next.run(state, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use daedalus_core::features::SecurityRejection;
    use daedalus_core::handler::FnHandler;
    use daedalus_core::types::{Response, ResponseExt};
    use http::StatusCode;

    struct ApiKeyCheck;

    impl SecurityHandler for ApiKeyCheck {
        fn authenticate<'a>(
            &'a self,
            _state: &'a RequestState,
            request: &'a Request,
        ) -> BoxFuture<'a, Result<(), SecurityRejection>> {
            Box::pin(async move {
                if request.headers().contains_key("x-api-key") {
                    Ok(())
                } else {
                    Err(SecurityRejection::unauthorized("missing API key")
                        .with_challenge("ApiKey realm=\"pets\""))
                }
            })
        }
    }

    fn make_request(with_key: bool) -> Request {
        let mut builder = http::Request::builder().uri("/pets");
        if with_key {
            builder = builder.header("x-api-key", "secret");
        }
        builder.body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn test_accept_advances_chain() {
        let step = SecurityStep::new(Arc::new(ApiKeyCheck));
        let handler = FnHandler::new(|_state, _request| {
            Box::pin(async { Ok(Response::error(StatusCode::OK, "ok")) })
        });

        let mut state = RequestState::new();
        let chain = Next::new(&step, Next::terminal(&handler));
        let outcome = chain.run(&mut state, make_request(true)).await;

        assert_eq!(outcome.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejection_aborts_with_challenge() {
        let step = SecurityStep::new(Arc::new(ApiKeyCheck));
        let handler = FnHandler::new(|_state: &mut RequestState, _request| {
            Box::pin(async { panic!("handler must not run after a security rejection") })
        });

        let mut state = RequestState::new();
        let chain = Next::new(&step, Next::terminal(&handler));
        let failure = chain.run(&mut state, make_request(false)).await.unwrap_err();

        match failure {
            Failure::Security {
                status, challenge, ..
            } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(challenge.as_deref(), Some("ApiKey realm=\"pets\""));
            }
            other => panic!("expected security failure, got {other:?}"),
        }
    }

    #[test]
    fn test_step_name() {
        let step = SecurityStep::new(Arc::new(ApiKeyCheck));
        assert_eq!(step.name(), "security");
    }
}
