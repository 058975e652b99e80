//! Session gate middleware.
//!
//! Every request under the gated prefix has its session resolved and checked
//! against the administrator policy before any handler runs. Responses that
//! pass through here are never cached.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{self, HeaderValue},
};
use futures::future::LocalBoxFuture;

use quill_core::ports::AuthBackend;
use quill_core::services::{Access, SessionGate};

use super::auth::{GateRejection, session_token};

const NO_STORE: &str = "no-store, max-age=0";

/// Session gate middleware factory.
pub struct SessionGateMiddleware {
    gate: SessionGate,
    auth: Arc<dyn AuthBackend>,
}

impl SessionGateMiddleware {
    pub fn new(gate: SessionGate, auth: Arc<dyn AuthBackend>) -> Self {
        Self { gate, auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGateMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGateService {
            service: Rc::new(service),
            gate: self.gate.clone(),
            auth: Arc::clone(&self.auth),
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
    gate: SessionGate,
    auth: Arc<dyn AuthBackend>,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate.clone();
        let auth = Arc::clone(&self.auth);

        Box::pin(async move {
            let path = req.path().to_string();
            let token = session_token(req.request());

            let access = gate.enforce(auth.as_ref(), &path, token.as_deref()).await;
            let mut res = match access {
                Access::Public => service.call(req).await?.map_into_left_body(),
                Access::Granted(session) => {
                    req.extensions_mut().insert(session);
                    service.call(req).await?.map_into_left_body()
                }
                denied => {
                    tracing::debug!(path = %path, "Redirecting gated request");
                    let response = GateRejection::from_access(denied, &path).response();
                    let (http_req, _payload) = req.into_parts();
                    ServiceResponse::new(http_req, response).map_into_right_body()
                }
            };

            res.headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
            Ok(res)
        })
    }
}
