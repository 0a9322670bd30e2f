use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::service::AuthService;
use crate::auth::session::Session;
use crate::auth::token::TokenError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Attaches a `Session` to every request.
///
/// The filter only ever adds identity. A missing, expired or otherwise unusable token
/// leaves the request `Anonymous` and it is still forwarded; refusing anonymous callers
/// is left to the handlers' extractors.
pub struct IdentityFilter;

impl<S, B> Transform<S, ServiceRequest> for IdentityFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = IdentityFilterService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityFilterService {
            service: Rc::new(service),
        }))
    }
}

pub struct IdentityFilterService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityFilterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = req.app_data::<web::Data<AppState>>().cloned();
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let current = Session::of(&req);

            let session = match state {
                Some(state) => {
                    resolve_session(&state.auth, authorization.as_deref(), &current).await
                }
                None => {
                    log::error!("AppState is not registered; {} stays anonymous", req.path());
                    current
                }
            };
            if let Some(identity) = session.identity() {
                log::debug!(
                    "{} {} as {:?} {:?}",
                    req.method(),
                    req.path(),
                    identity.username(),
                    identity.authorities()
                );
            }
            session.install(&req);

            service.call(req).await
        })
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Decides the session for one request.
///
/// An already authenticated session is kept as is. Otherwise a verifiable bearer token
/// whose subject still exists yields `Authenticated`; every other path yields `Anonymous`.
pub async fn resolve_session(
    auth: &AuthService,
    authorization: Option<&str>,
    current: &Session,
) -> Session {
    if current.is_authenticated() {
        return current.clone();
    }

    let token = match authorization.and_then(bearer_token) {
        Some(token) => token,
        None => return Session::Anonymous,
    };

    let username = match auth.tokens().subject(token) {
        Ok(username) => username,
        Err(TokenError::Expired) => {
            log::debug!("ignoring expired session token");
            return Session::Anonymous;
        }
        Err(e) => {
            log::debug!("ignoring unusable session token: {}", e);
            return Session::Anonymous;
        }
    };

    match auth.load_identity(&username).await {
        Ok(identity) => Session::Authenticated(identity),
        Err(e) => {
            log::debug!("token subject {:?} did not resolve: {}", username, e);
            Session::Anonymous
        }
    }
}
