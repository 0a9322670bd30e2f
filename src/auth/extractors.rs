use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::session::{Identity, Session};
use crate::error::AppError;

/// Extracts the authenticated identity installed by `IdentityFilter`.
///
/// Anonymous requests are refused with `AppError::Unauthorized`, so a handler that takes
/// this extractor is never reached without a verified identity.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl FromRequest for CurrentIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match Session::of(req) {
            Session::Authenticated(identity) => ready(Ok(CurrentIdentity(identity))),
            Session::Anonymous => {
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
