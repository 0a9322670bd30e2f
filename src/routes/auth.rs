use crate::{
    auth::{CredentialsRequest, Session},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates the account and answers `Success`. The caller still has to sign in.
///
/// ## Responses:
/// - `200 OK`: `Success`.
/// - `400 Bad Request`: `This username is already used`.
/// - `422 Unprocessable Entity`: username or password fails validation.
#[post("/sign-up")]
pub async fn sign_up(
    state: web::Data<AppState>,
    credentials: web::Json<CredentialsRequest>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;

    state
        .auth
        .sign_up(&credentials.username, &credentials.password)
        .await?;

    Ok(HttpResponse::Ok().body("Success"))
}

/// Sign in
///
/// Verifies the credentials and answers with a freshly issued session token as the
/// plain-text body. The identity is also installed on the current request.
///
/// ## Responses:
/// - `200 OK`: the token.
/// - `401 Unauthorized`: `Incorrect credentials`, for an unknown user and a wrong password alike.
/// - `422 Unprocessable Entity`: username or password fails validation.
#[post("/sign-in")]
pub async fn sign_in(
    req: HttpRequest,
    state: web::Data<AppState>,
    credentials: web::Json<CredentialsRequest>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;

    let (identity, token) = state
        .auth
        .sign_in(&credentials.username, &credentials.password)
        .await?;
    Session::Authenticated(identity).install(&req);

    Ok(HttpResponse::Ok().body(token))
}
