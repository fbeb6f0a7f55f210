use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated caller's user id.
///
/// Inserted into request extensions by `AuthMiddleware`. Handlers that take a
/// `CallerId` answer 401 when the request carried no valid access token; handlers
/// where identity is optional take `Option<CallerId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

impl FromRequest for CallerId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CallerId>().copied() {
            Some(caller) => ready(Ok(caller)),
            None => ready(Err(AppError::Unauthorized("Unauthorized".to_string()).into())),
        }
    }
}
