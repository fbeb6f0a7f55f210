use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{extractors::CallerId, token::TokenIssuer, ACCESS_TOKEN_COOKIE};
use crate::error::AppError;

/// Routes that never look at caller credentials.
const PUBLIC_PATHS: [&str; 4] = [
    "/health",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/logout",
];

/// Resolves the caller's identity from the access-token cookie or the
/// `Authorization: Bearer` header. The cookie is tried first; the header is
/// used when there is no cookie or the cookie's token does not verify.
///
/// A valid token puts a `CallerId` (and the decoded `Claims`) into the request
/// extensions. A request with no token passes through untouched and handlers that
/// need an identity answer 401 through the `CallerId` extractor. When every presented
/// token fails verification the request is rejected here with 401.
pub struct AuthMiddleware {
    issuer: web::Data<TokenIssuer>,
}

impl AuthMiddleware {
    pub fn new(issuer: web::Data<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            issuer: self.issuer.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    issuer: web::Data<TokenIssuer>,
}

/// Tokens presented by the caller, cookie first, then the bearer header.
fn presented_tokens(req: &ServiceRequest) -> Vec<String> {
    let cookie = req
        .cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    cookie.into_iter().chain(bearer).collect()
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            return Box::pin(self.service.call(req));
        }

        let tokens = presented_tokens(&req);
        if !tokens.is_empty() {
            // A stale cookie does not shadow a valid bearer token.
            let mut verified = None;
            for token in &tokens {
                match self.issuer.verify_access(token) {
                    Ok(claims) => {
                        verified = Some(claims);
                        break;
                    }
                    Err(app_err) => log::warn!("rejected token on {}: {}", req.path(), app_err),
                }
            }
            match verified {
                Some(claims) => {
                    req.extensions_mut().insert(CallerId(claims.id));
                    req.extensions_mut().insert(claims);
                }
                None => {
                    let err: AppError = AppError::Unauthorized("Invalid token".into());
                    return Box::pin(async move { Err(err.into()) });
                }
            }
        }

        Box::pin(self.service.call(req))
    }
}
