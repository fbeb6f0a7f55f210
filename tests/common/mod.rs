#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    middleware::Logger,
    test, web, App,
};
use serde_json::{json, Value};
use taskvault::{
    auth::{AuthMiddleware, PasswordHasher, TokenIssuer},
    routes::{self, health},
    MemoryUserStore, UserStore,
};
use uuid::Uuid;

pub const ACCESS_SECRET: &str = "integration-access-secret";
pub const REFRESH_SECRET: &str = "integration-refresh-secret";

/// The service as `main` builds it, backed by `store`.
pub async fn init_app(
    store: MemoryUserStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let store: Arc<dyn UserStore> = Arc::new(store);
    let store = web::Data::from(store);
    let issuer = web::Data::new(TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET));
    // Minimum bcrypt cost keeps the suite fast.
    let hasher = web::Data::new(PasswordHasher::new(4));

    test::init_service(
        App::new()
            .app_data(store)
            .app_data(issuer.clone())
            .app_data(hasher)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(issuer))
                    .configure(routes::config),
            ),
    )
    .await
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "Test User", "email": email, "password": password }))
        .to_request();
    let registered: Value = test::call_and_read_body_json(app, req).await;
    assert_eq!(
        registered["message"], "Registered Successfully",
        "registration failed: {}",
        registered
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let login: Value = test::call_and_read_body_json(app, req).await;
    assert_eq!(
        login["message"], "User Login successful",
        "login failed: {}",
        login
    );

    TestUser {
        id: login["_id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("login response carries the user id"),
        token: login["accessTokenUser"]
            .as_str()
            .expect("login response carries the access token")
            .to_string(),
    }
}
