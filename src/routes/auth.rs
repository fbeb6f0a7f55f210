use crate::{
    auth::{
        CallerId, LoginRequest, LoginResponse, MessageResponse, PasswordHasher, ProfileResponse,
        RegisterRequest, RegisterResponse, TokenIssuer, ACCESS_TOKEN_COOKIE,
    },
    error::AppError,
    models::{user::DEFAULT_ROLE, NewUser, UserProfile},
    store::{StoreError, UserStore},
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    get,
    http::header,
    post, web, HttpResponse, Responder,
};
use validator::Validate;

/// Builds the access-token cookie: HTTP-only, secure, strict same-site.
fn access_cookie(value: String, max_age: CookieDuration) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .finish()
}

/// Register a new user
///
/// Validation failures and an already-registered email are answered with
/// `200 OK` and a descriptive message. The stored password hash is never echoed.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let RegisterRequest {
        name,
        email,
        password,
    } = payload.into_inner();
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();

    if store.find_by_email(&email).await?.is_some() {
        return Err(AppError::Rejected("Email already registered".into()));
    }

    let password_hash = hasher.hash_blocking(password).await?;

    let new_user = NewUser {
        name,
        email,
        password_hash,
        role: DEFAULT_ROLE.to_string(),
    };
    // The unique index still catches a registration that raced past the lookup.
    let user = match store.create(new_user).await {
        Ok(user) => user,
        Err(StoreError::AlreadyExists { .. }) => {
            return Err(AppError::Rejected("Email already registered".into()))
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Ok().json(RegisterResponse {
        message: "Registered Successfully".into(),
        user: user.into(),
    }))
}

/// Login user
///
/// On success the access token is set as the `accessTokenUser` cookie, echoed in
/// the `Authorization` header and returned in the body together with the refresh
/// token.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let LoginRequest { email, password } = payload.into_inner();
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();

    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Rejected("User not found".into()))?;

    if !hasher
        .verify_blocking(password, user.password.clone())
        .await?
    {
        log::info!("failed login for user {}", user.id);
        return Err(AppError::Rejected("Invalid password".into()));
    }

    let access_token = issuer.issue_access(&user)?;
    let refresh_token = issuer.issue_refresh(&user)?;
    let max_age = CookieDuration::seconds(TokenIssuer::access_ttl().num_seconds());

    Ok(HttpResponse::Ok()
        .cookie(access_cookie(access_token.clone(), max_age))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_token)))
        .json(LoginResponse {
            message: "User Login successful".into(),
            id: user.id,
            email: user.email,
            access_token_user: access_token,
            refresh_token_user: refresh_token,
        }))
}

/// Logout user
///
/// Expires the access-token cookie. Tokens themselves stay valid until they expire.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    let mut removal = access_cookie(String::new(), CookieDuration::ZERO);
    removal.make_removal();

    HttpResponse::Ok()
        .cookie(removal)
        .json(MessageResponse::new("User logged out successfully"))
}

/// Profile of the authenticated caller: name and email.
#[get("/profile")]
pub async fn profile(
    caller: CallerId,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .find_by_id(caller.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user_profile: UserProfile::from(&user),
    }))
}
