use crate::auth::cookies::{ACCESS_COOKIE, RENEWAL_COOKIE};
use crate::auth::service::{ProfileUpdate, RegisterInput};
use crate::auth::session::AuthenticatedIdentity;
use crate::db::models::DeliveryMethod;
use crate::error::AppError;
use crate::AppState;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

/// Presence check matching the flows' fail-fast validation; an empty string
/// counts as missing.
fn required<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

fn decode_avatar(avatar: &Option<String>) -> Result<Option<Vec<u8>>, AppError> {
    match avatar.as_deref() {
        None => Ok(None),
        Some(encoded) => STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|_| AppError::Validation("Avatar is not valid base64".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub method: Option<DeliveryMethod>,
    pub receiver: Option<String>,
}

pub async fn send_otp(
    req: web::Json<SendOtpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let receiver = required(&req.receiver, "Please fill out required fields")?;
    let method = req
        .method
        .ok_or_else(|| AppError::Validation("Please fill out required fields".to_string()))?;

    state.service.send_otp(method, receiver).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Verification code has been sent"
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub receiver: Option<String>,
    pub otp: Option<i32>,
}

pub async fn verify_otp(
    req: web::Json<VerifyOtpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let receiver = required(&req.receiver, "Please fill out required fields")?;
    let otp = req
        .otp
        .ok_or_else(|| AppError::Validation("Please fill out required fields".to_string()))?;

    state.service.verify_otp(receiver, otp).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Code verified successfully..."
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    /// base64-encoded image handed to the media collaborator
    pub avatar: Option<String>,
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = required(&req.name, "Please fill out the required fields!")?;
    let email = required(&req.email, "Please fill out the required fields!")?;
    let password = required(&req.password, "Please fill out the required fields!")?;
    let avatar = decode_avatar(&req.avatar)?;

    info!("Received registration request for email: {}", email);

    let input = RegisterInput {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone: req.phone.clone().filter(|p| !p.is_empty()),
        avatar,
    };

    match state.service.register(input).await {
        Ok(_) => {
            info!("Registration successful for email: {}", email);
            Ok(HttpResponse::Created().json(json!({
                "message": "User registered successfully..."
            })))
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = required(&req.email, "All fields are required!")?;
    let password = required(&req.password, "All fields are required!")?;

    info!("Received login request for email: {}", email);

    match state.service.login(email, password).await {
        Ok((_, pair)) => {
            info!("Login successful for email: {}", email);
            Ok(HttpResponse::Ok()
                .cookie(state.cookies.access(pair.access))
                .cookie(state.cookies.renewal(pair.renewal))
                .json(json!({
                    "message": "User logged in successfully..."
                })))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

pub async fn logout(
    _identity: AuthenticatedIdentity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .cookie(state.cookies.expire(ACCESS_COOKIE))
        .cookie(state.cookies.expire(RENEWAL_COOKIE))
        .json(json!({
            "message": "User logged out successfully..."
        })))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

pub async fn forgot_password(
    req: web::Json<ForgotPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = required(
        &req.email,
        "Please provide email to get reset password link!",
    )?;

    state.service.forgot_password(email).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Password reset link has been sent to your email id"
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

pub async fn reset_password(
    token: web::Path<String>,
    req: web::Json<ResetPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let new_password = required(&req.new_password, "New password is missing!")?;

    state
        .service
        .reset_password(token.as_str(), new_password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password has been reset successfully..."
    })))
}

pub async fn current_identity(
    identity: AuthenticatedIdentity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.service.current_identity(identity.0).await?;

    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

pub async fn update_profile(
    identity: AuthenticatedIdentity,
    req: web::Json<UpdateProfileRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let avatar = decode_avatar(&req.avatar)?;

    let update = ProfileUpdate {
        name: req.name.clone().filter(|v| !v.is_empty()),
        email: req.email.clone().filter(|v| !v.is_empty()),
        phone: req.phone.clone().filter(|v| !v.is_empty()),
        password: req.password.clone().filter(|v| !v.is_empty()),
        avatar,
    };

    let updated = state.service.update_profile(identity.0, update).await?;

    Ok(HttpResponse::Ok().json(json!({ "user": updated })))
}
