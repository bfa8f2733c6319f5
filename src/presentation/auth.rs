use crate::domain::user::{LoginRequest, SignupRequest};
use crate::presentation::handlers::{ApiError, AppState};
use actix_multipart::form::{MultipartForm, bytes::Bytes, text::Text};
use actix_web::{HttpResponse, web};
use tracing::{error, info, instrument};

/// Multipart signup form: text fields plus the ID-document image.
#[derive(Debug, MultipartForm)]
pub struct SignupForm {
    pub username: Text<String>,
    #[multipart(rename = "firstName")]
    pub first_name: Text<String>,
    #[multipart(rename = "lastName")]
    pub last_name: Text<String>,
    pub phone: Text<String>,
    #[multipart(rename = "idNumber")]
    pub id_number: Text<String>,
    #[multipart(rename = "isOwner")]
    pub is_owner: Text<bool>,
    pub email: Text<String>,
    pub password: Text<String>,
    #[multipart(rename = "idPic", limit = "10MiB")]
    pub id_pic: Bytes,
}

#[instrument(skip_all)]
pub async fn signup(
    state: web::Data<AppState>,
    form: MultipartForm<SignupForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    info!(email = %form.email.as_str(), "Signup request received");

    let request = SignupRequest {
        username: form.username.into_inner(),
        first_name: form.first_name.into_inner(),
        last_name: form.last_name.into_inner(),
        phone: form.phone.into_inner(),
        id_number: form.id_number.into_inner(),
        is_owner: form.is_owner.into_inner(),
        email: form.email.into_inner(),
        password: form.password.into_inner(),
        image: form.id_pic.data.to_vec(),
    };

    let user = state.signup_service.sign_up(request).await.map_err(|e| {
        error!(error = %e, "Failed to sign up user");
        ApiError::from(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "User created");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "User created",
        "user": user,
    })))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let token = state.auth_service.login(req.into_inner()).await.map_err(|e| {
        error!(error = %e, "Failed to login");
        ApiError::from(e)
    })?;

    info!("Login successful");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "User logged in",
        "token": token,
    })))
}
