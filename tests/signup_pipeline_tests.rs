use actix_web::{App, test, web};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bike_rental_api::application::auth_service::AuthService;
use bike_rental_api::application::booking_service::BookingService;
use bike_rental_api::application::signup_service::SignupService;
use bike_rental_api::data::bike_repository::InMemoryBikeRepository;
use bike_rental_api::data::booking_repository::InMemoryBookingRepository;
use bike_rental_api::data::user_repository::InMemoryUserRepository;
use bike_rental_api::domain::error::DomainError;
use bike_rental_api::domain::repository::{ImageStore, TextExtractor, UserRepository};
use bike_rental_api::domain::user::SignupRequest;
use bike_rental_api::presentation::auth::signup;
use bike_rental_api::presentation::handlers::AppState;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const VALID_ID_TEXT: &str = "REPUBLIC OF KENYA NATIONAL IDENTITY CARD ID No 12345678";

/// Extractor stub returning a fixed recognized text.
struct StaticTextExtractor {
    text: String,
}

impl StaticTextExtractor {
    fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
        })
    }
}

#[async_trait]
impl TextExtractor for StaticTextExtractor {
    async fn extract(&self, _image: &[u8]) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Extractor stub that cannot process any buffer.
struct FailingTextExtractor;

#[async_trait]
impl TextExtractor for FailingTextExtractor {
    async fn extract(&self, _image: &[u8]) -> Result<String> {
        Err(anyhow!("unsupported image format"))
    }
}

/// Store stub counting uploads and returning a fixed URL.
struct RecordingImageStore {
    uploads: AtomicUsize,
}

impl RecordingImageStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            uploads: AtomicUsize::new(0),
        })
    }

    fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, _image: &[u8], folder: &str) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://cdn.example.com/{folder}/test-image"))
    }
}

/// Store stub where every upload fails.
struct FailingImageStore;

#[async_trait]
impl ImageStore for FailingImageStore {
    async fn upload(&self, _image: &[u8], _folder: &str) -> Result<String> {
        Err(anyhow!("storage unreachable"))
    }
}

fn signup_request() -> SignupRequest {
    SignupRequest {
        username: "Rider01".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Wanjiku".to_string(),
        phone: "0712345678".to_string(),
        id_number: "12345678".to_string(),
        is_owner: false,
        email: "jane@example.com".to_string(),
        password: "secret-pass".to_string(),
        image: vec![0xFF, 0xD8, 0xFF],
    }
}

fn service_with(
    users: Arc<InMemoryUserRepository>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn ImageStore>,
) -> SignupService<InMemoryUserRepository> {
    SignupService::new(users, extractor, store)
}

#[tokio::test]
async fn test_valid_document_creates_user_with_uploaded_url() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning(VALID_ID_TEXT),
        store.clone(),
    );

    let user = service.sign_up(signup_request()).await.unwrap();

    // The persisted record carries the URL the uploader returned.
    assert_eq!(
        user.id_pic,
        "https://cdn.example.com/id-documents/test-image"
    );
    assert_eq!(store.upload_count(), 1);
    assert_eq!(user.username, "rider01");
    assert_eq!(user.email, "jane@example.com");
    assert!(!user.password_hash.is_empty());
    assert_ne!(user.password_hash, "secret-pass");

    let stored = users
        .find_user_by_email("jane@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id_pic, user.id_pic);
}

#[tokio::test]
async fn test_non_id_document_is_rejected_without_side_effects() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning("SOME RANDOM DOCUMENT"),
        store.clone(),
    );

    let err = service.sign_up(signup_request()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::DocumentRejected(_))
    ));

    // No upload, no user record.
    assert_eq!(store.upload_count(), 0);
    assert!(
        users
            .find_user_by_email("jane@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_id_number_mismatch_is_rejected_without_side_effects() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning("REPUBLIC OF KENYA IDENTITY CARD ID No 99999999"),
        store.clone(),
    );

    let err = service.sign_up(signup_request()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::DocumentRejected(_))
    ));
    assert_eq!(store.upload_count(), 0);
    assert!(
        users
            .find_user_by_email("jane@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_extraction_failure_surfaces_as_client_error() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(users.clone(), Arc::new(FailingTextExtractor), store.clone());

    let err = service.sign_up(signup_request()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Extraction(_))
    ));
    assert_eq!(store.upload_count(), 0);
    assert!(
        users
            .find_user_by_email("jane@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_upload_failure_creates_no_user() {
    let users = Arc::new(InMemoryUserRepository::new());
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning(VALID_ID_TEXT),
        Arc::new(FailingImageStore),
    );

    let err = service.sign_up(signup_request()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Upload(_))
    ));
    assert!(
        users
            .find_user_by_email("jane@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_empty_image_buffer_is_a_client_error() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning(VALID_ID_TEXT),
        store.clone(),
    );

    let mut req = signup_request();
    req.image = Vec::new();

    let err = service.sign_up(req).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn test_invalid_fields_fail_before_extraction() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    // The failing extractor proves validation short-circuits the
    // pipeline: were extraction attempted, the error kind would differ.
    let service = service_with(users.clone(), Arc::new(FailingTextExtractor), store.clone());

    let mut req = signup_request();
    req.phone = "123".to_string();

    let err = service.sign_up(req).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let users = Arc::new(InMemoryUserRepository::new());
    let store = RecordingImageStore::new();
    let service = service_with(
        users.clone(),
        StaticTextExtractor::returning(VALID_ID_TEXT),
        store.clone(),
    );

    service.sign_up(signup_request()).await.unwrap();

    let mut second = signup_request();
    second.username = "OtherRider".to_string();
    let err = service.sign_up(second).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Conflict(_))
    ));
}

// HTTP-level signup through the multipart form.

fn multipart_body(boundary: &str, id_number: &str, image: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [
        ("username", "Rider01"),
        ("firstName", "Jane"),
        ("lastName", "Wanjiku"),
        ("phone", "0712345678"),
        ("idNumber", id_number),
        ("isOwner", "false"),
        ("email", "jane@example.com"),
        ("password", "secret-pass"),
    ] {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"idPic\"; filename=\"id.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

macro_rules! setup_signup_app {
    ($extractor:expr, $store:expr) => {{
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let auth_service =
            AuthService::new(user_repository.clone(), "test-secret".to_string());
        let signup_service = SignupService::new(user_repository.clone(), $extractor, $store);
        let booking_service = BookingService::new(
            Arc::new(InMemoryBikeRepository::new()),
            Arc::new(InMemoryBookingRepository::new()),
        );

        let state = web::Data::new(AppState {
            auth_service,
            signup_service,
            booking_service,
        });

        test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/api").route("/signup", web::post().to(signup))),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_signup_over_http_returns_created_user() {
    let store = RecordingImageStore::new();
    let app = setup_signup_app!(
        StaticTextExtractor::returning(VALID_ID_TEXT),
        store.clone() as Arc<dyn ImageStore>
    );

    let boundary = "test-boundary";
    let req = test::TestRequest::post()
        .uri("/api/signup")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body(boundary, "12345678", &[0xFF, 0xD8, 0xFF]))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["user"]["username"], "rider01");
    assert_eq!(
        body["user"]["idPic"],
        "https://cdn.example.com/id-documents/test-image"
    );
    // The password hash never leaves the server.
    assert!(body["user"].get("passwordHash").is_none());
}

#[actix_web::test]
async fn test_signup_over_http_rejects_non_id_document() {
    let store = RecordingImageStore::new();
    let app = setup_signup_app!(
        StaticTextExtractor::returning("SOME RANDOM DOCUMENT"),
        store.clone() as Arc<dyn ImageStore>
    );

    let boundary = "test-boundary";
    let req = test::TestRequest::post()
        .uri("/api/signup")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body(boundary, "12345678", &[0xFF, 0xD8, 0xFF]))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert_eq!(store.upload_count(), 0);
}
