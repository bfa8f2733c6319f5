use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use bike_rental_api::application::auth_service::AuthService;
use bike_rental_api::application::booking_service::BookingService;
use bike_rental_api::application::signup_service::SignupService;
use bike_rental_api::data::bike_repository::InMemoryBikeRepository;
use bike_rental_api::data::booking_repository::InMemoryBookingRepository;
use bike_rental_api::data::user_repository::InMemoryUserRepository;
use bike_rental_api::domain::repository::{ImageStore, TextExtractor};
use bike_rental_api::infrastructure::config::AppConfig;
use bike_rental_api::infrastructure::logging::init_logging;
use bike_rental_api::infrastructure::object_store::CloudinaryImageStore;
use bike_rental_api::infrastructure::ocr::OcrTextExtractor;
use bike_rental_api::presentation::auth::{login, signup};
use bike_rental_api::presentation::handlers::{
    AppState, check_user, create_booking, health_check, list_bookings, update_booking, userdata,
};
use bike_rental_api::presentation::middleware::{JwtAuthMiddleware, RequestContextMiddleware};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Logging initialized");

    let config = AppConfig::from_env()?;
    info!(bind_addr = %config.bind_addr, "Configuration loaded");

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let bike_repository = Arc::new(InMemoryBikeRepository::new());
    let booking_repository = Arc::new(InMemoryBookingRepository::new());
    info!("Repositories created");

    let extractor: Arc<dyn TextExtractor> =
        Arc::new(OcrTextExtractor::from_model_dir(&config.ocr_model_dir)?);
    let image_store: Arc<dyn ImageStore> =
        Arc::new(CloudinaryImageStore::new(config.cloudinary.clone()));
    info!("OCR engine and object store ready");

    let auth_service = AuthService::new(user_repository.clone(), config.jwt_secret.clone());
    let signup_service = SignupService::new(user_repository.clone(), extractor, image_store);
    let booking_service = BookingService::new(bike_repository, booking_repository);

    let state = web::Data::new(AppState {
        auth_service,
        signup_service,
        booking_service,
    });
    info!("Application state initialized");

    let jwt_secret = config.jwt_secret.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(RequestContextMiddleware)
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login))
                    .route("/check-user", web::get().to(check_user))
                    .route("/userdata", web::get().to(userdata))
                    .route("/booking", web::post().to(create_booking))
                    .route("/bookings", web::get().to(list_bookings))
                    .route("/booking/{id}", web::put().to(update_booking)),
            )
    });

    info!(address = %config.bind_addr, "Starting HTTP server");
    server.bind(config.bind_addr.as_str())?.run().await?;
    Ok(())
}
