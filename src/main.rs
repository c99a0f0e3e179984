use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use gatehouse_server::auth::handlers::{
    current_identity, forgot_password, login, logout, register, reset_password, send_otp,
    update_profile, verify_otp,
};
use gatehouse_server::{health_check, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> gatehouse_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!(
        "Starting server at {}:{}",
        config.server.host, config.server.port
    );

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            // Tokens travel in cookies, so credentials stay enabled in
            // every CORS mode.
            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_any_header()
                    .supports_credentials()
            } else {
                cors_config
                    .allowed_origin(&config.services.client_app_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            cors_config.max_age(config.cors.max_age as usize)
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/otp", web::put().to(send_otp))
                    .route("/otp", web::delete().to(verify_otp))
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::get().to(logout))
                    .route("/password/forgot", web::put().to(forgot_password))
                    .route("/password/reset/{token}", web::patch().to(reset_password))
                    .route("/me", web::get().to(current_identity))
                    .route("/profile", web::put().to(update_profile)),
            )
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::Infrastructure(e.to_string()))?;

    Ok(())
}
