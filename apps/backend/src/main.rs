use actix_web::{web, App, HttpServer};
use backend::config::AppConfig;
use backend::engine::spawn_reaper;
use backend::state::AppState;
use backend::{routes, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables early
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = AppConfig::from_env();
    let bind = (config.bind_address.clone(), config.port);

    let app_state = web::Data::new(AppState::new(config));
    let _reaper = spawn_reaper(app_state.registry().clone());

    tracing::info!(address = %bind.0, port = bind.1, "Starting Cultura Chupística backend");

    HttpServer::new({
        let app_state = app_state.clone();
        move || {
            App::new()
                .app_data(app_state.clone())
                .configure(routes::configure)
        }
    })
    .bind(bind)?
    .run()
    .await
}
