// Route exports
pub mod search;

use actix_cors::Cors;
use actix_web::web;

pub use search::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(search::configure),
    );
}

/// CORS policy: any origin, GET only, wildcard `Access-Control-Allow-Origin`
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET"])
        .max_age(3600)
}
