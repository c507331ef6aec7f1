//! Request logging and CORS policy for the API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Access log, one line per request:
// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// The table UI calls this API cross-origin, so every origin is accepted and
// only the verbs the routes actually serve are allowed.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .max_age(3600)
}
