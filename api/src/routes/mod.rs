use axum::Router;

use crate::shared_state::AppState;

mod admin;
mod auth;
mod gate;
mod health;
mod teams;

pub fn configure_routes() -> Router<AppState> {
    let api = Router::new()
        .merge(health::configure())
        .nest("/teams", teams::configure())
        .nest("/auth", auth::configure())
        .nest("/admin", admin::configure())
        .nest("/gate", gate::configure());

    Router::new().nest("/api", api)
}
