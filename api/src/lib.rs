pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod rate_limit;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{extract::connect_info::IntoMakeServiceWithConnectInfo, Router};
use chrono::Utc;
use diesel::prelude::*;
use hyper::server::conn::AddrIncoming;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

use invitehub_auth::token::TokenKey;
use invitehub_db::{admins, admins::NewAdminCredential, object_id::AdminId, Pool, PoolExt};

use crate::{
    error::Error, gate::MembershipGate, obfuscate_errors::ObfuscateErrorLayer,
    rate_limit::RateLimiter, shared_state::InnerState,
};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeServiceWithConnectInfo<Router, SocketAddr>>,
}

/// Create the admin account on first start so the dashboard is reachable
/// before anyone has touched the database.
async fn seed_admin(db: &Pool, config: &config::Config) -> Result<(), anyhow::Error> {
    let admin_count = db
        .interact(|conn| {
            admins::table
                .select(diesel::dsl::count_star())
                .first::<i64>(conn)
                .map_err(anyhow::Error::from)
        })
        .await?;

    if admin_count > 0 {
        return Ok(());
    }

    let password_hash = invitehub_auth::password::hash_password(&config.default_admin_password)
        .map_err(|e| anyhow::anyhow!("Hashing default admin password: {e}"))?;

    let now = Utc::now().naive_utc();
    let credential = NewAdminCredential {
        admin_id: AdminId::new(),
        username: config.default_admin_username.clone(),
        password_hash,
        created_at: now,
        updated_at: now,
    };

    db.interact(move |conn| {
        diesel::insert_into(admins::table)
            .values(&credential)
            .execute(conn)
            .map_err(anyhow::Error::from)
    })
    .await?;

    event!(
        Level::WARN,
        username = %config.default_admin_username,
        "Seeded default admin credentials; change the password after first login"
    );

    Ok(())
}

pub async fn run_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let db = invitehub_db::connect(config.database_url.as_str(), config.database_pool_size)?;

    invitehub_db::run_migrations(&db)
        .await
        .context("Running database migrations")?;

    let production = config.env != "development" && !cfg!(debug_assertions);

    if production && config.jwt_secret == "change-this-secret-in-production" {
        event!(
            Level::WARN,
            "Running with the default JWT secret; set JWT_SECRET"
        );
    }

    seed_admin(&db, &config).await?;

    let rate_limiter = RateLimiter::new(
        config.join_rate_limit as usize,
        chrono::Duration::seconds(config.join_rate_window_seconds as i64),
    );

    let state = Arc::new(InnerState {
        production,
        db,
        token_key: TokenKey::new(&config.jwt_secret),
        rate_limiter,
        gate: MembershipGate::from_config(&config)?,
    });

    let app = routes::configure_routes().with_state(state).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .compression()
            .decompression()
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::try_bind(&addr)?;

    // The join endpoint needs the peer address for rate limiting.
    let server = builder.serve(app.into_make_service_with_connect_info::<SocketAddr>());
    let local_addr = server.local_addr();
    event!(Level::INFO, "Listening on {}", local_addr);

    Ok(Server {
        host: config.host,
        // Resolved from the listener so that requesting port 0 reports the
        // real port.
        port: local_addr.port(),
        server,
    })
}
