use clap::Parser;

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 5000)]
    pub port: u16,

    #[clap(env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(long = "db", env = "DATABASE_URL", default_value_t = String::from("invitehub.db"))]
    pub database_url: String,
    #[clap(long, env, default_value_t = 16)]
    pub database_pool_size: usize,

    #[clap(long, env, default_value_t = String::from("change-this-secret-in-production"))]
    pub jwt_secret: String,

    /// Credentials seeded into an empty database on first start.
    #[clap(long, env, default_value_t = String::from("admin"))]
    pub default_admin_username: String,
    #[clap(long, env, default_value_t = String::from("admin123"))]
    pub default_admin_password: String,

    /// Number of join attempts allowed per client IP within the window.
    #[clap(long, env, default_value_t = 3)]
    pub join_rate_limit: u32,
    #[clap(long, env, default_value_t = 900)]
    pub join_rate_window_seconds: u32,

    /// Bot token for membership checks. Without one the gate runs in
    /// demo mode and verifies against a fixed allowlist.
    #[clap(long, env)]
    pub gate_bot_token: Option<String>,
    #[clap(long, env, default_value_t = String::from("@invitehub"))]
    pub gate_channel: String,
    #[clap(long, env, default_value_t = String::from("https://api.telegram.org"))]
    pub gate_api_base: String,
}
