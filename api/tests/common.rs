use anyhow::Result;
use diesel::prelude::*;
use futures::Future;
use once_cell::sync::Lazy;
use temp_dir::TempDir;

pub use crate::client::*;

use invitehub_api::{config::Config, Server};
use invitehub_db::{
    joins::NewJoin,
    object_id::{JoinId, TeamId},
    teams::NewTeam,
    PoolExt,
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const JWT_SECRET: &str = "the-test-jwt-secret";

pub struct TestApp {
    /// Keeps the database file alive for the duration of the test.
    _dir: TempDir,
    /// Direct access to the database behind the server.
    pub db: invitehub_db::Pool,
    /// A client set to the base url of the server.
    pub client: TestClient,
    pub address: String,
    pub base_url: String,
}

pub fn test_config(database_url: String) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Bind to random port
        env: "test".to_string(),
        database_url,
        database_pool_size: 4,
        jwt_secret: JWT_SECRET.to_string(),
        default_admin_username: ADMIN_USERNAME.to_string(),
        default_admin_password: ADMIN_PASSWORD.to_string(),
        // High enough that only the rate limit tests ever hit it.
        join_rate_limit: 1000,
        join_rate_window_seconds: 900,
        gate_bot_token: None,
        gate_channel: "@invitehub".to_string(),
        gate_api_base: "https://api.telegram.org".to_string(),
    }
}

async fn start_app(dir: TempDir, config: Config) -> Result<TestApp> {
    Lazy::force(&invitehub_test::TRACING);

    let database_url = config.database_url.clone();
    let Server { server, host, port } = invitehub_api::run_server(config).await?;

    tokio::task::spawn(async move { server.await });

    let base_url = format!("http://{}:{}/api", host, port);
    let client = TestClient {
        base: base_url.clone(),
        client: reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Building client"),
    };

    // A second pool onto the same file, for checking state directly.
    let db = invitehub_db::connect(&database_url, 2)?;

    Ok(TestApp {
        _dir: dir,
        db,
        client,
        address: format!("{}:{}", host, port),
        base_url,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    run_app_test_with_config(|_| {}, f).await
}

pub async fn run_app_test_with_config<F, R>(modify_config: impl FnOnce(&mut Config), f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let dir = TempDir::new().expect("Creating temp dir");
    let database_url = dir.path().join("invitehub.db").display().to_string();
    let mut config = test_config(database_url);
    modify_config(&mut config);

    let app = start_app(dir, config).await.expect("Starting app");
    f(app).await.unwrap();
}

impl TestApp {
    pub async fn login_token(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post("auth/login")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        anyhow::ensure!(
            response.status().as_u16() == 200,
            "Login for {username} failed with status {}",
            response.status()
        );

        let body: serde_json::Value = response.json().await?;
        let token = body["token"].as_str().expect("token in login response");
        Ok(token.to_string())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TestClient> {
        let token = self.login_token(username, password).await?;
        Ok(self.client.clone_with_token(&token))
    }

    /// Log in with the credentials seeded at startup.
    pub async fn login_admin(&self) -> Result<TestClient> {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Insert a team directly into the database.
    pub async fn add_team(&self, name: &str, max_members: i32, is_active: bool) -> Result<TeamId> {
        let team_id = TeamId::new();
        let now = chrono::Utc::now().naive_utc();

        let team = NewTeam {
            team_id,
            name: name.to_string(),
            description: None,
            invite_link: format!("https://chat.example.com/{name}"),
            max_members,
            current_members: 0,
            is_active,
            created_at: now,
            updated_at: now,
        };

        self.db
            .interact(move |conn| {
                diesel::insert_into(invitehub_db::teams::table)
                    .values(&team)
                    .execute(conn)?;
                Ok::<_, anyhow::Error>(())
            })
            .await?;

        Ok(team_id)
    }

    /// Insert a join row directly, bypassing the endpoint and its rate
    /// limiter and member counter.
    pub async fn add_join(
        &self,
        team_id: TeamId,
        email: Option<&str>,
        joined_at: chrono::NaiveDateTime,
    ) -> Result<JoinId> {
        let join_id = JoinId::new();
        let join = NewJoin {
            join_id,
            team_id,
            email: email.map(String::from),
            ip_address: "10.0.0.1".to_string(),
            joined_at,
        };

        self.db
            .interact(move |conn| {
                diesel::insert_into(invitehub_db::joins::table)
                    .values(&join)
                    .execute(conn)?;
                Ok::<_, anyhow::Error>(())
            })
            .await?;

        Ok(join_id)
    }

    pub async fn join(&self, team_id: TeamId, email: Option<&str>) -> Result<reqwest::Response> {
        let body = match email {
            Some(email) => serde_json::json!({ "email": email }),
            None => serde_json::json!({}),
        };

        Ok(self
            .client
            .post(&format!("teams/{team_id}/join"))
            .json(&body)
            .send()
            .await?)
    }

    pub async fn member_count(&self, team_id: TeamId) -> Result<i32> {
        let count = self
            .db
            .interact(move |conn| {
                invitehub_db::teams::table
                    .filter(invitehub_db::teams::team_id.eq(team_id))
                    .select(invitehub_db::teams::current_members)
                    .first::<i32>(conn)
                    .map_err(anyhow::Error::from)
            })
            .await?;
        Ok(count)
    }

    pub async fn join_count(&self, team_id: TeamId) -> Result<i64> {
        let count = self
            .db
            .interact(move |conn| {
                invitehub_db::joins::table
                    .filter(invitehub_db::joins::team_id.eq(team_id))
                    .select(diesel::dsl::count_star())
                    .first::<i64>(conn)
                    .map_err(anyhow::Error::from)
            })
            .await?;
        Ok(count)
    }
}
