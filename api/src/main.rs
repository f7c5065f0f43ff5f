use clap::Parser;

use invitehub_api::{config::Config, run_server, tracing_config};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let config = Config::parse();

    tracing_config::configure("invitehub", std::io::stdout)?;

    let server = run_server(config).await?;
    server.server.await?;

    Ok(())
}
