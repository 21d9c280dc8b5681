use clap::Parser;
use ghostwriter::{app, init_logging, AppState, Cli};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging();

    let state = AppState::new(cli.upstream()).with_max_stories(cli.max_stories);
    let app = app(state);

    info!(addr = %cli.addr, api_base = %cli.api_base, "listening");
    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
