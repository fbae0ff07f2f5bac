// src/main.rs

use fileknock::config::Settings;
use fileknock::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("fileknockd error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let settings = Settings::resolve(&args)?;
    logging::init_logging(settings.log_level)?;
    run(settings).await?;
    Ok(())
}
