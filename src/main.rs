use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    zerowaste_cli::cli::app::run().await
}
