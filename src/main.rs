use anyhow::Result;
use shareflow::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
