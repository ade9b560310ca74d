mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use regional_redlist::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
