mod cli;
mod infra;
mod report;
mod routes;
mod server;

use kura_workspace::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
