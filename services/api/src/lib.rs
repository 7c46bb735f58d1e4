mod cli;
mod infra;
mod report;
mod routes;
mod server;

use epi_sms::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
