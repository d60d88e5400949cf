mod cli;
mod console;
mod infra;
mod routes;
mod server;

use cafe_shift::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
