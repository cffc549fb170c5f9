use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(vox_assistant_migration::Migrator).await;
}
