//! Binary: run / import / show for one bot account.

use anyhow::Result;
use bot_core::init_tracing;
use bot_templates::{import_blueprint, load_config, run_bot, show_blueprint, Cli, Commands, ModuleCatalog};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { account } => {
            let config = load_config(account)?;
            run_bot(config, ModuleCatalog::builtin()).await
        }
        Commands::Import { account, file } => {
            let config = load_config(account)?;
            init_tracing(None)?;
            let version = import_blueprint(&config, &file).await?;
            println!("Imported {} as {} v{}", file.display(), config.account_id(), version);
            Ok(())
        }
        Commands::Show { account } => {
            let config = load_config(account)?;
            init_tracing(None)?;
            let summary = show_blueprint(&config, ModuleCatalog::builtin()).await?;
            println!("brain:    {}", summary.brain);
            println!("version:  {}", summary.version.map_or("-".to_string(), |v| v.to_string()));
            println!("modules:  {}", summary.modules.join(", "));
            println!(
                "content:  {}  triggers: {}  charts: {}  events: {}",
                summary.content, summary.triggers, summary.charts, summary.events
            );
            for job in &summary.jobs {
                let next = job
                    .next_invocation
                    .map_or("never".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
                println!("job {:<24} {:<20} next {}", job.name, job.schedule.to_string(), next);
            }
            for (name, error) in &summary.failed_jobs {
                println!("job {:<24} FAILED: {}", name, error);
            }
            Ok(())
        }
    }
}
