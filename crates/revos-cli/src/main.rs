//! Operator tooling for the comment-funnel poll jobs.
//!
//! The poll cycle itself has no CLI surface; it is invoked by the
//! embedding application's scheduler. This binary covers the pieces an
//! operator touches directly: migrations and poll-job administration.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use revos_db::NewPollJob;

#[derive(Debug, Parser)]
#[command(name = "revos-cli")]
#[command(about = "Revos comment-funnel operations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Inspect and manage poll jobs.
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
}

#[derive(Debug, Subcommand)]
enum JobsCommand {
    /// List the most recent poll jobs.
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Register a watch on a published post under an active campaign.
    Add {
        #[arg(long)]
        tenant_id: Uuid,
        #[arg(long)]
        campaign_id: Uuid,
        #[arg(long)]
        post_id: Uuid,
        #[arg(long)]
        external_post_id: String,
        #[arg(long)]
        external_account_id: String,
        #[arg(long)]
        trigger_word: String,
        #[arg(long)]
        lead_magnet: String,
    },
    /// Return a permanently failed job to the schedule.
    Reset {
        /// The job's public id.
        public_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let pool = revos_db::connect_pool_from_env().await?;

    match cli.command {
        Commands::Migrate => {
            revos_db::run_migrations(&pool).await?;
            println!("migrations up to date");
        }
        Commands::Jobs { command } => run_jobs_command(&pool, command).await?,
    }

    Ok(())
}

async fn run_jobs_command(pool: &sqlx::PgPool, command: JobsCommand) -> anyhow::Result<()> {
    match command {
        JobsCommand::List { limit } => {
            let jobs = revos_db::list_jobs(pool, limit).await?;
            if jobs.is_empty() {
                println!("no poll jobs");
                return Ok(());
            }
            for job in jobs {
                println!(
                    "{}  {:9}  trigger={:20}  errors={}  next={}  scanned={} triggers={} sent={}",
                    job.public_id,
                    job.status,
                    job.trigger_word,
                    job.error_count,
                    job.next_check_at.to_rfc3339(),
                    job.comments_scanned,
                    job.triggers_found,
                    job.messages_sent,
                );
                if let Some(error) = &job.last_error_message {
                    println!("    last error: {error}");
                }
            }
        }
        JobsCommand::Add {
            tenant_id,
            campaign_id,
            post_id,
            external_post_id,
            external_account_id,
            trigger_word,
            lead_magnet,
        } => {
            if trigger_word.trim().is_empty() {
                anyhow::bail!("trigger word must not be empty; the job would never poll");
            }
            if lead_magnet.trim().is_empty() {
                anyhow::bail!("lead magnet name must not be empty");
            }
            let job = revos_db::create_poll_job(
                pool,
                &NewPollJob {
                    tenant_id,
                    campaign_id,
                    post_id,
                    external_post_id,
                    external_account_id,
                    trigger_word,
                    lead_magnet_name: lead_magnet,
                },
            )
            .await?;
            println!("created poll job {} (due immediately)", job.public_id);
        }
        JobsCommand::Reset { public_id } => {
            if revos_db::reset_failed_job(pool, public_id).await? {
                println!("job {public_id} returned to the schedule");
            } else {
                println!("job {public_id} is not in failed status; nothing to do");
            }
        }
    }

    Ok(())
}
