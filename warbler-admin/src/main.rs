use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warbler_server::config::database_path_from_url;
use warbler_server::db::{schema::TABLES, seed::seed_sample_data, Database};

/// Warbler Database Administration
///
/// Creates, resets, seeds and inspects the SQLite database behind the
/// Warbler server.
#[derive(Parser, Debug)]
#[command(name = "warbler-admin")]
#[command(about = "Manage the Warbler database", long_about = None)]
struct Args {
    /// Database location: a file path, `sqlite://path` or `sqlite::memory:`
    #[arg(short, long, env = "DATABASE_URL", default_value = "warbler.db")]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create any missing tables
    Init,
    /// Drop every table and recreate the schema
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Insert sample users, messages and follows
    Seed,
    /// Print row counts for every table
    Stats,
}

fn connect_database(url: &str) -> Result<Database> {
    let path = database_path_from_url(url);
    tracing::info!("Connecting to database: {}", path);

    let db = Database::new(&path).context("Failed to open database")?;
    db.initialize().context("Failed to initialize schema")?;
    Ok(db)
}

fn confirm(prompt: &str) -> Result<bool> {
    println!("{} (y/N): ", prompt);
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn display_stats(db: &Database) -> Result<()> {
    println!();
    println!("Table      Rows");
    println!("===============");
    for table in TABLES {
        println!("{:<10} {}", table, db.count_rows(table)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler_admin=info,warbler_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let db = connect_database(&args.database)?;

    match args.command {
        Command::Init => {
            println!("Schema is up to date.");
        }
        Command::Reset { yes } => {
            if !yes && !confirm("This deletes every user, message and follow. Continue?")? {
                println!("Reset cancelled.");
                return Ok(());
            }
            db.reset()?;
            tracing::info!("Reset database {}", args.database);
            println!("Database reset.");
        }
        Command::Seed => {
            let created = seed_sample_data(&db)?;
            println!("Created {} sample users.", created);
        }
        Command::Stats => display_stats(&db)?,
    }

    Ok(())
}
