//! Maoyang CLI - operator tools on top of the admin API.
//!
//! # Usage
//!
//! ```bash
//! # Grouped orders, optionally filtered
//! maoyang-cli orders --search 1712 --month 3
//!
//! # Ingredients
//! maoyang-cli ingredients list
//! maoyang-cli ingredients add "Passion fruit"
//!
//! # Notify one member or everyone
//! maoyang-cli notify --title "Closed" --message "Closed on Monday" --all
//! maoyang-cli notify --title "Your order" --message "On its way" --member 42
//!
//! # Best-selling products
//! maoyang-cli top-sellers
//! ```
//!
//! # Environment Variables
//!
//! - `MAOYANG_API_URL` - Backend base URL
//! - `MAOYANG_ADMIN_PHONE` / `MAOYANG_ADMIN_PASSWORD` - Admin credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "maoyang-cli")]
#[command(author, version, about = "Maoyang operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print grouped order summaries
    Orders {
        /// Only orders whose number contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only orders placed in this month (1-12, shop time)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// List or add ingredients
    Ingredients {
        #[command(subcommand)]
        action: IngredientAction,
    },
    /// Send a notification
    Notify {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        message: String,

        /// Member ID to notify
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        member: Option<i32>,

        /// Notify every member
        #[arg(long)]
        all: bool,
    },
    /// Print the best-selling products
    TopSellers,
}

#[derive(Subcommand)]
enum IngredientAction {
    /// List all ingredients
    List,
    /// Add an ingredient
    Add {
        /// Ingredient name
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let session = commands::AdminSession::from_env().await?;

    let output = match cli.command {
        Commands::Orders { search, month } => {
            commands::orders::summaries(&session, search, month).await?
        }
        Commands::Ingredients { action } => match action {
            IngredientAction::List => commands::ingredients::list(&session).await?,
            IngredientAction::Add { name } => commands::ingredients::add(&session, &name).await?,
        },
        Commands::Notify {
            title,
            message,
            member,
            all,
        } => commands::notify::send(&session, &title, &message, member, all).await?,
        Commands::TopSellers => commands::orders::top_sellers(&session).await?,
    };

    for line in output {
        tracing::info!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_notify_needs_a_recipient() {
        let parsed = Cli::try_parse_from(["maoyang-cli", "notify", "-t", "Hi", "-m", "There"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from([
            "maoyang-cli", "notify", "-t", "Hi", "-m", "There", "--member", "3", "--all",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_month_range() {
        assert!(Cli::try_parse_from(["maoyang-cli", "orders", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["maoyang-cli", "orders", "--month", "12"]).is_ok());
    }
}
