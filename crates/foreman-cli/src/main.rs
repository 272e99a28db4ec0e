//! Foreman CLI: entry point.

use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use foreman_cli::commands::{self, SearchKind};
use foreman_cli::config::{resolve_settings, ConnectionArgs};
use foreman_client::{ForemanClient, RetryPolicy};

#[derive(Parser)]
#[command(
    name = "foreman",
    about = "Search Foreman resources and manage hosts over the REST API",
    version
)]
struct Cli {
    /// Foreman server host name. Also reads FOREMAN_HOST.
    #[arg(long, global = true)]
    host: Option<String>,

    /// API user. Also reads FOREMAN_USER.
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// API password. Also reads FOREMAN_PASSWORD.
    #[arg(long, global = true)]
    password: Option<String>,

    /// Validate the server certificate (off by default).
    /// Also reads FOREMAN_VERIFY_TLS.
    #[arg(long, global = true)]
    verify_tls: bool,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Override the API base URL (default: https://<host>/api/).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Fail searches on the first error instead of backing off 5s/15s/60s.
    #[arg(long, global = true)]
    no_retry: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a resource whose title or name equals the query.
    #[command(group(ArgGroup::new("variant").args(["name", "any"])))]
    Search {
        /// Resource collection, e.g. hosts or hostgroups.
        resource: String,

        /// Query text.
        query: String,

        /// Ask the server for a substring match on the name first.
        #[arg(long)]
        name: bool,

        /// Print every match instead of a single exact one.
        #[arg(long)]
        any: bool,
    },

    /// GET an API path and print the response.
    Get {
        /// Path relative to the API root, e.g. status or hosts/42.
        path: String,
    },

    /// Create a host in build mode and print its id.
    CreateHost {
        #[arg(long)]
        hostgroup_id: u64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        mac: String,
    },

    /// Delete a host by id.
    DeleteHost {
        id: String,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   foreman completions bash > ~/.local/share/bash-completion/completions/foreman
    ///   foreman completions zsh > ~/.zfunc/_foreman
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "foreman", &mut std::io::stdout());
        return Ok(());
    }

    let args = ConnectionArgs {
        host: cli.host,
        user: cli.user,
        password: cli.password,
        verify_tls: cli.verify_tls,
        timeout_secs: cli.timeout,
        base_url: cli.base_url,
    };
    let settings = resolve_settings(&args)?;
    tracing::debug!(host = %settings.host, user = %settings.user, verify_tls = settings.verify_tls, "Resolved settings");

    let mut client = ForemanClient::new(settings.to_client_config()?)?;
    if cli.no_retry {
        client = client.with_retry_policy(RetryPolicy::none());
    }

    let outcome = match cli.command {
        Commands::Search {
            resource,
            query,
            name,
            any,
        } => {
            let kind = if any {
                SearchKind::Any
            } else if name {
                SearchKind::Name
            } else {
                SearchKind::Exact
            };
            commands::search(&client, kind, &resource, &query).and_then(print_json)
        }
        Commands::Get { path } => commands::get(&client, &path).and_then(print_json),
        Commands::CreateHost {
            hostgroup_id,
            name,
            mac,
        } => commands::create_host(&client, hostgroup_id, &name, &mac).map(|id| println!("{id}")),
        Commands::DeleteHost { id } => {
            commands::delete_host(&client, &id).map(|()| println!("Deleted host {id}"))
        }
        Commands::Completions { .. } => Ok(()),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn print_json(value: serde_json::Value) -> foreman_client::ForemanResult<()> {
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| foreman_client::ForemanError::Encode(e.to_string()))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_variants_conflict() {
        let parsed = Cli::try_parse_from(["foreman", "search", "hosts", "web01", "--name", "--any"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "foreman", "get", "status", "--host", "foreman.example.com", "--no-retry",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("foreman.example.com"));
        assert!(cli.no_retry);
        assert!(matches!(cli.command, Commands::Get { ref path } if path == "status"));
    }
}
