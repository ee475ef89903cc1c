use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use moussaillon_core::{ChatSession, Config, Provider, Resolution};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser)]
#[command(name = "moussaillon")]
#[command(about = "Talk to the moussAIllon boatyard backend in plain French or explicit API commands")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "MOUSSAILLON_URL", global = true)]
    url: Option<String>,

    /// AI provider used when a request needs interpretation (anthropic, openai)
    #[arg(long, env = "MOUSSAILLON_PROVIDER", global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Run a single request and print the reply
    Run {
        /// The request, e.g. "liste les clients" or "GET /clients"
        text: String,
    },
    /// Show how a request would be resolved, without calling the API
    Parse {
        text: String,
    },
    /// List the tools exposed by the MCP endpoint
    Tools,
    /// Save the default AI provider to the config file
    SetProvider {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.url {
        config.base_url = Some(url);
    }
    if let Some(name) = cli.provider {
        let provider = Provider::from_str(&name).ok_or_else(|| anyhow!("Unknown provider: {}", name))?;
        config.provider = Some(provider.as_str().to_string());
    }

    tracing::debug!(base_url = %config.base_url(), provider = config.provider().as_str(), "starting");
    let mut session = ChatSession::from_config(&config);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => repl::run(&mut session, &config.base_url()).await?,
        Commands::Run { text } => return run_once(&mut session, &text).await,
        Commands::Parse { text } => parse_only(&session, &text).await?,
        Commands::Tools => list_tools(&session).await?,
        Commands::SetProvider { name } => {
            Config::save_provider(&name)?;
            println!("Fournisseur IA par défaut: {}", name);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_once(session: &mut repl::Session, text: &str) -> Result<ExitCode> {
    session.initialize().await;
    repl::print_log(session.messages());

    let Some(outcome) = session.submit(text).await else {
        return Err(anyhow!("Empty request"));
    };
    println!("{}", outcome.reply);
    if let Some(destination) = outcome.destination {
        println!("→ {}", destination);
    }

    Ok(if outcome.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn parse_only(session: &repl::Session, text: &str) -> Result<()> {
    match session.dry_run(text).await? {
        Resolution::Execute(instruction) => {
            println!("{}", serde_json::to_string_pretty(&instruction)?);
        }
        Resolution::Reply(reply) => println!("{}", reply),
    }
    Ok(())
}

async fn list_tools(session: &repl::Session) -> Result<()> {
    let tools = session.list_tools().await?;
    if tools.is_empty() {
        println!("Aucun outil exposé.");
    }
    for tool in tools {
        let name = tool.get("name").and_then(|v| v.as_str()).unwrap_or("?");
        match tool.get("description").and_then(|v| v.as_str()) {
            Some(description) => println!("{}  {}", name, description),
            None => println!("{}", name),
        }
    }
    Ok(())
}
