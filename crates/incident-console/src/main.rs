use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use incident_ai::AiClient;
use incident_console::{
    parse_assignment, IncidentApiClient, IncidentConsole, ResultView, Workbench,
};
use incident_core::Settings;
use incident_gate::{AuthGate, GateView, TokenCacheProvider};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    let settings = Settings::from_env().context("invalid configuration")?;

    let cache = settings
        .identity
        .token_cache
        .clone()
        .unwrap_or_else(default_token_cache);
    let provider = TokenCacheProvider::new(&settings.identity).with_cache_path(cache);
    let mut gate = AuthGate::new(provider, &settings.identity);

    match matches.subcommand() {
        Some(("login", sub)) => login(&mut gate, sub).await,
        Some(("logout", _)) => {
            let origin = gate.sign_out().await?;
            println!("Signed out. Continue at {origin}");
            Ok(())
        }
        Some(("whoami", _)) => {
            gate.initialize().await?;
            require_authorized(&gate)?;
            if let Some(user) = gate.user() {
                println!("Signed in as: {}", user.display_name());
            }
            Ok(())
        }
        Some((command, sub)) => {
            gate.initialize().await?;
            require_authorized(&gate)?;

            let mut console = IncidentConsole::new(
                IncidentApiClient::new(&settings.server.api_base_url),
                AiClient::new(settings.ai.clone()),
                Workbench::new(settings.database.fields.clone()),
            );
            run_incident_command(&mut console, command, sub).await
        }
        None => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn cli() -> Command {
    let number = Arg::new("incident")
        .required(true)
        .help("Incident number");
    let assignments = Arg::new("set")
        .long("set")
        .action(ArgAction::Append)
        .value_name("FIELD=VALUE")
        .help("Change a field before processing");

    Command::new("incident-console")
        .version(incident_core::VERSION)
        .about("Look up, edit and process incidents")
        .subcommand(
            Command::new("login").about("Sign in with an ID token").arg(
                Arg::new("id-token")
                    .long("id-token")
                    .help("ID token; read from stdin when omitted"),
            ),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the token cache"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("show")
                .about("Show an incident and its combined text")
                .arg(number.clone()),
        )
        .subcommand(
            Command::new("update")
                .about("Update incident fields")
                .arg(number.clone())
                .arg(
                    Arg::new("assignments")
                        .required(true)
                        .num_args(1..)
                        .value_name("FIELD=VALUE"),
                ),
        )
        .subcommand(
            Command::new("process")
                .about("Process an incident's combined text with AI")
                .arg(number)
                .arg(assignments),
        )
}

async fn login(gate: &mut AuthGate<TokenCacheProvider>, sub: &ArgMatches) -> anyhow::Result<()> {
    let token = match sub.get_one::<String>("id-token") {
        Some(token) => token.clone(),
        None => {
            eprint!("Paste ID token: ");
            std::io::stderr().flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    gate.provider().supply_token(token);
    gate.login().await?;
    require_authorized(gate)
}

fn require_authorized(gate: &AuthGate<TokenCacheProvider>) -> anyhow::Result<()> {
    match gate.view() {
        GateView::Protected(user) => {
            tracing::debug!("Authorized as {}", user.display_name());
            Ok(())
        }
        GateView::AccessDenied { policy, user } => bail!(
            "Access restricted: {} is authenticated but not authorized. {}",
            user.display_name(),
            policy
        ),
        GateView::LoginPrompt | GateView::Loading => {
            bail!("You need to sign in first: incident-console login")
        }
    }
}

async fn run_incident_command(
    console: &mut IncidentConsole,
    command: &str,
    sub: &ArgMatches,
) -> anyhow::Result<()> {
    let number = sub
        .get_one::<String>("incident")
        .context("incident number is required")?;

    console.lookup(number).await?;
    fail_on_error(console);

    let assignments: Vec<&String> = match command {
        "update" => sub.get_many::<String>("assignments").into_iter().flatten().collect(),
        "process" => sub.get_many::<String>("set").into_iter().flatten().collect(),
        _ => Vec::new(),
    };
    for arg in assignments {
        let (field, value) = parse_assignment(arg)?;
        console.edit(&field, value)?;
    }

    match command {
        "update" => {
            console.save().await?;
            fail_on_error(console);
            print_incident(console.workbench());
        }
        "process" => {
            console.process().await?;
            fail_on_error(console);
            if let ResultView::Result(text) = console.workbench().result_view() {
                println!("{text}");
            }
        }
        _ => print_incident(console.workbench()),
    }
    Ok(())
}

fn fail_on_error(console: &IncidentConsole) {
    if let Some(error) = console.workbench().error() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn print_incident(workbench: &Workbench) {
    if let Some(number) = workbench.incident_number() {
        println!("Incident {number}");
        println!();
    }
    println!("{}", workbench.combined_text());
}

fn default_token_cache() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".incident-console")
        .join("id_token")
}
