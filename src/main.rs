use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use kulturkampf::config::{ClientConfig, ConfigError};
use kulturkampf::guard::{self, GuardDecision, Route};
use kulturkampf::net::content::ContentApi;
use kulturkampf::net::error::ApiError;
use kulturkampf::net::http::ApiClient;
use kulturkampf::report;
use kulturkampf::session::{AuthFailure, SessionManager};
use kulturkampf::store::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message_or(kulturkampf::net::error::MSG_UNEXPECTED))]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    #[error("sessão não autenticada; faça login em {0}")]
    NotAuthenticated(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "kulturkampf", about = "KulturKampf hub client")]
struct Cli {
    /// Backend origin; overrides `KK_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Token file; overrides `KK_CREDENTIALS_FILE`.
    #[arg(long)]
    credentials_file: Option<PathBuf>,

    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "KK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        username: String,
        email: String,
        #[arg(long, env = "KK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Confirmation; must equal `--password`.
        #[arg(long)]
        password2: String,
    },
    Logout,
    Whoami,
    Profiles,
    Posts,
    Metrics {
        /// Sum posts across authors per month.
        #[arg(long)]
        by_month: bool,
    },
    Stats,
}

impl Command {
    fn route(&self) -> Route {
        match self {
            Self::Login { .. } | Self::Logout | Self::Whoami => Route::Login,
            Self::Register { .. } => Route::Register,
            Self::Profiles => Route::Profiles,
            Self::Posts => Route::Posts,
            Self::Metrics { .. } => Route::Metrics,
            Self::Stats => Route::Home,
        }
    }
}

struct CliContext {
    session: Arc<SessionManager>,
    content: ContentApi,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = cli.credentials_file {
        config.credentials_path = path;
    }

    let client = Arc::new(ApiClient::new(&config)?);
    tracing::debug!(base_url = client.base_url(), "api client ready");
    let store = Arc::new(FileStore::new(config.credentials_path.clone()));
    let session = SessionManager::start(client.clone(), store);
    let ctx = CliContext { session, content: ContentApi::new(client), json: cli.json };

    if let GuardDecision::Redirect(to) = guard::resolve(&ctx.session, cli.command.route()).await {
        return Err(CliError::NotAuthenticated(to));
    }

    match cli.command {
        Command::Login { username, password } => run_login(&ctx, &username, &password).await,
        Command::Register { username, email, password, password2 } => {
            run_register(&ctx, &username, &email, &password, &password2).await
        }
        Command::Logout => {
            ctx.session.logout().await;
            println!("sessão encerrada");
            Ok(())
        }
        Command::Whoami => run_whoami(&ctx),
        Command::Profiles => run_profiles(&ctx).await,
        Command::Posts => run_posts(&ctx).await,
        Command::Metrics { by_month } => run_metrics(&ctx, by_month).await,
        Command::Stats => run_stats(&ctx).await,
    }
}

async fn run_login(ctx: &CliContext, username: &str, password: &str) -> Result<(), CliError> {
    let user = ctx.session.login(username, password).await?;
    println!("bem-vindo, {}", user.username);
    Ok(())
}

async fn run_register(
    ctx: &CliContext,
    username: &str,
    email: &str,
    password: &str,
    password2: &str,
) -> Result<(), CliError> {
    let user = ctx.session.register(username, email, password, password2).await?;
    println!("conta criada: {}", user.username);
    Ok(())
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    match ctx.session.user() {
        Some(user) if ctx.json => print_json(&user),
        Some(user) => {
            match user.field("email").and_then(|v| v.as_str()) {
                Some(email) => println!("{} <{email}>", user.username),
                None => println!("{}", user.username),
            }
            Ok(())
        }
        None => {
            println!("anônimo");
            Ok(())
        }
    }
}

async fn run_profiles(ctx: &CliContext) -> Result<(), CliError> {
    let profiles = ctx.content.profiles().await?;
    if ctx.json {
        return print_json(&profiles);
    }
    if profiles.is_empty() {
        println!("Nenhum perfil cadastrado ainda.");
    }
    for profile in &profiles {
        let topics = profile.topicos_lista.join(", ");
        println!("{}\t{} posts\t{topics}", profile.nick, profile.total_posts);
    }
    Ok(())
}

async fn run_posts(ctx: &CliContext) -> Result<(), CliError> {
    let posts = ctx.content.posts().await?;
    if ctx.json {
        return print_json(&posts);
    }
    if posts.is_empty() {
        println!("Nenhuma postagem cadastrada ainda.");
    }
    for post in &posts {
        println!(
            "{}\t{}\t{}\t{}",
            report::format_publish_date(&post.publish_date),
            post.platform.label(),
            post.profile_nick,
            post.title
        );
    }
    Ok(())
}

async fn run_metrics(ctx: &CliContext, by_month: bool) -> Result<(), CliError> {
    let metrics = ctx.content.metrics().await?;
    let points = report::chart_points(&metrics);

    if by_month {
        let totals = report::aggregate_by_month(&points);
        if ctx.json {
            return print_json(&totals);
        }
        for total in &totals {
            println!("{}\t{}", total.label, total.posts);
        }
        return Ok(());
    }

    if ctx.json {
        return print_json(&points);
    }
    if metrics.is_empty() {
        println!("Nenhuma métrica registrada ainda.");
    }
    let mut sorted: Vec<_> = metrics.iter().collect();
    sorted.sort_by(|a, b| a.month.cmp(&b.month));
    for metric in sorted {
        println!("{}", report::metric_summary(metric));
    }
    Ok(())
}

async fn run_stats(ctx: &CliContext) -> Result<(), CliError> {
    let stats = ctx.content.stats().await?;
    if ctx.json {
        return print_json(&stats);
    }
    println!("perfis\t{}", stats.profiles);
    println!("postagens\t{}", stats.posts);
    println!("métricas\t{}", stats.metrics);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
