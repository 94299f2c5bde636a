use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

use sessionward::cli::{Args, Command};
use sessionward::config::AuthConfig;
use sessionward::models::field_as_string;
use sessionward::{
    AuthError, AuthorizedClient, Credentials, FilesystemStore, OriginMatcher, RequestInterceptor,
    ReqwestTransport, Session, SessionHandle, TokenAuthenticator, TokenAuthorizer, Transport,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Load configuration
    let config = match AuthConfig::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    let authenticator = Arc::new(TokenAuthenticator::new(config.token.clone(), transport));
    let store = FilesystemStore::new(&config.store_path);
    let _watcher = store.watch(config.sync_interval);
    let session = Session::start(authenticator, Arc::new(store)).await;

    let result = match args.command {
        Command::Login {
            identification,
            password,
        } => login(&session, Credentials::new(identification, password)).await,
        Command::Logout => logout(&session).await,
        Command::Status => {
            status(&session, &config).await;
            Ok(())
        }
        Command::Request { url } => request(&session, &config, &url).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red(), e.reason());
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn login(session: &SessionHandle, credentials: Credentials) -> sessionward::Result<()> {
    session.authenticate(&credentials).await?;
    println!(
        "{}",
        format!("Signed in as {}.", credentials.identification).green()
    );
    Ok(())
}

async fn logout(session: &SessionHandle) -> sessionward::Result<()> {
    match session.invalidate().await {
        Ok(()) => {
            println!("{}", "Signed out.".green());
            Ok(())
        }
        Err(AuthError::NotAuthenticated) => {
            println!("{}", "No active session.".yellow());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn status(session: &SessionHandle, config: &AuthConfig) {
    let state = session.state().await;
    if !state.is_authenticated {
        println!("{}", "Not authenticated.".dimmed());
        return;
    }

    let identification =
        field_as_string(&state.data, &config.token.identification_attribute_name)
            .unwrap_or_else(|| "unknown".to_string());
    println!("{} {}", "Authenticated as".green(), identification.bold());
    println!(
        "{}",
        format!("Session file: {}", config.store_path.display()).dimmed()
    );
}

async fn request(
    session: &SessionHandle,
    config: &AuthConfig,
    target: &str,
) -> sessionward::Result<()> {
    let matcher = OriginMatcher::new(&config.application_origin, &config.cross_origin_whitelist)?;
    let base = Url::parse(matcher.application_origin())
        .map_err(|e| AuthError::ConfigError(format!("Invalid application origin: {}", e)))?;
    let url = base
        .join(target)
        .map_err(|e| AuthError::Other(format!("Invalid URL '{}': {}", target, e)))?;

    let attaching = matcher.is_trusted(url.as_str()) && session.is_authenticated().await;
    let interceptor = RequestInterceptor::new(
        matcher,
        Arc::new(TokenAuthorizer::from_options(&config.token)),
        Arc::clone(session.session()),
    );
    let client = AuthorizedClient::new(reqwest::Client::new(), interceptor);

    let response = client.send(client.get(url.clone())).await?;
    let status = response.status();
    let body = response.text().await?;

    let status_line = format!("{} {}", status.as_u16(), url);
    if status.is_success() {
        println!("{}", status_line.green());
    } else {
        println!("{}", status_line.red());
    }
    if attaching {
        eprintln!("{}", "(credentials attached)".dimmed());
    }
    println!("{}", body);
    Ok(())
}
