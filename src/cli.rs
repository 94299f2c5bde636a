use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sessionward")]
#[command(about = "Authenticate against a token backend and make authorized requests", long_about = None)]
pub struct Args {
    #[arg(short = 'v', long = "verbose", global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        long = "api-endpoint",
        global = true,
        help = "Sign-in endpoint, absolute or relative to the application origin"
    )]
    pub api_endpoint: Option<String>,

    #[arg(
        long = "origin",
        global = true,
        help = "Application origin (e.g., https://app.example.com)"
    )]
    pub origin: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(help = "Identification (e.g., email)")]
        identification: String,

        #[arg(
            long = "password",
            env = "SESSIONWARD_PASSWORD",
            hide_env_values = true,
            help = "Password"
        )]
        password: String,
    },

    /// Invalidate the persisted session
    Logout,

    /// Show whether a session is active
    Status,

    /// Send a GET request, attaching credentials when the origin is trusted
    Request {
        #[arg(help = "Absolute URL or path relative to the application origin")]
        url: String,
    },
}
