//! # tlab CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tlab_cli::account::{
    run_enrollments, run_login, run_logout, run_register, run_whoami, EnrollmentsArgs, LoginArgs,
    RegisterArgs,
};
use tlab_cli::catalog::{
    run_activities, run_enroll, run_groups, run_performances, run_venues, run_workshops,
    ActivitiesArgs, EnrollArgs, GroupsArgs, WorkshopsArgs,
};
use tlab_cli::contact::{run_feedback, FeedbackArgs};
use tlab_cli::{exit_code_for, resolve_session_file, Context, EXIT_UNAUTHORIZED};

/// Terminal client for the Lebens Rhythmus booking API.
#[derive(Parser, Debug)]
#[command(name = "tlab", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// API base URL including `/api/v1`. Defaults to the production API.
    #[arg(long, global = true, env = "TLAB_API_BASE_URL")]
    api_url: Option<String>,

    /// Session file.
    #[arg(long, global = true, env = "TLAB_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print JSON instead of summaries.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session.
    Login(LoginArgs),
    /// Create an account and log in.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the profile of the logged-in user.
    Whoami,
    /// List workshops.
    Workshops(WorkshopsArgs),
    /// Enroll in a workshop.
    Enroll(EnrollArgs),
    /// List activities.
    Activities(ActivitiesArgs),
    /// List venues.
    Venues,
    /// List performances, soonest first.
    Performances,
    /// List course groups.
    Groups(GroupsArgs),
    /// List or cancel own enrollments.
    Enrollments(EnrollmentsArgs),
    /// Send feedback.
    Feedback(FeedbackArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            let code = exit_code_for(&e);
            if code == EXIT_UNAUTHORIZED {
                eprintln!("session expired; run `tlab login` again");
            }
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let session_file = resolve_session_file(cli.session_file.as_deref())?;
    let ctx = Context::new(cli.api_url.as_deref(), &session_file, cli.json)?;

    match &cli.command {
        Commands::Login(args) => run_login(&ctx, args).await,
        Commands::Register(args) => run_register(&ctx, args).await,
        Commands::Logout => run_logout(&ctx),
        Commands::Whoami => run_whoami(&ctx).await,
        Commands::Workshops(args) => run_workshops(&ctx, args).await,
        Commands::Enroll(args) => run_enroll(&ctx, args).await,
        Commands::Activities(args) => run_activities(&ctx, args).await,
        Commands::Venues => run_venues(&ctx).await,
        Commands::Performances => run_performances(&ctx).await,
        Commands::Groups(args) => run_groups(&ctx, args).await,
        Commands::Enrollments(args) => run_enrollments(&ctx, args).await,
        Commands::Feedback(args) => run_feedback(&ctx, args).await,
    }
}
