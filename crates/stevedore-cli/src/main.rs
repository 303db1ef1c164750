mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stevedore_docker::ExecError;

#[derive(Parser)]
#[command(
    name = "stevedore",
    about = "Build, push, and deploy Docker images with a cached dependency layer"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the deps layer and build the image
    Build,
    /// Build the image and push it to the registry
    Push,
    /// Sync the deps layer and run docker-compose up --build
    Up,
    /// Deploy the stack to the docker-machine named by $deploy_name
    Deploy,
    /// Provision a docker-machine on the host at $ip
    #[command(name = "create_deploy", alias = "create-deploy")]
    CreateDeploy,
    /// Print the image tag
    #[command(name = "get_tag", alias = "get-tag")]
    GetTag,
    /// Print the full image reference (<repo>:<tag>)
    #[command(name = "get_img", alias = "get-img")]
    GetImg,
    /// Print the image repository
    #[command(name = "get_repo", alias = "get-repo")]
    GetRepo,
    /// Mirror dependency manifests into the deps layer without building
    #[command(name = "sync_deps", alias = "sync-deps")]
    SyncDeps,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="RUST_LOG unset or invalid falls back to the default info filter"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            exit_code(&e)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let ctx = commands::Context::load()?;

    match command {
        Commands::Build => commands::build(&ctx).await?,
        Commands::Push => commands::push(&ctx).await?,
        Commands::Up => commands::up(&ctx).await?,
        Commands::Deploy => commands::deploy(&ctx).await?,
        Commands::CreateDeploy => commands::create_deploy(&ctx).await?,
        Commands::GetTag => commands::get_tag(&ctx).await?,
        Commands::GetImg => commands::get_img(&ctx).await?,
        Commands::GetRepo => commands::get_repo(&ctx),
        Commands::SyncDeps => commands::sync_deps(&ctx)?,
    }

    Ok(())
}

/// Mirrors the exit code of a failed child process; 1 for everything else.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ExecError>())
        .and_then(ExecError::exit_code);

    match code {
        Some(c @ 1..=255) => ExitCode::from(c as u8),
        _ => ExitCode::FAILURE,
    }
}
