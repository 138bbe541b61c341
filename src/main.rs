use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use drive_shuttle::config::TransferConfig;
use drive_shuttle::infrastructure::store;
use drive_shuttle::services::archive;
use drive_shuttle::services::transfer::TransferService;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Remote store backend (google_drive, local); overrides STORE_BACKEND
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a single file, zipped unless --no-compress is given
    UploadFile {
        path: PathBuf,
        #[arg(long)]
        no_compress: bool,
    },
    /// Zip a folder and upload the archive
    UploadFolder { dir: PathBuf },
    /// Download a file, unwrapping single-file zips unless --no-decompress is given
    DownloadFile {
        id: String,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        no_decompress: bool,
    },
    /// Download a zipped folder and extract it into a scratch directory
    DownloadFolder {
        id: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the entries of a local archive as JSON
    Inspect { archive: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Logs go to stderr; stdout carries ids and paths for scripts
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_shuttle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = TransferConfig::from_env();
    if let Some(backend) = args.backend {
        config.store_backend = backend;
    }

    if let Err(e) = run(args.command, config).await {
        error!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, config: TransferConfig) -> anyhow::Result<()> {
    match command {
        Command::Inspect { archive } => {
            let entries = archive::list_entries(&archive)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::UploadFile { path, no_compress } => {
            let service = transfer_service(config)?;
            let remote = service.upload_file(&path, !no_compress).await?;
            println!("{}", serde_json::to_string(&remote)?);
        }
        Command::UploadFolder { dir } => {
            let service = transfer_service(config)?;
            let remote = service.upload_folder(&dir).await?;
            println!("{}", serde_json::to_string(&remote)?);
        }
        Command::DownloadFile {
            id,
            output,
            no_decompress,
        } => {
            let service = transfer_service(config)?;
            let path = service
                .download_file(&id, output.as_deref(), !no_decompress)
                .await?;
            println!("{}", path.display());
        }
        Command::DownloadFolder { id, output } => {
            let service = transfer_service(config)?;
            let path = service.download_folder(&id, output.as_deref()).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Only the transfer commands build a store, so `inspect` runs without credentials
fn transfer_service(config: TransferConfig) -> anyhow::Result<TransferService> {
    info!(
        "🚀 Scratch root: {}, work dir: {}",
        config.scratch_root.display(),
        config.work_dir.display()
    );
    let store = store::setup_store(&config)?;
    Ok(TransferService::new(store, config))
}
