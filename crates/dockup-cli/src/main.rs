use anyhow::{bail, Context, Result};
use clap::Parser;
use dockup_core::backup_name::{backup_filename, current_timestamp, format_timestamp, parse_backup_filename};
use dockup_core::catalog;
use dockup_core::config::{FileConfig, Settings};
use dockup_core::router::{select_workflow, Workflow, WorkflowArgs};
use dockup_docker as docker;
use dockup_storage::{ObjectStore, StoreConfig};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "dockup", version, about = "Docker container backup and restore tool")]
struct Cli {
    /// Optional TOML config file
    #[arg(long, default_value = "dockup.toml")]
    config: String,

    /// Docker image name
    #[arg(long)]
    image_name: Option<String>,
    /// Docker container name, also the backup prefix
    #[arg(long)]
    container_name: Option<String>,
    /// Backup file name (default: generated from the container name)
    #[arg(long)]
    backup_file: Option<String>,
    /// S3 bucket name
    #[arg(long)]
    s3_bucket: Option<String>,

    /// Save a container backup
    #[arg(long)]
    save: bool,
    /// Pull the latest backup from S3
    #[arg(long)]
    pull: bool,
    /// Restore an image from the pulled backup
    #[arg(long)]
    restore: bool,
    /// Run the container after the operation
    #[arg(long)]
    run: bool,
    /// List available backups in S3
    #[arg(long)]
    list_backups: bool,

    /// Write the backup to a local tarball
    #[arg(long)]
    tar: bool,
    /// Upload the backup to S3
    #[arg(long)]
    aws: bool,

    /// Filter backups by date (YYYYMMDD)
    #[arg(long)]
    date: Option<String>,
    /// Download a specific backup file
    #[arg(long)]
    download_backup: Option<String>,
    /// Download every backup matching the date filter
    #[arg(long)]
    download_all: bool,

    /// Include a timestamp in backup and container names
    #[arg(long)]
    use_timestamp: bool,
    /// Remove the local backup file after a successful upload
    #[arg(long)]
    cleanup_local: bool,

    /// Verbose diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let file = FileConfig::load_optional(&cli.config)?;
    let settings = Settings::resolve(
        file,
        cli.image_name.clone(),
        cli.container_name.clone(),
        cli.s3_bucket.clone(),
    );

    let args = WorkflowArgs {
        save: cli.save,
        pull: cli.pull,
        restore: cli.restore,
        run: cli.run,
        list_backups: cli.list_backups,
        tar: cli.tar,
        aws: cli.aws,
        date: cli.date.clone(),
        download_backup: cli.download_backup.clone(),
        download_all: cli.download_all,
    };

    match select_workflow(&args) {
        Workflow::List => list_available_backups(&settings).await,
        Workflow::ByDate { date, download_all } => {
            download_by_date(&settings, &date, download_all).await
        }
        Workflow::Download { key } => {
            let store = connect_store(&settings).await?;
            download_one(&store, &key).await
        }
        Workflow::Save { tar, aws } => {
            save(
                &settings,
                tar,
                aws,
                cli.backup_file.as_deref(),
                cli.use_timestamp,
                cli.cleanup_local,
            )
            .await
        }
        Workflow::Pull { restore, run } => {
            pull_latest(&settings, restore, run, cli.use_timestamp).await
        }
        Workflow::Run => run_fresh(&settings),
        Workflow::Cycle => cycle(&settings, cli.backup_file.as_deref(), cli.use_timestamp),
    }
}

async fn connect_store(settings: &Settings) -> Result<ObjectStore> {
    let cloud = settings.cloud.as_ref();
    ObjectStore::connect(StoreConfig {
        bucket: settings.bucket.clone(),
        endpoint: cloud.map(|c| c.endpoint.clone()),
        region: cloud.and_then(|c| c.region.clone()),
        access_key: cloud.map(|c| c.access_key.clone()),
        secret_key: cloud.map(|c| c.secret_key.clone()),
    })
    .await
}

async fn list_available_backups(settings: &Settings) -> Result<()> {
    let store = connect_store(settings).await?;
    let keys = store.list().await?;
    let backups = catalog::sort_backups(&keys, Some(&settings.container));
    if backups.is_empty() {
        println!("No backups found in S3 bucket {}", settings.bucket);
        return Ok(());
    }
    println!("Available backups in S3 bucket {}:", settings.bucket);
    for (i, backup) in backups.iter().enumerate() {
        let (container, timestamp) = parse_backup_filename(backup);
        let date = match timestamp {
            Some(ts) => format_timestamp(&ts),
            None => "No timestamp".to_string(),
        };
        println!("{}. {} (Container: {}, Date: {})", i + 1, backup, container, date);
    }
    Ok(())
}

async fn download_by_date(settings: &Settings, date: &str, download_all: bool) -> Result<()> {
    catalog::ensure_date(date)?;
    let store = connect_store(settings).await?;
    let keys = store.list().await?;
    let backups = catalog::backups_on_date(&keys, Some(&settings.container), date);
    if backups.is_empty() {
        println!(
            "No backups found for container {} from date {}",
            settings.container, date
        );
        return Ok(());
    }

    println!("Found {} backups from {}:", backups.len(), date);
    for (i, backup) in backups.iter().enumerate() {
        println!("{}. {}", i + 1, backup);
    }

    if download_all {
        println!("Downloading all backups...");
        for backup in &backups {
            download_one(&store, backup).await?;
        }
    } else {
        println!("Use --download-backup <filename> to download a specific backup");
    }
    Ok(())
}

async fn download_one(store: &ObjectStore, key: &str) -> Result<()> {
    println!("Downloading {} from S3 bucket {}", key, store.bucket());
    store.download(key, Path::new(key)).await?;
    println!("Download completed successfully");
    Ok(())
}

async fn save(
    settings: &Settings,
    tar: bool,
    aws: bool,
    backup_file: Option<&str>,
    use_timestamp: bool,
    cleanup_local: bool,
) -> Result<()> {
    if !tar && !aws {
        bail!("--save requires --tar or --aws (or both)");
    }

    let backup_file = match backup_file {
        Some(name) if tar && !aws => name.to_string(),
        _ => backup_filename(&settings.container, use_timestamp, None),
    };

    if tar && aws {
        println!("Writing to tarball and AWS S3: {backup_file}");
    } else if tar {
        println!("Writing to tarball: {backup_file}");
    } else {
        println!("Writing to AWS S3: {backup_file}");
    }

    export_backup(settings, &backup_file)?;

    if aws {
        upload_backup(settings, &backup_file).await?;
        if !tar && cleanup_local {
            fs::remove_file(&backup_file)
                .with_context(|| format!("failed to remove local backup file {backup_file}"))?;
            println!("Removed local backup file {backup_file}");
        }
    }
    Ok(())
}

fn export_backup(settings: &Settings, backup_file: &str) -> Result<()> {
    println!(
        "Creating backup of container '{}' to {}",
        settings.container, backup_file
    );
    docker::export_container(&settings.container, backup_file)?;
    println!("Backup created successfully: {backup_file}");
    Ok(())
}

async fn upload_backup(settings: &Settings, backup_file: &str) -> Result<()> {
    let store = connect_store(settings).await?;
    println!("Uploading {} to S3 bucket {}", backup_file, store.bucket());
    store.upload(backup_file, Path::new(backup_file)).await?;
    println!("Upload completed successfully");
    Ok(())
}

async fn pull_latest(
    settings: &Settings,
    restore: bool,
    run: bool,
    use_timestamp: bool,
) -> Result<()> {
    let store = connect_store(settings).await?;
    let keys = store.list().await?;
    let latest = catalog::latest(&keys, Some(&settings.container));

    let new_name = if use_timestamp {
        format!("{}_{}", settings.container, current_timestamp())
    } else {
        settings.container.clone()
    };

    let Some(backup) = latest else {
        println!(
            "No backups found for container {} in bucket {}",
            settings.container, settings.bucket
        );
        if restore && run {
            println!("Pulling latest image from Docker Hub instead");
            start_detached(&settings.image, &new_name)?;
        }
        return Ok(());
    };

    println!("Found latest backup: {backup}");
    download_one(&store, &backup).await?;

    if restore {
        let image_tag = format!("{}:backup", settings.image);
        println!("Restoring from {backup}");
        docker::import_archive(&backup, &image_tag)?;
        println!("Restore completed successfully as {image_tag}");
        if run {
            start_detached(&image_tag, &new_name)?;
        }
    }
    Ok(())
}

fn run_fresh(settings: &Settings) -> Result<()> {
    if docker::container_exists(&settings.container) {
        bail!(
            "container {} already exists, use --save first",
            settings.container
        );
    }
    start_detached(&settings.image, &settings.container)
}

/// Default workflow: back up and replace an existing container, then run the
/// image attached under the target name. Export failure stops the sequence
/// before the container is removed.
fn cycle(settings: &Settings, backup_file: Option<&str>, use_timestamp: bool) -> Result<()> {
    if docker::container_exists(&settings.container) {
        let backup_file = match backup_file {
            Some(name) => name.to_string(),
            None => backup_filename(&settings.container, use_timestamp, None),
        };
        println!("Container {} exists. Creating backup.", settings.container);
        export_backup(settings, &backup_file)?;
        docker::remove_container(&settings.container)?;
        println!("Container deleted successfully");
    }
    println!("Running container '{}'", settings.container);
    docker::run_attached(&settings.image, &settings.container)
}

fn start_detached(image: &str, name: &str) -> Result<()> {
    println!("Running container '{name}' in detached mode");
    let container_id = docker::run_detached(image, name)?;
    println!("Container started with ID: {container_id}");
    println!("You can attach to it with: docker exec -it {name} /bin/bash");
    Ok(())
}
