//! Operator console: registration backfill, member listings, profile
//! administration and image uploads against the configured stores.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
#![expect(
    clippy::print_stdout,
    reason = "console subcommands report their results on stdout"
)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Report, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use ecoclub_console::config::ConsoleSettings;
use ecoclub_console::domain::asset_upload::{
    AssetUploader, CandidateFile, UploadConfigSource, UploadConstraints,
};
use ecoclub_console::domain::directory_query::{
    DEFAULT_EXPORT_ENTITY, DirectoryQuery, DirectoryStats, DirectoryView, RoleFilter,
    SortDirection, SortKey, SortState, export_csv, export_filename_now,
};
use ecoclub_console::domain::ports::RecordStore;
use ecoclub_console::domain::{
    AdminProfileEdit, ProfileCompletionService, ProfileSubmission, ReconciliationJob, Role,
    SiteBootstrap, SiteContentPatch, SiteContentService, UserDirectory, UserId,
};
use ecoclub_console::outbound::cloudinary::CloudinaryHttpTransport;
use ecoclub_console::outbound::document_store::JsonFileRecordStore;
use ecoclub_console::outbound::local_fs::open_parent;
use ecoclub_console::outbound::upload_override::JsonFileUploadOverrideStore;

/// `ecoclub-console` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "ecoclub-console",
    about = "Administer Eco Club members, registrations and site assets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Copy missing mobile/batch values from member profiles into registrations.
    Reconcile,
    /// List members, optionally filtered, sorted and exported as CSV.
    Users(UsersArgs),
    /// Print member totals and the batch breakdown.
    Stats,
    /// Upload an image and print its public URL.
    Upload(UploadArgs),
    /// Update the locally persisted image host override.
    UploadConfig(UploadConfigArgs),
    /// Create a member profile on first sign-in.
    CompleteProfile(CompleteProfileArgs),
    /// Apply an administrator edit to a member profile.
    EditUser(EditUserArgs),
    /// Promote the operator to admin and initialise site content.
    Bootstrap {
        /// Uid of the operator's own profile.
        #[arg(long)]
        uid: String,
    },
    /// Change public site content fields.
    SiteContent(SiteContentArgs),
}

#[derive(Debug, Args)]
struct UsersArgs {
    /// Case-insensitive search over name, email, mobile and batch.
    #[arg(long)]
    search: Option<String>,
    /// `all`, `student`, `admin` or `secretary`.
    #[arg(long, default_value = "all")]
    role: RoleFilter,
    /// Column to sort by.
    #[arg(long)]
    sort: Option<SortKey>,
    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    descending: bool,
    /// Write the listing as CSV into this directory.
    #[arg(long, value_name = "dir")]
    export_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    /// Image file to upload.
    file: PathBuf,
    /// Destination folder; defaults to the configured upload folder.
    #[arg(long)]
    folder: Option<String>,
}

#[derive(Debug, Args)]
struct UploadConfigArgs {
    #[arg(long)]
    cloud_account: Option<String>,
    #[arg(long)]
    upload_preset: Option<String>,
}

#[derive(Debug, Args)]
struct CompleteProfileArgs {
    #[arg(long)]
    uid: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    mobile: String,
    #[arg(long)]
    batch: String,
    #[arg(long)]
    avatar: Option<String>,
}

#[derive(Debug, Args)]
struct EditUserArgs {
    #[arg(long)]
    uid: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
    #[arg(long)]
    batch: Option<String>,
    #[arg(long)]
    role: Option<Role>,
    #[arg(long)]
    department: Option<String>,
}

#[derive(Debug, Args)]
struct SiteContentArgs {
    #[arg(long)]
    hero_title: Option<String>,
    #[arg(long)]
    hero_subtitle: Option<String>,
    #[arg(long)]
    history: Option<String>,
    #[arg(long)]
    mission: Option<String>,
    #[arg(long)]
    background_image: Option<String>,
    #[arg(long)]
    favicon: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ConsoleSettings::load_from_iter([OsString::from("ecoclub-console")])
        .map_err(|error| eyre!("failed to load console settings: {error}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build console runtime")?;
    runtime.block_on(run(cli.command, settings))
}

async fn run(command: Command, settings: ConsoleSettings) -> Result<()> {
    match command {
        Command::Upload(args) => upload(args, &settings).await,
        Command::UploadConfig(args) => upload_config(args, &settings),
        Command::Reconcile => reconcile(open_store(&settings)?).await,
        Command::Users(args) => users(args, open_store(&settings)?).await,
        Command::Stats => stats(open_store(&settings)?).await,
        Command::CompleteProfile(args) => complete_profile(args, open_store(&settings)?).await,
        Command::EditUser(args) => edit_user(args, open_store(&settings)?).await,
        Command::Bootstrap { uid } => bootstrap(&uid, open_store(&settings)?).await,
        Command::SiteContent(args) => site_content(args, open_store(&settings)?).await,
    }
}

fn open_store(settings: &ConsoleSettings) -> Result<Arc<dyn RecordStore>> {
    let store_path = settings.store_path();
    let store = JsonFileRecordStore::open(&store_path)
        .wrap_err_with(|| format!("failed to open record store {}", store_path.display()))?;
    Ok(Arc::new(store))
}

async fn reconcile(store: Arc<dyn RecordStore>) -> Result<()> {
    let tally = ReconciliationJob::new(store)
        .run()
        .await
        .wrap_err("registration backfill failed")?;
    println!("succeeded={}", tally.succeeded);
    println!("skipped={}", tally.skipped);
    println!("failed={}", tally.failed);
    Ok(())
}

async fn users(args: UsersArgs, store: Arc<dyn RecordStore>) -> Result<()> {
    let records = UserDirectory::new(store)
        .load_all()
        .await
        .wrap_err("failed to load members")?;

    let mut query = DirectoryQuery::new().with_role_filter(args.role);
    if let Some(term) = args.search {
        query = query.with_term(term);
    }
    if let Some(key) = args.sort {
        let direction = if args.descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        query = query.with_sort(SortState { key, direction });
    }

    let view = DirectoryView::new(&records, &query);
    for record in view.records() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            record.uid(),
            record.name(),
            record.email(),
            record.batch().unwrap_or("-"),
            record.role()
        );
    }
    println!("{}", view.summary());

    if let Some(dir) = args.export_dir {
        let csv = export_csv(view.records().iter().copied()).wrap_err("failed to encode CSV")?;
        let file_name = export_filename_now(DEFAULT_EXPORT_ENTITY, &DefaultClock);
        write_file(&dir, &file_name, csv.as_bytes())?;
        println!("exported={}", dir.join(file_name).display());
    }
    Ok(())
}

async fn stats(store: Arc<dyn RecordStore>) -> Result<()> {
    let records = UserDirectory::new(store)
        .load_all()
        .await
        .wrap_err("failed to load members")?;
    let stats = DirectoryStats::compute(&records);
    println!("total={}", stats.total);
    println!("admins={}", stats.admins);
    for entry in stats.batch_breakdown() {
        println!("batch {}={}", entry.label, entry.count);
    }
    Ok(())
}

async fn complete_profile(args: CompleteProfileArgs, store: Arc<dyn RecordStore>) -> Result<()> {
    let uid = UserId::new(args.uid).map_err(|error| eyre!("invalid uid: {error}"))?;
    let submission = ProfileSubmission {
        name: args.name,
        email: args.email,
        mobile: args.mobile,
        batch: args.batch,
        avatar: args.avatar,
    };
    let outcome = ProfileCompletionService::new(store)
        .complete(uid, &submission)
        .await
        .wrap_err("profile completion failed")?;
    println!("outcome={outcome:?}");
    Ok(())
}

async fn edit_user(args: EditUserArgs, store: Arc<dyn RecordStore>) -> Result<()> {
    let uid = UserId::new(args.uid).map_err(|error| eyre!("invalid uid: {error}"))?;
    let edit = AdminProfileEdit {
        name: args.name,
        mobile: args.mobile,
        batch: args.batch,
        role: args.role,
        department: args.department,
    };
    UserDirectory::new(store)
        .apply_admin_edit(&uid, &edit)
        .await
        .wrap_err("profile edit failed")?;
    println!("updated={}", edit.field_names().join(","));
    Ok(())
}

async fn bootstrap(raw_uid: &str, store: Arc<dyn RecordStore>) -> Result<()> {
    let uid = UserId::new(raw_uid).map_err(|error| eyre!("invalid uid: {error}"))?;
    let report = SiteBootstrap::new(store)
        .run(&uid)
        .await
        .wrap_err("bootstrap failed")?;
    println!("admin={uid}");
    println!("content_initialised={}", report.content_initialised);
    Ok(())
}

async fn site_content(args: SiteContentArgs, store: Arc<dyn RecordStore>) -> Result<()> {
    let patch = SiteContentPatch {
        hero_title: args.hero_title,
        hero_subtitle: args.hero_subtitle,
        history: args.history,
        mission: args.mission,
        social_links: None,
        background_image: args.background_image,
        favicon: args.favicon,
    };
    SiteContentService::new(store)
        .apply_patch(&patch)
        .await
        .wrap_err("site content update failed")?;
    Ok(())
}

fn build_uploader(settings: &ConsoleSettings) -> Result<AssetUploader> {
    let base_url = settings.upload_base_url()?;
    let transport = CloudinaryHttpTransport::new(base_url, settings.upload_timeout())
        .wrap_err("failed to build image host client")?;
    Ok(AssetUploader::new(
        Arc::new(transport),
        settings.upload_source(),
        Arc::new(JsonFileUploadOverrideStore::new(settings.override_path())),
    ))
}

async fn upload(args: UploadArgs, settings: &ConsoleSettings) -> Result<()> {
    let file = read_candidate(&args.file)?;
    let constraints =
        UploadConstraints::with_folder(args.folder.as_deref().unwrap_or(settings.upload_folder()));
    let url = build_uploader(settings)?
        .upload(&file, &constraints)
        .await
        .map_err(|error| {
            let message = error.user_message();
            Report::new(error).wrap_err(message)
        })?;
    println!("{url}");
    Ok(())
}

fn upload_config(args: UploadConfigArgs, settings: &ConsoleSettings) -> Result<()> {
    let saved = build_uploader(settings)?
        .save_override(UploadConfigSource::new(args.cloud_account, args.upload_preset))
        .wrap_err("failed to save upload override")?;
    println!(
        "cloud_account={}",
        saved.cloud_account.as_deref().unwrap_or("-")
    );
    println!(
        "upload_preset={}",
        saved.upload_preset.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn read_candidate(path: &Path) -> Result<CandidateFile> {
    let (dir, file_name) =
        open_parent(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let bytes = dir
        .read(&file_name)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(CandidateFile::new(
        file_name.to_string_lossy(),
        mime_type.essence_str(),
        bytes,
    ))
}

fn write_file(dir: &Path, file_name: &str, contents: &[u8]) -> Result<()> {
    let directory = Dir::open_ambient_dir(dir, ambient_authority())
        .wrap_err_with(|| format!("failed to open export directory {}", dir.display()))?;
    directory
        .write(file_name, contents)
        .wrap_err_with(|| format!("failed to write {file_name}"))
}
