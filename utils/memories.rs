use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use memory_share::client::upload::DEFAULT_MAX_UPLOAD_BYTES;
use memory_share::client::{progress, CatalogApi, CatalogView, DeleteOutcome, KindFilter, PreparedFile, Session};
use memory_share::models::account::RegisterRequest;

#[derive(Parser)]
#[command(name = "memories", about = "Browse and manage the shared memory gallery")]
struct Cli {
    /// Server root URL
    #[arg(long, env = "MEMORIES_SERVER", default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Login {
    #[arg(long, env = "MEMORIES_EMAIL")]
    email: String,
    /// Prompted for when omitted
    #[arg(long, env = "MEMORIES_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// List memories, optionally filtered
    List {
        #[command(flatten)]
        login: Login,
        /// Case-insensitive text matched against titles and stored names
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = KindFilter::All)]
        kind: KindFilter,
    },
    /// Upload a photo or video
    Upload {
        #[command(flatten)]
        login: Login,
        path: PathBuf,
        /// Defaults to the file name without extension
        #[arg(long)]
        label: Option<String>,
    },
    /// Rename a memory and optionally replace its file
    Edit {
        #[command(flatten)]
        login: Login,
        id: i32,
        #[arg(long)]
        label: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a memory
    Delete {
        #[command(flatten)]
        login: Login,
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let api = CatalogApi::new(&cli.server)?;

    match cli.command {
        Command::Register { name, email } => {
            let password = rpassword::prompt_password("Password: ")?;
            let message = api
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("{}", message);
        }
        Command::List {
            login,
            search,
            kind,
        } => {
            let session = log_in(&api, login).await?;
            let mut view = CatalogView::new(api);
            view.refresh(&session).await;
            view.set_search(search);
            view.set_kind(kind);

            let visible = view.visible();
            if visible.is_empty() {
                println!("No memories found.");
            }
            for record in visible {
                println!(
                    "{:>5}  {:<5}  {:<32}  {:>10}  {}  {}",
                    record.id,
                    record.file_type,
                    record.title(),
                    record.display_size(),
                    record.display_date(),
                    record.file_path
                );
            }
            session.logout();
        }
        Command::Upload { login, path, label } => {
            let file = PreparedFile::read(&path, DEFAULT_MAX_UPLOAD_BYTES).await?;
            let label = label.unwrap_or_else(|| file.default_label());
            let session = log_in(&api, login).await?;
            let mut view = CatalogView::new(api);

            // Cosmetic only; the upload itself starts afterwards.
            progress::run(progress::TICK, progress::SETTLE, |percent| {
                eprint!("\rUploading... {:>3.0}%", percent);
            })
            .await;
            eprintln!();

            let message = view.request_upload(&session, &label, file).await?;
            println!("{}", message);
            session.logout();
        }
        Command::Edit {
            login,
            id,
            label,
            file,
        } => {
            let file = match file {
                Some(path) => Some(PreparedFile::read(&path, DEFAULT_MAX_UPLOAD_BYTES).await?),
                None => None,
            };
            let session = log_in(&api, login).await?;
            let mut view = CatalogView::new(api);
            let message = view.request_edit(&session, id, &label, file).await?;
            println!("{}", message);
            session.logout();
        }
        Command::Delete { login, id, yes } => {
            let session = log_in(&api, login).await?;
            let mut view = CatalogView::new(api);
            view.refresh(&session).await;

            let mut confirm = |prompt: &str| yes || ask(prompt);
            match view.request_delete(&session, id, &mut confirm).await? {
                DeleteOutcome::Deleted(message) => println!("{}", message),
                DeleteOutcome::Declined => println!("Nothing deleted."),
            }
            session.logout();
        }
    }

    Ok(())
}

async fn log_in(api: &CatalogApi, login: Login) -> anyhow::Result<Session> {
    let password = match login.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    Ok(api.login(&login.email, &password).await?)
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
