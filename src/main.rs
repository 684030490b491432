use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use taskdesk::application::{Confirmer, Notifier, TaskListController};
use taskdesk::config::TaskDeskConfig;
use taskdesk::core::form::StagedFile;
use taskdesk::core::task::{Task, TaskId};
use taskdesk::core::view::{SortOrder, TaskFilter};
use taskdesk::message::{FormMessage, Notice};
use taskdesk::sync::{self, CredentialProvider, HttpTaskGateway, KeyringCredentials, StaticToken};

#[derive(Parser)]
#[command(name = "taskdesk", version, about = "Manage tasks on a remote todo server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tasks sorted by due date
    List {
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        #[arg(long, default_value = "ascending")]
        sort: SortOrder,
    },
    /// List assignable persons
    Persons,
    /// Create a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Local date-time, YYYY-MM-DDTHH:MM
        #[arg(long)]
        due: String,
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        completed: bool,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Change fields of an existing task
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        /// Person id, or an empty string to unassign
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Flip a task between pending and completed
    Toggle { id: TaskId },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Store an API token in the system keyring
    Login { token: String },
    /// Remove the stored API token
    Logout,
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Info(text) => println!("{}", text),
            Notice::Error(text) => eprintln!("{}", text),
        }
    }
}

struct PromptConfirmer {
    assume_yes: bool,
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn init_logging() {
    // Log to the systemd user journal (`journalctl --user -t taskdesk -f`).
    // taskdesk targets at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("taskdesk") {
                let max = if taskdesk::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => {
            let journal = journal.with_syslog_identifier("taskdesk".to_string());
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                // Global max must be Debug so taskdesk debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
        Err(e) => eprintln!("Journal logging unavailable: {}", e),
    }
}

fn print_task(task: &Task) {
    let id = task.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:>5}  [{}]  {}  due {}",
        id,
        task.status_label(),
        task.title,
        task.due_label()
    );
    if let Some(name) = task.person_name.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(&format!("  @{}", name));
    }
    if task.number_of_attachments > 0 {
        line.push_str(&format!("  {} file(s)", task.number_of_attachments));
    }
    println!("{}", line);
    if !task.description.is_empty() {
        println!("       {}", task.description);
    }
    let names = task.attachment_names();
    if !names.is_empty() {
        println!("       attachments: {}", names.join(", "));
    }
}

async fn stage(paths: &[PathBuf]) -> Result<Vec<StagedFile>, String> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(StagedFile::from_path(path).await?);
    }
    Ok(files)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();
    let config = TaskDeskConfig::load();
    taskdesk::set_debug_logging(config.debug_logging);

    let server = config.keyring_server().to_string();
    let credentials: Arc<dyn CredentialProvider> = match TaskDeskConfig::env_token() {
        Some(token) => Arc::new(StaticToken(token)),
        None => Arc::new(KeyringCredentials::new(server.clone())),
    };
    let gateway = HttpTaskGateway::new(&config.api_url, credentials)?;
    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let mut controller = TaskListController::new(gateway, ConsoleNotifier, PromptConfirmer { assume_yes });

    match cli.command {
        Command::List { filter, sort } => {
            controller.mount().await?;
            controller.set_filter(filter);
            controller.set_sort_order(sort);
            let visible = controller.visible_tasks();
            if visible.is_empty() {
                println!("No tasks found.");
            }
            for task in visible {
                print_task(task);
            }
        }
        Command::Persons => {
            controller.load_persons().await?;
            for person in controller.persons() {
                println!("{:>5}  {}", person.id, person.name);
            }
        }
        Command::Add { title, description, due, person, completed, files } => {
            controller.apply(FormMessage::TitleChanged(title));
            controller.apply(FormMessage::DescriptionChanged(description));
            controller.apply(FormMessage::DueDateChanged(due));
            controller.apply(FormMessage::PersonSelected(person.unwrap_or_default()));
            controller.apply(FormMessage::CompletedChanged(Some(completed)));
            controller.apply(FormMessage::FilesSelected(stage(&files).await?));
            let task = controller.submit().await?;
            print_task(&task);
        }
        Command::Edit { id, title, description, due, person, completed, files } => {
            controller.mount().await?;
            controller.begin_edit(id)?;
            if let Some(title) = title {
                controller.apply(FormMessage::TitleChanged(title));
            }
            if let Some(description) = description {
                controller.apply(FormMessage::DescriptionChanged(description));
            }
            if let Some(due) = due {
                controller.apply(FormMessage::DueDateChanged(due));
            }
            if let Some(person) = person {
                controller.apply(FormMessage::PersonSelected(person));
            }
            if let Some(completed) = completed {
                controller.apply(FormMessage::CompletedChanged(Some(completed)));
            }
            if !files.is_empty() {
                controller.apply(FormMessage::FilesSelected(stage(&files).await?));
            }
            let task = controller.submit().await?;
            print_task(&task);
        }
        Command::Toggle { id } => {
            controller.mount().await?;
            let task = controller.toggle_complete(id).await?;
            print_task(&task);
        }
        Command::Delete { id, .. } => {
            controller.delete(id).await?;
        }
        Command::Login { token } => {
            sync::keyring::store_token(&server, &token).await?;
            println!("Token stored for {}", server);
        }
        Command::Logout => {
            sync::keyring::delete_token(&server).await?;
            println!("Token removed for {}", server);
        }
    }

    Ok(())
}
