use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use scriptsync::{
    AuthType,
    cli::{Credentials, export_folder, import_folder, load_dotenv, run_test},
    run::RunRequest,
};
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// scriptsync: move test scripts between your disk and a remote testing project
#[derive(Parser)]
#[command(name = "scriptsync", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings and credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// Login name (overrides SCRIPTSYNC_USER)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Password (overrides SCRIPTSYNC_PASS)
    #[arg(short, long, global = true)]
    pass: Option<String>,

    /// Force an authentication method instead of picking one from the credentials
    #[arg(long, global = true, value_enum)]
    auth: Option<AuthType>,

    /// Browser to run tests in [chrome, firefox]
    #[arg(short, long, global = true)]
    browser: Option<String>,

    /// Width of the browser window
    #[arg(short, long, global = true)]
    width: Option<u32>,

    /// Height of the browser window
    #[arg(long, global = true)]
    height: Option<u32>,

    /// Log every upload and download
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a folder into a project
    Import {
        /// Project ID to import into
        project: String,

        /// Local folder to import
        folder: PathBuf,

        /// Replace files that already exist in the project
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Export a project into a new folder
    Export {
        /// Project ID to export
        project: String,

        /// Name of the folder to create for the export
        folder: String,

        /// Directory to create the folder in
        directory: PathBuf,
    },

    /// Run a test from a project
    Run {
        /// Project ID the script belongs to
        project: String,

        /// Path of the script inside the project
        scriptpath: String,

        /// Directory to save the test log to
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let log_level = match verbose {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let credentials = Credentials {
        user: cli.user,
        pass: cli.pass,
        auth_type: cli.auth,
    };

    match cli.command {
        Commands::Import {
            project,
            folder,
            overwrite,
        } => {
            import_folder(&credentials, &project, &folder, overwrite).await?;
        }
        Commands::Export {
            project,
            folder,
            directory,
        } => {
            export_folder(&credentials, &project, &folder, &directory).await?;
        }
        Commands::Run {
            project,
            scriptpath,
            save,
        } => {
            let request = RunRequest::new(project, scriptpath)
                .with_browser(cli.browser)
                .with_size(cli.width, cli.height);
            run_test(&credentials, &request, save.as_deref()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // LOG_LEVEL may come from the dotenv file
    let dotenv = load_dotenv(&cli.env);
    init_logging(cli.verbose);

    let result = match dotenv {
        Ok(found) => {
            if !found {
                log::debug!("No dotenv file at {}", cli.env.bright_black());
            }
            dispatch(cli).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "ERROR:".red().bold(), e.red());
        std::process::exit(1);
    }
}
