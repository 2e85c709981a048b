use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::{commands::*, enums::ExportFormat};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    args: TokenArgs,
    /// Command (defaults to `tokencode`)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the token comes from and how to unlock it.
#[derive(Args)]
pub struct TokenArgs {
    /// Use an alternate rcfile instead of ~/.stokenrc
    #[arg(long, global = true, value_name = "FILE")]
    pub rcfile: Option<PathBuf>,
    /// Read the token from a file (CTF string or sdtid XML)
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "token")]
    pub file: Option<PathBuf>,
    /// Use a token string given on the command line
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,
    /// Generate a random token
    #[arg(long, global = true, conflicts_with_all = ["file", "token"])]
    pub random: bool,
    /// Device ID the token is bound to, or a device class tag from `guids`
    #[arg(long, global = true, value_name = "DEVID")]
    pub devid: Option<String>,
    /// Password protecting the token seed
    #[arg(long, global = true, value_name = "PASSWORD")]
    pub password: Option<String>,
    /// PIN to add to the tokencode
    #[arg(long, global = true, value_name = "PIN")]
    pub pin: Option<String>,
    /// Compute the tokencode at a unix time, or at +SECS / -SECS from now
    #[arg(long, global = true, value_name = "TIME", allow_hyphen_values = true)]
    pub use_time: Option<String>,
    /// Show the next tokencode instead of the current one
    #[arg(long, global = true, conflicts_with = "use_time")]
    pub next: bool,
    /// Ignore expiration dates and overwrite an existing rcfile token
    #[arg(long, global = true)]
    pub force: bool,
    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

impl TokenArgs {
    /// True when the token is read from the rcfile.
    pub fn uses_rcfile(&self) -> bool {
        self.token.is_none() && self.file.is_none() && !self.random
    }
}

/// New credentials applied when a token is re-encoded.
#[derive(Args)]
pub struct ReencodeArgs {
    /// Password to protect the re-encoded token with
    #[arg(long, value_name = "PASSWORD")]
    pub new_password: Option<String>,
    /// Bind the re-encoded token to this device ID
    #[arg(long, value_name = "DEVID")]
    pub new_devid: Option<String>,
    /// Keep the current password
    #[arg(long, conflicts_with = "new_password")]
    pub keep_password: bool,
}

#[derive(Args)]
#[group(multiple = false)]
struct FormatArgs {
    /// Split the token string into blocks of 5 digits
    #[arg(long)]
    blocks: bool,
    /// Wrap the token in an iPhone import URL
    #[arg(long)]
    iphone: bool,
    /// Wrap the token in an Android import URL
    #[arg(long)]
    android: bool,
    /// Export a version 3 token in an Android import URL
    #[arg(long)]
    v3: bool,
    /// Write an sdtid XML file instead of a token string
    #[arg(long, visible_alias = "xml")]
    sdtid: bool,
}

impl FormatArgs {
    fn format(&self) -> ExportFormat {
        match (self.blocks, self.iphone, self.android, self.v3, self.sdtid) {
            (true, ..) => ExportFormat::Blocks,
            (_, true, ..) => ExportFormat::Iphone,
            (_, _, true, ..) => ExportFormat::Android,
            (_, _, _, true, _) => ExportFormat::V3,
            (.., true) => ExportFormat::Sdtid,
            _ => ExportFormat::Raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current tokencode
    Tokencode,
    /// Show the tokencode live in the terminal
    Watch,
    /// Import a token into the rcfile
    Import {
        #[command(flatten)]
        reencode: ReencodeArgs,
    },
    /// Print the token as a string
    Export {
        #[command(flatten)]
        reencode: ReencodeArgs,
        #[command(flatten)]
        format: FormatArgs,
        /// sdtid skeleton whose values override the token's
        #[arg(long, value_name = "FILE", requires = "sdtid")]
        template: Option<PathBuf>,
    },
    /// Generate a new sdtid file with a random seed
    Issue {
        /// sdtid skeleton whose values override the defaults
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Password to protect the new token with
        #[arg(long, value_name = "PASSWORD")]
        new_password: Option<String>,
        /// Bind the new token to this device ID
        #[arg(long, value_name = "DEVID")]
        new_devid: Option<String>,
    },
    /// Show token details
    Show {
        /// Include the seed in the output
        #[arg(long)]
        seed: bool,
    },
    /// Change the PIN saved in the rcfile
    Setpin {
        /// New PIN (empty to remove it)
        #[arg(long, value_name = "PIN")]
        new_pin: Option<String>,
    },
    /// Change the password protecting the token
    Setpass {
        /// New password (empty to remove it)
        #[arg(long, value_name = "PASSWORD")]
        new_password: Option<String>,
    },
    /// List the device class GUIDs tokens can be bound to
    Guids,
}

impl Cli {
    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        init_logging(cli.args.debug);

        let args = &cli.args;

        match &cli.command {
            None | Some(Commands::Tokencode) => show_tokencode(args),
            Some(Commands::Watch) => watch_tokencode(args),
            Some(Commands::Import { reencode }) => import_token(args, reencode),
            Some(Commands::Export {
                reencode,
                format,
                template,
            }) => export_token(args, reencode, format.format(), template.as_deref()),
            Some(Commands::Issue {
                template,
                new_password,
                new_devid,
            }) => issue_token(
                template.as_deref(),
                new_password.as_deref(),
                new_devid.as_deref(),
            ),
            Some(Commands::Show { seed }) => show_token(args, *seed),
            Some(Commands::Setpin { new_pin }) => set_pin(args, new_pin.as_deref()),
            Some(Commands::Setpass { new_password }) => {
                set_password(args, new_password.as_deref())
            }
            Some(Commands::Guids) => list_guids(),
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
