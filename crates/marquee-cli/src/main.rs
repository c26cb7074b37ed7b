mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use marquee_core::app::{Command, CommandContext, MarqueeBuilder, Reply};
use marquee_core::config::MarqueeConfig;
use marquee_core::domain::ListKind;
use marquee_core::impls::JsonFileStore;
use marquee_core::observability::init_tracing;

use crate::console::{ConsoleChannel, ManualLookup, StdinConfirmer};

#[derive(Parser)]
#[command(name = "marquee", about = "Movie-night recommendations, queue and watchlist")]
struct Cli {
    /// YAML config file (missing file = defaults)
    #[arg(long, env = "MARQUEE_CONFIG", default_value = "marquee.yaml")]
    config: PathBuf,

    /// Override the data directory from the config
    #[arg(long, env = "MARQUEE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Who is running the command
    #[arg(long, env = "MARQUEE_ACTOR", default_value = "local")]
    actor: String,

    /// Run with admin capability
    #[arg(long)]
    admin: bool,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args, Default)]
struct LookupArgs {
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    runtime: Option<String>,
    #[arg(long)]
    poster: Option<String>,
    #[arg(long)]
    plot: Option<String>,
    /// External id, e.g. tt1160419
    #[arg(long)]
    imdb: Option<String>,
}

impl From<LookupArgs> for ManualLookup {
    fn from(args: LookupArgs) -> Self {
        Self {
            release_year: args.year,
            runtime: args.runtime,
            poster_url: args.poster,
            plot: args.plot,
            external_id: args.imdb,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ListArg {
    Catalog,
    Schedule,
    Archive,
}

impl From<ListArg> for ListKind {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Catalog => ListKind::Catalog,
            ListArg::Schedule => ListKind::Schedule,
            ListArg::Archive => ListKind::Archive,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowArg {
    Top,
    Schedule,
    Recent,
}

#[derive(Subcommand)]
enum Cmd {
    /// Recommend a movie (a repeat recommendation counts as a vote)
    Propose {
        title: String,
        #[command(flatten)]
        lookup: LookupArgs,
    },
    Vote { title: String },
    /// Remove your own recommendation
    Withdraw { title: String },
    /// Move a recommendation to the queue
    Schedule { title: String },
    /// Set the viewing time, `DD-MM-YYYY HH:MM` in your timezone
    SetTime { title: String, time: String },
    Timezone { timezone: String },
    Unschedule { title: String },
    /// Mark a movie as watched
    Watched {
        title: String,
        #[command(flatten)]
        lookup: LookupArgs,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Remove a movie from the watchlist
    Forget { title: String },
    Clear {
        #[arg(value_enum)]
        list: ListArg,
    },
    Show {
        #[arg(value_enum)]
        what: ShowArg,
    },
    Next,
    Announce { title: String },
    /// Run the sweep and publish loops until Ctrl-C
    Serve,
}

impl Cmd {
    /// Split into the core command and the collaborators it needs.
    fn into_parts(self) -> (Option<Command>, ManualLookup, bool) {
        let plain = |command| (Some(command), ManualLookup::default(), false);
        match self {
            Cmd::Propose { title, lookup } => {
                (Some(Command::Propose { query: title }), lookup.into(), false)
            }
            Cmd::Watched { title, lookup, yes } => {
                (Some(Command::Watched { query: title }), lookup.into(), yes)
            }
            Cmd::Vote { title } => plain(Command::Vote { title }),
            Cmd::Withdraw { title } => plain(Command::Withdraw { title }),
            Cmd::Schedule { title } => plain(Command::Schedule { title }),
            Cmd::SetTime { title, time } => plain(Command::SetTime {
                title,
                local_time: time,
            }),
            Cmd::Timezone { timezone } => plain(Command::SetTimezone { timezone }),
            Cmd::Unschedule { title } => plain(Command::Unschedule { title }),
            Cmd::Forget { title } => plain(Command::Forget { title }),
            Cmd::Clear { list } => plain(Command::Clear { list: list.into() }),
            Cmd::Show { what } => plain(match what {
                ShowArg::Top => Command::ShowTop,
                ShowArg::Schedule => Command::ShowSchedule,
                ShowArg::Recent => Command::ShowRecent,
            }),
            Cmd::Next => plain(Command::NextUp),
            Cmd::Announce { title } => plain(Command::Announce { title }),
            Cmd::Serve => (None, ManualLookup::default(), false),
        }
    }
}

fn print_reply(reply: &Reply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }
    if reply.is_failure() {
        eprintln!("{}", reply.text);
    } else {
        println!("{}", reply.text);
    }
    if let Some(card) = &reply.card {
        println!("{card}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = MarqueeConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    init_tracing(if cli.verbose { "debug" } else { config.log_level.as_str() });

    let (command, lookup, assume_yes) = cli.command.into_parts();
    let app = MarqueeBuilder::new()
        .config(config.clone())
        .store(Arc::new(JsonFileStore::new(&config.data_dir)))
        .lookup(Arc::new(lookup))
        .confirmer(Arc::new(StdinConfirmer::new(assume_yes)))
        .channel(Arc::new(ConsoleChannel::new()))
        .build()
        .await
        .context("starting marquee")?;

    let Some(command) = command else {
        let background = app.spawn_background();
        tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
        tracing::info!("shutting down");
        background.shutdown_and_join().await;
        return Ok(ExitCode::SUCCESS);
    };

    let ctx = CommandContext {
        actor: cli.actor.as_str().into(),
        is_admin: cli.admin,
    };
    let reply = app.commands.execute(&ctx, command).await;
    print_reply(&reply, cli.json)?;
    Ok(if reply.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
