//! Post messages, files, and whatever's piped in to a Mattermost channel or
//! direct message.
//!
//! ```sh
//! make test 2>&1 | mm-pipe -c builds -m "Nightly test run:"
//! ```
//!
//! Piped text is inlined, optionally fenced for syntax highlighting (see
//! [highlight]). Binary input, or text which would make the post too long, is
//! uploaded as an attachment instead (see [content]).

use clap::Parser;
use cli::Cli;
use config::{expand_home, Env, Instance, Settings};
use content::Draft;
use dotenvy::dotenv;
use error::Failure;
use highlight::Heuristics;
use mattermost::{api::MattermostClient, channel::ChannelId, file::FileId};
use std::{
    io::{self, IsTerminal, Read},
    path::Path,
    process::ExitCode,
};
use target::Destination;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
mod completions;
mod config;
mod content;
mod credentials;
mod error;
mod highlight;
mod mattermost;
mod target;

/// Application entrypoint. Initialises tracing on stderr, leaving stdout for
/// listings and completion scripts, then runs a single invocation.
// One request at a time, start to finish, so there's no need for more than
// one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    if dotenv().is_err() {
        debug!("No .env found");
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    if let Some(shell) = completions::requested_shell(&cli) {
        completions::generate_completions(shell);
        return Ok(());
    }

    let instance = Instance::load(&expand_home(&cli.config), &cli.instance)?;
    let settings = Settings::resolve(&cli, instance, Env::from_process());

    let listing = cli.list_users || cli.list_channels;

    // Bad flags shouldn't cost a round trip.
    let dest = if listing {
        None
    } else {
        Some(Destination::from_flags(
            cli.channel.as_deref(),
            cli.user.as_deref(),
        )?)
    };

    let client = MattermostClient::new(&settings.server_url, settings.token)?;

    let Some(dest) = dest else {
        return list(&client, cli.list_users, cli.list_channels).await;
    };

    let target = target::resolve(&client, &dest).await?;

    let mut draft = Draft::new(cli.message);

    if let Some(path) = &cli.file {
        let id = attach_file(&client, &target.channel_id, path).await?;
        draft.attachment_ids.push(id);
    }

    let draft = content::route(
        draft,
        read_stdin()?,
        &settings.highlight,
        settings.max_message_length,
        &Heuristics,
        &client,
        &target.channel_id,
    )
    .await?;

    client
        .create_post(
            &target.channel_id,
            target.team_id.as_ref(),
            &draft.text,
            &draft.attachment_ids,
        )
        .await?;

    Ok(())
}

/// Print usernames and/or channel names, one per line.
async fn list(client: &MattermostClient, users: bool, channels: bool) -> Result<(), Failure> {
    if users {
        for user in client.list_users().await? {
            if !user.username.is_empty() {
                println!("{}", user.username);
            }
        }
    }

    if channels {
        for channel in client.list_channels().await? {
            if !channel.display_name.is_empty() {
                println!("{}", channel.display_name);
            }
        }
    }

    Ok(())
}

/// Upload the file given by `--file` under its own name.
async fn attach_file(
    client: &MattermostClient,
    channel: &ChannelId,
    path: &Path,
) -> Result<FileId, Failure> {
    let bytes = std::fs::read(path).map_err(|e| Failure::Read(path.display().to_string(), e))?;

    let name = path
        .file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_owned());

    Ok(client.upload_file(channel, &name, bytes).await?)
}

/// Read all of stdin, unless it's a terminal, in which case nothing was piped.
fn read_stdin() -> Result<Vec<u8>, Failure> {
    let stdin = io::stdin();
    let mut buf = Vec::new();

    if stdin.is_terminal() {
        return Ok(buf);
    }

    stdin
        .lock()
        .read_to_end(&mut buf)
        .map_err(|e| Failure::Read("standard input".to_owned(), e))?;

    Ok(buf)
}
