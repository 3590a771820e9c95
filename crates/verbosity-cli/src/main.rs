//! Command-line tool over the Verbosity client library.
//!
//! Configuration comes from the environment (`VERBOSITY_API_URL`,
//! `VERBOSITY_FILE_URL`, `VERBOSITY_API_TOKEN`); a missing token is fatal.
//! When several lookups are requested in one invocation, a failed lookup is
//! printed to stderr and the remaining ones still run.

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use verbosity::{types::UpdateMessageRequest, Client};

#[derive(Parser)]
#[command(name = "verbosity", version, about = "Verbosity chat-platform API client")]
struct Cli {
    /// Emit JSON instead of text output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat listings, rankings and statistics.
    Chats {
        #[command(subcommand)]
        cmd: ChatsCmd,
    },
    /// Organization listings, rankings and statistics.
    Orgs {
        #[command(subcommand)]
        cmd: OrgsCmd,
    },
    /// User lookups by id or unique name.
    Users {
        /// Numeric user ids.
        #[arg(long = "id")]
        ids: Vec<i64>,
        /// Unique names.
        #[arg(long = "uname")]
        unames: Vec<String>,
    },
    /// Send a message to a chat, a user, or several chats.
    Send {
        #[command(subcommand)]
        cmd: SendCmd,
    },
    /// Update an existing message.
    Update {
        #[arg(long)]
        chat_id: i64,
        #[arg(long)]
        post_no: i64,
        #[arg(long)]
        text: String,
        #[arg(long)]
        e2e: Option<bool>,
        #[arg(long)]
        reply_no: Option<i64>,
        #[arg(long)]
        quote: Option<String>,
        /// Attachment GUIDs; replaces the message's attachment list.
        #[arg(long = "attachment")]
        attachments: Vec<String>,
    },
    /// Upload a file to a chat.
    Upload {
        #[arg(long)]
        chat_id: i64,
        #[arg(long)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ChatsCmd {
    /// List every chat (all, or a filtered view).
    List {
        #[arg(long, value_enum, default_value_t = ChatFilter::All)]
        filter: ChatFilter,
        /// Required for the `member` filter; ignored otherwise.
        #[arg(long)]
        user_id: Option<i64>,
        /// Required for the `org` filter; ignored otherwise.
        #[arg(long)]
        org_id: Option<i64>,
    },
    /// Rank chats by a metric, highest first.
    Top {
        #[arg(long, value_enum)]
        by: ChatMetric,
        /// 0 returns the full sorted list.
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: usize,
    },
    /// Find a chat by exact title.
    Find {
        #[arg(long)]
        title: String,
    },
    /// Statistics for one chat.
    Stats {
        #[arg(long)]
        id: i64,
    },
    /// Member and admin ids of one chat.
    Members {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChatFilter {
    All,
    Favorite,
    Private,
    Public,
    Member,
    Org,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChatMetric {
    Members,
    Posts,
}

#[derive(Subcommand)]
enum OrgsCmd {
    /// List every organization (all, member, or admin).
    List {
        #[arg(long, value_enum, default_value_t = OrgFilter::All)]
        filter: OrgFilter,
    },
    /// Rank organizations by user count, highest first.
    Top {
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: usize,
    },
    /// Find an organization by exact title or slug.
    Find {
        #[arg(long, conflicts_with = "slug")]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Statistics for one organization.
    Stats {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrgFilter {
    All,
    Member,
    Admin,
}

#[derive(Subcommand)]
enum SendCmd {
    /// Send to a non-private chat.
    Chat {
        #[arg(long)]
        chat_id: i64,
        #[arg(long)]
        text: String,
        #[arg(long)]
        reply_no: Option<i64>,
    },
    /// Send a private message to one user.
    Private {
        #[arg(long, conflicts_with_all = ["email", "uname"])]
        user_id: Option<i64>,
        #[arg(long, conflicts_with = "uname")]
        email: Option<String>,
        #[arg(long)]
        uname: Option<String>,
        #[arg(long)]
        text: String,
    },
    /// Send the same message to several chats, stopping at the first failure.
    Broadcast {
        #[arg(long = "chat-id", required = true)]
        chat_ids: Vec<i64>,
        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let client = Client::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Chats { cmd } => run_chats(&client, cmd, cli.json).await,
        Command::Orgs { cmd } => run_orgs(&client, cmd, cli.json).await,
        Command::Users { ids, unames } => run_users(&client, &ids, &unames, cli.json).await,
        Command::Send { cmd } => run_send(&client, cmd, cli.json).await,
        Command::Update {
            chat_id,
            post_no,
            text,
            e2e,
            reply_no,
            quote,
            attachments,
        } => {
            let update = UpdateMessageRequest {
                text,
                e2e,
                reply_no,
                quote,
                attachments: (!attachments.is_empty()).then_some(attachments),
            };
            let resp = client.update_message(chat_id, post_no, &update).await?;
            if cli.json {
                output::print_json(&resp)?;
            } else {
                println!("Updated post {} in chat {} (uuid {})", resp.post_no, resp.chat_id, resp.uuid);
            }
            Ok(())
        }
        Command::Upload { chat_id, path } => {
            let resp = client.upload_file(chat_id, &path).await?;
            println!("{}", resp.guid);
            Ok(())
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default: warnings only; override with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_chats(client: &Client, cmd: ChatsCmd, json: bool) -> anyhow::Result<()> {
    match cmd {
        ChatsCmd::List {
            filter,
            user_id,
            org_id,
        } => {
            let chats = match filter {
                ChatFilter::All => client.all_chats().await?,
                ChatFilter::Favorite => client.favorite_chats().await?,
                ChatFilter::Private => client.private_chats().await?,
                ChatFilter::Public => client.public_chats().await?,
                ChatFilter::Member => {
                    let user_id =
                        user_id.context("--user-id is required with --filter member")?;
                    client.user_chats(user_id).await?
                }
                ChatFilter::Org => {
                    let org_id = org_id.context("--org-id is required with --filter org")?;
                    client.organization_chats(org_id).await?
                }
            };
            if json {
                output::print_json(&chats)?;
            } else {
                output::print_chats(&chats);
            }
        }
        ChatsCmd::Top { by, limit } => {
            let chats = match by {
                ChatMetric::Members => client.top_chats_by_members(limit).await?,
                ChatMetric::Posts => client.top_chats_by_posts(limit).await?,
            };
            if json {
                output::print_json(&chats)?;
            } else {
                output::print_chats(&chats);
            }
        }
        ChatsCmd::Find { title } => {
            let chat = client.find_chat_by_title(&title).await?;
            if json {
                output::print_json(&chat)?;
            } else {
                output::print_chats(std::slice::from_ref(&chat));
            }
        }
        ChatsCmd::Stats { id } => {
            let stats = client.chat_stats(id).await?;
            output::print_json(&stats)?;
        }
        ChatsCmd::Members { id } => {
            let chat = client.chat_by_id(id).await?;
            if json {
                output::print_json(&serde_json::json!({
                    "member_ids": chat.member_ids,
                    "admin_ids": chat.admin_ids,
                }))?;
            } else {
                println!("Members: {:?}", chat.member_ids);
                println!("Admins: {:?}", chat.admin_ids);
            }
        }
    }
    Ok(())
}

async fn run_orgs(client: &Client, cmd: OrgsCmd, json: bool) -> anyhow::Result<()> {
    match cmd {
        OrgsCmd::List { filter } => {
            let orgs = match filter {
                OrgFilter::All => client.all_organizations().await?,
                OrgFilter::Member => client.my_organizations().await?,
                OrgFilter::Admin => client.admin_organizations().await?,
            };
            if json {
                output::print_json(&orgs)?;
            } else {
                output::print_orgs(&orgs);
            }
        }
        OrgsCmd::Top { limit } => {
            let orgs = client.top_organizations_by_users(limit).await?;
            if json {
                output::print_json(&orgs)?;
            } else {
                output::print_orgs(&orgs);
            }
        }
        OrgsCmd::Find { title, slug } => {
            let org = match (title, slug) {
                (Some(title), None) => client.find_organization_by_title(&title).await?,
                (None, Some(slug)) => client.find_organization_by_slug(&slug).await?,
                _ => bail!("exactly one of --title or --slug is required"),
            };
            if json {
                output::print_json(&org)?;
            } else {
                output::print_orgs(std::slice::from_ref(&org));
            }
        }
        OrgsCmd::Stats { id } => {
            let stats = client.organization_stats(id).await?;
            output::print_json(&stats)?;
        }
    }
    Ok(())
}

async fn run_users(
    client: &Client,
    ids: &[i64],
    unames: &[String],
    json: bool,
) -> anyhow::Result<()> {
    if ids.is_empty() && unames.is_empty() {
        bail!("at least one --id or --uname is required");
    }

    // Individual lookup failures go to stderr; the rest still run.
    let mut found = Vec::new();
    let mut failures = 0usize;

    for &id in ids {
        match client.user_by_id(id).await {
            Ok(user) => found.push(user),
            Err(err) => {
                eprintln!("user {id}: {err}");
                failures += 1;
            }
        }
    }
    for uname in unames {
        match client.user_by_unique_name(uname).await {
            Ok(user) => found.push(user),
            Err(err) => {
                eprintln!("user {uname}: {err}");
                failures += 1;
            }
        }
    }

    if json {
        output::print_json(&found)?;
    } else {
        output::print_users(&found);
    }
    if failures > 0 {
        bail!("{failures} lookup(s) failed");
    }
    Ok(())
}

async fn run_send(client: &Client, cmd: SendCmd, json: bool) -> anyhow::Result<()> {
    match cmd {
        SendCmd::Chat {
            chat_id,
            text,
            reply_no,
        } => {
            let resp = client.send_message(chat_id, &text, reply_no).await?;
            println!("post_no: {}", resp.post_no);
        }
        SendCmd::Private {
            user_id,
            email,
            uname,
            text,
        } => {
            let resp = match (user_id, email, uname) {
                (Some(user_id), None, None) => {
                    client.send_private_message_by_id(user_id, &text, None).await?
                }
                (None, Some(email), None) => {
                    client.send_private_message_by_email(&email, &text, None).await?
                }
                (None, None, Some(uname)) => {
                    client
                        .send_private_message_by_unique_name(&uname, &text, None)
                        .await?
                }
                _ => bail!("exactly one of --user-id, --email or --uname is required"),
            };
            println!("chat_id: {} post_no: {}", resp.chat_id, resp.post_no);
        }
        SendCmd::Broadcast { chat_ids, text } => {
            let responses = client.broadcast_message(&chat_ids, &text).await?;
            if json {
                let posts: Vec<i64> = responses.iter().map(|r| r.post_no).collect();
                output::print_json(&posts)?;
            } else {
                for (chat_id, resp) in chat_ids.iter().zip(&responses) {
                    println!("chat {chat_id}: post_no {}", resp.post_no);
                }
            }
        }
    }
    Ok(())
}
