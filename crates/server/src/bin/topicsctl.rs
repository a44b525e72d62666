use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use topics_server::auth::{RequestAuthenticator, SqliteSessionStore, User};
use topics_server::cache::PageCache;
use topics_server::config::Config;
use topics_server::config::loader::{load_from_file, load_with_discovery};
use topics_server::db::init_pool;
use topics_server::form::FormState;
use topics_server::paths;
use topics_server::topic::db::list_topics;
use topics_server::topic::{CreateTopicContext, CreateTopicOutcome, SqliteTopicStore, create_topic};

#[derive(Parser)]
#[command(name = "topicsctl")]
#[command(about = "Topics admin CLI - Manage sessions and topics directly in the database", long_about = None)]
struct Cli {
    /// Path to a RON config file (defaults to discovery)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Session(SessionCommands),
    #[command(subcommand)]
    Topic(TopicCommands),
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Create a signed-in session for a user
    Create {
        /// User handle (e.g., alice.bsky.social)
        handle: String,
        /// DID for the user; defaults to a local DID derived from the handle
        #[arg(long)]
        did: Option<String>,
    },
    /// Revoke a session
    Revoke { id: String },
    /// List active sessions
    List,
}

#[derive(Subcommand)]
enum TopicCommands {
    /// Create a topic as the user owning the given session
    Create {
        /// Topic name (lowercase letters and dashes)
        name: String,
        /// Topic description (at least 10 characters)
        description: String,
        #[arg(short, long)]
        session: String,
    },
    /// List all topics
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config: Config = match cli.config {
        Some(ref path) => load_from_file(path)?,
        None => load_with_discovery()?,
    };

    let (pool, _) = init_pool(&config.database).await?;

    match cli.command {
        Commands::Session(cmd) => match cmd {
            SessionCommands::Create { handle, did } => create_session(&pool, handle, did).await?,
            SessionCommands::Revoke { id } => revoke_session(&pool, &id).await?,
            SessionCommands::List => list_sessions(&pool).await?,
        },
        Commands::Topic(cmd) => match cmd {
            TopicCommands::Create {
                name,
                description,
                session,
            } => {
                let sessions = SqliteSessionStore::new(pool.clone())
                    .with_max_age(config.sessions.max_age_secs());
                create_topic_cmd(&pool, sessions, name, description, session).await?
            }
            TopicCommands::List => list_topics_cmd(&pool).await?,
        },
    }

    Ok(())
}

async fn create_session(pool: &SqlitePool, handle: String, did: Option<String>) -> Result<()> {
    let user = match did {
        Some(did) => User::new(did, handle),
        None => User::local(handle),
    };

    let session = SqliteSessionStore::new(pool.clone())
        .create_session(Some(user.clone()))
        .await?;

    println!("✓ Session created");
    println!("  ID:     {}", session.id);
    println!("  User:   {} ({})", user.handle, user.did);

    Ok(())
}

async fn revoke_session(pool: &SqlitePool, id: &str) -> Result<()> {
    if SqliteSessionStore::new(pool.clone()).delete_session(id).await? {
        println!("✓ Session {} revoked", id);
        Ok(())
    } else {
        Err(anyhow!("session {} not found", id))
    }
}

async fn list_sessions(pool: &SqlitePool) -> Result<()> {
    let sessions = SqliteSessionStore::new(pool.clone()).list_sessions().await?;
    if sessions.is_empty() {
        println!("No active sessions");
    }
    for session in sessions {
        let owner = session
            .user
            .map(|user| user.handle)
            .unwrap_or_else(|| "<anonymous>".to_string());
        println!("{}  {}  created {}", session.id, owner, session.created_at);
    }
    Ok(())
}

async fn create_topic_cmd(
    pool: &SqlitePool,
    sessions: SqliteSessionStore,
    name: String,
    description: String,
    session: String,
) -> Result<()> {
    let authenticator = RequestAuthenticator::new(sessions, Some(session));
    let store = SqliteTopicStore::new(pool.clone());
    let cache = PageCache::new();
    let ctx = CreateTopicContext {
        authenticator: &authenticator,
        store: &store,
        revalidator: &cache,
        submit_delay: std::time::Duration::ZERO,
    };

    let fields: &[(&str, &str)] = &[("name", name.as_str()), ("description", description.as_str())];
    match create_topic(&ctx, FormState::default(), fields).await {
        CreateTopicOutcome::Redirect(redirect) => {
            println!("✓ Topic created successfully!");
            if let Some(slug) = paths::topic_slug(&redirect.target) {
                println!("  Slug: {slug}");
            }
            println!("  Path: {}", redirect.target);
            Ok(())
        }
        CreateTopicOutcome::Rejected(state) => {
            for (field, messages) in state.errors.iter() {
                for message in messages {
                    eprintln!("  {field}: {message}");
                }
            }
            Err(anyhow!("topic was not created"))
        }
    }
}

async fn list_topics_cmd(pool: &SqlitePool) -> Result<()> {
    let topics = list_topics(pool).await?;
    if topics.is_empty() {
        println!("No topics yet");
    }
    for topic in topics {
        println!("{:<24} {}", topic.slug, topic.description);
    }
    Ok(())
}
