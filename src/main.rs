use anyhow::Result;
use clap::{Parser, Subcommand};
use inkpress_client::ApiClient;
use inkpress_config::Config;
use inkpress_store::{JsonSessionStore, new_draft, push_draft};
use inkpress_types::SessionStore;
use std::io::Write;
use std::{path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "inkpress", about = "Gateway client for the inkpress blogging platform")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Override the API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session.
    Login {
        /// Account email.
        email: String,
        /// Password; prompted when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and clear the persisted session.
    Logout,
    /// Show the signed-in author.
    Whoami,
    /// Read posts.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// List categories.
    Categories,
    /// Manage local editor drafts.
    #[command(subcommand)]
    Drafts(DraftsCommand),
}

#[derive(Subcommand, Debug)]
enum PostsCommand {
    /// List published posts.
    List {
        /// Maximum number of posts.
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one post by slug.
    Get { slug: String },
}

#[derive(Subcommand, Debug)]
enum DraftsCommand {
    /// List local drafts, newest first.
    List,
    /// Save a local draft (replaces the oldest past the cap).
    Save { title: String, content: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.base_url)?;
    let store: Arc<dyn SessionStore> = Arc::new(open_store(&config)?);
    let client = ApiClient::new(&config, Arc::clone(&store))
        .map_err(|e| anyhow::anyhow!("client setup failed: {e}"))?;

    match cli.command {
        Commands::Login { email, password } => cmd_login(&client, &email, password).await,
        Commands::Logout => cmd_logout(&client).await,
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::Posts(cmd) => cmd_posts(&client, cmd).await,
        Commands::Categories => cmd_categories(&client).await,
        Commands::Drafts(cmd) => cmd_drafts(store.as_ref(), cmd).await,
    }
}

fn load_config(path: Option<&std::path::Path>, base_url: Option<String>) -> Result<Config> {
    let mut config = if let Some(path) = path {
        Config::from_file(path).map_err(|e| anyhow::anyhow!("config error: {e}"))?
    } else {
        Config::default()
    };
    if let Some(url) = base_url {
        config.base_url = url;
    }
    Ok(config)
}

fn open_store(config: &Config) -> Result<JsonSessionStore> {
    match &config.session_file {
        Some(path) => Ok(JsonSessionStore::new(path)),
        None => JsonSessionStore::open_default()
            .map_err(|e| anyhow::anyhow!("session store error: {e}")),
    }
}

async fn cmd_login(client: &ApiClient, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    client
        .auth()
        .login(email, &password)
        .await
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;
    let me = client
        .auth()
        .me()
        .await
        .map_err(|e| anyhow::anyhow!("session check failed: {e}"))?;
    eprintln!("signed in as {}", me.username);
    Ok(())
}

async fn cmd_logout(client: &ApiClient) -> Result<()> {
    client
        .auth()
        .logout()
        .await
        .map_err(|e| anyhow::anyhow!("logout failed: {e}"))?;
    eprintln!("signed out");
    Ok(())
}

async fn cmd_whoami(client: &ApiClient) -> Result<()> {
    let me = client
        .auth()
        .me()
        .await
        .map_err(|e| anyhow::anyhow!("not signed in: {e}"))?;
    match me.display_name {
        Some(name) => println!("{} ({name})", me.username),
        None => println!("{}", me.username),
    }
    Ok(())
}

async fn cmd_posts(client: &ApiClient, cmd: PostsCommand) -> Result<()> {
    match cmd {
        PostsCommand::List { limit } => {
            let posts = client
                .posts()
                .list(limit, None)
                .await
                .map_err(|e| anyhow::anyhow!("listing failed: {e}"))?;
            for post in posts {
                let slug = post.slug.as_deref().unwrap_or(&post.id);
                let marker = if post.published { "" } else { " [unpublished]" };
                println!("{slug}  {}{marker}", post.title);
            }
        }
        PostsCommand::Get { slug } => {
            let post = client
                .posts()
                .get(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("fetch failed: {e}"))?;
            println!("# {}", post.title);
            if let Some(author) = &post.author {
                println!("by {author}");
            }
            println!();
            println!("{}", post.content);
        }
    }
    Ok(())
}

async fn cmd_categories(client: &ApiClient) -> Result<()> {
    let categories = client
        .categories()
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("listing failed: {e}"))?;
    for category in categories {
        match category.post_count {
            Some(count) => println!("{}  ({count} posts)", category.name),
            None => println!("{}", category.name),
        }
    }
    Ok(())
}

async fn cmd_drafts(store: &dyn SessionStore, cmd: DraftsCommand) -> Result<()> {
    match cmd {
        DraftsCommand::List => {
            let drafts = store
                .load_drafts()
                .await
                .map_err(|e| anyhow::anyhow!("draft store error: {e}"))?;
            for draft in drafts {
                println!("{}  {}", draft.id, draft.title);
            }
        }
        DraftsCommand::Save { title, content } => {
            let draft = new_draft(title, content);
            let id = draft.id.clone();
            push_draft(store, draft)
                .await
                .map_err(|e| anyhow::anyhow!("draft store error: {e}"))?;
            eprintln!("saved draft {id}");
        }
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
