use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "topics")]
#[command(about = "Topics CLI - Create and browse topics via HTTP", long_about = None)]
struct Cli {
    /// Base URL of the topics API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Session id used to authenticate mutations
    #[arg(long, env = "TOPICS_SESSION")]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new topic
    Create {
        /// Topic name (lowercase letters and dashes)
        name: String,
        /// Topic description (at least 10 characters)
        description: String,
    },
    /// List all topics
    List,
    /// Show a single topic
    Show { slug: String },
}

#[derive(Deserialize, Debug)]
struct Topic {
    slug: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct FormState {
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api_url = cli.api_url.trim_end_matches('/');

    match cli.command {
        Commands::Create { name, description } => {
            create_topic(api_url, cli.session.as_deref(), name, description).await?
        }
        Commands::List => list_topics(api_url).await?,
        Commands::Show { slug } => show_topic(api_url, &slug).await?,
    }

    Ok(())
}

async fn create_topic(
    api_url: &str,
    session: Option<&str>,
    name: String,
    description: String,
) -> Result<()> {
    // The server answers success with a redirect; report it instead of following it.
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .context("Failed to build HTTP client")?;

    let mut request = client
        .post(format!("{api_url}/topics"))
        .form(&[("name", name.as_str()), ("description", description.as_str())]);
    if let Some(session) = session {
        request = request.header(AUTHORIZATION, format!("Bearer {session}"));
    }

    let response = request
        .send()
        .await
        .context("Failed to send request to topics API")?;

    match response.status() {
        StatusCode::SEE_OTHER => {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .context("Redirect response without a Location header")?;

            println!("✓ Topic created successfully!");
            if let Some(slug) = slug_from_location(location) {
                println!("  Slug: {slug}");
            }
            println!("  URL:  {}{}", api_url, location);
            Ok(())
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            let state: FormState = response
                .json()
                .await
                .context("Failed to parse form errors")?;
            Err(anyhow::anyhow!(
                "Topic was not created:\n{}",
                format_form_errors(&state)
            ))
        }
        status => Err(anyhow::anyhow!("Create request failed with status: {}", status)),
    }
}

async fn list_topics(api_url: &str) -> Result<()> {
    let response = reqwest::get(format!("{api_url}/"))
        .await
        .context("Failed to send request to topics API")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "List request failed with status: {}",
            response.status()
        ));
    }

    let topics: Vec<Topic> = response
        .json()
        .await
        .context("Failed to parse topic listing")?;

    if topics.is_empty() {
        println!("No topics yet");
    }
    for topic in topics {
        println!("{:<24} {}", topic.slug, topic.description);
    }

    Ok(())
}

async fn show_topic(api_url: &str, slug: &str) -> Result<()> {
    let response = reqwest::get(format!("{api_url}/topics/{slug}"))
        .await
        .context("Failed to send request to topics API")?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(anyhow::anyhow!("Topic `{}` not found", slug));
    }
    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Show request failed with status: {}",
            response.status()
        ));
    }

    let topic: Topic = response.json().await.context("Failed to parse topic")?;

    println!("Slug:        {}", topic.slug);
    println!("Description: {}", topic.description);

    Ok(())
}

/// Slug named by the `/topics/{slug}` path the server redirects to.
fn slug_from_location(location: &str) -> Option<&str> {
    location
        .strip_prefix("/topics/")
        .filter(|slug| !slug.is_empty() && !slug.contains('/'))
}

fn format_form_errors(state: &FormState) -> String {
    state
        .errors
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("  {field}: {message}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_form_errors() {
        let state: FormState = serde_json::from_str(
            r#"{"errors":{"_form":["You must be signed in to do this."],"name":["a","b"]}}"#,
        )
        .unwrap();

        assert_eq!(
            format_form_errors(&state),
            "  _form: You must be signed in to do this.\n  name: a\n  name: b"
        );
    }

    #[test]
    fn test_slug_from_location() {
        assert_eq!(slug_from_location("/topics/rust-lang"), Some("rust-lang"));
        assert_eq!(slug_from_location("/"), None);
    }
}
