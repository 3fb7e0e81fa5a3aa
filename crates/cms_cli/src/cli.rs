use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use cms_core::{Article, ArticlesQueryResponse, FetchOptions, Nullable, RequestDirectives};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect content API payloads and fetch options", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, env = "CMS_LOG", global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the articles of an `Articles.docs` query response
    Articles {
        /// Payload file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        /// Re-emit the decoded response as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Show a single article by slug
    Show {
        slug: String,
        /// Payload file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Build fetch options and print them as JSON
    FetchOptions {
        #[arg(long)]
        method: Option<String>,
        /// Request header as `name:value`, may be repeated
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        #[arg(long)]
        body: Option<String>,
        /// Freshness window, e.g. 60, 90s, 1h
        #[arg(long, value_parser = parse_revalidate)]
        revalidate: Option<Duration>,
        /// Cache tag, may be repeated; order is kept
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}'. Expected: name:value", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header '{}': empty name", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_revalidate(raw: &str) -> std::result::Result<Duration, String> {
    // A bare number means seconds.
    if let Ok(secs) = raw.trim().parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw.trim()).map_err(|e| e.to_string())
}

fn open_input(input: &Path) -> Result<Box<dyn Read>> {
    if input.as_os_str() == "-" {
        debug!("Reading payload from stdin");
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn load_response(input: &Path) -> Result<ArticlesQueryResponse> {
    let reader = open_input(input)?;
    let response = ArticlesQueryResponse::from_reader(reader)
        .with_context(|| format!("Failed to decode articles from {}", input.display()))?;
    info!("Loaded {} articles from {}", response.len(), input.display());
    Ok(response)
}

fn display_date(article: &Article) -> Option<String> {
    match article.published_at() {
        Some(date) => Some(date.format("%Y-%m-%d").to_string()),
        None => article.published_date.clone(),
    }
}

pub fn write_listing<W: Write>(out: &mut W, response: &ArticlesQueryResponse) -> Result<()> {
    if response.is_empty() {
        writeln!(out, "No articles")?;
        return Ok(());
    }
    for article in response.docs() {
        match display_date(article) {
            Some(date) => writeln!(out, "{}  {} [{}]", date, article.title, article.slug)?,
            None => writeln!(out, "{} [{}]", article.title, article.slug)?,
        }
    }
    Ok(())
}

pub fn write_article<W: Write>(out: &mut W, article: &Article) -> Result<()> {
    writeln!(out, "title:     {}", article.title)?;
    writeln!(out, "slug:      {}", article.slug)?;
    if let Some(subtitle) = &article.subtitle {
        writeln!(out, "subtitle:  {}", subtitle)?;
    }
    if let Some(date) = display_date(article) {
        writeln!(out, "published: {}", date)?;
    }
    match &article.hero_image {
        Nullable::Present(image) => writeln!(out, "hero:      {}", image.url)?,
        Nullable::Null => writeln!(out, "hero:      (none)")?,
        Nullable::Absent => {}
    }
    Ok(())
}

pub fn build_fetch_options(
    method: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    revalidate: Option<Duration>,
    tags: Vec<String>,
) -> FetchOptions {
    let mut options = FetchOptions::new();
    if let Some(method) = method {
        options = options.method(method);
    }
    for (name, value) in headers {
        options = options.header(name, value);
    }
    if let Some(body) = body {
        options = options.body(body);
    }

    let mut directives = RequestDirectives::new();
    if let Some(ttl) = revalidate {
        directives = directives.revalidate_after(ttl);
    }
    if !tags.is_empty() {
        directives = directives.tags(tags);
    }
    if !directives.is_empty() {
        options = options.next(directives);
    }
    options
}

pub fn handle_command<W: Write>(command: Commands, out: &mut W) -> Result<()> {
    match command {
        Commands::Articles { input, json } => {
            let response = load_response(&input)?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &response)?;
                writeln!(out)?;
            } else {
                write_listing(out, &response)?;
            }
        }
        Commands::Show { slug, input } => {
            let response = load_response(&input)?;
            let article = response
                .find_by_slug(&slug)
                .ok_or_else(|| anyhow!("Article not found: {}", slug))?;
            write_article(out, article)?;
        }
        Commands::FetchOptions {
            method,
            headers,
            body,
            revalidate,
            tags,
        } => {
            let options = build_fetch_options(method, headers, body, revalidate, tags);
            // Fail early on anything the executor could not turn into a request.
            options.init.method()?;
            options.init.header_map()?;
            serde_json::to_writer_pretty(&mut *out, &options)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
