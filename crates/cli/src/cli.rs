//! Argument parsing and command dispatch.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use drugbit_client::{CancelToken, DataClient, FetchOutcome, SearchOptions, SitemapBuilder};
use drugbit_core::AppConfig;
use serde::Serialize;

use crate::render;

/// drugbit - pharmacology reference lookups
#[derive(Debug, Parser)]
#[command(name = "drugbit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the drug API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search drugs by name
    #[command(alias = "s")]
    Search {
        /// Search text; omit to list every drug
        query: Vec<String>,
        /// Page size
        #[arg(long)]
        limit: Option<usize>,
        /// Results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Page through every result
        #[arg(long)]
        all: bool,
    },

    /// Show one drug by id or name
    #[command(alias = "g")]
    Get {
        #[arg(required = true)]
        identifier: Vec<String>,
    },

    /// List drug categories
    #[command(alias = "ls")]
    Categories,

    /// List drugs in a category
    #[command(alias = "c")]
    Category {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Print sitemap.xml for the public site
    Sitemap,
}

/// Print an outcome; returns the process exit code.
fn report<T: Serialize>(outcome: FetchOutcome<T>, json: bool, empty_json: &str, text: impl FnOnce(&T) -> String) -> ExitCode {
    match outcome {
        FetchOutcome::Data(data) if json => match serde_json::to_string_pretty(&data) {
            Ok(out) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to serialize output: {e}");
                ExitCode::FAILURE
            }
        },
        FetchOutcome::Data(data) => {
            println!("{}", text(&data));
            ExitCode::SUCCESS
        }
        FetchOutcome::Empty if json => {
            println!("{empty_json}");
            ExitCode::SUCCESS
        }
        FetchOutcome::Empty => {
            println!("{}", render::NO_RESULTS);
            ExitCode::SUCCESS
        }
        FetchOutcome::Canceled => {
            eprintln!("cancelled");
            ExitCode::FAILURE
        }
        FetchOutcome::Failed(failure) => {
            eprintln!("{}", render::failure(&failure));
            ExitCode::FAILURE
        }
    }
}

pub async fn run(client: &DataClient, config: &AppConfig, args: Cli, cancel: &CancelToken) -> ExitCode {
    let json = args.json;
    match args.command {
        Commands::Search { query, limit, offset, all } => {
            let options = SearchOptions { limit, offset, fetch_all: all };
            let outcome = client.search_drugs(&query.join(" "), options, cancel).await;
            report(outcome, json, "[]", |drugs| render::drug_list(drugs))
        }
        Commands::Get { identifier } => {
            let outcome = client.get_drug(&identifier.join(" "), cancel).await;
            report(outcome, json, "null", render::drug_detail)
        }
        Commands::Categories => {
            let outcome = client.get_categories(cancel).await;
            report(outcome, json, "[]", |categories| categories.join("\n"))
        }
        Commands::Category { name } => {
            let outcome = client.get_drugs_by_category(&name.join(" "), cancel).await;
            report(outcome, json, "[]", |drugs| render::drug_list(drugs))
        }
        Commands::Sitemap => {
            let outcome = client.get_sitemap_drugs(cancel).await;
            if let Some(failure) = outcome.failure() {
                eprintln!("{}", render::failure(failure));
                return ExitCode::FAILURE;
            }
            if outcome.is_canceled() {
                eprintln!("cancelled");
                return ExitCode::FAILURE;
            }
            let drugs = outcome.into_data_or_default();
            match SitemapBuilder::new(&config.site_url).render(&drugs) {
                Ok(xml) => {
                    println!("{xml}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
