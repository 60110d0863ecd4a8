//! CLI module - Command-line interface for Navi
//!
//! Every command prints the assembled view as pretty JSON.

mod commands;

use crate::query::SortField;
use clap::{Args, Parser, Subcommand};

/// Navi - catalog views over the Notion tables
#[derive(Parser)]
#[command(name = "navi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct ListingArgs {
    /// Required category (repeatable; all must match)
    #[arg(long = "category", short = 'c')]
    pub categories: Vec<String>,

    /// Genre to filter by
    #[arg(long, short = 'g')]
    pub genre: Option<String>,

    /// Case-insensitive search over name and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort order: recency, views, revenue or name
    #[arg(long, default_value = "recency", value_parser = parse_sort)]
    pub sort: SortField,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List published people
    #[command(alias = "ls")]
    People(ListingArgs),

    /// List published contents
    Contents {
        #[command(flatten)]
        listing: ListingArgs,

        /// Only contents featuring this person id
        #[arg(long)]
        performer: Option<String>,

        /// Only contents in this uniform category id
        #[arg(long)]
        uniform: Option<String>,
    },

    /// Show a person page (person, own contents, related contents)
    #[command(alias = "p")]
    Person {
        /// Person slug or full id
        slug: String,
    },

    /// Show a content page with its performers
    #[command(alias = "c")]
    Content {
        /// Content id
        id: String,
    },

    /// List published genres
    Genres,

    /// List published uniform categories
    Uniforms,

    /// List every category tag in use
    Categories,

    /// List published ranking articles
    Rankings,

    /// Show a ranking article with its entries
    Ranking {
        /// Ranking slug
        slug: String,
    },

    /// Increment a view counter
    Increment {
        /// Record id
        id: String,

        /// The record is a person rather than a content
        #[arg(long)]
        person: bool,
    },

    /// List affiliate widgets for a site path
    Affiliates {
        /// Placement path, e.g. "/"
        placement: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

fn parse_sort(value: &str) -> Result<SortField, String> {
    match value.trim().to_lowercase().as_str() {
        "recency" | "new" | "newest" => Ok(SortField::Recency),
        "views" | "popular" | "popularity" => Ok(SortField::Views),
        "revenue" | "sales" => Ok(SortField::Revenue),
        "name" => Ok(SortField::Name),
        other => Err(format!(
            "unknown sort '{other}' (expected recency, views, revenue or name)"
        )),
    }
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_flags() {
        let cli = Cli::parse_from([
            "navi", "contents", "-c", "a", "-c", "b", "--sort", "views", "--performer", "p1",
        ]);
        let Some(Commands::Contents {
            listing, performer, ..
        }) = cli.command
        else {
            panic!("expected contents");
        };
        assert_eq!(listing.categories, vec!["a", "b"]);
        assert_eq!(listing.sort, SortField::Views);
        assert_eq!(performer.as_deref(), Some("p1"));
    }

    #[test]
    fn rejects_unknown_sort() {
        assert!(parse_sort("random").is_err());
        assert_eq!(parse_sort("Name"), Ok(SortField::Name));
    }
}
