//! Command-line interface definitions for the headline scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can be given as a flag or through the environment, and a
//! `.env` file in the working directory is loaded before parsing.

use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// Command-line arguments for the headline scraper.
///
/// # Examples
///
/// ```sh
/// # Serve on the default port with the default store
/// headline_scraper
///
/// # Different port and store
/// PORT=8080 headline_scraper --database-url sqlite:///var/lib/headlines.db
///
/// # Scrape once into the store and exit
/// headline_scraper --once
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Store connection string: a file path, `sqlite://<path>`, or `:memory:`
    #[arg(short, long, env = "DATABASE_URL", default_value = "headlines.db")]
    pub database_url: String,

    /// Listing page scraped by `/scrape`
    #[arg(
        short,
        long,
        env = "SCRAPE_SOURCE_URL",
        default_value = "https://medium.com/topic/technology"
    )]
    pub source_url: Url,

    /// Directory of static files served for unmatched paths
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Run one scrape into the store and exit instead of serving
    #[arg(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "headline_scraper",
            "--port",
            "8080",
            "--database-url",
            ":memory:",
            "--source-url",
            "http://localhost:9000/listing",
            "--public-dir",
            "/srv/public",
        ]);

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.database_url, ":memory:");
        assert_eq!(cli.source_url.as_str(), "http://localhost:9000/listing");
        assert_eq!(cli.public_dir, PathBuf::from("/srv/public"));
        assert!(!cli.once);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "headline_scraper",
            "-p",
            "4000",
            "-d",
            "/tmp/headlines.db",
            "--once",
        ]);

        assert_eq!(cli.port, 4000);
        assert_eq!(cli.database_url, "/tmp/headlines.db");
        assert!(cli.once);
    }

    #[test]
    fn test_cli_rejects_bad_source_url() {
        let result = Cli::try_parse_from(["headline_scraper", "--source-url", "not a url"]);
        assert!(result.is_err());
    }
}
