use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_CONFIG_FILE: &str = "feed_relay.ron";

/// Translate new feed entries and publish them to a blog or webhook
#[derive(Parser, Debug, Default)]
#[command(name = "feed-relay")]
#[command(version)]
#[command(about = "Relay new feed entries, translated, to a publishing destination", long_about = None)]
pub struct Args {
    /// RON configuration file (default: ./feed_relay.ron, optional)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Feed to read, overrides FEED_URL and the config file
    #[arg(long, value_name = "URL")]
    pub feed_url: Option<String>,

    /// Dedup state file, overrides POSTED_FILE
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Entries taken from the head of the feed, overrides MAX_ITEMS
    #[arg(long, value_name = "NUM")]
    pub max_items: Option<usize>,

    /// Publish posts live instead of as drafts
    #[arg(long)]
    pub publish: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also append log output to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// The config file to read and whether the user named it explicitly.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let args = Args::parse_from([
            "feed-relay",
            "--config",
            "relay.ron",
            "--feed-url",
            "https://blog.example/rss",
            "--max-items",
            "3",
            "--publish",
            "-v",
        ]);
        assert_eq!(args.config_path(), (PathBuf::from("relay.ron"), true));
        assert_eq!(args.feed_url.as_deref(), Some("https://blog.example/rss"));
        assert_eq!(args.max_items, Some(3));
        assert!(args.publish);
        assert!(args.verbose);
    }

    #[test]
    fn default_config_is_optional() {
        let args = Args::parse_from(["feed-relay"]);
        assert_eq!(args.config_path(), (PathBuf::from(DEFAULT_CONFIG_FILE), false));
        assert!(!args.publish);
    }
}
