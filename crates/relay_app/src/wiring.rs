//! Builds the concrete collaborators a configured run talks to.

use anyhow::Context;
use relay_engine::{
    BloggerPublisher, Collaborators, FetchSettings, GoogleWebTranslator, HttpFeedSource,
    HttpPutStore, LocalDirStore, ObjectStore, Publisher, ReqwestFetcher, WebhookPublisher,
};

use crate::config::{AppConfig, DestinationConfig, StorageConfig};

pub fn collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    let timeout = config.publish_timeout();

    let publisher: Box<dyn Publisher> = match &config.destination {
        Some(DestinationConfig::Blogger {
            api_base,
            blog_id,
            token,
        }) => Box::new(
            BloggerPublisher::new(api_base.as_str(), blog_id.as_str(), token.as_str(), timeout)
                .context("creating Blogger client")?,
        ),
        Some(DestinationConfig::Webhook { url }) => Box::new(
            WebhookPublisher::new(url.as_str(), timeout).context("creating webhook client")?,
        ),
        None => anyhow::bail!("no publishing destination configured"),
    };

    let store: Option<Box<dyn ObjectStore>> = match &config.storage {
        None => None,
        Some(StorageConfig::LocalDir { dir, public_base }) => {
            Some(Box::new(LocalDirStore::new(dir.clone(), public_base.as_str())))
        }
        Some(StorageConfig::HttpPut {
            endpoint,
            public_base,
            token,
        }) => Some(Box::new(
            HttpPutStore::new(endpoint.as_str(), public_base.as_str(), token.clone(), timeout)
                .context("creating image storage client")?,
        )),
    };

    let translator = GoogleWebTranslator::new(config.translate_endpoint.as_str(), timeout)
        .context("creating translation client")?;

    Ok(Collaborators {
        feed: Box::new(HttpFeedSource::new(FetchSettings::default())),
        translator: Box::new(translator),
        fetcher: Box::new(ReqwestFetcher::new(FetchSettings::for_images())),
        store,
        publisher,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn builds_from_validated_config() {
        let config = AppConfig {
            feed_url: "https://source.example/rss".into(),
            destination: Some(DestinationConfig::Blogger {
                api_base: "https://blogger.example/v3".into(),
                blog_id: "42".into(),
                token: "token".into(),
            }),
            storage: Some(StorageConfig::LocalDir {
                dir: PathBuf::from("img"),
                public_base: "https://cdn.example".into(),
            }),
            ..AppConfig::default()
        };
        config.validate().unwrap();
        assert!(collaborators(&config).is_ok());
    }

    #[test]
    fn missing_destination_is_an_error() {
        assert!(collaborators(&AppConfig::default()).is_err());
    }
}
