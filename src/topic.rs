//! Broker topic naming.
//!
//! Every conveyor owns a pair of feeds on the broker: a command feed the
//! panel publishes actions to, and a status feed the conveyor reports on.

use crate::config::BrokerConfig;

/// Logical feed on a conveyor's topic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Action commands sent to the conveyor (`V1` by default)
    Command,
    /// Status reports published by the conveyor (`V2` by default)
    Status,
}

impl Feed {
    /// Wire name of the feed under the given broker configuration.
    pub fn name(self, config: &BrokerConfig) -> &str {
        match self {
            Feed::Command => &config.command_feed,
            Feed::Status => &config.status_feed,
        }
    }
}

/// Build the wire topic `"{conveyor_id}/feeds/{feed_name}"`.
///
/// # Examples
///
/// ```
/// use cellctl::topic::build_topic;
///
/// assert_eq!(build_topic("0_SmartConvey2025", "V1"), "0_SmartConvey2025/feeds/V1");
/// ```
pub fn build_topic(conveyor_id: &str, feed_name: &str) -> String {
    format!("{}/feeds/{}", conveyor_id, feed_name)
}

/// Build the topic of a logical feed for a conveyor.
pub fn feed_topic(config: &BrokerConfig, conveyor_id: &str, feed: Feed) -> String {
    build_topic(conveyor_id, feed.name(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_topic_format() {
        assert_eq!(build_topic("user", "V2"), "user/feeds/V2");
    }

    #[test]
    fn test_build_topic_empty_parts() {
        assert_eq!(build_topic("", ""), "/feeds/");
    }

    #[test]
    fn test_feed_topic_uses_configured_names() {
        let mut config = BrokerConfig::default();
        assert_eq!(feed_topic(&config, "c1", Feed::Command), "c1/feeds/V1");
        assert_eq!(feed_topic(&config, "c1", Feed::Status), "c1/feeds/V2");

        config.status_feed = "status".to_string();
        assert_eq!(feed_topic(&config, "c1", Feed::Status), "c1/feeds/status");
    }
}
