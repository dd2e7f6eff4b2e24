use log::{info, warn};
use ureq::Agent;
use crate::config::StormConfig;
use crate::errors::UpstreamError;

const STORM_WORD: &str = "thunderstorm";

/// Outcome of scanning a forecast page for a word, a best-effort signal with no
/// notion of confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapedSignal {
    Mentioned,
    NotMentioned,
}

/// Struct for fetching public forecast text pages
pub struct Bom {
    agent: Agent,
    url: String,
    user_agent: String,
}

impl Bom {
    /// Returns a Bom struct for the configured forecast page
    ///
    /// # Arguments
    ///
    /// * 'config' - page url and user agent to present
    pub fn new(config: &StormConfig) -> Bom {
        let agent_config = Agent::config_builder()
            .http_status_as_error(true)
            .build();

        let agent = agent_config.into();

        Bom { agent, url: config.url.clone(), user_agent: config.user_agent.clone() }
    }

    /// Retrieves the raw page, empty if the upstream is unavailable
    pub fn get_forecast_text(&self) -> String {
        match self.fetch() {
            Ok(text) => text,
            Err(e) => {
                warn!("forecast page unavailable, treating as empty: {}", e);
                String::new()
            },
        }
    }

    fn fetch(&self) -> Result<String, UpstreamError> {
        let text = self.agent
            .get(self.url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(text)
    }
}

/// Case sensitive search for the word thunderstorm anywhere in the page
///
/// # Arguments
///
/// * 'text' - raw page body
pub fn scan_for_thunderstorm(text: &str) -> ScrapedSignal {
    let signal = if text.contains(STORM_WORD) { ScrapedSignal::Mentioned } else { ScrapedSignal::NotMentioned };
    info!("forecast page scanned ({} bytes): {:?}", text.len(), signal);

    signal
}
