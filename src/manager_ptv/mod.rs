use hmac::{Hmac, Mac};
use log::{info, warn};
use sha1::Sha1;
use ureq::Agent;
use crate::config::PtvConfig;
use crate::departures::DepartureRecord;
use crate::errors::UpstreamError;
use crate::models::ptv_departures::PtvDepartures;

type HmacSha1 = Hmac<Sha1>;

const API_VERSION: &str = "/v3/";

/// Struct for fetching departures from the PTV timetable API
pub struct Ptv {
    agent: Agent,
    base_url: String,
    api_key: String,
    call: String,
}

impl Ptv {
    /// Returns a Ptv struct for the configured stop and direction
    ///
    /// # Arguments
    ///
    /// * 'config' - developer id, key, stop and query options
    pub fn new(config: &PtvConfig) -> Ptv {
        let agent_config = Agent::config_builder()
            .http_status_as_error(true)
            .build();

        let agent = agent_config.into();

        Ptv {
            agent,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            call: departures_call(config),
        }
    }

    /// Retrieves upcoming departures in upstream order, empty if the upstream is unavailable
    pub fn get_departures(&self) -> Vec<DepartureRecord> {
        match self.fetch() {
            Ok(departures) => {
                let records = departures.records();
                info!("fetched {} departures", records.len());
                records
            },
            Err(e) => {
                warn!("departures unavailable, continuing without: {}", e);
                Vec::new()
            },
        }
    }

    /// Returns the full request url with the signature appended
    pub fn signed_url(&self) -> Result<String, UpstreamError> {
        let signature = sign(&self.api_key, &self.call)?;

        Ok(format!("{}{}&signature={}", self.base_url, self.call, signature))
    }

    fn fetch(&self) -> Result<PtvDepartures, UpstreamError> {
        let url = self.signed_url()?;

        let json = self.agent
            .get(url.as_str())
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(serde_json::from_str(&json)?)
    }
}

/// Builds the path and query that gets signed, parameter order and the capitalized
/// boolean are part of what the signature covers
///
/// # Arguments
///
/// * 'config' - stop and query options
fn departures_call(config: &PtvConfig) -> String {
    format!("{}departures/route_type/{}/stop/{}?max_results={}&look_backwards={}&direction_id={}&devid={}",
            API_VERSION,
            config.route_type,
            config.stop,
            config.max_results,
            if config.look_backwards { "True" } else { "False" },
            config.direction_id,
            encode_component(&config.dev_id))
}

/// HMAC-SHA1 of the call, upper case hex
///
/// # Arguments
///
/// * 'key' - shared secret
/// * 'call' - path and query to sign
pub fn sign(key: &str, call: &str) -> Result<String, UpstreamError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| UpstreamError::Http(format!("signing key rejected: {}", e)))?;
    mac.update(call.as_bytes());

    Ok(mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect())
}

/// Form encodes a query value, unreserved characters are kept and space becomes '+'.
/// The signature covers these exact bytes, so the query must not be rebuilt by the
/// http client.
fn encode_component(value: &str) -> String {
    value.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => (b as char).to_string(),
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> PtvConfig {
        PtvConfig {
            dev_id: "3000123".to_string(),
            api_key: "9c132d31-6a30-4cac-8d8b-8a1970834799".to_string(),
            stop: "1071".to_string(),
            base_url: "http://timetableapi.ptv.vic.gov.au".to_string(),
            route_type: 0,
            direction_id: 1,
            max_results: 4,
            look_backwards: false,
        }
    }

    #[test]
    fn signature_matches_reference_vector() {
        let signature = sign("key", "The quick brown fox jumps over the lazy dog").unwrap();

        assert_eq!(signature, "DE7C9B85B8B78AA6BC8A7A36F70A90701C9DB4D9");
    }

    #[test]
    fn builds_call_in_signed_parameter_order() {
        assert_eq!(
            departures_call(&config()),
            "/v3/departures/route_type/0/stop/1071?max_results=4&look_backwards=False&direction_id=1&devid=3000123");
    }

    #[test]
    fn signed_url_appends_signature_of_call() {
        let ptv = Ptv::new(&config());
        let url = ptv.signed_url().unwrap();
        let expected_signature = sign(&config().api_key, &departures_call(&config())).unwrap();

        assert_eq!(url, format!(
            "http://timetableapi.ptv.vic.gov.au/v3/departures/route_type/0/stop/1071?max_results=4&look_backwards=False&direction_id=1&devid=3000123&signature={}",
            expected_signature));
        assert_eq!(expected_signature.len(), 40);
        assert!(expected_signature.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn encodes_query_values() {
        assert_eq!(encode_component("abc 1/2&x"), "abc+1%2F2%26x");
    }
}
