use serde::Deserialize;
use crate::departures::DepartureRecord;

#[derive(Deserialize, Debug)]
pub struct PtvDeparture {
    pub estimated_departure_utc: Option<String>,
    pub scheduled_departure_utc: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PtvDepartures {
    #[serde(default)]
    pub departures: Vec<PtvDeparture>,
}

impl PtvDepartures {
    pub fn records(self) -> Vec<DepartureRecord> {
        self.departures
            .into_iter()
            .map(|d| DepartureRecord {
                estimated_departure: d.estimated_departure_utc,
                scheduled_departure: d.scheduled_departure_utc,
            })
            .collect()
    }
}
