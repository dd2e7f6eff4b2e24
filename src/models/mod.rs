pub mod darksky_forecast;
pub mod ptv_departures;
