use log::{debug, warn};
use serde::Deserialize;
use crate::departures::DepartureRow;
use crate::errors::LayoutError;
use crate::weather::ForecastRow;

/// Built-in coordinate tables, one per display variant
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Auto detected Inky board with a sensor annotation line
    InkyAuto,
    /// Inky pHAT without sensors
    InkyPhat,
}

/// Font size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Data,
    Label,
    Annotation,
}

/// What a draw instruction belongs to, used by the renderer to pick its failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    WeatherRow(usize),
    WeatherHeader,
    TransitRow(usize),
    TransitHeader,
    Sensor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawInstruction {
    pub position: (i32, i32),
    pub text: String,
    pub style: TextStyle,
    pub slot: Slot,
}

/// A straight separator line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// hour, temperature, cloud %, rain mm
    pub weather_columns: [i32; 4],
    pub transit_column: i32,
    pub data_rows: Vec<i32>,
    pub label_row: i32,
    pub weather_headers: [&'static str; 4],
    pub transit_header: &'static str,
    pub rules: Vec<Rule>,
    pub sensor_position: Option<(i32, i32)>,
}

const WEATHER_COLUMNS: [i32; 4] = [10, 40, 70, 100];
const TRANSIT_COLUMN: i32 = 140;
const TRANSIT_HEADER: &str = "   Train";

impl Layout {
    pub fn for_kind(kind: LayoutKind) -> Layout {
        match kind {
            LayoutKind::InkyAuto => Layout::inky_auto(),
            LayoutKind::InkyPhat => Layout::inky_phat(),
        }
    }

    pub fn inky_auto() -> Layout {
        Layout {
            weather_columns: WEATHER_COLUMNS,
            transit_column: TRANSIT_COLUMN,
            data_rows: vec![20, 40, 60],
            label_row: 0,
            weather_headers: ["LTS", " °C", "c%", "mm"],
            transit_header: TRANSIT_HEADER,
            rules: vec![
                Rule { from: (7, 17), to: (203, 17) },
                Rule { from: (133, 17), to: (133, 80) },
                Rule { from: (7, 80), to: (203, 80) },
            ],
            sensor_position: Some((10, 82)),
        }
    }

    pub fn inky_phat() -> Layout {
        Layout {
            weather_columns: WEATHER_COLUMNS,
            transit_column: TRANSIT_COLUMN,
            data_rows: vec![30, 50, 70],
            label_row: 10,
            weather_headers: ["LTS", " °C", " %", "mm"],
            transit_header: TRANSIT_HEADER,
            rules: vec![
                Rule { from: (7, 27), to: (203, 27) },
                Rule { from: (133, 29), to: (133, 96) },
            ],
            sensor_position: None,
        }
    }

    /// Number of data rows, also the display cap for departures
    pub fn row_count(&self) -> usize {
        self.data_rows.len()
    }
}

/// Places normalized values and static headers on the layout grid.
///
/// Every data row needs a forecast row, a missing one fails the composition.
/// Departures beyond the available rows are left out.
///
/// # Arguments
///
/// * 'layout' - the coordinate table
/// * 'forecast_rows' - normalized forecast, one per data row
/// * 'departure_rows' - normalized departures
/// * 'sensor_text' - annotation, only given when a sensor reading was obtained
pub fn compose(layout: &Layout, forecast_rows: &[ForecastRow], departure_rows: &[DepartureRow], sensor_text: Option<&str>)
    -> Result<Vec<DrawInstruction>, LayoutError> {

    let mut instructions: Vec<DrawInstruction> = Vec::new();

    for (i, &y) in layout.data_rows.iter().enumerate() {
        let row = forecast_rows.get(i).ok_or(LayoutError::MissingForecastRow(i))?;
        let cells = [&row.hour_label, &row.temp_label, &row.cloud_label, &row.rain_label];

        for (&x, text) in layout.weather_columns.iter().zip(cells) {
            instructions.push(DrawInstruction {
                position: (x, y),
                text: text.clone(),
                style: TextStyle::Data,
                slot: Slot::WeatherRow(i),
            });
        }
    }

    for (i, departure) in departure_rows.iter().enumerate() {
        match layout.data_rows.get(i) {
            Some(&y) => instructions.push(DrawInstruction {
                position: (layout.transit_column, y),
                text: departure.to_string(),
                style: TextStyle::Data,
                slot: Slot::TransitRow(i),
            }),
            None => warn!("departure {} ({}) has no display row, skipped", i, departure),
        }
    }

    for (&x, header) in layout.weather_columns.iter().zip(layout.weather_headers) {
        instructions.push(DrawInstruction {
            position: (x, layout.label_row),
            text: header.to_string(),
            style: TextStyle::Label,
            slot: Slot::WeatherHeader,
        });
    }
    instructions.push(DrawInstruction {
        position: (layout.transit_column, layout.label_row),
        text: layout.transit_header.to_string(),
        style: TextStyle::Label,
        slot: Slot::TransitHeader,
    });

    match (sensor_text, layout.sensor_position) {
        (Some(text), Some(position)) => instructions.push(DrawInstruction {
            position,
            text: text.to_string(),
            style: TextStyle::Annotation,
            slot: Slot::Sensor,
        }),
        (Some(_), None) => debug!("layout has no sensor slot, annotation left out"),
        _ => {},
    }

    Ok(instructions)
}
