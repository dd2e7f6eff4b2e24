use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ConfigError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ConfigError::Document: {0}")]
    Document(#[from] toml::de::Error),
    #[error("ConfigError::Logger: {0}")]
    Logger(String),
    #[error("ConfigError::Missing: section [{0}] is required for this mode")]
    Missing(&'static str),
    #[error("ConfigError::Invalid: {0}")]
    Invalid(String),
}
impl From<log4rs::config::runtime::ConfigErrors> for ConfigError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        ConfigError::Logger(e.to_string())
    }
}
impl From<log::SetLoggerError> for ConfigError {
    fn from(e: log::SetLoggerError) -> Self {
        ConfigError::Logger(e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("forecast offset {offset} out of range, series holds {len} points")]
    IndexOutOfRange { offset: usize, len: usize },
    #[error("forecast point has an unrepresentable unix time {0}")]
    Timestamp(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepartureError {
    #[error("departure has neither an estimated nor a scheduled time")]
    MissingDeparture,
    #[error(transparent)]
    Time(#[from] TimeError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("no forecast row for display row {0}")]
    MissingForecastRow(usize),
}

/// Never leaves a fetch manager, the managers degrade it to an empty payload
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("UpstreamError::Http: {0}")]
    Http(String),
    #[error("UpstreamError::Document: {0}")]
    Document(String),
}
impl From<ureq::Error> for UpstreamError {
    fn from(e: ureq::Error) -> Self {
        UpstreamError::Http(e.to_string())
    }
}
impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        UpstreamError::Document(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("RenderError::Draw: {0}")]
    Draw(String),
    #[error("RenderError::Image: {0}")]
    Image(String),
}
impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Image(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("SensorError::Bus: {0}")]
    Bus(String),
    #[error("SensorError::Device: {0}")]
    Device(String),
    #[error("SensorError::NoSample: device did not report a complete sample")]
    NoSample,
    #[error("SensorError::Io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
#[error("error driving gpio line: {0}")]
pub struct GpioError(pub String);
impl From<linux_embedded_hal::sysfs_gpio::Error> for GpioError {
    fn from(e: linux_embedded_hal::sysfs_gpio::Error) -> Self {
        GpioError(e.to_string())
    }
}

/// Fatal errors for one pass
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Departure(#[from] DepartureError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Gpio(#[from] GpioError),
}
