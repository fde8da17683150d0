use chrono::{DateTime, NaiveDate, NaiveDateTime};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    fs::File,
    io::{BufReader, Read},
    ops::Deref,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::RAW_DATA;

#[derive(thiserror::Error, Debug)]
pub enum ReadingsError {
    #[error("Failed to open the readings file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("Failed to deserialize the CSV file")]
    Csv(#[from] csv::Error),
    #[error("Invalid timestamp {value:?} at line {line}")]
    Timestamp { line: u64, value: String },
    #[error("Missing column {0:?} in the readings file")]
    MissingColumn(String),
    #[error("Missing decompression protocol")]
    Decompression,
}
type Result<T> = std::result::Result<T, ReadingsError>;

/// Columns of the readings file
pub const COLUMNS: [&str; 5] = ["created_at", "floor_level", "zone_id", "co2", "ta"];

#[derive(Deserialize, Debug)]
struct Record {
    created_at: String,
    floor_level: Option<String>,
    zone_id: Option<String>,
    co2: Option<f64>,
    ta: Option<f64>,
}

/// Floor level or zone identifier
///
/// Integer identifiers are sorted numerically, anything else lexicographically
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(String);
impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}
impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}
impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub floor_level: Option<EntityId>,
    pub zone_id: Option<EntityId>,
    /// CO2 concentration [ppm]
    pub co2: Option<f64>,
    /// Air temperature [C]
    pub ta: Option<f64>,
}

/// The entity the readings are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Floor,
    Zone,
}
impl EntityKind {
    pub fn of<'a>(&self, reading: &'a Reading) -> Option<&'a EntityId> {
        match self {
            EntityKind::Floor => reading.floor_level.as_ref(),
            EntityKind::Zone => reading.zone_id.as_ref(),
        }
    }
    /// Name of the entity column in the readings file
    pub fn column(&self) -> &'static str {
        match self {
            EntityKind::Floor => "floor_level",
            EntityKind::Zone => "zone_id",
        }
    }
}
impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Floor => write!(f, "floor"),
            EntityKind::Zone => write!(f, "zone"),
        }
    }
}

/// The measured field of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Co2,
    Temperature,
}
impl Measure {
    pub fn of(&self, reading: &Reading) -> Option<f64> {
        match self {
            Measure::Co2 => reading.co2,
            Measure::Temperature => reading.ta,
        }
    }
    /// Name of the measure column in the readings file
    pub fn column(&self) -> &'static str {
        match self {
            Measure::Co2 => "co2",
            Measure::Temperature => "ta",
        }
    }
    pub fn unit(&self) -> &'static str {
        match self {
            Measure::Co2 => "ppm",
            Measure::Temperature => "°C",
        }
    }
}

/// Parses a reading timestamp
///
/// Accepts ISO 8601 date-times with or without fractional seconds, with a space
/// or a `T` separator, with or without a UTC offset, and bare dates.
/// Timestamps with an offset are kept in their local time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// The sensor readings table
#[derive(Debug, Default)]
pub struct Readings {
    columns: Vec<String>,
    readings: Vec<Reading>,
}
impl Deref for Readings {
    type Target = [Reading];

    fn deref(&self) -> &Self::Target {
        &self.readings
    }
}
impl From<Vec<Reading>> for Readings {
    fn from(readings: Vec<Reading>) -> Self {
        Self {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            readings,
        }
    }
}
impl Readings {
    /// Reads the readings from a CSV stream
    ///
    /// The first bad row aborts the whole read
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        if !columns.iter().any(|c| c == "created_at") {
            return Err(ReadingsError::MissingColumn("created_at".to_string()));
        }

        let mut readings = vec![];
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let Record {
                created_at,
                floor_level,
                zone_id,
                co2,
                ta,
            } = record.deserialize(Some(&headers))?;
            let timestamp =
                parse_timestamp(&created_at).ok_or_else(|| ReadingsError::Timestamp {
                    line,
                    value: created_at.clone(),
                })?;
            readings.push(Reading {
                timestamp,
                floor_level: floor_level.map(EntityId::from),
                zone_id: zone_id.map(EntityId::from),
                co2: co2.filter(|x| x.is_finite()),
                ta: ta.filter(|x| x.is_finite()),
            });
        }
        Ok(Self { columns, readings })
    }
    /// Checks that the readings file has all the given columns
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        match columns
            .iter()
            .find(|&&column| !self.columns.iter().any(|c| c == column))
        {
            Some(column) => Err(ReadingsError::MissingColumn(column.to_string())),
            None => Ok(()),
        }
    }
    /// Returns the sorted set of floor levels or zone ids found in the readings
    pub fn entities(&self, kind: EntityKind) -> Vec<EntityId> {
        self.iter()
            .filter_map(|r| kind.of(r))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
    /// Returns the range of the readings timestamps
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.iter().map(|r| r.timestamp).min()?;
        let last = self.iter().map(|r| r.timestamp).max()?;
        Some((first, last))
    }
}

/// Readings file loader
///
/// The file is decompressed according to its extension: `.gz` or `.bz2` (with the `bzip2` feature)
pub struct ReadingsLoader {
    path: PathBuf,
}
impl Default for ReadingsLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from(RAW_DATA),
        }
    }
}
impl ReadingsLoader {
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            path: data_path.as_ref().to_path_buf(),
        }
    }
    pub fn load(self) -> Result<Readings> {
        let file = File::open(&self.path).map_err(|e| ReadingsError::Io(e, self.path.clone()))?;
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let buf = BufReader::new(file);
        let reader: Box<dyn Read> = match self.path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Box::new(GzDecoder::new(buf)),
            #[cfg(feature = "bzip2")]
            Some("bz2") => Box::new(bzip2::bufread::BzDecoder::new(buf)),
            #[cfg(not(feature = "bzip2"))]
            Some("bz2") => return Err(ReadingsError::Decompression),
            _ => Box::new(buf),
        };
        let readings = Readings::from_reader(reader)?;
        log::info!(
            "... loaded {} readings in {}ms",
            readings.len(),
            now.elapsed().as_millis()
        );
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::{error::Error, fs, io::Write};

    const CSV: &str = "\
created_at,floor_level,zone_id,co2,ta
2019-06-01 10:00:00,2,11,550.0,22.5
2019-06-01T11:30:00,10,3,,23.1
2019-06-01 12:00:00.250,1,3,1200,
";

    #[test]
    fn parses_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2019, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        for s in [
            "2019-06-01 10:00:00",
            "2019-06-01T10:00:00",
            "2019-06-01 10:00",
            "2019-06-01T10:00:00+02:00",
            "2019-06-01 10:00:00+00:00",
            "2019-06-01T10:00:00Z",
        ] {
            assert_eq!(parse_timestamp(s), Some(expected), "{s}");
        }
        assert_eq!(
            parse_timestamp("2019-06-01"),
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(parse_timestamp("06/01/2019 10h").is_none());
    }

    #[test]
    fn reads_readings() -> std::result::Result<(), Box<dyn Error>> {
        let readings = Readings::from_reader(CSV.as_bytes())?;
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].co2, Some(550.));
        assert_eq!(readings[1].co2, None);
        assert_eq!(readings[2].ta, None);
        assert_eq!(readings[1].zone_id, Some(EntityId::from("3")));
        Ok(())
    }

    #[test]
    fn entities_are_sorted_numerically() -> std::result::Result<(), Box<dyn Error>> {
        let readings = Readings::from_reader(CSV.as_bytes())?;
        let floors: Vec<_> = readings
            .entities(EntityKind::Floor)
            .into_iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(floors, vec!["1", "2", "10"]);
        let zones = readings.entities(EntityKind::Zone);
        assert_eq!(zones, vec![EntityId::from(3u32), EntityId::from(11u32)]);
        Ok(())
    }

    #[test]
    fn bad_timestamp_aborts_the_read() {
        let csv = "created_at,floor_level,co2\n2019-06-01 10:00:00,1,500\nyesterday,1,600\n";
        match Readings::from_reader(csv.as_bytes()) {
            Err(ReadingsError::Timestamp { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected a timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn bad_measure_aborts_the_read() {
        let csv = "created_at,floor_level,co2\n2019-06-01 10:00:00,1,high\n";
        assert!(matches!(
            Readings::from_reader(csv.as_bytes()),
            Err(ReadingsError::Csv(_))
        ));
    }

    #[test]
    fn missing_columns() -> std::result::Result<(), Box<dyn Error>> {
        assert!(matches!(
            Readings::from_reader("time,co2\n".as_bytes()),
            Err(ReadingsError::MissingColumn(_))
        ));
        let readings =
            Readings::from_reader("created_at,floor_level,co2\n2019-06-01,1,500\n".as_bytes())?;
        readings.require(&["floor_level", "co2"])?;
        match readings.require(&["zone_id", "ta"]) {
            Err(ReadingsError::MissingColumn(column)) => assert_eq!(column, "zone_id"),
            other => panic!("expected a missing column error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn missing_file() {
        let loader = ReadingsLoader::default().data_path("no/such/rawdata.csv");
        assert!(matches!(loader.load(), Err(ReadingsError::Io(..))));
    }

    #[test]
    fn loads_gzip_file() -> std::result::Result<(), Box<dyn Error>> {
        let dir = std::env::temp_dir().join("sensor-trends-readings-gz");
        fs::create_dir_all(&dir)?;
        let path = dir.join("rawdata.csv.gz");
        let mut gz = GzEncoder::new(File::create(&path)?, Compression::default());
        gz.write_all(CSV.as_bytes())?;
        gz.finish()?;
        let readings = ReadingsLoader::default().data_path(&path).load()?;
        assert_eq!(readings.len(), 3);
        assert_eq!(
            readings.time_range().map(|(_, last)| last.to_string()),
            Some("2019-06-01 12:00:00.250".to_string())
        );
        Ok(())
    }
}
