//! Per entity time series aggregation
//!
//! An [Analysis] filters the readings of each floor or zone to a time window,
//! groups them into time buckets and reduces each bucket,
//! writing one CSV file per floor or zone.

use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    aggregation::{Aggregation, Reduction},
    bucket::BucketBy,
    readings::{EntityId, EntityKind, Measure, ReadingsError},
    window::Window,
    Readings,
};

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to create the output directory {1:?}")]
    OutputDir(#[source] io::Error, PathBuf),
    #[error("Failed to write {1:?}")]
    Write(#[source] csv::Error, PathBuf),
    #[error("The readings cannot be analyzed")]
    Readings(#[from] ReadingsError),
}
type Result<T> = std::result::Result<T, AnalysisError>;

/// Aggregation of the readings of one floor or zone, written to `path`
#[derive(Debug)]
pub struct Report {
    pub entity: EntityId,
    pub path: PathBuf,
    pub aggregation: Aggregation,
}

/// Time series analysis of the sensor readings
///
/// The output of floor (or zone) `#` is written to `<family>/<period>/<prefix>_floor#.csv`
#[derive(Debug, Clone)]
pub struct Analysis {
    family: String,
    period: String,
    prefix: String,
    entity: EntityKind,
    measure: Measure,
    window: Window,
    bucket: BucketBy,
    bucket_headers: Option<Vec<&'static str>>,
    reduction: Reduction,
}
impl Analysis {
    /// Creates a new analysis of the hourly mean CO2 per floor over all the readings
    pub fn new<S: Into<String>>(family: S, period: S, prefix: S) -> Self {
        Self {
            family: family.into(),
            period: period.into(),
            prefix: prefix.into(),
            entity: EntityKind::Floor,
            measure: Measure::Co2,
            window: Window::All,
            bucket: BucketBy::HourOfDay,
            bucket_headers: None,
            reduction: Reduction::Mean,
        }
    }
    pub fn entity(self, entity: EntityKind) -> Self {
        Self { entity, ..self }
    }
    pub fn measure(self, measure: Measure) -> Self {
        Self { measure, ..self }
    }
    pub fn window(self, window: Window) -> Self {
        Self { window, ..self }
    }
    pub fn bucket(self, bucket: BucketBy) -> Self {
        Self { bucket, ..self }
    }
    /// Overrides the default CSV headers of the bucket key
    pub fn bucket_headers(self, headers: Vec<&'static str>) -> Self {
        Self {
            bucket_headers: Some(headers),
            ..self
        }
    }
    pub fn reduction(self, reduction: Reduction) -> Self {
        Self { reduction, ..self }
    }
    pub fn entity_kind(&self) -> EntityKind {
        self.entity
    }
    pub fn measured(&self) -> Measure {
        self.measure
    }
    pub fn headers(&self) -> Vec<&'static str> {
        self.bucket_headers
            .clone()
            .unwrap_or_else(|| self.bucket.headers())
    }
    /// Directory the CSV files are written to
    pub fn output_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.family).join(&self.period)
    }
    /// Path to the CSV file of a floor or zone
    pub fn output_path<P: AsRef<Path>>(&self, root: P, entity: &EntityId) -> PathBuf {
        self.output_dir(root)
            .join(format!("{}_{}{}.csv", self.prefix, self.entity, entity))
    }
    /// Aggregates the readings of a floor or zone
    ///
    /// Returns `None` if there isn't any reading within the window
    pub fn aggregate(&self, readings: &Readings, entity: &EntityId) -> Option<Aggregation> {
        let entity_readings: Vec<_> = readings
            .iter()
            .filter(|r| self.entity.of(r) == Some(entity))
            .collect();
        // bounds from every reading of the entity, measured or not
        let (window, selection) = self.window.select(entity_readings)?;
        log::debug!(
            "{}/{} {} {}: {} readings in {}",
            self.family,
            self.period,
            self.entity,
            entity,
            selection.len(),
            window
        );
        self.reduction.reduce(selection.into_iter().filter_map(|r| {
            self.measure
                .of(r)
                .map(|value| (self.bucket.key(&r.timestamp), value))
        }))
    }
    /// Runs the analysis for every floor or zone in the readings
    ///
    /// Floors or zones without readings within the window are skipped
    pub fn run<P: AsRef<Path>>(&self, readings: &Readings, root: P) -> Result<Vec<Report>> {
        readings.require(&[self.entity.column(), self.measure.column()])?;
        let root = root.as_ref();
        let dir = self.output_dir(root);
        fs::create_dir_all(&dir).map_err(|e| AnalysisError::OutputDir(e, dir.clone()))?;
        let headers = self.headers();
        let reports = readings
            .entities(self.entity)
            .into_par_iter()
            .map(|entity| match self.aggregate(readings, &entity) {
                Some(aggregation) => {
                    let path = self.output_path(root, &entity);
                    aggregation
                        .to_csv(&path, &headers, self.measure.column())
                        .map_err(|e| AnalysisError::Write(e, path.clone()))?;
                    log::info!("Data saved to {:?}", path);
                    Ok(Some(Report {
                        entity,
                        path,
                        aggregation,
                    }))
                }
                None => {
                    log::info!(
                        "{}/{}: no readings for {} {} within {}, skipped",
                        self.family,
                        self.period,
                        self.entity,
                        entity,
                        self.window
                    );
                    Ok(None)
                }
            })
            .collect::<Result<Vec<Option<Report>>>>()?;
        Ok(reports.into_iter().flatten().collect())
    }
}
