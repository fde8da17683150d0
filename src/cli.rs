//! Command line options and runners shared by the binaries

use chrono::NaiveDate;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::{coverage::ZoneCoverage, Error, Readings, ReadingsLoader, Report, Variant};

#[derive(Debug, StructOpt)]
pub struct Opt {
    /// Sensor readings CSV file, optionally gzip (.gz) or bzip2 (.bz2) compressed
    #[structopt(
        short,
        long,
        parse(from_os_str),
        env = "SENSOR_TRENDS_INPUT",
        default_value = "rawdata.csv"
    )]
    pub input: PathBuf,
    /// Root directory of the CSV outputs
    #[structopt(
        short,
        long,
        parse(from_os_str),
        env = "SENSOR_TRENDS_OUTPUT",
        default_value = "."
    )]
    pub output: PathBuf,
    /// Day of the 12 hours CO2 history (YYYY-MM-DD)
    #[structopt(long, env = "SENSOR_TRENDS_DATE", default_value = "2019-06-01")]
    pub date: NaiveDate,
}
impl Opt {
    pub fn load(&self) -> Result<Readings, Error> {
        Ok(ReadingsLoader::default().data_path(&self.input).load()?)
    }
}

/// Prints the per floor or zone summaries of a variant
pub fn summary(variant: Variant, date: NaiveDate, reports: &[Report]) {
    let analysis = variant.analysis(date);
    let headers = analysis.headers();
    println!("\n{} ({variant})", variant.title());
    for report in reports {
        println!("\n{} {}:", analysis.entity_kind(), report.entity);
        report.aggregation.summary(&headers, analysis.measured());
        println!("Data saved to {:?}", report.path);
    }
}

/// Runs one variant on the readings file
pub fn run(variant: Variant, opt: &Opt) -> Result<Vec<Report>, Error> {
    let readings = opt.load()?;
    if variant.reports_zone_coverage() {
        ZoneCoverage::new(&readings).summary();
    }
    let reports = variant.analysis(opt.date).run(&readings, &opt.output)?;
    summary(variant, opt.date, &reports);
    Ok(reports)
}

/// Runs several variants in parallel, loading the readings file once
pub fn run_all(variants: &[Variant], opt: &Opt) -> Result<Vec<(Variant, Vec<Report>)>, Error> {
    let readings = opt.load()?;
    if variants.iter().any(|v| v.reports_zone_coverage()) {
        ZoneCoverage::new(&readings).summary();
    }
    let pb = ProgressBar::new(variants.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} variants [{elapsed}]") {
        pb.set_style(style);
    }
    let results = variants
        .par_iter()
        .progress_with(pb)
        .map(|&variant| {
            let reports = variant.analysis(opt.date).run(&readings, &opt.output)?;
            Ok((variant, reports))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    for (variant, reports) in &results {
        summary(*variant, opt.date, reports);
    }
    Ok(results)
}
