//! Bucketed reductions of the readings

use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    path::Path,
};

use crate::{bucket::Bucket, category::Classifier, readings::Measure};

/// Rounds to 2 decimal places, ties to even
pub fn round2(x: f64) -> f64 {
    (x * 100.).round_ties_even() / 100.
}

fn format_value(x: f64) -> String {
    format!("{:?}", x)
}

/// Count, mean, sample standard deviation, minimum and maximum of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    /// `None` for a single value sample
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}
impl Stats {
    pub fn new(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            Some(
                (values
                    .iter()
                    .map(|x| x - mean)
                    .fold(0f64, |s, x| s + x * x)
                    / (n - 1.))
                    .sqrt(),
            )
        } else {
            None
        };
        Some(Self {
            count: values.len(),
            mean,
            std,
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }
    fn round(self) -> Self {
        Self {
            mean: round2(self.mean),
            std: self.std.map(round2),
            min: round2(self.min),
            max: round2(self.max),
            ..self
        }
    }
}

/// Reduction applied to the readings of each bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Mean of the bucket rounded to 2 decimals, heatmap tables included
    Mean,
    /// Count, mean, sample std, min and max, rounded to 2 decimals
    MeanStats,
    /// Share of each category in the bucket, in percent
    CategoryPercentage(Classifier),
}
impl Reduction {
    /// Reduces the (bucket,value) samples
    ///
    /// Returns `None` if there isn't any sample
    pub fn reduce<I>(&self, samples: I) -> Option<Aggregation>
    where
        I: IntoIterator<Item = (Bucket, f64)>,
    {
        let mut buckets: BTreeMap<Bucket, Vec<f64>> = BTreeMap::new();
        for (bucket, value) in samples {
            buckets.entry(bucket).or_default().push(value);
        }
        if buckets.is_empty() {
            return None;
        }
        Some(match self {
            Reduction::Mean => Aggregation::Mean(
                buckets
                    .into_iter()
                    .map(|(bucket, values)| {
                        (
                            bucket,
                            round2(values.iter().sum::<f64>() / values.len() as f64),
                        )
                    })
                    .collect(),
            ),
            Reduction::MeanStats => Aggregation::Stats(
                buckets
                    .into_iter()
                    .filter_map(|(bucket, values)| Stats::new(&values).map(|s| (bucket, s.round())))
                    .collect(),
            ),
            Reduction::CategoryPercentage(classifier) => {
                let counts: BTreeMap<Bucket, BTreeMap<&'static str, usize>> = buckets
                    .into_iter()
                    .map(|(bucket, values)| {
                        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
                        for value in values {
                            *counts.entry(classifier.label(value)).or_default() += 1;
                        }
                        (bucket, counts)
                    })
                    .collect();
                let categories: Vec<&'static str> = counts
                    .values()
                    .flat_map(|counts| counts.keys().cloned())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let table = counts
                    .into_iter()
                    .map(|(bucket, counts)| {
                        let total = counts.values().sum::<usize>() as f64;
                        let percentages = categories
                            .iter()
                            .map(|category| {
                                let count = counts.get(category).copied().unwrap_or_default();
                                round2(100. * count as f64 / total)
                            })
                            .collect();
                        (bucket, percentages)
                    })
                    .collect();
                Aggregation::Percentage { categories, table }
            }
        })
    }
}

/// Bucketed reduction of the readings of one entity
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Mean of the measure per bucket
    Mean(BTreeMap<Bucket, f64>),
    /// Statistics of the measure per bucket
    Stats(BTreeMap<Bucket, Stats>),
    /// Percentage of readings per bucket and category, categories are sorted
    Percentage {
        categories: Vec<&'static str>,
        table: BTreeMap<Bucket, Vec<f64>>,
    },
}
impl Aggregation {
    /// Number of buckets
    pub fn len(&self) -> usize {
        match self {
            Aggregation::Mean(table) => table.len(),
            Aggregation::Stats(table) => table.len(),
            Aggregation::Percentage { table, .. } => table.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Returns the CSV header
    pub fn headers(&self, bucket_headers: &[&str], measure: &str) -> Vec<String> {
        let mut headers: Vec<String> = bucket_headers.iter().map(|h| h.to_string()).collect();
        match self {
            Aggregation::Mean(_) => headers.push(measure.to_string()),
            Aggregation::Stats(_) => {
                headers.extend(["mean", "std", "min", "max", "count"].map(String::from))
            }
            Aggregation::Percentage { categories, .. } => {
                headers.extend(categories.iter().map(|c| c.to_string()))
            }
        }
        headers
    }
    /// Returns the CSV records, one per bucket
    pub fn records(&self) -> Vec<Vec<String>> {
        match self {
            Aggregation::Mean(table) => table
                .iter()
                .map(|(bucket, mean)| {
                    let mut record = bucket.fields();
                    record.push(format_value(*mean));
                    record
                })
                .collect(),
            Aggregation::Stats(table) => table
                .iter()
                .map(|(bucket, stats)| {
                    let mut record = bucket.fields();
                    record.extend([
                        format_value(stats.mean),
                        stats.std.map(format_value).unwrap_or_default(),
                        format_value(stats.min),
                        format_value(stats.max),
                        stats.count.to_string(),
                    ]);
                    record
                })
                .collect(),
            Aggregation::Percentage { table, .. } => table
                .iter()
                .map(|(bucket, percentages)| {
                    let mut record = bucket.fields();
                    record.extend(percentages.iter().map(|p| format_value(*p)));
                    record
                })
                .collect(),
        }
    }
    /// Writes the table to a CSV stream
    pub fn to_writer<W: io::Write>(
        &self,
        writer: W,
        bucket_headers: &[&str],
        measure: &str,
    ) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.headers(bucket_headers, measure))?;
        for record in self.records() {
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
    /// Writes the table to a CSV file, overwriting any existing file
    pub fn to_csv<P: AsRef<Path>>(
        &self,
        path: P,
        bucket_headers: &[&str],
        measure: &str,
    ) -> Result<(), csv::Error> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file, bucket_headers, measure)
    }
    /// Prints a summary of the table
    pub fn summary(&self, bucket_headers: &[&str], measure: Measure) {
        let unit = measure.unit();
        match self {
            Aggregation::Mean(table) => {
                let means: Vec<f64> = table.values().cloned().collect();
                if let Some(stats) = Stats::new(&means) {
                    println!(" - # of buckets: {}", table.len());
                    println!(
                        " - {} range: {:.2}{unit} to {:.2}{unit}",
                        measure.column(),
                        stats.min,
                        stats.max
                    );
                    println!(" - average {}: {:.2}{unit}", measure.column(), stats.mean);
                }
            }
            Aggregation::Stats(table) => {
                let min = table.values().map(|s| s.min).fold(f64::INFINITY, f64::min);
                let max = table.values().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);
                let mean = table.values().map(|s| s.mean).sum::<f64>() / table.len() as f64;
                println!(" - # of buckets with data: {}", table.len());
                println!(
                    " - {} range: {:.2}{unit} to {:.2}{unit}",
                    measure.column(),
                    min,
                    max
                );
                println!(" - average {}: {:.2}{unit}", measure.column(), mean);
                println!(
                    " - total data points: {}",
                    table.values().map(|s| s.count).sum::<usize>()
                );
            }
            Aggregation::Percentage { .. } => {
                let headers = self.headers(bucket_headers, measure.column());
                println!("{}", headers.iter().map(|h| format!("{h:>18}")).collect::<String>());
                for record in self.records() {
                    println!("{}", record.iter().map(|r| format!("{r:>18}")).collect::<String>());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn day(d: u32) -> Bucket {
        Bucket::Date(NaiveDate::from_ymd_opt(2019, 5, d).unwrap())
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(100. / 3.), 33.33);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(format_value(100.), "100.0");
        assert_eq!(format_value(round2(200. / 3.)), "66.67");
    }

    #[test]
    fn sample_statistics() {
        let stats = Stats::new(&[20., 22., 24.]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 22.);
        assert_eq!(stats.std, Some(2.));
        assert_eq!((stats.min, stats.max), (20., 24.));
        assert_eq!(Stats::new(&[21.5]).unwrap().std, None);
        assert!(Stats::new(&[]).is_none());
    }

    #[test]
    fn empty_samples() {
        assert!(Reduction::Mean.reduce(vec![]).is_none());
        assert!(Reduction::CategoryPercentage(Classifier::Co2)
            .reduce(vec![])
            .is_none());
    }

    #[test]
    fn hourly_mean() {
        let aggregation = Reduction::Mean
            .reduce(vec![
                (Bucket::Hour(9), 500.),
                (Bucket::Hour(8), 400.),
                (Bucket::Hour(9), 601.),
                (Bucket::Hour(9), 700.),
            ])
            .unwrap();
        let mut buffer = vec![];
        aggregation.to_writer(&mut buffer, &["time"], "co2").unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "time,co2\n8,400.0\n9,600.33\n"
        );
    }

    #[test]
    fn single_reading_has_no_std() {
        let aggregation = Reduction::MeanStats
            .reduce(vec![
                (Bucket::Hour(0), 21.),
                (Bucket::Hour(0), 23.),
                (Bucket::Hour(1), 22.123),
            ])
            .unwrap();
        let mut buffer = vec![];
        aggregation.to_writer(&mut buffer, &["hour"], "ta").unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "hour,mean,std,min,max,count\n0,22.0,1.41,21.0,23.0,2\n1,22.12,,22.12,22.12,1\n"
        );
    }

    #[test]
    fn percentages_with_missing_categories() {
        let aggregation = Reduction::CategoryPercentage(Classifier::Co2)
            .reduce(vec![
                (day(2), 1200.),
                (day(1), 500.),
                (day(1), 800.),
                (day(1), 900.),
                (day(2), 400.),
            ])
            .unwrap();
        let mut buffer = vec![];
        aggregation.to_writer(&mut buffer, &["date"], "co2").unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "date,excellent,fair,needs_improvement\n\
             2019-05-01,33.33,66.67,0.0\n\
             2019-05-02,50.0,0.0,50.0\n"
        );
    }

    #[test]
    fn only_seen_categories_are_columns() {
        match Reduction::CategoryPercentage(Classifier::ThermalComfort)
            .reduce(vec![(day(1), 22.), (day(2), 27.), (day(2), 23.)])
            .unwrap()
        {
            Aggregation::Percentage { categories, table } => {
                assert_eq!(categories, vec!["comfortable", "too_hot"]);
                assert_eq!(table[&day(1)], vec![100., 0.]);
            }
            other => panic!("expected percentages, got {other:?}"),
        }
    }

    #[test]
    fn percentages_sum_to_100() {
        let mut rng = StdRng::seed_from_u64(2019);
        let samples: Vec<_> = (0..5000)
            .map(|_| (Bucket::Hour(rng.gen_range(0..24)), rng.gen_range(300f64..1500f64)))
            .collect();
        let aggregation = Reduction::CategoryPercentage(Classifier::Co2)
            .reduce(samples)
            .unwrap();
        let Aggregation::Percentage { table, .. } = aggregation else {
            panic!("expected percentages")
        };
        assert_eq!(table.len(), 24);
        for percentages in table.values() {
            let total: f64 = percentages.iter().sum();
            assert!((total - 100.).abs() <= 0.01 + 1e-9, "{total}");
            assert!(percentages.iter().all(|p| *p >= 0.));
        }
    }

    #[test]
    fn mean_is_within_min_max() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<_> = (0..2000)
            .map(|_| (Bucket::Hour(rng.gen_range(0..24)), rng.gen_range(15f64..30f64)))
            .collect();
        let Some(Aggregation::Stats(table)) = Reduction::MeanStats.reduce(samples) else {
            panic!("expected statistics")
        };
        for stats in table.values() {
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
            assert!(stats.count >= 1);
        }
        assert_eq!(table.values().map(|s| s.count).sum::<usize>(), 2000);
    }
}
