use glob::glob;
use sensor_trends::category::is_category_label;
use std::{io, path::Path};

const TOLERANCE: f64 = 0.01 + 1e-9;

/// Checks the CSV tables written by `sensor-trends`
///
/// Category percentages must add up to 100% and hourly statistics must verify min <= mean <= max
fn audit<R: io::Read>(reader: R) -> anyhow::Result<Vec<String>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let categories: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| is_category_label(h).then_some(i))
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let stats = column("mean").zip(column("min")).zip(column("max"));

    let mut violations = vec![];
    for (k, record) in rdr.records().enumerate() {
        let record = record?;
        let value = |i: usize| -> anyhow::Result<f64> {
            Ok(record.get(i).unwrap_or_default().parse::<f64>()?)
        };
        if !categories.is_empty() {
            let total = categories
                .iter()
                .map(|&i| value(i))
                .sum::<anyhow::Result<f64>>()?;
            if (total - 100.).abs() > TOLERANCE {
                violations.push(format!("row #{}: percentages add up to {total}", k + 1));
            }
        }
        if let Some(((mean, min), max)) = stats {
            let (mean, min, max) = (value(mean)?, value(min)?, value(max)?);
            if !(min <= mean && mean <= max) {
                violations.push(format!(
                    "row #{}: mean {mean} outside [{min},{max}]",
                    k + 1
                ));
            }
        }
    }
    Ok(violations)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let pattern = Path::new(&root).join("**").join("*.csv");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("invalid path: {root}"))?;

    let mut n_file = 0;
    let mut n_violation = 0;
    for entry in glob(pattern)? {
        let path = entry?;
        if path.file_name().and_then(|f| f.to_str()) == Some(sensor_trends::RAW_DATA) {
            continue;
        }
        log::info!("Auditing {:?}", path);
        let violations = audit(std::fs::File::open(&path)?)?;
        n_file += 1;
        for violation in &violations {
            println!("{}: {violation}", path.display());
        }
        n_violation += violations.len();
    }
    println!("{n_file} files audited, {n_violation} violations");
    if n_violation > 0 {
        anyhow::bail!("{n_violation} violations found");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages() {
        let csv = "\
week_start,comfortable,too_cold,too_hot
2019-05-19,33.33,33.33,33.33
2019-05-26,50.0,25.0,20.0
";
        let violations = audit(csv.as_bytes()).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("row #2"));
    }

    #[test]
    fn statistics() {
        let csv = "\
hour,mean,std,min,max,count
9,21.5,,21.5,21.5,1
10,20.0,1.0,20.5,23.0,3
";
        let violations = audit(csv.as_bytes()).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("row #2"));
    }

    #[test]
    fn hourly_means_are_not_audited() {
        let csv = "time,co2\n12,812.5\n13,1100.0\n";
        assert!(audit(csv.as_bytes()).unwrap().is_empty());
    }
}
