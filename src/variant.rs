use chrono::NaiveDate;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    aggregation::Reduction,
    bucket::BucketBy,
    category::Classifier,
    readings::{EntityKind, Measure},
    window::Window,
    Analysis,
};

/// Default day of the 12 hours CO2 history
pub const HISTORY_DATE: &str = "2019-06-01";

/// The building sensor analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum Variant {
    /// Hourly mean CO2 per floor over the last 12 hours of a day
    #[strum(serialize = "co2history_12h")]
    Co2History12h,
    /// Daily CO2 categories per floor over the last week of May
    #[strum(serialize = "co2trends_daily")]
    Co2TrendsDaily,
    /// Weekly CO2 categories per floor over the last 7 weeks
    #[strum(serialize = "co2trends_weekly")]
    Co2TrendsWeekly,
    /// Monthly CO2 categories per floor from October through May
    #[strum(serialize = "co2trends_monthly")]
    Co2TrendsMonthly,
    /// Daily thermal comfort categories per floor over the last week of May
    #[strum(serialize = "comforttrends_daily")]
    ComfortTrendsDaily,
    /// Weekly thermal comfort categories per floor over the last 7 weeks
    #[strum(serialize = "comforttrends_weekly")]
    ComfortTrendsWeekly,
    /// Monthly thermal comfort categories per floor from October through May
    #[strum(serialize = "comforttrends_monthly")]
    ComfortTrendsMonthly,
    /// Hourly temperature statistics per zone in May
    #[strum(serialize = "boxplot_month")]
    BoxplotMonth,
    /// Day of the week x hour mean temperature per zone in May
    #[strum(serialize = "heatmap_month")]
    HeatmapMonth,
    /// Day of the week x hour mean temperature per zone from March through May
    #[strum(serialize = "heatmap_quarter")]
    HeatmapQuarter,
}
impl Variant {
    /// Returns the analysis of the variant
    ///
    /// `history_date` is the day the 12 hours CO2 history is taken from
    pub fn analysis(&self, history_date: NaiveDate) -> Analysis {
        use Variant::*;
        let last_week_of_may = Window::LastDaysOfMonth { month: 5, days: 7 };
        let co2_levels = Reduction::CategoryPercentage(Classifier::Co2);
        let thermal_comfort = Reduction::CategoryPercentage(Classifier::ThermalComfort);
        match self {
            Co2History12h => Analysis::new("co2hist", "12hours", "co2history")
                .window(Window::LastHoursOf {
                    date: history_date,
                    hours: 12,
                })
                .bucket_headers(vec!["time"]),
            Co2TrendsDaily => Analysis::new("co2trends", "daily", "co2trends")
                .window(last_week_of_may)
                .bucket(BucketBy::Date)
                .reduction(co2_levels),
            Co2TrendsWeekly => Analysis::new("co2trends", "weekly", "co2trends")
                .window(Window::LastWeeks(7))
                .bucket(BucketBy::Week)
                .reduction(co2_levels),
            Co2TrendsMonthly => Analysis::new("co2trends", "monthly", "co2trends")
                .window(Window::october_to_may())
                .bucket(BucketBy::Month)
                .reduction(co2_levels),
            ComfortTrendsDaily => Analysis::new("comftrends", "daily", "comftrends")
                .measure(Measure::Temperature)
                .window(last_week_of_may)
                .bucket(BucketBy::Date)
                .reduction(thermal_comfort),
            ComfortTrendsWeekly => Analysis::new("comftrends", "week", "comftrends")
                .measure(Measure::Temperature)
                .window(Window::LastWeeks(7))
                .bucket(BucketBy::Week)
                .reduction(thermal_comfort),
            ComfortTrendsMonthly => Analysis::new("comftrends", "monthly", "comftrends")
                .measure(Measure::Temperature)
                .window(Window::october_to_may())
                .bucket(BucketBy::Month)
                .reduction(thermal_comfort),
            BoxplotMonth => Analysis::new("boxplot", "month", "may")
                .entity(EntityKind::Zone)
                .measure(Measure::Temperature)
                .window(Window::month(5))
                .reduction(Reduction::MeanStats),
            HeatmapMonth => Analysis::new("heatmap", "month", "may")
                .entity(EntityKind::Zone)
                .measure(Measure::Temperature)
                .window(Window::month(5))
                .bucket(BucketBy::DayOfWeekHour),
            HeatmapQuarter => Analysis::new("heatmap", "quarter", "lastquarter")
                .entity(EntityKind::Zone)
                .measure(Measure::Temperature)
                .window(Window::last_quarter())
                .bucket(BucketBy::DayOfWeekHour),
        }
    }
    /// Human readable title
    pub fn title(&self) -> &'static str {
        use Variant::*;
        match self {
            Co2History12h => "CO2 history",
            Co2TrendsDaily | Co2TrendsWeekly | Co2TrendsMonthly => "CO2 trends",
            ComfortTrendsDaily | ComfortTrendsWeekly | ComfortTrendsMonthly => {
                "Thermal comfort trends"
            }
            BoxplotMonth => "Hourly temperature statistics",
            HeatmapMonth | HeatmapQuarter => "Temperature heatmap",
        }
    }
    /// Whether the zone coverage is reported before running the analysis
    pub fn reports_zone_coverage(&self) -> bool {
        matches!(self, Variant::HeatmapMonth | Variant::HeatmapQuarter)
    }
}
