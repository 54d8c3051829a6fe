use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;

/// Mesonet sites processed by every run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Site {
    Farm,
    Gardens,
}

/// Static per-site constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteMetadata {
    pub site: Site,
    /// Logger table queried from the data server
    pub feed_table: &'static str,
    /// Station elevation in meters (surveyed, not measured by the logger)
    pub elevation_m: f64,
    /// Identifier of the published chart product
    pub product_id: u32,
    pub product_description: &'static str,
    /// Loggers run on local standard time all year
    pub utc_offset_hours: i32,
}

static SITE_TABLE: [SiteMetadata; 2] = [
    SiteMetadata {
        site: Site::Farm,
        feed_table: "Farm%20Mesonet.Table10",
        elevation_m: 67.777_221_679_687_5,
        product_id: 160,
        product_description: "TAMU Mesonet Farm Site Time Series",
        utc_offset_hours: -6,
    },
    SiteMetadata {
        site: Site::Gardens,
        feed_table: "Gardens%20Meso.Table10",
        elevation_m: 95.367_897_033_691_41,
        product_id: 161,
        product_description: "TAMU Mesonet Gardens Site Time Series",
        utc_offset_hours: -6,
    },
];

impl Site {
    pub const ALL: [Site; 2] = [Site::Farm, Site::Gardens];

    pub fn name(&self) -> &'static str {
        match self {
            Site::Farm => "Farm",
            Site::Gardens => "Gardens",
        }
    }

    pub fn metadata(&self) -> &'static SiteMetadata {
        match self {
            Site::Farm => &SITE_TABLE[0],
            Site::Gardens => &SITE_TABLE[1],
        }
    }
}

impl SiteMetadata {
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// Logger wall-clock time for an instant
    pub fn utc_to_local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.utc_offset()).naive_local()
    }

    /// Instant of a logger wall-clock time
    pub fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let offset = chrono::Duration::seconds(i64::from(self.utc_offset().local_minus_utc()));
        Utc.from_utc_datetime(&(local - offset))
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Site {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "farm" => Ok(Site::Farm),
            "gardens" => Ok(Site::Gardens),
            _ => Err(ProcessingError::UnknownSite(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_lookup() {
        assert_eq!(Site::Farm.metadata().site, Site::Farm);
        assert_eq!(Site::Gardens.metadata().site, Site::Gardens);
        assert!((Site::Farm.metadata().elevation_m - 67.78).abs() < 0.01);
        assert!((Site::Gardens.metadata().elevation_m - 95.37).abs() < 0.01);
        assert_ne!(
            Site::Farm.metadata().product_id,
            Site::Gardens.metadata().product_id
        );
    }

    #[test]
    fn test_site_parse() {
        assert_eq!("Farm".parse::<Site>().unwrap(), Site::Farm);
        assert_eq!("gardens".parse::<Site>().unwrap(), Site::Gardens);
        assert!("Orchard".parse::<Site>().is_err());
    }

    #[test]
    fn test_utc_offset() {
        let offset = Site::Farm.metadata().utc_offset();
        assert_eq!(offset.local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn test_local_utc_conversion() {
        let meta = Site::Gardens.metadata();
        let utc = Utc.with_ymd_and_hms(2024, 7, 1, 18, 30, 0).unwrap();
        let local = meta.utc_to_local(utc);
        assert_eq!(local.to_string(), "2024-07-01 12:30:00");
        assert_eq!(meta.local_to_utc(local), utc);
    }
}
