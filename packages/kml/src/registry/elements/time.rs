//! `<TimeStamp>` element.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::registry::element::{impl_retrieve, ElementBase, KmlElement};
use crate::registry::{ParseContext, Query, Retrieve};
use crate::xml::XmlNode;

#[derive(Debug)]
pub struct KmlTimeStamp {
    base: ElementBase,
}

impl_retrieve!(KmlTimeStamp);

impl KmlTimeStamp {
    pub fn create(node: Arc<XmlNode>, context: ParseContext) -> Result<Box<dyn KmlElement>> {
        Ok(Box::new(Self {
            base: ElementBase::new(node, context, "TimeStamp")?,
        }))
    }

    /// Raw `when` value.
    pub fn when(&self) -> Option<String> {
        self.retrieve(&Query::child("when"))
    }

    /// `when` as a point in time. Partial dates (`1997`, `1997-07`,
    /// `1997-07-16`) start at midnight UTC; a date-time without offset is UTC.
    pub fn when_parsed(&self) -> Option<DateTime<FixedOffset>> {
        let when = self.when()?;
        let parsed = parse_kml_time(&when);
        if parsed.is_none() {
            tracing::debug!(when = %when, "Unrecognised TimeStamp value");
        }
        parsed
    }
}

fn parse_kml_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }

    let date = match value.len() {
        4 => NaiveDate::parse_from_str(&format!("{value}-01-01"), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
    }?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

impl KmlElement for KmlTimeStamp {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
