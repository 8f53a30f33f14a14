//! Grouping of forecast entries by calendar day.

use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::model::{ForecastEntry, ForecastSet};

/// Forecast entries sharing one calendar day, with derived temperatures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub entries: Vec<ForecastEntry>,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Mean temperature rounded to one decimal, half away from zero.
    ///
    /// Clamped into `[min_temp, max_temp]`, so it may carry the extreme's extra decimals.
    pub avg_temp: f64,
}

impl DayBucket {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            min_temp: f64::INFINITY,
            max_temp: f64::NEG_INFINITY,
            avg_temp: 0.0,
        }
    }

    fn push(&mut self, entry: &ForecastEntry) {
        self.min_temp = self.min_temp.min(entry.temperature);
        self.max_temp = self.max_temp.max(entry.temperature);
        self.entries.push(entry.clone());
    }

    fn finish(&mut self) {
        let sum: f64 = self.entries.iter().map(|e| e.temperature).sum();
        let mean = sum / self.entries.len() as f64;
        // Rounding can push the mean past an extreme by at most 0.05.
        self.avg_temp = round_tenth(mean).clamp(self.min_temp, self.max_temp);
    }
}

/// Day buckets keyed by `yyyy-MM-dd`, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBucketMap {
    days: Vec<(String, DayBucket)>,
    index: HashMap<String, usize>,
}

impl Serialize for DayBucketMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, bucket) in &self.days {
            map.serialize_entry(day, bucket)?;
        }
        map.end()
    }
}

impl DayBucketMap {
    pub fn get(&self, day: &str) -> Option<&DayBucket> {
        self.index.get(day).map(|&i| &self.days[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DayBucket)> {
        self.days.iter().map(|(day, bucket)| (day.as_str(), bucket))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|(day, _)| day.as_str())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn bucket_mut(&mut self, day: &str) -> &mut DayBucket {
        let i = match self.index.get(day) {
            Some(&i) => i,
            None => {
                self.days.push((day.to_string(), DayBucket::empty()));
                self.index.insert(day.to_string(), self.days.len() - 1);
                self.days.len() - 1
            }
        };
        &mut self.days[i].1
    }
}

/// Group a forecast by calendar day and compute min/avg/max per day.
///
/// Pure: no I/O, and calling it twice on the same set yields equal maps.
pub fn bucket_by_day(forecast: &ForecastSet) -> DayBucketMap {
    let mut map = DayBucketMap::default();

    for entry in &forecast.entries {
        map.bucket_mut(entry.day_key()).push(entry);
    }

    for (_, bucket) in &mut map.days {
        bucket.finish();
    }

    map
}

/// Round to one decimal place, half away from zero.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
