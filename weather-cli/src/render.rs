use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::{self, Write};
use weather_core::{CurrentConditions, DayBucketMap, ForecastEntry, Units};

pub fn current(current: &CurrentConditions, units: Units, out: &mut impl Write) -> fmt::Result {
    let t = units.temperature_suffix();

    writeln!(out, "Current {} Weather", current.location_name)?;
    writeln!(out, "  Temperature: {:.1}{t}", current.temperature)?;
    writeln!(out, "  Feels Like:  {:.1}{t}", current.feels_like)?;
    writeln!(out, "  Min:         {:.1}{t}", current.temp_min)?;
    writeln!(out, "  Max:         {:.1}{t}", current.temp_max)?;
    writeln!(out, "  Humidity:    {}%", current.humidity_pct)?;
    writeln!(out, "  Pressure:    {} hPa", current.pressure_hpa)?;
    writeln!(out, "  Wind:        {} {}", current.wind_speed, units.wind_suffix())
}

pub fn forecast(
    city: &str,
    days: &DayBucketMap,
    units: Units,
    expanded: impl Fn(&str) -> bool,
    out: &mut impl Write,
) -> fmt::Result {
    let t = units.temperature_suffix();

    writeln!(out, "{city} 5-Day Forecast")?;
    if days.is_empty() {
        return writeln!(out, "  No forecast data");
    }

    for (day, bucket) in days.iter() {
        writeln!(
            out,
            "  {}  Avg: {:.1}{t}, Min: {:.1}{t}, Max: {:.1}{t}",
            day_label(day),
            bucket.avg_temp,
            bucket.min_temp,
            bucket.max_temp,
        )?;

        if expanded(day) {
            for entry in &bucket.entries {
                writeln!(out, "      {}: {:.1}{t}", time_label(entry), entry.temperature)?;
            }
        }
    }

    Ok(())
}

/// `Mon 01.01`, or the raw key when it is not a date.
fn day_label(day: &str) -> String {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|d| d.format("%a %d.%m").to_string())
        .unwrap_or_else(|_| day.to_string())
}

fn time_label(entry: &ForecastEntry) -> String {
    NaiveDateTime::parse_from_str(&entry.timestamp, "%Y-%m-%d %H:%M:%S")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| entry.time_of_day().unwrap_or(&entry.timestamp).to_string())
}
