//! Pure rendering of a location and forecast into a display-ready view.

use crate::codes::{icon_for, WeatherCode, UNKNOWN_FORECAST_SUMMARY, UNKNOWN_SUMMARY};
use crate::types::{Forecast, HourlySeries, Location};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;

pub const UNAVAILABLE: &str = "unavailable";

/// Daily indices shown as cards; index 0 (today) is the current panel.
const FORECAST_DAYS: std::ops::RangeInclusive<usize> = 1..=5;
const HOURLY_STEP: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPanel {
    pub location: String,
    pub updated: String,
    pub temperature: String,
    pub summary: String,
    pub icon: &'static str,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub time: String,
    pub icon: &'static str,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCard {
    pub date: String,
    pub icon: &'static str,
    pub summary: &'static str,
    pub high: String,
    pub low: String,
    pub hourly: Vec<HourlySlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub current: CurrentPanel,
    pub days: Vec<DayCard>,
}

/// Round half towards positive infinity, as browsers do for `Math.round`.
fn round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn degrees(value: Option<f64>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| format!("{}°", round(v)))
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| format!("{}{}", round(v), unit))
}

fn parse_local(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

pub fn render(location: &Location, forecast: &Forecast) -> WeatherView {
    WeatherView {
        current: render_current(location, forecast),
        days: render_days(forecast),
    }
}

pub fn render_current(location: &Location, forecast: &Forecast) -> CurrentPanel {
    let current = &forecast.current;
    let updated = current
        .time
        .as_deref()
        .and_then(parse_local)
        .map_or_else(
            || format!("Updated {}", UNAVAILABLE),
            |t| format!("Updated {}", t.format("%a %-I:%M %p")),
        );

    CurrentPanel {
        location: location.display_label(),
        updated,
        temperature: degrees(current.temperature_2m),
        summary: current
            .weather_code
            .map_or(UNKNOWN_SUMMARY, |c| WeatherCode(c).summary())
            .to_string(),
        icon: icon_for(current.weather_code),
        feels_like: degrees(current.apparent_temperature),
        humidity: with_unit(current.relative_humidity_2m, "%"),
        wind: with_unit(current.wind_speed_10m, " km/h"),
    }
}

pub fn render_days(forecast: &Forecast) -> Vec<DayCard> {
    let daily = &forecast.daily;
    FORECAST_DAYS
        .filter_map(|index| {
            let date = daily.time.get(index)?;
            let code = daily.weather_code.get(index).copied().flatten();
            let parsed = parse_date(date);

            Some(DayCard {
                date: parsed.map_or_else(|| date.clone(), |d| d.format("%a, %b %-d").to_string()),
                icon: icon_for(code),
                summary: code.map_or(UNKNOWN_FORECAST_SUMMARY, |c| {
                    WeatherCode(c).forecast_summary()
                }),
                high: degrees(daily.temperature_2m_max.get(index).copied().flatten()),
                low: degrees(daily.temperature_2m_min.get(index).copied().flatten()),
                hourly: match (parsed, forecast.hourly.as_ref()) {
                    (Some(day), Some(hourly)) => hourly_strip(hourly, day),
                    _ => Vec::new(),
                },
            })
        })
        .collect()
}

/// Entries of `hourly` on `day` whose hour is a multiple of three.
pub fn hourly_strip(hourly: &HourlySeries, day: NaiveDate) -> Vec<HourlySlot> {
    hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, stamp)| {
            let at = parse_local(stamp)?;
            if at.date() != day || at.hour() % HOURLY_STEP != 0 {
                return None;
            }
            Some(HourlySlot {
                time: at.format("%H:%M").to_string(),
                icon: icon_for(hourly.weather_code.get(i).copied().flatten()),
                temperature: degrees(hourly.temperature_2m.get(i).copied().flatten()),
            })
        })
        .collect()
}

impl fmt::Display for WeatherView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.current;
        writeln!(f, "{}", c.location)?;
        writeln!(f, "{}", c.updated)?;
        writeln!(f, "{} {}  {}", c.icon, c.temperature, c.summary)?;
        writeln!(
            f,
            "Feels like {}  Humidity {}  Wind {}",
            c.feels_like, c.humidity, c.wind
        )?;

        for day in &self.days {
            writeln!(f)?;
            writeln!(
                f,
                "{}  {} {}  {} / {}",
                day.date, day.icon, day.summary, day.high, day.low
            )?;
            if !day.hourly.is_empty() {
                let strip: Vec<String> = day
                    .hourly
                    .iter()
                    .map(|h| format!("{} {} {}", h.time, h.icon, h.temperature))
                    .collect();
                writeln!(f, "  {}", strip.join(" | "))?;
            }
        }
        Ok(())
    }
}
