use anyhow::{Context, Result};
use blazecal_core::{Calendar, EventTime, NewEvent, RecurrenceSelector, Transport};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use owo_colors::OwoColorize;

use crate::utils::tui;

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub repeat: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub async fn run<T: Transport>(calendar: &Calendar<T>, args: NewArgs, json: bool) -> Result<()> {
    let start = parse_datetime(&args.start)?;

    let end = match (args.end, args.duration) {
        (Some(end), _) => Some(parse_end(&end, &start)?),
        (None, Some(duration)) => Some(apply_duration(&start, &duration)?),
        (None, None) => None,
    };

    let repeat = args
        .repeat
        .map(|r| r.to_uppercase().parse::<RecurrenceSelector>())
        .transpose()?;

    let mut event = NewEvent::new(&args.title, start);
    event.end = end;
    event.location = args.location;
    event.description = args.description;
    event.created_by = std::env::var("USER").ok().filter(|u| !u.is_empty());

    let uid = tui::with_spinner("Saving", json, calendar.create_event(event, repeat)).await?;

    if json {
        println!("{}", serde_json::json!({ "uid": uid }));
        return Ok(());
    }

    println!("{}", format!("  Created: {}", args.title.trim()).green());
    if let Some(selector) = repeat {
        println!("  {}", selector.to_rule().to_string().dimmed());
    }
    println!("  {}", uid.dimmed());

    Ok(())
}

/// Parse a start or end given on the command line.
///
/// Exact forms come first: `2026-01-05` is all-day, `2026-01-05T09:00` is
/// floating and a trailing `Z` makes it UTC. Anything else goes through
/// fuzzydate, and is all-day unless the input names a time of day.
fn parse_datetime(input: &str) -> Result<EventTime> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(EventTime::Date(date));
    }
    if let Some(utc) = trimmed.strip_suffix('Z').and_then(parse_exact_datetime) {
        return Ok(EventTime::DateTimeUtc(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc)));
    }
    if let Some(floating) = parse_exact_datetime(trimmed) {
        return Ok(EventTime::DateTimeFloating(floating));
    }

    let expanded = expand_abbreviations(trimmed);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

    if has_time_component(trimmed) {
        Ok(EventTime::DateTimeFloating(dt))
    } else {
        Ok(EventTime::Date(dt.date()))
    }
}

fn parse_exact_datetime(input: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// Day and month names fuzzydate only knows in full.
fn expand_abbreviations(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| match word {
            "mon" => "monday",
            "tue" | "tues" => "tuesday",
            "wed" => "wednesday",
            "thu" | "thur" | "thurs" => "thursday",
            "fri" => "friday",
            "sat" => "saturday",
            "sun" => "sunday",
            "jan" => "january",
            "feb" => "february",
            "mar" => "march",
            "apr" => "april",
            "jun" => "june",
            "jul" => "july",
            "aug" => "august",
            "sep" | "sept" => "september",
            "oct" => "october",
            "nov" => "november",
            "dec" => "december",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the input names a time of day: `noon`, `3pm`, `3 pm`, `15:00`,
/// or `at` followed by a number.
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    tokens.iter().enumerate().any(|(i, token)| {
        let previous = i.checked_sub(1).and_then(|p| tokens.get(p));
        let next = tokens.get(i + 1);

        matches!(*token, "noon" | "midnight")
            || is_clock_time(token)
            || has_meridiem(token, previous.copied())
            || (*token == "at" && next.is_some_and(|n| starts_with_digit(n)))
    })
}

fn is_clock_time(token: &str) -> bool {
    token.split_once(':').is_some_and(|(hours, minutes)| {
        hours.ends_with(|c: char| c.is_ascii_digit()) && starts_with_digit(minutes)
    })
}

fn has_meridiem(token: &str, previous: Option<&str>) -> bool {
    let Some(number) = token.strip_suffix("am").or_else(|| token.strip_suffix("pm")) else {
        return false;
    };
    if number.is_empty() {
        return previous.is_some_and(|p| p.chars().all(|c| c.is_ascii_digit() || c == ':'));
    }
    number.chars().all(|c| c.is_ascii_digit() || c == ':') && starts_with_digit(number)
}

fn starts_with_digit(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
}

/// An end is a duration (`90m`, `2h`, `3days`) or a date/time, optionally
/// written `until ...` or `to ...`.
fn parse_end(input: &str, start: &EventTime) -> Result<EventTime> {
    if let Ok(end) = apply_duration(start, input) {
        return Ok(end);
    }

    let cleaned = input
        .strip_prefix("until ")
        .or_else(|| input.strip_prefix("to "))
        .unwrap_or(input);

    parse_datetime(cleaned)
}

fn apply_duration(start: &EventTime, input: &str) -> Result<EventTime> {
    let std_duration = humantime::parse_duration(input.trim())
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    let duration = Duration::from_std(std_duration).context("Duration too large")?;

    let end = match start {
        EventTime::Date(d) => Duration::try_days(duration.num_days().max(1))
            .and_then(|days| d.checked_add_signed(days))
            .map(EventTime::Date),
        other => other
            .naive()
            .checked_add_signed(duration)
            .map(|end| other.with_naive(end)),
    };
    end.with_context(|| format!("Duration \"{}\" runs past the end of the calendar", input))
}
