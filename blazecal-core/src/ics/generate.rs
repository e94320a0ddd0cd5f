//! ICS file generation.

use crate::error::CalResult;
use crate::event::{Event, EventTime};
use crate::ics::CREATED_BY_PROPERTY;
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

/// Generate .ics content for a master event
pub fn generate_ics(event: &Event) -> CalResult<String> {
    event.validate()?;

    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.title);

    // DTSTAMP is required by RFC 5545; it records when this file was written
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_datetime_property(&mut ics_event, "DTSTART", &event.start);
    add_datetime_property(&mut ics_event, "DTEND", &event.end);

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    if let Some(ref recurrence) = event.recurrence {
        ics_event.add_property("RRULE", recurrence.rule.to_string());
        for exdate in &recurrence.exdates {
            add_exdate_property(&mut ics_event, exdate);
        }
    }

    // ATTENDEE (multi-property - can appear multiple times)
    for attendee in &event.attendees {
        let mut prop = Property::new("ATTENDEE", format!("mailto:{}", attendee.email));
        if let Some(ref name) = attendee.name {
            prop.add_parameter("CN", name);
        }
        ics_event.append_multi_property(prop);
    }

    if let Some(ref created_by) = event.created_by {
        ics_event.add_property(CREATED_BY_PROPERTY, created_by);
    }

    for (key, value) in &event.custom_properties {
        ics_event.add_property(key, value);
    }

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with BLAZECAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:BLAZECAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a datetime property formatted for its EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    ics_event.append_property(time_property(name, time));
}

/// Add an EXDATE property for a single exclusion
fn add_exdate_property(ics_event: &mut icalendar::Event, time: &EventTime) {
    ics_event.append_multi_property(time_property("EXDATE", time));
}

fn time_property(name: &str, time: &EventTime) -> Property {
    let mut prop = Property::new(name, time.to_ics_string());
    if time.is_date() {
        prop.append_parameter(ValueType::Date);
    }
    prop
}
