//! ICS file parsing using the icalendar crate's parser.

use chrono::{NaiveDate, NaiveDateTime};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Property, read_calendar, unfold},
};

use crate::error::{CalError, CalResult};
use crate::event::{Attendee, Event, EventTime, Recurrence};
use crate::ics::CREATED_BY_PROPERTY;
use crate::rrule;

/// Parse ICS content into a master Event.
///
/// A missing DTEND defaults to one day after an all-day start and one hour
/// after a timed start. An RRULE outside the supported grammar fails with
/// `MalformedRule` rather than being dropped.
pub fn parse_event(content: &str) -> CalResult<Event> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| CalError::IcsParse(e.to_string()))?;
    let vevent = calendar
        .components
        .iter()
        .find(|c| c.name == "VEVENT")
        .ok_or_else(|| CalError::IcsParse("no VEVENT component".into()))?;

    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| CalError::IcsParse("VEVENT has no UID".into()))?;
    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(No title)".to_string());

    let start = vevent
        .find_prop("DTSTART")
        .and_then(parse_time_property)
        .ok_or_else(|| CalError::IcsParse(format!("event '{}' has no valid DTSTART", uid)))?;
    let end = match vevent.find_prop("DTEND") {
        Some(prop) => parse_time_property(prop)
            .ok_or_else(|| CalError::IcsParse(format!("event '{}' has an invalid DTEND", uid)))?,
        None => start.default_end(),
    };

    let description = vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string());
    let location = vevent.find_prop("LOCATION").map(|p| p.val.to_string());
    let created_by = vevent
        .find_prop(CREATED_BY_PROPERTY)
        .map(|p| p.val.to_string());

    let recurrence = match vevent.find_prop("RRULE") {
        Some(prop) => {
            let rule = rrule::decode(prop.val.as_ref())?;
            let exdates = vevent
                .properties
                .iter()
                .filter(|p| p.name == "EXDATE")
                .flat_map(parse_exdate_property)
                .collect();
            Some(Recurrence { rule, exdates })
        }
        None => None,
    };

    let attendees: Vec<Attendee> = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(parse_attendee)
        .collect();

    // Other X- properties are kept so a read-modify-write doesn't drop them
    let custom_properties: Vec<(String, String)> = vevent
        .properties
        .iter()
        .filter(|p| p.name.as_ref().starts_with("X-") && p.name != CREATED_BY_PROPERTY)
        .map(|p| (p.name.to_string(), p.val.to_string()))
        .collect();

    let event = Event {
        uid,
        title,
        description,
        location,
        start,
        end,
        recurrence,
        created_by,
        attendees,
        custom_properties,
    };
    event.validate()?;

    Ok(event)
}

fn parse_time_property(prop: &Property) -> Option<EventTime> {
    DatePerhapsTime::try_from(prop).ok().map(to_event_time)
}

/// Convert icalendar's DatePerhapsTime to our EventTime. Zoned times keep
/// their wall clock and become floating.
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, .. } => {
                EventTime::DateTimeFloating(date_time)
            }
        },
    }
}

/// Parse an EXDATE property into a list of EventTime values.
///
/// Handles:
/// - VALUE=DATE: `EXDATE;VALUE=DATE:20260112`
/// - UTC: `EXDATE:20260112T090000Z`
/// - Floating or TZID-qualified: `EXDATE;TZID=Europe/Oslo:20260112T090000`
/// - Bare dates without VALUE=DATE: `EXDATE:20260112`
/// - Comma-separated values: `EXDATE:20260112T090000Z,20260119T090000Z`
///
/// Entries that don't parse are skipped.
fn parse_exdate_property(prop: &Property) -> Vec<EventTime> {
    let is_date = prop
        .params
        .iter()
        .any(|p| p.key == "VALUE" && p.val.as_ref().map(|v| v.as_ref()) == Some("DATE"));

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            if is_date {
                // Some writers put a time on VALUE=DATE entries; the date is what counts
                let date_part = s.get(..8)?;
                NaiveDate::parse_from_str(date_part, "%Y%m%d")
                    .ok()
                    .map(EventTime::Date)
            } else {
                EventTime::from_ics_str(s)
                    .or_else(|| parse_loose_datetime(s).map(EventTime::DateTimeFloating))
            }
        })
        .collect()
}

/// Accept `YYYYMMDDTHHMM` values that omit seconds.
fn parse_loose_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M").ok()
}

/// Parse an ATTENDEE property
fn parse_attendee(prop: &Property) -> Attendee {
    let value = prop.val.as_ref();
    let email = value
        .strip_prefix("mailto:")
        .or_else(|| value.strip_prefix("MAILTO:"))
        .unwrap_or(value)
        .to_string();

    let name = prop
        .params
        .iter()
        .find(|p| p.key == "CN")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()));

    Attendee { name, email }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::generate_ics;
    use crate::rrule::{Bound, Frequency, RecurrenceRule};
    use chrono::{TimeZone, Utc};

    fn wrap(vevent_lines: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nBEGIN:VEVENT\r\n{}END:VEVENT\r\nEND:VCALENDAR\r\n",
            vevent_lines
        )
    }

    #[test]
    fn test_parse_and_generate_roundtrip() {
        let mut event = Event::new(
            "standup@blazecal",
            "Standup",
            EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()),
            EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()),
        );
        event.description = Some("Daily check-in".to_string());
        event.location = Some("Room 4".to_string());
        event.created_by = Some("marta".to_string());
        event.attendees = vec![
            Attendee {
                name: Some("Alice".to_string()),
                email: "alice@example.com".to_string(),
            },
            Attendee::new("bob@example.com"),
        ];
        event.custom_properties = vec![("X-COLOR".to_string(), "teal".to_string())];
        let mut recurrence = Recurrence::new(RecurrenceRule::new(
            Frequency::Weekly,
            1,
            Some(Bound::Count(4)),
        ));
        recurrence
            .exdates
            .push(EventTime::from_ics_str("20260112T090000Z").unwrap());
        event.recurrence = Some(recurrence);

        let ics = generate_ics(&event).unwrap();
        let parsed = parse_event(&ics).expect("Should parse generated ICS");

        assert_eq!(parsed, event);
    }

    #[test]
    fn test_parse_exdate_variants() {
        let ics = wrap(
            "UID:test-123\r\n\
SUMMARY:Recurring Event\r\n\
DTSTART:20260105T090000Z\r\n\
DTEND:20260105T100000Z\r\n\
RRULE:FREQ=WEEKLY;INTERVAL=1\r\n\
EXDATE;TZID=Europe/Oslo:20260112T100000,20260119T100000\r\n\
EXDATE;VALUE=DATE:20260126\r\n\
EXDATE:20260202\r\n\
EXDATE:20260209T090000Z\r\n\
EXDATE:garbage\r\n",
        );

        let event = parse_event(&ics).expect("Should parse");
        let recurrence = event.recurrence.expect("Should have recurrence");
        let dates: Vec<String> = recurrence
            .exdates
            .iter()
            .map(|e| e.date().to_string())
            .collect();

        assert_eq!(
            dates,
            vec!["2026-01-12", "2026-01-19", "2026-01-26", "2026-02-02", "2026-02-09"]
        );
        assert!(matches!(recurrence.exdates[0], EventTime::DateTimeFloating(_)));
        assert!(matches!(recurrence.exdates[2], EventTime::Date(_)));
        assert!(matches!(recurrence.exdates[4], EventTime::DateTimeUtc(_)));
    }

    #[test]
    fn test_parse_malformed_rrule_fails() {
        let ics = wrap(
            "UID:test-123\r\n\
SUMMARY:Broken\r\n\
DTSTART:20260105T090000Z\r\n\
DTEND:20260105T100000Z\r\n\
RRULE:FREQ=FORTNIGHTLY\r\n",
        );

        assert!(matches!(parse_event(&ics), Err(CalError::MalformedRule(_))));
    }

    #[test]
    fn test_parse_missing_dtend_defaults() {
        let timed = wrap("UID:a\r\nSUMMARY:Call\r\nDTSTART:20260105T090000\r\n");
        let event = parse_event(&timed).unwrap();
        assert_eq!(event.end, EventTime::from_ics_str("20260105T100000").unwrap());

        let all_day = wrap("UID:b\r\nSUMMARY:Holiday\r\nDTSTART;VALUE=DATE:20260105\r\n");
        let event = parse_event(&all_day).unwrap();
        assert_eq!(event.end, EventTime::from_ics_str("20260106").unwrap());
    }

    #[test]
    fn test_parse_zoned_start_becomes_floating() {
        let ics = wrap(
            "UID:zoned\r\n\
SUMMARY:Zoned\r\n\
DTSTART;TZID=Europe/Oslo:20260105T090000\r\n\
DTEND;TZID=Europe/Oslo:20260105T100000\r\n",
        );
        let event = parse_event(&ics).unwrap();
        assert_eq!(event.start, EventTime::from_ics_str("20260105T090000").unwrap());
    }

    #[test]
    fn test_parse_requires_uid_and_dtstart() {
        let no_uid = wrap("SUMMARY:x\r\nDTSTART:20260105T090000Z\r\n");
        assert!(matches!(parse_event(&no_uid), Err(CalError::IcsParse(_))));

        let no_start = wrap("UID:x\r\nSUMMARY:x\r\n");
        assert!(matches!(parse_event(&no_start), Err(CalError::IcsParse(_))));
    }

    #[test]
    fn test_parse_line_folding_preserves_whitespace() {
        let ics = wrap(
            "UID:test-123\r\n\
SUMMARY:Test\r\n\
DTSTART:20260101T100000Z\r\n\
DTEND:20260101T110000Z\r\n\
DESCRIPTION:Hello \r\n world and \r\n more text\r\n",
        );

        let event = parse_event(&ics).expect("Should parse");
        assert_eq!(event.description.as_deref(), Some("Hello world and more text"));
    }
}
