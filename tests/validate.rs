#![forbid(unsafe_code)]
use chrono::NaiveDate;
use edt::{
    parse_iana_time_zone, parse_iso_date, parse_iso_time, parse_local_datetime, validate_schedule,
    IssueKind, ItemMeta, RecurrenceRule, RecurringItem, Schedule, ScheduleItem, SeriesEntry,
    SeriesRegistry, SingleItem, VariantInfo, Weekday,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> chrono::NaiveTime {
    chrono::NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn base_schedule() -> Schedule {
    Schedule {
        time_zone: parse_iana_time_zone("Europe/Paris").unwrap(),
        term_start: Some(date(2025, 9, 9)),
        term_end: Some(date(2025, 12, 19)),
        series: SeriesRegistry::default(),
        items: Vec::new(),
    }
}

fn maths_registry() -> SeriesRegistry {
    let mut registry = SeriesRegistry::new();
    registry.insert(
        "maths",
        SeriesEntry {
            title: "Mathématiques".into(),
            description: None,
            location: None,
            color: None,
            tags: Vec::new(),
            variants: vec!["PE101".into(), "PE102".into()],
        },
    );
    registry
}

fn weekly_item(days: &[Weekday]) -> RecurringItem {
    RecurringItem {
        meta: ItemMeta {
            title: Some("Maths".into()),
            ..ItemMeta::default()
        },
        recurrence: RecurrenceRule::Weekly {
            by_days: days.iter().copied().collect(),
            interval: None,
            until: None,
        },
        start_time: Some(time(9, 0)),
        end_time: Some(time(10, 0)),
        ..RecurringItem::default()
    }
}

#[test]
fn iso_date_is_strict() {
    assert_eq!(parse_iso_date("2025-09-09").unwrap(), date(2025, 9, 9));

    assert!(parse_iso_date("2025-9-9").is_err());
    assert!(parse_iso_date("2025/09/09").is_err());
    assert!(parse_iso_date("25-09-09").is_err());
    assert!(parse_iso_date("2025-13-01").is_err());
    assert!(parse_iso_date("2025-02-30").is_err());
    assert!(parse_iso_date("2025-09-09T00:00:00").is_err());
}

#[test]
fn iso_time_is_strict() {
    assert_eq!(parse_iso_time("09:05:00").unwrap(), time(9, 5));

    // secondes obligatoires, ni fraction ni offset
    assert!(parse_iso_time("09:00").is_err());
    assert!(parse_iso_time("9:00:00").is_err());
    assert!(parse_iso_time("09:00:00.500").is_err());
    assert!(parse_iso_time("09:00:00Z").is_err());
    assert!(parse_iso_time("24:00:00").is_err());
    assert!(parse_iso_time("09:60:00").is_err());
}

#[test]
fn local_datetime_is_strict() {
    assert!(parse_local_datetime("2025-09-09T09:00:00").is_ok());

    assert!(parse_local_datetime("2025-09-09 09:00:00").is_err());
    assert!(parse_local_datetime("2025-09-09T09:00").is_err());
    assert!(parse_local_datetime("2025-09-09T09:00:00+02:00").is_err());
}

#[test]
fn iana_zone_requires_area_location() {
    assert!(parse_iana_time_zone("Europe/Paris").is_ok());
    assert!(parse_iana_time_zone("America/New_York").is_ok());

    // pas de segment Area/Location
    assert!(parse_iana_time_zone("UTC").is_err());
    assert!(parse_iana_time_zone("Paris").is_err());
    // absent de la base tz
    assert!(parse_iana_time_zone("Europe/NotACity").is_err());
}

#[test]
fn reversed_term_bounds_are_reported() {
    let mut schedule = base_schedule();
    schedule.term_start = Some(date(2025, 12, 19));
    schedule.term_end = Some(date(2025, 9, 9));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].path, "termEnd");
    assert_eq!(err.issues[0].kind, IssueKind::Consistency);
}

#[test]
fn variant_must_be_declared_by_its_series() {
    let mut schedule = base_schedule();
    schedule.series = maths_registry();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.meta.series_id = Some("maths".into());
    item.meta.variant = Some(VariantInfo {
        key: "PE101".into(),
        name: None,
        audience_id: None,
        capacity: None,
    });
    schedule.items.push(ScheduleItem::Recurring(item));

    assert!(validate_schedule(&schedule).is_ok());

    // réécrire la clé vers un jeton absent doit faire échouer la validation
    if let ScheduleItem::Recurring(item) = &mut schedule.items[0] {
        item.meta.variant = Some(VariantInfo {
            key: "PE999".into(),
            name: None,
            audience_id: None,
            capacity: None,
        });
    }
    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].path, "items[0].variant.key");
    assert_eq!(err.issues[0].kind, IssueKind::UnknownSeriesOrVariant);
}

#[test]
fn binding_is_both_or_neither() {
    let mut schedule = base_schedule();
    schedule.series = maths_registry();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.meta.series_id = Some("maths".into());
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].variant");
    assert_eq!(err.issues[0].kind, IssueKind::Schema);
}

#[test]
fn end_time_must_follow_start_time() {
    // Scénario : endTime <= startTime rejeté avant tout déploiement,
    // avec le chemin endTime de l'élément fautif.
    let mut schedule = base_schedule();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.start_time = Some(time(10, 0));
    item.end_time = Some(time(9, 0));
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].path, "items[0].endTime");
    assert_eq!(err.issues[0].kind, IssueKind::Consistency);
}

#[test]
fn simple_weekly_checks_its_own_times() {
    let mut schedule = base_schedule();
    let item = RecurringItem {
        recurrence: RecurrenceRule::SimpleWeekly {
            by_days: [Weekday::Mo].into_iter().collect(),
            start_time: time(10, 0),
            end_time: time(10, 0),
            interval: None,
            until: None,
        },
        ..RecurringItem::default()
    };
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].recurrence.endTime");
    assert_eq!(err.issues[0].kind, IssueKind::Consistency);
}

#[test]
fn weekly_weekday_set_cannot_be_empty() {
    let mut schedule = base_schedule();
    schedule.items.push(ScheduleItem::Recurring(weekly_item(&[])));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].path, "items[0].recurrence.byDays");
}

#[test]
fn zero_interval_is_rejected() {
    let mut schedule = base_schedule();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.recurrence = RecurrenceRule::Weekly {
        by_days: [Weekday::Mo].into_iter().collect(),
        interval: Some(0),
        until: None,
    };
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].recurrence.interval");
}

#[test]
fn day_of_month_must_be_in_range() {
    let mut schedule = base_schedule();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.recurrence = RecurrenceRule::MonthlyByDay {
        day: 32,
        interval: None,
        until: None,
    };
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].recurrence.day");
}

#[test]
fn explicit_date_list_cannot_be_empty() {
    let mut schedule = base_schedule();
    let mut item = weekly_item(&[Weekday::Mo]);
    item.recurrence = RecurrenceRule::XDays { dates: Vec::new() };
    schedule.items.push(ScheduleItem::Recurring(item));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].recurrence.dates");
}

#[test]
fn single_item_end_must_follow_start() {
    let mut schedule = base_schedule();
    schedule.items.push(ScheduleItem::Single(SingleItem {
        meta: ItemMeta::default(),
        start: date(2025, 12, 10).and_time(time(16, 0)),
        end: date(2025, 12, 10).and_time(time(14, 0)),
    }));

    let err = validate_schedule(&schedule).unwrap_err();
    assert_eq!(err.issues[0].path, "items[0].end");
    assert_eq!(err.issues[0].kind, IssueKind::Consistency);
}

#[test]
fn all_issues_are_collected_in_document_order() {
    let mut schedule = base_schedule();
    schedule.term_start = Some(date(2025, 12, 19));
    schedule.term_end = Some(date(2025, 9, 9));

    let mut bound = weekly_item(&[Weekday::Mo]);
    bound.meta.series_id = Some("maths".into());
    bound.meta.variant = Some(VariantInfo {
        key: "PE101".into(),
        name: None,
        audience_id: None,
        capacity: None,
    });
    schedule.items.push(ScheduleItem::Recurring(bound));
    schedule.items.push(ScheduleItem::Single(SingleItem {
        meta: ItemMeta::default(),
        start: date(2025, 12, 10).and_time(time(14, 0)),
        end: date(2025, 12, 10).and_time(time(14, 0)),
    }));

    let err = validate_schedule(&schedule).unwrap_err();
    let rendered = err
        .issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r###"
    termEnd: termEnd must not be before termStart
    items[0].seriesId: unknown series: maths
    items[1].end: end must be strictly after start
    "###);
}

#[test]
fn document_json_round_trip() {
    let raw = r#"{
        "timeZone": "Europe/Paris",
        "termStart": "2025-09-09",
        "termEnd": "2025-12-19",
        "series": {
            "maths": { "title": "Mathématiques", "variants": ["PE101", "PE102"] }
        },
        "items": [
            {
                "type": "recurring",
                "title": "Maths",
                "seriesId": "maths",
                "variant": { "key": "PE101" },
                "recurrence": { "kind": "weekly", "byDays": ["MO", "WE"] },
                "startTime": "09:00:00",
                "endTime": "10:00:00",
                "exclusions": ["2025-09-15"],
                "overrides": { "2025-09-17": { "cancelled": true } }
            },
            {
                "type": "single",
                "id": "exam-1",
                "title": "Examen",
                "start": "2025-12-10T14:00:00",
                "end": "2025-12-10T16:00:00"
            }
        ]
    }"#;

    let schedule: Schedule = serde_json::from_str(raw).unwrap();
    assert!(validate_schedule(&schedule).is_ok());
    assert_eq!(schedule.items.len(), 2);
    match &schedule.items[0] {
        ScheduleItem::Recurring(item) => {
            assert_eq!(
                item.recurrence.weekday_set().map(|s| s.len()),
                Some(2)
            );
            assert!(item.exclusions.contains(&date(2025, 9, 15)));
        }
        other => panic!("expected a recurring item, got {other:?}"),
    }

    let reserialized = serde_json::to_string(&schedule).unwrap();
    let reparsed: Schedule = serde_json::from_str(&reserialized).unwrap();
    assert_eq!(reparsed, schedule);
}

#[test]
fn document_rejects_sloppy_primitives_and_unknown_kinds() {
    // heure sans secondes
    let raw = r#"{
        "timeZone": "Europe/Paris",
        "items": [{
            "type": "recurring",
            "recurrence": { "kind": "weekly", "byDays": ["MO"] },
            "startTime": "09:00",
            "endTime": "10:00:00"
        }]
    }"#;
    assert!(serde_json::from_str::<Schedule>(raw).is_err());

    // kind inconnu
    let raw = r#"{
        "timeZone": "Europe/Paris",
        "items": [{
            "type": "recurring",
            "recurrence": { "kind": "fortnightly" },
            "startTime": "09:00:00",
            "endTime": "10:00:00"
        }]
    }"#;
    assert!(serde_json::from_str::<Schedule>(raw).is_err());

    // code de jour hors MO..SU
    let raw = r#"{
        "timeZone": "Europe/Paris",
        "items": [{
            "type": "recurring",
            "recurrence": { "kind": "weekly", "byDays": ["mo"] },
            "startTime": "09:00:00",
            "endTime": "10:00:00"
        }]
    }"#;
    assert!(serde_json::from_str::<Schedule>(raw).is_err());
}
