use chrono::{Duration, NaiveDate, NaiveDateTime};
use lazytask_core::calendar::expand::expand_dates;
use lazytask_core::{expand_calendar, expand_occurrences, DateInterval, Recurrence, Task};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn days(first: (i32, u32, u32), last: (i32, u32, u32)) -> DateInterval {
    DateInterval::from_days(
        NaiveDate::from_ymd_opt(first.0, first.1, first.2).unwrap(),
        NaiveDate::from_ymd_opt(last.0, last.1, last.2).unwrap(),
    )
}

fn task(due: NaiveDateTime, recurrence: Recurrence) -> Task {
    let mut task = Task::new("recurring", due);
    task.recurrence = recurrence;
    task
}

fn sample_rules() -> Vec<(NaiveDateTime, Recurrence)> {
    vec![
        (at(2024, 1, 15, 9, 0), Recurrence::None),
        (at(2024, 1, 15, 9, 0), Recurrence::Daily { interval: 1 }),
        (at(2023, 12, 30, 18, 45), Recurrence::Daily { interval: 3 }),
        (
            at(2024, 3, 4, 8, 0),
            Recurrence::Weekly {
                interval: 2,
                weekdays: vec![1, 3],
            },
        ),
        (
            at(2024, 1, 3, 12, 0),
            Recurrence::Weekly {
                interval: 3,
                weekdays: vec![0, 6, 3],
            },
        ),
        (
            at(2024, 1, 31, 10, 0),
            Recurrence::Monthly {
                interval: 1,
                day: 28,
            },
        ),
        (
            at(2023, 11, 5, 6, 30),
            Recurrence::Monthly {
                interval: 2,
                day: 5,
            },
        ),
    ]
}

#[test]
fn daily_scenario_excludes_day_before_anchor() {
    let task = task(at(2024, 1, 15, 9, 0), Recurrence::Daily { interval: 1 });
    let occurrences = expand_occurrences(&task, days((2024, 1, 14), (2024, 1, 17)));

    let dates: Vec<_> = occurrences.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![
            at(2024, 1, 15, 9, 0),
            at(2024, 1, 16, 9, 0),
            at(2024, 1, 17, 9, 0)
        ]
    );
    assert!(occurrences.iter().all(|o| o.task_id == task.id));
}

#[test]
fn biweekly_scenario_lands_on_monday_and_wednesday() {
    let task = task(
        at(2024, 3, 4, 8, 0),
        Recurrence::Weekly {
            interval: 2,
            weekdays: vec![1, 3],
        },
    );
    let dates: Vec<_> = expand_occurrences(&task, days((2024, 3, 1), (2024, 3, 31)))
        .into_iter()
        .map(|o| o.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            at(2024, 3, 4, 8, 0),
            at(2024, 3, 6, 8, 0),
            at(2024, 3, 18, 8, 0),
            at(2024, 3, 20, 8, 0),
        ]
    );
}

#[test]
fn monthly_scenario_uses_clamped_day_and_anchor_time() {
    let task = task(
        at(2024, 1, 31, 10, 0),
        Recurrence::Monthly {
            interval: 1,
            day: 28,
        },
    );
    let dates: Vec<_> = expand_occurrences(&task, days((2024, 2, 1), (2024, 4, 30)))
        .into_iter()
        .map(|o| o.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            at(2024, 2, 28, 10, 0),
            at(2024, 3, 28, 10, 0),
            at(2024, 4, 28, 10, 0)
        ]
    );
}

#[test]
fn monthly_interval_skips_months_across_year_boundary() {
    let dates = expand_dates(
        at(2023, 11, 5, 6, 30),
        &Recurrence::Monthly {
            interval: 2,
            day: 5,
        },
        days((2023, 12, 1), (2024, 5, 31)),
    );
    assert_eq!(
        dates,
        vec![
            at(2024, 1, 5, 6, 30),
            at(2024, 3, 5, 6, 30),
            at(2024, 5, 5, 6, 30)
        ]
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let rule = Recurrence::Daily { interval: 1 };
    let anchor = at(2024, 1, 15, 9, 0);

    let exact = DateInterval::new(at(2024, 1, 16, 9, 0), at(2024, 1, 18, 9, 0));
    assert_eq!(expand_dates(anchor, &rule, exact).len(), 3);

    let tight = DateInterval::new(
        at(2024, 1, 16, 9, 0) + Duration::seconds(1),
        at(2024, 1, 18, 9, 0) - Duration::seconds(1),
    );
    assert_eq!(expand_dates(anchor, &rule, tight), vec![at(2024, 1, 17, 9, 0)]);

    let single = DateInterval::new(anchor, anchor);
    assert_eq!(expand_dates(anchor, &Recurrence::None, single), vec![anchor]);
}

#[test]
fn reversed_window_yields_nothing() {
    let window = DateInterval::new(at(2024, 2, 1, 0, 0), at(2024, 1, 1, 0, 0));
    for (anchor, rule) in sample_rules() {
        assert!(expand_dates(anchor, &rule, window).is_empty(), "{rule:?}");
    }
}

#[test]
fn none_variant_produces_at_most_one_occurrence() {
    let anchor = at(2024, 1, 15, 9, 0);
    let inside = days((2024, 1, 1), (2024, 12, 31));
    let outside = days((2024, 2, 1), (2024, 12, 31));
    assert_eq!(expand_dates(anchor, &Recurrence::None, inside).len(), 1);
    assert!(expand_dates(anchor, &Recurrence::None, outside).is_empty());
}

#[test]
fn empty_weekday_set_never_occurs() {
    let rule = Recurrence::Weekly {
        interval: 1,
        weekdays: Vec::new(),
    };
    let dates = expand_dates(at(2024, 1, 1, 8, 0), &rule, days((2020, 1, 1), (2030, 1, 1)));
    assert!(dates.is_empty());
}

#[test]
fn duplicate_weekdays_do_not_duplicate_occurrences() {
    let anchor = at(2024, 3, 4, 8, 0);
    let window = days((2024, 3, 1), (2024, 3, 31));
    let with_dups = Recurrence::Weekly {
        interval: 1,
        weekdays: vec![3, 1, 3, 1],
    };
    let clean = Recurrence::Weekly {
        interval: 1,
        weekdays: vec![1, 3],
    };
    assert_eq!(
        expand_dates(anchor, &with_dups, window),
        expand_dates(anchor, &clean, window)
    );
}

#[test]
fn expansion_is_deterministic_and_ordered() {
    let window = days((2023, 12, 31), (2024, 6, 1));
    for (anchor, rule) in sample_rules() {
        let first = expand_dates(anchor, &rule, window);
        let second = expand_dates(anchor, &rule, window);
        assert_eq!(first, second, "{rule:?}");
        assert!(
            first.windows(2).all(|pair| pair[0] <= pair[1]),
            "unordered output for {rule:?}"
        );
    }
}

#[test]
fn narrower_window_is_a_subset_of_wider_window() {
    let outer = days((2023, 11, 1), (2024, 7, 31));
    let inners = [
        days((2024, 1, 10), (2024, 1, 25)),
        days((2024, 3, 10), (2024, 3, 25)),
        days((2024, 2, 29), (2024, 5, 2)),
        DateInterval::new(at(2024, 3, 6, 8, 0), at(2024, 3, 6, 8, 0)),
    ];

    for (anchor, rule) in sample_rules() {
        let wide = expand_dates(anchor, &rule, outer);
        for inner in inners {
            let narrow = expand_dates(anchor, &rule, inner);
            for date in &narrow {
                assert!(inner.contains(*date));
                assert!(
                    wide.contains(date),
                    "{date} from {inner:?} missing in outer window for {rule:?}"
                );
            }
        }
    }
}

#[test]
fn weekly_cadence_stays_aligned_when_window_starts_on_off_week() {
    let rule = Recurrence::Weekly {
        interval: 2,
        weekdays: vec![1],
    };
    // Week of 03-10 is an off week for a series anchored on 03-04.
    let dates = expand_dates(at(2024, 3, 4, 8, 0), &rule, days((2024, 3, 10), (2024, 3, 31)));
    assert_eq!(dates, vec![at(2024, 3, 18, 8, 0)]);
}

#[test]
fn occurrences_keep_anchor_time_of_day() {
    for (anchor, rule) in sample_rules() {
        for date in expand_dates(anchor, &rule, days((2023, 11, 1), (2024, 7, 31))) {
            assert_eq!(date.time(), anchor.time(), "{rule:?}");
        }
    }
}

#[test]
fn every_rule_keeps_anchor_seconds() {
    let anchor = at(2024, 1, 10, 9, 0) + Duration::seconds(30);
    let window = days((2024, 1, 1), (2024, 3, 31));
    let rules = [
        Recurrence::Daily { interval: 7 },
        Recurrence::Weekly {
            interval: 1,
            weekdays: vec![3],
        },
        Recurrence::Monthly {
            interval: 1,
            day: 10,
        },
    ];
    for rule in rules {
        let dates = expand_dates(anchor, &rule, window);
        assert!(!dates.is_empty(), "{rule:?}");
        assert!(
            dates.iter().all(|date| date.time() == anchor.time()),
            "{rule:?}: {dates:?}"
        );
    }
}

#[test]
fn expansion_ignores_task_status() {
    let mut paused = task(at(2024, 1, 15, 9, 0), Recurrence::Daily { interval: 1 });
    paused.pause();
    let window = days((2024, 1, 15), (2024, 1, 16));
    assert_eq!(expand_occurrences(&paused, window).len(), 2);
    assert!(expand_calendar(&[paused], window).is_empty());
}

#[test]
fn expand_calendar_merges_tasks_in_date_order() {
    let morning = task(at(2024, 1, 15, 7, 0), Recurrence::Daily { interval: 1 });
    let evening = task(at(2024, 1, 14, 20, 0), Recurrence::Daily { interval: 1 });
    let merged = expand_calendar(
        &[evening.clone(), morning.clone()],
        days((2024, 1, 15), (2024, 1, 16)),
    );

    let ids: Vec<_> = merged.iter().map(|o| o.task_id).collect();
    assert_eq!(ids, vec![morning.id, evening.id, morning.id, evening.id]);
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "malformed recurrence"))]
fn malformed_rule_fails_fast_in_debug_and_is_empty_in_release() {
    let dates = expand_dates(
        at(2024, 1, 15, 9, 0),
        &Recurrence::Daily { interval: 0 },
        days((2024, 1, 1), (2024, 1, 31)),
    );
    assert!(dates.is_empty());
}
