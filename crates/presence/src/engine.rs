//! Day-accounting engine.
//!
//! Converts an unordered snapshot of crossings into the number of local
//! calendar days present. Pure and total: malformed sequences are resolved by
//! the policies below, never rejected.
//!
//! Rules, in order:
//! - crossings are stable-sorted by timestamp (ties keep input order);
//! - an exit closes the pending entry and counts every local day from the
//!   entry's day through the exit's day, both inclusive;
//! - an exit with no pending entry counts nothing;
//! - a second entry while one is pending is resolved by [`RepeatedEntryPolicy`];
//! - an entry still pending at the end counts through `today` only when no
//!   crossing is later than it and no stay was closed anywhere in the set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{ReferenceZone, inclusive_days};
use crate::crossing::{CrossingEvent, CrossingKind};

/// What to do with an entry that arrives while another entry is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatedEntryPolicy {
    /// The later entry replaces the pending one.
    #[default]
    KeepLatest,
    /// The later entry is ignored; the stay starts at the first entry.
    KeepFirst,
}

/// How a stay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayEnd {
    /// Closed by an exit crossing (input index of the exit).
    Exit { index: usize },
    /// Open entry counted through the reference date.
    Today,
}

/// One counted period of presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    /// Input index of the entry crossing.
    pub entry_index: usize,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub end: StayEnd,
    pub days: u32,
}

/// Why a crossing contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Exit with no pending entry.
    ExitWithoutEntry,
    /// Pending entry replaced by a later entry (`KeepLatest`).
    SupersededEntry,
    /// Entry dropped because one was already pending (`KeepFirst`).
    RepeatedEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredCrossing {
    pub index: usize,
    pub kind: CrossingKind,
    pub timestamp: DateTime<Utc>,
    pub reason: IgnoreReason,
}

impl IgnoredCrossing {
    fn new(index: usize, event: &CrossingEvent, reason: IgnoreReason) -> Self {
        Self {
            index,
            kind: event.kind,
            timestamp: event.timestamp,
            reason,
        }
    }
}

/// Why an open entry was not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenEntrySkip {
    /// At least one entry/exit pair was closed elsewhere in the set.
    CompletedStaysExist,
    /// Some crossing is later than the open entry.
    NotMostRecent,
}

/// Outcome of the open-entry tail rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum OpenEntry {
    /// Every entry was closed (or there were none).
    None,
    Counted { index: usize, days: u32 },
    Skipped { index: usize, reason: OpenEntrySkip },
}

/// Annotated result of one accounting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAccount {
    pub total_days: u32,
    pub today: NaiveDate,
    /// Counted stays in chronological order; an open stay, if counted, is last.
    pub stays: Vec<Stay>,
    pub ignored: Vec<IgnoredCrossing>,
    pub open_entry: OpenEntry,
}

impl DayAccount {
    pub fn closed_stays(&self) -> impl Iterator<Item = &Stay> {
        self.stays
            .iter()
            .filter(|s| matches!(s.end, StayEnd::Exit { .. }))
    }
}

/// Stateless calculator bound to a reference zone and policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayAccountant {
    zone: ReferenceZone,
    repeated_entry: RepeatedEntryPolicy,
}

impl DayAccountant {
    pub fn new(zone: ReferenceZone) -> Self {
        Self {
            zone,
            repeated_entry: RepeatedEntryPolicy::default(),
        }
    }

    pub fn with_repeated_entry_policy(mut self, policy: RepeatedEntryPolicy) -> Self {
        self.repeated_entry = policy;
        self
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Total local days present; `today` is the local reference date.
    pub fn days_present(&self, events: &[CrossingEvent], today: NaiveDate) -> u32 {
        self.account(events, today).total_days
    }

    /// Full accounting with the per-stay trace.
    pub fn account(&self, events: &[CrossingEvent], today: NaiveDate) -> DayAccount {
        let mut ordered: Vec<(usize, &CrossingEvent)> = events.iter().enumerate().collect();
        // `sort_by_key` is stable: simultaneous crossings keep input order.
        ordered.sort_by_key(|(_, e)| e.timestamp);

        let mut stays = Vec::new();
        let mut ignored = Vec::new();
        let mut pending: Option<(usize, &CrossingEvent)> = None;

        for &(index, event) in &ordered {
            match event.kind {
                CrossingKind::Entry => match pending {
                    None => pending = Some((index, event)),
                    Some((held_index, held)) => match self.repeated_entry {
                        RepeatedEntryPolicy::KeepLatest => {
                            ignored.push(IgnoredCrossing::new(
                                held_index,
                                held,
                                IgnoreReason::SupersededEntry,
                            ));
                            pending = Some((index, event));
                        }
                        RepeatedEntryPolicy::KeepFirst => {
                            ignored.push(IgnoredCrossing::new(index, event, IgnoreReason::RepeatedEntry));
                        }
                    },
                },
                CrossingKind::Exit => match pending.take() {
                    Some((entry_index, entry)) => {
                        let first_day = self.zone.local_day(entry.timestamp);
                        let last_day = self.zone.local_day(event.timestamp);
                        stays.push(Stay {
                            entry_index,
                            first_day,
                            last_day,
                            end: StayEnd::Exit { index },
                            days: inclusive_days(first_day, last_day),
                        });
                    }
                    None => {
                        ignored.push(IgnoredCrossing::new(index, event, IgnoreReason::ExitWithoutEntry));
                    }
                },
            }
        }

        let closed = stays.len();
        let open_entry = match pending {
            None => OpenEntry::None,
            Some((index, entry)) => {
                let is_most_recent = ordered.iter().all(|(_, e)| e.timestamp <= entry.timestamp);
                if closed > 0 {
                    OpenEntry::Skipped {
                        index,
                        reason: OpenEntrySkip::CompletedStaysExist,
                    }
                } else if !is_most_recent {
                    OpenEntry::Skipped {
                        index,
                        reason: OpenEntrySkip::NotMostRecent,
                    }
                } else {
                    let first_day = self.zone.local_day(entry.timestamp);
                    let days = inclusive_days(first_day, today);
                    stays.push(Stay {
                        entry_index: index,
                        first_day,
                        last_day: today,
                        end: StayEnd::Today,
                        days,
                    });
                    OpenEntry::Counted { index, days }
                }
            }
        };

        let total_days = stays.iter().fold(0u32, |acc, s| acc.saturating_add(s.days));

        DayAccount {
            total_days,
            today,
            stays,
            ignored,
            open_entry,
        }
    }
}

/// Days present under the default policy.
pub fn compute_days_present(events: &[CrossingEvent], zone: ReferenceZone, today: NaiveDate) -> u32 {
    DayAccountant::new(zone).days_present(events, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(s: &str) -> CrossingEvent {
        CrossingEvent::entry(at(s), "Peace Arch")
    }

    fn exit(s: &str) -> CrossingEvent {
        CrossingEvent::exit(at(s), "Peace Arch")
    }

    fn utc_days(events: &[CrossingEvent], today: &str) -> u32 {
        compute_days_present(events, ReferenceZone::utc(), day(today))
    }

    #[test]
    fn same_day_round_trip_counts_one_day() {
        let events = [entry("2024-01-05T08:00:00Z"), exit("2024-01-05T20:00:00Z")];
        assert_eq!(utc_days(&events, "2024-06-01"), 1);
    }

    #[test]
    fn midnight_spanning_stay_counts_two_days() {
        let events = [entry("2024-01-05T23:00:00Z"), exit("2024-01-06T01:00:00Z")];
        assert_eq!(utc_days(&events, "2024-06-01"), 2);
    }

    #[test]
    fn stay_counts_both_end_days() {
        let events = [entry("2024-01-01T09:00:00Z"), exit("2024-01-10T18:00:00Z")];
        assert_eq!(utc_days(&events, "2024-06-01"), 10);
    }

    #[test]
    fn sequential_stays_are_summed() {
        let events = [
            entry("2024-01-01T10:00:00Z"),
            exit("2024-01-03T10:00:00Z"),
            entry("2024-02-01T10:00:00Z"),
            exit("2024-02-05T10:00:00Z"),
        ];
        let account = DayAccountant::default().account(&events, day("2024-06-01"));
        assert_eq!(account.total_days, 8);
        let spans: Vec<u32> = account.closed_stays().map(|s| s.days).collect();
        assert_eq!(spans, vec![3, 5]);
    }

    #[test]
    fn unordered_input_is_sorted_first() {
        let events = [
            exit("2024-02-05T10:00:00Z"),
            entry("2024-01-01T10:00:00Z"),
            entry("2024-02-01T10:00:00Z"),
            exit("2024-01-03T10:00:00Z"),
        ];
        assert_eq!(utc_days(&events, "2024-06-01"), 8);
    }

    #[test]
    fn exit_without_entry_counts_nothing() {
        let events = [exit("2024-01-03T10:00:00Z")];
        let account = DayAccountant::default().account(&events, day("2024-06-01"));
        assert_eq!(account.total_days, 0);
        assert_eq!(account.ignored.len(), 1);
        assert_eq!(account.ignored[0].reason, IgnoreReason::ExitWithoutEntry);
        assert_eq!(account.open_entry, OpenEntry::None);
    }

    #[test]
    fn empty_log_counts_nothing() {
        assert_eq!(utc_days(&[], "2024-06-01"), 0);
    }

    #[test]
    fn open_entry_alone_counts_through_today() {
        let events = [entry("2024-03-01T12:00:00Z")];
        let account = DayAccountant::default().account(&events, day("2024-03-10"));
        assert_eq!(account.total_days, 10);
        assert_eq!(account.open_entry, OpenEntry::Counted { index: 0, days: 10 });
        assert_eq!(account.stays[0].end, StayEnd::Today);
        assert_eq!(account.stays[0].last_day, day("2024-03-10"));
    }

    #[test]
    fn open_entry_made_today_counts_one_day() {
        let events = [entry("2024-03-10T06:00:00Z")];
        assert_eq!(utc_days(&events, "2024-03-10"), 1);
    }

    #[test]
    fn open_entry_is_skipped_when_stays_were_closed() {
        let events = [
            entry("2024-01-01T10:00:00Z"),
            exit("2024-01-03T10:00:00Z"),
            entry("2024-03-10T06:00:00Z"),
        ];
        let account = DayAccountant::default().account(&events, day("2024-03-10"));
        assert_eq!(account.total_days, 3);
        assert_eq!(
            account.open_entry,
            OpenEntry::Skipped {
                index: 2,
                reason: OpenEntrySkip::CompletedStaysExist
            }
        );
    }

    #[test]
    fn orphan_exits_do_not_block_open_entry() {
        let events = [exit("2023-12-20T10:00:00Z"), entry("2024-03-08T06:00:00Z")];
        assert_eq!(utc_days(&events, "2024-03-10"), 3);
    }

    #[test]
    fn future_dated_open_entry_counts_nothing() {
        let events = [entry("2024-04-01T06:00:00Z")];
        assert_eq!(utc_days(&events, "2024-03-10"), 0);
    }

    #[test]
    fn repeated_entry_keeps_latest_by_default() {
        let events = [
            entry("2024-01-01T10:00:00Z"),
            entry("2024-01-05T10:00:00Z"),
            exit("2024-01-10T10:00:00Z"),
        ];
        let account = DayAccountant::default().account(&events, day("2024-06-01"));
        assert_eq!(account.total_days, 6);
        assert_eq!(account.ignored[0].index, 0);
        assert_eq!(account.ignored[0].reason, IgnoreReason::SupersededEntry);
    }

    #[test]
    fn repeated_entry_can_keep_first() {
        let events = [
            entry("2024-01-01T10:00:00Z"),
            entry("2024-01-05T10:00:00Z"),
            exit("2024-01-10T10:00:00Z"),
        ];
        let account = DayAccountant::default()
            .with_repeated_entry_policy(RepeatedEntryPolicy::KeepFirst)
            .account(&events, day("2024-06-01"));
        assert_eq!(account.total_days, 10);
        assert_eq!(account.ignored[0].index, 1);
        assert_eq!(account.ignored[0].reason, IgnoreReason::RepeatedEntry);
    }

    #[test]
    fn keep_first_open_entry_is_not_most_recent() {
        let events = [entry("2024-03-01T10:00:00Z"), entry("2024-03-05T10:00:00Z")];
        let account = DayAccountant::default()
            .with_repeated_entry_policy(RepeatedEntryPolicy::KeepFirst)
            .account(&events, day("2024-03-10"));
        assert_eq!(account.total_days, 0);
        assert_eq!(
            account.open_entry,
            OpenEntry::Skipped {
                index: 0,
                reason: OpenEntrySkip::NotMostRecent
            }
        );
    }

    #[test]
    fn simultaneous_crossings_keep_input_order() {
        // Exit listed before the re-entry: Jan 1–3 is closed, re-entry stays open.
        let exit_first = [
            entry("2024-01-01T10:00:00Z"),
            exit("2024-01-03T12:00:00Z"),
            entry("2024-01-03T12:00:00Z"),
        ];
        assert_eq!(utc_days(&exit_first, "2024-06-01"), 3);

        // Re-entry listed first: it supersedes Jan 1 and the exit closes a 1-day stay.
        let entry_first = [
            entry("2024-01-01T10:00:00Z"),
            entry("2024-01-03T12:00:00Z"),
            exit("2024-01-03T12:00:00Z"),
        ];
        assert_eq!(utc_days(&entry_first, "2024-06-01"), 1);
    }

    #[test]
    fn local_day_uses_reference_zone() {
        let events = [entry("2024-01-05T23:30:00Z"), exit("2024-01-06T00:30:00Z")];
        let today = day("2024-06-01");
        assert_eq!(compute_days_present(&events, ReferenceZone::utc(), today), 2);

        let eastern: ReferenceZone = "-05:00".parse().unwrap();
        assert_eq!(compute_days_present(&events, eastern, today), 1);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let events = [
            entry("2024-01-01T10:00:00Z"),
            exit("2024-01-03T10:00:00Z"),
            exit("2024-01-04T10:00:00Z"),
            entry("2024-02-01T10:00:00Z"),
        ];
        let accountant = DayAccountant::default();
        let first = accountant.account(&events, day("2024-06-01"));
        let second = accountant.account(&events, day("2024-06-01"));
        assert_eq!(first, second);
    }

    #[test]
    fn trace_serializes_for_consumers() {
        let events = [entry("2024-03-01T12:00:00Z")];
        let account = DayAccountant::default().account(&events, day("2024-03-02"));
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["total_days"], 2);
        assert_eq!(json["open_entry"]["outcome"], "counted");
        assert_eq!(json["stays"][0]["end"], "today");
    }

    fn crossing_log() -> impl Strategy<Value = Vec<CrossingEvent>> {
        // Distinct minutes keep the ordering total, so any permutation sorts identically.
        (
            prop::collection::hash_set(0i64..400_000, 0..40),
            prop::collection::vec(any::<bool>(), 40),
        )
            .prop_map(|(minutes, kinds)| {
                let base = at("2023-01-01T00:00:00Z");
                minutes
                    .into_iter()
                    .zip(kinds)
                    .map(|(m, is_entry)| {
                        let ts = base + chrono::Duration::minutes(m);
                        if is_entry {
                            CrossingEvent::entry(ts, "YVR")
                        } else {
                            CrossingEvent::exit(ts, "YVR")
                        }
                    })
                    .collect()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the total does not depend on input order.
        #[test]
        fn total_is_order_independent(
            (events, shuffled) in crossing_log()
                .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
        ) {
            let today = day("2024-06-01");
            for policy in [RepeatedEntryPolicy::KeepLatest, RepeatedEntryPolicy::KeepFirst] {
                let accountant = DayAccountant::default().with_repeated_entry_policy(policy);
                prop_assert_eq!(
                    accountant.days_present(&events, today),
                    accountant.days_present(&shuffled, today)
                );
            }
        }

        /// Property: the total is the sum of the reported stays, and every
        /// crossing is either part of a stay, ignored, or the skipped open entry.
        #[test]
        fn trace_accounts_for_every_crossing(events in crossing_log()) {
            let account = DayAccountant::default().account(&events, day("2024-06-01"));

            let summed: u32 = account.stays.iter().map(|s| s.days).sum();
            prop_assert_eq!(account.total_days, summed);

            let mut seen = 0;
            for stay in &account.stays {
                seen += match stay.end {
                    StayEnd::Exit { .. } => 2,
                    StayEnd::Today => 1,
                };
                prop_assert!(stay.days >= 1 || stay.end == StayEnd::Today);
            }
            seen += account.ignored.len();
            if matches!(account.open_entry, OpenEntry::Skipped { .. }) {
                seen += 1;
            }
            prop_assert_eq!(seen, events.len());
        }
    }
}
