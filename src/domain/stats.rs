//! Chart-ready aggregation over already-fetched rows.
//!
//! Everything here is pure and synchronous; the stats service fetches rows
//! through the repositories and hands them to these functions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{QrCode, Worker};

/// Trailing window of scan history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn days(self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }

    /// Start of the window ending at `now`.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Number of scans on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// Groups timestamps by calendar date in the given UTC offset.
///
/// Buckets come out sorted chronologically, one per distinct date.
pub fn bucket_by_day<I>(timestamps: I, offset: FixedOffset) -> Vec<DayBucket>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for ts in timestamps {
        *counts.entry(ts.with_timezone(&offset).date_naive()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| DayBucket { date, count })
        .collect()
}

/// Activity summary of a single worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerActivity {
    pub worker_id: i64,
    pub name: String,
    pub total_scans: i64,
    pub average_scans_per_code: i64,
    pub total_codes: usize,
    pub unique_usernames: usize,
    pub usernames: Vec<String>,
}

/// Builds per-worker activity, sorted by total scans descending, then by name.
///
/// Total scans is the worker's own `visits_count`. The per-code average uses
/// the QR codes' `scan_count`, rounded half-up, and is 0 for a worker without
/// codes. Usernames keep their first-seen order.
pub fn worker_activity(workers: &[Worker], qr_codes: &[QrCode]) -> Vec<WorkerActivity> {
    let mut by_worker: HashMap<i64, Vec<&QrCode>> = HashMap::new();
    for qr in qr_codes {
        by_worker.entry(qr.worker_id).or_default().push(qr);
    }

    let mut activity: Vec<WorkerActivity> = workers
        .iter()
        .map(|worker| {
            let codes = by_worker.get(&worker.id).map(Vec::as_slice).unwrap_or(&[]);
            let scan_sum: i64 = codes.iter().map(|qr| qr.scan_count.max(0)).sum();

            let mut usernames: Vec<String> = Vec::new();
            for username in codes.iter().filter_map(|qr| qr.username.as_deref()) {
                if !username.is_empty() && !usernames.iter().any(|u| u == username) {
                    usernames.push(username.to_string());
                }
            }

            WorkerActivity {
                worker_id: worker.id,
                name: worker.name.clone(),
                total_scans: worker.visits_count,
                average_scans_per_code: rounded_average(scan_sum, codes.len()),
                total_codes: codes.len(),
                unique_usernames: usernames.len(),
                usernames,
            }
        })
        .collect();

    activity.sort_by(|a, b| {
        b.total_scans
            .cmp(&a.total_scans)
            .then_with(|| a.name.cmp(&b.name))
    });
    activity
}

fn rounded_average(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let count = count as i64;
    (2 * sum + count) / (2 * count)
}

/// Everything known about one username across workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsernameSummary {
    pub username: String,
    pub workers: Vec<String>,
    pub total_scans: i64,
    pub purposes: Vec<String>,
    pub product_codes: Vec<String>,
}

/// Summarizes QR codes by username.
///
/// Codes without a username are ignored. When `query` is given only
/// usernames containing it (case-insensitive) are kept. Results are sorted by
/// total scans descending, then by username.
pub fn username_summary(
    workers: &[Worker],
    qr_codes: &[QrCode],
    query: Option<&str>,
) -> Vec<UsernameSummary> {
    let names: HashMap<i64, &str> = workers.iter().map(|w| (w.id, w.name.as_str())).collect();
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    struct Acc<'a> {
        workers: BTreeSet<&'a str>,
        total_scans: i64,
        purposes: BTreeSet<&'a str>,
        product_codes: BTreeSet<&'a str>,
    }

    let mut grouped: BTreeMap<&str, Acc> = BTreeMap::new();
    for qr in qr_codes {
        let Some(username) = qr.username.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        if let Some(q) = &query
            && !username.to_lowercase().contains(q.as_str())
        {
            continue;
        }

        let acc = grouped.entry(username).or_insert_with(|| Acc {
            workers: BTreeSet::new(),
            total_scans: 0,
            purposes: BTreeSet::new(),
            product_codes: BTreeSet::new(),
        });
        if let Some(name) = names.get(&qr.worker_id) {
            acc.workers.insert(*name);
        }
        acc.total_scans += qr.scan_count.max(0);
        acc.purposes.insert(qr.purpose.as_str());
        if let Some(code) = qr.product_code.as_deref().filter(|c| !c.is_empty()) {
            acc.product_codes.insert(code);
        }
    }

    let to_vec = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect::<Vec<_>>();
    let mut summaries: Vec<UsernameSummary> = grouped
        .into_iter()
        .map(|(username, acc)| UsernameSummary {
            username: username.to_string(),
            workers: to_vec(acc.workers),
            total_scans: acc.total_scans,
            purposes: to_vec(acc.purposes),
            product_codes: to_vec(acc.product_codes),
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_scans
            .cmp(&a.total_scans)
            .then_with(|| a.username.cmp(&b.username))
    });
    summaries
}
