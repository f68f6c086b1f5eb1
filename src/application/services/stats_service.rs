//! Scan statistics and analytics service.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;

use crate::domain::entities::ScanDetails;
use crate::domain::repositories::{QrCodeRepository, ScanRepository, WorkerRepository};
use crate::domain::stats::{
    DayBucket, TimeRange, UsernameSummary, WorkerActivity, bucket_by_day, username_summary,
    worker_activity,
};
use crate::error::AppError;

/// Accepted UTC offsets in minutes (UTC-12:00 to UTC+14:00).
pub const UTC_OFFSET_RANGE_MINUTES: std::ops::RangeInclusive<i32> = -720..=840;

/// Headline totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub workers: i64,
    pub qr_codes: i64,
    pub scans: i64,
}

/// Scan history for a trailing window.
#[derive(Debug, Clone)]
pub struct ScanHistory {
    pub range: TimeRange,
    pub since: DateTime<Utc>,
    /// All-time number of scans, not only those in the window.
    pub total_scans: i64,
    pub buckets: Vec<DayBucket>,
    /// Scans in the window, newest first.
    pub recent: Vec<ScanDetails>,
}

/// Service for chart-ready statistics.
///
/// Rows are fetched through the repositories and aggregated in memory by
/// [`crate::domain::stats`].
pub struct StatsService<W, Q, S>
where
    W: WorkerRepository + ?Sized,
    Q: QrCodeRepository + ?Sized,
    S: ScanRepository + ?Sized,
{
    workers: Arc<W>,
    qr_codes: Arc<Q>,
    scans: Arc<S>,
}

impl<W, Q, S> StatsService<W, Q, S>
where
    W: WorkerRepository + ?Sized,
    Q: QrCodeRepository + ?Sized,
    S: ScanRepository + ?Sized,
{
    pub fn new(workers: Arc<W>, qr_codes: Arc<Q>, scans: Arc<S>) -> Self {
        Self {
            workers,
            qr_codes,
            scans,
        }
    }

    /// Counts workers, QR codes and scans.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn overview(&self) -> Result<Overview, AppError> {
        Ok(Overview {
            workers: self.workers.count().await?,
            qr_codes: self.qr_codes.count().await?,
            scans: self.scans.count().await?,
        })
    }

    /// Scans per calendar day over `range`, dated in the caller's UTC offset.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the offset is outside UTC-12:00..UTC+14:00.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn scan_history(
        &self,
        range: TimeRange,
        utc_offset_minutes: i32,
    ) -> Result<ScanHistory, AppError> {
        let offset = parse_offset(utc_offset_minutes)?;
        let since = range.since(Utc::now());

        let recent = self.scans.list_since(Some(since)).await?;
        let total_scans = self.scans.count().await?;
        let buckets = bucket_by_day(recent.iter().map(|s| s.scanned_at), offset);

        Ok(ScanHistory {
            range,
            since,
            total_scans,
            buckets,
            recent,
        })
    }

    /// Per-worker activity, most scanned first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn worker_activity(&self) -> Result<Vec<WorkerActivity>, AppError> {
        let workers = self.workers.list().await?;
        let qr_codes = self.qr_codes.list(None).await?;
        Ok(worker_activity(&workers, &qr_codes))
    }

    /// Per-username summaries, optionally filtered by a search term.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn usernames(&self, query: Option<&str>) -> Result<Vec<UsernameSummary>, AppError> {
        let workers = self.workers.list().await?;
        let qr_codes = self.qr_codes.list(None).await?;
        Ok(username_summary(&workers, &qr_codes, query))
    }
}

fn parse_offset(minutes: i32) -> Result<FixedOffset, AppError> {
    if !UTC_OFFSET_RANGE_MINUTES.contains(&minutes) {
        return Err(AppError::bad_request(
            "UTC offset out of range",
            json!({
                "utc_offset_minutes": minutes,
                "min": UTC_OFFSET_RANGE_MINUTES.start(),
                "max": UTC_OFFSET_RANGE_MINUTES.end(),
            }),
        ));
    }

    FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
        AppError::bad_request(
            "Invalid UTC offset",
            json!({ "utc_offset_minutes": minutes }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Worker;
    use crate::domain::entities::qr_code::sample_qr_code;
    use crate::domain::repositories::{
        MockQrCodeRepository, MockScanRepository, MockWorkerRepository,
    };
    use chrono::{Duration, NaiveDate, TimeZone};

    type TestService = StatsService<MockWorkerRepository, MockQrCodeRepository, MockScanRepository>;

    fn service(
        workers: MockWorkerRepository,
        qr_codes: MockQrCodeRepository,
        scans: MockScanRepository,
    ) -> TestService {
        StatsService::new(Arc::new(workers), Arc::new(qr_codes), Arc::new(scans))
    }

    fn details(id: i64, scanned_at: DateTime<Utc>) -> ScanDetails {
        ScanDetails {
            id,
            qr_code_id: 1,
            scanned_at,
            user_agent: None,
            referrer: None,
            purpose: Some("Flyer".to_string()),
            worker_name: Some("Ana".to_string()),
            location: None,
        }
    }

    #[tokio::test]
    async fn test_overview() {
        let mut workers = MockWorkerRepository::new();
        workers.expect_count().returning(|| Ok(3));
        let mut qr_codes = MockQrCodeRepository::new();
        qr_codes.expect_count().returning(|| Ok(8));
        let mut scans = MockScanRepository::new();
        scans.expect_count().returning(|| Ok(120));

        let overview = service(workers, qr_codes, scans).overview().await.unwrap();

        assert_eq!(
            overview,
            Overview {
                workers: 3,
                qr_codes: 8,
                scans: 120
            }
        );
    }

    #[tokio::test]
    async fn test_scan_history_buckets_window() {
        let mut scans = MockScanRepository::new();
        scans
            .expect_list_since()
            .withf(|since| {
                let Some(since) = *since else {
                    return false;
                };
                let expected = Utc::now() - Duration::days(7);
                (since - expected).num_seconds().abs() < 60
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    details(3, Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap()),
                    details(2, Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()),
                    details(1, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
                ])
            });
        scans.expect_count().returning(|| Ok(50));

        let history = service(MockWorkerRepository::new(), MockQrCodeRepository::new(), scans)
            .scan_history(TimeRange::Week, 0)
            .await
            .unwrap();

        assert_eq!(history.total_scans, 50);
        assert_eq!(history.recent.len(), 3);
        assert_eq!(history.buckets.len(), 2);
        assert_eq!(
            history.buckets[0].date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(history.buckets[0].count, 2);
    }

    #[tokio::test]
    async fn test_scan_history_offset_shifts_dates() {
        let mut scans = MockScanRepository::new();
        scans.expect_list_since().returning(|_| {
            Ok(vec![
                details(2, Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap()),
                details(1, Utc.with_ymd_and_hms(2024, 5, 2, 0, 30, 0).unwrap()),
            ])
        });
        scans.expect_count().returning(|| Ok(2));

        let history = service(MockWorkerRepository::new(), MockQrCodeRepository::new(), scans)
            .scan_history(TimeRange::Month, 180)
            .await
            .unwrap();

        assert_eq!(history.buckets.len(), 1);
        assert_eq!(history.buckets[0].count, 2);
    }

    #[tokio::test]
    async fn test_scan_history_rejects_bad_offset() {
        let mut scans = MockScanRepository::new();
        scans.expect_list_since().never();

        let result = service(MockWorkerRepository::new(), MockQrCodeRepository::new(), scans)
            .scan_history(TimeRange::Year, 900)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_worker_activity_uses_all_codes() {
        let mut workers = MockWorkerRepository::new();
        workers.expect_list().returning(|| {
            Ok(vec![
                Worker::new(1, "Ana".to_string(), "AAAAAA".to_string(), 2, Utc::now()),
                Worker::new(2, "Ion".to_string(), "BBBBBB".to_string(), 9, Utc::now()),
            ])
        });
        let mut qr_codes = MockQrCodeRepository::new();
        qr_codes
            .expect_list()
            .withf(|worker_id| worker_id.is_none())
            .returning(|_| Ok(vec![sample_qr_code(1, 2, "t1"), sample_qr_code(2, 1, "t2")]));

        let activity = service(workers, qr_codes, MockScanRepository::new())
            .worker_activity()
            .await
            .unwrap();

        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].name, "Ion");
        assert_eq!(activity[0].total_codes, 1);
    }

    #[tokio::test]
    async fn test_usernames_filtered() {
        let mut workers = MockWorkerRepository::new();
        workers.expect_list().returning(|| {
            Ok(vec![Worker::new(
                1,
                "Ana".to_string(),
                "AAAAAA".to_string(),
                0,
                Utc::now(),
            )])
        });
        let mut qr_codes = MockQrCodeRepository::new();
        qr_codes.expect_list().returning(|_| {
            let mut a = sample_qr_code(1, 1, "t1");
            a.username = Some("store-center".to_string());
            let mut b = sample_qr_code(2, 1, "t2");
            b.username = Some("kiosk".to_string());
            Ok(vec![a, b])
        });

        let summaries = service(workers, qr_codes, MockScanRepository::new())
            .usernames(Some("STORE"))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].username, "store-center");
        assert_eq!(summaries[0].workers, vec!["Ana".to_string()]);
    }
}
