//! PostgreSQL repository tests. Each test gets a fresh database from
//! `#[sqlx::test]`; run with `DATABASE_URL` set and `--ignored`.

use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use qr_tracker::domain::entities::{
    NewAuditLog, NewQrCode, NewScan, NewScanLocation, NewWorker, QrCustomization, UtmParams,
};
use qr_tracker::domain::repositories::{
    AuditLogRepository, QrCodeRepository, ScanRepository, TokenRepository, WorkerRepository,
};
use qr_tracker::error::AppError;
use qr_tracker::infrastructure::persistence::{
    PgAuditLogRepository, PgQrCodeRepository, PgScanRepository, PgTokenRepository,
    PgWorkerRepository,
};

fn new_qr_code(worker_id: i64, token: &str) -> NewQrCode {
    NewQrCode {
        worker_id,
        purpose: "Flyer".to_string(),
        username: Some("store-center".to_string()),
        product_code: None,
        target_url: "https://example.com".to_string(),
        tracking_url: token.to_string(),
        customization: QrCustomization::default(),
    }
}

fn new_worker(name: &str, code: &str) -> NewWorker {
    NewWorker {
        name: name.to_string(),
        code: code.to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_worker_code_is_unique(pool: PgPool) {
    let repo = PgWorkerRepository::new(Arc::new(pool));

    repo.create(new_worker("Ana", "AAAAAA")).await.unwrap();
    let duplicate = repo.create(new_worker("Ion", "AAAAAA")).await;

    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_qr_code_unknown_worker_is_validation_error(pool: PgPool) {
    let repo = PgQrCodeRepository::new(Arc::new(pool));

    let result = repo.create(new_qr_code(4242, "tok1")).await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_qr_code_customization_round_trips(pool: PgPool) {
    let pool = Arc::new(pool);
    let workers = PgWorkerRepository::new(pool.clone());
    let qr_codes = PgQrCodeRepository::new(pool);

    let worker = workers.create(new_worker("Ana", "AAAAAA")).await.unwrap();
    let mut input = new_qr_code(worker.id, "tok1");
    input.customization.size = 512;
    input.customization.fg_color = "#112233".to_string();
    qr_codes.create(input).await.unwrap();

    let found = qr_codes.find_by_tracking_token("tok1").await.unwrap().unwrap();
    assert_eq!(found.customization.size, 512);
    assert_eq!(found.customization.fg_color, "#112233");
    assert_eq!(found.username.as_deref(), Some("store-center"));

    let duplicate = qr_codes.create(new_qr_code(worker.id, "tok1")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_scan_trigger_increments_counters(pool: PgPool) {
    let pool = Arc::new(pool);
    let workers = PgWorkerRepository::new(pool.clone());
    let qr_codes = PgQrCodeRepository::new(pool.clone());
    let scans = PgScanRepository::new(pool);

    let worker = workers.create(new_worker("Ana", "AAAAAA")).await.unwrap();
    let qr = qr_codes.create(new_qr_code(worker.id, "tok1")).await.unwrap();

    for _ in 0..2 {
        scans
            .record_scan(NewScan {
                qr_code_id: qr.id,
                user_agent: Some("Mozilla/5.0".to_string()),
                referrer: None,
                utm: UtmParams::default(),
            })
            .await
            .unwrap();
    }

    let qr = qr_codes.find_by_id(qr.id).await.unwrap().unwrap();
    let worker = workers.find_by_id(worker.id).await.unwrap().unwrap();
    assert_eq!(qr.scan_count, 2);
    assert_eq!(worker.visits_count, 2);

    let counts = workers.counts().await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].qr_codes, 1);
    assert_eq!(counts[0].scans, 2);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_scan_details_join_location(pool: PgPool) {
    let pool = Arc::new(pool);
    let workers = PgWorkerRepository::new(pool.clone());
    let qr_codes = PgQrCodeRepository::new(pool.clone());
    let scans = PgScanRepository::new(pool);

    let worker = workers.create(new_worker("Ana", "AAAAAA")).await.unwrap();
    let qr = qr_codes.create(new_qr_code(worker.id, "tok1")).await.unwrap();
    let scan = scans
        .record_scan(NewScan {
            qr_code_id: qr.id,
            user_agent: None,
            referrer: Some("https://www.facebook.com/".to_string()),
            utm: UtmParams::default(),
        })
        .await
        .unwrap();
    scans
        .record_location(NewScanLocation {
            scan_id: scan.id,
            latitude: 47.01,
            longitude: 28.86,
            accuracy: Some(12.0),
            city: Some("Chisinau".to_string()),
            country: Some("Moldova".to_string()),
        })
        .await
        .unwrap();

    let details = scans.list_since(None).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].worker_name.as_deref(), Some("Ana"));
    assert_eq!(details[0].purpose.as_deref(), Some("Flyer"));
    let location = details[0].location.as_ref().unwrap();
    assert_eq!(location.city.as_deref(), Some("Chisinau"));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_worker_delete_cascades(pool: PgPool) {
    let pool = Arc::new(pool);
    let workers = PgWorkerRepository::new(pool.clone());
    let qr_codes = PgQrCodeRepository::new(pool.clone());
    let scans = PgScanRepository::new(pool);

    let worker = workers.create(new_worker("Ana", "AAAAAA")).await.unwrap();
    let qr = qr_codes.create(new_qr_code(worker.id, "tok1")).await.unwrap();
    scans
        .record_scan(NewScan {
            qr_code_id: qr.id,
            user_agent: None,
            referrer: None,
            utm: UtmParams::default(),
        })
        .await
        .unwrap();

    assert!(workers.delete(worker.id).await.unwrap());
    assert!(!workers.delete(worker.id).await.unwrap());
    assert_eq!(qr_codes.count().await.unwrap(), 0);
    assert_eq!(scans.count().await.unwrap(), 0);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_audit_log_newest_first(pool: PgPool) {
    let repo = PgAuditLogRepository::new(Arc::new(pool));

    for id in 1..=3 {
        repo.record(NewAuditLog::qr_code("create", 1, id, json!({ "n": id })))
            .await
            .unwrap();
    }

    let entries = repo.list_recent(2).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].resource_id, Some(3));
    assert_eq!(entries[0].details["n"], 3);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_token_lifecycle(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("dashboard", "hash123").await.unwrap();
    assert!(repo.validate_token("hash123").await.unwrap());
    assert!(!repo.validate_token("unknown").await.unwrap());

    repo.update_last_used("hash123").await.unwrap();
    let found = repo.find_by_name("dashboard").await.unwrap().unwrap();
    assert!(found.last_used_at.is_some());

    repo.revoke_token(token.id).await.unwrap();
    assert!(!repo.validate_token("hash123").await.unwrap());
    let found = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(!found.is_active());
}
