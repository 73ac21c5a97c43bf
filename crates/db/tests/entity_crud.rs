//! Integration tests for entity CRUD against a real database:
//! - Create the full hierarchy (initiative -> metric -> claim)
//! - Window and value validation at the repository edge
//! - Donor email uniqueness (case-insensitive)
//! - Evidence creation with link sets
//! - Cascade delete behaviour

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;
use tally_core::claim::{MetricCategory, MetricKind};
use tally_core::error::CoreError;
use tally_db::error::DbError;
use tally_db::models::claim::CreateImpactClaim;
use tally_db::models::donor::CreateDonor;
use tally_db::models::evidence::CreateEvidenceItem;
use tally_db::models::initiative::CreateInitiative;
use tally_db::models::metric::{CreateMetric, UpdateMetric};
use tally_db::repositories::{ClaimRepo, DonorRepo, EvidenceRepo, InitiativeRepo, MetricRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn new_initiative(pool: &PgPool, name: &str) -> i64 {
    InitiativeRepo::create(
        pool,
        &CreateInitiative {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_metric(pool: &PgPool, initiative_id: i64, title: &str, kind: MetricKind) -> i64 {
    MetricRepo::create(
        pool,
        &CreateMetric {
            initiative_id,
            title: title.to_string(),
            unit_label: "people".to_string(),
            category: MetricCategory::Output,
            kind,
        },
    )
    .await
    .unwrap()
    .id
}

fn single_date_claim(metric_id: i64, value: f64, date: NaiveDate) -> CreateImpactClaim {
    CreateImpactClaim {
        metric_id,
        value,
        label: None,
        note: None,
        location_id: None,
        represented_date: Some(date),
        period_start: None,
        period_end: None,
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn metric_crud_round_trip(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;

    let metric = MetricRepo::find_by_id(&pool, metric_id).await.unwrap().unwrap();
    assert_eq!(metric.title, "People Trained");
    assert_eq!(metric.metric_kind().unwrap(), MetricKind::Count);

    let updated = MetricRepo::update(
        &pool,
        metric_id,
        &UpdateMetric {
            title: Some("Farmers Trained".to_string()),
            unit_label: None,
            category: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Farmers Trained");
    assert_eq!(updated.unit_label, "people");

    assert!(MetricRepo::delete(&pool, metric_id).await.unwrap());
    assert!(MetricRepo::find_by_id(&pool, metric_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_window_round_trips(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;

    let claim = ClaimRepo::create(&pool, &single_date_claim(metric_id, 50.0, d(2024, 3, 1)))
        .await
        .unwrap();
    assert_eq!(claim.window().unwrap().duration_days(), 1);

    let ranged = ClaimRepo::create(
        &pool,
        &CreateImpactClaim {
            metric_id,
            value: 30.0,
            label: Some("March workshop".to_string()),
            note: None,
            location_id: None,
            represented_date: None,
            period_start: Some(d(2024, 3, 10)),
            period_end: Some(d(2024, 3, 15)),
        },
    )
    .await
    .unwrap();
    assert_eq!(ranged.window().unwrap().duration_days(), 6);
    assert_eq!(ranged.window().unwrap().effective_date(), d(2024, 3, 15));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_without_any_window_rejected(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;

    let result = ClaimRepo::create(
        &pool,
        &CreateImpactClaim {
            metric_id,
            value: 10.0,
            label: None,
            note: None,
            location_id: None,
            represented_date: None,
            period_start: None,
            period_end: None,
        },
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidWindow(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_with_inverted_range_rejected(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;

    let result = ClaimRepo::create(
        &pool,
        &CreateImpactClaim {
            metric_id,
            value: 10.0,
            label: None,
            note: None,
            location_id: None,
            represented_date: None,
            period_start: Some(d(2024, 3, 15)),
            period_end: Some(d(2024, 3, 10)),
        },
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidWindow(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn percentage_claim_capped_at_hundred(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(
        &pool,
        initiative_id,
        "Wells Functional",
        MetricKind::Percentage,
    )
    .await;

    let result = ClaimRepo::create(&pool, &single_date_claim(metric_id, 120.0, d(2024, 3, 1))).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));

    assert!(
        ClaimRepo::create(&pool, &single_date_claim(metric_id, 100.0, d(2024, 3, 1)))
            .await
            .is_ok()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_for_unknown_metric_rejected(pool: PgPool) {
    let result = ClaimRepo::create(&pool, &single_date_claim(424242, 10.0, d(2024, 3, 1))).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::UnknownReference {
            entity: "Metric",
            ..
        }))
    );
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn donor_email_unique_case_insensitive(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;

    DonorRepo::create(
        &pool,
        &CreateDonor {
            initiative_id,
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
            organization: None,
        },
    )
    .await
    .unwrap();

    let duplicate = DonorRepo::create(
        &pool,
        &CreateDonor {
            initiative_id,
            name: "Ada Again".to_string(),
            email: "ADA@Example.org".to_string(),
            organization: None,
        },
    )
    .await;
    assert!(duplicate.is_err());

    let found = DonorRepo::find_by_email(&pool, initiative_id, "ADA@EXAMPLE.ORG")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Ada");
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn evidence_links_round_trip(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;
    let claim = ClaimRepo::create(&pool, &single_date_claim(metric_id, 50.0, d(2024, 3, 1)))
        .await
        .unwrap();

    let evidence = EvidenceRepo::create(
        &pool,
        &CreateEvidenceItem {
            initiative_id,
            kind: "document".to_string(),
            file_ref: Some("uploads/report.pdf".to_string()),
            description: None,
            represented_date: Some(d(2024, 3, 1)),
            period_start: None,
            period_end: None,
            metric_ids: vec![metric_id],
            location_ids: vec![],
        },
    )
    .await
    .unwrap();

    // Candidate claims come from the linked metrics.
    let candidates = EvidenceRepo::list_candidate_claims(&pool, evidence.id)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, claim.id);

    // No claim links until explicitly set.
    let detail = EvidenceRepo::find_detail(&pool, evidence.id).await.unwrap().unwrap();
    assert_eq!(detail.metric_ids, vec![metric_id]);
    assert!(detail.claim_ids.is_empty());

    EvidenceRepo::set_claim_links(&pool, evidence.id, &[claim.id])
        .await
        .unwrap();
    let linked = EvidenceRepo::list_for_claim(&pool, claim.id).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, evidence.id);

    // Replacing with the empty set clears the links.
    EvidenceRepo::set_claim_links(&pool, evidence.id, &[]).await.unwrap();
    assert!(EvidenceRepo::list_for_claim(&pool, claim.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evidence_links_for_unknown_evidence_rejected(pool: PgPool) {
    let result = EvidenceRepo::set_claim_links(&pool, 424242, &[]).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::UnknownReference {
            entity: "EvidenceItem",
            ..
        }))
    );
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_metric_cascades_to_claims(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;
    let claim = ClaimRepo::create(&pool, &single_date_claim(metric_id, 50.0, d(2024, 3, 1)))
        .await
        .unwrap();

    assert!(MetricRepo::delete(&pool, metric_id).await.unwrap());
    assert!(ClaimRepo::find_by_id(&pool, claim.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_initiative_cascades_everywhere(pool: PgPool) {
    let initiative_id = new_initiative(&pool, "Clean Water").await;
    let metric_id = new_metric(&pool, initiative_id, "People Trained", MetricKind::Count).await;
    ClaimRepo::create(&pool, &single_date_claim(metric_id, 50.0, d(2024, 3, 1)))
        .await
        .unwrap();

    assert!(InitiativeRepo::delete(&pool, initiative_id).await.unwrap());
    assert!(MetricRepo::find_by_id(&pool, metric_id).await.unwrap().is_none());
}
