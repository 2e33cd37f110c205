use chrono::Duration;
use situm_core::deletion::DeletionKey;
use situm_core::model::{
    EventName, InteractionDraft, InteractionStatus, Operator, Region, Selection, Source,
    TargetGoals, TargetType,
};
use situm_core::report::GroupBy;
use situm_core::rubric::RubricFilter;
use situm_core::time::fixed_today;
use services::{AppServices, Clock, CrmConfig};

fn paid_business(name: &str) -> InteractionDraft {
    InteractionDraft::new(
        Operator::Nicole,
        name,
        TargetType::Business,
        "Confartigianato",
        Region::Marche,
        EventName::new("SITUM-FUTURE").unwrap(),
        InteractionStatus::Paid,
        Source::Email,
    )
}

#[tokio::test]
async fn operator_sets_goals_logs_contacts_and_tracks_progress() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Clock::fixed_on(fixed_today());
    let app = AppServices::new_flat_file(dir.path(), clock, CrmConfig::situm())
        .await
        .expect("open stores");
    let event = EventName::new("SITUM-FUTURE").unwrap();

    app.goals()
        .set_goals(
            Operator::Nicole,
            &event,
            TargetGoals::new(10, 2, 0),
            fixed_today() + Duration::days(5),
        )
        .await
        .expect("set goals");
    for i in 0..5 {
        app.interactions()
            .record(paid_business(&format!("Impresa {i}")))
            .await
            .expect("record");
    }

    let plan = app.progress().event_plan(Operator::Nicole, &event).await.unwrap();
    let business = plan.targets[0].progress;
    assert_eq!(business.achieved, 5);
    assert_eq!(business.percent, 50);
    assert_eq!(business.days_remaining, 5);
    assert_eq!(business.daily_target, 2);

    // Reopening the same directory sees the persisted state.
    let reopened = AppServices::new_flat_file(dir.path(), clock, CrmConfig::situm())
        .await
        .expect("reopen");
    assert_eq!(
        reopened
            .goals()
            .get_goal(Operator::Nicole, TargetType::Business, &event)
            .await
            .unwrap(),
        10
    );
    let rows = reopened
        .rubric()
        .filter(Operator::Nicole, &RubricFilter::all())
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn operator_deletes_a_listed_row() {
    let app = AppServices::in_memory(Clock::fixed_on(fixed_today()));
    app.interactions().record(paid_business("Alfa")).await.unwrap();
    app.interactions().record(paid_business("Beta")).await.unwrap();

    let candidates = app
        .interactions()
        .deletion_candidates(Operator::Nicole)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 2);
    let beta = candidates
        .iter()
        .find(|c| c.label.contains("Beta"))
        .expect("beta listed");

    let removed = app
        .interactions()
        .delete(Operator::Nicole, &beta.key)
        .await
        .unwrap();
    assert_eq!(removed.map(|r| r.name), Some("Beta".to_string()));

    let after = app
        .interactions()
        .deletion_candidates(Operator::Nicole)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert!(after[0].label.contains("Alfa"));
}

#[tokio::test]
async fn listed_key_survives_earlier_rows_being_deleted() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Clock::fixed_on(fixed_today());
    let app = AppServices::new_flat_file(dir.path(), clock, CrmConfig::situm())
        .await
        .expect("open stores");

    let mut nadia = paid_business("Zeno");
    nadia.operator = Operator::Nadia;
    let nadia_row = app.interactions().record(nadia).await.unwrap();
    app.interactions().record(paid_business("Anna")).await.unwrap();
    app.interactions().record(paid_business("Bruno")).await.unwrap();

    // Nicole picks Anna, who sits at row 2 when listed.
    let listed = app
        .interactions()
        .deletion_candidates(Operator::Nicole)
        .await
        .unwrap();
    let anna = listed
        .iter()
        .find(|c| c.label.contains("Anna"))
        .expect("anna listed")
        .clone();
    assert_eq!(anna.key.id().value(), 2);

    // Nadia's earlier row goes away, so every later row moves up by one.
    let nadia_key = DeletionKey::of(&nadia_row);
    assert!(app
        .interactions()
        .delete(Operator::Nadia, &nadia_key)
        .await
        .unwrap()
        .is_some());

    // Row 2 is now Bruno; the stale key must not remove him.
    let removed = app
        .interactions()
        .delete(Operator::Nicole, &anna.key)
        .await
        .unwrap();
    assert_eq!(removed, None);

    let names: Vec<String> = app
        .rubric()
        .filter(Operator::Nicole, &RubricFilter::all())
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Anna".to_string()));
    assert!(names.contains(&"Bruno".to_string()));

    // Listing again yields a fresh key that removes Anna.
    let relisted = app
        .interactions()
        .deletion_candidates(Operator::Nicole)
        .await
        .unwrap();
    let anna = relisted
        .iter()
        .find(|c| c.label.contains("Anna"))
        .expect("anna relisted");
    let removed = app
        .interactions()
        .delete(Operator::Nicole, &anna.key)
        .await
        .unwrap();
    assert_eq!(removed.map(|row| row.name), Some("Anna".to_string()));
}

#[tokio::test]
async fn coordinator_reports_cover_every_operator() {
    let app = AppServices::in_memory(Clock::fixed_on(fixed_today()));
    app.interactions().record(paid_business("Alfa")).await.unwrap();
    let mut other = paid_business("Gamma");
    other.operator = Operator::Alberto;
    other.region = Region::Abruzzo;
    app.interactions().record(other).await.unwrap();

    let by_region = app
        .reports()
        .aggregate(GroupBy::Region, &Selection::Only(TargetType::Business))
        .await
        .unwrap();
    assert_eq!(by_region.len(), 2);

    let coordinator_rows = app
        .rubric()
        .filter(Operator::Coordinator, &RubricFilter::all())
        .await
        .unwrap();
    assert_eq!(coordinator_rows.len(), 2);
    let nicole_rows = app.rubric().filter(Operator::Nicole, &RubricFilter::all()).await.unwrap();
    assert_eq!(nicole_rows.len(), 1);

    let event = EventName::new("SITUM-FUTURE").unwrap();
    let series = app.reports().cumulative(&event).await.unwrap();
    assert_eq!(series.len(), 2);
}
