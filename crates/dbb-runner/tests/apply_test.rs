//! End-to-end runs against DuckDB database files

use dbb_core::{ChangeScript, Config, Decimal, LedgerState, ProfileKind};
use dbb_db::{Database, DuckDbBackend, DuckDbProvider, Ledger};
use dbb_runner::{AutoApprove, Orchestrator, RunMode, SchemaOutcome};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const CONFIG: &str = r#"
workspace: workspace
throttle_ms: 0
schemas:
  - name: marigold
    scripts: marigold-database
    credentials: creds/marigold.yml
    test_credentials: creds/marigold-test.yml
  - name: marigoldData
    scripts: marigold-data
    credentials: creds/marigold-data.yml
    test_credentials: creds/marigold-data-test.yml
"#;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn setup() -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    let root = dir.path();

    write(
        &root.join("workspace/marigold-database/1-Initial/1-create_table.sql"),
        "CREATE TABLE t(id INT);--<",
    );
    write(
        &root.join("workspace/marigold-data/1_5-Reference/1-create_table.sql"),
        "CREATE TABLE ref(code VARCHAR);--<\nINSERT INTO ref VALUES ('a');--<",
    );

    write(
        &root.join("creds/marigold.yml"),
        "path: marigold.duckdb\nuser: mg_app\n",
    );
    write(
        &root.join("creds/marigold-test.yml"),
        "path: marigold-test.duckdb\nuser: mg_test\n",
    );
    write(
        &root.join("creds/marigold-data.yml"),
        "path: marigold-data.duckdb\nuser: mg_data_app\n",
    );
    write(
        &root.join("creds/marigold-data-test.yml"),
        "path: marigold-data-test.duckdb\nuser: mg_data_test\n",
    );
    write(&root.join("dbbuilder.yml"), CONFIG);

    let config = Config::load(&root.join("dbbuilder.yml")).unwrap();
    (dir, config)
}

async fn table_exists(path: &Path, table: &str) -> bool {
    let db = DuckDbBackend::from_path(path).unwrap();
    db.relation_exists(table).await.unwrap()
}

#[tokio::test]
async fn test_uncontrolled_schema_is_left_untouched() {
    let (dir, config) = setup();
    let orchestrator =
        Orchestrator::new(&config, ProfileKind::Standard, &DuckDbProvider, &AutoApprove);

    let reports = orchestrator.run(RunMode::Apply).await.unwrap();

    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(!report.test_identity);
        assert_eq!(report.state, LedgerState::Empty);
        assert_eq!(report.outcome, SchemaOutcome::UpToDate);
        assert_eq!(report.execution.statements, 0);
    }

    let db_path = dir.path().join("creds/marigold.duckdb");
    assert!(!table_exists(&db_path, "t").await);
    let db = DuckDbBackend::from_path(&db_path).unwrap();
    assert!(Ledger::new(&db).entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_test_profile_builds_from_scratch() {
    let (dir, config) = setup();
    let orchestrator = Orchestrator::new(&config, ProfileKind::Test, &DuckDbProvider, &AutoApprove);

    let reports = orchestrator.run(RunMode::Apply).await.unwrap();

    assert!(reports.iter().all(|r| r.test_identity));
    assert!(reports.iter().all(|r| r.outcome == SchemaOutcome::Applied));
    assert_eq!(reports[0].execution.statements, 1);
    assert_eq!(reports[1].execution.statements, 2);

    let db = DuckDbBackend::from_path(&dir.path().join("creds/marigold-test.duckdb")).unwrap();
    assert!(db.relation_exists("t").await.unwrap());
    let entries = Ledger::new(&db).entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].order, Decimal::from(1));
    assert_eq!(entries[0].name, "-Initial");
    drop(db);

    let data =
        DuckDbBackend::from_path(&dir.path().join("creds/marigold-data-test.duckdb")).unwrap();
    let entries = Ledger::new(&data).entries().await.unwrap();
    assert_eq!(entries[0].order, "1.5".parse::<Decimal>().unwrap());
    assert_eq!(entries[0].name, "-Reference");
}

#[tokio::test]
async fn test_second_run_only_applies_new_scripts() {
    let (dir, config) = setup();
    let db_path = dir.path().join("creds/marigold.duckdb");
    {
        let db = DuckDbBackend::from_path(&db_path).unwrap();
        db.execute("CREATE TABLE t(id INT)").await.unwrap();
        let ledger = Ledger::new(&db);
        ledger.create().await.unwrap();
        ledger
            .append(&ChangeScript::new(Decimal::from(1), "-Initial"))
            .await
            .unwrap();
    }

    write(
        &dir
            .path()
            .join("workspace/marigold-database/2-Add_Column/1-alter.sql"),
        "ALTER TABLE t ADD COLUMN name VARCHAR;--<",
    );

    let orchestrator =
        Orchestrator::new(&config, ProfileKind::Standard, &DuckDbProvider, &AutoApprove);
    let status = orchestrator.run(RunMode::Status).await.unwrap();
    assert_eq!(status[0].state, LedgerState::InSync { position: 0 });
    assert_eq!(status[0].pending.len(), 1);
    assert_eq!(status[1].state, LedgerState::Empty);

    let reports = orchestrator.run(RunMode::Apply).await.unwrap();
    assert_eq!(reports[0].outcome, SchemaOutcome::Applied);
    assert_eq!(reports[0].applied.len(), 1);
    assert_eq!(reports[0].applied[0].name(), "-Add_Column");
    assert_eq!(reports[0].applied[0].ledger_id(), Some(2));
    assert_eq!(reports[1].outcome, SchemaOutcome::UpToDate);

    let again = orchestrator.run(RunMode::Apply).await.unwrap();
    assert_eq!(again[0].outcome, SchemaOutcome::UpToDate);
}

#[tokio::test]
async fn test_test_profile_rebuilds_on_every_run() {
    let (dir, config) = setup();
    write(
        &dir
            .path()
            .join("workspace/marigold-database/1-Initial/0-scrub.sql"),
        "DROP TABLE IF EXISTS t;\nDROP TABLE IF EXISTS DB_BUILD_SCRIPTS;\nDROP SEQUENCE IF EXISTS DB_BUILD_SCRIPT_SEQ;",
    );
    write(
        &dir
            .path()
            .join("workspace/marigold-data/1_5-Reference/0-scrub.sql"),
        "DROP TABLE IF EXISTS ref;\nDROP TABLE IF EXISTS DB_BUILD_SCRIPTS;\nDROP SEQUENCE IF EXISTS DB_BUILD_SCRIPT_SEQ;",
    );
    let orchestrator = Orchestrator::new(&config, ProfileKind::Test, &DuckDbProvider, &AutoApprove);
    orchestrator.run(RunMode::Apply).await.unwrap();

    let reports = orchestrator.run(RunMode::Apply).await.unwrap();
    assert_eq!(reports[0].state, LedgerState::Fresh);
    assert_eq!(reports[0].outcome, SchemaOutcome::Applied);
    assert!(reports[0].execution.scrubbed);
    assert_eq!(reports[0].applied[0].ledger_id(), Some(1));

    let db = DuckDbBackend::from_path(&dir.path().join("creds/marigold-test.duckdb")).unwrap();
    let entries = Ledger::new(&db).entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "-Initial");
}

#[tokio::test]
async fn test_abandoned_branch_is_drift() {
    let (dir, config) = setup();
    let branch = dir
        .path()
        .join("workspace/marigold-database/2-Feature_Branch/1-x.sql");
    write(&branch, "CREATE TABLE feature(id INT);--<");

    let orchestrator = Orchestrator::new(&config, ProfileKind::Test, &DuckDbProvider, &AutoApprove);
    orchestrator.run(RunMode::Apply).await.unwrap();

    fs::remove_dir_all(branch.parent().unwrap()).unwrap();
    let reports = orchestrator.run(RunMode::Apply).await.unwrap();

    assert_eq!(reports[0].outcome, SchemaOutcome::Drifted);
    match &reports[0].state {
        LedgerState::Drifted { latest } => assert_eq!(latest.name(), "-Feature_Branch"),
        other => panic!("expected drift, got {other}"),
    }
}
