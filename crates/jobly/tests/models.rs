//! Data-access tests against a live database.
//!
//! Each test opens its own session and works on TEMP tables that shadow any
//! real ones, so runs are isolated and leave nothing behind. Skipped when
//! neither `TEST_DATABASE_URL` nor `DATABASE_URL` is set.

use jobly::models::{Company, Job, NewCompany, NewJob, User};
use jobly::{Config, FieldMap, GenericClient, JoblyError, TimeoutClient};
use rust_decimal::Decimal;
use tokio_postgres::Client;

const SCHEMA: &str = "
    CREATE TEMP TABLE companies (
        handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
        name TEXT UNIQUE NOT NULL,
        num_employees INTEGER CHECK (num_employees >= 0),
        description TEXT NOT NULL,
        logo_url TEXT
    );
    CREATE TEMP TABLE jobs (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        salary INTEGER CHECK (salary >= 0),
        equity NUMERIC CHECK (equity <= 1.0),
        company_handle VARCHAR(25) NOT NULL REFERENCES companies ON DELETE CASCADE
    );
    CREATE TEMP TABLE users (
        username VARCHAR(25) PRIMARY KEY,
        password TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL CHECK (position('@' IN email) > 1),
        is_admin BOOLEAN NOT NULL DEFAULT FALSE
    );

    INSERT INTO companies (handle, name, num_employees, description, logo_url)
    VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
           ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
           ('c3', 'C3', 3, 'Desc3', 'http://c3.img');
    INSERT INTO users (username, password, first_name, last_name, email)
    VALUES ('test', 'x', 'Test', 'Tester', 'test@test.com'),
           ('test2', 'x', 'Test2', 'Tester2', 'test2@test.com');
    INSERT INTO jobs (title, salary, equity, company_handle)
    VALUES ('engineer', 1000, .2, 'c1'),
           ('recruiter', 12000, null, 'c1'),
           ('cfo', 10000, .1, 'c2');
";

async fn try_connect() -> Option<TimeoutClient<Client>> {
    let Ok(config) = Config::test() else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    let conn = config
        .connect()
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    conn.inner()
        .batch_execute(SCHEMA)
        .await
        .expect("Failed to create fixture tables");
    Some(conn)
}

fn handles(companies: &[jobly::models::CompanySummary]) -> Vec<&str> {
    companies.iter().map(|c| c.handle.as_str()).collect()
}

fn titles(jobs: &[jobly::models::JobSummary]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

async fn job_id(conn: &impl GenericClient, title: &str) -> i32 {
    let row = conn
        .query_opt("SELECT id FROM jobs WHERE title = $1", &[&title])
        .await
        .unwrap()
        .unwrap();
    row.get("id")
}

// ==================== Companies ====================

#[tokio::test]
async fn company_find_all_applies_filters() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let all = Company::find_all(&conn, &FieldMap::new()).await.unwrap();
    assert_eq!(handles(&all), ["c1", "c2", "c3"]);

    let min = FieldMap::new().with("minEmployees", 3);
    assert_eq!(handles(&Company::find_all(&conn, &min).await.unwrap()), ["c3"]);

    let max = FieldMap::new().with("maxEmployees", 2);
    assert_eq!(
        handles(&Company::find_all(&conn, &max).await.unwrap()),
        ["c1", "c2"]
    );

    let none = FieldMap::new().with("minEmployees", 10);
    assert!(Company::find_all(&conn, &none).await.unwrap().is_empty());

    // case-insensitive substring
    let name = FieldMap::new().with("name", "c2").with("_token", "ignored");
    assert_eq!(handles(&Company::find_all(&conn, &name).await.unwrap()), ["c2"]);
}

#[tokio::test]
async fn company_find_all_rejects_inverted_range() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let filters = FieldMap::new().with("minEmployees", 3).with("maxEmployees", 2);
    let err = Company::find_all(&conn, &filters).await.unwrap_err();
    assert!(matches!(err, JoblyError::Range(_)));
}

#[tokio::test]
async fn numeric_strings_bind_to_numeric_columns() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let filters = FieldMap::new()
        .with("minEmployees", "2")
        .with("maxEmployees", "3");
    assert_eq!(
        handles(&Company::find_all(&conn, &filters).await.unwrap()),
        ["c2", "c3"]
    );

    let updated = Company::update(&conn, "c1", &FieldMap::new().with("num_employees", "40"))
        .await
        .unwrap();
    assert_eq!(updated.num_employees, Some(40));

    let salary = FieldMap::new().with("minSalary", "10000");
    assert_eq!(
        titles(&Job::find_all(&conn, &salary).await.unwrap()),
        ["cfo", "recruiter"]
    );

    let id = job_id(&conn, "engineer").await;
    let job = Job::update(&conn, id, &FieldMap::new().with("equity", "0.35"))
        .await
        .unwrap();
    assert_eq!(job.equity, Some(Decimal::new(35, 2)));
}

#[tokio::test]
async fn company_get_includes_jobs_by_title() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let detail = Company::get(&conn, "c1").await.unwrap();
    assert_eq!(detail.company.name, "C1");
    assert_eq!(detail.company.num_employees, Some(1));
    assert_eq!(detail.company.logo_url.as_deref(), Some("http://c1.img"));
    let jobs: Vec<_> = detail.jobs.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(jobs, ["engineer", "recruiter"]);
    assert_eq!(detail.jobs[0].equity, Some(Decimal::new(2, 1)));
    assert_eq!(detail.jobs[1].equity, None);

    let err = Company::get(&conn, "nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: No company: nope");
}

#[tokio::test]
async fn company_create_and_duplicate() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let new = NewCompany {
        handle: "new".into(),
        name: "New".into(),
        num_employees: Some(1),
        description: "New Description".into(),
        logo_url: Some("http://new.img".into()),
    };
    let created = Company::create(&conn, &new).await.unwrap();
    assert_eq!(created.handle, "new");
    assert_eq!(created.description, "New Description");

    let err = Company::create(&conn, &new).await.unwrap_err();
    assert!(matches!(err, JoblyError::Duplicate(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn company_update_partial_and_errors() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let data = FieldMap::new()
        .with("name", "New")
        .with("num_employees", 10)
        .with("logo_url", None::<String>);
    let updated = Company::update(&conn, "c1", &data).await.unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url, None);
    assert_eq!(updated.description, "Desc1");

    let err = Company::update(&conn, "nope", &FieldMap::new().with("name", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = Company::update(&conn, "c1", &FieldMap::new()).await.unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(ref m) if m == "No data"));

    let err = Company::update(&conn, "c1", &FieldMap::new().with("handle", "c9"))
        .await
        .unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(_)));
}

#[tokio::test]
async fn company_remove_cascades_to_jobs() {
    let Some(conn) = try_connect().await else {
        return;
    };

    Company::remove(&conn, "c1").await.unwrap();
    assert!(Company::get(&conn, "c1").await.unwrap_err().is_not_found());
    let left = Job::find_all(&conn, &FieldMap::new()).await.unwrap();
    assert_eq!(titles(&left), ["cfo"]);

    assert!(Company::remove(&conn, "c1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_inside_transaction_rolls_back() {
    let Some(conn) = try_connect().await else {
        return;
    };
    let mut client = conn.into_inner();

    let tx = client.transaction().await.unwrap();
    let data = FieldMap::new().with("description", "Changed");
    Company::update(&tx, "c2", &data).await.unwrap();
    tx.rollback().await.unwrap();

    let detail = Company::get(&client, "c2").await.unwrap();
    assert_eq!(detail.company.description, "Desc2");
}

// ==================== Jobs ====================

#[tokio::test]
async fn job_find_all_applies_filters() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let all = Job::find_all(&conn, &FieldMap::new()).await.unwrap();
    assert_eq!(titles(&all), ["cfo", "engineer", "recruiter"]);

    let equity = FieldMap::new().with("hasEquity", true);
    assert_eq!(
        titles(&Job::find_all(&conn, &equity).await.unwrap()),
        ["cfo", "engineer"]
    );

    // false means no constraint
    let no_equity = FieldMap::new().with("hasEquity", false);
    assert_eq!(Job::find_all(&conn, &no_equity).await.unwrap().len(), 3);

    let combined = FieldMap::new()
        .with("title", "E")
        .with("minSalary", 5000)
        .with("hasEquity", true);
    assert!(Job::find_all(&conn, &combined).await.unwrap().is_empty());

    let salary = FieldMap::new().with("minSalary", 10000);
    assert_eq!(
        titles(&Job::find_all(&conn, &salary).await.unwrap()),
        ["cfo", "recruiter"]
    );
}

#[tokio::test]
async fn job_create_get_update_remove() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let new = NewJob {
        title: "new".into(),
        salary: Some(100),
        equity: Some(Decimal::new(5, 2)),
        company_handle: "c3".into(),
    };
    let created = Job::create(&conn, &new).await.unwrap();
    assert_eq!(created.title, "new");
    assert_eq!(created.company_handle, "c3");

    let fetched = Job::get(&conn, created.id).await.unwrap();
    assert_eq!(fetched, created);

    let data = FieldMap::new().with("salary", 200).with("equity", 0.5);
    let updated = Job::update(&conn, created.id, &data).await.unwrap();
    assert_eq!(updated.salary, Some(200));
    assert_eq!(updated.equity, Some(Decimal::new(5, 1)));
    assert_eq!(updated.title, "new");

    let removed = Job::remove(&conn, created.id).await.unwrap();
    assert_eq!(removed.company_handle, "c3");
    assert!(Job::get(&conn, created.id).await.unwrap_err().is_not_found());
    assert!(Job::remove(&conn, created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn job_errors_map_to_client_errors() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let orphan = NewJob {
        title: "orphan".into(),
        salary: None,
        equity: None,
        company_handle: "nope".into(),
    };
    let err = Job::create(&conn, &orphan).await.unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(_)));

    let id = job_id(&conn, "engineer").await;
    let err = Job::update(&conn, id, &FieldMap::new().with("company_handle", "c2"))
        .await
        .unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(_)));

    let err = Job::update(&conn, 0, &FieldMap::new().with("title", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ==================== Users ====================

#[tokio::test]
async fn user_find_get_update_remove() {
    let Some(conn) = try_connect().await else {
        return;
    };

    let all = User::find_all(&conn).await.unwrap();
    let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["test", "test2"]);

    let user = User::get(&conn, "test").await.unwrap();
    assert_eq!(user.email, "test@test.com");
    assert!(!user.is_admin);

    let data = FieldMap::new().with("first_name", "New").with("is_admin", true);
    let updated = User::update(&conn, "test", &data).await.unwrap();
    assert_eq!(updated.first_name, "New");
    assert!(updated.is_admin);

    let err = User::update(&conn, "test", &FieldMap::new().with("password", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, JoblyError::InvalidInput(_)));

    assert_eq!(User::remove(&conn, "test2").await.unwrap(), "test2");
    assert!(User::get(&conn, "test2").await.unwrap_err().is_not_found());
}
