//! CSV exports read back with a standard CSV reader.
use ecoclub_console::domain::directory_query::{
    DirectoryQuery, EXPORT_HEADER, MISSING_PLACEHOLDER, SortKey, SortState, export_csv, query,
};
use ecoclub_console::domain::{Badge, Role, UserId, UserRecord};
use rstest::{fixture, rstest};

fn member(uid: &str, name: &str, email: &str) -> UserRecord {
    UserRecord::new(UserId::new(uid).expect("uid"), name, email)
}

#[fixture]
fn members() -> Vec<UserRecord> {
    vec![
        member("u1", "Chen, Li", "li@club.org")
            .with_mobile("1112223333")
            .with_batch("2022")
            .with_department("Geology")
            .with_badges(vec![Badge::new("Planter", "🌱")]),
        member("u2", "Ade \"Ace\" Bello", "ade@club.org")
            .with_batch("2024")
            .with_role(Role::Admin),
        member("u3", "Mira\nNewline", "mira@club.org").with_role(Role::Secretary),
    ]
}

#[rstest]
fn export_round_trips_through_a_csv_reader(members: Vec<UserRecord>) {
    let view = query(
        &members,
        &DirectoryQuery::new().with_sort(SortState::ascending(SortKey::Email)),
    );
    let csv = export_csv(view.iter().copied()).expect("export");

    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), EXPORT_HEADER);

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(rows.len(), 3);

    let names: Vec<&str> = rows.iter().filter_map(|row| row.get(0)).collect();
    assert_eq!(names, ["Ade \"Ace\" Bello", "Chen, Li", "Mira\nNewline"]);

    let ade = rows.first().expect("first row");
    assert_eq!(ade.get(2), Some(MISSING_PLACEHOLDER));
    assert_eq!(ade.get(4), Some("admin"));
    assert_eq!(ade.get(5), Some(MISSING_PLACEHOLDER));

    let chen = rows.get(1).expect("second row");
    assert_eq!(chen.get(5), Some("Geology"));
    assert_eq!(chen.get(6), Some("1"));

    let mira = rows.get(2).expect("third row");
    assert_eq!(mira.get(3), Some(""));
}
