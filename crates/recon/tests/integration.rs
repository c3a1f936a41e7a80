use stocktake_recon::config::{DuplicatePolicy, OnHandAmbiguity, ReconConfig};
use stocktake_recon::engine::run;
use stocktake_recon::model::{Cell, ExceptionContent, ExceptionReason, ReconInput, ReconReport, Table, TableSet};
use stocktake_recon::report::{exception_record, missing_records};

const TAG_A: &str = "304DB75F19600014000000AA";
const TAG_B: &str = "304DB75F19600014000000BB";
const TAG_C: &str = "304DB75F19600014000000CC";
const TAG_D: &str = "304DB75F19600014000000DD";

fn row(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
        .collect()
}

fn table(name: &str, rows: &[&[&str]]) -> Table {
    Table::from_rows(name, rows.iter().map(|r| row(r)).collect())
}

fn config() -> ReconConfig {
    ReconConfig::with_inputs("registry.csv", "list.txt", "on_hand.xlsx")
}

fn three_book_input() -> ReconInput {
    ReconInput {
        scanned: vec![TAG_A.into()],
        registry: table(
            "registry",
            &[
                &["1", "Anna Karenina", TAG_A],
                &["2", "Dead Souls", TAG_B],
                &["3", "Oblomov", TAG_C],
            ],
        ),
        on_hand: vec![table("Sheet1", &[&["Reader 1", TAG_B], &["ZZZ-not-an-id"]])].into(),
    }
}

// -------------------------------------------------------------------------
// End to end
// -------------------------------------------------------------------------

#[test]
fn three_books_one_missing() {
    let report = run(&config(), &three_book_input()).unwrap();

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].tag.as_str(), TAG_C);
    assert_eq!(report.missing[0].description, "3 | Oblomov");

    assert!(report.registry_exceptions.is_empty());
    assert_eq!(report.on_hand_exceptions.len(), 1);
    let e = &report.on_hand_exceptions[0];
    assert_eq!(e.table.as_deref(), Some("Sheet1"));
    assert_eq!(e.row, 2);
    assert_eq!(e.reason, ExceptionReason::Empty);
    assert_eq!(
        e.content,
        ExceptionContent::Joined {
            text: "ZZZ-not-an-id".into(),
            column_count: 1
        }
    );

    let s = &report.summary;
    assert_eq!(s.registry_rows, 3);
    assert_eq!(s.registry_valid, 3);
    assert_eq!(s.scanned, 1);
    assert_eq!(s.on_hand_total, 1);
    assert_eq!(s.on_hand_real, 1);
    assert_eq!(s.missing, 1);
}

#[test]
fn rerun_is_identical() {
    let input = three_book_input();
    let first = run(&config(), &input).unwrap();
    let second = run(&config(), &input).unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.missing, second.missing);
    assert_eq!(first.registry_exceptions, second.registry_exceptions);
    assert_eq!(first.on_hand_exceptions, second.on_hand_exceptions);
}

#[test]
fn noisy_registry_and_scans() {
    let input = ReconInput {
        scanned: vec![
            String::new(),
            format!(" {} ", TAG_A.to_ascii_lowercase()),
            "READER ERROR".into(),
            TAG_A.into(),
        ],
        registry: table(
            "registry",
            &[
                &["Inventory no.", "Title", "Tag"],
                &["", "", ""],
                &["1", "Anna Karenina", TAG_A],
                &["2", "Two tags", TAG_B, TAG_C],
                &["3", "Oblomov", TAG_D],
            ],
        ),
        on_hand: TableSet::new(),
    };
    let report = run(&config(), &input).unwrap();

    assert_eq!(report.summary.registry_rows, 5);
    assert_eq!(report.summary.registry_valid, 2);
    assert_eq!(report.summary.scanned, 1);
    assert_eq!(report.summary.missing, 1);
    assert_eq!(report.missing[0].tag.as_str(), TAG_D);

    // Ambiguous rows first, then empty (header) rows
    let rows: Vec<(usize, ExceptionReason)> = report
        .registry_exceptions
        .iter()
        .map(|e| (e.row, e.reason))
        .collect();
    assert_eq!(rows, vec![(4, ExceptionReason::Ambiguous), (1, ExceptionReason::Empty)]);
    assert_eq!(
        exception_record(&report.registry_exceptions[1]),
        vec!["Row", "1", "empty", "Inventory no.", "Title", "Tag"]
    );
}

#[test]
fn duplicate_policy_reject_surfaces_rows() {
    let mut cfg = config();
    cfg.registry.on_duplicate = DuplicatePolicy::Reject;
    let input = ReconInput {
        scanned: Vec::new(),
        registry: table("registry", &[&["first copy", TAG_A], &["second copy", TAG_A]]),
        on_hand: TableSet::new(),
    };
    let report = run(&cfg, &input).unwrap();
    assert_eq!(report.missing[0].description, "first copy");
    assert_eq!(report.registry_exceptions.len(), 1);
    assert_eq!(report.registry_exceptions[0].reason, ExceptionReason::Duplicate);
    assert_eq!(report.registry_exceptions[0].row, 2);
}

#[test]
fn duplicate_policy_overwrite_is_last_write_wins() {
    let input = ReconInput {
        scanned: Vec::new(),
        registry: table("registry", &[&["first copy", TAG_A], &["second copy", TAG_A]]),
        on_hand: TableSet::new(),
    };
    let report = run(&config(), &input).unwrap();
    assert_eq!(report.summary.registry_valid, 1);
    assert_eq!(report.missing[0].description, "second copy");
    assert!(report.registry_exceptions.is_empty());
}

#[test]
fn ambiguous_on_hand_rows_follow_policy() {
    let input = ReconInput {
        scanned: Vec::new(),
        registry: table("registry", &[&["a", TAG_A], &["b", TAG_B]]),
        on_hand: vec![table("Loans", &[&[TAG_A, TAG_B]])].into(),
    };

    let included = run(&config(), &input).unwrap();
    assert_eq!(included.summary.on_hand_total, 2);
    assert_eq!(included.summary.missing, 0);

    let mut cfg = config();
    cfg.on_hand.ambiguous = OnHandAmbiguity::Exclude;
    let excluded = run(&cfg, &input).unwrap();
    assert_eq!(excluded.summary.on_hand_total, 0);
    assert_eq!(excluded.summary.missing, 2);
    assert_eq!(excluded.on_hand_exceptions.len(), 1);
    assert_eq!(excluded.on_hand_exceptions[0].reason, ExceptionReason::Ambiguous);
}

#[test]
fn on_hand_exceptions_keep_sheet_order() {
    let input = ReconInput {
        scanned: Vec::new(),
        registry: table("registry", &[&["a", TAG_A]]),
        on_hand: vec![
            table("March", &[&["late return"], &["", ""], &["lost card"]]),
            table("April", &[&["note"]]),
        ]
        .into(),
    };
    let report = run(&config(), &input).unwrap();
    let seen: Vec<(String, usize)> = report
        .on_hand_exceptions
        .iter()
        .map(|e| (e.table.clone().unwrap_or_default(), e.row))
        .collect();
    assert_eq!(
        seen,
        vec![("March".to_string(), 1), ("March".to_string(), 3), ("April".to_string(), 1)]
    );
}

#[test]
fn custom_grammar_from_toml() {
    let cfg = ReconConfig::from_toml(
        r#"
name = "Short tags"

[grammar]
prefix = "e280"
suffix_len = 4

[registry]
file = "r.csv"

[scanned]
file = "s.txt"

[on_hand]
file = "o.xlsx"
"#,
    )
    .unwrap();
    let input = ReconInput {
        scanned: vec!["E2800001".into()],
        registry: table("registry", &[&["one", "e2800001"], &["two", "E2800002"], &["three", TAG_A]]),
        on_hand: TableSet::new(),
    };
    let report = run(&cfg, &input).unwrap();
    assert_eq!(report.summary.registry_valid, 2);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].tag.as_str(), "E2800002");
    assert_eq!(report.registry_exceptions.len(), 1);
}

#[test]
fn report_serializes_to_json() {
    let report: ReconReport = run(&config(), &three_book_input()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["missing"], 1);
    assert_eq!(json["missing"][0]["tag"], TAG_C);
    assert_eq!(json["on_hand_exceptions"][0]["reason"], "empty");
    assert_eq!(json["on_hand_exceptions"][0]["table"], "Sheet1");
    assert_eq!(json["on_hand_exceptions"][0]["content"]["joined"]["column_count"], 1);
    assert!(json["meta"]["engine_version"].is_string());

    let records = missing_records(&report.missing);
    assert_eq!(records.len(), 2);
}
