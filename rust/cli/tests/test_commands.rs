use deckflow_cli::run;
use deckflow_engine::logger::GameRecord;

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run(args, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn help_goes_to_stdout() {
    let (code, out, err) = run_cli(&["deckflow", "--help"]);
    assert_eq!(code, 0);
    assert!(out.contains("sim"));
    assert!(err.is_empty());
}

#[test]
fn unknown_command_lists_commands() {
    let (code, _, err) = run_cli(&["deckflow", "shuffle"]);
    assert_eq!(code, 2);
    assert!(err.contains("Commands:"));
    assert!(err.contains("  verify"));
}

#[test]
fn deal_is_reproducible() {
    let args = ["deckflow", "deal", "--seed", "9", "--players", "3"];
    let (code, first, _) = run_cli(&args);
    assert_eq!(code, 0);
    let (_, second, _) = run_cli(&args);
    assert_eq!(first, second);
    assert!(first.contains("P3: "));
    assert!(!first.contains("P4: "));
    assert!(first.contains("Deck: 18"));
}

#[test]
fn rules_answers_beats() {
    let (code, out, _) = run_cli(&["deckflow", "rules", "--trump", "hearts", "6h", "As"]);
    assert_eq!(code, 0);
    assert_eq!(out, "6h beats As (trump Hearts): yes\n");

    let (code, _, err) = run_cli(&["deckflow", "rules", "--trump", "hearts", "6h", "Zz"]);
    assert_eq!(code, 2);
    assert!(err.starts_with("Error: Invalid input"));
}

#[test]
fn simulated_games_verify() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.jsonl");
    let path_str = path.to_str().unwrap();

    let (code, out, err) = run_cli(&[
        "deckflow", "sim", "--games", "5", "--players", "4", "--seed", "100", "--variant",
        "durak-throw-in", "--output", path_str,
    ]);
    assert_eq!(code, 0, "stderr: {err}");
    assert!(out.starts_with("Simulated: 5 games"));

    let (code, out, err) = run_cli(&["deckflow", "verify", "--input", path_str]);
    assert_eq!(code, 0, "stderr: {err}");
    assert_eq!(out, "Verify: OK (games=5)\n");
}

#[test]
fn tampered_settlement_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.jsonl");
    let path_str = path.to_str().unwrap();
    let (code, _, _) = run_cli(&[
        "deckflow", "sim", "--games", "2", "--seed", "8", "--output", path_str,
    ]);
    assert_eq!(code, 0);

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut record: GameRecord = serde_json::from_str(&lines[1]).unwrap();
    let settlement = record.settlement.as_mut().unwrap();
    settlement.entries[0].delta += 1;
    lines[1] = serde_json::to_string(&record).unwrap();
    std::fs::write(&path, lines.join("\n")).unwrap();

    let (code, out, err) = run_cli(&["deckflow", "verify", "--input", path_str]);
    assert_eq!(code, 2);
    assert_eq!(out, "Verify: FAIL (games=2)\n");
    assert!(err.contains("Line 2: Settlement does not sum to zero (1)"));
}

#[test]
fn garbage_lines_fail_verification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jsonl");
    std::fs::write(&path, "{not json}\n").unwrap();
    let (code, _, err) = run_cli(&["deckflow", "verify", "--input", path.to_str().unwrap()]);
    assert_eq!(code, 2);
    assert!(err.contains("Line 1: Invalid record"));
}

#[test]
fn verify_requires_input() {
    let (code, _, err) = run_cli(&["deckflow", "verify"]);
    assert_eq!(code, 2);
    assert!(err.contains("--input is required"));
}

#[test]
fn oversized_tables_are_rejected() {
    let (code, _, err) = run_cli(&["deckflow", "sim", "--games", "1", "--players", "7"]);
    assert_eq!(code, 2);
    assert!(err.contains("capacity 7"));
}

#[test]
fn cfg_prints_sources() {
    let (code, out, _) = run_cli(&["deckflow", "cfg"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    for key in ["seed", "players", "variant", "bot_strategy", "games"] {
        assert!(json[key].get("source").is_some(), "{key} lacks a source");
    }
}
