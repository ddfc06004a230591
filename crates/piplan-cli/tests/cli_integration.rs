use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn piplan() -> Command {
    Command::cargo_bin("piplan").unwrap()
}

fn parse_json_output(output: &str) -> Value {
    serde_json::from_str(output).expect("Failed to parse JSON output")
}

fn extract_id(json: &Value) -> String {
    json["data"]["id"].as_str().unwrap().to_string()
}

fn run(file: &std::path::Path, args: &[&str]) -> Value {
    let output = piplan()
        .args(["--file", file.to_str().unwrap()])
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_json_output(&String::from_utf8_lossy(&output))
}

fn run_err(file: &std::path::Path, args: &[&str]) -> Value {
    let output = piplan()
        .args(["--file", file.to_str().unwrap()])
        .args(args)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    parse_json_output(&String::from_utf8_lossy(&output))
}

fn create_board(file: &std::path::Path, name: &str, split: bool) -> String {
    let mut args = vec![
        "board",
        "create",
        "--name",
        name,
        "--num-sprints",
        "3",
        "--start-date",
        "2026-02-10",
    ];
    if split {
        args.push("--dev-test-split");
    }
    let json = run(file, &args);
    assert!(json["success"].as_bool().unwrap());
    extract_id(&json)
}

const FEATURE_PAYLOAD: &str = r#"{
    "external_id": "1042",
    "title": "Checkout",
    "priority": 1,
    "value_area": "Business",
    "stories": [
        {"external_id": "2001", "title": "Login", "story_points": 5.0,
         "dev_story_points": 3.0, "test_story_points": 2.0}
    ]
}"#;

mod board_tests {
    use super::*;

    #[test]
    fn test_board_create_generates_schedule() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");

        let id = create_board(&file, "PI-12", false);
        let json = run(&file, &["board", "get", "--id", &id]);

        assert_eq!(json["data"]["name"], "PI-12");
        let sprints = json["data"]["sprints"].as_array().unwrap();
        assert_eq!(sprints.len(), 4);
        assert_eq!(sprints[0]["number"], 0);
        assert_eq!(sprints[0]["working_days"], 0);
        assert_eq!(sprints[1]["working_days"], 10);
    }

    #[test]
    fn test_board_get_unknown_is_not_found() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        create_board(&file, "PI-12", false);

        let json = run_err(
            &file,
            &["board", "get", "--id", "00000000-0000-0000-0000-000000000000"],
        );
        assert!(!json["success"].as_bool().unwrap());
        assert_eq!(json["error"]["kind"], "not_found");
    }

    #[test]
    fn test_board_list_filters_by_name() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        create_board(&file, "PI-12 EU", false);
        create_board(&file, "PI-12 US", false);

        let json = run(&file, &["board", "list", "--search", "eu"]);
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["items"][0]["name"], "PI-12 EU");
    }

    #[test]
    fn test_board_validate_reports_warnings() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let id = create_board(&file, "PI-12", false);

        let json = run(&file, &["board", "validate", "--id", &id]);
        assert!(json["data"]["can_finalize"].as_bool().unwrap());
        let warnings = json["data"]["warnings"].as_array().unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.as_str().unwrap().contains("No team members")));
    }

    #[test]
    fn test_finalize_then_restore() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let id = create_board(&file, "PI-12", false);

        let json = run(&file, &["board", "finalize", "--id", &id]);
        assert_eq!(json["data"]["message"], "Board finalized successfully");
        assert!(json["data"]["board"]["is_finalized"].as_bool().unwrap());
        assert!(json["data"]["finalized_at"].is_string());

        // Second finalize is blocked with the reason in the warnings
        let json = run_err(&file, &["board", "finalize", "--id", &id]);
        assert_eq!(json["error"]["kind"], "invalid_operation");
        assert_eq!(json["error"]["warnings"][0], "Board is already finalized");

        let json = run(&file, &["board", "restore", "--id", &id]);
        assert!(!json["data"]["board"]["is_finalized"].as_bool().unwrap());
        // The finalization timestamp survives as an audit trail
        assert!(json["data"]["board"]["finalized_at"].is_string());
    }
}

mod feature_tests {
    use super::*;

    #[test]
    fn test_import_feature_with_stories() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);

        let json = run(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        assert_eq!(json["data"]["title"], "Checkout");
        let stories = json["data"]["user_stories"].as_array().unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0]["is_moved"], false);
        // Fresh imports land in the parking lot
        assert_eq!(stories[0]["sprint_id"], stories[0]["original_sprint_id"]);
    }

    #[test]
    fn test_import_blocked_on_finalized_board() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);
        run(&file, &["board", "finalize", "--id", &board_id]);

        let json = run_err(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        assert_eq!(json["error"]["kind"], "invalid_operation");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("finalized"));
    }

    #[test]
    fn test_reorder_features() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);
        let json = run(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        let feature_id = extract_id(&json);

        let json = run(
            &file,
            &[
                "feature",
                "reorder",
                "--board-id",
                &board_id,
                "--set",
                &format!("{}=7", feature_id),
            ],
        );
        assert_eq!(json["data"]["reordered"], 1);

        let json = run(&file, &["board", "get", "--id", &board_id]);
        assert_eq!(json["data"]["features"][0]["priority"], 7);
    }

    #[test]
    fn test_delete_feature_removes_stories() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);
        let json = run(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        let feature_id = extract_id(&json);

        run(
            &file,
            &["feature", "delete", "--board-id", &board_id, "--id", &feature_id],
        );

        let json = run(&file, &["board", "get", "--id", &board_id]);
        assert!(json["data"]["features"].as_array().unwrap().is_empty());
    }
}

mod story_tests {
    use super::*;

    #[test]
    fn test_move_story_marks_it_moved() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);
        let import = run(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        let story_id = import["data"]["user_stories"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let board = run(&file, &["board", "get", "--id", &board_id]);
        let sprint_id = board["data"]["sprints"][2]["id"].as_str().unwrap().to_string();

        run(
            &file,
            &[
                "story", "move", "--board-id", &board_id, "--id", &story_id,
                "--sprint-id", &sprint_id,
            ],
        );

        let board = run(&file, &["board", "get", "--id", &board_id]);
        let story = &board["data"]["features"][0]["user_stories"][0];
        assert_eq!(story["sprint_id"], sprint_id.as_str());
        assert_eq!(story["is_moved"], true);
    }

    #[test]
    fn test_move_story_allowed_after_finalize() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", false);
        let import = run(
            &file,
            &["feature", "import", "--board-id", &board_id, "--json", FEATURE_PAYLOAD],
        );
        let story_id = import["data"]["user_stories"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let board = run(&file, &["board", "get", "--id", &board_id]);
        let sprint_id = board["data"]["sprints"][1]["id"].as_str().unwrap().to_string();

        run(&file, &["board", "finalize", "--id", &board_id]);

        // Replanning stays open on a finalized board
        let json = run(
            &file,
            &[
                "story", "move", "--board-id", &board_id, "--id", &story_id,
                "--sprint-id", &sprint_id,
            ],
        );
        assert!(json["success"].as_bool().unwrap());
    }
}

mod team_tests {
    use super::*;

    const TEAM_PAYLOAD: &str =
        r#"[{"name": "Alice", "is_dev": true, "is_test": false}]"#;

    fn upsert_team(file: &std::path::Path, board_id: &str) -> Value {
        run(
            file,
            &["team", "upsert", "--board-id", board_id, "--json", TEAM_PAYLOAD],
        )
    }

    #[test]
    fn test_upsert_creates_member_with_default_capacities() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", true);

        let json = upsert_team(&file, &board_id);
        assert_eq!(json["data"]["count"], 1);
        let capacities = json["data"]["items"][0]["sprint_capacities"]
            .as_array()
            .unwrap();
        assert_eq!(capacities.len(), 4);
        // Dev member on a split board gets full dev days, no test days
        assert!(capacities
            .iter()
            .any(|c| c["capacity_dev"] == 10 && c["capacity_test"] == 0));
    }

    #[test]
    fn test_capacity_update_rejects_out_of_bounds() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", true);
        let team = upsert_team(&file, &board_id);
        let member_id = team["data"]["items"][0]["id"].as_str().unwrap().to_string();
        let board = run(&file, &["board", "get", "--id", &board_id]);
        let sprint_id = board["data"]["sprints"][1]["id"].as_str().unwrap().to_string();

        let json = run_err(
            &file,
            &[
                "team", "capacity", "--board-id", &board_id, "--sprint-id", &sprint_id,
                "--member-id", &member_id, "--dev", "15",
            ],
        );
        assert_eq!(json["error"]["kind"], "invalid_argument");
        assert!(json["error"]["message"].as_str().unwrap().contains("10"));

        let json = run(
            &file,
            &[
                "team", "capacity", "--board-id", &board_id, "--sprint-id", &sprint_id,
                "--member-id", &member_id, "--dev", "7",
            ],
        );
        assert_eq!(json["data"]["capacity_dev"], 7);
    }

    #[test]
    fn test_capacity_update_allowed_after_finalize() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", true);
        let team = upsert_team(&file, &board_id);
        let member_id = team["data"]["items"][0]["id"].as_str().unwrap().to_string();
        let board = run(&file, &["board", "get", "--id", &board_id]);
        let sprint_id = board["data"]["sprints"][1]["id"].as_str().unwrap().to_string();

        run(&file, &["board", "finalize", "--id", &board_id]);

        let json = run(
            &file,
            &[
                "team", "capacity", "--board-id", &board_id, "--sprint-id", &sprint_id,
                "--member-id", &member_id, "--dev", "5",
            ],
        );
        assert_eq!(json["data"]["capacity_dev"], 5);
    }

    #[test]
    fn test_team_upsert_blocked_on_finalized_board() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", true);
        run(&file, &["board", "finalize", "--id", &board_id]);

        let json = run_err(
            &file,
            &["team", "upsert", "--board-id", &board_id, "--json", TEAM_PAYLOAD],
        );
        assert_eq!(json["error"]["kind"], "invalid_operation");
    }

    #[test]
    fn test_team_delete_member() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plan.json");
        let board_id = create_board(&file, "PI-12", true);
        let team = upsert_team(&file, &board_id);
        let member_id = team["data"]["items"][0]["id"].as_str().unwrap().to_string();

        run(
            &file,
            &["team", "delete", "--board-id", &board_id, "--id", &member_id],
        );

        let json = run(&file, &["team", "list", "--board-id", &board_id]);
        assert_eq!(json["data"]["count"], 0);
    }
}

#[test]
fn test_bare_invocation_seeds_plan_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plan.json");

    piplan()
        .args(["--file", file.to_str().unwrap()])
        .assert()
        .success();
    assert!(file.exists());

    // The seeded file is immediately usable
    let json = run(&file, &["board", "list"]);
    assert_eq!(json["data"]["count"], 0);
}

#[test]
fn test_missing_file_argument_fails() {
    piplan()
        .args(["board", "list"])
        .env_remove("PIPLAN_FILE")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file is required"));
}
