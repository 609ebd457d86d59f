//! Integration tests for the simulation run lifecycle.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use pretexta_content::store::ContentStore;

use common::{
    app, delete_json, get_json, issue_token, post_json, put_json, sample_quiz, sample_scenario,
    test_state,
};

fn steps_body() -> serde_json::Value {
    json!([
        {
            "node_id": "q1",
            "action": "Wire the money",
            "score_impact": -20,
            "next_node": "q2"
        },
        {
            "node_id": "q2",
            "action": "Send the confirmation code",
            "score_impact": -40,
            "next_node": "fail"
        }
    ])
}

#[tokio::test]
async fn test_scenario_run_lifecycle() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({
        "simulation_type": "challenge",
        "challenge_id": Uuid::new_v4(),
        "title": "CEO wire transfer"
    });

    // Act — start the run.
    let (status, run) = post_json(app(&state), "/api/simulations", &token, &create).await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(run["status"], "running");
    assert_eq!(run["score"], 100);
    let run_id = run["run_id"].as_str().unwrap().to_owned();

    // Act — append both choices and complete.
    let update = json!({
        "steps": steps_body(),
        "completed": true,
        "score": 40,
        "result": "failure"
    });
    let (put_status, updated) = put_json(
        app(&state),
        &format!("/api/simulations/{run_id}"),
        &token,
        &update,
    )
    .await;

    // Assert — the worked example: 100 → 80 → 40, failure.
    assert_eq!(put_status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["score"], 40);
    assert_eq!(updated["result"], "failure");
    assert_eq!(updated["steps"].as_array().unwrap().len(), 2);
    assert_eq!(updated["steps"][1]["next_node"], "fail");
}

#[tokio::test]
async fn test_put_skips_already_recorded_steps() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({ "simulation_type": "challenge", "challenge_id": Uuid::new_v4() });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();
    let uri = format!("/api/simulations/{run_id}");
    let update = json!({ "steps": steps_body() });

    // Act — the client retries with the same full step list.
    let (_, first) = put_json(app(&state), &uri, &token, &update).await;
    let (status, second) = put_json(app(&state), &uri, &token, &update).await;

    // Assert — no duplicate events were appended.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["steps"].as_array().unwrap().len(), 2);
    assert_eq!(second["steps"].as_array().unwrap().len(), 2);
    assert_eq!(second["version"], first["version"]);
}

#[tokio::test]
async fn test_adaptive_injections_are_recorded_once() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({ "simulation_type": "challenge", "challenge_id": Uuid::new_v4() });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();
    let uri = format!("/api/simulations/{run_id}");
    let update = json!({
        "adaptive": [{
            "node_id": "ai_1768471200000",
            "replaced_node": "m2",
            "message": "Final warning, pay now.",
            "tactics_used": ["urgency"]
        }]
    });

    // Act
    let (_, first) = put_json(app(&state), &uri, &token, &update).await;
    let (_, second) = put_json(app(&state), &uri, &token, &update).await;

    // Assert
    assert_eq!(first["adaptive_injections"].as_array().unwrap().len(), 1);
    assert_eq!(second["adaptive_injections"].as_array().unwrap().len(), 1);
    assert_eq!(
        first["adaptive_injections"][0]["node_id"],
        "ai_1768471200000"
    );
}

#[tokio::test]
async fn test_steps_matching_the_stored_scenario_are_accepted() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let challenge_id = Uuid::new_v4();
    state.content.insert_scenario(sample_scenario(challenge_id)).await;
    let create = json!({ "simulation_type": "challenge", "challenge_id": challenge_id });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();

    // Act — the step replays exactly as authored: q1, risky option, -40.
    let update = json!({
        "steps": [{
            "node_id": "q1",
            "action": "Wire the money",
            "score_impact": -40,
            "next_node": "fail"
        }],
        "completed": true,
        "score": 60,
        "result": "failure"
    });
    let (status, updated) = put_json(
        app(&state),
        &format!("/api/simulations/{run_id}"),
        &token,
        &update,
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["steps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_steps_contradicting_the_stored_scenario_are_rejected() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let challenge_id = Uuid::new_v4();
    state.content.insert_scenario(sample_scenario(challenge_id)).await;
    let create = json!({ "simulation_type": "challenge", "challenge_id": challenge_id });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();

    // Act — the risky option carries -40 in the scenario, not -5.
    let update = json!({
        "steps": [{
            "node_id": "q1",
            "action": "Wire the money",
            "score_impact": -5,
            "next_node": "fail"
        }]
    });
    let (status, body) = put_json(
        app(&state),
        &format!("/api/simulations/{run_id}"),
        &token,
        &update,
    )
    .await;

    // Assert — nothing was recorded.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let (_, fetched) = get_json(app(&state), &format!("/api/simulations/{run_id}"), &token).await;
    assert!(fetched["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_completed_quiz_submission_is_graded_server_side() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let quiz_id = Uuid::new_v4();
    state.content.insert_quiz(sample_quiz(quiz_id)).await;

    // Two correct answers, one timer skip; the client-reported score lies.
    let create = json!({
        "simulation_type": "quiz",
        "quiz_id": quiz_id,
        "title": "Vishing basics",
        "completed": true,
        "score": 5,
        "answers": [
            { "question_id": "q1", "answer_index": 1 },
            { "question_id": "q2", "answer_index": 1 },
            { "question_id": "q3" }
        ]
    });

    // Act
    let (status, run) = post_json(app(&state), "/api/simulations", &token, &create).await;

    // Assert — round(2 / 3 * 100) = 67, not the submitted 5.
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(run["status"], "completed");
    assert_eq!(run["score"], 67);
    assert_eq!(run["answers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_completed_submission_without_score_is_rejected() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({
        "simulation_type": "challenge",
        "challenge_id": Uuid::new_v4(),
        "completed": true,
        "steps": steps_body()
    });

    // Act
    let (status, body) = post_json(app(&state), "/api/simulations", &token, &create).await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_deleted_run_leaves_the_listing_but_stays_addressable() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({ "simulation_type": "challenge", "challenge_id": Uuid::new_v4() });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();

    // Act
    let (delete_status, _) =
        delete_json(app(&state), &format!("/api/simulations/{run_id}"), &token).await;
    let (_, listed) = get_json(app(&state), "/api/simulations", &token).await;
    let (get_status, fetched) =
        get_json(app(&state), &format!("/api/simulations/{run_id}"), &token).await;

    // Assert
    assert_eq!(delete_status, StatusCode::NO_CONTENT);
    assert!(listed.as_array().unwrap().is_empty());
    assert_eq!(get_status, StatusCode::OK);
    assert_eq!(fetched["status"], "deleted");
}

#[tokio::test]
async fn test_unknown_run_returns_404() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);

    // Act
    let (status, body) = get_json(
        app(&state),
        &format!("/api/simulations/{}", Uuid::new_v4()),
        &token,
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "aggregate_not_found");
}

#[tokio::test]
async fn test_report_breaks_down_risky_choices() {
    // Arrange
    let state = test_state(Vec::new());
    let token = issue_token(&state);
    let create = json!({
        "simulation_type": "challenge",
        "challenge_id": Uuid::new_v4(),
        "title": "CEO wire transfer",
        "participant_name": "Dewi",
        "completed": true,
        "score": 40,
        "result": "failure",
        "steps": steps_body()
    });
    let (_, run) = post_json(app(&state), "/api/simulations", &token, &create).await;
    let run_id = run["run_id"].as_str().unwrap().to_owned();

    // Act
    let (status, report) = get_json(
        app(&state),
        &format!("/api/reports/{run_id}/json"),
        &token,
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["score"], 40);
    assert_eq!(report["participant_name"], "Dewi");
    // started + 2 choices + completed.
    assert_eq!(report["breakdown"]["total_events"], 4);
    assert_eq!(report["breakdown"]["risky_choices"], 2);
    assert_eq!(report["breakdown"]["safe_choices"], 0);
    assert_eq!(report["breakdown"]["compliance_rate"], 1.0);
}
