//! Integration tests for the HTTP API
//!
//! Every test drives the router in-process against its own in-memory
//! database.

mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use helpers::setup_app;
use serde_json::json;

// =============================================================================
// Health and users
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "trackit-server");
    assert!(body["version"].is_string());
    assert_eq!(body["database"], true);
    assert_eq!(body["relayConnections"], 0);
}

#[tokio::test]
async fn test_user_find_or_create_by_email() {
    let app = setup_app().await;

    let (status, first) = app
        .post("/users", json!({ "email": "t@school.edu", "role": "teacher" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["role"], "TEACHER");
    assert!(first["name"].is_null());

    let (_, second) = app
        .post("/users", json!({ "email": "t@school.edu", "role": "STUDENT", "name": "X" }))
        .await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["role"], "TEACHER", "existing user keeps its role");
}

#[tokio::test]
async fn test_user_requires_email_and_valid_role() {
    let app = setup_app().await;

    let (status, body) = app.post("/users", json!({ "role": "STUDENT" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");

    let (status, _) = app
        .post("/users", json!({ "email": "a@b.c", "role": "janitor" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Classes
// =============================================================================

#[tokio::test]
async fn test_create_class_without_name_is_400() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;

    let (status, body) = app
        .post(
            "/classes",
            json!({
                "teacherId": teacher,
                "startTime": "09:00",
                "endTime": "10:00",
                "daysOfWeek": ["MON"],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = setup_app().await;

    let (status, body) = app.post_raw("/classes", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    // Field of the wrong type
    let (status, _) = app.post("/classes", json!({ "name": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_class_validation() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;

    let base = json!({
        "name": "Algorithms",
        "teacherId": teacher,
        "startTime": "09:00",
        "endTime": "10:00",
        "daysOfWeek": ["MON"],
    });

    let mut bad_time = base.clone();
    bad_time["startTime"] = json!("9am");
    assert_eq!(app.post("/classes", bad_time).await.0, StatusCode::BAD_REQUEST);

    let mut bad_days = base.clone();
    bad_days["daysOfWeek"] = json!("MON");
    assert_eq!(app.post("/classes", bad_days).await.0, StatusCode::BAD_REQUEST);

    let mut unknown_teacher = base.clone();
    unknown_teacher["teacherId"] = json!("nobody");
    assert_eq!(app.post("/classes", unknown_teacher).await.0, StatusCode::NOT_FOUND);

    let (status, class) = app.post("/classes", base).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(class["daysOfWeek"], json!(["MON"]));
    assert_eq!(class["startTime"], "09:00");
}

#[tokio::test]
async fn test_list_classes_with_roster_counts() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let student = app.user("s@x", "STUDENT").await;
    let first = app.class(&teacher, "First").await;
    let second = app.class(&teacher, "Second").await;

    let (status, body) = app
        .post(&format!("/classes/{first}/students"), json!({ "studentId": student }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["enrolled"], true);

    let (status, body) = app
        .post(&format!("/classes/{first}/students"), json!({ "studentId": student }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enrolled"], false);

    let (status, classes) = app.get(&format!("/classes?teacherId={teacher}")).await;
    assert_eq!(status, StatusCode::OK);
    let classes = classes.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    // Newest first
    assert_eq!(classes[0]["id"], json!(second));
    assert_eq!(classes[0]["studentCount"], 0);
    assert_eq!(classes[1]["id"], json!(first));
    assert_eq!(classes[1]["studentCount"], 1);

    let (_, roster) = app.get(&format!("/classes/{first}/students")).await;
    assert_eq!(roster[0]["id"], json!(student));
    assert_eq!(roster[0]["email"], "s@x");
}

#[tokio::test]
async fn test_list_classes_requires_teacher_id() {
    let app = setup_app().await;
    let (status, _) = app.get("/classes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/classes?teacherId=unknown").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_bad_query_string_is_json_400() {
    let app = setup_app().await;

    for uri in [
        "/classes?teacherId=a&teacherId=b",
        "/sessions?classId=a&classId=b",
        "/schedule?userId=u&startDate=2025-01-01&startDate=2025-02-01",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid query string"), "{uri}: {message}");
    }
}

#[tokio::test]
async fn test_enroll_unknown_entities_is_404() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let class = app.class(&teacher, "C").await;

    let (status, _) = app
        .post("/classes/missing/students", json!({ "studentId": teacher }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(&format!("/classes/{class}/students"), json!({ "studentId": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/classes/missing/students").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_sessions_counts() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let a = app.user("a@x", "STUDENT").await;
    let b = app.user("b@x", "STUDENT").await;
    let class = app.class(&teacher, "C").await;
    app.enroll(&class, &a).await;
    app.enroll(&class, &b).await;

    let session = app.session(&class).await;
    app.mark(&session, &a, "PRESENT").await;

    let (status, sessions) = app.get(&format!("/sessions?classId={class}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sessions[0]["id"], json!(session));
    assert_eq!(sessions[0]["presentCount"], 1);
    assert_eq!(sessions[0]["totalCount"], 2);
    assert_eq!(sessions[0]["isActive"], true);
    assert_eq!(sessions[0]["startTime"], "2025-03-03T09:00:00.000Z");
}

#[tokio::test]
async fn test_create_session_validation() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let class = app.class(&teacher, "C").await;

    let (status, _) = app
        .post("/sessions", json!({ "classId": class, "startTime": "2025-03-03T09:00:00Z" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/sessions",
            json!({ "classId": class, "startTime": "tomorrow", "endTime": "later" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/sessions",
            json!({
                "classId": "missing",
                "startTime": "2025-03-03T09:00:00Z",
                "endTime": "2025-03-03T10:00:00Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn test_attendance_upsert_keeps_id() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let student = app.user("s@x", "STUDENT").await;
    let class = app.class(&teacher, "C").await;
    let session = app.session(&class).await;

    let before = Utc::now();
    let first = app.mark(&session, &student, "PRESENT").await;
    assert_eq!(first["method"], "MANUAL");
    let check_in: DateTime<Utc> = first["checkInTime"].as_str().unwrap().parse().unwrap();
    assert!(check_in >= before - chrono::Duration::seconds(1));

    let second = app.mark(&session, &student, "ABSENT").await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "ABSENT");
    assert!(second["checkInTime"].is_null());

    let (_, records) = app.get(&format!("/attendance?sessionId={session}")).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1, "upsert must not duplicate");
    assert_eq!(records[0]["student"]["email"], "s@x");
}

#[tokio::test]
async fn test_attendance_update_without_confidence_keeps_it() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let student = app.user("s@x", "STUDENT").await;
    let class = app.class(&teacher, "C").await;
    let session = app.session(&class).await;

    let (status, first) = app
        .post(
            "/attendance",
            json!({
                "sessionId": session,
                "studentId": student,
                "status": "PRESENT",
                "method": "FACIAL_RECOGNITION",
                "confidence": 91.5,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["confidence"], 91.5);

    let second = app.mark(&session, &student, "LATE").await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "LATE");
    assert_eq!(second["method"], "MANUAL");
    assert_eq!(second["confidence"], 91.5);

    let (_, third) = app
        .post(
            "/attendance",
            json!({
                "sessionId": session,
                "studentId": student,
                "status": "PRESENT",
                "confidence": 60.0,
            }),
        )
        .await;
    assert_eq!(third["confidence"], 60.0);
}

#[tokio::test]
async fn test_attendance_history_by_student() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let student = app.user("s@x", "STUDENT").await;
    let class = app.class(&teacher, "Databases").await;
    let session = app.session(&class).await;

    let (status, record) = app
        .post(
            "/attendance",
            json!({
                "sessionId": session,
                "studentId": student,
                "status": "LATE",
                "method": "QR_CODE",
                "confidence": 71.5,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["method"], "QR_CODE");
    assert_eq!(record["confidence"], 71.5);

    let (status, history) = app.get(&format!("/attendance?studentId={student}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["status"], "LATE");
    assert_eq!(history[0]["session"]["id"], json!(session));
    assert_eq!(history[0]["session"]["class"]["name"], "Databases");
}

#[tokio::test]
async fn test_attendance_validation() {
    let app = setup_app().await;
    let teacher = app.user("t@x", "TEACHER").await;
    let student = app.user("s@x", "STUDENT").await;
    let class = app.class(&teacher, "C").await;
    let session = app.session(&class).await;

    let (status, _) = app.get("/attendance").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/attendance", json!({ "sessionId": session, "studentId": student }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/attendance",
            json!({ "sessionId": session, "studentId": student, "status": "HERE" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("PRESENT"));

    let (status, _) = app
        .post(
            "/attendance",
            json!({ "sessionId": "missing", "studentId": student, "status": "PRESENT" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Skills, career goals, schedule
// =============================================================================

#[tokio::test]
async fn test_add_skill_created_then_existing() {
    let app = setup_app().await;
    let user = app.user("u@x", "STUDENT").await;

    let (status, created) = app
        .post("/skills", json!({ "userId": user, "skillId": "rust" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["targetLevel"], 100);
    assert_eq!(created["level"], 0);
    assert_eq!(created["skill"]["name"], "rust");
    assert_eq!(created["skill"]["category"], "TECHNICAL");

    let (status, existing) = app
        .post("/skills", json!({ "userId": user, "skillId": "rust", "targetLevel": 50 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(existing["id"], created["id"]);
    assert_eq!(existing["targetLevel"], 100);

    let (_, list) = app.get(&format!("/skills?userId={user}&category=TECHNICAL")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = app.get(&format!("/skills?userId={user}&category=SOFT")).await;
    assert_eq!(list, json!([]));

    let (status, _) = app.post("/skills", json!({ "userId": user })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_career_goals_ordering() {
    let app = setup_app().await;
    let user = app.user("u@x", "STUDENT").await;

    for (title, priority, date) in [
        ("Later low", "LOW", "2026-01-01"),
        ("Late high", "HIGH", "2027-01-01"),
        ("Early high", "HIGH", "2026-01-01"),
    ] {
        let (status, goal) = app
            .post(
                "/career-goals",
                json!({
                    "userId": user,
                    "title": title,
                    "description": "d",
                    "category": "ENGINEERING",
                    "targetDate": date,
                    "priority": priority,
                    "salaryRange": { "min": 1, "max": 2 },
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(goal["marketDemand"], "MEDIUM");
    }

    let (status, goals) = app.get(&format!("/career-goals?userId={user}")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = goals
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Early high", "Late high", "Later low"]);
    assert_eq!(goals[0]["salaryRange"]["max"], 2);

    let (status, _) = app
        .post("/career-goals", json!({ "userId": user, "title": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_range_and_times() {
    let app = setup_app().await;
    let user = app.user("u@x", "STUDENT").await;

    for (title, date, start) in [
        ("Lab", "2025-03-05", "14:00"),
        ("Lecture", "2025-03-03", "09:00"),
        ("Exam", "2025-04-01", "08:00"),
    ] {
        let (status, item) = app
            .post(
                "/schedule",
                json!({
                    "userId": user,
                    "title": title,
                    "date": date,
                    "startTime": start,
                    "endTime": "23:00",
                    "type": "CLASS",
                    "reminders": [15],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["startTime"], format!("{date}T{start}"));
        assert_eq!(item["priority"], "MEDIUM");
    }

    let (_, all) = app.get(&format!("/schedule?userId={user}")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all[0]["title"], "Lecture");

    let (_, march) = app
        .get(&format!("/schedule?userId={user}&startDate=2025-03-01&endDate=2025-03-31"))
        .await;
    let titles: Vec<&str> = march
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Lecture", "Lab"]);

    // Only one end of the range: ignored
    let (_, open) = app
        .get(&format!("/schedule?userId={user}&startDate=2025-03-04"))
        .await;
    assert_eq!(open.as_array().unwrap().len(), 3);
}

// =============================================================================
// Relay HTTP surface
// =============================================================================

#[tokio::test]
async fn test_socketio_info_reports_connections() {
    let app = setup_app().await;
    let _rx = app.hub.register("conn-1").await.unwrap();

    let (status, info) = app.get("/socketio").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["connectedClients"], 1);
    assert_eq!(info["path"], "/ws");
    assert_eq!(info["websocket"], true);
}

#[tokio::test]
async fn test_socketio_inject_event() {
    let app = setup_app().await;
    let mut rx = app.hub.register("conn-1").await.unwrap();
    app.hub.join("conn-1", "class-7").await;

    let (status, body) = app
        .post(
            "/socketio",
            json!({ "type": "attendance-update", "classId": "7", "studentId": "s1", "status": "PRESENT" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event received");
    assert_eq!(body["type"], "attendance-update");

    let frame: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(frame["event"], "attendance-updated");
    assert_eq!(frame["data"]["studentId"], "s1");

    let (status, _) = app.post("/socketio", json!({ "classId": "7" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
