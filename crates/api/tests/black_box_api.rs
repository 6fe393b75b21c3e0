use reqwest::StatusCode;
use serde_json::{json, Value};

use scoreline_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn create_convention(&self) -> String {
        let (status, body) = self
            .post("/conventions", json!({"name": "Autumn Open", "held_date": "2024-10-12"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_player(&self, convention_id: &str, name: &str) -> String {
        let (status, body) = self
            .post(&format!("/conventions/{convention_id}/players"), json!({"name": name}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_match(&self, convention_id: &str, home: &str, away: &str, hs: i64, aws: i64) -> String {
        let (status, body) = self
            .post(
                &format!("/conventions/{convention_id}/matches"),
                json!({
                    "home_player_id": home,
                    "away_player_id": away,
                    "home_score": hs,
                    "away_score": aws,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, info) = srv.get("/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["store"], "in_memory");
}

#[tokio::test]
async fn convention_lifecycle() {
    let srv = TestServer::spawn().await;
    let id = srv.create_convention().await;

    let (status, body) = srv.get(&format!("/conventions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Autumn Open");
    assert_eq!(body["held_date"], "2024-10-12");

    let (status, list) = srv.get("/conventions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn convention_without_date_defaults_to_today() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.post("/conventions", json!({"name": "Pop-up Cup"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["held_date"], chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn invalid_input_is_a_json_400() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.post("/conventions", json!({"name": "X", "held_date": "12/10/2024"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = srv.post("/conventions", json!({"name": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let (status, body) = srv.get("/conventions/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = srv.post("/conventions", json!({"title": "missing name"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn unknown_convention_is_404() {
    let srv = TestServer::spawn().await;
    let missing = uuid::Uuid::now_v7();
    let (status, body) = srv.get(&format!("/conventions/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = srv
        .post(&format!("/conventions/{missing}/players"), json!({"name": "Ghost"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn match_updates_standings() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let home = srv.create_player(&conv, "Mika").await;
    let away = srv.create_player(&conv, "Yuto").await;

    let match_id = srv.create_match(&conv, &home, &away, 1, 0).await;

    let (status, m) = srv.get(&format!("/conventions/{conv}/matches/{match_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["outcome"], "home");

    let (status, table) = srv.get(&format!("/conventions/{conv}/players")).await;
    assert_eq!(status, StatusCode::OK);
    let table = table.as_array().unwrap();
    assert_eq!(table[0]["id"], home.as_str());
    assert_eq!(table[0]["points"], 3);
    assert_eq!(table[0]["goals"], 1);
    assert_eq!(table[1]["points"], 0);
    assert_eq!(table[1]["losses"], 1);
    assert_eq!(table[1]["concede"], 1);
}

#[tokio::test]
async fn match_against_self_is_rejected() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let p = srv.create_player(&conv, "Solo").await;

    let (status, body) = srv
        .post(
            &format!("/conventions/{conv}/matches"),
            json!({"home_player_id": p, "away_player_id": p, "home_score": 1, "away_score": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn scorer_ceiling_is_enforced() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let home = srv.create_player(&conv, "Mika").await;
    let away = srv.create_player(&conv, "Yuto").await;
    let match_id = srv.create_match(&conv, &home, &away, 2, 1).await;
    let path = format!("/conventions/{conv}/matches/{match_id}/scorers");

    let (status, body) = srv
        .post(
            &path,
            json!([
                {"player_id": home, "name": "Mbappe"},
                {"player_id": home, "name": "Mbappe"},
                {"player_id": home, "name": "Griezmann"},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "home team event count exceeds home score");

    let (status, body) = srv
        .post(
            &path,
            json!([
                {"player_id": home, "name": "Mbappe"},
                {"player_id": away, "name": "Kane"},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = srv.post(&path, json!([{"player_id": away, "name": "Kane"}])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "away team event count exceeds away score");

    let (status, listed) = srv.get(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn batch_body_must_be_an_array() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let home = srv.create_player(&conv, "Mika").await;
    let away = srv.create_player(&conv, "Yuto").await;
    let match_id = srv.create_match(&conv, &home, &away, 1, 1).await;

    let (status, body) = srv
        .post(
            &format!("/conventions/{conv}/matches/{match_id}/assists"),
            json!({"player_id": home, "name": "Modric"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn mom_is_registered_once() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let home = srv.create_player(&conv, "Mika").await;
    let away = srv.create_player(&conv, "Yuto").await;
    let match_id = srv.create_match(&conv, &home, &away, 0, 0).await;
    let path = format!("/conventions/{conv}/matches/{match_id}/mom");

    let (status, _) = srv.get(&path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = srv.post(&path, json!({"player_id": away, "name": "Courtois"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["player_id"], away.as_str());

    let (status, body) = srv.post(&path, json!({"player_id": home, "name": "Alisson"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already registered"));

    let (status, mom) = srv.get(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mom["name"], "Courtois");
}

#[tokio::test]
async fn rankings_need_exactly_one_selector() {
    let srv = TestServer::spawn().await;
    let conv = srv.create_convention().await;
    let home = srv.create_player(&conv, "Mika").await;
    let away = srv.create_player(&conv, "Yuto").await;
    let m1 = srv.create_match(&conv, &home, &away, 4, 2).await;
    let m2 = srv.create_match(&conv, &home, &away, 3, 1).await;

    let scorers = |n: usize, player: &str, name: &str| {
        (0..n).map(|_| json!({"player_id": player, "name": name})).collect::<Vec<_>>()
    };
    let mut first = scorers(4, &home, "Lewandowski");
    first.extend(scorers(2, &away, "Salah"));
    let (status, _) = srv
        .post(&format!("/conventions/{conv}/matches/{m1}/scorers"), Value::Array(first))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut second = scorers(3, &home, "Vinicius");
    second.extend(scorers(1, &away, "Son"));
    let (status, _) = srv
        .post(&format!("/conventions/{conv}/matches/{m2}/scorers"), Value::Array(second))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, ranking) = srv.get(&format!("/scorers?convention_id={conv}")).await;
    assert_eq!(status, StatusCode::OK);
    let counts: Vec<u64> = ranking
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![4, 3, 2, 1]);

    let (status, ranking) = srv.get(&format!("/scorers?player_id={away}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranking[0]["name"], "Salah");
    assert_eq!(ranking[0]["player_name"], "Yuto");

    let (status, _) = srv.get("/assists").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv
        .get(&format!("/moms?convention_id={conv}&player_id={home}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, empty) = srv.get(&format!("/moms?convention_id={conv}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(empty.as_array().unwrap().is_empty());
}
