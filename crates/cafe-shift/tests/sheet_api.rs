use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use cafe_shift::schedule::RawShiftRecord;
use cafe_shift::sync::{
    read_cached_shifts, write_cached_shifts, AppsScriptClient, MemoryStore, RemoteError,
    ShiftLoader, ShiftSource, SnapshotSource,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const HTML_ERROR_PAGE: &str = "<!DOCTYPE html><html><body>Script function not found</body></html>";

/// Stand-in for the spreadsheet web app: records request bodies and plays
/// back canned replies in order.
#[derive(Clone, Default)]
struct SheetApi {
    bodies: Arc<Mutex<Vec<Value>>>,
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
}

impl SheetApi {
    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().expect("bodies mutex").clone()
    }
}

async fn exec(State(api): State<SheetApi>, Json(body): Json<Value>) -> (StatusCode, String) {
    api.bodies.lock().expect("bodies mutex").push(body);
    api.replies
        .lock()
        .expect("replies mutex")
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "no reply queued".to_string()))
}

async fn serve_sheet_api(replies: Vec<(StatusCode, &str)>) -> (String, SheetApi) {
    let api = SheetApi {
        bodies: Arc::default(),
        replies: Arc::new(Mutex::new(
            replies
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        )),
    };
    let app = Router::new()
        .route("/exec", post(exec))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("sheet api server");
    });

    (format!("http://{addr}/exec"), api)
}

fn cached_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    let raw: Vec<RawShiftRecord> = serde_json::from_value(json!([
        { "date": "2024-06-01", "staffId": "S003", "staffName": "Mika Suzuki", "slotId": "morning" }
    ]))
    .expect("raw records");
    write_cached_shifts(&*store, &raw).expect("seed cache");
    store
}

#[tokio::test]
async fn client_posts_get_all_shifts_action() {
    let (url, api) = serve_sheet_api(vec![(
        StatusCode::OK,
        r#"{"success":true,"shifts":[{"date":"2024-06-04","staffId":"S001","staffName":"Aiko Tanaka","slotId":"morning"}]}"#,
    )])
    .await;

    let response = AppsScriptClient::new(url)
        .get_all_shifts()
        .await
        .expect("sheet api reply");

    assert!(response.success);
    let shifts = response.shifts.expect("shifts present");
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].staff_id, Some(json!("S001")));
    assert_eq!(
        api.bodies(),
        vec![json!({ "action": "getAllShifts", "params": {} })]
    );
}

#[tokio::test]
async fn client_maps_error_status() {
    let (url, _api) =
        serve_sheet_api(vec![(StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded")]).await;

    match AppsScriptClient::new(url).get_all_shifts().await {
        Err(RemoteError::Status(code)) => assert_eq!(code, 500),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_rejects_html_body() {
    let (url, _api) = serve_sheet_api(vec![(StatusCode::OK, HTML_ERROR_PAGE)]).await;

    let result = AppsScriptClient::new(url).get_all_shifts().await;
    assert!(matches!(result, Err(RemoteError::Transport(_))), "{result:?}");
}

#[tokio::test]
async fn loader_serves_cache_when_sheet_api_misbehaves() {
    let (url, api) = serve_sheet_api(vec![
        (StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        (StatusCode::OK, HTML_ERROR_PAGE),
    ])
    .await;
    let store = cached_store();
    let remote: Arc<dyn ShiftSource> = Arc::new(AppsScriptClient::new(url));
    let loader = ShiftLoader::new(store.clone(), Some(remote));

    for _ in 0..2 {
        let snapshot = loader.load().await.expect("load degrades to cache");
        assert_eq!(snapshot.source, SnapshotSource::Cache);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records[0].staff_id, "S003");
    }

    assert_eq!(api.bodies().len(), 2);
    assert_eq!(read_cached_shifts(&*store).expect("read cache").len(), 1);
}
