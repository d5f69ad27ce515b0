//! 测试用的本地 LINE 接口：记录每次 reply / push 的请求内容

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value as JsonValue;

#[derive(Clone)]
pub(crate) struct LineStub {
    calls: Arc<Mutex<Vec<(String, JsonValue)>>>,
    reply_status: StatusCode,
}

impl LineStub {
    /// 在随机端口启动，返回桩和 API 基础地址
    pub(crate) async fn start(reply_status: StatusCode) -> (Self, String) {
        let stub = Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply_status,
        };
        let app = Router::new()
            .route("/:endpoint", post(record))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (stub, base)
    }

    /// 按到达顺序返回 (接口名, 请求体)
    pub(crate) fn calls(&self) -> Vec<(String, JsonValue)> {
        self.calls.lock().unwrap().clone()
    }
}

async fn record(
    State(stub): State<LineStub>,
    Path(endpoint): Path<String>,
    Json(body): Json<JsonValue>,
) -> StatusCode {
    let status = if endpoint == "reply" {
        stub.reply_status
    } else {
        StatusCode::OK
    };
    stub.calls.lock().unwrap().push((endpoint, body));
    status
}
