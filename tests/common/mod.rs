#![allow(dead_code)]

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

pub const TOKEN: &str = "test-token";

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-process stand-in for `GET/POST /notifications/preferences`.
pub struct FakePreferencesApi {
  pub base_url: String,
  pub stored: Arc<Mutex<Option<Value>>>,
  pub hits: Arc<Mutex<Vec<(String, Option<String>)>>>,
  pub failing: Arc<AtomicBool>,
  server: Arc<Server>,
  handle: Option<JoinHandle<()>>,
}

impl FakePreferencesApi {
  pub fn start() -> Self {
    let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
    let port = server.server_addr().to_ip().unwrap().port();
    let stored = Arc::new(Mutex::new(None));
    let hits = Arc::new(Mutex::new(Vec::new()));
    let failing = Arc::new(AtomicBool::new(false));

    let handle = {
      let server = server.clone();
      let stored = stored.clone();
      let hits = hits.clone();
      let failing = failing.clone();
      std::thread::spawn(move || {
        for request in server.incoming_requests() {
          handle_request(request, &stored, &hits, &failing);
        }
      })
    };

    Self {
      base_url: format!("http://127.0.0.1:{port}"),
      stored,
      hits,
      failing,
      server,
      handle: Some(handle),
    }
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn stored(&self) -> Option<Value> {
    self.stored.lock().unwrap().clone()
  }

  pub fn hit_count(&self, method: &str) -> usize {
    self.hits.lock().unwrap().iter().filter(|(m, _)| m == method).count()
  }
}

impl Drop for FakePreferencesApi {
  fn drop(&mut self) {
    self.server.unblock();
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }
}

fn handle_request(
  mut request: Request,
  stored: &Mutex<Option<Value>>,
  hits: &Mutex<Vec<(String, Option<String>)>>,
  failing: &AtomicBool,
) {
  let method = request.method().clone();
  let url = request.url().split('?').next().unwrap_or("").to_string();
  let auth = read_header(&request, "Authorization");
  hits.lock().unwrap().push((method.to_string(), auth.clone()));

  let response = if failing.load(Ordering::SeqCst) {
    json_response(StatusCode(503), &json!({ "code": "UNAVAILABLE" }))
  } else if auth.as_deref() != Some(&format!("Bearer {TOKEN}")) {
    json_response(StatusCode(401), &json!({ "code": "UNAUTHORIZED" }))
  } else {
    match (method, url.as_str()) {
      (Method::Get, "/notifications/preferences") => {
        let current = stored.lock().unwrap().clone();
        json_response(StatusCode(200), &json!({ "preferences": current }))
      }
      (Method::Post, "/notifications/preferences") => {
        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);
        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let prefs = payload.get("preferences").cloned();
        *stored.lock().unwrap() = prefs.clone();
        json_response(StatusCode(200), &json!({ "preferences": prefs }))
      }
      _ => json_response(StatusCode(404), &json!({ "code": "NOT_FOUND" })),
    }
  };
  let _ = request.respond(response);
}

fn read_header(request: &Request, name: &str) -> Option<String> {
  request
    .headers()
    .iter()
    .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
    .map(|header| header.value.to_string())
}

fn json_response(status: StatusCode, payload: &Value) -> Response<std::io::Cursor<Vec<u8>>> {
  let body = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
  Response::from_data(body)
    .with_status_code(status)
    .with_header(Header::from_bytes("Content-Type", "application/json").unwrap())
}
