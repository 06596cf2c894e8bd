mod error;

pub use axum::http::StatusCode;
pub use error::{Error, Result};

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use axum::{
	Form, Json, Router,
	extract::{RawQuery, State},
	http::Uri,
	response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::{
	net::TcpListener,
	sync::oneshot::{self, Sender},
};

/// One form POST received by a [`MockMatchingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
	pub path: String,
	/// Raw query string, e.g. `cgen` for candidate-generation requests.
	pub query: Option<String>,
	pub form: HashMap<String, String>,
}
impl RecordedRequest {
	pub fn field(&self, name: &str) -> Option<&str> {
		self.form.get(name).map(String::as_str)
	}
}

/// What the mock sends back for a request.
#[derive(Debug, Clone)]
pub enum MockResponse {
	Json(Value),
	Status(StatusCode),
	/// A 200 response whose body is not valid JSON.
	Malformed,
}

type Responder = dyn Fn(usize, &RecordedRequest) -> MockResponse + Send + Sync;

#[derive(Clone)]
struct MockState {
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
	responder: Arc<Responder>,
}

/// Local HTTP server standing in for an ARPA-style matching service or a SPARQL endpoint.
///
/// Every request is recorded before the responder picks a reply. The responder sees the
/// zero-based index of the request, which makes fail-then-succeed scenarios easy to script.
pub struct MockMatchingService {
	url: String,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
	shutdown: Option<Sender<()>>,
}
impl MockMatchingService {
	pub async fn start<F>(responder: F) -> Result<Self>
	where
		F: Fn(usize, &RecordedRequest) -> MockResponse + Send + Sync + 'static,
	{
		let requests = Arc::new(Mutex::new(Vec::new()));
		let state = MockState { requests: requests.clone(), responder: Arc::new(responder) };
		let app = Router::new().fallback(record).with_state(state);
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { url: format!("http://{addr}/arpa/warsa_persons"), requests, shutdown: Some(tx) })
	}

	/// Answers every request with the same JSON body.
	pub async fn json(body: Value) -> Result<Self> {
		Self::start(move |_, _| MockResponse::Json(body.clone())).await
	}

	/// Answers every request with an empty body and `status`.
	pub async fn status(status: StatusCode) -> Result<Self> {
		Self::start(move |_, _| MockResponse::Status(status)).await
	}

	/// Fails the first `failures` requests with a 503, then answers with `body`.
	pub async fn fail_then(failures: usize, body: Value) -> Result<Self> {
		Self::start(move |index, _| {
			if index < failures {
				MockResponse::Status(StatusCode::SERVICE_UNAVAILABLE)
			} else {
				MockResponse::Json(body.clone())
			}
		})
		.await
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// Values of the form field `name` across all recorded requests, in arrival order.
	pub fn field_values(&self, name: &str) -> Vec<String> {
		self.requests()
			.iter()
			.filter_map(|request| request.field(name).map(str::to_string))
			.collect()
	}

	pub fn shutdown(mut self) {
		self.stop();
	}

	fn stop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}
impl Drop for MockMatchingService {
	fn drop(&mut self) {
		self.stop();
	}
}

async fn record(
	State(state): State<MockState>,
	uri: Uri,
	RawQuery(query): RawQuery,
	Form(form): Form<HashMap<String, String>>,
) -> Response {
	let request = RecordedRequest { path: uri.path().to_string(), query, form };
	let index = {
		let mut requests = state.requests.lock().unwrap_or_else(|err| err.into_inner());

		requests.push(request.clone());

		requests.len() - 1
	};

	match (state.responder)(index, &request) {
		MockResponse::Json(body) => Json(body).into_response(),
		MockResponse::Status(status) => status.into_response(),
		MockResponse::Malformed => (StatusCode::OK, "{\"results\": [").into_response(),
	}
}
