use super::*;
use crate::auth::{MemoryStore, Session};
use crate::toast::Notifier;
use crate::web::route::Location;
use crate::web::router::Navigator;
use image_hosting_shared::{LoginRequest, UserInfo};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

// =========================================================
// Shared Mock Components
// =========================================================

/// Records every request and replies with a scripted result
#[derive(Clone, Default)]
struct MockTransport {
    sent: Arc<Mutex<Vec<TransportRequest>>>,
    reply: Arc<Mutex<Option<Result<TransportResponse, HttpError>>>>,
}

impl MockTransport {
    fn replying(status: u16, body: serde_json::Value) -> Self {
        let transport = Self::default();
        transport.set_reply(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }));
        transport
    }

    fn failing(error: HttpError) -> Self {
        let transport = Self::default();
        transport.set_reply(Err(error));
        transport
    }

    fn set_reply(&self, reply: Result<TransportResponse, HttpError>) {
        *self.reply.lock().unwrap() = Some(reply);
    }

    fn last(&self) -> TransportRequest {
        self.sent.lock().unwrap().last().cloned().expect("no request sent")
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, HttpError> {
        self.sent.lock().unwrap().push(req);
        self.reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(HttpError::NetworkError("no reply scripted".to_string())))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    log: Arc<Mutex<Vec<(bool, String)>>>,
}

impl RecordingNotifier {
    fn errors(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| !ok)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.log.lock().unwrap().push((true, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.log.lock().unwrap().push((false, message.to_string()));
    }
}

#[derive(Clone)]
struct RecordingNavigator {
    current: String,
    replaced: Arc<Mutex<Vec<Location>>>,
}

impl RecordingNavigator {
    fn at(path: &str) -> Self {
        Self {
            current: path.to_string(),
            replaced: Arc::default(),
        }
    }

    fn replaced(&self) -> Vec<Location> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_full_path(&self) -> String {
        self.current.clone()
    }

    fn replace(&self, location: Location) {
        self.replaced.lock().unwrap().push(location);
    }
}

struct TestContext {
    transport: MockTransport,
    notifier: RecordingNotifier,
    navigator: RecordingNavigator,
    session: Session,
    client: ApiClient,
}

impl TestContext {
    fn new(transport: MockTransport, token: Option<&str>) -> Self {
        let session = Session::new(MemoryStore::new());
        if let Some(token) = token {
            session.sign_in(token, &UserInfo::default());
        }
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::at("/dashboard/images?page=2");
        let client = ApiClient::builder(ClientConfig::default(), transport.clone())
            .request_stage(BearerAuth::new(session.reader()))
            .failure_stage(NotifyFailure::new(notifier.clone()))
            .failure_stage(ExpireSession::new(session.clone(), navigator.clone()))
            .build();

        Self {
            transport,
            notifier,
            navigator,
            session,
            client,
        }
    }
}

fn header<'a>(req: &'a TransportRequest, name: &str) -> Option<&'a str> {
    req.headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Deserialize, PartialEq)]
struct ImagePage {
    total: u64,
}

// =========================================================
// Request side
// =========================================================

#[tokio::test]
async fn bearer_header_added_when_token_present() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 200, "data": null})), Some("abc123"));

    let _: () = ctx.client.get("/images", &()).await.unwrap();

    let req = ctx.transport.last();
    assert_eq!(header(&req, "Authorization"), Some("Bearer abc123"));
}

#[tokio::test]
async fn bearer_header_omitted_without_token() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 200})), None);

    let _: () = ctx.client.post("/images/upload", &json!({"name": "a.png"})).await.unwrap();

    assert_eq!(header(&ctx.transport.last(), "Authorization"), None);
}

#[tokio::test]
async fn login_never_carries_bearer_header() {
    let ctx = TestContext::new(
        MockTransport::replying(200, json!({"code": 200, "data": {"token": "new", "user": {}}})),
        Some("stale-token"),
    );
    let login = LoginRequest {
        username: "alice".to_string(),
        password: "pw".to_string(),
        remember: None,
    };

    let _: image_hosting_shared::LoginResponse = ctx.client.post("/login", &login).await.unwrap();

    assert_eq!(header(&ctx.transport.last(), "Authorization"), None);
}

#[tokio::test]
async fn fixed_configuration_is_applied() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 200})), None);

    let _: () = ctx
        .client
        .get("/admin/images", &json!({"page": 1, "size": 20, "userId": null}))
        .await
        .unwrap();

    let req = ctx.transport.last();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, "/api/admin/images?page=1&size=20");
    assert_eq!(req.body, None);
    assert_eq!(req.timeout_ms, 10_000);
    assert!(req.with_credentials);
    assert_eq!(header(&req, "Content-Type"), Some("application/json;charset=utf-8"));
    assert_eq!(header(&req, "X-Requested-With"), Some("XMLHttpRequest"));
}

#[tokio::test]
async fn put_and_delete_route_payloads() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 200})), Some("t"));

    let _: () = ctx.client.put("/user/info", &json!({"nickname": "A"})).await.unwrap();
    let req = ctx.transport.last();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.body.as_deref(), Some(r#"{"nickname":"A"}"#));

    let _: () = ctx.client.delete("/admin/users", &json!({"id": 9})).await.unwrap();
    let req = ctx.transport.last();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, "/api/admin/users?id=9");
}

// =========================================================
// Response side
// =========================================================

#[tokio::test]
async fn success_unwraps_payload_without_notification() {
    let ctx = TestContext::new(
        MockTransport::replying(200, json!({"code": 200, "message": "操作成功", "data": {"total": 12}})),
        Some("t"),
    );

    let page: ImagePage = ctx.client.get("/images", &()).await.unwrap();

    assert_eq!(page, ImagePage { total: 12 });
    assert_eq!(ctx.notifier.total(), 0);
    assert!(ctx.navigator.replaced().is_empty());
}

#[tokio::test]
async fn rejection_notifies_once_and_keeps_token() {
    let ctx = TestContext::new(
        MockTransport::replying(200, json!({"code": 400, "message": "参数错误", "data": null})),
        Some("abc123"),
    );

    let err = ctx.client.get::<()>("/images", &()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            code: 400,
            message: "参数错误".to_string()
        }
    );
    assert_eq!(ctx.notifier.errors(), vec!["参数错误".to_string()]);
    assert_eq!(ctx.session.snapshot().token.as_deref(), Some("abc123"));
    assert!(ctx.navigator.replaced().is_empty());
}

#[tokio::test]
async fn rejection_without_message_uses_fallback() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 500, "message": ""})), None);

    let err = ctx.client.get::<()>("/admin/stats", &()).await.unwrap_err();

    assert_eq!(err.user_message(), FALLBACK_ENVELOPE_MESSAGE);
    assert_eq!(ctx.notifier.errors(), vec![FALLBACK_ENVELOPE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn unauthorized_clears_token_and_redirects_to_login() {
    let ctx = TestContext::new(
        MockTransport::replying(200, json!({"code": 401, "message": "未授权"})),
        Some("abc123"),
    );

    let err = ctx.client.get::<()>("/user/info", &()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(ctx.notifier.errors(), vec!["未授权".to_string()]);
    let snapshot = ctx.session.snapshot();
    assert!(snapshot.token.is_none());
    assert!(snapshot.user.is_some());

    let replaced = ctx.navigator.replaced();
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].path, "/login");
    assert_eq!(replaced[0].query_value("redirect"), Some("/dashboard/images?page=2"));
}

#[tokio::test]
async fn transport_failure_uses_transport_message() {
    let ctx = TestContext::new(MockTransport::failing(HttpError::Timeout(10_000)), Some("t"));

    let err = ctx.client.get::<()>("/images", &()).await.unwrap_err();

    assert_eq!(err, ApiError::Transport(HttpError::Timeout(10_000)));
    assert_eq!(ctx.notifier.errors(), vec![HttpError::Timeout(10_000).to_string()]);
    assert_eq!(ctx.session.snapshot().token.as_deref(), Some("t"));
}

#[tokio::test]
async fn http_status_401_is_a_transport_failure() {
    let ctx = TestContext::new(MockTransport::replying(401, json!({"code": 401})), Some("t"));

    let err = ctx.client.get::<()>("/images", &()).await.unwrap_err();

    assert_eq!(err, ApiError::Transport(HttpError::Status(401)));
    assert_eq!(ctx.session.snapshot().token.as_deref(), Some("t"));
    assert!(ctx.navigator.replaced().is_empty());
}

#[tokio::test]
async fn non_envelope_body_is_reported() {
    let transport = MockTransport::default();
    transport.set_reply(Ok(TransportResponse {
        status: 200,
        body: "<html>gateway</html>".to_string(),
    }));
    let ctx = TestContext::new(transport, None);

    let err = ctx.client.get::<()>("/images", &()).await.unwrap_err();

    assert!(matches!(err, ApiError::MalformedEnvelope(_)));
    assert_eq!(ctx.notifier.errors(), vec![FALLBACK_ENVELOPE_MESSAGE.to_string()]);
}

#[tokio::test]
async fn invalid_query_params_fail_before_sending() {
    let ctx = TestContext::new(MockTransport::replying(200, json!({"code": 200})), None);

    let err = ctx.client.get::<()>("/images", &json!([1, 2])).await.unwrap_err();

    assert!(matches!(err, ApiError::Encode(_)));
    assert_eq!(ctx.transport.count(), 0);
    assert_eq!(ctx.notifier.errors().len(), 1);
}

#[test]
fn stages_are_named_in_order() {
    let ctx = TestContext::new(MockTransport::default(), None);
    assert_eq!(ctx.client.stage_names(), vec!["bearer-auth", "notify", "expire-session"]);
}

#[test]
fn decode_envelope_treats_missing_data_as_null() {
    let ok: Option<ImagePage> = decode_envelope(TransportResponse {
        status: 200,
        body: r#"{"code":200,"message":"ok"}"#.to_string(),
    })
    .unwrap();
    assert_eq!(ok, None);

    let bad = decode_envelope::<ImagePage>(TransportResponse {
        status: 200,
        body: r#"{"code":200,"data":{"total":"x"}}"#.to_string(),
    });
    assert!(matches!(bad, Err(ApiError::Decode(_))));
}

#[test]
fn decode_envelope_keeps_code_and_message_on_failure() {
    let decode = |body: &str| {
        decode_envelope::<()>(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    };

    assert_eq!(
        decode(r#"{"code":401,"message":"登录已过期"}"#),
        Err(ApiError::Unauthorized {
            message: "登录已过期".to_string()
        })
    );
    assert_eq!(
        decode(r#"{"code":403,"message":"无权限"}"#),
        Err(ApiError::Rejected {
            code: 403,
            message: "无权限".to_string()
        })
    );
    assert_eq!(
        decode(r#"{"code":500,"message":"  "}"#),
        Err(ApiError::Rejected {
            code: 500,
            message: FALLBACK_ENVELOPE_MESSAGE.to_string()
        })
    );
}
