use async_trait::async_trait;
use pingora::server::Server;
use pingora_web_errors::{
    App, BAD_REQUEST, ErrorResponder, FORBIDDEN, Handler, HasHighLevelForm, HighLevelError,
    NOT_FOUND, PROXY_ERROR, PanicRecoveryMiddleware, Request, Response, Router,
    TracingMiddleware, WebError, abort_and_error,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

#[derive(Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

static USER_MISSING: HighLevelError = NOT_FOUND;

/// Domain error that knows its own HTTP form.
#[derive(Debug, thiserror::Error)]
enum UserError {
    #[error("user {0} does not exist")]
    Missing(u32),
    #[error("user store unreachable")]
    StoreDown,
}

impl HasHighLevelForm for UserError {
    fn high_level_form(&self) -> Option<&HighLevelError> {
        match self {
            Self::Missing(_) => Some(&USER_MISSING),
            // Unclassified: rendered as 500 internal server error
            Self::StoreDown => None,
        }
    }
}

impl From<UserError> for WebError {
    fn from(err: UserError) -> Self {
        WebError::new(err)
    }
}

struct UserHandler;

impl UserHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, req: Request) -> Result<Response, WebError> {
        let Some(id) = req.param("id").and_then(|s| s.parse::<u32>().ok()) else {
            return abort_and_error(&req, BAD_REQUEST);
        };
        match id {
            1 => Ok(Response::json(
                200,
                User {
                    id,
                    name: "alice".to_string(),
                },
            )),
            13 => Err(UserError::StoreDown.into()),
            _ => Err(WebError::from(UserError::Missing(id)).context("loading profile")),
        }
    }
}

struct PanicHandler;

#[async_trait]
impl Handler for PanicHandler {
    async fn handle(&self, _req: Request) -> Result<Response, WebError> {
        panic!("handler bug");
    }
}

fn run_server(app: App, addr: &str) -> std::io::Result<()> {
    let mut server = Server::new(None).map_err(|e| std::io::Error::other(e.to_string()))?;
    server.bootstrap();

    let mut service = app.to_service("Web Service HTTP");
    service.add_tcp(addr);
    server.add_services(vec![Box::new(service)]);

    server.run_forever()
}

fn main() {
    // INFO by default, RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let mut router = Router::new();
    router.get("/users/{id}", UserHandler::new());
    router.get("/panic", Arc::new(PanicHandler));

    router.get_fn("/admin", |req| abort_and_error(&req, FORBIDDEN));

    router.get_fn("/proxy", |_req| {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        Err(WebError::from(refused).context_with(PROXY_ERROR, "dialing upstream"))
    });

    router.post_fn("/users", |req| {
        let user: User = req
            .json()
            .map_err(|e| e.context_with(BAD_REQUEST, "decoding user"))?;
        Ok(Response::json(201, user))
    });

    router.get_fn("/teapot", |_req| {
        Err(HighLevelError::new(418, "short and stout").into())
    });

    let mut app = App::new(router);
    // Outermost first: the responder sees every error the others let through
    app.use_middleware(ErrorResponder::new());
    app.use_middleware(TracingMiddleware::new());
    app.use_middleware(PanicRecoveryMiddleware::new());

    tracing::info!("listening on http://localhost:8080");
    tracing::info!("routes: /users/{{id}}, POST /users, /admin, /proxy, /teapot, /panic");

    if let Err(e) = run_server(app, "0.0.0.0:8080") {
        tracing::error!(error = %e, "pingora server error");
    }
}
