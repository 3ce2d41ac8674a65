use crate::auth::{self, Credentials, CurrentSession, SessionStore};
use crate::delivery::{DeliveryRequestForm, SUBMITTED_MESSAGE};
use crate::error::AppError;
use crate::map::Station;
use crate::order::{OrderBook, OrderFixtures};
use crate::tracking;
use crate::util::format_date;
use crate::views::{LoginPage, OrderCard, OrderDetail, OrdersPage, RequestPage};
use anyhow::Result;
use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info};

const STYLE_CSS: &str = include_str!("../static/style.css");

const LOGIN_FAILED: &str = "Incorrect username or password. Please try again.";

#[derive(Clone)]
pub struct AppState {
    pub credentials: Credentials,
    pub sessions: Arc<SessionStore>,
    pub fixtures: Arc<OrderFixtures>,
    pub assets_dir: PathBuf,
    pub utc_offset: FixedOffset,
    pub base_date_offset_days: i64,
    pub display_name: String,
    pub station: Station,
}

impl AppState {
    pub fn now(&self) -> DateTime<FixedOffset> {
        tracking::now_in(self.utc_offset)
    }

    /// Orders for a new session, dated relative to the current time.
    pub fn build_order_book(&self) -> Result<OrderBook> {
        OrderBook::build(
            &self.fixtures,
            &self.assets_dir,
            &self.now(),
            self.base_date_offset_days,
        )
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

async fn style() -> Response {
    ([(header::CONTENT_TYPE, "text/css")], STYLE_CSS).into_response()
}

async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let logged_in = auth::session_token(&headers)
        .and_then(|token| state.sessions.get(&token))
        .is_some();

    if logged_in {
        return Ok(Redirect::to("/orders").into_response());
    }

    let page = LoginPage {
        username: String::new(),
        error: None,
    };
    Ok(render(&page)?.into_response())
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let previous = auth::session_token(&headers);
    match auth::login(&state, &form.username, &form.password, previous.as_deref())? {
        Some(token) => Ok((
            [(header::SET_COOKIE, auth::session_cookie(&token))],
            Redirect::to("/orders"),
        )
            .into_response()),
        None => {
            let page = LoginPage {
                username: form.username,
                error: Some(LOGIN_FAILED.to_string()),
            };
            Ok((StatusCode::UNAUTHORIZED, render(&page)?).into_response())
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::session_token(&headers) {
        if state.sessions.remove(&token) {
            info!("Logged out");
        }
    }

    (
        [(header::SET_COOKIE, auth::expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

fn orders_page(state: &AppState, book: &OrderBook, detail: Option<OrderDetail>) -> OrdersPage {
    OrdersPage {
        display_name: state.display_name.clone(),
        notices: book.notices.clone(),
        cards: book.orders.iter().map(OrderCard::from_order).collect(),
        detail,
    }
}

async fn orders(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Html<String>, AppError> {
    render(&orders_page(&state, &session.book, None))
}

async fn order_detail(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let order = session
        .book
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let detail = OrderDetail::from_order(order, &state.station)
        .ok_or_else(|| AppError::NotFound(format!("tracking details for order {id}")))?;

    debug!(order_id = %id, status = %order.status, "Showing order detail");
    render(&orders_page(&state, &session.book, Some(detail)))
}

async fn request_page(
    State(state): State<AppState>,
    CurrentSession(_): CurrentSession,
) -> Result<Html<String>, AppError> {
    let now = state.now();
    let page = RequestPage::new(DeliveryRequestForm::blank(&now), format_date(now.date_naive()));
    render(&page)
}

async fn submit_request(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(mut form): Form<DeliveryRequestForm>,
) -> Result<Response, AppError> {
    let now = state.now();
    form.fill_pickup_defaults(&now);

    match form.validate() {
        Ok(request) => {
            info!(
                username = %session.username,
                recipient = %request.recipient_name,
                pickup_date = %request.pickup_date,
                "Delivery request submitted"
            );
            let mut page = RequestPage::new(form, format_date(now.date_naive()));
            page.success = Some(SUBMITTED_MESSAGE.to_string());
            page.summary = request.summary();
            Ok(render(&page)?.into_response())
        }
        Err(err) => {
            debug!(error = ?err, "Delivery request rejected");
            let mut page = RequestPage::new(form, format_date(now.date_naive()));
            page.error = Some(err.to_string());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response())
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(login_page))
        .route("/login", axum::routing::post(login))
        .route("/logout", axum::routing::post(logout))
        .route("/orders", get(orders))
        .route("/orders/{id}", get(order_detail))
        .route("/request", get(request_page).post(submit_request))
        .route("/style.css", get(style))
        .with_state(state)
}

pub fn start(state: AppState, bind: &str, port: u16, running: Arc<AtomicBool>) {
    let app = router(state);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "Failed to create tokio runtime for web server");
            return;
        }
    };

    rt.block_on(async {
        let listener = match tokio::net::TcpListener::bind(format!("{bind}:{port}")).await {
            Ok(l) => l,
            Err(err) => {
                error!(error = %err, bind, port, "Web server failed to bind");
                return;
            }
        };

        info!(bind, port, "Web server listening");

        let shutdown = async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
            info!("Web server shutting down");
        };

        if let Err(err) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!(error = %err, "Web server error");
        }
    });
}
