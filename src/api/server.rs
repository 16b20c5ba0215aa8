use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::api::handlers::*;
use crate::econ::{
    Ledger, MessageBoard, NotificationInbox, PenaltyEngine, ProfileError, ProfileStore,
    PurchaseEngine, PurchaseError, ReportEngine, ReportError,
};
use crate::sync::SyncHandle;

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

pub struct AppState {
    pub ledger: Ledger,
    pub profiles: ProfileStore,
    pub penalty: PenaltyEngine,
    pub purchase: PurchaseEngine,
    pub reports: ReportEngine,
    pub inbox: NotificationInbox,
    pub board: MessageBoard,
}

impl AppState {
    pub fn new(sync: SyncHandle) -> Self {
        Self {
            ledger: Ledger::new(sync.clone()),
            profiles: ProfileStore::new(sync.clone()),
            penalty: PenaltyEngine::new(sync.clone()),
            purchase: PurchaseEngine::new(sync.clone()),
            reports: ReportEngine::new(sync.clone()),
            inbox: NotificationInbox::new(sync.clone()),
            board: MessageBoard::new(sync),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Purchase(#[from] PurchaseError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("no shift scheduled for '{0}'")]
    NoShift(String),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let status = match &self {
            RouteError::Profile(ProfileError::UnknownItem(_)) => StatusCode::NOT_FOUND,
            RouteError::Profile(ProfileError::ItemNotOwned(_)) => StatusCode::CONFLICT,
            RouteError::Purchase(PurchaseError::InvalidItem(_)) => StatusCode::NOT_FOUND,
            RouteError::Purchase(PurchaseError::RankLocked { .. }) => StatusCode::FORBIDDEN,
            RouteError::Purchase(PurchaseError::InsufficientFunds { .. }) => {
                StatusCode::PAYMENT_REQUIRED
            }
            RouteError::Purchase(PurchaseError::AlreadyOwned(_)) => StatusCode::CONFLICT,
            RouteError::Report(ReportError::AlreadySubmitted) => StatusCode::CONFLICT,
            RouteError::Report(_) => StatusCode::BAD_REQUEST,
            RouteError::NoShift(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Response::new(Body::empty()) }))
        //
        // profile-related routes
        .route("/profile/{id}", get(get_profile).post(update_profile))
        .route("/profile/{id}/report", post(submit_report))
        .route("/profile/{id}/purchase", post(purchase_item))
        .route("/profile/{id}/equip", post(equip_item))
        .route("/profile/{id}/inbox", get(drain_inbox))
        .route("/profile/{id}/notify", post(send_notification))
        .route("/profile/{id}/adjust", post(adjust_score))
        .route("/profile/{id}/penalty-check", post(penalty_check))
        //
        // community + ranking
        .route("/messages", get(recent_messages).post(post_message))
        .route("/leaderboard", get(group_totals))
        .route("/leaderboard/{group}", get(group_leaderboard))
        //
        // static configuration
        .route("/store/catalog", get(store_catalog))
        .route("/shift/{group}/{handle}", get(shift_lookup))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[instrument(skip(state))]
pub async fn start_server(
    state: Arc<AppState>,
    port: u16,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    info!(%local, "api server listening");

    let app = router(state);
    let handle = tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app).await {
            tracing::error!(%error, "api server stopped");
        }
    });

    Ok((local, handle))
}
