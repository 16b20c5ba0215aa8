use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::server::{AppState, JsonResult, RouteError};
use crate::catalog::{self, Catalog, StoreItem};
use crate::econ::ledger::{GroupTotal, LeaderboardEntry};
use crate::econ::profiles::{EquipAction, ProfilePatch};
use crate::econ::purchase::PurchaseReceipt;
use crate::econ::rank::{self, RankTier};
use crate::econ::report::ReportReceipt;
use crate::model::{GroupId, ItemId, Message, UserId, UserProfile};

#[derive(Debug, Serialize)]
pub struct RankView {
    pub tier: RankTier,
    pub label: &'static str,
    pub ordinal: u8,
}

impl From<RankTier> for RankView {
    fn from(tier: RankTier) -> Self {
        Self {
            tier,
            label: tier.label(),
            ordinal: tier.ordinal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub score: f64,
    pub rank: RankView,
    pub group_total: f64,
}

fn profile_view(state: &AppState, id: &UserId, profile: UserProfile) -> ProfileView {
    let score = state.ledger.score(id);
    let group_total = id
        .group()
        .map(|group| state.ledger.group_total(&group))
        .unwrap_or(0.0);
    ProfileView {
        profile,
        score,
        rank: rank::resolve(score).into(),
        group_total,
    }
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> JsonResult<ProfileView> {
    let id = UserId::from(id);
    let profile = state.profiles.get_or_create(&id);
    Ok(Json(profile_view(&state, &id, profile)))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> JsonResult<ProfileView> {
    let id = UserId::from(id);
    let profile = state.profiles.update(&id, &patch);
    Ok(Json(profile_view(&state, &id, profile)))
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub count: u8,
}

#[instrument(skip(state))]
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> JsonResult<ReportReceipt> {
    let id = UserId::from(id);
    let receipt = state
        .reports
        .submit(&id, Utc::now().date_naive(), req.count)?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub item_id: ItemId,
}

#[instrument(skip(state))]
pub async fn purchase_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ItemRequest>,
) -> JsonResult<PurchaseReceipt> {
    let receipt = state.purchase.purchase(&UserId::from(id), &req.item_id)?;
    Ok(Json(receipt))
}

#[derive(Debug, Serialize)]
pub struct EquipResponse {
    pub action: EquipAction,
}

#[instrument(skip(state))]
pub async fn equip_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ItemRequest>,
) -> JsonResult<EquipResponse> {
    let action = state.profiles.equip(&UserId::from(id), &req.item_id)?;
    Ok(Json(EquipResponse { action }))
}

#[instrument(skip(state))]
pub async fn drain_inbox(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> JsonResult<Vec<String>> {
    Ok(Json(state.inbox.drain_all(&UserId::from(id))))
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub message: String,
}

#[instrument(skip(state, req))]
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<NotifyRequest>,
) -> JsonResult<()> {
    state.inbox.send(&UserId::from(id), req.message);
    Ok(Json(()))
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub new_balance: f64,
}

/// Admin score adjustment: credit or debit, with an optional inbox note so
/// the user learns why their balance moved.
#[instrument(skip(state, req))]
pub async fn adjust_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustRequest>,
) -> JsonResult<AdjustResponse> {
    let id = UserId::from(id);
    let new_balance = state.ledger.add_score(&id, req.amount);
    if let Some(note) = req.note {
        state.inbox.send(&id, note);
    }
    Ok(Json(AdjustResponse { new_balance }))
}

#[derive(Debug, Serialize)]
pub struct PenaltyResponse {
    pub punished: bool,
    pub new_balance: f64,
}

#[instrument(skip(state))]
pub async fn penalty_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> JsonResult<PenaltyResponse> {
    let id = UserId::from(id);
    let outcome = state.penalty.check(&id, Utc::now().date_naive());
    Ok(Json(PenaltyResponse {
        punished: outcome.punished(),
        new_balance: state.ledger.score(&id),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MessageWindow {
    #[serde(default = "default_window")]
    pub limit: usize,
}

fn default_window() -> usize {
    50
}

#[instrument(skip(state))]
pub async fn recent_messages(
    Query(window): Query<MessageWindow>,
    State(state): State<Arc<AppState>>,
) -> JsonResult<Vec<Message>> {
    Ok(Json(state.board.recent(window.limit)))
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub author: UserId,
    pub text: String,
}

#[instrument(skip(state, req))]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PostMessageRequest>,
) -> JsonResult<Message> {
    Ok(Json(state.board.post(req.author, req.text)))
}

#[instrument(skip(state))]
pub async fn group_totals(State(state): State<Arc<AppState>>) -> JsonResult<Vec<GroupTotal>> {
    Ok(Json(state.ledger.group_totals()))
}

#[instrument(skip(state))]
pub async fn group_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> JsonResult<Vec<LeaderboardEntry>> {
    Ok(Json(state.ledger.group_leaderboard(&GroupId::from(group))))
}

#[instrument]
pub async fn store_catalog() -> JsonResult<Vec<StoreItem>> {
    Ok(Json(Catalog::global().items().to_vec()))
}

#[derive(Debug, Serialize)]
pub struct ShiftView {
    pub shift: String,
    pub minutes_until: Option<i64>,
}

#[instrument]
pub async fn shift_lookup(
    Path((group, handle)): Path<(String, String)>,
) -> JsonResult<ShiftView> {
    let group = GroupId::from(group);
    let shift = catalog::shifts::shift_for(&group, &handle)
        .ok_or_else(|| RouteError::NoShift(format!("{group}::{handle}")))?;

    Ok(Json(ShiftView {
        shift: shift.to_string(),
        minutes_until: catalog::shifts::minutes_until(shift, Utc::now().time()),
    }))
}
