//! In-process mock of the collaboration backend.
//!
//! Serves the same routes as the real service with in-memory state. Users are
//! numbered `u-1, u-2, ...`, invitations `inv-1, inv-2, ...`, projects get
//! UUIDs. Errors are plain-text bodies ("User not found", "Invitation already
//! exists") with the matching status code.

pub mod error;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub use error::ServerError;
pub use model::{Invitation, Me, Member, Project, TokenView, UserView};
pub use store::Store;

use model::{InvitationInput, LoginInput, MemberInput, ProjectInput, ProjectQuery, RegisterInput, RoleInput};

pub type Db = Arc<RwLock<Store>>;

type Reply<T> = Result<T, ServerError>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/members", get(list_members).post(add_member))
        .route(
            "/api/projects/{id}/members/{user_id}",
            put(update_member_role).delete(remove_member),
        )
        .route(
            "/api/projects/{id}/invitations",
            get(project_invitations).post(send_invitation),
        )
        .route(
            "/api/projects/{id}/invitations/{invitation_id}",
            axum::routing::delete(cancel_invitation),
        )
        .route("/api/invitations", get(my_invitations))
        .route("/api/invitations/{id}/accept", post(accept_invitation))
        .route("/api/invitations/{id}/reject", post(reject_invitation))
        .route("/api/users/by-email/{email}", get(user_by_email))
        .route("/api/users/{id}", get(get_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

async fn caller(db: &Db, headers: &HeaderMap) -> Reply<String> {
    let store = db.read().await;
    store.authenticate(bearer(headers))
}

// --- auth -------------------------------------------------------------------

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply<Json<TokenView>> {
    let reply = db.write().await.login(input);
    reply.map(Json)
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Reply<Json<TokenView>> {
    let token = db.write().await.register(input)?;
    tracing::info!("account registered");
    Ok(Json(token))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply<Json<Me>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.read().await.me(&caller);
    reply.map(Json)
}

// --- projects ---------------------------------------------------------------

async fn list_projects(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ProjectQuery>,
) -> Reply<Json<Vec<Project>>> {
    let caller = caller(&db, &headers).await?;
    let owner_id = query.owner_id.unwrap_or(caller);
    let projects = db.read().await.list_projects(&owner_id);
    Ok(Json(projects))
}

async fn create_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProjectInput>,
) -> Reply<(StatusCode, Json<Project>)> {
    let caller = caller(&db, &headers).await?;
    let project = db.write().await.create_project(&caller, input)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply<Json<Project>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.read().await.get_project(&caller, &id);
    reply.map(Json)
}

async fn update_project(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProjectInput>,
) -> Reply<StatusCode> {
    let caller = caller(&db, &headers).await?;
    db.write().await.update_project(&caller, &id, input)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_project(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply<StatusCode> {
    let caller = caller(&db, &headers).await?;
    db.write().await.delete_project(&caller, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- members ----------------------------------------------------------------

async fn list_members(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply<Json<Vec<Member>>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.read().await.list_members(&caller, &id);
    reply.map(Json)
}

async fn add_member(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<MemberInput>,
) -> Reply<(StatusCode, Json<Member>)> {
    let caller = caller(&db, &headers).await?;
    let member = db.write().await.add_member(&caller, &id, input)?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn update_member_role(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, user_id)): Path<(String, String)>,
    Json(input): Json<RoleInput>,
) -> Reply<Json<Member>> {
    let caller = caller(&db, &headers).await?;
    let member = db
        .write()
        .await
        .update_member_role(&caller, &id, &user_id, &input.role)?;
    Ok(Json(member))
}

async fn remove_member(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, user_id)): Path<(String, String)>,
) -> Reply<StatusCode> {
    let caller = caller(&db, &headers).await?;
    db.write().await.remove_member(&caller, &id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- invitations ------------------------------------------------------------

async fn send_invitation(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<InvitationInput>,
) -> Reply<(StatusCode, Json<Invitation>)> {
    let caller = caller(&db, &headers).await?;
    let invitation = db.write().await.send_invitation(&caller, &id, input)?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

async fn project_invitations(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<Vec<Invitation>>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.read().await.project_invitations(&caller, &id);
    reply.map(Json)
}

async fn cancel_invitation(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, invitation_id)): Path<(String, String)>,
) -> Reply<StatusCode> {
    let caller = caller(&db, &headers).await?;
    db.write().await.cancel_invitation(&caller, &id, &invitation_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn my_invitations(State(db): State<Db>, headers: HeaderMap) -> Reply<Json<Vec<Invitation>>> {
    let caller = caller(&db, &headers).await?;
    let invitations = db.read().await.my_invitations(&caller);
    Ok(Json(invitations))
}

async fn accept_invitation(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<Invitation>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.write().await.respond(&caller, &id, true);
    reply.map(Json)
}

async fn reject_invitation(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Json<Invitation>> {
    let caller = caller(&db, &headers).await?;
    let reply = db.write().await.respond(&caller, &id, false);
    reply.map(Json)
}

// --- users ------------------------------------------------------------------

async fn user_by_email(State(db): State<Db>, headers: HeaderMap, Path(email): Path<String>) -> Reply<Json<UserView>> {
    caller(&db, &headers).await?;
    let reply = db.read().await.user_by_email(&email);
    reply.map(Json)
}

async fn get_user(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Reply<Json<UserView>> {
    caller(&db, &headers).await?;
    let reply = db.read().await.user(&id);
    reply.map(Json)
}
