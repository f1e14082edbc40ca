//! End-to-end scenarios against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port and drives it
//! through `CollabApi` with the bundled ureq transport, so request building,
//! bearer handling, tolerant decoding and the screen flows are all exercised
//! over real HTTP.

use std::sync::{mpsc, Arc};
use std::time::Duration;

use collab_core::flows::{self, InvitationCard, ProjectForm};
use collab_core::{
    ApiError, ClientConfig, CollabApi, Dispatcher, Feedback, InvitationStatus, Liveness, Poll,
    Resource, Role, UserCache, Visibility,
};

fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn api(base: &str) -> CollabApi {
    CollabApi::from_config(&ClientConfig::new(base)).unwrap()
}

/// Register an account and return its signed-in client and user id.
fn sign_up(base: &str, email: &str, login: &str, name: &str) -> (CollabApi, String) {
    let api = api(base);
    let request = flows::validate_registration(email, "secret12", name, login).unwrap();
    api.register(&request).unwrap();
    let me = api.current_user().unwrap();
    (api, me.sub)
}

fn project(api: &CollabApi, owner_id: &str) -> String {
    let form = ProjectForm {
        name: "Atlas".into(),
        description: String::new(),
        visibility: Visibility::Private,
    };
    api.create_project(&form.create_spec(owner_id).unwrap()).unwrap().id
}

#[test]
fn register_then_login_and_me() {
    let base = spawn_server();
    let (alice, _) = sign_up(&base, "alice@example.com", "alice", "Alice");
    alice.logout();
    assert!(!alice.is_signed_in());

    alice.login("alice", "secret12").unwrap();
    assert!(alice.is_signed_in());
    let me = alice.current_user().unwrap();
    assert_eq!(me.sub, "u-1");
    assert_eq!(me.email.as_deref(), Some("alice@example.com"));
    assert_eq!(me.name.as_deref(), Some("Alice"));
}

#[test]
fn session_survives_in_file_store() {
    let base = spawn_server();
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(&base).with_session_file(dir.path().join("session.json"));

    let first = CollabApi::from_config(&config).unwrap();
    let request = flows::validate_registration("alice@example.com", "secret12", "", "alice").unwrap();
    first.register(&request).unwrap();

    let second = CollabApi::from_config(&config).unwrap();
    assert!(second.is_signed_in());
    assert_eq!(second.current_user().unwrap().sub, "u-1");
}

#[test]
fn rejected_token_clears_session() {
    let base = spawn_server();
    let api = api(&base);
    api.session().save("forged").unwrap();

    let err = api.list_projects("u-1").unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(!api.is_signed_in());
    assert!(Feedback::from_error(&err, Resource::Project).requires_login());
}

#[test]
fn bad_login_is_unauthorized() {
    let base = spawn_server();
    let (alice, _) = sign_up(&base, "alice@example.com", "alice", "");
    alice.logout();
    assert_eq!(alice.login("alice", "wrong-pw").unwrap_err(), ApiError::Unauthorized);
    assert!(!alice.is_signed_in());
}

#[test]
fn duplicate_registration_names_the_account() {
    let base = spawn_server();
    sign_up(&base, "alice@example.com", "alice", "Alice");

    let again = api(&base);
    let request = flows::validate_registration("alice@example.com", "secret12", "", "alice2").unwrap();
    let err = again.register(&request).unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(
        Feedback::from_error(&err, Resource::User).message(),
        "An account with this email already exists"
    );
    assert!(!again.is_signed_in());
}

#[test]
fn project_lifecycle() {
    let base = spawn_server();
    let (alice, me) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let id = project(&alice, &me);

    let listed = alice.list_projects(&me).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Atlas");
    assert_eq!(listed[0].description_text(), None);
    assert!(listed[0].created_at.is_some());

    let fetched = alice.get_project(&id).unwrap();
    let mut form = ProjectForm::from_project(&fetched);
    assert_eq!(form.description, "");
    form.description = "Maps of the world".into();
    form.visibility = Visibility::Public;
    alice.update_project(&id, &form.update_spec(&fetched).unwrap()).unwrap();

    let updated = alice.get_project(&id).unwrap();
    assert_eq!(updated.description_text(), Some("Maps of the world"));
    assert_eq!(updated.visibility, Visibility::Public);

    alice.delete_project(&id).unwrap();
    let err = alice.get_project(&id).unwrap_err();
    assert_eq!(Feedback::from_error(&err, Resource::Project), Feedback::ProjectNotFound);
}

#[test]
fn invite_unknown_email_reports_user_not_found() {
    let base = spawn_server();
    let (alice, me) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let id = project(&alice, &me);

    let err = flows::invite_by_email(&alice, &id, "ghost@example.com", Role::Editor).unwrap_err();
    assert_eq!(Feedback::from_error(&err, Resource::Invitation), Feedback::UserNotFound);
    assert!(alice.list_project_invitations(&id).unwrap().is_empty());
}

#[test]
fn invitation_accept_flow() {
    let base = spawn_server();
    let (alice, alice_id) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let (bob, bob_id) = sign_up(&base, "bob@example.com", "bob", "Bob");
    let id = project(&alice, &alice_id);

    let sent = flows::invite_by_email(&alice, &id, " bob@example.com ", Role::Editor).unwrap();
    assert_eq!(sent.id, "inv-1");
    assert_eq!(sent.invited_user_id, bob_id);

    let err = flows::invite_by_email(&alice, &id, "bob@example.com", Role::Viewer).unwrap_err();
    assert_eq!(
        Feedback::from_error(&err, Resource::Invitation),
        Feedback::AlreadyExists(Resource::Invitation)
    );

    let mut cards: Vec<InvitationCard> = bob
        .list_my_invitations()
        .unwrap()
        .into_iter()
        .map(InvitationCard::new)
        .collect();
    assert_eq!(cards.len(), 1);
    assert!(cards[0].actions_visible());
    cards[0].accept(&bob).unwrap();
    assert_eq!(cards[0].invitation.status, InvitationStatus::Accepted);
    assert!(!cards[0].actions_visible());

    let members = bob.list_members(&id).unwrap();
    assert!(members.iter().any(|m| m.user_id == bob_id && m.role == Role::Editor));

    let mut projects = bob.list_projects(&bob_id).unwrap();
    flows::attach_roles(&bob, &mut projects, &bob_id).unwrap();
    assert_eq!(projects[0].role, Some(Role::Editor));
}

#[test]
fn reject_and_cancel_invitations() {
    let base = spawn_server();
    let (alice, alice_id) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let (bob, _) = sign_up(&base, "bob@example.com", "bob", "Bob");
    sign_up(&base, "carol@example.com", "carol", "Carol");
    let id = project(&alice, &alice_id);

    flows::invite_by_email(&alice, &id, "bob@example.com", Role::Viewer).unwrap();
    let rejected = bob.reject_invitation("inv-1").unwrap();
    assert_eq!(rejected.status, InvitationStatus::Rejected);

    flows::invite_by_email(&alice, &id, "carol@example.com", Role::Viewer).unwrap();
    alice.cancel_invitation(&id, "inv-2").unwrap();

    let remaining = alice.list_project_invitations(&id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].status, InvitationStatus::Rejected);
}

#[test]
fn member_management_and_failed_removal_reload() {
    let base = spawn_server();
    let (alice, alice_id) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let (_, bob_id) = sign_up(&base, "bob@example.com", "bob", "Bob");
    let id = project(&alice, &alice_id);

    let added = flows::add_member(&alice, &id, &bob_id, Role::Viewer).unwrap();
    assert_eq!(added.role, Role::Viewer);
    let updated = alice.update_member_role(&id, &bob_id, Role::Editor).unwrap();
    assert_eq!(updated.role, Role::Editor);

    let removal = flows::remove_member(&alice, &id, &alice_id);
    assert!(matches!(removal.outcome, Err(ApiError::Http { status: 400, .. })));
    assert!(removal.reload);

    let removal = flows::remove_member(&alice, &id, &bob_id);
    assert!(removal.outcome.is_ok());
    assert!(removal.reload);
    assert_eq!(alice.list_members(&id).unwrap().len(), 1);
}

#[test]
fn unreachable_server_is_a_network_error_without_reload() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let api = api(&base);
    api.session().save("t").unwrap();
    let removal = flows::remove_member(&api, "p-1", "u-2");
    assert!(!removal.reload);
    let err = removal.outcome.unwrap_err();
    assert_eq!(Feedback::from_error(&err, Resource::Member), Feedback::NetworkError);
    assert!(api.is_signed_in());
}

#[test]
fn user_cache_resolves_through_dispatcher() {
    let base = spawn_server();
    let (alice, _) = sign_up(&base, "alice@example.com", "alice", "Alice");
    let (_, bob_id) = sign_up(&base, "bob@example.com", "bob", "Bob");

    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = Dispatcher::new(rt.handle().clone());
    let liveness = Liveness::new();
    let cache = Arc::new(UserCache::new());

    let (tx, rx) = mpsc::channel();
    cache.subscribe(move |id, display| {
        tx.send((id.to_string(), display.to_string())).unwrap();
    });

    assert_eq!(cache.request(&bob_id, &alice, &dispatcher, &liveness), Poll::Pending);
    assert_eq!(cache.request(&bob_id, &alice, &dispatcher, &liveness), Poll::Pending);
    assert_eq!(cache.request("u-404", &alice, &dispatcher, &liveness), Poll::Pending);

    let mut heard = vec![
        rx.recv_timeout(Duration::from_secs(10)).unwrap(),
        rx.recv_timeout(Duration::from_secs(10)).unwrap(),
    ];
    heard.sort();
    assert_eq!(
        heard,
        vec![
            (bob_id.clone(), "Bob".to_string()),
            ("u-404".to_string(), "u-404".to_string()),
        ]
    );
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(cache.request(&bob_id, &alice, &dispatcher, &liveness), Poll::Ready("Bob".into()));
}
