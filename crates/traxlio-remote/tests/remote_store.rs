use serde_json::json;

use traxlio_remote::{RemoteConfig, RemoteError, RemoteStore, Session};
use traxlio_test_utils::{ACCESS_TOKEN, ANON_KEY, FakeBackend, Method, USER_ID};
use traxlio_types::{
    Activity, ActivityAction, ItemUpdate, NewBox, NewItem, NewRoom, ResourceKind, RoomUpdate,
    Share,
};

fn store_for(fake: &FakeBackend, user_id: &str) -> RemoteStore {
    let session = Session {
        user_id: user_id.into(),
        access_token: ACCESS_TOKEN.into(),
    };
    RemoteStore::new(&RemoteConfig::new(fake.url(), ANON_KEY), session).unwrap()
}

#[tokio::test]
async fn insert_and_fetch_roundtrip_through_rows() {
    let fake = FakeBackend::start().await;
    let store = store_for(&fake, USER_ID);

    let room = store
        .insert_room(&NewRoom {
            name: "Garage".into(),
            description: Some("cold".into()),
        })
        .await
        .unwrap();
    let storage_box = store
        .insert_box(&NewBox {
            room_id: room.id.clone(),
            name: "Tools".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let item = store
        .insert_item(
            &storage_box.id,
            &NewItem {
                name: "Drill".into(),
                tags: vec!["power".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(fake.rows("rooms")[0]["user_id"], USER_ID);
    assert_eq!(fake.rows("items")[0]["box_id"], storage_box.id.as_str());

    let doc = store.fetch_document().await.unwrap();
    assert_eq!(doc.rooms.len(), 1);
    assert_eq!(doc.rooms[0].description.as_deref(), Some("cold"));
    assert_eq!(doc.boxes[0].room_id, room.id);
    assert_eq!(doc.items[0].id, item.id);
    assert_eq!(doc.items[0].tags, ["power"]);
    assert_eq!(doc.items[0].quantity, 1);
}

#[tokio::test]
async fn queries_are_scoped_to_the_session_user() {
    let fake = FakeBackend::start().await;
    fake.seed(
        "rooms",
        vec![
            json!({"id": "r1", "user_id": USER_ID, "name": "Mine", "description": null,
                   "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}),
            json!({"id": "r2", "user_id": "someone-else", "name": "Theirs", "description": null,
                   "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}),
        ],
    );

    let doc = store_for(&fake, USER_ID).fetch_document().await.unwrap();
    let names: Vec<_> = doc.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Mine"]);

    // Deleting someone else's room is a silent no-op.
    store_for(&fake, USER_ID).delete_room("r2").await.unwrap();
    assert_eq!(fake.rows("rooms").len(), 2);
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let fake = FakeBackend::start().await;
    let store = store_for(&fake, USER_ID);
    let room = store
        .insert_room(&NewRoom {
            name: "Attic".into(),
            description: Some("dusty".into()),
        })
        .await
        .unwrap();

    store
        .update_room(
            &room.id,
            &RoomUpdate {
                name: Some("Loft".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let row = &fake.rows("rooms")[0];
    assert_eq!(row["name"], "Loft");
    assert_eq!(row["description"], "dusty");
    assert_ne!(row["updated_at"], row["created_at"]);
}

#[tokio::test]
async fn deleting_a_room_cascades_explicitly() {
    let fake = FakeBackend::start().await;
    let store = store_for(&fake, USER_ID);

    let room = store
        .insert_room(&NewRoom {
            name: "Garage".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let other = store
        .insert_room(&NewRoom {
            name: "Kitchen".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    for (room_id, name) in [(&room.id, "Tools"), (&room.id, "Paint"), (&other.id, "Pans")] {
        let storage_box = store
            .insert_box(&NewBox {
                room_id: room_id.clone(),
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .insert_item(
                &storage_box.id,
                &NewItem {
                    name: format!("{} item", name),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    store.delete_room(&room.id).await.unwrap();

    let doc = store.fetch_document().await.unwrap();
    assert_eq!(doc.rooms.len(), 1);
    assert_eq!(doc.boxes.len(), 1);
    assert_eq!(doc.boxes[0].name, "Pans");
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].name, "Pans item");

    let log = fake.request_log();
    let tail: Vec<_> = log
        .iter()
        .skip_while(|r| *r != "GET boxes")
        .take(4)
        .map(String::as_str)
        .collect();
    assert_eq!(tail, ["GET boxes", "DELETE items", "DELETE boxes", "DELETE rooms"]);
}

#[tokio::test]
async fn move_is_a_box_id_patch() {
    let fake = FakeBackend::start().await;
    let store = store_for(&fake, USER_ID);
    let item = store
        .insert_item(
            "b1",
            &NewItem {
                name: "Drill".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    store
        .update_item(&item.id, &ItemUpdate::move_to("b2"))
        .await
        .unwrap();

    let row = &fake.rows("items")[0];
    assert_eq!(row["box_id"], "b2");
    assert_eq!(row["name"], "Drill");
}

#[tokio::test]
async fn shares_and_activities() {
    let fake = FakeBackend::start().await;
    let store = store_for(&fake, USER_ID);

    let share = Share {
        id: "AbCdEfGhIjKlMnOpQrStUvWx".into(),
        kind: ResourceKind::Box,
        resource_id: "b1".into(),
        is_public: true,
        created_at: chrono::Utc::now(),
        expires_at: None,
    };
    let stored = store.insert_share(&share).await.unwrap();
    assert_eq!(stored.id, share.id);

    let found = store.find_share(&share.id).await.unwrap().unwrap();
    assert_eq!(found.kind, ResourceKind::Box);
    assert!(store.find_share("missing").await.unwrap().is_none());

    store
        .insert_activity(&Activity {
            id: String::new(),
            action: ActivityAction::Create,
            kind: ResourceKind::Box,
            resource_id: "b1".into(),
            resource_name: "Tools".into(),
            parent_name: Some("Garage".into()),
            timestamp: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let doc = store.fetch_document().await.unwrap();
    assert_eq!(doc.activities.len(), 1);
    assert_eq!(doc.activities[0].parent_name.as_deref(), Some("Garage"));
    assert!(!doc.activities[0].id.is_empty());

    store.delete_share(&share.id).await.unwrap();
    assert!(fake.rows("shares").is_empty());
}

#[tokio::test]
async fn server_errors_surface_as_api_errors() {
    let fake = FakeBackend::start().await;
    fake.fail("rooms", Method::GET);

    let err = store_for(&fake, USER_ID).fetch_document().await.unwrap_err();
    match err {
        RemoteError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "injected failure");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_key_is_rejected() {
    let fake = FakeBackend::start().await;
    let session = Session {
        user_id: USER_ID.into(),
        access_token: ACCESS_TOKEN.into(),
    };
    let store = RemoteStore::new(&RemoteConfig::new(fake.url(), "wrong"), session).unwrap();

    let err = store
        .insert_room(&NewRoom {
            name: "Garage".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Api { status: 401, .. }));
}
