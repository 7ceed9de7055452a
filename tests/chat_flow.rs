//! End-to-end relay scenario driven through `ChatService`, with channel
//! receivers standing in for the WebSocket pusher loops.
//!
//! Scenario: alice joins an empty room, speaks, bob joins late and is
//! replayed the history, bob speaks, alice leaves.

use std::sync::Arc;

use tokio::sync::mpsc;

use spchat_rs::common::time::FixedClock;
use spchat_rs::domain::{ClientId, MessageClass, MessageStore, RenderedMessage};
use spchat_rs::infrastructure::store::InMemoryMessageStore;
use spchat_rs::relay::{ChatService, SessionProtocol};

fn client(id: &str) -> ClientId {
    ClientId::new(id.to_string()).unwrap()
}

async fn join(
    service: &ChatService,
    id: &str,
) -> (SessionProtocol, mpsc::UnboundedReceiver<RenderedMessage>) {
    let mut session = service.open_session(client(id));
    let (tx, rx) = mpsc::unbounded_channel();
    session.connect(tx).await;
    session.sync().await.unwrap();
    (session, rx)
}

#[tokio::test]
async fn test_full_room_scenario() {
    // テスト項目: 空の部屋への参加 → 発言 → 後続参加者への履歴リプレイ →
    //             相互のライブ配信 → 退室通知、の一連の流れ
    let store = Arc::new(InMemoryMessageStore::new());
    let service = ChatService::with_clock(store.clone(), Arc::new(FixedClock::new(1000)));

    // alice が空の部屋に参加する: 同期では何も届かない
    let (mut alice, mut alice_rx) = join(&service, "alice").await;
    assert!(alice_rx.try_recv().is_err());

    // alice が発言する: ストアに 1 件、alice には self エコーのみ
    alice.handle_message("hi".to_string()).await;

    let stored = store.scan_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender.as_str(), "alice");
    assert_eq!(stored[0].body, "hi");

    let echo = alice_rx.recv().await.unwrap();
    assert_eq!(echo.class, MessageClass::Own);
    assert_eq!(echo.body, "hi");
    assert!(alice_rx.try_recv().is_err()); // alone in the room, no fan-out

    // bob が後から参加する: 同期で "hi" が peer としてリプレイされる
    let (mut bob, mut bob_rx) = join(&service, "bob").await;
    let replayed = bob_rx.recv().await.unwrap();
    assert_eq!(replayed.class, MessageClass::Peer);
    assert_eq!(replayed.sender, Some(client("alice")));
    assert_eq!(replayed.body, "hi");
    assert!(bob_rx.try_recv().is_err());

    // bob が発言する: レコード 2 件目、bob に self、alice に peer
    bob.handle_message("hello".to_string()).await;

    let stored = store.scan_all().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].sender.as_str(), "bob");
    assert_eq!(stored[1].body, "hello");
    assert!(stored[0].id < stored[1].id);

    let echo = bob_rx.recv().await.unwrap();
    assert_eq!(echo.class, MessageClass::Own);
    assert_eq!(echo.body, "hello");

    let fanout = alice_rx.recv().await.unwrap();
    assert_eq!(fanout.class, MessageClass::Peer);
    assert_eq!(fanout.sender, Some(client("bob")));
    assert_eq!(fanout.body, "hello");

    // alice が退室する: bob に server notice、レジストリから alice が消える
    alice.close().await;

    let notice = bob_rx.recv().await.unwrap();
    assert_eq!(notice.class, MessageClass::ServerNotice);
    assert_eq!(notice.body, "Client @alice left the room");

    assert!(!service.registry().contains(&client("alice")).await);
    assert!(service.registry().contains(&client("bob")).await);
}
