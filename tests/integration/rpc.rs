/// End-to-end JSON-RPC sessions against an in-memory engine
use habit_streak_engine::rpc::RpcServer;
use habit_streak_engine::*;
use serde_json::{json, Value};

use crate::common::day;

fn server_on(today: &str) -> RpcServer {
    let store = SqliteStore::open_in_memory().expect("Failed to open in-memory store");
    RpcServer::new(HabitEngine::new(store, Box::new(FixedClock::on(day(today))), Box::new(HabitCap::new(2))))
}

struct Session {
    server: RpcServer,
    next_id: u64,
}

impl Session {
    async fn call(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let line = json!({"jsonrpc": "2.0", "id": self.next_id, "method": method, "params": params}).to_string();
        let response = self.server.process_line(&line).await.expect("Expected a response");
        let response = serde_json::to_value(response).unwrap();
        assert_eq!(response["id"], json!(self.next_id));
        response
    }

    async fn ok(&mut self, method: &str, params: Value) -> Value {
        let response = self.call(method, params).await;
        assert_eq!(response["result"]["ok"], json!(true), "{} -> {}", method, response);
        response["result"]["data"].clone()
    }

    async fn create(&mut self, name: &str) -> String {
        let habit = self
            .ok(
                "habit.create",
                json!({"user_id": "alice", "name": name, "weekly_frequency": 7, "start_date": "2024-01-01"}),
            )
            .await;
        habit["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_full_session() {
    let mut session = Session {
        server: server_on("2024-01-05"),
        next_id: 0,
    };
    let read = session.create("Read").await;
    let walk = session.create("Walk").await;

    // Cap of two active habits
    let refused = session
        .call("habit.create", json!({"user_id": "alice", "name": "Swim", "weekly_frequency": 2}))
        .await;
    assert_eq!(refused["result"], json!({"ok": false, "reason": "limit_reached"}));

    for d in ["2024-01-03", "2024-01-04"] {
        session
            .ok("completion.toggle", json!({"user_id": "alice", "habit_id": read, "day": d}))
            .await;
    }
    // No day means today
    let today = session
        .ok("completion.toggle", json!({"user_id": "alice", "habit_id": read, "note": "chapter 3"}))
        .await;
    assert_eq!(today["day"], json!("2024-01-05"));
    assert_eq!(today["streak_count"], json!(3));

    let streak = session
        .ok("streak.current", json!({"user_id": "alice", "habit_id": read}))
        .await;
    assert_eq!(streak["current_streak"], json!(3));

    let history = session
        .ok("completion.list", json!({"user_id": "alice", "habit_id": read, "from": "2024-01-04"}))
        .await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[1]["note"], json!("chapter 3"));

    session.ok("favorite.toggle", json!({"user_id": "alice", "habit_id": read})).await;
    session.ok("favorite.toggle", json!({"user_id": "alice", "habit_id": walk})).await;
    let reordered = session
        .ok("favorite.reorder", json!({"user_id": "alice", "habit_id": walk, "new_position": 0}))
        .await;
    assert_eq!(reordered["favorite_order"], json!(1));
    assert_eq!(reordered["ordering"], json!([walk.clone(), read.clone()]));

    let listed = session.ok("habit.list", json!({"user_id": "alice"})).await;
    assert_eq!(listed[0]["name"], json!("Walk"));

    let stats = session.ok("stats.habit", json!({"user_id": "alice", "habit_id": read})).await;
    assert_eq!(stats["total_completions"], json!(3));
    assert_eq!(stats["current_streak"], json!(3));

    let overall = session.ok("stats.user", json!({"user_id": "alice"})).await;
    assert_eq!(overall["active_habits"], json!(2));
    assert_eq!(overall["completions_today"], json!(1));
}

#[tokio::test]
async fn test_archive_update_restore_session() {
    let mut session = Session {
        server: server_on("2024-01-05"),
        next_id: 0,
    };
    let read = session.create("Read").await;

    let updated = session
        .ok(
            "habit.update",
            json!({"user_id": "alice", "habit_id": read, "name": "Read fiction", "description": "Before bed"}),
        )
        .await;
    assert_eq!(updated["name"], json!("Read fiction"));
    assert_eq!(updated["description"], json!("Before bed"));

    session.ok("habit.archive", json!({"user_id": "alice", "habit_id": read})).await;
    let archived = session
        .call("completion.toggle", json!({"user_id": "alice", "habit_id": read, "day": "2024-01-05"}))
        .await;
    assert_eq!(archived["result"], json!({"ok": false, "reason": "habit_archived"}));

    let active = session.ok("habit.list", json!({"user_id": "alice"})).await;
    assert!(active.as_array().unwrap().is_empty());
    let everything = session
        .ok("habit.list", json!({"user_id": "alice", "include_archived": true}))
        .await;
    assert_eq!(everything.as_array().unwrap().len(), 1);

    session.ok("habit.restore", json!({"user_id": "alice", "habit_id": read})).await;
    session
        .ok("completion.toggle", json!({"user_id": "alice", "habit_id": read, "day": "2024-01-05"}))
        .await;
}

#[test]
fn test_protocol_errors() {
    let mut session = Session {
        server: server_on("2024-01-05"),
        next_id: 0,
    };

    tokio_test::block_on(async {
        let bad_day = session
            .call("completion.list", json!({"user_id": "alice", "habit_id": "x", "from": "yesterday"}))
            .await;
        assert_eq!(bad_day["result"]["ok"], json!(false));

        let missing = session.call("favorite.reorder", json!({"user_id": "alice"})).await;
        assert_eq!(missing["error"]["code"], json!(-32602));

        let old_version = session
            .server
            .process_line(r#"{"jsonrpc":"1.0","id":7,"method":"habit.list","params":{"user_id":"alice"}}"#)
            .await
            .unwrap();
        assert_eq!(old_version.error.unwrap().code, -32600);
    });
}
