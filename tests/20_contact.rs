mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{sample_contact, TestApp, ADMIN_EMAIL};

async fn send_contact(app: &TestApp, email: &str) -> Result<String> {
    let res = app.post("/api/contact/send", None, sample_contact(email)).await?;
    anyhow::ensure!(res.status == StatusCode::CREATED, "send failed: {}", res.body);
    Ok(res.body["contact"]["id"].as_str().context("contact id missing")?.to_string())
}

#[tokio::test]
async fn send_stores_a_new_contact() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let res = app.post("/api/contact/send", None, sample_contact("a@b.co")).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "Contact message sent successfully");
    assert_eq!(res.body["contact"]["email"], "a@b.co");
    assert_eq!(res.body["contact"]["subject"], "S");
    assert!(res.body["contact"].get("status").is_none());

    let res = app.get("/api/contact/all", Some(&token)).await?;
    assert_eq!(res.body["count"], 1);
    assert_eq!(res.body["contacts"][0]["status"], "new");
    assert_eq!(res.body["contacts"][0]["replies"], json!([]));
    Ok(())
}

#[tokio::test]
async fn send_ignores_server_owned_fields() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let mut body = sample_contact("a@b.co");
    body["status"] = json!("responded");
    body["replies"] = json!([{"message": "forged", "sentAt": "2024-01-01T00:00:00Z"}]);
    app.post("/api/contact/send", None, body).await?;

    let res = app.get("/api/contact/all", Some(&token)).await?;
    assert_eq!(res.body["contacts"][0]["status"], "new");
    assert_eq!(res.body["contacts"][0]["replies"], json!([]));
    Ok(())
}

#[tokio::test]
async fn send_validates_the_form() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post("/api/contact/send", None, json!({"name": "A", "email": "a@b.co"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "All fields are required");
    assert_eq!(res.body["field_errors"]["phone"], "This field is required");

    let res = app.post("/api/contact/send", None, sample_contact("not-an-email")).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Please provide a valid email");
    Ok(())
}

#[tokio::test]
async fn first_view_marks_contact_read() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;

    let res = app.get(&format!("/api/contact/{}", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["contact"]["status"], "read");

    let res = app.get(&format!("/api/contact/details/{}", id), Some(&token)).await?;
    assert_eq!(res.body["contact"]["status"], "read");
    assert_eq!(res.body["contact"]["id"], id.as_str());
    Ok(())
}

#[tokio::test]
async fn viewing_does_not_downgrade_responded() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;

    app.put(&format!("/api/contact/{}/reply", id), Some(&token), json!({"message": "hi"}))
        .await?;
    let res = app.get(&format!("/api/contact/{}", id), Some(&token)).await?;
    assert_eq!(res.body["contact"]["status"], "responded");
    Ok(())
}

#[tokio::test]
async fn reply_appends_and_marks_responded() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;

    let res = app
        .put(&format!("/api/contact/{}/reply", id), Some(&token), json!({"message": "thanks"}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Reply sent successfully");
    assert_eq!(res.body["contact"]["status"], "responded");
    let replies = res.body["contact"]["replies"].as_array().context("replies missing")?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["message"], "thanks");
    assert_eq!(replies[0]["adminName"], "Admin");
    assert_eq!(replies[0]["adminEmail"], ADMIN_EMAIL);
    assert!(replies[0]["sentAt"].is_string());

    let res = app
        .put(
            &format!("/api/contact/{}/reply", id),
            Some(&token),
            json!({"message": "again", "adminName": "Grace", "adminEmail": "grace@example.com"}),
        )
        .await?;
    let replies = res.body["contact"]["replies"].as_array().context("replies missing")?;
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1]["adminName"], "Grace");
    assert_eq!(replies[1]["adminEmail"], "grace@example.com");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_replies_are_all_kept() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;
    let path = format!("/api/contact/{}/reply", id);

    let tasks: Vec<_> = (0..50)
        .map(|n| {
            let (app, token, path) = (app.clone(), token.clone(), path.clone());
            tokio::spawn(async move {
                app.put(&path, Some(&token), json!({"message": format!("reply {}", n)})).await
            })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await??.status, StatusCode::OK);
    }

    let res = app.get(&format!("/api/contact/details/{}", id), Some(&token)).await?;
    let replies = res.body["contact"]["replies"].as_array().context("replies missing")?;
    assert_eq!(replies.len(), 50);
    for n in 0..50 {
        let message = format!("reply {}", n);
        assert!(replies.iter().any(|r| r["message"] == message.as_str()), "{} lost", message);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn viewing_while_replying_keeps_the_reply() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    for n in 0..10 {
        let id = send_contact(&app, &format!("u{}@b.co", n)).await?;
        let view = {
            let (app, token, id) = (app.clone(), token.clone(), id.clone());
            tokio::spawn(async move { app.get(&format!("/api/contact/{}", id), Some(&token)).await })
        };
        let reply = {
            let (app, token, id) = (app.clone(), token.clone(), id.clone());
            tokio::spawn(async move {
                app.put(&format!("/api/contact/{}/reply", id), Some(&token), json!({"message": "hi"}))
                    .await
            })
        };
        assert_eq!(view.await??.status, StatusCode::OK);
        assert_eq!(reply.await??.status, StatusCode::OK);

        let res = app.get(&format!("/api/contact/details/{}", id), Some(&token)).await?;
        assert_eq!(res.body["contact"]["status"], "responded");
        assert_eq!(res.body["contact"]["replies"].as_array().map(Vec::len), Some(1));
    }
    Ok(())
}

#[tokio::test]
async fn reply_requires_a_message() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;

    let res = app.put(&format!("/api/contact/{}/reply", id), Some(&token), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Contact ID and message are required");

    let res = app
        .put(&format!("/api/contact/{}/reply", Uuid::new_v4()), Some(&token), json!({"message": "x"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Contact not found");
    Ok(())
}

#[tokio::test]
async fn status_update_accepts_only_known_values() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;
    let path = format!("/api/contact/{}/status", id);

    let res = app.put(&path, Some(&token), json!({"status": "responded"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["contact"]["status"], "responded");

    let res = app.put(&path, Some(&token), json!({"status": "new"})).await?;
    assert_eq!(res.body["contact"]["status"], "new");

    let res = app.put(&path, Some(&token), json!({"status": "archived"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid status");

    let res = app.put(&path, Some(&token), json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn stats_count_by_status() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let first = send_contact(&app, "a@b.co").await?;
    let second = send_contact(&app, "b@b.co").await?;
    send_contact(&app, "c@b.co").await?;

    app.get(&format!("/api/contact/{}", first), Some(&token)).await?;
    app.put(&format!("/api/contact/{}/reply", second), Some(&token), json!({"message": "ok"}))
        .await?;

    let res = app.get("/api/contact/stats/all", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body["stats"],
        json!({"totalContacts": 3, "newContacts": 1, "readContacts": 1, "respondedContacts": 1})
    );
    Ok(())
}

#[tokio::test]
async fn conversation_filters_by_sender() -> Result<()> {
    let app = TestApp::spawn().await?;
    send_contact(&app, "a@b.co").await?;
    send_contact(&app, "a@b.co").await?;
    send_contact(&app, "other@b.co").await?;

    let res = app.get("/api/contact/user/a@b.co", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);
    let contacts = res.body["contacts"].as_array().context("contacts missing")?;
    assert!(contacts.iter().all(|c| c["email"] == "a@b.co"));

    let res = app.get("/api/contact/user/nobody@b.co", None).await?;
    assert_eq!(res.body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn delete_contact() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let id = send_contact(&app, "a@b.co").await?;

    let res = app.delete(&format!("/api/contact/{}", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Contact deleted successfully");
    assert_eq!(res.body["contact"]["id"], id.as_str());

    let res = app.delete(&format!("/api/contact/{}", id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get("/api/contact/not-a-uuid", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Contact not found");
    Ok(())
}
