mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{
    admin_client, json_body, login, register, session_client, spawn_server, spawn_server_with,
    ServerOptions,
};

#[tokio::test]
async fn gated_routes_need_a_session() -> Result<()> {
    let server = spawn_server().await?;
    let anonymous = reqwest::Client::new();

    let requests = [
        anonymous.post(server.url("/api/clients")).json(&json!({})),
        anonymous.put(server.url("/api/clients/x")).json(&json!({})),
        anonymous.delete(server.url("/api/clients/x")),
        anonymous.post(server.url("/api/projects")),
        anonymous.delete(server.url("/api/projects/x")),
        anonymous.get(server.url("/api/contacts")),
        anonymous.get(server.url("/api/subscribers")),
        anonymous.get(server.url("/api/auth/users")),
    ];

    for request in requests {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", res.url());
        assert_eq!(json_body(res).await?["code"], "UNAUTHENTICATED");
    }

    // Public surface stays open
    for path in ["/", "/api/clients", "/api/projects"] {
        let res = anonymous.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn editors_cannot_manage_users() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let editor = session_client()?;
    let res = register(&editor, &server, "eddie", "password123", "editor").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let eddie_id = json_body(res).await?["_id"].as_str().unwrap_or_default().to_string();
    login(&editor, &server, "eddie", "password123").await?;

    // Editors may write content...
    let res = editor
        .post(server.url("/api/clients"))
        .json(&json!({ "name": "Acme", "designation": "CEO" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // ...but not touch user management
    let res = editor.get(server.url("/api/auth/users")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(res).await?["code"], "FORBIDDEN");

    let users = json_body(admin.get(server.url("/api/auth/users")).send().await?).await?;
    assert_eq!(users.as_array().map(Vec::len), Some(2));

    let res = admin
        .put(server.url(&format!("/api/auth/users/{}", eddie_id)))
        .json(&json!({ "role": "admin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Role changes apply to the live session on the next request
    let res = editor.get(server.url("/api/auth/users")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = admin
        .delete(server.url(&format!("/api/auth/users/{}", eddie_id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = editor.get(server.url("/api/auth/check")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn public_registration_cannot_claim_admin() -> Result<()> {
    let server = spawn_server().await?;
    admin_client(&server).await?;

    let mallory = session_client()?;
    let res = register(&mallory, &server, "mallory", "password123", "admin").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await?["role"], "editor");

    let res = login(&mallory, &server, "mallory", "password123").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = mallory.get(server.url("/api/auth/users")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // An editor session is no better than none when picking a role
    let res = register(&mallory, &server, "mallory2", "password123", "admin").await?;
    assert_eq!(json_body(res).await?["role"], "editor");
    Ok(())
}

#[tokio::test]
async fn admin_session_chooses_role_on_register() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let res = register(&admin, &server, "second-admin", "password123", "admin").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await?["role"], "admin");

    let res = admin
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": "defaulted", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(json_body(res).await?["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn closed_registration_requires_admin() -> Result<()> {
    let server = spawn_server_with(ServerOptions {
        open_registration: false,
        ..Default::default()
    })
    .await?;

    let anonymous = session_client()?;
    let res = register(&anonymous, &server, "mallory", "password123", "admin").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = login(&anonymous, &server, "mallory", "password123").await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let admin = admin_client(&server).await?;
    let res = register(&admin, &server, "eddie", "password123", "editor").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await?["role"], "editor");
    Ok(())
}
