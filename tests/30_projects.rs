mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;

use common::{admin_client, json_body, png_bytes, spawn_server, spawn_server_with, ServerOptions};

fn tower_a_form(image_len: usize) -> Result<Form> {
    let image = Part::bytes(png_bytes(image_len))
        .file_name("tower-a.png")
        .mime_str("image/png")?;
    Ok(Form::new()
        .text("projectName", "Tower A")
        .text("location", "City X")
        .text("category", "Residential")
        .text("ignoredField", "whatever")
        .part("image", image))
}

#[tokio::test]
async fn create_project_with_upload() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let res = admin
        .post(server.url("/api/projects"))
        .multipart(tower_a_form(10 * 1024)?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(res).await?;
    let id = created["_id"].as_str().unwrap_or_default().to_string();
    assert!(created["imageUrl"].is_string());

    let stored = server
        .media
        .get(created["imageUrl"].as_str().unwrap_or_default())
        .await;
    assert_eq!(stored.map(|img| img.bytes.len()), Some(10 * 1024));

    let fetched = json_body(reqwest::get(server.url(&format!("/api/projects/{}", id))).await?).await?;
    for field in ["_id", "projectName", "location", "category", "imageUrl", "createdAt"] {
        assert_eq!(fetched[field], created[field], "{}", field);
    }
    assert_eq!(fetched["projectName"], "Tower A");
    assert!(fetched.get("ignoredField").is_none());
    Ok(())
}

#[tokio::test]
async fn storage_failure_returns_502_and_writes_nothing() -> Result<()> {
    let server = spawn_server_with(ServerOptions {
        failing_media: true,
        ..Default::default()
    })
    .await?;
    let admin = admin_client(&server).await?;

    let res = admin
        .post(server.url("/api/projects"))
        .multipart(tower_a_form(1024)?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(res).await?["code"], "STORAGE_ERROR");

    let list = json_body(reqwest::get(server.url("/api/projects")).await?).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn non_image_upload_is_rejected() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let form = Form::new()
        .text("projectName", "Tower B")
        .text("location", "City Y")
        .text("category", "Commercial")
        .part(
            "image",
            Part::bytes(b"#!/bin/sh\necho pwned\n".to_vec())
                .file_name("tower.png")
                .mime_str("image/png")?,
        );
    let res = admin
        .post(server.url("/api/projects"))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["image"].is_string());
    assert!(server.media.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn update_without_image_keeps_it_and_replacement_drops_old() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let created = json_body(
        admin
            .post(server.url("/api/projects"))
            .multipart(tower_a_form(512)?)
            .send()
            .await?,
    )
    .await?;
    let id = created["_id"].as_str().unwrap_or_default().to_string();
    let first_url = created["imageUrl"].as_str().unwrap_or_default().to_string();

    let res = admin
        .put(server.url(&format!("/api/projects/{}", id)))
        .multipart(Form::new().text("category", "Mixed use"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = json_body(res).await?;
    assert_eq!(updated["category"], "Mixed use");
    assert_eq!(updated["projectName"], "Tower A");
    assert_eq!(updated["imageUrl"], first_url.as_str());

    let res = admin
        .put(server.url(&format!("/api/projects/{}", id)))
        .multipart(tower_a_form(256)?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced = json_body(res).await?;
    assert_ne!(replaced["imageUrl"], first_url.as_str());
    assert!(server.media.get(&first_url).await.is_none());
    assert_eq!(server.media.len().await, 1);

    let res = admin
        .put(server.url(&format!("/api/projects/{}", id)))
        .multipart(Form::new().text("location", ""))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_project_ids_are_not_found() -> Result<()> {
    let server = spawn_server().await?;
    let admin = admin_client(&server).await?;

    let res = admin
        .put(server.url("/api/projects/00000000-0000-0000-0000-000000000000"))
        .multipart(tower_a_form(128)?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(server.media.is_empty().await);

    let res = admin
        .delete(server.url("/api/projects/not-a-real-id"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
