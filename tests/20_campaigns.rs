mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn campaign(name: &str) -> Value {
    json!({
        "name": name,
        "short_description": "short",
        "description": "long description",
        "perks": "Cap, Sticker,  Poster",
        "goal_amount": 1_000_000
    })
}

#[tokio::test]
async fn create_list_and_detail() -> Result<()> {
    let Some(server) = common::spawn_server().await? else {
        return Ok(());
    };
    let (owner_id, token) = server.register("Campaign Owner").await?;

    let res = server
        .client
        .post(server.url("/api/v1/campaigns"))
        .bearer_auth(&token)
        .json(&campaign("My Cool Project"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["slug"], "my-cool-project");
    let id = body["data"]["id"].as_i64().context("campaign id")?;

    let body: Value = server
        .client
        .get(server.url(&format!("/api/v1/campaigns?user_id={}", owner_id)))
        .send()
        .await?
        .json()
        .await?;
    let mine = body["data"].as_array().context("campaign list")?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], id);

    let body: Value = server
        .client
        .get(server.url(&format!("/api/v1/campaigns/{}", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["perks"], json!(["Cap", "Sticker", "Poster"]));
    assert_eq!(body["data"]["user"]["name"], "Campaign Owner");
    assert_eq!(body["data"]["backer_count"], 0);

    Ok(())
}

#[tokio::test]
async fn update_is_restricted_to_owner() -> Result<()> {
    let Some(server) = common::spawn_server().await? else {
        return Ok(());
    };
    let (_, owner) = server.register("Owner").await?;
    let (_, intruder) = server.register("Intruder").await?;

    let body: Value = server
        .client
        .post(server.url("/api/v1/campaigns"))
        .bearer_auth(&owner)
        .json(&campaign("Original"))
        .send()
        .await?
        .json()
        .await?;
    let id = body["data"]["id"].as_i64().context("campaign id")?;
    let uri = server.url(&format!("/api/v1/campaigns/{}", id));

    let res = server.client.put(&uri).bearer_auth(&intruder).json(&campaign("Hijacked")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["data"], "not an owner of the campaign");

    let body: Value = server.client.get(&uri).send().await?.json().await?;
    assert_eq!(body["data"]["name"], "Original");
    assert_eq!(body["data"]["description"], "long description");

    let mut changes = campaign("Renamed");
    changes["description"] = json!("new description");
    let res = server.client.put(&uri).bearer_auth(&owner).json(&changes).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = server.client.get(&uri).send().await?.json().await?;
    assert_eq!(body["data"]["slug"], "renamed");
    assert_eq!(body["data"]["description"], "new description");

    Ok(())
}

#[tokio::test]
async fn primary_image_is_exclusive() -> Result<()> {
    let Some(server) = common::spawn_server().await? else {
        return Ok(());
    };
    let (user_id, token) = server.register("Photographer").await?;

    let body: Value = server
        .client
        .post(server.url("/api/v1/campaigns"))
        .bearer_auth(&token)
        .json(&campaign("Gallery"))
        .send()
        .await?
        .json()
        .await?;
    let id = body["data"]["id"].as_i64().context("campaign id")?;

    for (file, primary) in [("a.png", "true"), ("b.png", "false"), ("c.png", "true")] {
        let form = reqwest::multipart::Form::new()
            .text("campaign_id", id.to_string())
            .text("is_primary", primary)
            .part("file", reqwest::multipart::Part::bytes(b"IMG".to_vec()).file_name(file));
        let res = server
            .client
            .post(server.url("/api/v1/campaign-images"))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = server
        .client
        .get(server.url(&format!("/api/v1/campaigns/{}", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["image_url"], format!("campaign-{}-{}-c.png", id, user_id));
    let images = body["data"]["images"].as_array().context("images")?;
    assert_eq!(images.len(), 3);
    assert_eq!(images.iter().filter(|i| i["is_primary"] == true).count(), 1);

    Ok(())
}

#[tokio::test]
async fn missing_campaign_is_not_found() -> Result<()> {
    let Some(server) = common::spawn_server().await? else {
        return Ok(());
    };
    let res = server.client.get(server.url("/api/v1/campaigns/999999999")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
