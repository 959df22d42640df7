mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;
use devcamper_api::types::Role;

fn review(rating: i64) -> Value {
    json!({ "title": "Learned a ton", "text": "Great instructors and job support", "rating": rating })
}

#[tokio::test]
async fn average_rating_follows_review_writes() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let alice = app.register(Role::User).await?;
    let bob = app.register(Role::User).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let id = bootcamp["id"].as_str().unwrap();
    let nested = format!("/bootcamps/{}/reviews", id);

    let (status, first) = app.post(&nested, Some(&alice.token), review(8)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["user"], alice.id.to_string());
    assert_eq!(app.bootcamp(id).await?["averageRating"], 8.0);

    let (status, second) = app.post(&nested, Some(&bob.token), review(5)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.bootcamp(id).await?["averageRating"], 6.5);

    let second_path = format!("/reviews/{}", second["data"]["id"].as_str().unwrap());
    let (status, _) = app.put(&second_path, Some(&bob.token), json!({ "rating": 10 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.bootcamp(id).await?["averageRating"], 9.0);

    app.delete(&second_path, Some(&bob.token)).await?;
    assert_eq!(app.bootcamp(id).await?["averageRating"], 8.0);

    let first_path = format!("/reviews/{}", first["data"]["id"].as_str().unwrap());
    app.delete(&first_path, Some(&alice.token)).await?;
    assert!(app.bootcamp(id).await?["averageRating"].is_null());
    Ok(())
}

#[tokio::test]
async fn one_review_per_user_per_bootcamp() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let user = app.register(Role::User).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let nested = format!("/bootcamps/{}/reviews", bootcamp["id"].as_str().unwrap());

    let (status, _) = app.post(&nested, Some(&user.token), review(7)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post(&nested, Some(&user.token), review(3)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn publishers_cannot_review_and_strangers_cannot_edit() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let author = app.register(Role::User).await?;
    let stranger = app.register(Role::User).await?;
    let admin = app.admin().await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let nested = format!("/bootcamps/{}/reviews", bootcamp["id"].as_str().unwrap());

    let (status, _) = app.post(&nested, Some(&owner.token), review(10)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, created) = app.post(&nested, Some(&author.token), review(4)).await?;
    let path = format!("/reviews/{}", created["data"]["id"].as_str().unwrap());

    let (status, _) = app.put(&path, Some(&stranger.token), json!({ "rating": 1 })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&path, Some(&owner.token), json!({ "rating": 1 })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&path, Some(&admin.token)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn reviewing_a_missing_bootcamp_is_not_found() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let user = app.register(Role::User).await?;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app
        .post(&format!("/bootcamps/{}/reviews", missing), Some(&user.token), review(5))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("No bootcamp with the id of {}", missing));
    Ok(())
}

#[tokio::test]
async fn rating_must_be_between_one_and_ten() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let user = app.register(Role::User).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let nested = format!("/bootcamps/{}/reviews", bootcamp["id"].as_str().unwrap());

    let (status, body) = app.post(&nested, Some(&user.token), review(11)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["rating"].is_string());
    Ok(())
}
