mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{bootcamp_payload, spawn_app, unique};
use devcamper_api::types::Role;

#[tokio::test]
async fn publisher_creates_one_geocoded_bootcamp() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let publisher = app.register(Role::Publisher).await?;

    let name = unique("Devworks ");
    let (status, body) = app
        .post("/bootcamps", Some(&publisher.token), bootcamp_payload(&name))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let bootcamp = &body["data"];
    assert_eq!(bootcamp["name"], name);
    assert_eq!(bootcamp["slug"], name.to_lowercase().replace(' ', "-"));
    assert_eq!(bootcamp["location"]["type"], "Point");
    assert_eq!(bootcamp["location"]["coordinates"], json!([-71.104028, 42.350846]));
    assert_eq!(bootcamp["user"], publisher.id.to_string());
    assert_eq!(bootcamp["photo"], "no-photo.jpg");
    assert!(bootcamp["averageCost"].is_null());
    assert!(bootcamp.get("address").is_none());

    let (status, body) = app
        .post("/bootcamps", Some(&publisher.token), bootcamp_payload(&unique("Second ")))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("has already published a bootcamp"));
    Ok(())
}

#[tokio::test]
async fn admins_are_exempt_from_the_one_bootcamp_rule() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let admin = app.admin().await?;
    app.create_bootcamp(&admin).await?;
    app.create_bootcamp(&admin).await?;
    Ok(())
}

#[tokio::test]
async fn plain_users_cannot_publish() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let user = app.register(Role::User).await?;

    let (status, body) = app
        .post("/bootcamps", Some(&user.token), bootcamp_payload(&unique("Nope ")))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User role user is not authorized to access this route");
    Ok(())
}

#[tokio::test]
async fn validation_errors_are_reported_per_field() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let publisher = app.register(Role::Publisher).await?;

    let (status, body) = app
        .post(
            "/bootcamps",
            Some(&publisher.token),
            json!({ "name": "x".repeat(51), "website": "devworks" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["name", "description", "address", "careers", "website"] {
        assert!(body["fields"][field].is_string(), "missing {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_may_modify() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let rival = app.register(Role::Publisher).await?;
    let admin = app.admin().await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let path = format!("/bootcamps/{}", bootcamp["id"].as_str().unwrap());

    let (status, _) = app.put(&path, Some(&rival.token), json!({ "housing": false })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let renamed = unique("Renamed ");
    let (status, body) = app.put(&path, Some(&owner.token), json!({ "name": renamed })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], renamed);
    assert_eq!(body["data"]["slug"], renamed.to_lowercase().replace(' ', "-"));
    assert_eq!(body["data"]["description"], bootcamp["description"]);

    let (status, body) = app.put(&path, Some(&admin.token), json!({ "jobGuarantee": true })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["jobGuarantee"], true);

    let (status, _) = app.delete(&path, Some(&rival.token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.delete(&path, Some(&owner.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({}));

    let (status, body) = app.get(&path, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Bootcamp not found with id of"));
    Ok(())
}

#[tokio::test]
async fn deleting_a_bootcamp_removes_its_courses() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let id = bootcamp["id"].as_str().unwrap();
    let course = app.create_course(&owner, id, 8000).await?;

    app.delete(&format!("/bootcamps/{}", id), Some(&owner.token)).await?;

    let (status, _) = app
        .get(&format!("/courses/{}", course["id"].as_str().unwrap()), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn listing_filters_selects_and_embeds_courses() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;
    let id = bootcamp["id"].as_str().unwrap();
    app.create_course(&owner, id, 8000).await?;

    let (status, body) = app
        .get(&format!("/bootcamps?id={}&select=name,housing", id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let row = &body["data"][0];
    assert_eq!(row["id"], id);
    assert_eq!(row["name"], bootcamp["name"]);
    assert_eq!(row["housing"], true);
    assert!(row.get("description").is_none());
    assert_eq!(row["courses"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .get(&format!("/bootcamps?id={}&careers[in]=Business", id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, body) = app
        .get(&format!("/bootcamps?id={}&averageCost[lte]=8000", id), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    Ok(())
}

#[tokio::test]
async fn radius_search_finds_nearby_bootcamps() -> Result<()> {
    let Some(app) = spawn_app().await? else { return Ok(()) };
    let owner = app.register(Role::Publisher).await?;
    let bootcamp = app.create_bootcamp(&owner).await?;

    let (status, body) = app.get("/bootcamps/radius/02215/10", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], body["data"].as_array().unwrap().len());
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"] == bootcamp["id"]));
    assert!(body.get("pagination").is_none());
    Ok(())
}
