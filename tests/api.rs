//! End-to-end tests for the JSON API against a mock USGS backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use quake_sdk::{NewCity, QuakeClient};
use serde_json::{json, Value};

mod common;

use common::{start_programmable_backend, start_server, test_config, EMPTY_GEOJSON, SAMPLE_GEOJSON};

async fn sample_backend() -> (std::net::SocketAddr, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, SAMPLE_GEOJSON.to_string())
        }
    })
    .await;
    (addr, calls)
}

#[tokio::test]
async fn test_city_crud() {
    let (usgs, _) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let cities: Vec<Value> = client
        .get(format!("{}/api/cities", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0]["name"], "Lima");

    let res = client
        .post(format!("{}/api/cities", base))
        .json(&json!({ "name": "Quito", "latitude": -0.1807, "longitude": -78.4678 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let quito: Value = res.json().await.unwrap();
    let id = quito["id"].as_u64().unwrap();
    assert_eq!(id, 3);

    let res = client
        .post(format!("{}/api/cities", base))
        .json(&json!({ "name": "Lima", "latitude": 1.0, "longitude": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/api/cities", base))
        .json(&json!({ "name": "Nowhere", "latitude": 100.0, "longitude": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/cities", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/api/cities/{}", base, id))
        .json(&json!({ "name": "San Francisco de Quito", "latitude": -0.1807, "longitude": -78.4678 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "San Francisco de Quito");
    assert_eq!(updated["id"], id);

    let res = client.delete(format!("{}/api/cities/{}", base, id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(format!("{}/api/cities/{}", base, id)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_search_returns_closest_earthquake() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let usgs = start_programmable_backend(move |line| {
        seen.lock().unwrap().push(line);
        async { (200, SAMPLE_GEOJSON.to_string()) }
    })
    .await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/cities/1/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["city"], "Lima");
    assert_eq!(body["place"], "45 km SW of Lima, Peru");
    assert_eq!(body["magnitude"], 5.6);
    let distance = body["distance_km"].as_f64().unwrap();
    assert!(distance > 30.0 && distance < 50.0, "distance was {}", distance);

    let res = client
        .get(format!("{}/api/cities/2/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["place"], "near the coast of Honshu, Japan");

    let line = requests.lock().unwrap()[0].clone();
    assert!(line.starts_with("GET /fdsnws/event/1/query.geojson?"), "{}", line);
    assert!(line.contains("starttime=2020-01-01"), "{}", line);
    assert!(line.contains("endtime=2020-01-31"), "{}", line);
    assert!(line.contains("minmagnitude=5"), "{}", line);
    assert!(line.contains("orderby=time"), "{}", line);

    shutdown.trigger();
}

#[tokio::test]
async fn test_search_without_events() {
    let usgs = start_programmable_backend(|_| async { (200, EMPTY_GEOJSON.to_string()) }).await;
    let (base, shutdown) = start_server(test_config(usgs)).await;

    let res = reqwest::Client::new()
        .get(format!("{}/api/cities/1/earthquakes", base))
        .query(&[("start_date", "2021-06-01"), ("end_date", "2021-06-02")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "No results found" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_search_rejects_bad_input() {
    let (usgs, calls) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/cities/1/earthquakes", base);

    let res = client
        .get(&url)
        .query(&[("start_date", "2020-02-01"), ("end_date", "2020-01-01")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(&url)
        .query(&[("start_date", "2020-02-01")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "missing query parameter 'end_date'");

    let res = client
        .get(&url)
        .query(&[("start_date", "01/02/2020"), ("end_date", "2020-03-01")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/cities/99/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "City not found");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_on_upstream_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let usgs = start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, r#"{"error":"busy"}"#.to_string())
            } else {
                (200, SAMPLE_GEOJSON.to_string())
            }
        }
    })
    .await;
    let (base, shutdown) = start_server(test_config(usgs)).await;

    let res = reqwest::Client::new()
        .get(format!("{}/api/cities/1/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_failure_maps_to_bad_gateway() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let usgs = start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (500, r#"{"error":"boom"}"#.to_string())
        }
    })
    .await;
    let (base, shutdown) = start_server(test_config(usgs)).await;

    let res = reqwest::Client::new()
        .get(format!("{}/api/cities/1/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Failed to retrieve earthquakes");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_repeated_search_served_from_cache() {
    let (usgs, calls) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let body: Value = client
            .get(format!("{}/api/cities/1/earthquakes", base))
            .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A different range misses the cache.
    client
        .get(format!("{}/api/cities/1/earthquakes", base))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-02-01")])
        .send()
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_background_search_task() {
    let (usgs, _) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = QuakeClient::new(&base);

    let submitted = client.submit_search(1, "2020-01-01", "2020-01-31").await.unwrap();

    let mut status = Value::Null;
    for _ in 0..50 {
        status = client.task_status(&submitted.task_id).await.unwrap();
        if status["status"] != "PENDING" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status["task_id"], submitted.task_id.as_str());
    assert_eq!(status["status"], "SUCCESS");
    assert_eq!(status["result"]["place"], "45 km SW of Lima, Peru");

    assert!(client.submit_search(42, "2020-01-01", "2020-01-31").await.is_err());

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_task() {
    let (usgs, _) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/cities/results/{}", base, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/cities/results/not-a-uuid", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    shutdown.trigger();
}

#[tokio::test]
async fn test_sdk_round_trip() {
    let (usgs, _) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = QuakeClient::new(&base);

    let routes = client.list_routes().await.unwrap();
    let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/", "/results"]);
    assert_eq!(routes[0].name.as_deref(), Some("Home"));

    let city = client
        .create_city(&NewCity {
            name: "Santiago".into(),
            latitude: -33.4489,
            longitude: -70.6693,
        })
        .await
        .unwrap();
    assert!(client.list_cities().await.unwrap().contains(&city));

    let outcome = client.search(city.id, "2020-01-01", "2020-01-31").await.unwrap();
    assert_eq!(outcome["city"], "Santiago");

    shutdown.trigger();
}

async fn search(client: &reqwest::Client, base: &str, city_id: u64) -> reqwest::Response {
    client
        .get(format!("{}/api/cities/{}/earthquakes", base, city_id))
        .query(&[("start_date", "2020-01-01"), ("end_date", "2020-01-31")])
        .send()
        .await
        .unwrap()
}

fn yokohama() -> Value {
    json!({ "name": "Yokohama", "latitude": 35.44, "longitude": 139.64 })
}

#[tokio::test]
async fn test_city_update_refreshes_cached_search() {
    let (usgs, calls) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let before: Value = search(&client, &base, 1).await.json().await.unwrap();
    assert_eq!(before["city"], "Lima");

    let res = client
        .put(format!("{}/api/cities/1", base))
        .json(&yokohama())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let after: Value = search(&client, &base, 1).await.json().await.unwrap();
    assert_eq!(after["city"], "Yokohama");
    assert_eq!(after["place"], "near the coast of Honshu, Japan");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_city_delete_drops_cached_search() {
    let (usgs, calls) = sample_backend().await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    assert_eq!(search(&client, &base, 1).await.status(), StatusCode::OK);

    let res = client.delete(format!("{}/api/cities/1", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = search(&client, &base, 1).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_update_during_search_is_not_cached() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let usgs = start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(400)).await;
            (200, SAMPLE_GEOJSON.to_string())
        }
    })
    .await;
    let (base, shutdown) = start_server(test_config(usgs)).await;
    let client = reqwest::Client::new();

    let in_flight = {
        let client = client.clone();
        let base = base.clone();
        tokio::spawn(async move { search(&client, &base, 1).await.status() })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .put(format!("{}/api/cities/1", base))
        .json(&yokohama())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(in_flight.await.unwrap(), StatusCode::OK);

    // The search that started before the move must not be served from cache
    let after: Value = search(&client, &base, 1).await.json().await.unwrap();
    assert_eq!(after["city"], "Yokohama");
    assert_eq!(after["place"], "near the coast of Honshu, Japan");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}
