//! End-to-end tests: compiled routes observed over HTTP.

use serde_json::Value;

mod common;
use common::{serve_compiled, write_source};

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_html_route() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "route \"/hello\" GET: {\n  html: <h1>Hello</h1>\n}\n",
    );
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/html"
    );
    assert_eq!(res.text().await.unwrap(), "<h1>Hello</h1>");
}

#[tokio::test]
async fn test_json_route() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "route \"/data\" GET: {\n  json: {\n    ok: true,\n    count: 3\n  }\n}\n",
    );
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/data"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], Value::Bool(true));
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_status_headers_and_type() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "\
route \"/made\" POST: {
  status: 201
  type: text/plain
  headers: {
    X-Served-By: teralang
  }
  response: created
}
",
    );
    let addr = serve_compiled(&main).await;

    let res = client()
        .post(format!("http://{addr}/made"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(res.headers()["x-served-by"].to_str().unwrap(), "teralang");
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(res.text().await.unwrap(), "created");
}

#[tokio::test]
async fn test_wildcard_fallback_and_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "route \"/*\" GET: {\n  response: fallback\n}\n",
    );
    let addr = serve_compiled(&main).await;

    // Any miss falls back to the GET /* handler, regardless of method.
    let res = client()
        .get(format!("http://{addr}/no/such/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "fallback");

    let res = client()
        .delete(format!("http://{addr}/also/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "fallback");
}

#[tokio::test]
async fn test_miss_without_wildcard_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "route \"/only\" GET: {\n  response: here\n}\n",
    );
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/other"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_file_route_served_with_guessed_type() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("note.txt");
    std::fs::write(&payload, "file contents").unwrap();

    let source = format!(
        "route \"/note\" GET: {{\n  file: \"{}\"\n}}\n",
        payload.display()
    );
    let main = write_source(dir.path(), "main.tera", &source);
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/note"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(res.text().await.unwrap(), "file contents");
}

#[tokio::test]
async fn test_missing_file_route_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let main = write_source(
        dir.path(),
        "main.tera",
        "route \"/gone\" GET: {\n  file: \"/no/such/payload.txt\"\n}\n",
    );
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/gone"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().starts_with("Error reading file"));
}

#[tokio::test]
async fn test_imported_routes_are_served() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        "api.tera",
        "route \"/api/ping\" GET: {\n  json: { pong: true }\n}\n",
    );
    let main = write_source(dir.path(), "main.tera", "import \"api\"\n");
    let addr = serve_compiled(&main).await;

    let res = client()
        .get(format!("http://{addr}/api/ping"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["pong"], Value::Bool(true));
}
