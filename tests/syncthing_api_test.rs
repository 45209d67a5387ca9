// tests/syncthing_api_test.rs

// Exercises the REST client against a local tiny_http server standing in for Syncthing.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Response, Server};

use syncled::sync::api::{DaemonApi, SyncthingClient};
use syncled::sync::http::create_http_client;

const API_KEY: &str = "test-api-key";

type Routes = Arc<Mutex<HashMap<&'static str, (u16, String)>>>;

// Start a fake daemon answering `routes` and return its base URL.
fn start_fake_daemon(routes: Routes, delay: Duration) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for request in server.incoming_requests() {
            thread::sleep(delay);
            let authorised = request
                .headers()
                .iter()
                .any(|h| h.field.equiv("X-API-Key") && h.value.as_str() == API_KEY);

            let (status, body) = if !authorised {
                (403, "CSRF Error".to_string())
            } else {
                routes
                    .lock()
                    .unwrap()
                    .get(request.url())
                    .cloned()
                    .unwrap_or((404, "404 page not found".to_string()))
            };

            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
    });

    format!("http://{}", addr)
}

fn healthy_routes() -> Routes {
    Arc::new(Mutex::new(HashMap::from([
        ("/rest/system/ping", (200, r#"{"ping": "pong"}"#.to_string())),
        (
            "/rest/db/completion",
            (200, r#"{"completion": 87.5, "globalBytes": 1000, "needBytes": 125}"#.to_string()),
        ),
        ("/rest/system/error", (200, r#"{"errors": null}"#.to_string())),
        (
            "/rest/system/connections",
            (
                200,
                r#"{"connections": {}, "total": {"inBytesTotal": 4096, "outBytesTotal": 1024}}"#.to_string(),
            ),
        ),
    ])))
}

fn client(base_url: &str, api_key: &str, timeout: Duration) -> Result<SyncthingClient> {
    let http = create_http_client(api_key, None, timeout)?;
    SyncthingClient::new(base_url, http)
}

#[test]
fn reads_all_endpoints() -> Result<()> {
    let base = start_fake_daemon(healthy_routes(), Duration::ZERO);
    let api = client(&base, API_KEY, Duration::from_secs(5))?;

    api.ping()?;
    assert_eq!(api.completion()?, 87.5);
    assert_eq!(api.errors()?, None);
    assert_eq!(api.connection_totals()?.sum(), 5120);
    Ok(())
}

#[test]
fn reads_error_entries() -> Result<()> {
    let routes = healthy_routes();
    routes.lock().unwrap().insert(
        "/rest/system/error",
        (
            200,
            r#"{"errors": [{"when": "2024-03-01T10:00:00.5+01:00", "message": "Folder path missing"}]}"#.to_string(),
        ),
    );
    let base = start_fake_daemon(routes, Duration::ZERO);
    let api = client(&base, API_KEY, Duration::from_secs(5))?;

    let errors = api.errors()?.unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].when, "2024-03-01T10:00:00.5+01:00");
    Ok(())
}

#[test]
fn wrong_api_key_is_an_error() -> Result<()> {
    let base = start_fake_daemon(healthy_routes(), Duration::ZERO);
    let api = client(&base, "wrong-key", Duration::from_secs(5))?;

    assert!(api.ping().is_err());
    Ok(())
}

#[test]
fn server_error_is_an_error() -> Result<()> {
    let routes = healthy_routes();
    routes
        .lock()
        .unwrap()
        .insert("/rest/db/completion", (500, r#"{"completion": 100}"#.to_string()));
    let base = start_fake_daemon(routes, Duration::ZERO);
    let api = client(&base, API_KEY, Duration::from_secs(5))?;

    assert!(api.completion().is_err());
    Ok(())
}

#[test]
fn malformed_body_is_an_error() -> Result<()> {
    let routes = healthy_routes();
    routes
        .lock()
        .unwrap()
        .insert("/rest/system/connections", (200, "<html>proxy error</html>".to_string()));
    let base = start_fake_daemon(routes, Duration::ZERO);
    let api = client(&base, API_KEY, Duration::from_secs(5))?;

    assert!(api.connection_totals().is_err());
    Ok(())
}

#[test]
fn slow_daemon_times_out() -> Result<()> {
    let base = start_fake_daemon(healthy_routes(), Duration::from_secs(3));
    let api = client(&base, API_KEY, Duration::from_millis(200))?;

    assert!(api.ping().is_err());
    Ok(())
}

#[test]
fn nothing_listening_is_an_error() -> Result<()> {
    // Bind and drop to get a port that is very likely closed.
    let port = {
        let server = Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };
    let api = client(&format!("http://127.0.0.1:{}", port), API_KEY, Duration::from_secs(2))?;

    assert!(api.ping().is_err());
    Ok(())
}

#[test]
fn missing_certificate_file_fails_client_creation() {
    let result = create_http_client(
        API_KEY,
        Some(std::path::Path::new("/nonexistent/https-cert.pem")),
        Duration::from_secs(1),
    );
    assert!(result.is_err());
}
