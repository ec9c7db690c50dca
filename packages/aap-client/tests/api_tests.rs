//! Integration tests for the AAP client against a mock controller.

use std::time::{Duration, Instant};

use aap_client::{AapClient, AapConfig, AapError, JobRange};
use mockito::{Matcher, Server};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn client_for(server: &Server) -> AapClient {
    AapClient::new(AapConfig::new(server.url(), "t0ken")).expect("Failed to build client")
}

fn job(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("job-{}", id),
        "status": "successful",
        "finished": "2024-01-05T13:22:07.512Z",
        "job_explanation": "",
        "summary_fields": {}
    })
}

#[tokio::test]
async fn lists_all_pages_in_order() {
    //* Given
    let mut server = Server::new_async().await;

    let page1 = server
        .mock("GET", "/api/v2/jobs/")
        .match_query(Matcher::Exact("page_size=2&id__gte=10&id__lte=13".into()))
        .match_header("authorization", "Bearer t0ken")
        .match_header("accept-encoding", Matcher::Regex("gzip".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "results": [job(10), job(11)],
                "next": "/api/v2/jobs/?id__gte=10&id__lte=13&page=2&page_size=2"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let page2 = server
        .mock("GET", "/api/v2/jobs/")
        .match_query(Matcher::Exact("id__gte=10&id__lte=13&page=2&page_size=2".into()))
        .match_header("authorization", "Bearer t0ken")
        .match_header("accept-encoding", Matcher::Regex("gzip".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "results": [job(12), job(13)], "next": null }).to_string())
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server).with_page_size(2);
    let range = JobRange::new(Some(10), Some(13));
    let mut lister = client.iter_jobs(range).unwrap();

    let mut ids = Vec::new();
    while let Some(job) = lister.next().await.expect("listing failed") {
        ids.push(job.id);
    }

    //* Then
    page1.assert_async().await;
    page2.assert_async().await;
    assert_eq!(ids, vec![10, 11, 12, 13]);
    assert!(ids.iter().all(|id| (10..=13).contains(id)));
    assert_eq!(lister.pages_fetched(), 2);

    // Exhausted listers stay exhausted
    assert!(lister.next().await.unwrap().is_none());
}

#[tokio::test]
async fn omitted_bounds_are_not_sent() {
    //* Given
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/jobs/")
        .match_query(Matcher::Exact("page_size=100".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "results": [], "next": null }).to_string())
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server);
    let mut lister = client.iter_jobs(JobRange::default()).unwrap();
    let first = lister.next().await.unwrap();

    //* Then
    mock.assert_async().await;
    assert!(first.is_none());
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    //* Given
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v2/jobs/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    //* When
    let client = client_for(&server);
    let mut lister = client.iter_jobs(JobRange::new(Some(1), None)).unwrap();
    let result = lister.next().await;

    //* Then
    match result {
        Err(AapError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected API error, got {:?}", other.map(|j| j.map(|j| j.id))),
    }
}

#[tokio::test]
async fn bulk_stdout_returns_one_entry_per_id() {
    //* Given
    let mut server = Server::new_async().await;
    let tail_query = Matcher::AllOf(vec![
        Matcher::UrlEncoded("format".into(), "txt".into()),
        Matcher::UrlEncoded("start_line".into(), "-100".into()),
    ]);

    let ok = server
        .mock("GET", "/api/v2/jobs/1/stdout/")
        .match_query(tail_query.clone())
        .match_header("authorization", "Bearer t0ken")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("host1 : ok=1 changed=0 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0\n")
        .expect(1)
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/api/v2/jobs/2/stdout/")
        .match_query(tail_query.clone())
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let broken = server
        .mock("GET", "/api/v2/jobs/3/stdout/")
        .match_query(tail_query)
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server);
    let logs = client.fetch_stdout_bulk(&[1, 2, 3]).await;

    //* Then
    ok.assert_async().await;
    missing.assert_async().await;
    broken.assert_async().await;

    assert_eq!(logs.len(), 3);
    assert!(logs[&1].starts_with("host1 : ok=1"));
    assert_eq!(logs[&2], "");
    assert_eq!(logs[&3], "");
}

#[tokio::test]
async fn bulk_stdout_of_nothing_is_empty() {
    let server = Server::new_async().await;
    let client = client_for(&server);

    assert!(client.fetch_stdout_bulk(&[]).await.is_empty());
}

/// Serve every request with `body` after `delay`, one task per connection.
async fn spawn_slow_server(delay: Duration, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn bulk_stdout_requests_run_concurrently() {
    //* Given
    let delay = Duration::from_millis(300);
    let base_url = spawn_slow_server(delay, "recap").await;
    let client = AapClient::new(AapConfig::new(base_url, "t0ken")).unwrap();

    //* When
    let start = Instant::now();
    let logs = client.fetch_stdout_bulk(&[1, 2, 3, 4, 5]).await;
    let elapsed = start.elapsed();

    //* Then
    assert_eq!(logs.len(), 5);
    assert!(logs.values().all(|log| log == "recap"));
    // sequential fetching would take five delays
    assert!(
        elapsed < delay * 3,
        "five fetches took {:?}, expected about one {:?} delay",
        elapsed,
        delay
    );
}
