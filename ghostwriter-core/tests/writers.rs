use completion::Client;
use ghostwriter_core::{CompletionWriter, Locale, RemoteWriter, Writer, WriterError};
use httpmock::{Method::POST, MockServer};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

#[tokio::test]
async fn remote_writer_posts_window_and_reads_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .body_contains("\"sentence\":\"Once upon a time.\"")
                .body_contains("\"language\":\"English\"")
                .body_contains("\"apiKey\":\"sk-test\"");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"{"result":{"id":"cmpl-1","choices":[{"text":" The hero woke.","index":0}],
                        "prompt":"Can you suggest the next sentence for this novel? `Once upon a time.`"}}"#,
                );
        })
        .await;

    let writer = RemoteWriter::new(server.url("/api/generate"), "sk-test");
    let text = writer
        .suggest("Once upon a time.", Locale::English)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, " The hero woke.");
}

#[tokio::test]
async fn remote_writer_surfaces_error_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(500)
                .header("content-type", "application/json")
                .body(r#"{"error":{"message":"API key not configured"}}"#);
        })
        .await;

    let writer = RemoteWriter::new(server.url("/api/generate"), "");
    let err = writer.suggest("x.", Locale::English).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "API key not configured");
}

#[tokio::test]
async fn remote_writer_error_without_json_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let writer = RemoteWriter::new(server.url("/api/generate"), "k");
    let err = writer.suggest("x.", Locale::English).await.unwrap_err();

    assert!(matches!(err, WriterError::Backend { status: 502, .. }));
    assert_eq!(err.user_message(), "Request failed with status 502");
}

#[tokio::test]
async fn remote_writer_empty_choices_is_empty_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"result":{"choices":[]}}"#);
        })
        .await;

    let writer = RemoteWriter::new(server.url("/api/generate"), "k");
    assert_eq!(writer.suggest("x.", Locale::English).await.unwrap(), "");
}

#[tokio::test]
async fn completion_writer_sends_locale_prompt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/completions")
                .header("authorization", "Bearer sk-test")
                .body_contains("이 다음에 올 50자 이하의 소설 문장을 완성해줘. `옛날 옛적에.`")
                .body_contains("\"max_tokens\":300")
                .body_contains("\"temperature\":0.7");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices":[{"text":"호랑이가 웃었다.","index":0}]}"#);
        })
        .await;

    let client = Client::new("sk-test").with_base_url(server.url("/v1"));
    let writer = CompletionWriter::new(client);

    let generation = writer.generate("옛날 옛적에.", Locale::Korean).await.unwrap();
    mock.assert_async().await;
    assert_eq!(
        generation.prompt,
        "이 다음에 올 50자 이하의 소설 문장을 완성해줘. `옛날 옛적에.`"
    );
    assert_eq!(generation.response.text(), Some("호랑이가 웃었다."));
}

#[tokio::test]
async fn completion_writer_maps_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/completions");
            then.status(429)
                .header("content-type", "application/json")
                .body(r#"{"error":{"message":"Rate limit reached"}}"#);
        })
        .await;

    let client = Client::new("sk-test").with_base_url(server.url("/v1"));
    let err = CompletionWriter::new(client)
        .suggest("x.", Locale::English)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(err.user_message(), "Rate limit reached");
}

#[tokio::test]
async fn remote_writer_reports_cut_off_error_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n{\"error\"")
            .await
            .unwrap();
    });

    let writer = RemoteWriter::new(format!("http://{addr}/api/generate"), "sk-test");
    let err = writer.suggest("x.", Locale::English).await.unwrap_err();

    assert!(matches!(err, WriterError::Network(_)), "{err:?}");
    assert_eq!(err.status(), None);
}
