use chimeragen::completion::{Completion, CompletionTracker, RemoteImageLoader};
use chimeragen::{ErrorKind, ImageProvider, ImageResult, PollinationsProvider};
use std::time::Duration;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

fn pollinations(server: &MockServer) -> PollinationsProvider {
    PollinationsProvider::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_remote_image_loads_before_ceiling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/prompt/.+"))
        .and(query_param("nologo", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .expect(1)
        .mount(&mock_server)
        .await;

    let image = pollinations(&mock_server).generate("A wolf-owl").await.unwrap();
    let ImageResult::RemoteUrl { ref url } = image.result else {
        panic!("expected a remote URL");
    };

    let loader = RemoteImageLoader::new();
    let completion = CompletionTracker::new(Duration::from_secs(5))
        .await_ready(&image, loader.fetch(url))
        .await;

    match completion {
        Completion::Loaded(bytes) => assert_eq!(bytes, PNG_BYTES),
        other => panic!("unexpected completion: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_remote_image_hits_ceiling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_BYTES)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let image = pollinations(&mock_server).generate("A slow bear").await.unwrap();
    let loader = RemoteImageLoader::new();
    let completion = CompletionTracker::new(Duration::from_millis(200))
        .await_ready(&image, loader.load(&image))
        .await;

    assert!(matches!(completion, Completion::TimedOut));
}

#[tokio::test]
async fn test_remote_image_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let image = pollinations(&mock_server).generate("A broken hyena").await.unwrap();
    let loader = RemoteImageLoader::new();
    let completion = CompletionTracker::default()
        .await_ready(&image, loader.load(&image))
        .await;

    match completion {
        Completion::LoadFailed(e) => {
            assert_eq!(e.kind(), ErrorKind::ProviderRejected);
            assert_eq!(e.message(), "Failed to load image. Please try again.");
        }
        other => panic!("unexpected completion: {other:?}"),
    }
}
