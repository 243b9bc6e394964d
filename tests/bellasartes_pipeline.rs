//! End-to-end run against a mock Bellas Artes site.

use std::time::Duration;

use museo_dl::sources::BellasArtes;
use museo_dl::{Driver, Fetcher, FetcherConfig, IdRange, RunOptions, RunOutcome};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item_page(title: &str, artist: &str, image: &str) -> String {
    format!(
        r#"<html><body>
             <h1>{title}</h1>
             <dl class="row mt-3"><ul><li>{artist}</li><li>Óleo sobre tela</li></ul></dl>
             <a data-fancybox="gallery" href="{image}">ver</a>
           </body></html>"#
    )
}

async fn mount_page(server: &MockServer, id: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/coleccion/obra/{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_range_run_against_mock_site() {
    let server = MockServer::start().await;

    // 1: complete item with a relative image link
    mount_page(
        &server,
        1,
        item_page("Figura", "Picasso, Pablo", "/media/obras/1.jpg"),
    )
    .await;
    // 2: nothing mounted, wiremock answers 404
    // 3: page with a title but no image
    mount_page(&server, 3, "<h1>Boceto perdido</h1>".to_string()).await;
    // 4: image link that fails
    mount_page(
        &server,
        4,
        item_page("El despertar de la criada", "Sívori, Eduardo", "/media/obras/4.jpg"),
    )
    .await;
    // 5: server error on the page itself
    Mock::given(method("GET"))
        .and(path("/coleccion/obra/5/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/media/obras/1.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xDB]),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/obras/4.jpg"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&FetcherConfig::default()).unwrap();
    let site = Url::parse(&format!("{}/", server.uri())).unwrap();
    let source = BellasArtes::with_base_url(fetcher.clone(), site);

    let out = tempfile::tempdir().unwrap();
    let options = RunOptions::new(out.path()).with_delay(Duration::from_millis(5));
    let mut driver = Driver::new(&source, fetcher, options);

    let stats = driver.run(IdRange::new(1, 5).unwrap()).await.unwrap();

    assert_eq!(stats.outcome, RunOutcome::Completed);
    assert_eq!(stats.attempted, 5);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.failed, 2);
    assert_eq!(
        stats.attempted,
        stats.succeeded + stats.failed + stats.skipped
    );

    let ids: Vec<_> = stats.failures.iter().map(|f| f.identifier.as_str()).collect();
    assert_eq!(ids, vec!["4", "5"]);

    let saved = out.path().join("Picasso Pablo").join("Figura.jpg");
    assert_eq!(std::fs::read(saved).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xDB]);

    let failed = out
        .path()
        .join("Sívori Eduardo")
        .join("El despertar de la criada.jpg");
    assert!(!failed.exists());
}
