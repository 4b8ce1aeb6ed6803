//! Runs against a real Chromium. Ignored by default:
//! `CHROME_PATH=/usr/bin/chromium cargo test -p print-render -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use print_render::chrome::BrowserEngine;
use print_render::engine::EngineState;
use print_render::error::RenderError;
use print_render::options::{LaunchOptions, RunMode};
use print_render::renderer::PdfRenderer;
use url::Url;

fn options() -> LaunchOptions {
    let mut options = LaunchOptions::new(RunMode::Debug);
    options.executable = std::env::var_os("CHROME_PATH").map(Into::into);
    options
}

fn page(dir: &tempfile::TempDir, name: &str, html: &str) -> Url {
    let path = dir.path().join(name);
    std::fs::write(&path, html).unwrap();
    Url::from_file_path(&path).unwrap()
}

#[tokio::test]
#[ignore = "needs a Chromium binary"]
async fn renders_a4_pdf() {
    let engine = BrowserEngine::launch(options()).await.unwrap();
    assert_eq!(engine.state().await, EngineState::Ready);
    assert!(engine.ready().await);

    let dir = tempfile::tempdir().unwrap();
    let source = page(&dir, "doc.html", "<h1>x</h1>");
    let output = dir.path().join("doc.pdf");

    let written = engine.render_to_pdf(&source, &output).await.unwrap();
    assert_eq!(written, output);
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));

    engine.shutdown().await;
    assert_eq!(engine.state().await, EngineState::ShutDown);
    assert!(!engine.ready().await);
}

#[tokio::test]
#[ignore = "needs a Chromium binary"]
async fn hung_subresource_times_out() {
    // Accepts connections and never answers, so the page never goes idle.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut options = options();
    options.render_timeout = Duration::from_secs(2);
    let engine = BrowserEngine::launch(options).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let source = page(
        &dir,
        "hang.html",
        &format!(r#"<img src="http://{addr}/never.png">"#),
    );
    let err = engine
        .render_to_pdf(&source, &dir.path().join("hang.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::Timeout(d) if d == Duration::from_secs(2)));
    assert!(!dir.path().join("hang.pdf").exists());
    engine.shutdown().await;
}

#[tokio::test]
#[ignore = "needs a Chromium binary"]
async fn renders_are_bounded_by_the_permit_count() {
    let mut options = options();
    options.max_concurrent_renders = 1;
    options.idle_window = Duration::from_millis(1500);
    let engine = Arc::new(BrowserEngine::launch(options).await.unwrap());
    assert_eq!(engine.available_render_slots(), 1);

    let dir = tempfile::tempdir().unwrap();
    let source = page(&dir, "slow.html", "<p>slow</p>");
    let output = dir.path().join("slow.pdf");

    let render = {
        let engine = Arc::clone(&engine);
        let source = source.clone();
        let output = output.clone();
        tokio::spawn(async move { engine.render_to_pdf(&source, &output).await })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(engine.available_render_slots(), 0);

    render.await.unwrap().unwrap();
    assert_eq!(engine.available_render_slots(), 1);
    assert!(output.exists());
    engine.shutdown().await;
}
