use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::time::Duration;
use thumbnail_strategist::{
    ai::{ChatService, ImageGenerationService, MockChatClient, MockImageGenerationClient},
    app::{App, AppServices},
    models::{FormState, ImageResponse, PromptResponse},
    studio::{jpeg_data_uri, ThumbnailStudio, PROMPT_FAILED, THUMBNAIL_FAILED, TITLE_REQUIRED},
    Error,
};

fn free_local_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn test_full_workflow_with_mocks() {
    let chat = MockChatClient::new()
        .with_prompt_response("A radiant sunrise, a smiling creator holding coffee".to_string());
    let image_gen = MockImageGenerationClient::new().with_image_response(vec![0xFF, 0xD8, 0xFF]);
    let chat_calls = chat.clone();
    let image_calls = image_gen.clone();

    let studio = ThumbnailStudio::new(Box::new(chat), Box::new(image_gen));

    let prompt = studio
        .request_prompt("10 Morning Habits", "Motivational")
        .await
        .unwrap();
    assert_eq!(prompt, "A radiant sunrise, a smiling creator holding coffee");

    let edited = format!("{}, bold yellow text \"WAKE UP\"", prompt);
    let image_url = studio.request_image(&edited).await.unwrap();
    assert_eq!(image_url, "data:image/jpeg;base64,/9j/");

    let regenerated = studio.request_image(&edited).await.unwrap();
    assert_eq!(regenerated, image_url);

    assert_eq!(chat_calls.get_call_count(), 1);
    assert_eq!(image_calls.get_call_count(), 2);
    assert_eq!(image_calls.prompts(), vec![edited.clone(), edited.clone()]);

    let state = studio.snapshot().await;
    assert_eq!(
        state,
        FormState {
            video_title: "10 Morning Habits".to_string(),
            keywords: "Motivational".to_string(),
            generated_prompt: edited,
            image_url,
            is_prompt_loading: false,
            is_image_loading: false,
            error: None,
        }
    );
}

#[tokio::test]
async fn test_empty_title_never_reaches_gateway() {
    let chat = MockChatClient::new();
    let chat_calls = chat.clone();
    let studio = ThumbnailStudio::new(Box::new(chat), Box::new(MockImageGenerationClient::new()));

    let err = studio.request_prompt("", "Motivational").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(
        studio.snapshot().await.error.as_deref(),
        Some(TITLE_REQUIRED)
    );
    assert_eq!(chat_calls.get_call_count(), 0);
}

#[tokio::test]
async fn test_failures_reset_loading_flags_and_allow_retry() {
    let studio = ThumbnailStudio::new(
        Box::new(MockChatClient::new().failing()),
        Box::new(MockImageGenerationClient::new().failing()),
    );

    assert!(matches!(
        studio.request_prompt("Title", "").await,
        Err(Error::Gateway(_))
    ));
    let state = studio.snapshot().await;
    assert!(!state.is_prompt_loading);
    assert_eq!(state.error.as_deref(), Some(PROMPT_FAILED));
    assert_eq!(state.generated_prompt, "");

    assert!(matches!(
        studio.request_image("hand-written prompt").await,
        Err(Error::Gateway(_))
    ));
    let state = studio.snapshot().await;
    assert!(!state.is_image_loading);
    assert_eq!(state.error.as_deref(), Some(THUMBNAIL_FAILED));
    assert_eq!(state.image_url, "");
}

#[tokio::test]
async fn test_mocks_are_usable_as_trait_objects() {
    let chat: Box<dyn ChatService> = Box::new(MockChatClient::new());
    let image_gen: Box<dyn ImageGenerationService> = Box::new(MockImageGenerationClient::new());

    let prompt = chat.derive_prompt("Tech Review", "Gadgets").await.unwrap();
    assert!(prompt.contains("Tech Review"));

    let bytes = image_gen.derive_image(&prompt).await.unwrap();
    assert!(jpeg_data_uri(&bytes).starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_app_serves_form_over_http() {
    let addr = free_local_addr();
    let app = App::with_services(
        AppServices {
            chat: Box::new(MockChatClient::new().with_prompt_response("served prompt".to_string())),
            image_gen: Box::new(MockImageGenerationClient::new().with_image_response(vec![1, 2])),
        },
        addr,
    );

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        app.run_until(async {
            stop_rx.await.ok();
        })
        .await
    });

    let base = format!("http://{}", addr);
    let client = reqwest::Client::new();

    let mut healthy = false;
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{}/health", base)).send().await {
            healthy = response.status().is_success();
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(healthy);

    let index = client.get(&base).send().await.unwrap().text().await.unwrap();
    assert!(index.contains("AI YouTube Thumbnail Strategist"));

    let prompt: PromptResponse = client
        .post(format!("{}/api/prompt", base))
        .json(&serde_json::json!({ "title": "Gaming Setup Tour", "keywords": "Gaming" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prompt.prompt, "served prompt");

    let image: ImageResponse = client
        .post(format!("{}/api/image", base))
        .json(&serde_json::json!({ "prompt": prompt.prompt }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(image.image_url, jpeg_data_uri(&[1, 2]));

    let response = client
        .post(format!("{}/api/image", base))
        .json(&serde_json::json!({ "prompt": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
