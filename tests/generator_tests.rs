
use quiz_forge::clients::MockResponse;
use quiz_forge::error::{ProviderError, GENERATION_FALLBACK_MESSAGE};
use quiz_forge::generator::parse_generation_response;
use quiz_forge::{HttpQuizGenerator, QuestionType, QuizError, QuizGenerator};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use test_utils::{mcq_config, mock_generator, quiz_json, sample_mcqs};

#[test]
fn error_status_uses_the_body_error_message() {
    let err = parse_generation_response(402, r#"{"error":"Payment required. Please add credits to your workspace."}"#)
        .unwrap_err();
    match err {
        QuizError::GenerationRequest { status, message } => {
            assert_eq!(status, Some(402));
            assert_eq!(message, "Payment required. Please add credits to your workspace.");
        }
        other => panic!("expected GenerationRequest, got {:?}", other),
    }
}

#[test]
fn error_status_without_message_uses_the_fallback() {
    for body in ["", "not json", r#"{"detail":"x"}"#, r#"{"error":"  "}"#] {
        let err = parse_generation_response(500, body).unwrap_err();
        assert_eq!(err.user_message(), GENERATION_FALLBACK_MESSAGE);
    }
}

#[test]
fn bare_question_array_is_accepted() {
    let body = serde_json::to_string(&sample_mcqs()).unwrap();
    let questions = parse_generation_response(200, &body).unwrap();
    assert_eq!(questions, sample_mcqs());
}

#[test]
fn questions_field_is_required() {
    for body in ["{}", r#"{"questions":null}"#, r#""questions""#, "[]", r#"{"questions":[]}"#] {
        let err = parse_generation_response(200, body).unwrap_err();
        assert!(
            matches!(err, QuizError::InvalidResponseFormat(_)),
            "body {:?} gave {:?}",
            body,
            err
        );
    }
}

#[test]
fn multiple_choice_without_options_is_rejected() {
    let body = r#"{"questions":[{"question":"Capital of France?","type":"MCQ","correctAnswer":"Paris"}]}"#;
    assert!(matches!(
        parse_generation_response(200, body),
        Err(QuizError::InvalidResponseFormat(_))
    ));
}

#[test]
fn missing_explanation_defaults_to_empty() {
    let body = r#"{"questions":[{"question":"Gold is a metal.","type":"True/False","correctAnswer":"True"}]}"#;
    let questions = parse_generation_response(200, body).unwrap();
    assert_eq!(questions[0].question_type, QuestionType::TrueFalse);
    assert!(questions[0].explanation.is_empty());
    assert!(questions[0].options.is_none());
}

#[tokio::test]
async fn local_generator_returns_model_questions() {
    let (generator, handle) = mock_generator(vec![MockResponse::text(format!(
        "Here is your quiz:\n```json\n{}\n```",
        quiz_json(&sample_mcqs())
    ))]);

    let questions = generator.generate("Notes about Europe.", &mcq_config(3)).await.unwrap();
    assert_eq!(questions, sample_mcqs());

    let prompts = handle.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].system.contains("Generate 3 MCQ questions"));
    assert!(prompts[0].user.ends_with("Notes about Europe."));
}

#[tokio::test]
async fn local_generator_skips_the_model_for_blank_content() {
    let (generator, handle) = mock_generator(Vec::new());
    let err = generator.generate("   ", &mcq_config(5)).await.unwrap_err();
    assert!(matches!(err, QuizError::EmptyContent));
    assert_eq!(err.user_message(), "Please provide some content to generate quiz from");
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn local_generator_reports_rate_limits() {
    let (generator, _handle) = mock_generator(vec![MockResponse::Error(ProviderError::RateLimit)]);
    let err = generator.generate("notes", &mcq_config(5)).await.unwrap_err();
    match err {
        QuizError::GenerationRequest { status, message } => {
            assert_eq!(status, Some(429));
            assert_eq!(message, "Rate limits exceeded. Please try again later.");
        }
        other => panic!("expected GenerationRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn local_generator_reports_unparseable_output() {
    let (generator, _handle) = mock_generator(vec![MockResponse::text("I cannot help with that.")]);
    let err = generator.generate("notes", &mcq_config(5)).await.unwrap_err();
    match err {
        QuizError::GenerationRequest { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "Could not parse quiz data from AI response");
        }
        other => panic!("expected GenerationRequest, got {:?}", other),
    }
}

/// Serve a single HTTP exchange, returning the raw request text.
async fn serve_once(listener: TcpListener, status_line: &'static str, body: String) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();
    String::from_utf8_lossy(&request).to_string()
}

#[tokio::test]
async fn http_generator_posts_the_request_contract() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/generate-quiz", listener.local_addr().unwrap());
    let server = tokio::spawn(serve_once(listener, "200 OK", quiz_json(&sample_mcqs())));

    let generator = HttpQuizGenerator::new(endpoint).with_api_key("secret");
    let questions = generator.generate("Notes about Europe.", &mcq_config(3)).await.unwrap();
    assert_eq!(questions.len(), 3);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /generate-quiz"));
    assert!(request.to_lowercase().contains("authorization: bearer secret"));

    let body_start = request.find("\r\n\r\n").unwrap() + 4;
    let body: Value = serde_json::from_str(&request[body_start..]).unwrap();
    assert_eq!(body["content"], "Notes about Europe.");
    assert_eq!(body["questionType"], "MCQ");
    assert_eq!(body["difficulty"], "Medium");
    assert_eq!(body["questionCount"], 3);
}

#[tokio::test]
async fn http_generator_surfaces_service_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/", listener.local_addr().unwrap());
    let body = r#"{"error":"Rate limits exceeded. Please try again later."}"#.to_string();
    let server = tokio::spawn(serve_once(listener, "429 Too Many Requests", body));

    let err = HttpQuizGenerator::new(endpoint)
        .generate("notes", &mcq_config(5))
        .await
        .unwrap_err();
    server.await.unwrap();
    match err {
        QuizError::GenerationRequest { status, message } => {
            assert_eq!(status, Some(429));
            assert_eq!(message, "Rate limits exceeded. Please try again later.");
        }
        other => panic!("expected GenerationRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn http_generator_connection_failure_uses_the_fallback() {
    // Bind and drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = HttpQuizGenerator::new(endpoint)
        .generate("notes", &mcq_config(5))
        .await
        .unwrap_err();
    match err {
        QuizError::GenerationRequest { status, message } => {
            assert_eq!(status, None);
            assert_eq!(message, GENERATION_FALLBACK_MESSAGE);
        }
        other => panic!("expected GenerationRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn http_generator_rejects_blank_content_without_a_request() {
    let generator = HttpQuizGenerator::new("http://127.0.0.1:9/never");
    let err = generator.generate("\n", &mcq_config(5)).await.unwrap_err();
    assert!(matches!(err, QuizError::EmptyContent));
}
