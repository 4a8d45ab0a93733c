mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

use common::*;
use wikisum::error::Error;
use wikisum::failover::LlmInvoker;
use wikisum::keypool::KeyPool;
use wikisum::prompt::{ModelHint, Prompt};
use wikisum::providers::GenerationParams;
use wikisum::request::{Language, Length, Mode, Source, SummaryRequest};
use wikisum::server;

const REPLY: &str = "Albert Einstein was a **theoretical physicist**.\n\nHe developed *relativity*.";

fn request(theme: &str, length: Length, language: Language, mode: Mode) -> SummaryRequest
{   SummaryRequest::new(theme, length, language, mode).unwrap()
}

fn einstein_request() -> SummaryRequest
{   request("Einstein", Length::Medium, Language::En, Mode::Biographical)
}

// ===== Pipeline =====

#[tokio::test]
async fn test_direct_article_is_summarized()
{   let service = summarizer(
      einstein_wiki(),
      ScriptedTransport::replying(REPLY),
      &["k1", "k2", "k3"],
      Duration::ZERO
    );

    let response = assert_ok!(service.process(&einstein_request()).await);
    assert!(response.success);
    assert_eq!(response.source, Source::Wikipedia);
    assert_eq!(response.title, "Albert Einstein");
    assert_eq!(
      response.url.as_deref(),
      Some("https://en.wikipedia.org/wiki/Albert_Einstein")
    );
    assert_eq!(response.method, "direct");
    assert_eq!(response.length_mode, "moyen");
    assert_eq!(
      response.summary_html,
      "<p>Albert Einstein was a <strong>theoretical physicist</strong>.</p>\n\
       <p>He developed <em>relativity</em>.</p>"
    );

    let calls = service.invoker().transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, LARGE);
    assert!(calls[0].prompt.contains("between 250 and 350 words"));
    assert!(calls[0].prompt.contains("BIOGRAPHICAL FOCUS"));
    assert!(calls[0].prompt.contains("German-born theoretical physicist"));

    let stats = service.stats();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.wikipedia_success, 1);
    assert_eq!(stats.llm_only, 0);
}

#[tokio::test]
async fn test_repeated_request_hits_memo()
{   let service = summarizer(
      einstein_wiki(),
      ScriptedTransport::replying(REPLY),
      &["k1", "k2", "k3"],
      Duration::ZERO
    );

    let first = assert_ok!(service.process(&einstein_request()).await);
    let second = assert_ok!(service.process(&einstein_request()).await);

    assert_eq!(first, second);
    assert_eq!(service.invoker().transport().calls().len(), 1);
    assert_eq!(service.stats().cache_hits, 1);
    assert_eq!(service.stats().requests, 2);
}

#[tokio::test]
async fn test_memo_ignores_case_and_padding()
{   let service = summarizer(
      einstein_wiki(),
      ScriptedTransport::replying(REPLY),
      &["k1"],
      Duration::ZERO
    );

    let first = request("Einstein", Length::Short, Language::En, Mode::General);
    let padded = request("  einstein ", Length::Short, Language::En, Mode::General);
    assert_ok!(service.process(&first).await);
    assert_ok!(service.process(&padded).await);

    assert_eq!(service.invoker().transport().calls().len(), 1);
    assert_eq!(service.stats().cache_hits, 1);
}

#[tokio::test]
async fn test_mode_length_and_language_partition_memo()
{   let service = summarizer(
      einstein_wiki(),
      ScriptedTransport::replying(REPLY),
      &["k1"],
      Duration::ZERO
    );

    let variants = [
      request("Einstein", Length::Medium, Language::En, Mode::General)
    , request("Einstein", Length::Medium, Language::En, Mode::Historical)
    , request("Einstein", Length::Long, Language::En, Mode::General)
    , request("Einstein", Length::Medium, Language::Es, Mode::General)
    ];
    for variant in &variants
    {   assert_ok!(service.process(variant).await);
    }

    assert_eq!(service.invoker().transport().calls().len(), variants.len());
    assert_eq!(service.memo().len(), variants.len());
    assert_eq!(service.stats().cache_hits, 0);
}

#[tokio::test]
async fn test_missing_article_falls_back_to_direct_answer()
{   let service = summarizer(
      FakeWiki::new(),
      ScriptedTransport::replying("Réponse directe."),
      &["k1", "k2"],
      Duration::ZERO
    );

    let qwertz = request("Qwertzxy", Length::Short, Language::Fr, Mode::General);
    let response = assert_ok!(service.process(&qwertz).await);

    assert_eq!(response.source, Source::LlmOnly);
    assert_eq!(response.url, None);
    assert_eq!(response.method, "direct_ai");
    assert_eq!(response.title, "Qwertzxy");
    assert_eq!(response.length_mode, "court");
    assert_eq!(response.summary_html, "<p>Réponse directe.</p>");

    let calls = service.invoker().transport().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("in French"));
    assert!(calls[0].prompt.contains("between 150 and 200 words"));
    assert!(calls[0].prompt.contains("\"Qwertzxy\""));

    let lookups = service.locator().source().lookups();
    assert_eq!(lookups[0], (Language::Fr, "Qwertzxy".to_string()));
    assert_eq!(service.stats().llm_only, 1);
}

#[tokio::test]
async fn test_suggestion_method_is_reported()
{   let wiki = FakeWiki::new()
      .with_search("Einstien", &["Nothing Here", "Albert Einstein"])
      .with_page("Albert Einstein", "Albert Einstein", "Physicist.");
    let service = summarizer(
      wiki,
      ScriptedTransport::replying("Summary."),
      &["k1"],
      Duration::ZERO
    );

    let response = assert_ok!(
      service.process(&SummaryRequest::with_theme("Einstien").unwrap()).await
    );
    assert_eq!(response.method, "suggestion:Albert Einstein");
    assert_eq!(response.source, Source::Wikipedia);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_credentials_back_off_then_succeed()
{   let transport = ScriptedTransport::new(|credential, _| {
      if credential == "k3"
      {   Ok("Einstein summary.".to_string())
      } else
      {   Err(Error::RateLimitExceeded)
      }
    });
    let service = summarizer(
      einstein_wiki(),
      transport,
      &["k1", "k2", "k3"],
      Duration::from_secs(2)
    );

    let started = tokio::time::Instant::now();
    let response = assert_ok!(service.process(&einstein_request()).await);
    let waited = started.elapsed();

    assert_eq!(response.title, "Albert Einstein");
    assert!(waited >= Duration::from_secs(4), "waited {:?}", waited);
    assert!(waited < Duration::from_secs(6), "waited {:?}", waited);

    let calls = service.invoker().transport().calls();
    let last = calls.last().unwrap();
    assert_eq!(last.credential, "k3");
    assert_eq!(last.model, LARGE);
    assert_eq!(service.key_pool().cursor(), 3);
}

#[tokio::test]
async fn test_capacity_on_large_model_downgrades_to_small()
{   let transport = ScriptedTransport::new(|credential, model| {
      match (credential, model)
      {   (_, LARGE) => Err(Error::CapacityExceeded("service tier capacity exceeded".to_string()))
        , ("k3", SMALL) => Ok("Small model summary.".to_string())
        , _ => Err(Error::ApiError("Mistral error 503".to_string()))
      }
    });
    let service = summarizer(einstein_wiki(), transport, &["k1", "k2", "k3"], Duration::ZERO);

    let response = assert_ok!(service.process(&einstein_request()).await);
    assert_eq!(response.source, Source::Wikipedia);
    assert_eq!(response.summary_html, "<p>Small model summary.</p>");

    let models: Vec<(String, String)> = service.invoker().transport()
      .calls()
      .into_iter()
      .map(|c| (c.credential, c.model))
      .collect();
    assert_eq!(models, vec![
      ("k1".to_string(), LARGE.to_string())
    , ("k1".to_string(), SMALL.to_string())
    , ("k2".to_string(), LARGE.to_string())
    , ("k2".to_string(), SMALL.to_string())
    , ("k3".to_string(), LARGE.to_string())
    , ("k3".to_string(), SMALL.to_string())
    ]);
    assert_eq!(service.memo().len(), 1);
}

#[tokio::test]
async fn test_small_tier_prompt_has_nothing_to_downgrade_to()
{   let transport = ScriptedTransport::new(|credential, model| {
      match (credential, model)
      {   ("k2", SMALL) => Ok("Short answer.".to_string())
        , _ => Err(Error::CapacityExceeded("capacity exceeded".to_string()))
      }
    });
    let pool = KeyPool::from_secrets(["k1", "k2"]).unwrap();
    let invoker = LlmInvoker::new(transport, pool, tiers(), Duration::ZERO);
    let prompt = Prompt
    {   text: "Explain tides.".to_string()
      , model_hint: ModelHint::Small
      , params: GenerationParams::default()
    };

    assert_eq!(assert_ok!(invoker.invoke(&prompt).await), "Short answer.");
    let calls: Vec<(String, String)> = invoker.transport()
      .calls()
      .into_iter()
      .map(|c| (c.credential, c.model))
      .collect();
    assert_eq!(calls, vec![
      ("k1".to_string(), SMALL.to_string())
    , ("k2".to_string(), SMALL.to_string())
    ]);
}

#[tokio::test]
async fn test_cursor_advances_once_per_attempt()
{   let transport = ScriptedTransport::new(|credential, _| {
      match credential
      {   "k1" | "k2" => Err(Error::HttpError("connection refused".to_string()))
        , _ => Ok("ok".to_string())
      }
    });
    let service = summarizer(
      einstein_wiki(),
      transport,
      &["k1", "k2", "k3", "k4"],
      Duration::ZERO
    );

    let before = service.key_pool().cursor();
    assert_ok!(service.process(&einstein_request()).await);
    assert_eq!(service.key_pool().cursor(), before + 3);

    // transport errors never try the small model
    let calls = service.invoker().transport().calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.model == LARGE));
}

#[tokio::test]
async fn test_exhausted_credentials_are_terminal_and_not_memoized()
{   let transport = ScriptedTransport::new(|credential, _| {
      Err(Error::ApiError(format!("bad key {}", credential)))
    });
    let service = summarizer(einstein_wiki(), transport, &["k1", "k2"], Duration::ZERO);

    let e = assert_err!(service.process(&einstein_request()).await);
    match &e
    {   Error::AllCredentialsFailed(last) => assert!(last.contains("bad key k2"))
      , other => panic!("unexpected error: {:?}", other)
    }
    assert!(service.memo().is_empty());
    assert_eq!(service.stats().wikipedia_success, 0);

    // a second attempt goes back to the LLM
    assert_err!(service.process(&einstein_request()).await);
    assert_eq!(service.invoker().transport().calls().len(), 4);
}

// ===== HTTP boundary =====

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value)
{   let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(body: Value) -> Request<Body>
{   Request::builder()
      .method("POST")
      .uri("/api/summarize")
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
}

fn get(uri: &str) -> Request<Body>
{   Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_http_scenarios_and_stats()
{   let service = Arc::new(summarizer(
      einstein_wiki(),
      ScriptedTransport::replying("Summary."),
      &["k1", "k2", "k3"],
      Duration::ZERO
    ));

    let einstein = json!({
      "theme": "Einstein",
      "length_mode": "moyen",
      "language": "en",
      "mode": "biographical"
    });

    let (status, first) = send(server::router(service.clone()), post_json(einstein.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["source"], "wikipedia");
    assert_eq!(first["title"], "Albert Einstein");
    assert_eq!(first["method"], "direct");
    assert_eq!(first["length_mode"], "moyen");
    assert_eq!(first["length"], "medium");
    assert_eq!(first["mode"], "biographical");
    assert!(first["url"].is_string());

    let (status, second) = send(server::router(service.clone()), post_json(einstein)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let (status, fallback) = send(
      server::router(service.clone()),
      post_json(json!({
        "theme": "Qwertzxy",
        "length_mode": "court",
        "language": "fr",
        "mode": "general"
      }))
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fallback["source"], "llm_only");
    assert_eq!(fallback["url"], Value::Null);
    assert_eq!(fallback["method"], "direct_ai");

    let (status, stats) = send(server::router(service.clone()), get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({
      "requests": 3,
      "cache_hits": 1,
      "wikipedia_success": 1,
      "mistral_only": 1
    }));
    assert_eq!(service.invoker().transport().calls().len(), 2);
}

#[tokio::test]
async fn test_http_rejects_short_theme_without_llm_call()
{   let service = Arc::new(summarizer(
      einstein_wiki(),
      ScriptedTransport::replying("Summary."),
      &["k1"],
      Duration::ZERO
    ));

    for body in [json!({ "theme": "a" }), json!({ "theme": "   " }), json!({})]
    {   let (status, reply) = send(server::router(service.clone()), post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["success"], false);
        assert!(!reply["error"].as_str().unwrap().is_empty());
    }
    assert!(service.invoker().transport().calls().is_empty());
}

#[tokio::test]
async fn test_http_rejects_wrong_content_type_and_bad_json()
{   let service = Arc::new(summarizer(
      einstein_wiki(),
      ScriptedTransport::replying("Summary."),
      &["k1"],
      Duration::ZERO
    ));

    let plain = Request::builder()
      .method("POST")
      .uri("/api/summarize")
      .header("content-type", "text/plain")
      .body(Body::from("theme=Einstein"))
      .unwrap();
    let (status, reply) = send(server::router(service.clone()), plain).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["success"], false);

    let broken = Request::builder()
      .method("POST")
      .uri("/api/summarize")
      .header("content-type", "application/json")
      .body(Body::from("{\"theme\": "))
      .unwrap();
    let (status, reply) = send(server::router(service.clone()), broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(reply["error"].is_string());
}

#[tokio::test]
async fn test_http_terminal_failure_is_500()
{   let transport = ScriptedTransport::new(|_, _| Err(Error::Timeout));
    let service = Arc::new(summarizer(einstein_wiki(), transport, &["k1"], Duration::ZERO));

    let (status, reply) = send(
      server::router(service),
      post_json(json!({ "theme": "Einstein" }))
    ).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"], "All credentials failed: Request timed out");
}

#[tokio::test]
async fn test_http_health_reports_pool_size()
{   let service = Arc::new(summarizer(
      FakeWiki::new(),
      ScriptedTransport::replying("x"),
      &["k1", "k2"],
      Duration::ZERO
    ));

    let (status, reply) = send(server::router(service), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({ "status": "ok", "credentials": 2 }));
}
