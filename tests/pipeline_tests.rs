mod common;

use common::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use news_reel::{
    ChunkedSummarizer, Collaborators, Config, ConfigBuilder, FetchError, IngestionGate, MultiTargetTranslator, Pipeline,
    PipelineError, PipelineStage, SummarizationError, TranslationOutcome,
};

fn summarizer_with(oracle: Arc<ScriptedOracle>, window_size: usize, concurrency: usize) -> ChunkedSummarizer {
    let mut config = ConfigBuilder::new().with_window_size(window_size).build().summarizer;
    config.max_concurrent_windows = concurrency;
    ChunkedSummarizer::new(&config, oracle).unwrap()
}

#[tokio::test]
async fn test_summarizer_calls_oracle_once_per_window() {
    for (text_len, window_size) in [(10usize, 1usize), (250, 64), (5000, 4000), (3, 1000), (999, 7)] {
        let oracle = shared(ScriptedOracle::default());
        let summarizer = summarizer_with(oracle.clone(), window_size, 1);

        let text = "x".repeat(text_len);
        let prompt_len = summarizer.build_prompt(&text).chars().count();
        let expected_calls = (prompt_len + window_size - 1) / window_size;

        let summary = summarizer.summarize(&text).await.unwrap();

        assert_eq!(oracle.calls(), expected_calls);
        let expected: Vec<String> = (0..expected_calls).map(|i| format!("S{}", i)).collect();
        assert_eq!(summary, expected.join(" "));
        assert_eq!(oracle.inputs.lock().unwrap().concat(), summarizer.build_prompt(&text));
    }
}

#[tokio::test]
async fn test_concurrent_windows_keep_window_order() {
    let oracle = shared(ScriptedOracle {
        delay: Some(Duration::from_millis(40)),
        ..Default::default()
    });
    let summarizer = summarizer_with(oracle.clone(), 50, 4);

    let chunk_set = summarizer.summarize_chunks(&"y".repeat(300)).await.unwrap();

    assert_eq!(chunk_set.windows.len(), chunk_set.summaries.len());
    // Each summary echoes the call index; windows are submitted in order
    let inputs = oracle.inputs.lock().unwrap().clone();
    for (window, summary) in chunk_set.windows.iter().zip(&chunk_set.summaries) {
        let call_index: usize = summary.trim_start_matches('S').parse().unwrap();
        assert_eq!(&inputs[call_index], window);
    }
}

#[tokio::test]
async fn test_summarizer_fails_fast_on_any_window() {
    let oracle = shared(ScriptedOracle {
        fail_on_call: Some(1),
        ..Default::default()
    });
    let summarizer = summarizer_with(oracle.clone(), 20, 1);

    let result = summarizer.summarize(&"z".repeat(100)).await;

    assert!(matches!(result, Err(SummarizationError::Oracle(ref m)) if m.contains("window 1")));
    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn test_summarizer_times_out_stalled_window() {
    let oracle = shared(ScriptedOracle {
        delay: Some(Duration::from_secs(3600)),
        ..Default::default()
    });
    let mut config = ConfigBuilder::new().with_window_size(50).build().summarizer;
    config.timeout_seconds = 0;
    let summarizer = ChunkedSummarizer::new(&config, oracle.clone()).unwrap();

    let result = summarizer.summarize(&"w".repeat(120)).await;

    assert!(matches!(result, Err(SummarizationError::Timeout(d)) if d.is_zero()));
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn test_summarizer_rejects_zero_window() {
    let config = ConfigBuilder::new().with_window_size(0).build().summarizer;
    let result = ChunkedSummarizer::new(&config, shared(ScriptedOracle::default()));
    assert!(matches!(result, Err(SummarizationError::Configuration(_))));
}

#[tokio::test]
async fn test_translator_records_failures_inline() {
    let translator = MultiTargetTranslator::new(
        shared(FakeTranslator {
            failing: vec!["pl".to_string()],
        }),
        1,
    );
    let languages: Vec<String> = ["es", "pl", "tr"].iter().map(|l| l.to_string()).collect();

    let result = translator.translate("Hello", &languages).await;

    assert_eq!(result.len(), 3);
    let order: Vec<&str> = result.entries.iter().map(|e| e.language.as_str()).collect();
    assert_eq!(order, vec!["es", "pl", "tr"]);
    assert_eq!(result.get("es"), Some(&TranslationOutcome::Translated("Hello [es]".to_string())));
    assert_eq!(result.get("tr"), Some(&TranslationOutcome::Translated("Hello [tr]".to_string())));
    assert!(matches!(result.get("pl"), Some(TranslationOutcome::Failed(reason)) if reason.contains("456")));
    assert_eq!(result.failures(), 1);
}

#[tokio::test]
async fn test_translator_concurrency_preserves_order() {
    let translator = MultiTargetTranslator::new(shared(FakeTranslator { failing: vec![] }), 8);
    let languages: Vec<String> = ["de", "fr", "it", "ja", "nl"].iter().map(|l| l.to_string()).collect();

    let result = translator.translate("Hi", &languages).await;
    let order: Vec<String> = result.entries.iter().map(|e| e.language.clone()).collect();
    assert_eq!(order, languages);
}

#[tokio::test]
async fn test_ingestion_limits_batch_and_keeps_order() {
    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/story/a", "/story/b", "/story/c", "/story/d"]))
            .with_page("https://www.allure.com/story/a", &article_html("Alpha"))
            .with_page("https://www.allure.com/story/b", &article_html("Beta"))
            .with_page("https://www.allure.com/story/c", &article_html("Gamma")),
    );
    let config = ConfigBuilder::new().with_fetch_delay(0.0).build();
    let gate = IngestionGate::new(&config.ingestion, documents.clone()).unwrap();

    let batch = gate.fetch_batch(LISTING_URL, 2).await.unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.joined_text(), "Alpha Beta");
    assert_eq!(
        documents.fetched_urls(),
        vec![
            LISTING_URL.to_string(),
            "https://www.allure.com/story/a".to_string(),
            "https://www.allure.com/story/b".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_ingestion_aborts_on_failed_article() {
    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/story/a", "/story/missing", "/story/c"]))
            .with_page("https://www.allure.com/story/a", &article_html("Alpha"))
            .with_page("https://www.allure.com/story/c", &article_html("Gamma")),
    );
    let config = ConfigBuilder::new().with_fetch_delay(0.0).build();
    let gate = IngestionGate::new(&config.ingestion, documents.clone()).unwrap();

    let result = gate.fetch_batch(LISTING_URL, 3).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    // Nothing after the failing article is fetched
    assert_eq!(documents.fetched_urls().len(), 3);
}

#[tokio::test]
async fn test_ingestion_aborts_on_article_without_content() {
    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/story/a"]))
            .with_page("https://www.allure.com/story/a", "<html><body><p>teaser</p></body></html>"),
    );
    let config = ConfigBuilder::new().with_fetch_delay(0.0).build();
    let gate = IngestionGate::new(&config.ingestion, documents).unwrap();

    assert!(matches!(
        gate.fetch_batch(LISTING_URL, 3).await,
        Err(FetchError::EmptyArticle(_))
    ));
}

#[tokio::test]
async fn test_ingestion_without_links_fails() {
    let documents = shared(FakeDocuments::default().with_page(LISTING_URL, "<html></html>"));
    let config = ConfigBuilder::new().with_fetch_delay(0.0).build();
    let gate = IngestionGate::new(&config.ingestion, documents).unwrap();

    assert!(matches!(gate.fetch_batch(LISTING_URL, 3).await, Err(FetchError::NoLinks(_))));
}

#[tokio::test]
async fn test_ingestion_waits_between_articles() {
    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/a", "/b", "/c"]))
            .with_page("https://www.allure.com/a", &article_html("one"))
            .with_page("https://www.allure.com/b", &article_html("two"))
            .with_page("https://www.allure.com/c", &article_html("three")),
    );
    let config = ConfigBuilder::new().with_fetch_delay(0.05).build();
    let gate = IngestionGate::new(&config.ingestion, documents.clone()).unwrap();

    let started = Instant::now();
    gate.fetch_batch(LISTING_URL, 3).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(100));

    let calls = documents.calls.lock().unwrap();
    for pair in calls[1..].windows(2) {
        assert!(pair[1].1.duration_since(pair[0].1) >= Duration::from_millis(50));
    }
}

fn end_to_end_articles() -> [String; 3] {
    let first = format!("{}Sponsored{}", "a".repeat(45), "b".repeat(46));
    let second = format!("{}sponsored{}", "c".repeat(45), "d".repeat(46));
    let third = "e".repeat(50);
    [first, second, third]
}

#[tokio::test]
async fn test_end_to_end_single_window_summary() {
    let [first, second, third] = end_to_end_articles();
    assert_eq!((first.len(), second.len(), third.len()), (100, 100, 50));

    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/1", "/2", "/3"]))
            .with_page("https://www.allure.com/1", &article_html(&first))
            .with_page("https://www.allure.com/2", &article_html(&second))
            .with_page("https://www.allure.com/3", &article_html(&third)),
    );
    let oracle = shared(ScriptedOracle {
        reply: Some("Trends are back.".to_string()),
        ..Default::default()
    });

    let temp_dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_fetch_delay(0.0)
        .with_window_size(4000)
        .enable_translation(false)
        .enable_video(false)
        .with_output_dir(temp_dir.path().to_path_buf())
        .build();

    let pipeline = Pipeline::with_collaborators(
        config,
        Collaborators {
            documents,
            oracle: oracle.clone(),
            translator: None,
            tts: shared(FakeTts::default()),
            media: shared(FakeMedia::new(Duration::from_secs(9))),
        },
    )
    .unwrap();

    let report = pipeline.run().await.unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(report.summary, "Trends are back.");
    assert_eq!(report.source_urls.len(), 3);
    assert!(report.completed(PipelineStage::Summarization));
    assert!(!report.completed(PipelineStage::MediaSynthesis));

    let prompt = oracle.inputs.lock().unwrap()[0].clone();
    assert!(!prompt.to_lowercase().contains("sponsored"));
    let expected_text = format!(
        "{}{} {}{} {}",
        "a".repeat(45),
        "b".repeat(46),
        "c".repeat(45),
        "d".repeat(46),
        "e".repeat(50)
    );
    assert!(prompt.contains(&expected_text));
}

#[tokio::test]
async fn test_full_run_with_translations_and_video() {
    let documents = shared(
        FakeDocuments::default()
            .with_page(LISTING_URL, &listing_html(&["/1"]))
            .with_page("https://www.allure.com/1", &article_html("Glitter brows are everywhere. Advertisement")),
    );
    let oracle = shared(ScriptedOracle {
        reply: Some("one two three four five six seven eight nine".to_string()),
        ..Default::default()
    });
    let media = shared(FakeMedia::new(Duration::from_secs(9)));

    let temp_dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_fetch_delay(0.0)
        .with_deepl_key("test-key".to_string())
        .with_output_dir(temp_dir.path().join("out"))
        .with_video_path(temp_dir.path().join("out/video.mp4"))
        .build();

    let pipeline = Pipeline::with_collaborators(
        config,
        Collaborators {
            documents,
            oracle: oracle.clone(),
            translator: Some(shared(FakeTranslator {
                failing: vec!["pl".to_string()],
            })),
            tts: shared(FakeTts::default()),
            media: media.clone(),
        },
    )
    .unwrap();

    let report = pipeline.run().await.unwrap();

    // One window for the articles, one call for the script
    assert_eq!(oracle.calls(), 2);
    let translations = report.translations.as_ref().unwrap();
    assert_eq!(translations.len(), 3);
    assert_eq!(translations.failures(), 1);

    let video = report.video.as_ref().unwrap();
    assert_eq!(video.captions.len(), 3);
    assert!(temp_dir.path().join("out/video.mp4").exists());

    let written = pipeline.save_report(&report).await.unwrap();
    assert_eq!(written.len(), 2);
    let rendered = std::fs::read_to_string(temp_dir.path().join("out/translations.txt")).unwrap();
    assert!(rendered.contains("Translated to ES:"));
    assert!(rendered.contains("Error translating to PL:"));
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
    let config = ConfigBuilder::new()
        .with_fetch_delay(0.0)
        .enable_translation(false)
        .enable_video(false)
        .build();
    let oracle = shared(ScriptedOracle::default());

    let pipeline = Pipeline::with_collaborators(
        config,
        Collaborators {
            documents: shared(FakeDocuments::default()),
            oracle: oracle.clone(),
            translator: None,
            tts: shared(FakeTts::default()),
            media: shared(FakeMedia::new(Duration::from_secs(1))),
        },
    )
    .unwrap();

    let result = pipeline.run().await;
    assert!(matches!(result, Err(PipelineError::Fetch(_))));
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn test_translation_enabled_without_service_is_rejected() {
    let config = ConfigBuilder::new().with_deepl_key("k".to_string()).build();
    let result = Pipeline::with_collaborators(
        config,
        Collaborators {
            documents: shared(FakeDocuments::default()),
            oracle: shared(ScriptedOracle::default()),
            translator: None,
            tts: shared(FakeTts::default()),
            media: shared(FakeMedia::new(Duration::from_secs(1))),
        },
    );
    assert!(matches!(result, Err(PipelineError::Configuration(_))));
}

#[tokio::test]
async fn test_video_only_pipeline_needs_no_translation_key() {
    assert!(matches!(
        Pipeline::new(Config::default()),
        Err(PipelineError::Configuration(_))
    ));
    assert!(Pipeline::new(Config::default().without_translation()).is_ok());
}

#[tokio::test]
async fn test_unbuildable_phrase_list_is_rejected() {
    let mut config = ConfigBuilder::new().enable_translation(false).build();
    config.normalizer.ad_phrases = (0..200_000).map(|i| format!("promo phrase {}", i)).collect();

    let result = Pipeline::with_collaborators(
        config,
        Collaborators {
            documents: shared(FakeDocuments::default()),
            oracle: shared(ScriptedOracle::default()),
            translator: None,
            tts: shared(FakeTts::default()),
            media: shared(FakeMedia::new(Duration::from_secs(1))),
        },
    );
    assert!(matches!(result, Err(PipelineError::Configuration(ref m)) if m.contains("normalizer")));
}
