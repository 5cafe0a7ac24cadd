mod support;

use std::sync::Arc;

use curio::models::Corpus;
use curio::pipeline::CorpusSearch;
use curio::services::InMemoryVectorStore;
use curio::PipelineError;
use support::*;

async fn course_search() -> CorpusSearch {
  let store = InMemoryVectorStore::new();
  seed(&store, Corpus::Course, &course_records()).await;
  CorpusSearch::new(Corpus::Course, Arc::new(KeywordEmbedder::new()), Arc::new(store))
}

#[tokio::test]
async fn test_returns_at_most_k_sorted() {
  let search = course_search().await;

  for k in 1..=5 {
    let matches = search.search("pricing markets", k).await.unwrap();
    assert!(matches.len() <= k);
    assert_eq!(matches.len(), k.min(3));
    assert!(matches.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
  }

  let top = search.search("pricing markets", 1).await.unwrap();
  assert_eq!(top[0].title(), "MKT 310");
}

#[tokio::test]
async fn test_repeated_search_is_identical() {
  let search = course_search().await;

  let first = search.search("behavioral economics", 3).await.unwrap();
  let second = search.search("behavioral economics", 3).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn test_distances_are_rounded_and_metadata_typed() {
  let search = course_search().await;
  let matches = search.search("judgment uncertainty", 3).await.unwrap();

  let best = &matches[0];
  assert_eq!(best.title(), "ECON 409");
  assert_eq!(best.distance, (best.distance * 10_000.0).round() / 10_000.0);
  assert_eq!(best.metadata.descriptor(), Some("Judgment and decision making under uncertainty"));
  assert!(best.explanation.is_empty());
}

#[tokio::test]
async fn test_empty_corpus_returns_nothing() {
  let store = InMemoryVectorStore::new();
  seed(&store, Corpus::Event, &[]).await;
  let search = CorpusSearch::new(Corpus::Event, Arc::new(KeywordEmbedder::new()), Arc::new(store));

  assert!(search.search("hackathon", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_collection_is_corpus_unavailable() {
  let search =
    CorpusSearch::new(Corpus::Faculty, Arc::new(KeywordEmbedder::new()), Arc::new(InMemoryVectorStore::new()));

  let err = search.search("markets", 10).await.unwrap_err();
  assert!(matches!(err, PipelineError::CorpusUnavailable { corpus: Corpus::Faculty, .. }));
  assert!(err.to_string().starts_with("The faculty search is unavailable"));
}
