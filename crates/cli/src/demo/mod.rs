//! The competitor-selection example pipeline: a deterministic
//! filter-and-select over mock product data, traced step by step. This is
//! the reference producer for the trace API; the mock LLM and mock
//! catalog stand in for real integrations.

pub(crate) mod mock;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use pipetrace_storage::{ExecutionStore, MemoryStore};
use pipetrace_tracer::{StepDraft, SystemClock, TraceError, TraceReader, Tracer};

use self::mock::Product;

type PipelineError = Box<dyn std::error::Error + Send + Sync>;

const MIN_RATING: f64 = 3.8;
const MIN_REVIEWS: u32 = 100;

/// Run the whole pipeline under a fresh execution.
///
/// Pipeline errors are caught here: the execution is marked failed and
/// its id is still returned, so a consumer can inspect the partial trace.
pub(crate) async fn run_competitor_selection<S: ExecutionStore>(
    tracer: &Tracer<S>,
) -> Result<String, TraceError> {
    let reference = mock::reference_product();

    let execution_id = tracer
        .start_execution(&json!({
            "referenceProduct": reference,
            "pipeline": "competitor_selection",
        }))
        .await?;
    tracing::info!(product = %reference.title, "starting competitor selection");

    match run_pipeline(tracer, &execution_id, &reference).await {
        Ok(selected) => {
            tracer.end_execution(&execution_id).await?;
            tracing::info!(selected = %selected.title, "competitor selection completed");
        }
        Err(e) => {
            tracing::error!(error = %e, "competitor selection failed");
            tracer.fail_execution(&execution_id, &e.to_string()).await?;
        }
    }

    Ok(execution_id)
}

async fn run_pipeline<S: ExecutionStore>(
    tracer: &Tracer<S>,
    execution_id: &str,
    reference: &Product,
) -> Result<Product, PipelineError> {
    let keywords = generate_keywords(tracer, execution_id, reference).await?;
    let candidates = search_candidates(tracer, execution_id, &keywords).await?;
    apply_filters_and_select(tracer, execution_id, &candidates, reference).await
}

/// Step 1: mock LLM keyword generation.
async fn generate_keywords<S: ExecutionStore>(
    tracer: &Tracer<S>,
    execution_id: &str,
    product: &Product,
) -> Result<Vec<String>, PipelineError> {
    let keywords = extract_keywords(product);

    tracer
        .record_step(
            execution_id,
            StepDraft::new("keyword_generation")
                .input(&json!({
                    "product_title": product.title,
                    "category": product.category,
                }))
                .output(&json!({
                    "keywords": keywords,
                    "model": "gpt-4-mock",
                }))
                .reasoning(
                    "Extracted key product attributes: material (stainless steel), \
                     capacity (32oz), feature (insulated)",
                ),
        )
        .await?;

    Ok(keywords)
}

/// Step 2: mock catalog search.
async fn search_candidates<S: ExecutionStore>(
    tracer: &Tracer<S>,
    execution_id: &str,
    keywords: &[String],
) -> Result<Vec<Product>, PipelineError> {
    let candidates = mock::candidate_products();

    tracer
        .record_step(
            execution_id,
            StepDraft::new("candidate_search")
                .input(&json!({
                    "keyword": keywords.first(),
                    "limit": 50,
                }))
                .output(&json!({
                    "total_results": 2847,
                    "candidates_fetched": candidates.len(),
                    "candidates": candidates,
                }))
                .reasoning(format!(
                    "Fetched top {} results by relevance; 2847 total matches found",
                    candidates.len()
                )),
        )
        .await?;

    Ok(candidates)
}

/// Step 3: apply filters and select the best match.
async fn apply_filters_and_select<S: ExecutionStore>(
    tracer: &Tracer<S>,
    execution_id: &str,
    candidates: &[Product],
    reference: &Product,
) -> Result<Product, PipelineError> {
    let min_price = reference.price * 0.5;
    let max_price = reference.price * 2.0;

    let mut evaluations = Vec::new();
    let mut qualified = Vec::new();
    for candidate in candidates {
        let evaluation = evaluate_candidate(candidate, min_price, max_price);
        if evaluation.qualified {
            qualified.push(candidate.clone());
        }
        evaluations.push(evaluation);
    }

    let selected = select_best_match(&qualified).ok_or("no qualified products found")?;

    tracer
        .record_step(
            execution_id,
            StepDraft::new("apply_filters")
                .input(&json!({
                    "candidates_count": candidates.len(),
                    "reference_product": reference,
                }))
                .output(&json!({
                    "total_evaluated": candidates.len(),
                    "passed": qualified.len(),
                    "failed": candidates.len() - qualified.len(),
                    "selected_competitor": selected,
                }))
                .reasoning(format!(
                    "Applied price (${min_price:.2}-${max_price:.2}), rating ({MIN_RATING:.1}+), \
                     and review count ({MIN_REVIEWS}+) filters. Narrowed candidates from {} to {}. \
                     Selected '{}' (highest review count: {}, rating: {:.1}\u{2605})",
                    candidates.len(),
                    qualified.len(),
                    selected.title,
                    selected.reviews,
                    selected.rating,
                ))
                .metadata(&json!({
                    "filters_applied": {
                        "price_range": {
                            "min": min_price,
                            "max": max_price,
                            "rule": "0.5x - 2x of reference price",
                        },
                        "min_rating": {
                            "value": MIN_RATING,
                            "rule": "Must be at least 3.8 stars",
                        },
                        "min_reviews": {
                            "value": MIN_REVIEWS,
                            "rule": "Must have at least 100 reviews",
                        },
                    },
                    "evaluations": evaluations,
                })),
        )
        .await?;

    Ok(selected)
}

/// Full filter detail for one candidate, kept in step metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateEvaluation {
    asin: String,
    title: String,
    metrics: serde_json::Value,
    filter_results: BTreeMap<&'static str, FilterResult>,
    qualified: bool,
}

#[derive(Debug, Serialize)]
struct FilterResult {
    passed: bool,
    detail: String,
}

fn evaluate_candidate(candidate: &Product, min_price: f64, max_price: f64) -> CandidateEvaluation {
    let mut filter_results = BTreeMap::new();

    let passes_price = candidate.price >= min_price && candidate.price <= max_price;
    filter_results.insert(
        "price_range",
        FilterResult {
            passed: passes_price,
            detail: if passes_price {
                format!(
                    "${:.2} is within ${min_price:.2}-${max_price:.2}",
                    candidate.price
                )
            } else if candidate.price < min_price {
                format!("${:.2} is below minimum ${min_price:.2}", candidate.price)
            } else {
                format!("${:.2} is above maximum ${max_price:.2}", candidate.price)
            },
        },
    );

    let passes_rating = candidate.rating >= MIN_RATING;
    filter_results.insert(
        "min_rating",
        FilterResult {
            passed: passes_rating,
            detail: if passes_rating {
                format!("{:.1} >= {MIN_RATING:.1}", candidate.rating)
            } else {
                format!("{:.1} < {MIN_RATING:.1} threshold", candidate.rating)
            },
        },
    );

    let passes_reviews = candidate.reviews >= MIN_REVIEWS;
    filter_results.insert(
        "min_reviews",
        FilterResult {
            passed: passes_reviews,
            detail: if passes_reviews {
                format!("{} >= {MIN_REVIEWS}", candidate.reviews)
            } else {
                format!("{} < {MIN_REVIEWS} minimum", candidate.reviews)
            },
        },
    );

    CandidateEvaluation {
        asin: candidate.asin.clone(),
        title: candidate.title.clone(),
        metrics: json!({
            "price": candidate.price,
            "rating": candidate.rating,
            "reviews": candidate.reviews,
        }),
        qualified: passes_price && passes_rating && passes_reviews,
        filter_results,
    }
}

/// Ranking: review count first, rating as tie-break.
fn select_best_match(qualified: &[Product]) -> Option<Product> {
    qualified
        .iter()
        .max_by(|a, b| {
            a.reviews
                .cmp(&b.reviews)
                .then(a.rating.total_cmp(&b.rating))
        })
        .cloned()
}

/// Extract keywords from the product title (mock LLM logic).
fn extract_keywords(product: &Product) -> Vec<String> {
    let title = product.title.to_lowercase();
    let mut keywords = vec!["stainless steel water bottle insulated".to_string()];
    if title.contains("32oz") || title.contains("30oz") {
        keywords.push("vacuum insulated bottle 32oz".to_string());
    } else {
        keywords.push("insulated water bottle".to_string());
    }
    keywords
}

/// `pipetrace demo`: run the pipeline against an in-process store and
/// print the resulting trace as API JSON.
pub(crate) async fn run_once_and_print() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let tracer = Tracer::new(store.clone(), Arc::new(SystemClock));
    let reader = TraceReader::new(store);

    let execution_id = run_competitor_selection(&tracer).await?;
    let execution = reader.get(&execution_id).await?;
    let response = crate::serve::response::ExecutionResponse::from(execution);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipetrace_storage::ExecutionStatus;

    async fn run_and_fetch() -> pipetrace_storage::ExecutionRecord {
        let store = Arc::new(MemoryStore::new());
        let tracer = Tracer::new(store.clone(), Arc::new(SystemClock));
        let reader = TraceReader::new(store);
        let id = run_competitor_selection(&tracer).await.unwrap();
        reader.get(&id).await.unwrap()
    }

    #[tokio::test]
    async fn demo_completes_with_three_steps_in_order() {
        let execution = run_and_fetch().await;
        assert_eq!(execution.status, ExecutionStatus::Completed);
        let names: Vec<&str> = execution
            .steps
            .iter()
            .map(|s| s.step_name.as_str())
            .collect();
        assert_eq!(
            names,
            ["keyword_generation", "candidate_search", "apply_filters"]
        );
    }

    #[tokio::test]
    async fn demo_selects_the_hydroflask() {
        let execution = run_and_fetch().await;
        let apply = execution
            .steps
            .iter()
            .find(|s| s.step_name == "apply_filters")
            .unwrap();
        let output = apply.output.as_ref().unwrap();
        assert_eq!(output["selected_competitor"]["asin"], "B0COMP01");
        assert_eq!(output["selected_competitor"]["reviews"], 8932);
        assert_eq!(output["total_evaluated"], 50);
    }

    #[tokio::test]
    async fn demo_context_names_the_pipeline_and_reference_product() {
        let execution = run_and_fetch().await;
        assert_eq!(execution.context["pipeline"], "competitor_selection");
        assert_eq!(
            execution.context["referenceProduct"]["title"],
            "ProBrand Stainless Steel Water Bottle 32oz Insulated"
        );
        assert_eq!(execution.context["referenceProduct"]["price"], 29.99);
    }

    #[test]
    fn price_band_and_thresholds_match_the_reference_scenario() {
        let reference = mock::reference_product();
        assert_eq!(reference.price * 0.5, 14.995);
        assert_eq!(reference.price * 2.0, 59.98);
        let products = mock::candidate_products();
        let evaluation = evaluate_candidate(&products[0], 14.995, 59.98);
        assert!(evaluation.qualified);
        assert!(evaluation.filter_results["price_range"].passed);
    }

    #[test]
    fn rating_tie_break_prefers_the_higher_rating() {
        let a = mock::Product {
            asin: "A".to_string(),
            title: "A".to_string(),
            category: "c".to_string(),
            price: 20.0,
            rating: 4.0,
            reviews: 500,
        };
        let mut b = a.clone();
        b.asin = "B".to_string();
        b.rating = 4.5;
        let selected = select_best_match(&[a, b]).unwrap();
        assert_eq!(selected.asin, "B");
    }
}
