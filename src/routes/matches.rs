use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Matcher;
use crate::error::{InputError, MatchError};
use crate::models::{
    ErrorResponse, HealthResponse, Problem, SolveOptions, SolveRequest, SolveResponse,
    TextSolveRequest,
};
use crate::services::{parse_blacklist, parse_preferences, CacheKey, ResultCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub cache: Arc<ResultCache>,
    /// Largest side accepted per request
    pub max_people: usize,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/solve", web::post().to(solve))
        .route("/matching/solve/text", web::post().to(solve_text))
        .route("/cache/stats", web::get().to(cache_stats));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Solve endpoint
///
/// POST /api/v1/matching/solve
///
/// Request body:
/// ```json
/// {
///   "women": { "A": ["X", "Y"], "B": [] },
///   "men": { "X": ["A"], "Y": ["B", "A"] },
///   "blacklist": [["B", "Y"]],
///   "scorer": "egalitarian-sum",
///   "trials": 500,
///   "seed": 42
/// }
/// ```
async fn solve(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for solve request: {}", errors);
        return validation_failed(errors.to_string());
    }

    let (problem, options) = match req.into_inner().into_problem() {
        Ok(parsed) => parsed,
        Err(e) => return match_error_response(&MatchError::Input(e)),
    };

    run_solve(&state, problem, options).await
}

/// Solve endpoint for the line-oriented text format
///
/// POST /api/v1/matching/solve/text
///
/// Request body:
/// ```json
/// {
///   "womenPrefs": "A:X,Y\nB:",
///   "menPrefs": "X:A\nY:B,A",
///   "blacklist": "B,Y",
///   "trials": 100
/// }
/// ```
async fn solve_text(
    state: web::Data<AppState>,
    req: web::Json<TextSolveRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for text solve request: {}", errors);
        return validation_failed(errors.to_string());
    }

    let req = req.into_inner();
    let parsed = parse_preferences(&req.women_prefs).and_then(|women| {
        let men = parse_preferences(&req.men_prefs)?;
        let blacklist = parse_blacklist(&req.blacklist)?;
        Problem::new(women, men, blacklist)
    });

    match parsed {
        Ok(problem) => run_solve(&state, problem, req.options).await,
        Err(e) => match_error_response(&MatchError::Input(e)),
    }
}

/// Cache statistics endpoint
async fn cache_stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.cache.stats().await)
}

async fn run_solve(state: &AppState, problem: Problem, options: SolveOptions) -> HttpResponse {
    if problem.size() > state.max_people {
        let err = InputError::TooManyPeople(problem.size(), state.max_people);
        return match_error_response(&MatchError::Input(err));
    }

    let config = match options.apply(state.matcher.defaults()) {
        Ok(config) => config,
        Err(e) => return match_error_response(&MatchError::Input(e)),
    };

    let cache_key = CacheKey::solve(&problem, &config);
    if let Some(key) = &cache_key {
        if let Ok(mut cached) = state.cache.get::<SolveResponse>(key).await {
            tracing::debug!("Serving cached result for {}", key);
            cached.cached = true;
            return HttpResponse::Ok().json(cached);
        }
    }

    tracing::info!(
        "Solving {} people per side with {} ({} trials)",
        problem.size(),
        config.method,
        config.trials
    );

    // The search is CPU bound, keep it off the reactor
    let matcher = state.matcher.clone();
    let outcome = match web::block(move || matcher.solve(&problem, &config)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return match_error_response(&e),
        Err(e) => {
            tracing::error!("Solver task failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Solver failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let response = SolveResponse::from(outcome);

    if let Some(key) = &cache_key {
        if let Err(e) = state.cache.set(key, &response).await {
            tracing::warn!("Failed to cache result: {}", e);
        }
    }

    HttpResponse::Ok().json(response)
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    match err {
        MatchError::Input(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid input".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        MatchError::NoFeasibleMatching { .. } => {
            tracing::info!("{}", err);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: "No feasible matching".to_string(),
                message: err.to_string(),
                status_code: 422,
            })
        }
        MatchError::Infeasible { .. } => {
            tracing::error!("Infeasible trial escaped the search: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    fn state(max_people: usize) -> AppState {
        AppState {
            matcher: Matcher::default(),
            cache: Arc::new(ResultCache::new(100, 60)),
            max_people,
        }
    }

    #[::core::prelude::v1::test]
    fn test_error_status_codes() {
        let input = match_error_response(&MatchError::Input(InputError::EmptySide));
        assert_eq!(input.status(), StatusCode::BAD_REQUEST);

        let none = match_error_response(&MatchError::NoFeasibleMatching { attempted: 3 });
        assert_eq!(none.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let escaped = match_error_response(&MatchError::Infeasible {
            person: "A".to_string(),
        });
        assert_eq!(escaped.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_too_many_people_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(1)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/matching/solve")
            .set_json(serde_json::json!({
                "women": {"A": [], "B": []},
                "men": {"X": [], "Y": []},
                "seed": 1
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(10)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
    }
}
