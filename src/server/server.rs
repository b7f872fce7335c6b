use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use crate::catalog_service::{DetailsResult, PostCommentResult};
use crate::catalog_store::{MovieQuery, SortField, ALL_CATEGORIES};
use crate::enrichment::EnrichmentError;
use crate::user_content::NewComment;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::auth::{authorize_user, AuthError};
use super::validation::{
    Location, ValidationErrors, Validator, COMMENT_ID_RANGE, COMMENT_TEXT_LENGTH, MOVIE_ID_RANGE,
    NUMBER_RANGE, OFFSET_RANGE, USER_ID_LENGTH,
};
use super::{http_cache, log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Everything a handler can fail with.
enum ApiError {
    Validation(ValidationErrors),
    Auth(AuthError),
    MovieNotFound,
    Internal(anyhow::Error),
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        ApiError::Validation(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => errors.into_response(),
            ApiError::Auth(e) => e.into_response(),
            ApiError::MovieNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": EnrichmentError::NotFound.to_string() })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

type ApiResult = std::result::Result<Response, ApiError>;

#[derive(Deserialize, Debug)]
struct ListParams {
    sorting: String,
    number: String,
    offset: String,
    category: String,
    descending: String,
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    sorting: String,
    number: String,
    offset: String,
    category: String,
    descending: String,
    movie_name: String,
}

#[derive(Deserialize, Debug)]
struct DetailsWithFavoritesParams {
    movie_id: String,
    favorites: String,
    user_id: String,
}

#[derive(Deserialize, Debug)]
struct FirstOrderCommentsParams {
    movie_id: String,
    number: String,
    offset: String,
}

#[derive(Deserialize, Debug)]
struct SecondOrderCommentsParams {
    movie_id: String,
    comment_id: String,
    number: String,
    offset: String,
}

#[derive(Deserialize, Debug)]
struct UserMovieParams {
    user_id: String,
    movie_id: String,
}

#[derive(Deserialize, Debug)]
struct UserPageParams {
    user_id: String,
    number: String,
    offset: String,
}

fn movie_query(
    sorting: &str,
    number: &str,
    offset: &str,
    category: &str,
    descending: &str,
) -> std::result::Result<MovieQuery, ValidationErrors> {
    let mut v = Validator::default();
    let sort = v.parsed_param::<SortField>("sorting", sorting);
    let limit = v.count_param("number", number, NUMBER_RANGE);
    let offset = v.count_param("offset", offset, OFFSET_RANGE);
    let descending = v.flag_param("descending", descending);
    v.finish()?;

    let category = (!category.eq_ignore_ascii_case(ALL_CATEGORIES)).then(|| category.to_string());
    Ok(MovieQuery {
        sort: sort.unwrap_or(SortField::Title),
        limit,
        offset,
        category,
        descending,
        title_contains: None,
    })
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

// =============================================================================
// Movies
// =============================================================================

async fn movies_test() -> &'static str {
    "Movies endpoint"
}

async fn list_movies(
    State(service): State<GuardedCatalogService>,
    Path(params): Path<ListParams>,
) -> ApiResult {
    let query = movie_query(
        &params.sorting,
        &params.number,
        &params.offset,
        &params.category,
        &params.descending,
    )?;
    let movies = service.list_movies(&query).await?;
    Ok(Json(movies).into_response())
}

async fn search_movies(
    State(service): State<GuardedCatalogService>,
    Path(params): Path<SearchParams>,
) -> ApiResult {
    let query = movie_query(
        &params.sorting,
        &params.number,
        &params.offset,
        &params.category,
        &params.descending,
    )?;
    let movies = service.search_movies(&query, &params.movie_name).await?;
    Ok(Json(movies).into_response())
}

async fn get_movie_details(
    State(service): State<GuardedCatalogService>,
    Path(movie_id): Path<String>,
) -> ApiResult {
    let mut v = Validator::default();
    let movie_id = v.int_param("movieId", &movie_id, MOVIE_ID_RANGE);
    v.finish()?;

    match service.movie_details(movie_id).await? {
        DetailsResult::Found(details) => Ok(Json(details).into_response()),
        DetailsResult::NotFound => Err(ApiError::MovieNotFound),
    }
}

async fn get_movie_details_with_favorites(
    State(service): State<GuardedCatalogService>,
    Path(params): Path<DetailsWithFavoritesParams>,
) -> ApiResult {
    let mut v = Validator::default();
    let movie_id = v.int_param("movieId", &params.movie_id, MOVIE_ID_RANGE);
    let include_favorites = v.flag_param("favorites", &params.favorites);
    v.length("userId", &params.user_id, USER_ID_LENGTH, Location::Params);
    v.finish()?;

    match service
        .movie_details_with_favorites(movie_id, include_favorites, &params.user_id)
        .await?
    {
        DetailsResult::Found(details) => Ok(Json(details).into_response()),
        DetailsResult::NotFound => Err(ApiError::MovieNotFound),
    }
}

async fn get_sorting_methods(State(service): State<GuardedCatalogService>) -> impl IntoResponse {
    Json(service.sorting_methods())
}

async fn refresh_posters(State(state): State<ServerState>) -> StatusCode {
    let service = state.catalog_service.clone();
    let batch_size = state.config.poster_refresh_batch_size;
    tokio::spawn(async move {
        if let Err(e) = service.refresh_missing_posters(batch_size).await {
            error!("Poster refresh failed: {:#}", e);
        }
    });
    StatusCode::OK
}

// =============================================================================
// Comments
// =============================================================================

async fn get_first_order_comments(
    State(service): State<GuardedCatalogService>,
    Path(params): Path<FirstOrderCommentsParams>,
) -> ApiResult {
    let mut v = Validator::default();
    let movie_id = v.int_param("movieId", &params.movie_id, MOVIE_ID_RANGE);
    let limit = v.count_param("number", &params.number, NUMBER_RANGE);
    let offset = v.count_param("offset", &params.offset, OFFSET_RANGE);
    v.finish()?;

    let comments = service.first_order_comments(movie_id, limit, offset)?;
    Ok(Json(comments).into_response())
}

async fn get_second_order_comments(
    State(service): State<GuardedCatalogService>,
    Path(params): Path<SecondOrderCommentsParams>,
) -> ApiResult {
    let mut v = Validator::default();
    let movie_id = v.int_param("movieId", &params.movie_id, MOVIE_ID_RANGE);
    let comment_id = v.int_param("commentId", &params.comment_id, COMMENT_ID_RANGE);
    let limit = v.count_param("number", &params.number, NUMBER_RANGE);
    let offset = v.count_param("offset", &params.offset, OFFSET_RANGE);
    v.finish()?;

    let comments = service.second_order_comments(movie_id, comment_id, limit, offset)?;
    Ok(Json(comments).into_response())
}

async fn post_comment(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(params): Path<UserMovieParams>,
    Json(comment): Json<NewComment>,
) -> ApiResult {
    let mut v = Validator::default();
    v.length("userId", &params.user_id, USER_ID_LENGTH, Location::Params);
    let movie_id = v.int_param("movieId", &params.movie_id, MOVIE_ID_RANGE);
    if let Some(reply_comment_id) = comment.reply_comment_id {
        v.int_value("replyCommentId", reply_comment_id, COMMENT_ID_RANGE);
    }
    v.length("text", &comment.text, COMMENT_TEXT_LENGTH, Location::Body);
    v.finish()?;
    authorize_user(state.config.jwt_secret.as_deref(), &headers, &params.user_id)?;

    match state
        .catalog_service
        .post_comment(&params.user_id, movie_id, &comment)?
    {
        PostCommentResult::Posted(comment_id) => {
            info!("User {} commented on movie {}", params.user_id, movie_id);
            Ok(Json(json!({ "commentId": comment_id })).into_response())
        }
        PostCommentResult::MovieNotFound => Err(ApiError::MovieNotFound),
        PostCommentResult::ReplyTargetNotFound => Err(ValidationErrors::single(
            "replyCommentId",
            comment
                .reply_comment_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            "Not a first-order comment of this movie".to_string(),
            Location::Body,
        )
        .into()),
    }
}

// =============================================================================
// Favorites
// =============================================================================

async fn toggle_favorite(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(params): Path<UserMovieParams>,
) -> ApiResult {
    let mut v = Validator::default();
    v.length("userId", &params.user_id, USER_ID_LENGTH, Location::Params);
    let movie_id = v.int_param("movieId", &params.movie_id, MOVIE_ID_RANGE);
    v.finish()?;
    authorize_user(state.config.jwt_secret.as_deref(), &headers, &params.user_id)?;

    match state
        .catalog_service
        .toggle_favorite(&params.user_id, movie_id)?
    {
        Some(is_favorite) => Ok(Json(json!({ "favorites": is_favorite })).into_response()),
        None => Err(ApiError::MovieNotFound),
    }
}

async fn get_favorites(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(params): Path<UserPageParams>,
) -> ApiResult {
    let mut v = Validator::default();
    v.length("userId", &params.user_id, USER_ID_LENGTH, Location::Params);
    let limit = v.count_param("number", &params.number, NUMBER_RANGE);
    let offset = v.count_param("offset", &params.offset, OFFSET_RANGE);
    v.finish()?;
    authorize_user(state.config.jwt_secret.as_deref(), &headers, &params.user_id)?;

    let movies = state
        .catalog_service
        .favorite_movies(&params.user_id, limit, offset)?;
    Ok(Json(movies).into_response())
}

pub fn make_app(config: ServerConfig, catalog_service: GuardedCatalogService) -> Router {
    let state = ServerState::new(config.clone(), catalog_service);

    let cached_movie_routes: Router = Router::new()
        .route("/test", get(movies_test))
        .route(
            "/list/{sorting}/{number}/{offset}/{category}/{descending}",
            get(list_movies),
        )
        .route(
            "/search/{sorting}/{number}/{offset}/{category}/{descending}/{movie_name}",
            get(search_movies),
        )
        .route("/details/{movie_id}", get(get_movie_details))
        .route("/sorting", get(get_sorting_methods))
        .layer(middleware::from_fn_with_state(
            config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    // Per-user or side-effecting, never cached
    let movie_routes: Router = Router::new()
        .route(
            "/details/{movie_id}/{favorites}/{user_id}",
            get(get_movie_details_with_favorites),
        )
        .route("/update", get(refresh_posters))
        .with_state(state.clone())
        .merge(cached_movie_routes);

    let comment_routes: Router = Router::new()
        .route(
            "/getFirstOrderComments/{movie_id}/{number}/{offset}",
            get(get_first_order_comments),
        )
        .route(
            "/getSecondOrderComments/{movie_id}/{comment_id}/{number}/{offset}",
            get(get_second_order_comments),
        )
        .route("/{user_id}/{movie_id}", post(post_comment))
        .with_state(state.clone());

    let favorite_routes: Router = Router::new()
        .route("/{user_id}/{movie_id}", post(toggle_favorite))
        .route("/{user_id}/{number}/{offset}", get(get_favorites))
        .with_state(state.clone());

    Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/movies", movie_routes)
        .nest("/comments", comment_routes)
        .nest("/favorites", favorite_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, catalog_service: GuardedCatalogService) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalog_service);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Serving on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
