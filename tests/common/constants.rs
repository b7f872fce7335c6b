//! Shared constants for end-to-end tests
//!
//! When the seeded catalog or the fake provider data changes, update only
//! this file.

// ============================================================================
// Test Users
// ============================================================================

/// Regular test user, ids are 28 characters like the issuer's uids
pub const USER_1_ID: &str = "Xb3kPz0Qw8LmN2vR7tY5uI9oA1sD";

/// Second test user, used to check per-user isolation
pub const USER_2_ID: &str = "Lq9wE2rT5yU8iO1pA4sD7fG0hJ3k";

/// Secret used to sign tokens when token validation is enabled
pub const JWT_SECRET: &str = "e2e-test-secret";

// ============================================================================
// Seeded Catalog
// ============================================================================

/// Complete movie, never sent to the providers
pub const COMPLETE_MOVIE_ID: i64 = 12546;
pub const COMPLETE_MOVIE_TITLE: &str = "Alpha Complete";
pub const COMPLETE_MOVIE_DESCRIPTION: &str = "A movie that needs nothing";
pub const COMPLETE_MOVIE_POSTER: &str = "http://posters.test/alpha.jpg";

/// Stale movie that the primary provider knows about
pub const STALE_MOVIE_ID: i64 = 2;
pub const STALE_MOVIE_TITLE: &str = "Beta Stale";

/// Stale movie the primary provider does not know
pub const UNKNOWN_MOVIE_ID: i64 = 3;
pub const UNKNOWN_MOVIE_TITLE: &str = "Gamma Unknown";

/// Stale movie with a poster but no description; only the fallback provider
/// has a poster for it once the poster is cleared
pub const POSTERLESS_MOVIE_ID: i64 = 4;
pub const POSTERLESS_MOVIE_TITLE: &str = "Delta Posterless";

/// Id that is not in the catalog
pub const MISSING_MOVIE_ID: i64 = 999;

/// Genre of the complete movie
pub const DRAMA_GENRE: &str = "Drama";

/// Total number of seeded movies
pub const SEEDED_MOVIES_COUNT: usize = 4;

// ============================================================================
// Fake Provider Data
// ============================================================================

pub const STALE_MOVIE_PLOT: &str = "Freshly fetched plot";
pub const STALE_MOVIE_PROVIDER_POSTER: &str = "http://posters.test/beta.jpg";
pub const STALE_MOVIE_DIRECTOR: &str = "Jane Doe";
pub const STALE_MOVIE_ACTORS: &str = "John Roe, Mary Moe";
pub const STALE_MOVIE_GENRES: &str = "Comedy, Drama";

/// Relative poster path the fallback provider returns for the posterless movie
pub const FALLBACK_POSTER_PATH: &str = "/delta.jpg";

/// Profile path the person search returns for "Doe"
pub const DOE_PROFILE_PATH: &str = "/doe.jpg";

/// Prefix the server puts in front of fallback provider image paths
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
