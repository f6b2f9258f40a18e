//! HTTP client for the MovieHub API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{
    Deserialize,
    de::{DeserializeOwned, IgnoredAny},
};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::models::{Comment, Health, Movie, NewMovie, VoteResult, VoteStats};
use crate::session::Session;

#[derive(Deserialize)]
struct MoviesEnvelope {
    movies: Vec<Movie>,
}

#[derive(Deserialize)]
struct TopMoviesEnvelope {
    #[serde(rename = "topMovies")]
    top_movies: Vec<Movie>,
}

#[derive(Deserialize)]
struct MovieEnvelope {
    movie: Movie,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct CommentEnvelope {
    comment: Comment,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// MovieHub API client.
///
/// Holds no session of its own; authenticated calls take one explicitly.
#[derive(Debug, Clone)]
pub struct MovieHubClient {
    http: Client,
    base_url: Url,
}

impl MovieHubClient {
    /// Create a client for the API mounted at `base_url`
    /// (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Self::with_http_client(http, base_url)
    }

    /// Create a client around an existing `reqwest` client.
    pub fn with_http_client(http: Client, base_url: &str) -> ClientResult<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http, base_url })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: Option<&Session>,
    ) -> ClientResult<T> {
        let request = match session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %body, "API request failed");

            let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.code, envelope.error.message),
                Err(_) => (status.as_str().to_string(), body),
            };

            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Liveness check.
    pub async fn health(&self) -> ClientResult<Health> {
        let request = self.http.get(self.url("health")?);
        self.send(request, None).await
    }

    /// Ranked movies. With a session each movie carries `user_vote`.
    pub async fn movies(&self, session: Option<&Session>) -> ClientResult<Vec<Movie>> {
        let request = self.http.get(self.url("movies")?);
        let envelope: MoviesEnvelope = self.send(request, session).await?;
        Ok(envelope.movies)
    }

    /// Add a movie.
    pub async fn create_movie(&self, session: &Session, movie: &NewMovie) -> ClientResult<Movie> {
        let request = self.http.post(self.url("movies")?).json(movie);
        let envelope: MovieEnvelope = self.send(request, Some(session)).await?;
        Ok(envelope.movie)
    }

    /// Delete a movie (admin only).
    pub async fn delete_movie(&self, session: &Session, movie_id: &str) -> ClientResult<()> {
        let request = self.http.delete(self.url(&format!("movies/{movie_id}"))?);
        let _: IgnoredAny = self.send(request, Some(session)).await?;
        Ok(())
    }

    /// Leaderboard (admin only).
    pub async fn top_movies(
        &self,
        session: &Session,
        limit: Option<u32>,
    ) -> ClientResult<Vec<Movie>> {
        let mut url = self.url("movies/top")?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }

        let envelope: TopMoviesEnvelope = self.send(self.http.get(url), Some(session)).await?;
        Ok(envelope.top_movies)
    }

    /// Vote aggregate for one movie.
    pub async fn vote_stats(&self, movie_id: &str) -> ClientResult<VoteStats> {
        let request = self
            .http
            .get(self.url(&format!("movies/{movie_id}/votes"))?);
        self.send(request, None).await
    }

    /// Cast (`1`/`-1`) or remove (`0`) a vote.
    pub async fn vote(
        &self,
        session: &Session,
        movie_id: &str,
        vote_type: i16,
    ) -> ClientResult<VoteResult> {
        let request = self
            .http
            .post(self.url("votes")?)
            .json(&json!({ "movie_id": movie_id, "vote_type": vote_type }));
        self.send(request, Some(session)).await
    }

    /// Comments on a movie, newest first.
    pub async fn comments(&self, movie_id: &str) -> ClientResult<Vec<Comment>> {
        let request = self
            .http
            .get(self.url(&format!("comments/movie/{movie_id}"))?);
        let envelope: CommentsEnvelope = self.send(request, None).await?;
        Ok(envelope.comments)
    }

    /// Post a comment.
    pub async fn add_comment(
        &self,
        session: &Session,
        movie_id: &str,
        body: &str,
    ) -> ClientResult<Comment> {
        let request = self
            .http
            .post(self.url("comments")?)
            .json(&json!({ "movie_id": movie_id, "body": body }));
        let envelope: CommentEnvelope = self.send(request, Some(session)).await?;
        Ok(envelope.comment)
    }

    /// Replace the body of one of the caller's comments.
    pub async fn edit_comment(
        &self,
        session: &Session,
        comment_id: &str,
        body: &str,
    ) -> ClientResult<Comment> {
        let request = self
            .http
            .put(self.url(&format!("comments/{comment_id}"))?)
            .json(&json!({ "body": body }));
        let envelope: CommentEnvelope = self.send(request, Some(session)).await?;
        Ok(envelope.comment)
    }

    /// Delete a comment (owner or admin).
    pub async fn delete_comment(&self, session: &Session, comment_id: &str) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.url(&format!("comments/{comment_id}"))?);
        let _: IgnoredAny = self.send(request, Some(session)).await?;
        Ok(())
    }
}
