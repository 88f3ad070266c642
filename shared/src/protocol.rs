use crate::{LoginRequest, LoginResponse, RegisterRequest, UpdatePasswordRequest, UserInfo};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET / DELETE carry their parameters in the query string.
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the API base path (`/api`).
pub trait ApiRequest: Serialize {
    /// The `data` payload of a successful envelope.
    type Response: DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
}

// =========================================================
// Request Definitions
// =========================================================

/// The login endpoint never carries an `Authorization` header.
pub const LOGIN_PATH: &str = "/login";

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = LOGIN_PATH;
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for RegisterRequest {
    type Response = ();
    const PATH: &'static str = "/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Fetch the signed-in user's profile
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = UserInfo;
    const PATH: &'static str = "/user/info";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for UpdatePasswordRequest {
    type Response = ();
    const PATH: &'static str = "/user/password";
    const METHOD: HttpMethod = HttpMethod::Put;
}
