pub mod stremio;

pub use stremio::{
    AccountApi, ApiError, LoginResponse, ManifestFetcher, RemoteUser, StremioClient, manifest_url,
};
