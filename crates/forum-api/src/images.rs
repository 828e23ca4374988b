use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::future::join_all;
use tracing::{error, info, warn};

use forum_types::api::{FailedImage, UploadImagesResponse, UploadedImage};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::ownership::{ResourceKind, ensure_owner};
use crate::params::resource_id;
use crate::state::AppState;
use crate::storage::public_url;

/// Multipart field carrying the image files.
const IMAGES_FIELD: &str = "images";

struct PendingImage {
    filename: String,
    data: Bytes,
}

/// POST /posts/{id}/images: stores every `images` part of a multipart body.
///
/// Each file is written concurrently; recording its row is serialized through
/// `AppStateInner::image_writes`. Files are independent: a failure is reported
/// for that file only and never rolls back its siblings.
pub async fn upload_post_images(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = resource_id(path, ResourceKind::Post)?;
    let mut multipart = multipart?;

    ensure_owner(&state, ResourceKind::Post, post_id, user_id).await?;

    let mut pending = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        pending.push(PendingImage { filename, data });
    }

    if pending.is_empty() {
        return Err(ApiError::BadRequest("No Images Provided".to_string()));
    }

    let handles: Vec<_> = pending
        .into_iter()
        .map(|image| {
            let state = state.clone();
            let filename = image.filename.clone();
            let handle = tokio::spawn(async move { store_image(&state, post_id, image).await });
            (filename, handle)
        })
        .collect();

    let (names, handles): (Vec<String>, Vec<_>) = handles.into_iter().unzip();
    let outcomes = join_all(handles).await;

    let mut uploaded = Vec::new();
    let mut failed = Vec::new();
    for (filename, outcome) in names.into_iter().zip(outcomes) {
        match outcome {
            Ok(Ok(image)) => uploaded.push(image),
            Ok(Err(e)) => {
                error!("Upload of {:?} for post {} failed: {:#}", filename, post_id, e);
                failed.push(FailedImage {
                    filename,
                    error: "Failed to store image".to_string(),
                });
            }
            Err(e) => {
                error!("Upload task for {:?} on post {} panicked: {}", filename, post_id, e);
                failed.push(FailedImage {
                    filename,
                    error: "Failed to store image".to_string(),
                });
            }
        }
    }

    let (status, message) = match (uploaded.len(), failed.len()) {
        (_, 0) => (StatusCode::OK, "Post Images Uploaded"),
        (0, _) => (StatusCode::INTERNAL_SERVER_ERROR, "No Images Uploaded"),
        _ => (StatusCode::MULTI_STATUS, "Some Images Failed To Upload"),
    };

    if failed.is_empty() {
        info!("Stored {} image(s) for post {}", uploaded.len(), post_id);
    } else {
        warn!(
            "Stored {} of {} image(s) for post {}",
            uploaded.len(),
            uploaded.len() + failed.len(),
            post_id
        );
    }

    Ok((
        status,
        Json(UploadImagesResponse {
            message: message.to_string(),
            uploaded,
            failed,
        }),
    ))
}

/// Write one file, then record it. A file whose row cannot be recorded is
/// removed again so no orphan stays on disk.
async fn store_image(state: &AppState, post_id: i64, image: PendingImage) -> anyhow::Result<UploadedImage> {
    let path = state
        .storage
        .store_post_image(post_id, &image.filename, &image.data)
        .await?;

    let recorded = {
        let _guard = state.image_writes.lock().await;
        let db_state = state.clone();
        let db_path = path.clone();
        tokio::task::spawn_blocking(move || db_state.db.insert_post_image(post_id, &db_path)).await
    };

    let id = match recorded {
        Ok(Ok(id)) => id,
        Ok(Err(e)) => {
            discard(state, &path).await;
            return Err(e);
        }
        Err(e) => {
            discard(state, &path).await;
            return Err(e.into());
        }
    };

    Ok(UploadedImage {
        filename: image.filename,
        id,
        url: public_url(&path),
    })
}

async fn discard(state: &AppState, path: &str) {
    if let Err(e) = state.storage.delete_file(path).await {
        warn!("Failed to remove unrecorded image {}: {}", path, e);
    }
}
