//! Uploading finished crops.

use crate::error::CropError;

use super::collaborators::ImageUploader;
use super::result::CropResult;

/// Upload the image results and return one URL per result, in order.
///
/// Videos are not images: they keep their own URI. The whole upload call
/// is retried up to `attempts` times (the uploader must tolerate repeats),
/// and a response whose length differs from the request counts as a failure.
pub fn publish(
    uploader: &dyn ImageUploader,
    results: &[CropResult],
    attempts: u32,
) -> Result<Vec<String>, CropError> {
    let images: Vec<String> = results
        .iter()
        .filter(|r| !r.is_video())
        .map(|r| r.uri.clone())
        .collect();

    let remote = if images.is_empty() {
        Vec::new()
    } else {
        upload_with_retry(uploader, &images, attempts.max(1))?
    };

    let mut remote = remote.into_iter();
    let mut urls = Vec::with_capacity(results.len());
    for result in results {
        if result.is_video() {
            urls.push(result.uri.clone());
        } else {
            // Length was checked against `images`.
            let url = remote
                .next()
                .ok_or_else(|| CropError::UploadFailure("missing URL".to_string()))?;
            urls.push(url);
        }
    }
    Ok(urls)
}

fn upload_with_retry(
    uploader: &dyn ImageUploader,
    uris: &[String],
    attempts: u32,
) -> Result<Vec<String>, CropError> {
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match uploader.upload_images(uris) {
            Ok(urls) if urls.len() == uris.len() => return Ok(urls),
            Ok(urls) => {
                last_error = format!("expected {} URLs, got {}", uris.len(), urls.len());
            }
            Err(e) => last_error = e,
        }
        tracing::warn!(attempt, attempts, error = %last_error, "upload attempt failed");
    }
    Err(CropError::UploadFailure(last_error))
}
