//! Profile pictures: multipart intake, normalization to a 250x250 PNG and storage.

use std::io::Cursor;

use actix_multipart::Multipart;
use futures::TryStreamExt;
use image::imageops::FilterType;
use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the multipart file field carrying the picture.
pub const AVATAR_FIELD: &str = "avatar";
pub const MAX_AVATAR_BYTES: usize = 1_000_000;
pub const AVATAR_SIZE: u32 = 250;

lazy_static! {
    static ref AVATAR_FILENAME: Regex = Regex::new(r"\.(jpg|png|jpeg)$").unwrap();
}

pub fn is_accepted_filename(filename: &str) -> bool {
    AVATAR_FILENAME.is_match(filename)
}

/// Pulls the `avatar` file out of a multipart body.
///
/// The filename is checked before any of the file is read, and reading stops as soon as
/// the size limit is crossed. Other fields are skipped.
pub async fn read_upload(payload: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition();
        let is_avatar = disposition.get_name() == Some(AVATAR_FIELD);
        let filename = disposition.get_filename().map(str::to_string);

        if !is_avatar {
            while field.try_next().await?.is_some() {}
            continue;
        }

        match filename {
            Some(ref name) if is_accepted_filename(name) => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Please upload an image in jpg, jpeg or png format".into(),
                ))
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > MAX_AVATAR_BYTES {
                return Err(AppError::BadRequest("File too large".into()));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(bytes);
    }

    Err(AppError::BadRequest("Please upload an avatar image".into()))
}

/// Decodes `bytes`, scales and center-crops to cover 250x250 and re-encodes as PNG.
pub async fn normalize(bytes: Vec<u8>) -> Result<Vec<u8>, AppError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let image = image::load_from_memory(&bytes)?;
        let resized = image.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

        let mut png = Vec::new();
        resized.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    })
    .await?
}

pub async fn upload_avatar(state: &AppState, user_id: Uuid, bytes: Vec<u8>) -> Result<(), AppError> {
    let png = normalize(bytes).await?;
    state.store.set_avatar(user_id, Some(png)).await?;
    log::info!("User {} uploaded an avatar", user_id);
    Ok(())
}

pub async fn delete_avatar(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    state.store.set_avatar(user_id, None).await?;
    log::info!("User {} removed their avatar", user_id);
    Ok(())
}

/// Public lookup. Every miss (bad id, no user, no picture) is the same 400.
pub async fn fetch_avatar(state: &AppState, raw_id: &str) -> Result<Vec<u8>, AppError> {
    let missing = || AppError::BadRequest("Avatar not found".into());

    let id = Uuid::parse_str(raw_id).map_err(|_| missing())?;
    state
        .store
        .find_user(id)
        .await?
        .and_then(|user| user.avatar)
        .ok_or_else(missing)
}
