use serde::{Deserialize, Serialize};

/// Side of the square (circular) editing viewport, in CSS pixels.
/// Stored offsets and scales are expressed in this space.
pub const EDITOR_SIZE_PX: f64 = 256.0;

/// Thumbnail side inside roster cells.
pub const CELL_THUMB_PX: f64 = 48.0;

/// Thumbnail side inside the cell editor dialog.
pub const MODAL_THUMB_PX: f64 = 64.0;

/// Uploaded photos are downscaled so their longest side fits this.
pub const MAX_UPLOAD_DIM_PX: f64 = 1000.0;

/// JPEG quality of the re-encoded upload.
pub const UPLOAD_JPEG_QUALITY: f64 = 0.85;

pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 3.0;

/// Encoded photo, usually a `data:image/jpeg;base64,...` URL.
///
/// Two avatars are the same person for staff-bank purposes iff their
/// images are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvatarImage(pub String);

impl AvatarImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Top-left placement of the scaled photo inside the editor viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarOffset {
    pub x: f64,
    pub y: f64,
}

impl AvatarOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What the avatar editor hands back on save.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarEdit {
    pub image: AvatarImage,
    pub scale: f64,
    pub offset: AvatarOffset,
}

/// Scale and offset that make a `width`×`height` photo cover the whole
/// viewport, centred.
pub fn cover_fit(width: f64, height: f64) -> Option<(f64, AvatarOffset)> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let scale = (EDITOR_SIZE_PX / width).max(EDITOR_SIZE_PX / height);
    let x = (EDITOR_SIZE_PX - width * scale) / 2.0;
    let y = (EDITOR_SIZE_PX - height * scale) / 2.0;
    Some((scale, AvatarOffset::new(x, y)))
}

/// Shrink `width`×`height` so the longest side is at most `max_dim`,
/// keeping the aspect ratio. Smaller images are left alone.
pub fn fit_within(width: f64, height: f64, max_dim: f64) -> (f64, f64) {
    if width > height {
        if width > max_dim {
            return (max_dim, height * max_dim / width);
        }
    } else if height > max_dim {
        return (width * max_dim / height, max_dim);
    }
    (width, height)
}

pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Pointer drag in progress: remembers where the grab happened relative to
/// the current offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    anchor: AvatarOffset,
}

impl DragSession {
    pub fn begin(pointer_x: f64, pointer_y: f64, offset: AvatarOffset) -> Self {
        Self {
            anchor: AvatarOffset::new(pointer_x - offset.x, pointer_y - offset.y),
        }
    }

    /// Offset after the pointer moved to (`pointer_x`, `pointer_y`).
    pub fn offset_at(&self, pointer_x: f64, pointer_y: f64) -> AvatarOffset {
        AvatarOffset::new(pointer_x - self.anchor.x, pointer_y - self.anchor.y)
    }
}

/// CSS transform reproducing the editor framing at a smaller size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl AvatarTransform {
    pub fn for_thumbnail(scale: f64, offset: AvatarOffset, size_px: f64) -> Self {
        let ratio = size_px / EDITOR_SIZE_PX;
        Self {
            translate_x: offset.x * ratio,
            translate_y: offset.y * ratio,
            scale: scale * ratio,
        }
    }

    /// Value for a `transform` style with `transform-origin: 0 0`.
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}
