use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::staff_bank::BANK_CAPACITY;

/// Paper format of the exported document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    /// Name understood by the document backend, e.g. `"a3"`.
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    pub landscape: bool,
}

impl PageFormat {
    pub const A3_LANDSCAPE: PageFormat = PageFormat {
        name: "a3",
        width_mm: 420.0,
        height_mm: 297.0,
        landscape: true,
    };

    pub fn orientation(&self) -> &'static str {
        if self.landscape {
            "landscape"
        } else {
            "portrait"
        }
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A3_LANDSCAPE
    }
}

/// Tunables of the PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pause after switching sheets before capturing. A heuristic for
    /// letting transitions and reflow finish; swap for a real "layout is
    /// stable" signal where the platform offers one.
    #[serde(with = "millis")]
    pub settle_delay: Duration,
    /// How long the finished progress overlay stays up.
    #[serde(with = "millis")]
    pub done_delay: Duration,
    /// Device-pixel multiplier for rasterization.
    pub raster_scale: f64,
    /// JPEG quality in `0.0..=1.0`.
    pub jpeg_quality: f64,
    pub background: String,
    #[serde(skip)]
    pub page: PageFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(600),
            done_delay: Duration::from_millis(1000),
            raster_scale: 3.0,
            jpeg_quality: 0.95,
            background: "#ffffff".into(),
            page: PageFormat::A3_LANDSCAPE,
        }
    }
}

/// Mouse-wheel paging thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Wheel deltas smaller than this are trackpad noise.
    pub wheel_noise: f64,
    /// Minimum gap between two accepted wheel page turns.
    pub wheel_debounce_ms: u64,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            wheel_noise: 10.0,
            wheel_debounce_ms: 400,
        }
    }
}

/// All knobs of the designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    pub export: ExportConfig,
    pub pager: PagerConfig,
    pub bank_capacity: usize,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            pager: PagerConfig::default(),
            bank_capacity: BANK_CAPACITY,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
