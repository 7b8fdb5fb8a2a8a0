//! Multi-sheet PDF export.
//!
//! The pipeline walks the sheets strictly in order over a single shared
//! capture surface: show sheet `i`, wait for fonts and layout to settle,
//! rasterize, append the image as a page, and only then move on. The
//! browser pieces (rasterizer, PDF writer, timers, the capture surface
//! itself) are reached through the traits below so the sequencing can be
//! driven and checked without a browser.

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::{ExportConfig, PageFormat};
use crate::error::ExportError;

const STATUS_PREPARING: &str = "Подготовка экспорта...";
const STATUS_DOWNLOADING: &str = "Скачивание...";

/// Export progress as shown by the overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    Exporting {
        /// Sheet currently on the capture surface.
        sheet: usize,
        /// 0–100.
        progress: u8,
        text: String,
    },
}

impl ExportStatus {
    pub fn is_exporting(&self) -> bool {
        matches!(self, ExportStatus::Exporting { .. })
    }

    pub fn progress(&self) -> u8 {
        match self {
            ExportStatus::Idle => 0,
            ExportStatus::Exporting { progress, .. } => *progress,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ExportStatus::Idle => "",
            ExportStatus::Exporting { text, .. } => text,
        }
    }

    fn exporting(sheet: usize, progress: u8, text: impl Into<String>) -> Self {
        ExportStatus::Exporting {
            sheet,
            progress,
            text: text.into(),
        }
    }
}

/// Progress before processing page `page` of `total`.
pub fn progress_percent(page: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((page as f64 / total as f64) * 100.0).round() as u8
}

pub fn page_status_text(page: usize, total: usize) -> String {
    format!("Обработка страницы {} из {}...", page + 1, total)
}

/// Download name of the document, stamped with `today`.
pub fn export_filename(today: NaiveDate) -> String {
    format!("График_A3_{}.pdf", today.format("%d-%m-%Y"))
}

/// Arguments of one rasterization call.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    pub sheet: usize,
    pub scale: f64,
    pub background: String,
}

/// How the bitmap is embedded in the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageEncoding {
    Jpeg { quality: f64 },
}

/// Placement of an image on a page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageFrame {
    /// Edge to edge.
    pub fn full_bleed(page: &PageFormat) -> Self {
        Self {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: page.width_mm,
            height_mm: page.height_mm,
        }
    }
}

/// The UI side of an export: the capture surface, timers and the overlay.
#[allow(async_fn_in_trait)]
pub trait ExportHost {
    /// Point the pager (and with it the off-screen capture target) at `sheet`.
    fn show_sheet(&mut self, sheet: usize);

    /// Resolves once web fonts are loaded and text metrics are stable.
    async fn fonts_ready(&mut self) -> Result<(), ExportError>;

    async fn sleep(&mut self, duration: Duration);

    fn report(&mut self, status: ExportStatus);
}

/// Renders the capture target to a bitmap.
#[allow(async_fn_in_trait)]
pub trait Rasterizer {
    type Bitmap;

    async fn rasterize(&mut self, options: &CaptureOptions) -> Result<Self::Bitmap, ExportError>;
}

/// An open multi-page document. The first page exists from creation.
pub trait PageDocument<B> {
    fn add_page(&mut self, page: &PageFormat) -> Result<(), ExportError>;

    fn draw_image(
        &mut self,
        bitmap: &B,
        encoding: ImageEncoding,
        frame: PageFrame,
    ) -> Result<(), ExportError>;

    fn save(&mut self, filename: &str) -> Result<(), ExportError>;
}

/// Creates documents for the pipeline.
pub trait DocumentBackend<B> {
    type Document: PageDocument<B>;

    fn create(&mut self, page: &PageFormat) -> Result<Self::Document, ExportError>;
}

/// Everything a run needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub total_sheets: usize,
    /// Sheet to return to afterwards.
    pub original_sheet: usize,
    pub today: NaiveDate,
    pub config: ExportConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub pages: usize,
    pub filename: String,
}

/// Export every sheet of `job` into one document and save it.
///
/// On success the overlay lingers for `done_delay` before going back to
/// idle. On failure the original sheet is restored, the status goes straight
/// back to idle and the error is returned for the caller to surface.
pub async fn run_export<H, R, B>(
    job: ExportJob,
    host: &mut H,
    rasterizer: &mut R,
    backend: &mut B,
) -> Result<ExportSummary, ExportError>
where
    H: ExportHost,
    R: Rasterizer,
    B: DocumentBackend<R::Bitmap>,
{
    tracing::info!("exporting {} sheet(s)", job.total_sheets);
    match export_pages(&job, host, rasterizer, backend).await {
        Ok(summary) => {
            tracing::info!("saved {} ({} pages)", summary.filename, summary.pages);
            host.sleep(job.config.done_delay).await;
            host.report(ExportStatus::Idle);
            Ok(summary)
        }
        Err(err) => {
            tracing::error!("export failed: {err}");
            host.show_sheet(job.original_sheet);
            host.report(ExportStatus::Idle);
            Err(err)
        }
    }
}

async fn export_pages<H, R, B>(
    job: &ExportJob,
    host: &mut H,
    rasterizer: &mut R,
    backend: &mut B,
) -> Result<ExportSummary, ExportError>
where
    H: ExportHost,
    R: Rasterizer,
    B: DocumentBackend<R::Bitmap>,
{
    let config = &job.config;
    let total = job.total_sheets.max(1);

    host.report(ExportStatus::exporting(job.original_sheet, 0, STATUS_PREPARING));
    host.fonts_ready().await?;

    let mut document = backend.create(&config.page)?;
    let frame = PageFrame::full_bleed(&config.page);
    let encoding = ImageEncoding::Jpeg {
        quality: config.jpeg_quality,
    };

    for sheet in 0..total {
        host.report(ExportStatus::exporting(
            sheet,
            progress_percent(sheet, total),
            page_status_text(sheet, total),
        ));

        host.show_sheet(sheet);
        host.fonts_ready().await?;
        host.sleep(config.settle_delay).await;

        let options = CaptureOptions {
            sheet,
            scale: config.raster_scale,
            background: config.background.clone(),
        };
        let bitmap = rasterizer.rasterize(&options).await?;

        if sheet > 0 {
            document.add_page(&config.page)?;
        }
        document.draw_image(&bitmap, encoding, frame)?;
        tracing::debug!("sheet {} of {} captured", sheet + 1, total);
    }

    host.show_sheet(job.original_sheet);
    host.report(ExportStatus::exporting(job.original_sheet, 100, STATUS_DOWNLOADING));

    let filename = export_filename(job.today);
    document.save(&filename)?;

    Ok(ExportSummary {
        pages: total,
        filename,
    })
}
