use dioxus::prelude::*;

use grafoman_common::app_state::AppState;
use grafoman_common::error::ExportError;
use grafoman_common::export::{ExportJob, ExportSummary};

use super::designer_state::today;

/// DOM id of the off-screen sheet that gets rasterized.
pub const CAPTURE_TARGET_ID: &str = "capture-sheet";

/// Kick off a PDF export unless one is already running.
pub fn start_export(mut state: Signal<AppState>) {
    let job = match state.write().begin_export(today()) {
        Ok(job) => job,
        Err(e) => {
            tracing::debug!("export request ignored: {e}");
            return;
        }
    };

    spawn(async move {
        let result = export(job, state).await;
        state.write().finish_export(&result);
    });
}

#[cfg(target_family = "wasm")]
async fn export(job: ExportJob, state: Signal<AppState>) -> Result<ExportSummary, ExportError> {
    use grafoman_common::export::run_export;

    let mut host = wasm::BrowserHost { state };
    let mut rasterizer = wasm::Html2Canvas;
    let mut backend = wasm::JsPdfBackend;
    run_export(job, &mut host, &mut rasterizer, &mut backend).await
}

#[cfg(not(target_family = "wasm"))]
async fn export(_job: ExportJob, _state: Signal<AppState>) -> Result<ExportSummary, ExportError> {
    Err(ExportError::Document("PDF export needs a browser".into()))
}

#[cfg(target_family = "wasm")]
mod wasm {
    use std::time::Duration;

    use dioxus::prelude::*;
    use serde::Serialize;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use grafoman_common::app_state::AppState;
    use grafoman_common::config::PageFormat;
    use grafoman_common::error::ExportError;
    use grafoman_common::export::{
        CaptureOptions, DocumentBackend, ExportHost, ExportStatus, ImageEncoding, PageDocument,
        PageFrame, Rasterizer,
    };

    use super::CAPTURE_TARGET_ID;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_name = html2canvas)]
        fn html2canvas(element: &web_sys::HtmlElement, options: &JsValue) -> Result<js_sys::Promise, JsValue>;

        #[wasm_bindgen(js_namespace = jspdf, js_name = jsPDF)]
        type JsPdf;

        #[wasm_bindgen(constructor, catch, js_namespace = jspdf, js_class = "jsPDF")]
        fn new(options: &JsValue) -> Result<JsPdf, JsValue>;

        #[wasm_bindgen(method, catch, js_name = addPage)]
        fn add_page(this: &JsPdf, format: &str, orientation: &str) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(method, catch, js_name = addImage)]
        #[allow(clippy::too_many_arguments)]
        fn add_image(
            this: &JsPdf,
            data: &str,
            format: &str,
            x: f64,
            y: f64,
            width: f64,
            height: f64,
            alias: JsValue,
            compression: &str,
        ) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(method, catch)]
        fn save(this: &JsPdf, filename: &str) -> Result<JsValue, JsValue>;
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Html2CanvasOptions<'a> {
        scale: f64,
        use_cors: bool,
        allow_taint: bool,
        background_color: &'a str,
        logging: bool,
    }

    #[derive(Serialize)]
    struct JsPdfOptions<'a> {
        orientation: &'a str,
        unit: &'a str,
        format: &'a str,
        compress: bool,
    }

    fn js_err(e: JsValue) -> String {
        e.as_string().unwrap_or_else(|| format!("{:?}", e))
    }

    /// Connects the pipeline to the running app: the capture target follows
    /// the pager, the overlay reads the export status.
    pub struct BrowserHost {
        pub state: Signal<AppState>,
    }

    impl ExportHost for BrowserHost {
        fn show_sheet(&mut self, sheet: usize) {
            self.state.write().show_sheet_for_export(sheet);
        }

        async fn fonts_ready(&mut self) -> Result<(), ExportError> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| ExportError::Fonts("no document".into()))?;
            let ready = document
                .fonts()
                .ready()
                .map_err(|e| ExportError::Fonts(js_err(e)))?;
            JsFuture::from(ready)
                .await
                .map(|_| ())
                .map_err(|e| ExportError::Fonts(js_err(e)))
        }

        async fn sleep(&mut self, duration: Duration) {
            gloo_timers::future::TimeoutFuture::new(duration.as_millis() as u32).await;
        }

        fn report(&mut self, status: ExportStatus) {
            self.state.write().apply_export_status(status);
        }
    }

    /// Rasterizes the capture target with html2canvas.
    pub struct Html2Canvas;

    impl Rasterizer for Html2Canvas {
        type Bitmap = web_sys::HtmlCanvasElement;

        async fn rasterize(&mut self, options: &CaptureOptions) -> Result<Self::Bitmap, ExportError> {
            let sheet = options.sheet;
            let fail = |reason: String| ExportError::Rasterize { sheet, reason };

            let element = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(CAPTURE_TARGET_ID))
                .ok_or_else(|| fail("capture target missing".into()))?
                .dyn_into::<web_sys::HtmlElement>()
                .map_err(|_| fail("capture target is not an HTML element".into()))?;

            let js_options = serde_wasm_bindgen::to_value(&Html2CanvasOptions {
                scale: options.scale,
                use_cors: true,
                allow_taint: true,
                background_color: &options.background,
                logging: false,
            })
            .map_err(|e| fail(e.to_string()))?;

            let promise = html2canvas(&element, &js_options).map_err(|e| fail(js_err(e)))?;
            let canvas = JsFuture::from(promise).await.map_err(|e| fail(js_err(e)))?;
            canvas
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .map_err(|_| fail("html2canvas did not return a canvas".into()))
        }
    }

    pub struct JsPdfBackend;

    impl DocumentBackend<web_sys::HtmlCanvasElement> for JsPdfBackend {
        type Document = JsPdfDocument;

        fn create(&mut self, page: &PageFormat) -> Result<JsPdfDocument, ExportError> {
            let options = serde_wasm_bindgen::to_value(&JsPdfOptions {
                orientation: page.orientation(),
                unit: "mm",
                format: page.name,
                compress: true,
            })
            .map_err(|e| ExportError::Document(e.to_string()))?;
            let pdf = JsPdf::new(&options).map_err(|e| ExportError::Document(js_err(e)))?;
            Ok(JsPdfDocument { pdf })
        }
    }

    pub struct JsPdfDocument {
        pdf: JsPdf,
    }

    impl PageDocument<web_sys::HtmlCanvasElement> for JsPdfDocument {
        fn add_page(&mut self, page: &PageFormat) -> Result<(), ExportError> {
            self.pdf
                .add_page(page.name, page.orientation())
                .map(|_| ())
                .map_err(|e| ExportError::Document(js_err(e)))
        }

        fn draw_image(
            &mut self,
            canvas: &web_sys::HtmlCanvasElement,
            encoding: ImageEncoding,
            frame: PageFrame,
        ) -> Result<(), ExportError> {
            let ImageEncoding::Jpeg { quality } = encoding;
            let data_url = canvas
                .to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(quality))
                .map_err(|e| ExportError::Document(js_err(e)))?;
            self.pdf
                .add_image(
                    &data_url,
                    "JPEG",
                    frame.x_mm,
                    frame.y_mm,
                    frame.width_mm,
                    frame.height_mm,
                    JsValue::UNDEFINED,
                    "FAST",
                )
                .map(|_| ())
                .map_err(|e| ExportError::Document(js_err(e)))
        }

        fn save(&mut self, filename: &str) -> Result<(), ExportError> {
            self.pdf
                .save(filename)
                .map(|_| ())
                .map_err(|e| ExportError::Save {
                    filename: filename.to_string(),
                    reason: js_err(e),
                })
        }
    }
}
