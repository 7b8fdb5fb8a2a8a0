//! End-to-end export runs against a real `AppState` with scripted browser
//! pieces: the capture surface is whatever sheet the state currently shows.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use grafoman_common::app_state::{AppState, MemoryStore};
use grafoman_common::avatar::{AvatarEdit, AvatarImage, AvatarOffset};
use grafoman_common::config::{DesignerConfig, PageFormat};
use grafoman_common::error::ExportError;
use grafoman_common::export::{
    run_export, CaptureOptions, DocumentBackend, ExportHost, ExportStatus, ImageEncoding,
    PageDocument, PageFrame, Rasterizer,
};
use grafoman_common::schedule::ScheduleKey;
use grafoman_common::shift::ShiftSlot;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn session(start: &str, end: &str) -> Rc<RefCell<AppState>> {
    let today = d(2025, 1, 1);
    let mut state = AppState::load(Box::new(MemoryStore::new()), today, DesignerConfig::default());
    state.set_start_text(start, today);
    state.set_end_text(end, today);
    Rc::new(RefCell::new(state))
}

struct FakeHost {
    state: Rc<RefCell<AppState>>,
    statuses: Vec<ExportStatus>,
    sleeps: Vec<Duration>,
    fonts_fail: bool,
}

impl FakeHost {
    fn new(state: &Rc<RefCell<AppState>>) -> Self {
        Self {
            state: Rc::clone(state),
            statuses: Vec::new(),
            sleeps: Vec::new(),
            fonts_fail: false,
        }
    }
}

impl ExportHost for FakeHost {
    fn show_sheet(&mut self, sheet: usize) {
        self.state.borrow_mut().show_sheet_for_export(sheet);
    }

    async fn fonts_ready(&mut self) -> Result<(), ExportError> {
        if self.fonts_fail {
            return Err(ExportError::Fonts("font face set rejected".into()));
        }
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        tokio::task::yield_now().await;
    }

    fn report(&mut self, status: ExportStatus) {
        self.state.borrow_mut().apply_export_status(status.clone());
        self.statuses.push(status);
    }
}

/// What the capture surface showed when it was rasterized.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    sheet: usize,
    footer: String,
    staffed_cells: usize,
}

struct FakeRasterizer {
    state: Rc<RefCell<AppState>>,
    calls: Vec<CaptureOptions>,
    fail_on: Option<usize>,
}

impl FakeRasterizer {
    fn new(state: &Rc<RefCell<AppState>>) -> Self {
        Self {
            state: Rc::clone(state),
            calls: Vec::new(),
            fail_on: None,
        }
    }
}

impl Rasterizer for FakeRasterizer {
    type Bitmap = Snapshot;

    async fn rasterize(&mut self, options: &CaptureOptions) -> Result<Snapshot, ExportError> {
        self.calls.push(options.clone());
        if self.fail_on == Some(options.sheet) {
            return Err(ExportError::Rasterize {
                sheet: options.sheet,
                reason: "canvas tainted".into(),
            });
        }
        let geometry = self.state.borrow().current_sheet();
        Ok(Snapshot {
            sheet: geometry.index,
            footer: geometry.footer(),
            staffed_cells: geometry
                .cells()
                .filter(|c| !c.assignments().is_empty())
                .count(),
        })
    }
}

#[derive(Debug, Default)]
struct DocumentLog {
    pages: Vec<Option<Snapshot>>,
    saved_as: Option<String>,
    frames: Vec<PageFrame>,
}

struct FakeDocument {
    log: Rc<RefCell<DocumentLog>>,
}

impl PageDocument<Snapshot> for FakeDocument {
    fn add_page(&mut self, page: &PageFormat) -> Result<(), ExportError> {
        assert_eq!(*page, PageFormat::A3_LANDSCAPE);
        self.log.borrow_mut().pages.push(None);
        Ok(())
    }

    fn draw_image(
        &mut self,
        bitmap: &Snapshot,
        encoding: ImageEncoding,
        frame: PageFrame,
    ) -> Result<(), ExportError> {
        assert_eq!(encoding, ImageEncoding::Jpeg { quality: 0.95 });
        let mut log = self.log.borrow_mut();
        log.frames.push(frame);
        let Some(slot) = log.pages.last_mut() else {
            return Err(ExportError::Document("no page".into()));
        };
        if slot.is_some() {
            return Err(ExportError::Document("page already drawn".into()));
        }
        *slot = Some(bitmap.clone());
        Ok(())
    }

    fn save(&mut self, filename: &str) -> Result<(), ExportError> {
        self.log.borrow_mut().saved_as = Some(filename.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeBackend {
    log: Rc<RefCell<DocumentLog>>,
    created: usize,
}

impl DocumentBackend<Snapshot> for FakeBackend {
    type Document = FakeDocument;

    fn create(&mut self, _page: &PageFormat) -> Result<FakeDocument, ExportError> {
        self.created += 1;
        self.log.borrow_mut().pages.push(None);
        Ok(FakeDocument {
            log: Rc::clone(&self.log),
        })
    }
}

fn staffed_edit() -> AvatarEdit {
    AvatarEdit {
        image: AvatarImage("data:image/jpeg;base64,AAAA".into()),
        scale: 1.0,
        offset: AvatarOffset::default(),
    }
}

#[tokio::test]
async fn single_sheet_range_exports_one_page() {
    init_tracing();
    let state = session("2025-01-01", "2025-01-14");
    assert_eq!(state.borrow().pager().total(), 1);

    let job = state.borrow_mut().begin_export(d(2025, 1, 1)).unwrap();
    let mut host = FakeHost::new(&state);
    let mut rasterizer = FakeRasterizer::new(&state);
    let mut backend = FakeBackend::default();

    let summary = run_export(job, &mut host, &mut rasterizer, &mut backend)
        .await
        .unwrap();
    state.borrow_mut().finish_export(&Ok(summary.clone()));

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.filename, "График_A3_01-01-2025.pdf");
    assert_eq!(rasterizer.calls.len(), 1);
    assert_eq!(rasterizer.calls[0].scale, 3.0);
    assert_eq!(rasterizer.calls[0].background, "#ffffff");
    assert_eq!(backend.created, 1);

    let log = backend.log.borrow();
    assert_eq!(log.pages.len(), 1);
    assert_eq!(log.saved_as.as_deref(), Some("График_A3_01-01-2025.pdf"));
    assert_eq!(log.frames[0], PageFrame::full_bleed(&PageFormat::A3_LANDSCAPE));
    assert!(!state.borrow().is_exporting());
}

#[tokio::test]
async fn pages_follow_sheet_order_and_view_is_restored() {
    init_tracing();
    let state = session("2025-01-01", "2025-01-20");
    {
        let mut s = state.borrow_mut();
        assert_eq!(s.pager().total(), 2);
        s.open_cell(ScheduleKey::new(d(2025, 1, 15), ShiftSlot::Shift1));
        s.add_new_staff(staffed_edit()).unwrap();
        s.close_cell();
        s.next_sheet();
    }

    let job = state.borrow_mut().begin_export(d(2025, 1, 20)).unwrap();
    assert_eq!(job.original_sheet, 1);
    let mut host = FakeHost::new(&state);
    let mut rasterizer = FakeRasterizer::new(&state);
    let mut backend = FakeBackend::default();

    let summary = run_export(job, &mut host, &mut rasterizer, &mut backend)
        .await
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(rasterizer.calls.len(), 2);

    let log = backend.log.borrow();
    let pages: Vec<Snapshot> = log.pages.iter().cloned().map(Option::unwrap).collect();
    assert_eq!(pages[0].sheet, 0);
    assert_eq!(pages[1].sheet, 1);
    assert!(pages[0].footer.ends_with("Лист 1 из 2"));
    assert!(pages[1].footer.ends_with("Лист 2 из 2"));
    assert_eq!(pages[0].staffed_cells, 0);
    assert_eq!(pages[1].staffed_cells, 1);

    assert_eq!(state.borrow().pager().current(), 1);
    assert_eq!(host.statuses.last(), Some(&ExportStatus::Idle));
}

#[tokio::test]
async fn progress_is_reported_before_each_page() {
    init_tracing();
    let state = session("2025-01-01", "2025-02-28");
    let job = state.borrow_mut().begin_export(d(2025, 1, 1)).unwrap();
    let config = job.config.clone();
    let mut host = FakeHost::new(&state);
    let mut rasterizer = FakeRasterizer::new(&state);
    let mut backend = FakeBackend::default();

    run_export(job, &mut host, &mut rasterizer, &mut backend)
        .await
        .unwrap();

    let seen: Vec<(u8, &str)> = host
        .statuses
        .iter()
        .filter(|s| s.is_exporting())
        .map(|s| (s.progress(), s.text()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (0, "Подготовка экспорта..."),
            (0, "Обработка страницы 1 из 5..."),
            (20, "Обработка страницы 2 из 5..."),
            (40, "Обработка страницы 3 из 5..."),
            (60, "Обработка страницы 4 из 5..."),
            (80, "Обработка страницы 5 из 5..."),
            (100, "Скачивание..."),
        ]
    );

    // One settle pause per sheet, then the closing linger.
    assert_eq!(host.sleeps.len(), 6);
    assert!(host.sleeps[..5].iter().all(|d| *d == config.settle_delay));
    assert_eq!(host.sleeps[5], config.done_delay);
}

#[tokio::test]
async fn rasterize_failure_restores_view_and_status() {
    init_tracing();
    let state = session("2025-01-01", "2025-01-31");
    state.borrow_mut().next_sheet();

    let job = state.borrow_mut().begin_export(d(2025, 1, 1)).unwrap();
    let mut host = FakeHost::new(&state);
    let mut rasterizer = FakeRasterizer::new(&state);
    rasterizer.fail_on = Some(2);
    let mut backend = FakeBackend::default();

    let result = run_export(job, &mut host, &mut rasterizer, &mut backend).await;
    assert_eq!(
        result,
        Err(ExportError::Rasterize {
            sheet: 2,
            reason: "canvas tainted".into()
        })
    );
    state.borrow_mut().finish_export(&result);

    let s = state.borrow();
    assert_eq!(s.pager().current(), 1);
    assert!(!s.is_exporting());
    assert!(s.last_error().unwrap().contains("canvas tainted"));
    assert!(backend.log.borrow().saved_as.is_none());
    // No linger after a failure.
    assert!(!host.sleeps.contains(&Duration::from_millis(1000)));
}

#[tokio::test]
async fn fonts_failure_aborts_before_any_capture() {
    init_tracing();
    let state = session("2025-01-01", "2025-01-20");
    let job = state.borrow_mut().begin_export(d(2025, 1, 1)).unwrap();
    let mut host = FakeHost::new(&state);
    host.fonts_fail = true;
    let mut rasterizer = FakeRasterizer::new(&state);
    let mut backend = FakeBackend::default();

    let result = run_export(job, &mut host, &mut rasterizer, &mut backend).await;
    assert!(matches!(result, Err(ExportError::Fonts(_))));
    assert!(rasterizer.calls.is_empty());
    assert_eq!(backend.created, 0);
    assert_eq!(host.statuses.last(), Some(&ExportStatus::Idle));
}

#[tokio::test]
async fn second_export_is_refused_while_one_runs() {
    init_tracing();
    let state = session("2025-01-01", "2025-01-20");
    let job = state.borrow_mut().begin_export(d(2025, 1, 1)).unwrap();
    assert_eq!(
        state.borrow_mut().begin_export(d(2025, 1, 1)),
        Err(ExportError::AlreadyRunning)
    );

    let mut host = FakeHost::new(&state);
    let mut rasterizer = FakeRasterizer::new(&state);
    let mut backend = FakeBackend::default();
    let result = run_export(job, &mut host, &mut rasterizer, &mut backend).await;
    state.borrow_mut().finish_export(&result);

    assert!(state.borrow_mut().begin_export(d(2025, 1, 1)).is_ok());
}
