//! Engine lifecycle control.
//!
//! Owns the one-time engine initialization, the readiness gate, and
//! the render-progress channel. All engine access funnels through the
//! controller, making it the serialization point: the engine executes
//! one operation (load, stage, or transcode) at a time.

use std::path::Path;

use promoclip_common::error::{PromoclipError, PromoclipResult};
use tokio::sync::watch;

use crate::engine::{ProgressFn, TranscodeEngine};
use crate::stager::{self, FontStager, OUTPUT_NAME};

/// Lifecycle state of the transcoding engine.
///
/// There is no error state: a failed load resets to `Unloaded` so the
/// next trigger retries from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loading,
    Loaded,
}

/// Drives the engine through `Unloaded → Loading → Loaded` and gates
/// renders so at most one is in flight.
pub struct EngineController {
    engine: Box<dyn TranscodeEngine>,
    state: EngineState,
    fonts: FontStager,
    rendering: bool,
    progress_tx: watch::Sender<u8>,
}

impl EngineController {
    pub fn new(engine: Box<dyn TranscodeEngine>) -> Self {
        let (progress_tx, _) = watch::channel(0u8);
        Self {
            engine,
            state: EngineState::Unloaded,
            fonts: FontStager::new(),
            rendering: false,
            progress_tx,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether a render may be attempted right now.
    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Loaded && !self.rendering
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Subscribe to render progress (percent, 0–100). The last
    /// received value is authoritative.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress_tx.subscribe()
    }

    /// Load the engine and stage the fonts, once.
    ///
    /// Triggered by the first clip load or an explicit warm-up.
    /// Re-entrant triggers while `Loading` collapse into the in-flight
    /// operation; a failure resets to `Unloaded` so a later trigger
    /// retries.
    pub fn ensure_loaded(&mut self, fonts_dir: &Path) -> PromoclipResult<()> {
        match self.state {
            EngineState::Loaded => return Ok(()),
            EngineState::Loading => return Ok(()),
            EngineState::Unloaded => {}
        }

        self.state = EngineState::Loading;
        tracing::info!("Loading transcode engine");

        if let Err(e) = self.engine.load() {
            self.state = EngineState::Unloaded;
            return Err(e);
        }
        if let Err(e) = self.fonts.ensure_fonts(self.engine.as_mut(), fonts_dir) {
            self.state = EngineState::Unloaded;
            return Err(e);
        }

        self.state = EngineState::Loaded;
        tracing::info!("Transcode engine ready");
        Ok(())
    }

    /// Stage the input clip. Requires a loaded engine.
    pub fn stage_input(&mut self, bytes: &[u8]) -> PromoclipResult<()> {
        if self.state != EngineState::Loaded {
            return Err(PromoclipError::stage("engine is not loaded"));
        }
        if self.rendering {
            return Err(PromoclipError::stage("a render is in flight"));
        }
        stager::stage_input(self.engine.as_mut(), bytes)
    }

    /// Claim the render slot. Rejects synchronously when the engine is
    /// not loaded or a render is already in flight — requests are
    /// never queued. Progress is reset only once the claim succeeds,
    /// so a rejected request cannot disturb an in-flight job.
    pub fn begin_render(&mut self) -> PromoclipResult<()> {
        if self.state != EngineState::Loaded {
            return Err(PromoclipError::render("engine is not loaded"));
        }
        if self.rendering {
            return Err(PromoclipError::render("a render is already in flight"));
        }
        self.rendering = true;
        self.progress_tx.send_replace(0);
        Ok(())
    }

    /// Release the render slot. Readiness after a failed render equals
    /// readiness before it started.
    pub fn finish_render(&mut self, success: bool) {
        self.rendering = false;
        self.progress_tx.send_replace(if success { 100 } else { 0 });
    }

    /// Run a transcode invocation and read back the produced bytes.
    /// Caller must hold the render slot via [`Self::begin_render`].
    pub fn run_transcode(&mut self, argv: &[String]) -> PromoclipResult<Vec<u8>> {
        debug_assert!(self.rendering, "run_transcode without begin_render");
        let tx = self.progress_tx.clone();
        let sink = move |ratio: f64| {
            tx.send_replace((ratio.clamp(0.0, 1.0) * 100.0).round() as u8);
        };
        self.engine.exec(argv, Some(&sink as &ProgressFn))?;
        self.engine.read_file(OUTPUT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Minimal engine double: counts calls, fails on demand.
    struct StubEngine {
        fail_load: bool,
        loads: Arc<AtomicUsize>,
        writes: Arc<AtomicUsize>,
    }

    impl StubEngine {
        fn new() -> Self {
            Self {
                fail_load: false,
                loads: Arc::new(AtomicUsize::new(0)),
                writes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl TranscodeEngine for StubEngine {
        fn load(&mut self) -> PromoclipResult<()> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                Err(PromoclipError::engine_load("stub load failure"))
            } else {
                Ok(())
            }
        }

        fn write_file(&mut self, _name: &str, _bytes: &[u8]) -> PromoclipResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn exec(&mut self, _argv: &[String], _progress: Option<&ProgressFn>) -> PromoclipResult<()> {
            Ok(())
        }

        fn read_file(&mut self, _name: &str) -> PromoclipResult<Vec<u8>> {
            Ok(vec![])
        }
    }

    fn fonts_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("promoclip-fonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Montserrat-Bold.ttf"), b"bold").unwrap();
        std::fs::write(dir.join("Montserrat-Regular.ttf"), b"regular").unwrap();
        dir
    }

    #[test]
    fn test_failed_load_resets_to_unloaded_and_retries() {
        let mut engine = StubEngine::new();
        engine.fail_load = true;
        let loads = engine.loads.clone();
        let mut controller = EngineController::new(Box::new(engine));

        let dir = fonts_dir();
        assert!(controller.ensure_loaded(&dir).is_err());
        assert_eq!(controller.state(), EngineState::Unloaded);
        assert!(!controller.is_ready());

        // The failure is not terminal: the next trigger loads again.
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(controller.ensure_loaded(&dir).is_err());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fonts_staged_once_across_loads() {
        let engine = StubEngine::new();
        let writes = engine.writes.clone();
        let mut controller = EngineController::new(Box::new(engine));

        let dir = fonts_dir();
        controller.ensure_loaded(&dir).unwrap();
        controller.ensure_loaded(&dir).unwrap();
        assert_eq!(controller.state(), EngineState::Loaded);
        // Two fonts, one write each, second ensure is a no-op.
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_font_blocks_readiness() {
        let engine = StubEngine::new();
        let mut controller = EngineController::new(Box::new(engine));

        let dir = std::env::temp_dir().join(format!("promoclip-nofonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = controller.ensure_loaded(&dir).unwrap_err();
        assert!(matches!(err, PromoclipError::FontFetch { .. }));
        assert_eq!(controller.state(), EngineState::Unloaded);
    }

    #[test]
    fn test_render_slot_rejects_concurrent_claims() {
        let mut controller = EngineController::new(Box::new(StubEngine::new()));
        let dir = fonts_dir();
        controller.ensure_loaded(&dir).unwrap();

        controller.begin_render().unwrap();
        let progress = controller.progress();
        let before = *progress.borrow();

        // Second claim is rejected and leaves progress untouched.
        assert!(controller.begin_render().is_err());
        assert_eq!(*progress.borrow(), before);

        controller.finish_render(true);
        assert_eq!(*progress.borrow(), 100);
        assert!(controller.begin_render().is_ok());
    }

    #[test]
    fn test_failed_render_restores_readiness() {
        let mut controller = EngineController::new(Box::new(StubEngine::new()));
        let dir = fonts_dir();
        controller.ensure_loaded(&dir).unwrap();

        let ready_before = controller.is_ready();
        controller.begin_render().unwrap();
        assert!(!controller.is_ready());
        controller.finish_render(false);
        assert_eq!(controller.is_ready(), ready_before);
        assert_eq!(*controller.progress().borrow(), 0);
    }

    #[test]
    fn test_begin_render_requires_loaded_engine() {
        let mut controller = EngineController::new(Box::new(StubEngine::new()));
        assert!(controller.begin_render().is_err());
    }
}
