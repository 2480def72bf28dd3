//! Bounce Shot entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, CanvasRenderingContext2d, Element, Event, EventTarget,
        HtmlCanvasElement, KeyboardEvent, PointerEvent,
    };

    use bounce_shot::input::{KeysDown, PointerPhase, PointerSample};
    use bounce_shot::renderer::{CanvasSurface, render_state};
    use bounce_shot::{Runtime, Settings, StartupError, Tuning, debug};

    /// Everything one page session owns
    struct Host {
        runtime: Runtime<Pcg32>,
        surface: CanvasSurface,
        canvas_size: Vec2,
        debug_element: Option<Element>,
    }

    impl Host {
        fn frame(&mut self, time: f64) -> bool {
            if self.runtime.animation_frame(time).is_none() {
                return false;
            }
            render_state(self.runtime.state(), self.canvas_size, &mut self.surface);
            if let Some(el) = &self.debug_element {
                el.set_text_content(Some(&debug::readout(self.runtime.state())));
            }
            true
        }
    }

    /// An attached DOM listener, kept so it can be removed again
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    }

    thread_local! {
        static HOST: RefCell<Option<Rc<RefCell<Host>>>> = const { RefCell::new(None) };
        static LISTENERS: RefCell<Vec<Listener>> = const { RefCell::new(Vec::new()) };
    }

    pub fn run() -> Result<(), StartupError> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Bounce Shot starting...");

        let window = web_sys::window().ok_or(StartupError::NoWindow)?;
        let document = window.document().ok_or(StartupError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .or_else(|| document.query_selector("canvas").ok().flatten())
            .ok_or(StartupError::NoCanvas)?
            .dyn_into()
            .map_err(|_| StartupError::NoCanvas)?;

        // Fill the window
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        if let Err(e) = canvas.style().set_property("touch-action", "none") {
            log::warn!("Could not disable touch scrolling: {:?}", e);
        }

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or(StartupError::NoContext2d)?
            .dyn_into()
            .map_err(|_| StartupError::NoContext2d)?;

        let settings = Settings::load();
        // Write back so the key exists for hand-editing
        settings.save();
        let seed = settings.seed_or(js_sys::Date::now() as u64);
        let runtime = Runtime::new(
            width as f32,
            height as f32,
            Tuning::default(),
            Pcg32::seed_from_u64(seed),
        );
        log::info!("Game initialized with seed: {}", seed);

        let debug_element = if settings.show_debug {
            document.get_element_by_id("debug")
        } else {
            None
        };

        let host = Rc::new(RefCell::new(Host {
            runtime,
            surface: CanvasSurface::new(context),
            canvas_size: Vec2::new(width as f32, height as f32),
            debug_element,
        }));
        HOST.with(|h| *h.borrow_mut() = Some(host.clone()));

        setup_input_handlers(&canvas, &window, &host)?;
        request_animation_frame(host)?;

        log::info!("Bounce Shot running!");
        Ok(())
    }

    fn listen<F>(target: &EventTarget, kind: &'static str, passive: bool, handler: F) -> Result<(), StartupError>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| StartupError::Listener(format!("{}: {:?}", kind, e)))?;
        LISTENERS.with(|l| {
            l.borrow_mut().push(Listener {
                target: target.clone(),
                kind,
                closure,
            })
        });
        Ok(())
    }

    fn pointer_sample(phase: PointerPhase, event: &PointerEvent) -> PointerSample {
        PointerSample {
            phase,
            pointer_id: event.pointer_id(),
            pos: Vec2::new(event.client_x() as f32, event.client_y() as f32),
            timestamp: event.time_stamp(),
        }
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        window: &web_sys::Window,
        host: &Rc<RefCell<Host>>,
    ) -> Result<(), StartupError> {
        // Keep the page from scrolling or zooming under a swipe
        for kind in ["touchstart", "touchmove"] {
            listen(canvas, kind, false, |event: Event| event.prevent_default())?;
        }

        for (kind, phase) in [
            ("pointerdown", PointerPhase::Down),
            ("pointermove", PointerPhase::Move),
            ("pointerup", PointerPhase::Up),
            ("pointercancel", PointerPhase::Cancel),
        ] {
            let host = host.clone();
            let capture_target = canvas.clone();
            listen(canvas, kind, true, move |event: Event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                if phase == PointerPhase::Down {
                    // Keep receiving move/up when the finger leaves the canvas
                    if let Err(e) = capture_target.set_pointer_capture(event.pointer_id()) {
                        log::warn!("Pointer capture failed: {:?}", e);
                    }
                }
                host.borrow_mut()
                    .runtime
                    .pointer_event(pointer_sample(phase, event));
            })?;
        }

        {
            let host = host.clone();
            listen(window, "keydown", false, move |event: Event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    let key = event.key();
                    if KeysDown::is_game_key(&key) {
                        // No page scroll or button activation on space
                        event.prevent_default();
                    }
                    host.borrow_mut().runtime.key_down(&key);
                }
            })?;
        }

        Ok(())
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) -> Result<(), StartupError> {
        let window = web_sys::window().ok_or(StartupError::NoWindow)?;
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| StartupError::FrameScheduling(format!("{:?}", e)))?;
        closure.forget();
        Ok(())
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        let running = host.borrow_mut().frame(time);
        if !running {
            log::info!("Frame loop stopped");
            return;
        }
        if let Err(e) = request_animation_frame(host) {
            log::error!("{}", e);
        }
    }

    /// Detach every listener and stop the frame loop
    pub fn dispose() {
        LISTENERS.with(|l| {
            for listener in l.borrow_mut().drain(..) {
                if let Err(e) = listener.target.remove_event_listener_with_callback(
                    listener.kind,
                    listener.closure.as_ref().unchecked_ref(),
                ) {
                    log::warn!("Could not detach {} listener: {:?}", listener.kind, e);
                }
            }
        });
        if let Some(host) = HOST.with(|h| h.borrow_mut().take()) {
            host.borrow_mut().runtime.dispose();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {}", e);
        web_sys::console::error_1(&format!("Bounce Shot failed to start: {}", e).into());
    }
}

/// Tear down the running session (listeners, frame loop, subscribers)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn dispose() {
    wasm_game::dispose();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Bounce Shot (native) starting...");

    match native::run(std::env::args().nth(1)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("bounce-shot: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use bounce_shot::input::PointerSample;
    use bounce_shot::renderer::{CommandBuffer, render_state};
    use bounce_shot::{Runtime, Settings, StartupError, Tuning, debug};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);
    const FRAME_MS: f64 = 16.0;
    const SESSION_MS: f64 = 3000.0;

    /// Headless scripted session: pull back from the ball, release, and let
    /// it bounce for a few seconds.
    pub fn run(tuning_path: Option<String>) -> Result<(), StartupError> {
        let tuning = match tuning_path {
            Some(path) => {
                log::info!("Loading tuning from {}", path);
                Tuning::from_json(&std::fs::read_to_string(path)?)?
            }
            None => Tuning::default(),
        };

        let settings = Settings::load();
        let seed = settings.seed_or(clock_seed());
        log::info!("Seed: {}", seed);

        let mut runtime = Runtime::new(VIEWPORT.x, VIEWPORT.y, tuning, Pcg32::seed_from_u64(seed));
        let mut script = gesture(runtime.state().ball.pos * runtime.state().vmin).into_iter().peekable();
        let mut surface = CommandBuffer::new();

        let mut time = 0.0;
        while time <= SESSION_MS {
            while let Some(sample) = script.next_if(|s| s.timestamp <= time) {
                runtime.pointer_event(sample);
            }
            runtime.animation_frame(time);

            surface.reset();
            render_state(runtime.state(), VIEWPORT, &mut surface);
            time += FRAME_MS;
        }

        log::info!(
            "Session finished: score={}, draw calls per frame={}",
            runtime.state().score,
            surface.last_frame().len()
        );
        if settings.show_debug {
            println!("{}", debug::readout(runtime.state()));
        } else {
            println!("score: {}", runtime.state().score);
        }

        runtime.dispose();
        Ok(())
    }

    /// Drag from the ball down-right, release: launches up-left
    fn gesture(from: Vec2) -> Vec<PointerSample> {
        let pull = Vec2::new(60.0, 90.0);
        let mut samples = vec![PointerSample::down(from.x, from.y, 100.0)];
        for step in 1..=5 {
            let p = from + pull * (step as f32 / 5.0);
            samples.push(PointerSample::moved(p.x, p.y, 100.0 + step as f64 * 20.0));
        }
        let end = from + pull;
        samples.push(PointerSample::up(end.x, end.y, 210.0));
        samples
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}
