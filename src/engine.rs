use crate::browser;
use crate::sprite::{self, Frame};
use anyhow::{anyhow, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::{channel, Receiver};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlAudioElement, HtmlCanvasElement, HtmlImageElement, ImageData,
};

pub use self::input::KeyState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState, delta_ms: f32);
    fn draw(&self, renderer: &Renderer) -> Result<()>;
    /// Checked once per animation frame, `false` ends the loop
    fn is_running(&self) -> bool;
    fn shutdown(&mut self, renderer: &Renderer);
}

// length of a frame in milliseconds
pub const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// a backgrounded tab resumes with a huge delta, don't replay all of it
const MAX_ACCUMULATED_DELTA: f32 = FRAME_SIZE * 15.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

/// TABLE
/// ┌──────────────── one requestAnimationFrame tick ────────────────┐
/// │  1. drain keyboard channel  ──► KeyState                       │
/// │  2. while accumulated > FRAME_SIZE                             │
/// │        game.update(keystate, FRAME_SIZE)                       │
/// │  3. game.is_running()? ─ no ──► game.shutdown(), stop          │
/// │  4. game.draw(renderer)                                        │
/// │  5. request next frame                                         │
/// └────────────────────────────────────────────────────────────────┘
impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer::new(browser::context()?);
        let mut keystate = KeyState::new();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);

            game_loop.accumulated_delta = (game_loop.accumulated_delta
                + (perf - game_loop.last_frame) as f32)
                .min(MAX_ACCUMULATED_DELTA);
            while game_loop.accumulated_delta > FRAME_SIZE && game.is_running() {
                game.update(&keystate, FRAME_SIZE);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;

            if !game.is_running() {
                game.shutdown(&renderer);
                log!("[loop] quit requested, loop stopped");
                return;
            }

            if let Err(err) = game.draw(&renderer) {
                error!("[loop] draw failed : {:#?}", err);
            }

            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next) {
                    error!("[loop] {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    pub fn mid_bottom(&self) -> Point {
        Point {
            x: self.x + self.width * 0.5,
            y: self.bottom(),
        }
    }
}

// ==================== Renderer ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        // nearest neighbour scaling, pixel art stays crisp
        context.set_image_smoothing_enabled(false);
        Renderer { context }
    }

    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, position: &Point) -> Result<()> {
        self.context
            .draw_image_with_html_image_element(image, position.x.into(), position.y.into())
            .map_err(|err| anyhow!("Error drawing image : {:#?}", err))
    }

    /// Draws one sliced frame of a (color keyed) sheet so that its padded box
    /// fills `destination`. Mirrored frames are flipped around the crop area.
    pub fn draw_frame(
        &self,
        sheet: &HtmlCanvasElement,
        frame: &Frame,
        destination: &Rect,
    ) -> Result<()> {
        let source = frame.source();
        let crop = frame.crop_destination(destination);

        self.context.save();
        let drawn = if frame.is_flipped() {
            self.context
                .translate((crop.x + crop.width).into(), crop.y.into())
                .and_then(|_| self.context.scale(-1.0, 1.0))
                .and_then(|_| self.blit(sheet, &source, 0.0, 0.0, &crop))
        } else {
            self.blit(sheet, &source, crop.x, crop.y, &crop)
        };
        self.context.restore();

        drawn.map_err(|err| anyhow!("Error drawing frame {:?} : {:#?}", source, err))
    }

    fn blit(
        &self,
        sheet: &HtmlCanvasElement,
        source: &sprite::SheetRect,
        x: f32,
        y: f32,
        crop: &Rect,
    ) -> Result<(), JsValue> {
        self.context
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                sheet,
                source.x.into(),
                source.y.into(),
                source.w.into(),
                source.h.into(),
                x.into(),
                y.into(),
                crop.width.into(),
                crop.height.into(),
            )
    }

    /// Text is positioned by its top-left corner
    pub fn fill_text(&self, text: &str, position: &Point, font: &str, color: &str) -> Result<()> {
        self.context.set_font(font);
        self.context.set_text_baseline("top");
        self.context.set_fill_style_str(color);
        self.context
            .fill_text(text, position.x.into(), position.y.into())
            .map_err(|err| anyhow!("Error drawing text '{}' : {:#?}", text, err))
    }
}

// ==================== Assets ====================
/// One-shot channel fed by a pair of element callbacks :
/// - success -> Ok(())
/// - error   -> Err(..) naming the source
struct LoadSignals {
    success: Closure<dyn FnMut()>,
    error: Closure<dyn FnMut(JsValue)>,
    done: Receiver<Result<(), Error>>,
}

fn load_signals(source: &str) -> LoadSignals {
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();
    let source = source.to_string();

    let success = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error loading '{}' : {:#?}", source, err)));
        }
    });

    LoadSignals {
        success,
        error,
        done: rx,
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let signals = load_signals(source);

    image.set_onload(Some(signals.success.as_ref().unchecked_ref()));
    image.set_onerror(Some(signals.error.as_ref().unchecked_ref()));
    image.set_src(source);

    // Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the load result
    let loaded = signals.done.await;
    image.set_onload(None);
    image.set_onerror(None);
    loaded??;

    Ok(image)
}

/// Same as `load_image` but resolves once the browser has enough data to
/// start playing. Some browsers hold back media until a user gesture, callers
/// must not make anything else wait on this.
pub async fn load_audio(source: &str) -> Result<HtmlAudioElement> {
    let audio = browser::new_audio()?;
    let signals = load_signals(source);

    audio.set_oncanplay(Some(signals.success.as_ref().unchecked_ref()));
    audio.set_onerror(Some(signals.error.as_ref().unchecked_ref()));
    audio.set_preload("auto");
    audio.set_src(source);
    audio.load();

    // seeking re-fires canplay, the once closures must not see it
    let loaded = signals.done.await;
    audio.set_oncanplay(None);
    audio.set_onerror(None);
    loaded??;

    Ok(audio)
}

/// Copies `image` onto an offscreen canvas and turns every `key` colored
/// pixel transparent.
pub fn color_keyed_sheet(image: &HtmlImageElement, key: [u8; 3]) -> Result<HtmlCanvasElement> {
    let (width, height) = (image.natural_width(), image.natural_height());
    let canvas = browser::offscreen_canvas(width, height)?;
    let context = browser::context_of(&canvas)?;

    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|err| anyhow!("Error copying sheet to offscreen canvas : {:#?}", err))?;
    let image_data = context
        .get_image_data(0.0, 0.0, width.into(), height.into())
        .map_err(|err| anyhow!("Error reading sheet pixels : {:#?}", err))?;

    let mut pixels = image_data.data();
    let cleared = sprite::apply_color_key(&mut pixels.0, key);

    let keyed =
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels.0.as_slice()), width, height)
            .map_err(|err| anyhow!("Error building keyed image data : {:#?}", err))?;
    context
        .put_image_data(&keyed, 0.0, 0.0)
        .map_err(|err| anyhow!("Error writing keyed sheet pixels : {:#?}", err))?;

    log!("[assets] color key cleared {} pixels", cleared);
    Ok(canvas)
}

// ==================== Audio ====================
fn play_element(element: &HtmlAudioElement, tag: &'static str) {
    match element.play() {
        Ok(promise) => browser::spawn_local(async move {
            // browsers refuse to autoplay until the page saw a user gesture
            if let Err(err) = JsFuture::from(promise).await {
                log!("[audio] {} not playing : {:#?}", tag, err);
            }
        }),
        Err(err) => log!("[audio] {} not playing : {:#?}", tag, err),
    }
}

fn pause_element(element: &HtmlAudioElement, tag: &'static str) {
    if let Err(err) = element.pause() {
        log!("[audio] {} did not stop : {:#?}", tag, err);
    }
}

/// Looping background track
pub struct Music {
    element: HtmlAudioElement,
}

impl Music {
    pub fn new(element: HtmlAudioElement) -> Self {
        element.set_loop(true);
        Music { element }
    }

    pub fn start(&self) {
        play_element(&self.element, "music");
    }

    /// Retry after an autoplay refusal, no-op while playing
    pub fn ensure_playing(&self) {
        if self.element.paused() {
            play_element(&self.element, "music");
        }
    }

    pub fn stop(&self) {
        pause_element(&self.element, "music");
    }
}

/// Short effect, rewound on every play so rapid fire restarts it
pub struct Sound {
    element: HtmlAudioElement,
}

impl Sound {
    pub fn new(element: HtmlAudioElement) -> Self {
        Sound { element }
    }

    pub fn play(&self) {
        self.element.set_current_time(0.0);
        play_element(&self.element, "sound");
    }

    pub fn stop(&self) {
        pause_element(&self.element, "sound");
    }
}

// ==================== Input ====================
pub mod input {
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use web_sys::KeyboardEvent;

    // keys the page would otherwise use for scrolling
    const SCROLL_KEYS: [&str; 5] = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", "Space"];

    #[derive(Debug)]
    pub enum KeyPress {
        KeyDown(String),
        KeyUp(String),
        /// focus left the page, pending keyups will never arrive
        ReleaseAll,
        /// the page is going away (tab closed, navigated off)
        Quit,
    }

    /// Held keys, by `KeyboardEvent.code`
    #[derive(Debug, Default, Clone)]
    pub struct KeyState {
        pressed_keys: HashSet<String>,
        presses: u64,
        quit_requested: bool,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed_keys.contains(code)
        }

        pub fn any_pressed(&self) -> bool {
            !self.pressed_keys.is_empty()
        }

        /// Count of keys that went down, autorepeat of a held key excluded
        pub fn presses(&self) -> u64 {
            self.presses
        }

        pub fn quit_requested(&self) -> bool {
            self.quit_requested
        }

        pub fn set_pressed(&mut self, code: &str) {
            if self.pressed_keys.insert(code.to_string()) {
                self.presses += 1;
            }
        }

        pub fn set_released(&mut self, code: &str) {
            self.pressed_keys.remove(code);
        }

        pub fn release_all(&mut self) {
            self.pressed_keys.clear();
        }

        pub fn request_quit(&mut self) {
            self.quit_requested = true;
        }
    }

    pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
        let (keydown_sender, keyevent_receiver) = unbounded();
        let keydown_sender = Rc::new(RefCell::new(keydown_sender));
        let keyup_sender = keydown_sender.clone();
        let quit_sender = keydown_sender.clone();
        let blur_sender = keydown_sender.clone();

        let onkeydown = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
            if SCROLL_KEYS.contains(&keycode.code().as_str()) {
                keycode.prevent_default();
            }
            let _ = keydown_sender
                .borrow_mut()
                .start_send(KeyPress::KeyDown(keycode.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onkeyup = browser::closure_wrap(Box::new(move |keycode: KeyboardEvent| {
            let _ = keyup_sender
                .borrow_mut()
                .start_send(KeyPress::KeyUp(keycode.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onpagehide = browser::closure_wrap(Box::new(move |_event: web_sys::Event| {
            let _ = quit_sender.borrow_mut().start_send(KeyPress::Quit);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let onblur = browser::closure_wrap(Box::new(move |_event: web_sys::Event| {
            let _ = blur_sender.borrow_mut().start_send(KeyPress::ReleaseAll);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let window = browser::window().map_err(|err| anyhow!("Cannot wire input : {:#}", err))?;
        window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
        window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        window.set_onpagehide(Some(onpagehide.as_ref().unchecked_ref()));
        window.set_onblur(Some(onblur.as_ref().unchecked_ref()));

        // handlers live as long as the page
        onkeydown.forget();
        onkeyup.forget();
        onpagehide.forget();
        onblur.forget();

        Ok(keyevent_receiver)
    }

    pub fn process_input(
        state: &mut KeyState,
        keyevent_receiver: &mut UnboundedReceiver<KeyPress>,
    ) {
        loop {
            match keyevent_receiver.try_next() {
                Ok(None) => break,
                Err(_err) => break,
                Ok(Some(evt)) => match evt {
                    KeyPress::KeyUp(code) => state.set_released(&code),
                    KeyPress::KeyDown(code) => state.set_pressed(&code),
                    KeyPress::ReleaseAll => state.release_all(),
                    KeyPress::Quit => state.request_quit(),
                },
            };
        }
    }

}
