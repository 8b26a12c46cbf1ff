//! Browser host for the playback engine: real timers, image loading, canvas painting.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use swarmview::config::ClientConfig;
use swarmview::error::PlaybackError;
use swarmview::playback::{
    FrameDraw, PlayStart, PlaybackClip, PlaybackEngine, Placeholder, Scheduler, TimerEvent,
    TimerOutcome,
};

use super::canvas;

/// A live browser timer. Dropping it frees the callback, so it must outlive the timer.
pub(super) struct TimerHandle {
    id: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

pub(super) struct BrowserScheduler {
    target: Weak<RefCell<Inner>>,
}

impl BrowserScheduler {
    fn callback(&self, event: TimerEvent) -> Closure<dyn FnMut()> {
        let target = self.target.clone();
        Closure::wrap(Box::new(move || {
            if let Some(inner) = target.upgrade() {
                on_timer(&inner, event);
            }
        }) as Box<dyn FnMut()>)
    }
}

fn window() -> Result<web_sys::Window, PlaybackError> {
    web_sys::window().ok_or_else(|| PlaybackError::Scheduler("no window".to_string()))
}

impl Scheduler for BrowserScheduler {
    type Handle = TimerHandle;

    fn arm_interval(
        &mut self,
        period_ms: u32,
        event: TimerEvent,
    ) -> Result<TimerHandle, PlaybackError> {
        let cb = self.callback(event);
        let id = window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .map_err(|_| PlaybackError::Scheduler("setInterval failed".to_string()))?;
        Ok(TimerHandle {
            id,
            repeating: true,
            _callback: cb,
        })
    }

    fn arm_timeout(&mut self, delay_ms: u32, event: TimerEvent) -> Result<TimerHandle, PlaybackError> {
        let cb = self.callback(event);
        let id = window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms as i32,
            )
            .map_err(|_| PlaybackError::Scheduler("setTimeout failed".to_string()))?;
        Ok(TimerHandle {
            id,
            repeating: false,
            _callback: cb,
        })
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(w) = web_sys::window() {
            if handle.repeating {
                w.clear_interval_with_handle(handle.id);
            } else {
                w.clear_timeout_with_handle(handle.id);
            }
        }
    }
}

/// An image being fetched, with the listeners that report back to the engine.
struct PendingImage {
    img: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for PendingImage {
    fn drop(&mut self) {
        self.img.set_onload(None);
        self.img.set_onerror(None);
    }
}

struct Inner {
    engine: PlaybackEngine<BrowserScheduler>,
    node: NodeRef<Canvas>,
    image: Option<PendingImage>,
    marker_radius: f64,
    placeholder_size: u32,
}

impl Inner {
    fn canvas(&self) -> Option<HtmlCanvasElement> {
        self.node.get_untracked()
    }

    fn paint(&self, draw: &FrameDraw) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        let bg = self.image.as_ref().map(|p| &p.img);
        if let Err(e) = canvas::draw_frame(&canvas, bg, draw, self.marker_radius) {
            tracing::warn!("{e}");
        }
    }

    fn paint_placeholder(&self, placeholder: &Placeholder) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        if let Err(e) =
            canvas::draw_placeholder(&canvas, &placeholder.message(), self.placeholder_size)
        {
            tracing::warn!("{e}");
        }
    }

    fn stop(&mut self) {
        self.engine.teardown();
        self.image = None;
        if let Some(canvas) = self.canvas() {
            let _ = canvas::clear(&canvas);
        }
    }
}

fn on_timer(inner: &Rc<RefCell<Inner>>, event: TimerEvent) {
    let Ok(mut inner) = inner.try_borrow_mut() else {
        return;
    };
    if let Some(canvas) = inner.canvas() {
        let size = canvas::fit_to_client(&canvas);
        inner.engine.set_surface(size);
    }
    match inner.engine.handle(event) {
        TimerOutcome::Draw(draw) => inner.paint(&draw),
        TimerOutcome::Placeholder(p) => {
            inner.image = None;
            inner.paint_placeholder(&p);
        }
        TimerOutcome::Ignored => {}
    }
}

fn on_image_loaded(inner: &Rc<RefCell<Inner>>, generation: u64) {
    let Ok(mut inner) = inner.try_borrow_mut() else {
        return;
    };
    match inner.engine.image_loaded(generation) {
        Ok(Some(draw)) => inner.paint(&draw),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("{e}");
            inner.image = None;
            inner.paint_placeholder(&Placeholder::ImageUnavailable);
        }
    }
}

fn on_image_failed(inner: &Rc<RefCell<Inner>>, generation: u64, src: &str) {
    let Ok(mut inner) = inner.try_borrow_mut() else {
        return;
    };
    if let Some(p) = inner.engine.image_failed(generation, src) {
        inner.image = None;
        inner.paint_placeholder(&p);
    }
}

/// The animation panel. Cheap to clone; all clones drive the same engine.
#[derive(Clone)]
pub(super) struct AnimationView {
    inner: Rc<RefCell<Inner>>,
}

impl AnimationView {
    pub fn new(node: NodeRef<Canvas>, cfg: &ClientConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            RefCell::new(Inner {
                engine: PlaybackEngine::new(
                    BrowserScheduler {
                        target: weak.clone(),
                    },
                    cfg.frame_interval_ms,
                    cfg.image_load_timeout_ms,
                ),
                node,
                image: None,
                marker_radius: cfg.marker_radius_px,
                placeholder_size: cfg.placeholder_size_px,
            })
        });
        Self { inner }
    }

    pub fn play(&self, clip: PlaybackClip) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        inner.image = None;
        let Some(canvas) = inner.canvas() else {
            tracing::warn!("animation: canvas not mounted");
            return;
        };
        let size = canvas::fit_to_client(&canvas);

        match inner.engine.play(clip, size) {
            Ok(PlayStart::Placeholder(p)) => inner.paint_placeholder(&p),
            Ok(PlayStart::Started(draw)) => inner.paint(&draw),
            Ok(PlayStart::AwaitingImage { url, generation }) => {
                match self.load_image(&url, generation) {
                    Ok(pending) => inner.image = Some(pending),
                    Err(e) => {
                        let reason = e.to_string();
                        if let Some(p) = inner.engine.image_failed(generation, &reason) {
                            inner.paint_placeholder(&p);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{e}");
                inner.paint_placeholder(&Placeholder::InvalidBounds);
            }
        }
    }

    pub fn show_placeholder(&self, placeholder: &Placeholder) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.stop();
            inner.paint_placeholder(placeholder);
        }
    }

    /// Cancels timers and pending image loads and blanks the canvas.
    pub fn stop(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.stop();
        }
    }

    fn load_image(&self, url: &str, generation: u64) -> Result<PendingImage, PlaybackError> {
        let img = HtmlImageElement::new()
            .map_err(|_| PlaybackError::ImageLoad("could not create image element".into()))?;

        let weak = Rc::downgrade(&self.inner);
        let onload = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                on_image_loaded(&inner, generation);
            }
        }) as Box<dyn FnMut()>);

        let weak = Rc::downgrade(&self.inner);
        let src = url.to_string();
        let onerror = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                on_image_failed(&inner, generation, &src);
            }
        }) as Box<dyn FnMut()>);

        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        img.set_src(url);

        Ok(PendingImage {
            img,
            _onload: onload,
            _onerror: onerror,
        })
    }
}
