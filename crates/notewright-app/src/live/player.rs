use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo_events::EventListener;
use notewright_renderer::download::video_file_name;
use notewright_renderer::player::{
    FullscreenCommand, PLAYER_MARKUP, PlaybackCommand, PlayerState, format_time, selectors,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlVideoElement, MouseEvent};

use super::download;

/// A mounted player. Listeners live as long as this does.
pub struct LivePlayer {
    _listeners: Vec<EventListener>,
}

struct Controls {
    container: Element,
    video: HtmlVideoElement,
    center: Element,
    controls: Element,
    progress: Element,
    filled: HtmlElement,
    play_pause: Element,
    volume_button: Element,
    slider: HtmlInputElement,
    current: Element,
    duration: Element,
    download: Element,
    fullscreen: Element,
}

fn find(root: &Element, class: &str) -> Result<Element, JsValue> {
    root.query_selector(&format!(".{class}"))?
        .ok_or_else(|| JsValue::from_str(&format!("player markup has no .{class}")))
}

impl Controls {
    fn find_in(host: &Element) -> Result<Self, JsValue> {
        let video = host
            .query_selector("video")?
            .ok_or_else(|| JsValue::from_str("player markup has no <video>"))?;
        Ok(Self {
            container: find(host, selectors::CONTAINER)?,
            video: video.dyn_into()?,
            center: find(host, selectors::CENTER_PLAY)?,
            controls: find(host, selectors::CONTROLS)?,
            progress: find(host, selectors::PROGRESS_BAR)?,
            filled: find(host, selectors::PROGRESS_FILLED)?.dyn_into()?,
            play_pause: find(host, selectors::PLAY_PAUSE)?,
            volume_button: find(host, selectors::VOLUME_BUTTON)?,
            slider: find(host, selectors::VOLUME_SLIDER)?.dyn_into()?,
            current: find(host, selectors::CURRENT_TIME)?,
            duration: find(host, selectors::DURATION)?,
            download: find(host, selectors::DOWNLOAD)?,
            fullscreen: find(host, selectors::FULLSCREEN)?,
        })
    }

    fn render(&self, state: &PlayerState) {
        set_icon(&self.play_pause, state.play_icon());
        let classes = self.center.class_list();
        let _ = if state.center_overlay_visible() {
            classes.remove_1(selectors::HIDDEN)
        } else {
            classes.add_1(selectors::HIDDEN)
        };
        let _ = self
            .filled
            .style()
            .set_property("width", &format!("{:.2}%", state.progress_percent()));
        self.current
            .set_text_content(Some(&format_time(state.current_time())));
        self.duration
            .set_text_content(Some(&format_time(state.duration())));
        set_icon(&self.volume_button, state.volume_icon().name());
        set_icon(&self.fullscreen, state.fullscreen_icon());
    }

    fn apply_volume(&self, state: &PlayerState) {
        self.video.set_volume(state.effective_volume());
        self.video.set_muted(state.is_muted());
        self.slider.set_value(&state.effective_volume().to_string());
        self.render(state);
    }
}

/// Icon buttons hold a single material-symbols span.
fn set_icon(button: &Element, name: &str) {
    match button.query_selector(".material-symbols-outlined") {
        Ok(Some(icon)) => icon.set_text_content(Some(name)),
        _ => button.set_text_content(Some(name)),
    }
}

type Shared = (Rc<Controls>, Rc<RefCell<PlayerState>>);

fn listen<F>(listeners: &mut Vec<EventListener>, target: &EventTarget, event: &'static str, handler: F)
where
    F: FnMut(&Event) + 'static,
{
    listeners.push(EventListener::new(target, event, handler));
}

fn toggle_playback((ui, state): &Shared) {
    let command = state.borrow_mut().toggle_play_pause();
    match command {
        PlaybackCommand::Play => match ui.video.play() {
            Ok(started) => {
                let (ui, state) = (ui.clone(), state.clone());
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = JsFuture::from(started).await {
                        tracing::debug!(error = ?err, "browser refused playback");
                        state.borrow_mut().on_pause();
                        ui.render(&state.borrow());
                    }
                });
            }
            Err(err) => {
                tracing::debug!(error = ?err, "browser refused playback");
                state.borrow_mut().on_pause();
            }
        },
        PlaybackCommand::Pause => {
            if let Err(err) = ui.video.pause() {
                tracing::debug!(error = ?err, "pause failed");
            }
        }
    }
    ui.render(&state.borrow());
}

fn toggle_fullscreen((ui, state): &Shared) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let has_fullscreen = document.fullscreen_element().is_some();
    match state.borrow().fullscreen_command(has_fullscreen) {
        FullscreenCommand::Enter => {
            if let Err(err) = ui.container.request_fullscreen() {
                tracing::debug!(error = ?err, "fullscreen request refused");
            }
        }
        FullscreenCommand::Exit => document.exit_fullscreen(),
    }
}

impl LivePlayer {
    /// Replace `host`'s children with the player markup pointed at `src`
    /// and wire up the controls.
    pub fn mount(host: &Element, src: &str) -> Result<Self, JsValue> {
        host.set_inner_html(PLAYER_MARKUP);
        let source = host
            .query_selector("source")?
            .ok_or_else(|| JsValue::from_str("player markup has no <source>"))?;
        source.set_attribute("src", src)?;

        let ui = Rc::new(Controls::find_in(host)?);
        ui.video.load();
        let state = Rc::new(RefCell::new(PlayerState::new()));
        ui.apply_volume(&state.borrow());
        let shared: Shared = (ui.clone(), state.clone());

        let mut listeners = Vec::new();
        let click_targets: [&EventTarget; 3] = [&ui.video, &ui.play_pause, &ui.center];
        for target in click_targets {
            let shared = shared.clone();
            listen(&mut listeners, target, "click", move |_| toggle_playback(&shared));
        }

        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.video, "play", move |_| {
                state.borrow_mut().on_play();
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.video, "pause", move |_| {
                state.borrow_mut().on_pause();
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.video, "ended", move |_| {
                state.borrow_mut().on_ended();
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.video, "timeupdate", move |_| {
                state.borrow_mut().on_time_update(view.video.current_time());
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.video, "loadedmetadata", move |_| {
                state.borrow_mut().on_loaded_metadata(view.video.duration());
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.progress, "click", move |event| {
                let Some(click) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let rect = view.progress.get_bounding_client_rect();
                let fraction = if rect.width() > 0.0 {
                    (f64::from(click.client_x()) - rect.left()) / rect.width()
                } else {
                    0.0
                };
                let position = state.borrow_mut().seek(fraction);
                if state.borrow().duration() > 0.0 {
                    view.video.set_current_time(position);
                }
                view.render(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.slider, "input", move |_| {
                let volume = view.slider.value().parse::<f64>().unwrap_or(0.0);
                state.borrow_mut().set_volume(volume);
                view.apply_volume(&state.borrow());
            });
        }
        {
            let (view, state) = shared.clone();
            listen(&mut listeners, &ui.volume_button, "click", move |_| {
                state.borrow_mut().toggle_mute();
                view.apply_volume(&state.borrow());
            });
        }
        {
            let shared = shared.clone();
            listen(&mut listeners, &ui.fullscreen, "click", move |_| {
                toggle_fullscreen(&shared)
            });
        }
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let (view, state) = shared.clone();
            listen(&mut listeners, &document, "fullscreenchange", move |_| {
                let actual = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.fullscreen_element())
                    .is_some_and(|el| el == view.container);
                state.borrow_mut().set_fullscreen(actual);
                view.render(&state.borrow());
            });
        }
        {
            let src = src.to_string();
            listen(&mut listeners, &ui.download, "click", move |event| {
                event.stop_propagation();
                download::save_url(src.clone(), video_file_name(Utc::now()));
            });
        }
        // clicks on the bar must not reach the video's play toggle
        listen(&mut listeners, &ui.controls, "click", |event| {
            event.stop_propagation()
        });

        ui.render(&state.borrow());
        Ok(Self {
            _listeners: listeners,
        })
    }
}
