//! Audio playback using HTML media elements
//!
//! Every failure here is swallowed: blocked autoplay or a missing file just
//! means silence.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

use crate::settings::Settings;

const MUSIC_URL: &str = "assets/music.mp3";
const LANE_SFX_URL: &str = "assets/lane.mp3";
const IMPACT_SFX_URL: &str = "assets/impact.mp3";

const MUSIC_VOLUME: f32 = 0.4;
const LANE_VOLUME: f32 = 0.5;
const IMPACT_VOLUME: f32 = 0.7;

/// Lane cue is cropped to a short slice of its file
const LANE_CUE_START: f64 = 0.8;
const LANE_CUE_MS: i32 = 180;
const IMPACT_CUE_START: f64 = 1.2;

/// Cues the game can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    LaneChange,
    Impact,
}

/// Audio manager for the game
pub struct AudioManager {
    music: Option<HtmlAudioElement>,
    lane: Option<HtmlAudioElement>,
    impact: Option<HtmlAudioElement>,
    music_started: bool,
}

fn load(url: &str) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(url) {
        Ok(el) => Some(el),
        Err(e) => {
            log::warn!("Failed to create audio element for {}: {:?}", url, e);
            None
        }
    }
}

/// Start playback, ignoring the returned promise's rejection
fn play(el: &HtmlAudioElement) {
    if let Ok(promise) = el.play() {
        let ignore = Closure::<dyn FnMut(JsValue)>::new(|_| {});
        let _ = promise.catch(&ignore);
        ignore.forget();
    }
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        let music = load(MUSIC_URL);
        if let Some(music) = &music {
            music.set_loop(true);
        }
        let manager = Self {
            music,
            lane: load(LANE_SFX_URL),
            impact: load(IMPACT_SFX_URL),
            music_started: false,
        };
        manager.apply_settings(settings);
        manager
    }

    /// Push volume settings onto the media elements
    pub fn apply_settings(&self, settings: &Settings) {
        if let Some(el) = &self.music {
            el.set_volume(settings.music_gain(MUSIC_VOLUME) as f64);
        }
        if let Some(el) = &self.lane {
            el.set_volume(settings.sfx_gain(LANE_VOLUME) as f64);
        }
        if let Some(el) = &self.impact {
            el.set_volume(settings.sfx_gain(IMPACT_VOLUME) as f64);
        }
    }

    /// Begin the music loop on the first user gesture
    pub fn start_music_once(&mut self) {
        if self.music_started {
            return;
        }
        self.music_started = true;
        if let Some(el) = &self.music {
            if el.paused() {
                play(el);
            }
        }
    }

    /// Pause and rewind the music loop
    pub fn stop_music(&self) {
        if let Some(el) = &self.music {
            if !el.paused() {
                let _ = el.pause();
                el.set_current_time(0.0);
            }
        }
    }

    pub fn play(&self, cue: Cue) {
        match cue {
            Cue::LaneChange => self.play_lane_cue(),
            Cue::Impact => {
                if let Some(el) = &self.impact {
                    el.set_current_time(IMPACT_CUE_START);
                    play(el);
                }
            }
        }
    }

    fn play_lane_cue(&self) {
        let Some(el) = &self.lane else { return };
        el.set_current_time(LANE_CUE_START);
        play(el);

        let el = el.clone();
        let stop = Closure::once(move || {
            let _ = el.pause();
            el.set_current_time(0.0);
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                stop.as_ref().unchecked_ref(),
                LANE_CUE_MS,
            );
        }
        stop.forget();
    }
}
