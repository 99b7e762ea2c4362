//! State and markup for the custom video player.
//!
//! [`PlayerState`] holds everything the controls display. The media element
//! stays the source of truth for playback: commands go out, and the element's
//! own events (`play`, `pause`, `timeupdate`, `fullscreenchange`, ...) come
//! back in to update the state.

/// Markup mounted into each video placeholder. The `<source>` gets its `src`
/// set afterwards, so the template itself never carries user data.
pub const PLAYER_MARKUP: &str = r#"<div class="video-container">
  <video preload="metadata">
    <source type="video/mp4">
    Your browser does not support the video tag.
  </video>
  <div class="play-button-center">
    <span class="material-symbols-outlined">play_arrow</span>
  </div>
  <div class="video-controls">
    <div class="progress-bar">
      <div class="progress-bar-inner">
        <div class="progress-filled" style="width: 0%"></div>
      </div>
    </div>
    <div class="controls-row">
      <div class="controls-left">
        <button type="button" class="control-button play-pause" aria-label="Play">
          <span class="material-symbols-outlined">play_arrow</span>
        </button>
        <div class="volume-container">
          <button type="button" class="control-button volume-btn" aria-label="Mute">
            <span class="material-symbols-outlined">volume_up</span>
          </button>
          <input type="range" class="volume-slider" min="0" max="1" step="0.01" value="1">
        </div>
        <div class="time-display">
          <span class="current-time">0:00</span> / <span class="duration">0:00</span>
        </div>
      </div>
      <div class="controls-right">
        <button type="button" class="control-button download-btn" title="Download video">
          <span class="material-symbols-outlined">download</span>
        </button>
        <button type="button" class="control-button fullscreen-btn" aria-label="Fullscreen">
          <span class="material-symbols-outlined">fullscreen</span>
        </button>
      </div>
    </div>
  </div>
</div>"#;

/// Class names inside [`PLAYER_MARKUP`] that scripts look up.
pub mod selectors {
    pub const CONTAINER: &str = "video-container";
    pub const CENTER_PLAY: &str = "play-button-center";
    pub const CONTROLS: &str = "video-controls";
    pub const PROGRESS_BAR: &str = "progress-bar";
    pub const PROGRESS_FILLED: &str = "progress-filled";
    pub const PLAY_PAUSE: &str = "play-pause";
    pub const VOLUME_BUTTON: &str = "volume-btn";
    pub const VOLUME_SLIDER: &str = "volume-slider";
    pub const CURRENT_TIME: &str = "current-time";
    pub const DURATION: &str = "duration";
    pub const DOWNLOAD: &str = "download-btn";
    pub const FULLSCREEN: &str = "fullscreen-btn";
    /// Added to the center overlay while playing
    pub const HIDDEN: &str = "hidden";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenCommand {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    High,
}

impl VolumeIcon {
    pub fn name(self) -> &'static str {
        match self {
            VolumeIcon::Muted => "volume_off",
            VolumeIcon::Low => "volume_down",
            VolumeIcon::High => "volume_up",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    current_time: f64,
    duration: f64,
    volume: f64,
    /// Restored when unmuting
    last_volume: f64,
    muted: bool,
    playing: bool,
    fullscreen: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            last_volume: 1.0,
            muted: false,
            playing: false,
            fullscreen: false,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn toggle_play_pause(&mut self) -> PlaybackCommand {
        if self.playing {
            self.playing = false;
            PlaybackCommand::Pause
        } else {
            self.playing = true;
            PlaybackCommand::Play
        }
    }

    pub fn on_play(&mut self) {
        self.playing = true;
    }

    pub fn on_pause(&mut self) {
        self.playing = false;
    }

    pub fn on_ended(&mut self) {
        self.playing = false;
    }

    pub fn on_time_update(&mut self, current_time: f64) {
        self.current_time = finite_or_zero(current_time);
    }

    pub fn on_loaded_metadata(&mut self, duration: f64) {
        self.duration = finite_or_zero(duration);
    }

    /// Position for a click at `fraction` of the track width. Returns the
    /// time in seconds to hand to the media element.
    pub fn seek(&mut self, fraction: f64) -> f64 {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.current_time = fraction * self.duration;
        self.current_time
    }

    /// Slider input. Any positive volume also unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.volume = volume;
        if volume > 0.0 {
            self.last_volume = volume;
        }
        self.muted = volume == 0.0;
    }

    /// Swap between silence and the last non-zero volume.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.last_volume;
        } else {
            self.muted = true;
        }
    }

    /// Volume the media element should actually play at.
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    pub fn volume_icon(&self) -> VolumeIcon {
        if self.muted || self.volume == 0.0 {
            VolumeIcon::Muted
        } else if self.volume < 0.5 {
            VolumeIcon::Low
        } else {
            VolumeIcon::High
        }
    }

    /// Decided from the document, not from [`Self::is_fullscreen`]: the user
    /// can leave fullscreen with Esc without going through the controls.
    pub fn fullscreen_command(&self, document_has_fullscreen: bool) -> FullscreenCommand {
        if document_has_fullscreen {
            FullscreenCommand::Exit
        } else {
            FullscreenCommand::Enter
        }
    }

    /// Record the state reported by `fullscreenchange`.
    pub fn set_fullscreen(&mut self, actual: bool) {
        self.fullscreen = actual;
    }

    pub fn fullscreen_icon(&self) -> &'static str {
        if self.fullscreen {
            "fullscreen_exit"
        } else {
            "fullscreen"
        }
    }

    pub fn play_icon(&self) -> &'static str {
        if self.playing { "pause" } else { "play_arrow" }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn center_overlay_visible(&self) -> bool {
        !self.playing
    }

    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time),
            format_time(self.duration)
        )
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_time(seconds: f64) -> String {
    let total = finite_or_zero(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
