//! Sound cues played in response to quiz events.

/// Cue played once after a correct answer.
pub const CORRECT_ANSWER_SOUND: &str = "Ding";

/// Fire-and-forget audio output.
///
/// Implementations must not block and must swallow their own playback failures.
pub trait SoundPlayer: Send + Sync {
    fn play_sound(&self, name: &str);
}

/// Player that only logs; used when no audio backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn play_sound(&self, name: &str) {
        tracing::debug!(sound = name, "sound suppressed");
    }
}
