use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u32);

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audio file {path} is empty")]
    Empty { path: PathBuf },
}

/// Playback contract used by scenes. Loading happens once at scene load;
/// playback calls are fire-and-forget.
pub trait AudioBackend {
    fn load_music(&mut self, path: &Path) -> Result<AudioHandle, AudioError>;
    fn play_music(&mut self, handle: AudioHandle, looped: bool);
    fn load_sound(&mut self, path: &Path) -> Result<AudioHandle, AudioError>;
    fn play_sound_once(&mut self, handle: AudioHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipKind {
    Music,
    Sound,
}

#[derive(Debug, Clone)]
struct Clip {
    kind: ClipKind,
    path: PathBuf,
    byte_len: usize,
}

/// Backend without an output device: clips are read and validated at load time
/// and playback is reported through tracing.
#[derive(Debug, Default)]
pub struct LoggedAudio {
    clips: Vec<Clip>,
    music_playing: Option<AudioHandle>,
    sounds_played: u64,
}

impl LoggedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn music_playing(&self) -> Option<AudioHandle> {
        self.music_playing
    }

    pub fn sounds_played(&self) -> u64 {
        self.sounds_played
    }

    fn load(&mut self, path: &Path, kind: ClipKind) -> Result<AudioHandle, AudioError> {
        let bytes = fs::read(path).map_err(|source| AudioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(AudioError::Empty {
                path: path.to_path_buf(),
            });
        }
        self.clips.push(Clip {
            kind,
            path: path.to_path_buf(),
            byte_len: bytes.len(),
        });
        let handle = AudioHandle(self.clips.len() as u32 - 1);
        debug!(
            path = %path.display(),
            kind = ?kind,
            bytes = bytes.len(),
            handle = handle.0,
            "audio_clip_loaded"
        );
        Ok(handle)
    }

    fn clip(&self, handle: AudioHandle, kind: ClipKind) -> Option<&Clip> {
        let clip = self.clips.get(handle.0 as usize)?;
        (clip.kind == kind).then_some(clip)
    }
}

impl AudioBackend for LoggedAudio {
    fn load_music(&mut self, path: &Path) -> Result<AudioHandle, AudioError> {
        self.load(path, ClipKind::Music)
    }

    fn play_music(&mut self, handle: AudioHandle, looped: bool) {
        let Some(clip) = self.clip(handle, ClipKind::Music) else {
            warn!(handle = handle.0, "audio_unknown_music_handle");
            return;
        };
        info!(
            path = %clip.path.display(),
            bytes = clip.byte_len,
            looped,
            "music_started"
        );
        self.music_playing = Some(handle);
    }

    fn load_sound(&mut self, path: &Path) -> Result<AudioHandle, AudioError> {
        self.load(path, ClipKind::Sound)
    }

    fn play_sound_once(&mut self, handle: AudioHandle) {
        let Some(clip) = self.clip(handle, ClipKind::Sound) else {
            warn!(handle = handle.0, "audio_unknown_sound_handle");
            return;
        };
        debug!(path = %clip.path.display(), "sound_played");
        self.sounds_played = self.sounds_played.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_clip(temp: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, bytes).expect("write clip");
        path
    }

    #[test]
    fn loads_and_plays_music_and_sounds() {
        let temp = TempDir::new().expect("temp");
        let music_path = write_clip(&temp, "loop.mp3", b"ID3fake");
        let sound_path = write_clip(&temp, "jump.wav", b"RIFFfake");
        let mut audio = LoggedAudio::new();

        let music = audio.load_music(&music_path).expect("music");
        let sound = audio.load_sound(&sound_path).expect("sound");
        assert_ne!(music, sound);

        audio.play_music(music, true);
        audio.play_sound_once(sound);
        audio.play_sound_once(sound);

        assert_eq!(audio.music_playing(), Some(music));
        assert_eq!(audio.sounds_played(), 2);
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().expect("temp");
        let mut audio = LoggedAudio::new();
        let err = audio
            .load_sound(&temp.path().join("absent.wav"))
            .expect_err("err");
        assert!(matches!(err, AudioError::Read { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let temp = TempDir::new().expect("temp");
        let path = write_clip(&temp, "silent.wav", b"");
        let mut audio = LoggedAudio::new();
        let err = audio.load_music(&path).expect_err("err");
        assert!(matches!(err, AudioError::Empty { .. }));
    }

    #[test]
    fn handles_are_not_interchangeable_between_kinds() {
        let temp = TempDir::new().expect("temp");
        let sound_path = write_clip(&temp, "jump.wav", b"RIFFfake");
        let mut audio = LoggedAudio::new();
        let sound = audio.load_sound(&sound_path).expect("sound");

        audio.play_music(sound, true);
        audio.play_sound_once(AudioHandle(99));

        assert_eq!(audio.music_playing(), None);
        assert_eq!(audio.sounds_played(), 0);
    }
}
