//! Audio probing for the TTS atomic write protocol:
//! "assert non-zero size, valid audio framing, and a plausible duration".

use std::io::Cursor;

use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::TtsError;

/// Minimum plausible duration for a real (non "no-content") digest.
pub const MIN_PLAUSIBLE_DURATION_SECONDS: f64 = 10.0;

/// Probes raw audio bytes and returns the decoded duration in seconds.
///
/// Returns `TtsError::ProbeFailed` if the bytes are empty, not valid audio
/// framing, or report a zero/unreadable duration.
pub fn probe_duration_seconds(bytes: &[u8]) -> Result<f64, TtsError> {
    if bytes.is_empty() {
        return Err(TtsError::ProbeFailed("audio buffer is empty".to_string()));
    }

    let source = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new().with_extension("mp3"),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TtsError::ProbeFailed(format!("unrecognized audio framing: {e}")))?;

    let format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| TtsError::ProbeFailed("no audio track found".to_string()))?;

    let codec_params = &track.codec_params;
    let _ = symphonia::default::get_codecs()
        .make(codec_params, &DecoderOptions::default())
        .map_err(|e| TtsError::ProbeFailed(format!("unsupported codec: {e}")))?;

    let (Some(n_frames), Some(sample_rate)) = (codec_params.n_frames, codec_params.sample_rate)
    else {
        return Err(TtsError::ProbeFailed(
            "audio framing did not report frame count/sample rate".to_string(),
        ));
    };

    if sample_rate == 0 {
        return Err(TtsError::ProbeFailed("sample rate is zero".to_string()));
    }

    Ok(n_frames as f64 / sample_rate as f64)
}

/// Validates that a probed duration meets the "plausible duration" bar,
/// unless the script is a known no-content digest.
pub fn assert_plausible_duration(duration_seconds: f64, is_no_content: bool) -> Result<(), TtsError> {
    if !is_no_content && duration_seconds <= MIN_PLAUSIBLE_DURATION_SECONDS {
        return Err(TtsError::ProbeFailed(format!(
            "duration {duration_seconds:.1}s is not plausible for a real digest"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_fails_probe() {
        let result = probe_duration_seconds(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn garbage_bytes_fail_probe() {
        let result = probe_duration_seconds(&[0u8; 16]);
        assert!(result.is_err());
    }

    #[test]
    fn short_duration_is_implausible_for_real_digest() {
        assert!(assert_plausible_duration(5.0, false).is_err());
    }

    #[test]
    fn short_duration_is_plausible_for_no_content_digest() {
        assert!(assert_plausible_duration(2.0, true).is_ok());
    }

    #[test]
    fn long_duration_is_plausible() {
        assert!(assert_plausible_duration(120.0, false).is_ok());
    }
}
