//! Pacing-marker parsing for generated meditation scripts
//!
//! Generated scripts carry inline pacing directives consumed by the speech
//! synthesis step: `[PAUSE n]` (n-second pause), `[BREATHE]` (breathing cue),
//! and `[LONG_PAUSE]` (extended rest).

use std::time::Duration;

/// Seconds of rest represented by a `[LONG_PAUSE]` marker
pub const LONG_PAUSE_SECONDS: u64 = 5;

/// One piece of a script after marker parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSegment {
    /// Narrated text between markers
    Speech(String),
    /// Timed silence
    Pause(Duration),
    /// Guided breathing cue ("breathe in... and breathe out...")
    Breath,
}

/// Split a script into speech segments and pacing directives
///
/// Malformed markers (`[PAUSE]` without a count, unknown bracket tags) are
/// treated as literal text rather than rejected; generation output is not
/// trusted to be well-formed.
pub fn parse_segments(script: &str) -> Vec<ScriptSegment> {
    let mut segments = Vec::new();
    let mut speech = String::new();
    let mut rest = script;

    while let Some(open) = rest.find('[') {
        let (before, from_bracket) = rest.split_at(open);
        speech.push_str(before);

        let Some(close) = from_bracket.find(']') else {
            // Unterminated bracket: keep the remainder as literal speech
            speech.push_str(from_bracket);
            rest = "";
            break;
        };

        let marker = &from_bracket[1..close];
        rest = &from_bracket[close + 1..];

        match parse_marker(marker) {
            Some(segment) => {
                flush_speech(&mut segments, &mut speech);
                segments.push(segment);
            }
            None => {
                // Not a pacing marker; keep the bracketed text verbatim
                speech.push('[');
                speech.push_str(marker);
                speech.push(']');
            }
        }
    }

    speech.push_str(rest);
    flush_speech(&mut segments, &mut speech);
    segments
}

/// Expand markers into narration-friendly text
///
/// `[PAUSE n]` becomes a run of ellipses sized to n, `[BREATHE]` becomes a
/// spoken breathing cue, `[LONG_PAUSE]` a long ellipsis run.
pub fn expand_markers(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    for segment in parse_segments(script) {
        match segment {
            ScriptSegment::Speech(text) => out.push_str(&text),
            ScriptSegment::Pause(duration) => {
                out.push_str("... ");
                for _ in 0..duration.as_secs() {
                    out.push_str("...");
                }
                out.push(' ');
            }
            ScriptSegment::Breath => out.push_str("... breathe in... and breathe out... "),
        }
    }
    out
}

/// Total rest time contributed by pacing markers
pub fn total_pause(segments: &[ScriptSegment]) -> Duration {
    segments
        .iter()
        .map(|segment| match segment {
            ScriptSegment::Pause(duration) => *duration,
            // A breathing cue paces roughly one slow breath
            ScriptSegment::Breath => Duration::from_secs(4),
            ScriptSegment::Speech(_) => Duration::ZERO,
        })
        .sum()
}

fn parse_marker(marker: &str) -> Option<ScriptSegment> {
    if marker == "BREATHE" {
        return Some(ScriptSegment::Breath);
    }
    if marker == "LONG_PAUSE" {
        return Some(ScriptSegment::Pause(Duration::from_secs(LONG_PAUSE_SECONDS)));
    }
    if let Some(count) = marker.strip_prefix("PAUSE ") {
        if let Ok(seconds) = count.trim().parse::<u64>() {
            return Some(ScriptSegment::Pause(Duration::from_secs(seconds)));
        }
    }
    None
}

fn flush_speech(segments: &mut Vec<ScriptSegment>, speech: &mut String) {
    if !speech.trim().is_empty() {
        segments.push(ScriptSegment::Speech(std::mem::take(speech)));
    } else {
        speech.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let segments = parse_segments("Close your eyes and settle in.");
        assert_eq!(
            segments,
            vec![ScriptSegment::Speech(
                "Close your eyes and settle in.".to_string()
            )]
        );
    }

    #[test]
    fn test_parse_mixed_markers() {
        let segments = parse_segments("Relax. [PAUSE 3] [BREATHE] Let go. [LONG_PAUSE]");
        assert_eq!(
            segments,
            vec![
                ScriptSegment::Speech("Relax. ".to_string()),
                ScriptSegment::Pause(Duration::from_secs(3)),
                ScriptSegment::Breath,
                ScriptSegment::Speech(" Let go. ".to_string()),
                ScriptSegment::Pause(Duration::from_secs(LONG_PAUSE_SECONDS)),
            ]
        );
    }

    #[test]
    fn test_malformed_marker_kept_as_text() {
        let segments = parse_segments("Hold [PAUSE] here [NOTE: softly].");
        assert_eq!(
            segments,
            vec![ScriptSegment::Speech(
                "Hold [PAUSE] here [NOTE: softly].".to_string()
            )]
        );
    }

    #[test]
    fn test_unterminated_bracket() {
        let segments = parse_segments("Breathe out [PAUSE 2");
        assert_eq!(
            segments,
            vec![ScriptSegment::Speech("Breathe out [PAUSE 2".to_string())]
        );
    }

    #[test]
    fn test_expand_markers() {
        let expanded = expand_markers("Rest now. [PAUSE 2] [BREATHE]");
        assert_eq!(
            expanded,
            "Rest now. ... ...... ... breathe in... and breathe out... "
        );
    }

    #[test]
    fn test_total_pause() {
        let segments = parse_segments("a [PAUSE 3] b [LONG_PAUSE] c [BREATHE]");
        assert_eq!(total_pause(&segments), Duration::from_secs(3 + 5 + 4));
    }
}
