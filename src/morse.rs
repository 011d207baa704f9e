//! Morse transmit formatter (component C16): the dit/dah half of C12 that
//! spec.md's prose leaves as a timing rule only. `dot_duration_us` is the
//! length of one unit; dashes are three units, gaps follow the
//! standard 1/3/7-unit spacing.

use crate::fsk::FskModulator;

/// ITU Morse code for letters, digits, matching the original table's
/// coverage (no punctuation beyond what it encodes).
fn pattern_for(ch: char) -> Option<&'static str> {
    Some(match ch.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        _ => return None,
    })
}

/// The dit/dah pattern for `ch`, or `None` if it has no Morse encoding.
pub fn encode_char(ch: char) -> Option<&'static str> {
    pattern_for(ch)
}

fn send_element(modulator: &mut dyn FskModulator, element: char, dot_us: u32, last: bool) {
    match element {
        '.' => modulator.send_mark(dot_us),
        '-' => modulator.send_mark(3 * dot_us),
        _ => unreachable!("pattern table only contains '.' and '-'"),
    }
    if !last {
        modulator.send_silence(dot_us);
    }
}

/// Transmits `text` as Morse. Characters with no encoding (anything but
/// letters, digits, and space) are silently skipped, mirroring the Baudot
/// transmitter's policy for unmapped characters.
pub fn transmit(text: &str, modulator: &mut dyn FskModulator, dot_us: u32) {
    for ch in text.chars() {
        if ch == ' ' {
            // The previous character already emitted a 3-unit gap; 4 more
            // units brings the inter-word gap to the standard 7 units.
            modulator.send_silence(4 * dot_us);
            continue;
        }

        let Some(pattern) = pattern_for(ch) else {
            continue;
        };

        let elements: Vec<char> = pattern.chars().collect();
        for (i, &element) in elements.iter().enumerate() {
            send_element(modulator, element, dot_us, i == elements.len() - 1);
        }
        modulator.send_silence(3 * dot_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsk::MemoryModulator;

    #[test]
    fn sos_has_the_expected_pattern() {
        assert_eq!(encode_char('s'), Some("..."));
        assert_eq!(encode_char('O'), Some("---"));
    }

    #[test]
    fn unmapped_characters_have_no_pattern() {
        assert_eq!(encode_char('@'), None);
    }

    #[test]
    fn transmitting_a_single_dot_character_produces_one_mark_run() {
        let mut m = MemoryModulator::new(8000, 1000.0, 1000.0);
        transmit("E", &mut m, 1000);
        // One dot (1000us mark) plus the trailing 3-unit inter-char gap.
        assert_eq!(m.samples().len(), 8 + 24);
    }

    #[test]
    fn unmapped_characters_are_skipped_without_emitting_silence() {
        let mut m = MemoryModulator::new(8000, 1000.0, 1000.0);
        transmit("@", &mut m, 1000);
        assert!(m.samples().is_empty());
    }
}
