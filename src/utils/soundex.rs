//! American Soundex phonetic codes.
//!
//! Names are reduced to a 4-character code: the (uppercased) first character
//! followed by three consonant-class digits. Names that sound alike, such as
//! "Robert" and "Rupert", share a code.

/// Length of every non-empty phonetic code
pub const CODE_LEN: usize = 4;

/// How a character after the first contributes to the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoundClass {
    /// Consonant that emits a digit
    Digit(char),
    /// Vowel or Y: emits nothing but separates repeated digits
    Separator,
    /// H, W and non-letters: emit nothing and keep adjacency
    Transparent,
}

#[inline]
fn classify(c: char) -> SoundClass {
    match c {
        'B' | 'F' | 'P' | 'V' => SoundClass::Digit('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => SoundClass::Digit('2'),
        'D' | 'T' => SoundClass::Digit('3'),
        'L' => SoundClass::Digit('4'),
        'M' | 'N' => SoundClass::Digit('5'),
        'R' => SoundClass::Digit('6'),
        'H' | 'W' => SoundClass::Transparent,
        c if c.is_alphabetic() => SoundClass::Separator,
        _ => SoundClass::Transparent,
    }
}

/// Encode a name as its Soundex code.
///
/// Returns an empty string for empty input; every other input yields exactly
/// [`CODE_LEN`] characters, right-padded with `'0'`.
pub fn encode(name: &str) -> String {
    let mut upper = name.chars().flat_map(char::to_uppercase);

    let Some(first) = upper.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(CODE_LEN);
    code.push(first);
    let mut emitted = 1;
    let mut last_digit: Option<char> = None;

    for c in upper {
        if emitted == CODE_LEN {
            break;
        }
        match classify(c) {
            SoundClass::Digit(d) => {
                if last_digit != Some(d) {
                    code.push(d);
                    emitted += 1;
                }
                last_digit = Some(d);
            }
            SoundClass::Separator => last_digit = None,
            SoundClass::Transparent => {}
        }
    }

    while emitted < CODE_LEN {
        code.push('0');
        emitted += 1;
    }

    code
}
