//! Text normalization applied to both sides of every textual comparison.

use deunicode::deunicode_char;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case folding and Unicode canonicalization.
///
/// The evaluator calls [`TextNormalizer::prepare`] on every term and every
/// candidate text before testing containment, so two strings the normalizer
/// maps to the same form always match each other.
pub trait TextNormalizer {
    /// Case-insensitive folding.
    fn fold(&self, text: &str) -> String;

    /// Canonical-form normalization.
    fn normalize(&self, text: &str) -> String;

    /// Applies both steps: `fold(normalize(text))`.
    fn prepare(&self, text: &str) -> String {
        self.fold(&self.normalize(text))
    }
}

/// Default normalizer: compatibility decomposition without combining marks,
/// then lowercase.
///
/// Accents, ligatures, and full-width forms collapse onto their base letters
/// (`"Ｃａｆé"` and `"cafe"` compare equal). Letters of other scripts keep
/// their identity, so a kana or Cyrillic term never matches Latin text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeFolder;

impl TextNormalizer for UnicodeFolder {
    fn fold(&self, text: &str) -> String {
        text.to_lowercase()
    }

    fn normalize(&self, text: &str) -> String {
        text.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
    }
}

/// Transliterates to ASCII, then lowercases.
///
/// Looser than [`UnicodeFolder`]: text in any script is spelled out in
/// Latin letters (`"Москва"` becomes `"moskva"`), so queries typed on an
/// ASCII keyboard can reach it. Characters without a transliteration are
/// kept as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transliterate;

impl TextNormalizer for Transliterate {
    fn fold(&self, text: &str) -> String {
        text.to_lowercase()
    }

    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch);
                continue;
            }
            match deunicode_char(ch) {
                Some(ascii) => out.push_str(ascii),
                None => out.push(ch),
            }
        }
        out
    }
}

/// Case folding only. Accented and plain letters stay distinct.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFold;

impl TextNormalizer for CaseFold {
    fn fold(&self, text: &str) -> String {
        text.to_lowercase()
    }

    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<N: TextNormalizer + ?Sized> TextNormalizer for &N {
    fn fold(&self, text: &str) -> String {
        (**self).fold(text)
    }

    fn normalize(&self, text: &str) -> String {
        (**self).normalize(text)
    }
}
