use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_CHARS: usize = 40;

/// ISO 639-1 code of the body's language, when detection is confident.
/// The rewrite prompt uses it to keep the rewritten article in the source
/// language.
pub fn detect_language(text: &str) -> Option<&'static str> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let info = detect(text)?;
    if info.confidence() < MIN_CONFIDENCE {
        return None;
    }
    iso_639_1(info.lang())
}

/// English name for a code returned by [`detect_language`].
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(lang, _)| lang.eng_name())
}

const LANGUAGES: &[(Lang, &str)] = &[
    (Lang::Ara, "ar"),
    (Lang::Eng, "en"),
    (Lang::Fra, "fr"),
    (Lang::Spa, "es"),
    (Lang::Deu, "de"),
    (Lang::Tur, "tr"),
    (Lang::Pes, "fa"),
    (Lang::Urd, "ur"),
    (Lang::Heb, "he"),
    (Lang::Rus, "ru"),
    (Lang::Cmn, "zh"),
    (Lang::Hin, "hi"),
];

fn iso_639_1(lang: Lang) -> Option<&'static str> {
    LANGUAGES.iter().find(|(l, _)| *l == lang).map(|(_, code)| *code)
}
