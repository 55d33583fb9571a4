use crate::extractor::language::language_name;
use crate::rewrite::RewriteRequest;

/// Body characters sent to the model.
pub const MAX_BODY_CHARS: usize = 4000;

pub fn system_prompt(language: Option<&str>) -> String {
    let language = language
        .and_then(language_name)
        .unwrap_or("the same language as the article");

    format!(
        "You are a news editor. Rewrite the article you are given into an original piece \
         written in {language}, keeping every fact and removing nothing of substance. \
         The content must naturally include the citation phrase supplied by the user, \
         word for word, so readers know where the story came from. \
         Reply with a single JSON object with exactly these string fields: \
         \"title\", \"content\", \"excerpt\". The excerpt is one or two sentences. \
         Do not wrap the JSON in markdown."
    )
}

pub fn user_prompt(request: &RewriteRequest) -> String {
    format!(
        "Source: {source}\nCitation phrase: {phrase}\n\nTitle: {title}\n\nArticle:\n{body}",
        source = request.source_name_local,
        phrase = request.citation_phrase,
        title = request.title,
        body = request.body,
    )
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Removes a surrounding markdown code fence, if the model added one.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
