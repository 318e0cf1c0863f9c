//! Display names for detected language codes.

/// Human-readable name for a two-letter language code.
///
/// Returns `None` for codes outside the table.
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "be" => "Belarusian",
        "ca" => "Catalan",
        "da" => "Danish",
        "de" => "German",
        "eo" => "Esperanto",
        "et" => "Estonian",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "fi" => "Finnish",
        "fr" => "French",
        "fa" => "Persian",
        "gl" => "Galician",
        "hu" => "Hungarian",
        "is" => "Icelandic",
        "it" => "Italian",
        "lt" => "Lithuanian",
        "nl" => "Dutch",
        "no" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sk" => "Slovakian",
        "sl" => "Slovenian",
        "sv" => "Swedish",
        "th" => "Thai",
        "uk" => "Ukrainian",
        _ => return None,
    };
    Some(name)
}

/// Display value for a code: the table name, or the code itself.
pub fn display_name(code: &str) -> String {
    language_name(code).unwrap_or(code).to_string()
}
