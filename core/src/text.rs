//! User-visible text.

/// Identifier of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextId {
    /// Generic failure shown when a session cannot start.
    ErrorRetrievingGame,
}

/// Messages per language, English first.
const ERROR_RETRIEVING_GAME: &[(&str, &str)] = &[
    ("en", "An error occurred while retrieving the game."),
    ("es", "Se produjo un error al recuperar el juego."),
    ("fr", "Une erreur s'est produite lors de la récupération du jeu."),
    ("de", "Beim Abrufen des Spiels ist ein Fehler aufgetreten."),
    ("pt", "Ocorreu um erro ao recuperar o jogo."),
];

/// Look up a message for `locale`.
///
/// Region suffixes are ignored (`pt-BR` uses `pt`); unknown languages fall
/// back to English.
pub fn get_text(id: TextId, locale: &str) -> &'static str {
    let table = match id {
        TextId::ErrorRetrievingGame => ERROR_RETRIEVING_GAME,
    };
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    table
        .iter()
        .find(|(lang, _)| *lang == language)
        .or_else(|| table.first())
        .map(|(_, text)| *text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages() {
        assert_eq!(
            get_text(TextId::ErrorRetrievingGame, "fr"),
            "Une erreur s'est produite lors de la récupération du jeu."
        );
        assert_eq!(
            get_text(TextId::ErrorRetrievingGame, "pt-BR"),
            "Ocorreu um erro ao recuperar o jogo."
        );
        assert_eq!(
            get_text(TextId::ErrorRetrievingGame, "DE_at"),
            "Beim Abrufen des Spiels ist ein Fehler aufgetreten."
        );
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(
            get_text(TextId::ErrorRetrievingGame, "ja"),
            "An error occurred while retrieving the game."
        );
        assert_eq!(
            get_text(TextId::ErrorRetrievingGame, ""),
            "An error occurred while retrieving the game."
        );
    }
}
