//! Text folding and clause-aware tokenization.

/// One word of input, tagged with the clause it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub clause: usize,
}

/// Fold one lowercase character to its unaccented Latin form.
pub fn fold_char(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '’' | '‘' | '`')
}

fn is_clause_punctuation(ch: char) -> bool {
    matches!(ch, ',' | '.' | ';' | ':' | '!' | '?' | '\n' | '\r')
}

/// Lowercase, strip diacritics, drop apostrophes ("Don't" → "dont").
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_apostrophe(*c))
        .map(fold_char)
        .collect()
}

/// Split folded text into word tokens.
///
/// Punctuation (`, . ; : ! ?`, newlines) starts a new clause, as does any
/// word for which `is_breaker` returns true. Breaker words are not emitted.
/// Hyphens and other symbols only separate words.
pub fn tokenize(text: &str, is_breaker: impl Fn(&str) -> bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut clause = 0usize;
    let mut word = String::new();

    let flush = |word: &mut String, clause: &mut usize, tokens: &mut Vec<Token>| {
        if word.is_empty() {
            return;
        }
        let text = std::mem::take(word);
        if is_breaker(&text) {
            *clause += 1;
        } else {
            tokens.push(Token { text, clause: *clause });
        }
    };

    for ch in fold(text).chars() {
        if ch.is_alphanumeric() {
            word.push(ch);
        } else if is_clause_punctuation(ch) {
            flush(&mut word, &mut clause, &mut tokens);
            clause += 1;
        } else {
            flush(&mut word, &mut clause, &mut tokens);
        }
    }
    flush(&mut word, &mut clause, &mut tokens);

    tokens
}
