/// Derive a URL slug from a post title.
///
/// Letters and digits are lowercased and kept, with accented Latin letters
/// folded to ASCII (`Café` becomes `cafe`). Letters of other scripts are kept
/// as they are. Runs of whitespace, `-` and `_` collapse into a single `-`,
/// `@` reads as `at`, and any other punctuation is dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut separator = false;

    for ch in title.replace('@', " at ").chars() {
        if ch.is_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            for lower in ch.to_lowercase() {
                match fold_latin(lower) {
                    Some(ascii) => slug.push_str(ascii),
                    None if lower.is_alphanumeric() => slug.push(lower),
                    None => {}
                }
            }
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            separator = true;
        }
    }

    slug
}

/// ASCII spelling of a lowercase Latin-1 or Latin Extended-A letter.
fn fold_latin(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĳ' => "ij",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("Rust's  Ownership, Explained!"), "rusts-ownership-explained");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  --snake_case -- title  "), "snake-case-title");
    }

    #[test]
    fn test_slugify_at_sign() {
        assert_eq!(slugify("Meet us @ RustConf"), "meet-us-at-rustconf");
    }

    #[test]
    fn test_slugify_folds_accented_latin() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("Straße über Łódź"), "strasse-uber-lodz");
    }

    #[test]
    fn test_slugify_keeps_other_scripts() {
        assert_eq!(slugify("Привет Мир"), "привет-мир");
    }

    #[test]
    fn test_slugify_only_punctuation_is_empty() {
        assert_eq!(slugify("?!"), "");
    }
}
