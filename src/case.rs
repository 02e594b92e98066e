//! Name conversions: struct/field names to column names, display names to URL slugs.

/// Convert an identifier from CamelCase/camelCase to snake_case.
/// e.g. "AuthorId" -> "author_id", "createdAt" -> "created_at", "HTTPStatus" -> "http_status"
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Last path segment of a Rust type path, without generics.
/// e.g. "my_app::models::Person" -> "Person"
pub fn short_type_name(type_path: &str) -> &str {
    let base = type_path.split('<').next().unwrap_or(type_path);
    base.rsplit("::").next().unwrap_or(base)
}

/// URL-safe ASCII slug: Latin letters folded to ASCII, everything else collapsed to single dashes.
/// e.g. "Blog Posts" -> "blog-posts", "Café Menü" -> "cafe-menu"
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    let push = |out: &mut String, c: char, pending_dash: &mut bool| {
        if *pending_dash && !out.is_empty() {
            out.push('-');
        }
        *pending_dash = false;
        out.push(c.to_ascii_lowercase());
    };
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            push(&mut out, c, &mut pending_dash);
        } else if let Some(folded) = fold_latin(c) {
            for f in folded.chars() {
                push(&mut out, f, &mut pending_dash);
            }
        } else {
            pending_dash = true;
        }
    }
    out
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ß' => "ss",
        'ð' | 'Ð' => "d",
        'þ' | 'Þ' => "th",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_acronyms_and_suffixes() {
        assert_eq!(to_snake_case("AuthorId"), "author_id");
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("Id"), "id");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name("app::models::Person"), "Person");
        assert_eq!(short_type_name("Person"), "Person");
        assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper");
    }

    #[test]
    fn slugify_folds_and_collapses() {
        assert_eq!(slugify("Blog Posts"), "blog-posts");
        assert_eq!(slugify("  Café -- Menü! "), "cafe-menu");
        assert_eq!(slugify("Person"), "person");
        assert_eq!(slugify("Straße 42"), "strasse-42");
    }
}
