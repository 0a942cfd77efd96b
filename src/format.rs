use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;

/// Loose integer cast: integers pass through, floats truncate, booleans
/// become 0 or 1 and strings contribute their leading numeric prefix.
pub fn coerce_int(val: &Value) -> Value {
    match val {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Value::Number(n.clone())
            } else {
                Value::from(n.as_f64().map_or(0, truncate_f64))
            }
        },
        Value::Bool(b) => Value::from(*b as i64),
        Value::String(s) => Value::from(parse_int_prefix(s)),
        Value::Array(a) => Value::from(!a.is_empty() as i64),
        Value::Object(o) => Value::from(!o.is_empty() as i64),
        Value::Null => Value::from(0),
    }
}

fn truncate_f64(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds
        f.trunc() as i64
    }
}

fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    if let Ok(i) = s.parse::<i64>() {
        return i;
    }
    if let Ok(f) = s.trim_end().parse::<f64>() {
        if f.is_finite() {
            return truncate_f64(f);
        }
    }

    let mut end = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }

    let prefix = &s[..end];
    match prefix.parse::<i64>() {
        Ok(i) => i,
        Err(_) if prefix.len() > 1 => {
            if prefix.starts_with('-') { i64::MIN } else { i64::MAX }
        },
        Err(_) => 0,
    }
}

/// The original filename with its final extension removed. Names with no
/// '.' yield `None`.
pub fn filename_stem(name: &str) -> Option<&str> {
    name.rfind('.').map(|i| &name[..i])
}

/// Base64 of the raw bytes behind a hex digest.
pub fn hex_to_base64(hash: &str) -> Option<String> {
    hex::decode(hash.trim()).ok().map(|raw| STANDARD.encode(raw))
}

/// Substitutes `icon` for the `%s` placeholder in a thumbnail template.
pub fn format_thumb(template: &str, icon: &str) -> String {
    template.replacen("%s", icon, 1)
}

pub fn html_unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            decode_entity(entity).map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

// HTML 4 Latin-1 and common typographic names. Anything else has to come
// through as a numeric reference.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'), ("lt", '<'), ("gt", '>'), ("quot", '"'), ("apos", '\''),
    ("nbsp", '\u{a0}'), ("iexcl", '¡'), ("cent", '¢'), ("pound", '£'),
    ("curren", '¤'), ("yen", '¥'), ("brvbar", '¦'), ("sect", '§'),
    ("uml", '¨'), ("copy", '©'), ("ordf", 'ª'), ("laquo", '«'),
    ("not", '¬'), ("shy", '\u{ad}'), ("reg", '®'), ("macr", '¯'),
    ("deg", '°'), ("plusmn", '±'), ("sup2", '²'), ("sup3", '³'),
    ("acute", '´'), ("micro", 'µ'), ("para", '¶'), ("middot", '·'),
    ("cedil", '¸'), ("sup1", '¹'), ("ordm", 'º'), ("raquo", '»'),
    ("frac14", '¼'), ("frac12", '½'), ("frac34", '¾'), ("iquest", '¿'),
    ("Agrave", 'À'), ("Aacute", 'Á'), ("Acirc", 'Â'), ("Atilde", 'Ã'),
    ("Auml", 'Ä'), ("Aring", 'Å'), ("AElig", 'Æ'), ("Ccedil", 'Ç'),
    ("Egrave", 'È'), ("Eacute", 'É'), ("Ecirc", 'Ê'), ("Euml", 'Ë'),
    ("Igrave", 'Ì'), ("Iacute", 'Í'), ("Icirc", 'Î'), ("Iuml", 'Ï'),
    ("ETH", 'Ð'), ("Ntilde", 'Ñ'), ("Ograve", 'Ò'), ("Oacute", 'Ó'),
    ("Ocirc", 'Ô'), ("Otilde", 'Õ'), ("Ouml", 'Ö'), ("times", '×'),
    ("Oslash", 'Ø'), ("Ugrave", 'Ù'), ("Uacute", 'Ú'), ("Ucirc", 'Û'),
    ("Uuml", 'Ü'), ("Yacute", 'Ý'), ("THORN", 'Þ'), ("szlig", 'ß'),
    ("agrave", 'à'), ("aacute", 'á'), ("acirc", 'â'), ("atilde", 'ã'),
    ("auml", 'ä'), ("aring", 'å'), ("aelig", 'æ'), ("ccedil", 'ç'),
    ("egrave", 'è'), ("eacute", 'é'), ("ecirc", 'ê'), ("euml", 'ë'),
    ("igrave", 'ì'), ("iacute", 'í'), ("icirc", 'î'), ("iuml", 'ï'),
    ("eth", 'ð'), ("ntilde", 'ñ'), ("ograve", 'ò'), ("oacute", 'ó'),
    ("ocirc", 'ô'), ("otilde", 'õ'), ("ouml", 'ö'), ("divide", '÷'),
    ("oslash", 'ø'), ("ugrave", 'ù'), ("uacute", 'ú'), ("ucirc", 'û'),
    ("uuml", 'ü'), ("yacute", 'ý'), ("thorn", 'þ'), ("yuml", 'ÿ'),
    ("OElig", 'Œ'), ("oelig", 'œ'), ("Scaron", 'Š'), ("scaron", 'š'),
    ("Yuml", 'Ÿ'), ("ndash", '–'), ("mdash", '—'), ("lsquo", '‘'),
    ("rsquo", '’'), ("sbquo", '‚'), ("ldquo", '“'), ("rdquo", '”'),
    ("bdquo", '„'), ("dagger", '†'), ("Dagger", '‡'), ("bull", '•'),
    ("hellip", '…'), ("permil", '‰'), ("lsaquo", '‹'), ("rsaquo", '›'),
    ("euro", '€'), ("trade", '™'),
];

fn decode_entity(entity: &str) -> Option<char> {
    if let Some((_, c)) = NAMED_ENTITIES.iter().find(|(name, _)| *name == entity) {
        return Some(*c);
    }
    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(123), json!(123))]
    #[case(json!("123"), json!(123))]
    #[case(json!(" 42"), json!(42))]
    #[case(json!("12abc"), json!(12))]
    #[case(json!("-7"), json!(-7))]
    #[case(json!("3.9"), json!(3))]
    #[case(json!("abc"), json!(0))]
    #[case(json!(true), json!(1))]
    #[case(json!(false), json!(0))]
    #[case(json!(9.99), json!(9))]
    #[case(json!([]), json!(0))]
    #[case(json!(["x"]), json!(1))]
    fn test_coerce_int(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(coerce_int(&input), expected);
    }

    #[test]
    fn test_coerce_int_keeps_large_unsigned() {
        assert_eq!(coerce_int(&json!(u64::MAX)), json!(u64::MAX));
    }

    #[rstest]
    #[case("cat.jpg", Some("cat"))]
    #[case("archive.tar.gz", Some("archive.tar"))]
    #[case(".hidden", Some(""))]
    #[case("README", None)]
    fn test_filename_stem(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(filename_stem(name), expected);
    }

    #[test]
    fn test_hex_to_base64() {
        assert_eq!(
            hex_to_base64("d41d8cd98f00b204e9800998ecf8427e").as_deref(),
            Some("1B2M2Y8AsgTpgAmY7PhCfg==")
        );
        assert_eq!(hex_to_base64("not hex"), None);
        assert_eq!(hex_to_base64("abc"), None);
    }

    #[test]
    fn test_format_thumb() {
        assert_eq!(format_thumb("static/%s", "file.png"), "static/file.png");
        assert_eq!(format_thumb("static/icon.png", "file.png"), "static/icon.png");
    }

    #[test]
    fn test_html_unescape() {
        assert_eq!(html_unescape("United &amp; Kingdom"), "United & Kingdom");
        assert_eq!(html_unescape("&lt;b&gt; &#039;x&#39; &#x41;"), "<b> 'x' A");
        assert_eq!(html_unescape("AT&T; &bogus; 5 & 6"), "AT&T; &bogus; 5 & 6");
    }

    #[test]
    fn test_html_unescape_latin1_names() {
        assert_eq!(html_unescape("C&ocirc;te d&rsquo;Ivoire"), "Côte d’Ivoire");
        assert_eq!(html_unescape("M&eacute;xico &copy;"), "México ©");
        assert_eq!(html_unescape("&Eacute;&eacute;"), "Éé");
    }
}
