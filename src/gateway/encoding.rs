use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters the gateway expects escaped in the authorization fingerprint.
///
/// Everything that is never legal in a URL, plus the reserved set
/// `:/?&=;+!@#$()',*`. Signature validation on the gateway depends on this exact set.
const FINGERPRINT_ESCAPE_SET: &AsciiSet = &CONTROLS
    // never legal in a URL
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'[')
    .add(b']')
    // legal, but escaped for the gateway
    .add(b':')
    .add(b'/')
    .add(b'?')
    .add(b'&')
    .add(b'=')
    .add(b';')
    .add(b'+')
    .add(b'!')
    .add(b'@')
    .add(b'#')
    .add(b'$')
    .add(b'(')
    .add(b')')
    .add(b'\'')
    .add(b',')
    .add(b'*');

pub fn encode_fingerprint(fingerprint: &str) -> String {
    utf8_percent_encode(fingerprint, FINGERPRINT_ESCAPE_SET).to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(
            encode_fingerprint(":/?&=;+!@#$()',*"),
            "%3A%2F%3F%26%3D%3B%2B%21%40%23%24%28%29%27%2C%2A"
        );
    }

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(encode_fingerprint("abcXYZ019-_.~"), "abcXYZ019-_.~");
    }

    #[test]
    fn realistic_fingerprint() {
        assert_eq!(
            encode_fingerprint("03acdb|created_at=2014-11-14T18:36:22.39+0000&merchant_id=dcp"),
            "03acdb%7Ccreated_at%3D2014-11-14T18%3A36%3A22.39%2B0000%26merchant_id%3Ddcp"
        );
    }

    #[test]
    fn spaces_percent_and_non_ascii_are_escaped() {
        assert_eq!(encode_fingerprint("a b%c\u{e9}"), "a%20b%25c%C3%A9");
    }
}
