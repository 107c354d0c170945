use regex::Regex;

/// Shell-style wildcard pattern.
///
/// `*` matches any run of characters, `?` one character, `[seq]` and
/// `[!seq]` a character class. An unclosed `[` is a literal bracket and a
/// reversed range such as `z-a` contains nothing. Matching is
/// case-sensitive and anchored at both ends.
#[derive(Debug, Clone)]
pub struct Glob {
    /// `None` when some class can never match a character
    regex: Option<Regex>,
}

impl Glob {
    /// Compile a pattern. Every glob translates to a valid expression, so
    /// this only fails when the compiled program exceeds the regex size limit.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = match translate(pattern) {
            Some(expr) => Some(Regex::new(&expr)?),
            None => None,
        };
        Ok(Self { regex })
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(subject))
    }
}

/// Translate a glob into an equivalent regular expression, or `None` if
/// the glob cannot match anything
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from(r"(?s)\A");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // runs of stars behave like one
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end])?);
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(r"\z");
    Some(out)
}

/// Index of the `]` closing a class whose body starts at `start`
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // a leading `]` is a member, not the terminator
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}

/// Translate a class body; `None` when the class contains no character
fn translate_class(body: &[char]) -> Option<String> {
    let (negated, members) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut i = 0;
    while i < members.len() {
        let lo = members[i];
        if i + 2 < members.len() && members[i + 1] == '-' {
            let hi = members[i + 2];
            i += 3;
            // empty ranges are dropped
            if lo <= hi {
                push_class_char(&mut items, lo);
                items.push('-');
                push_class_char(&mut items, hi);
            }
        } else {
            i += 1;
            push_class_char(&mut items, lo);
        }
    }

    match (items.is_empty(), negated) {
        (true, false) => None,
        (true, true) => Some(".".to_string()),
        (false, true) => Some(format!("[^{items}]")),
        (false, false) => Some(format!("[{items}]")),
    }
}

fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~' | '-') {
        out.push('\\');
    }
    out.push(c);
}
