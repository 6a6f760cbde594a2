// Obfuscation tables used by the normalizer.
//
// WORD_FOLDS rewrite common obfuscated spellings to their canonical form.
// They run in list order over already-lowercased, accent-stripped text, so a
// longer compound must come before any term it contains: `motherfucker` is
// folded before the `fuck` patterns get a chance to eat its middle.
//
// CHAR_SUBSTITUTIONS run afterwards, one character at a time.

/// Ordered (pattern, canonical) pairs. Patterns are regex-lite syntax.
pub const WORD_FOLDS: &[(&str, &str)] = &[
    // motherfucker
    (r"m+[o0]+t+h+[e3]+r+f+[vu*]+c*k+[e3]+r+", "motherfucker"),
    (r"m+[o0]+t+h+[e3]+r+f+[vu*]+k+[e3]+r+", "motherfucker"),
    // fucker
    (r"f+[vu*]+c*k+[e3]+r+", "fucker"),
    (r"ph+[vu*]+c*k+[e3]+r+", "fucker"),
    // fuck
    (r"f+[vu*]+c+k+", "fuck"),
    (r"ph+[vu*]+c*k+", "fuck"),
    (r"f+[vu*]+k+", "fuck"),
    // asshole
    (r"a+[s$]+[s$]+h+[o0]+l+[e3]+", "asshole"),
    // bastard
    (r"b+a+[s$]+t+a+r+d+", "bastard"),
    // bitch
    (r"b+[i!1]+[t7]+c*h+", "bitch"),
    // shit
    (r"sh+[i!1]+[t7]+", "shit"),
    // cunt
    (r"c+[vu]+n+t+", "cunt"),
    (r"k+[vu]+n+t+", "cunt"),
    // dick
    (r"d+[i!1]+c*k+", "dick"),
    // pussy
    (r"p+[vu]+[s$]+[s$]+[yi!1]+", "pussy"),
    // whore
    (r"w+h+[o0]+r+[e3]+", "whore"),
    // slut
    (r"s+l+[vu]+t+", "slut"),
    // damn
    (r"d+a+m+n+", "damn"),
    // piss
    (r"p+[i!1]+[s$]+[s$]+", "piss"),
    // cock
    (r"c+[o0]+c+k+", "cock"),
    // nigger / nigga
    (r"n+[i!1]+g+[e3]+r+", "nigger"),
    (r"n+[i!1]+g+[a4@]+", "nigga"),
    // faggot / fag
    (r"f+a+g+[o0]+t+", "faggot"),
    (r"f+a+g+", "fag"),
    // retard
    (r"r+[e3]+t+a+r+d+", "retard"),
    // ass last: it is a substring of asshole
    (r"a+[s$]+[s$]+", "ass"),
];

/// Digit and symbol stand-ins mapped to the letter they most likely replace.
pub const CHAR_SUBSTITUTIONS: &[(char, char)] = &[
    ('0', 'o'),
    ('1', 'i'),
    ('2', 'z'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('6', 'g'),
    ('7', 't'),
    ('8', 'b'),
    ('9', 'g'),
    ('$', 's'),
    ('@', 'a'),
    ('+', 't'),
    ('!', 'i'),
    ('*', 'a'),
    ('(', 'c'),
    (')', 'o'),
    ('[', 'c'),
    (']', 'o'),
    ('{', 'c'),
    ('}', 'o'),
    ('|', 'i'),
    ('/', 'i'),
    ('\\', 'i'),
    ('<', 'c'),
    ('>', 'o'),
    ('^', 'a'),
    ('&', 'a'),
    ('%', 'o'),
    ('#', 'h'),
    ('=', 'e'),
];

/// Look up the substitution for a single character.
pub fn substitute(c: char) -> char {
    CHAR_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}
