/// The fixed operator keyword table: opcode to symbolic name, as used by
/// the textual notation. Quote and apply are ordinary entries here even
/// though the machine treats them specially.
pub const KEYWORDS: &[(u32, &str)] = &[
    (1, "q"),
    (2, "a"),
    (3, "i"),
    (4, "c"),
    (5, "f"),
    (6, "r"),
    (7, "l"),
    (8, "x"),
    (9, "="),
    (10, ">s"),
    (11, "sha256"),
    (12, "substr"),
    (13, "strlen"),
    (14, "concat"),
    (16, "+"),
    (17, "-"),
    (18, "*"),
    (19, "/"),
    (20, "divmod"),
    (21, ">"),
    (22, "ash"),
    (23, "lsh"),
    (24, "logand"),
    (25, "logior"),
    (26, "logxor"),
    (27, "lognot"),
    (32, "not"),
    (33, "any"),
    (34, "all"),
];

pub fn keyword_from_opcode(opcode: u32) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(code, _)| *code == opcode)
        .map(|(_, name)| *name)
}

pub fn opcode_from_keyword(name: &str) -> Option<u32> {
    KEYWORDS
        .iter()
        .find(|(_, keyword)| *keyword == name)
        .map(|(code, _)| *code)
}
