//! Built-in classification patterns for regulatory cost buckets
//!
//! Each entry is `(label, regex)`. Patterns are matched case-insensitively
//! against the lower-cased `name` + `type` of a line item, in order.

/// Structural steel and iron hardware
pub const STEEL_IRON_PATTERNS: &[(&str, &str)] = &[
    ("racking", r"\brack(s|ing)?\b"),
    ("rail", r"\brails?\b"),
    ("torque_tube", r"\btorque[\s_-]*tubes?\b"),
    ("mount", r"\bmount(s|ing)?\b"),
    ("bracket", r"\bbrackets?\b"),
    ("clamp", r"\b(mid|end)?[\s_-]*clamps?\b"),
    ("fastener", r"\b(fasteners?|bolts?|nuts?|washers?|screws?|lag)\b"),
    ("anchor", r"\banchors?\b"),
    ("purlin", r"\bpurlins?\b"),
    ("stringer", r"\bstringers?\b"),
    ("pile", r"\b(piles?|piers?|posts?|h[\s_-]*beams?)\b"),
    ("splice", r"\bsplices?\b"),
    ("flashing", r"\bflashings?\b"),
    ("structural", r"\b(structural|galvani[sz]ed|steel|iron)\b"),
];
